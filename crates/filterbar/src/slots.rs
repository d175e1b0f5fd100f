//! Stable slots for filter control instances.
//!
//! Every filter id present in a render pass owns exactly one [`RenderSlot`],
//! and every slot owns exactly one control instance created by a
//! [`ControlFactory`]. A slot lives in an arena keyed by [`SlotKey`] and is
//! found by id, never by position, so moving a filter between the visible
//! row, the overflow dropdown and the out-of-scope section only changes where
//! the renderer reads the slot from. The control itself is never torn down
//! and rebuilt, which preserves focus, in-progress input and scroll state.

use std::collections::{HashMap, HashSet};

use slotmap::{SlotMap, new_key_type};

use filterbar_core::logging::{span_names, targets};

use crate::item::{FilterId, FilterItem};

new_key_type! {
    /// Stable reference to a render slot.
    ///
    /// A key stays valid for as long as its filter id keeps appearing in
    /// render passes, regardless of scope, layout mode or overflow state.
    pub struct SlotKey;
}

/// Where a control is currently rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// In the vertical list or the visible horizontal row.
    Inline,
    /// Hidden from the horizontal row, shown in the overflow dropdown.
    Overflowed,
    /// In the out-of-scope section.
    OutOfScope,
}

/// A live filter control owned by a slot.
///
/// Both hooks have no-op defaults.
pub trait FilterControl {
    /// Called when the control is relocated.
    fn set_placement(&mut self, _placement: Placement) {}

    /// Reset the control's selection in response to a clear-all request.
    fn clear(&mut self) {}
}

/// Creates control instances. Called at most once per slot lifetime.
pub trait ControlFactory {
    type Control: FilterControl;

    fn create(&mut self, item: &FilterItem) -> Self::Control;
}

/// The stable indirection unit holding one control instance.
pub struct RenderSlot<C> {
    item: FilterItem,
    control: C,
    placement: Option<Placement>,
}

impl<C> RenderSlot<C> {
    pub fn id(&self) -> &FilterId {
        &self.item.id
    }

    /// The item from the latest render pass.
    pub fn item(&self) -> &FilterItem {
        &self.item
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    /// Placement applied during the latest render pass, if any.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }
}

/// What an allocation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Ids that received a new slot, in input order.
    pub created: Vec<FilterId>,
    /// Ids whose slot was released.
    pub released: Vec<FilterId>,
    /// Number of slots carried over unchanged.
    pub retained: usize,
}

impl Allocation {
    /// Whether the set of slots changed.
    pub fn is_changed(&self) -> bool {
        !self.created.is_empty() || !self.released.is_empty()
    }
}

/// Arena of render slots, indexed by filter id.
pub struct SlotTable<C> {
    slots: SlotMap<SlotKey, RenderSlot<C>>,
    by_id: HashMap<FilterId, SlotKey>,
    instances_created: u64,
}

impl<C> Default for SlotTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SlotTable<C> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            by_id: HashMap::new(),
            instances_created: 0,
        }
    }

    /// Reconcile the table with the items of the current render pass.
    ///
    /// Retained ids keep their key and control and only pick up the new item
    /// value. New ids get a slot and a control from `factory`. Ids absent from
    /// `items` are released. Later duplicates of an id are ignored.
    pub fn allocate<F>(&mut self, items: &[FilterItem], factory: &mut F) -> Allocation
    where
        F: ControlFactory<Control = C>,
    {
        let _span = tracing::trace_span!(target: targets::SLOTS, "allocate", name = span_names::ALLOCATE).entered();
        let mut allocation = Allocation::default();
        let mut present: HashSet<&FilterId> = HashSet::with_capacity(items.len());

        for item in items {
            if !present.insert(&item.id) {
                tracing::debug!(target: targets::SLOTS, id = %item.id, "duplicate id in allocation input");
                continue;
            }
            match self.by_id.get(&item.id) {
                Some(&key) => {
                    if let Some(slot) = self.slots.get_mut(key) {
                        slot.item = item.clone();
                        allocation.retained += 1;
                    }
                }
                None => {
                    let control = factory.create(item);
                    self.instances_created += 1;
                    let key = self.slots.insert(RenderSlot {
                        item: item.clone(),
                        control,
                        placement: None,
                    });
                    self.by_id.insert(item.id.clone(), key);
                    allocation.created.push(item.id.clone());
                }
            }
        }

        let slots = &mut self.slots;
        let released = &mut allocation.released;
        self.by_id.retain(|id, key| {
            let keep = present.contains(id);
            if !keep {
                slots.remove(*key);
                released.push(id.clone());
            }
            keep
        });

        if allocation.is_changed() {
            tracing::debug!(
                target: targets::SLOTS,
                created = allocation.created.len(),
                released = allocation.released.len(),
                retained = allocation.retained,
                "slot table changed"
            );
        }
        allocation
    }

    pub fn key_of(&self, id: &FilterId) -> Option<SlotKey> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, key: SlotKey) -> Option<&RenderSlot<C>> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut RenderSlot<C>> {
        self.slots.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &RenderSlot<C>)> {
        self.slots.iter()
    }

    /// Total number of controls the factory has produced for this table.
    pub fn instances_created(&self) -> u64 {
        self.instances_created
    }
}

impl<C: FilterControl> SlotTable<C> {
    /// Record where a slot renders, notifying its control on change.
    ///
    /// Returns `true` if the placement changed.
    pub fn place(&mut self, key: SlotKey, placement: Placement) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        if slot.placement == Some(placement) {
            return false;
        }
        slot.placement = Some(placement);
        slot.control.set_placement(placement);
        true
    }
}
