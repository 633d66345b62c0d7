//! Mutation Observers
//!
//! Attribute mutation records are queued per observer when the tree changes
//! an attribute, and handed out in batches through
//! [`ObserverRegistry::take_records`]. Nothing is delivered synchronously;
//! the embedder decides when a batch is drained.

use crate::NodeId;

/// Handle to an observer in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId {
    index: u32,
    generation: u32,
}

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub attributes: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// Observe every attribute change, keeping old values
    pub fn attributes() -> Self {
        Self {
            attributes: true,
            attribute_old_value: true,
            attribute_filter: None,
        }
    }

    fn wants(&self, attribute: &str) -> bool {
        self.attributes
            && self.attribute_filter
                .as_ref()
                .is_none_or(|filter| filter.iter().any(|f| f == attribute))
    }
}

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub attribute_name: String,
    pub old_value: Option<String>,
}

#[derive(Debug)]
struct MutationObserver {
    options: MutationObserverInit,
    observed: Vec<NodeId>,
    records: Vec<MutationRecord>,
}

#[derive(Debug)]
struct ObserverSlot {
    observer: Option<MutationObserver>,
    generation: u32,
}

/// All observers attached to one tree.
///
/// Disconnected observers give their slot back; a later `observe` reuses it
/// under a new generation.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    slots: Vec<ObserverSlot>,
    free: Vec<u32>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing `target`, returning a fresh observer
    pub fn observe(&mut self, target: NodeId, options: MutationObserverInit) -> ObserverId {
        let observer = MutationObserver {
            options,
            observed: vec![target],
            records: Vec::new(),
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.observer = Some(observer);
            return ObserverId { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(ObserverSlot { observer: Some(observer), generation: 0 });
        ObserverId { index, generation: 0 }
    }

    /// Add another target to an existing observer
    pub fn observe_more(&mut self, observer: ObserverId, target: NodeId) {
        if let Some(obs) = self.get_mut(observer) {
            if !obs.observed.contains(&target) {
                obs.observed.push(target);
            }
        }
    }

    /// Stop observing, drop queued records and free the slot
    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(slot) = self.slots.get_mut(observer.index as usize) {
            if slot.generation == observer.generation && slot.observer.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(observer.index);
            }
        }
    }

    /// Whether the observer is still attached
    pub fn is_connected(&self, observer: ObserverId) -> bool {
        self.get(observer).is_some()
    }

    /// Number of connected observers
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain queued records, oldest first
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.get_mut(observer)
            .map(|obs| std::mem::take(&mut obs.records))
            .unwrap_or_default()
    }

    /// Number of queued records for an observer
    pub fn pending(&self, observer: ObserverId) -> usize {
        self.get(observer).map_or(0, |obs| obs.records.len())
    }

    /// Observers with at least one queued record, in slot order
    pub fn with_pending_records(&self) -> Vec<ObserverId> {
        self.slots.iter()
            .enumerate()
            .filter(|(_, slot)| slot.observer.as_ref().is_some_and(|obs| !obs.records.is_empty()))
            .map(|(i, slot)| ObserverId { index: i as u32, generation: slot.generation })
            .collect()
    }

    /// Queue an attribute change on `target` for every interested observer
    pub(crate) fn queue_attribute(&mut self, target: NodeId, name: &str, old_value: Option<&str>) {
        for obs in self.slots.iter_mut().filter_map(|slot| slot.observer.as_mut()) {
            if !obs.observed.contains(&target) || !obs.options.wants(name) {
                continue;
            }
            obs.records.push(MutationRecord {
                target,
                attribute_name: name.to_string(),
                old_value: if obs.options.attribute_old_value {
                    old_value.map(str::to_string)
                } else {
                    None
                },
            });
        }
    }

    /// Stop watching nodes that were freed from the arena
    pub(crate) fn forget(&mut self, dropped: &[NodeId]) {
        for obs in self.slots.iter_mut().filter_map(|slot| slot.observer.as_mut()) {
            obs.observed.retain(|id| !dropped.contains(id));
        }
    }

    fn get(&self, observer: ObserverId) -> Option<&MutationObserver> {
        self.slots
            .get(observer.index as usize)
            .filter(|slot| slot.generation == observer.generation)
            .and_then(|slot| slot.observer.as_ref())
    }

    fn get_mut(&mut self, observer: ObserverId) -> Option<&mut MutationObserver> {
        self.slots
            .get_mut(observer.index as usize)
            .filter(|slot| slot.generation == observer.generation)
            .and_then(|slot| slot.observer.as_mut())
    }
}
