//! Circulation registry
//!
//! The set of item ids still accepting fragments, kept as a dense array plus a
//! reverse index so that picking by position and removing by id are both
//! O(1). Removal swaps the last entry into the vacated position and pops.
//!
//! Invariant: for every id in `entries`, `positions[id]` is its true index,
//! including right after a swap caused by removing a different id.
//!
//! Selection through [`CirculationRegistry::pick`] is uniform over ids, not
//! weighted by remaining slots: an item with one slot left is as likely to be
//! drawn as an untouched one.

use std::collections::HashMap;
use tessera_core::ItemId;
use thiserror::Error;

/// Circulation bookkeeping failures. All of them are bugs or misbehaving
/// collaborators; the ledger reports them as invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CirculationError {
    #[error("{item} is not in circulation")]
    NotPresent { item: ItemId },

    #[error("index {index} out of range for circulation of size {len}")]
    IndexOutOfRange { index: u64, len: usize },

    #[error("{item} added to circulation twice")]
    Duplicate { item: ItemId },

    #[error("{item} indexed at {recorded} but stored at {actual}")]
    PositionMismatch {
        item: ItemId,
        recorded: usize,
        actual: usize,
    },

    #[error("reverse index has {indexed} entries for {stored} stored items")]
    SizeMismatch { indexed: usize, stored: usize },
}

/// An entry moved by swap-and-pop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Item whose position changed
    pub item: ItemId,
    /// Position it was moved from (the old last slot)
    pub from: usize,
    /// Position it now occupies
    pub to: usize,
}

/// Dense set of item ids with O(1) pick and remove
#[derive(Debug, Clone, Default)]
pub struct CirculationRegistry {
    entries: Vec<ItemId>,
    positions: HashMap<ItemId, usize>,
}

impl CirculationRegistry {
    /// Build a registry holding `items` in the given order
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Result<Self, CirculationError> {
        let items = items.into_iter();
        let mut registry = Self {
            entries: Vec::with_capacity(items.size_hint().0),
            positions: HashMap::with_capacity(items.size_hint().0),
        };
        for item in items {
            if registry.positions.contains_key(&item) {
                return Err(CirculationError::Duplicate { item });
            }
            registry.positions.insert(item, registry.entries.len());
            registry.entries.push(item);
        }
        Ok(registry)
    }

    /// Number of ids in circulation
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether circulation is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `item` is in circulation
    pub fn contains(&self, item: ItemId) -> bool {
        self.positions.contains_key(&item)
    }

    /// Current array position of `item`
    pub fn position(&self, item: ItemId) -> Option<usize> {
        self.positions.get(&item).copied()
    }

    /// Ids in array order
    pub fn as_slice(&self) -> &[ItemId] {
        &self.entries
    }

    /// Id stored at `index`. Does not mutate.
    pub fn pick(&self, index: u64) -> Result<ItemId, CirculationError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.entries.get(i))
            .copied()
            .ok_or(CirculationError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Remove `item` by swap-and-pop, returning the entry that moved into its
    /// position, if any.
    pub fn remove(&mut self, item: ItemId) -> Result<Option<Relocation>, CirculationError> {
        let position = self
            .positions
            .get(&item)
            .copied()
            .ok_or(CirculationError::NotPresent { item })?;
        let last = self.entries.len() - 1;

        let relocation = if position != last {
            let moved = self.entries[last];
            self.entries[position] = moved;
            self.positions.insert(moved, position);
            Some(Relocation {
                item: moved,
                from: last,
                to: position,
            })
        } else {
            None
        };

        self.entries.pop();
        self.positions.remove(&item);
        Ok(relocation)
    }

    /// Verify that the reverse index matches the array exactly
    pub fn check_invariants(&self) -> Result<(), CirculationError> {
        if self.positions.len() != self.entries.len() {
            return Err(CirculationError::SizeMismatch {
                indexed: self.positions.len(),
                stored: self.entries.len(),
            });
        }
        for (actual, item) in self.entries.iter().enumerate() {
            match self.positions.get(item) {
                Some(&recorded) if recorded == actual => {}
                Some(&recorded) => {
                    return Err(CirculationError::PositionMismatch {
                        item: *item,
                        recorded,
                        actual,
                    })
                }
                None => return Err(CirculationError::NotPresent { item: *item }),
            }
        }
        Ok(())
    }
}
