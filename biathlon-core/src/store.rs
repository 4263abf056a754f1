//! Competitor record store
//!
//! Owns every competitor record for the lifetime of one run. Records are kept
//! ordered by identifier so the report comes out in a stable order.

use crate::competitor::Competitor;
use crate::types::{CompetitorId, Result, TrackerError};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Identifier → record mapping with a single writer
#[derive(Debug, Default)]
pub struct CompetitorStore {
    competitors: BTreeMap<CompetitorId, Competitor>,
}

impl CompetitorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record in status `Registered`, replacing any existing one
    pub fn register(&mut self, id: CompetitorId) -> &mut Competitor {
        match self.competitors.entry(id) {
            Entry::Occupied(mut entry) => {
                log::warn!("Competitor {} registered again, previous record discarded", id);
                entry.insert(Competitor::new(id));
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(Competitor::new(id)),
        }
    }

    pub fn lookup(&self, id: CompetitorId) -> Result<&Competitor> {
        self.competitors
            .get(&id)
            .ok_or(TrackerError::NotRegistered(id))
    }

    pub fn lookup_mut(&mut self, id: CompetitorId) -> Result<&mut Competitor> {
        self.competitors
            .get_mut(&id)
            .ok_or(TrackerError::NotRegistered(id))
    }

    pub fn contains(&self, id: CompetitorId) -> bool {
        self.competitors.contains_key(&id)
    }

    /// All records in ascending identifier order
    pub fn iter(&self) -> impl Iterator<Item = &Competitor> {
        self.competitors.values()
    }

    pub fn len(&self) -> usize {
        self.competitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.competitors.is_empty()
    }
}
