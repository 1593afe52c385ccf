//! Object identifier generation.
//!
//! Identifiers are 24 upper-case hex characters (96 bits), the shape Xcode
//! itself writes. A draw is only returned after checking it against every key
//! already reserved: the keys of the graph being edited plus every id this
//! generator has issued. Collisions are astronomically unlikely, but the
//! membership check makes uniqueness a guarantee instead of a probability.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::errors::{GraftError, GraftResult};
use crate::model::{ObjectId, ProjectGraph};

/// Default number of consecutive colliding draws tolerated before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 64;

/// A source of 96 random bits per draw.
pub trait IdSource {
    fn draw(&mut self) -> [u8; 12];
}

/// Operating-system seeded randomness for real edits.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn draw(&mut self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut bytes);
        bytes
    }
}

/// Reproducible ids for tests and dry runs.
#[derive(Debug)]
pub struct SeededIds(StdRng);

impl SeededIds {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl IdSource for SeededIds {
    fn draw(&mut self) -> [u8; 12] {
        let mut bytes = [0u8; 12];
        self.0.fill_bytes(&mut bytes);
        bytes
    }
}

/// Issues identifiers that are unique against a reserved key set.
pub struct IdGenerator {
    source: Box<dyn IdSource + Send>,
    reserved: HashSet<ObjectId>,
    max_attempts: usize,
}

impl IdGenerator {
    pub fn new(source: impl IdSource + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            reserved: HashSet::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn random() -> Self {
        Self::new(RandomIds)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(SeededIds::new(seed))
    }

    /// A generator that will never return a key already present in `graph`.
    pub fn for_graph(graph: &ProjectGraph, source: impl IdSource + Send + 'static) -> Self {
        let mut g = Self::new(source);
        g.reserve(graph.ids().cloned());
        g
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn reserve(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        self.reserved.extend(ids);
    }

    pub fn is_reserved(&self, id: &ObjectId) -> bool {
        self.reserved.contains(id)
    }

    /// Return a fresh identifier and reserve it.
    pub fn next_id(&mut self) -> GraftResult<ObjectId> {
        for attempt in 0..self.max_attempts {
            let id = ObjectId::new(hex::encode_upper(self.source.draw()));
            if self.reserved.insert(id.clone()) {
                return Ok(id);
            }
            tracing::warn!(%id, attempt, "identifier collision, drawing again");
        }
        Err(GraftError::IdSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("reserved", &self.reserved.len())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
