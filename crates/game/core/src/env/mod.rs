//! Collaborator interfaces the simulation consumes.
//!
//! The engine owns no terrain, no randomness source, and no log. Hosts hand
//! in implementations of these traits; the [`Env`] aggregate bundles them so
//! call sites stay narrow and the core never couples to concrete types.

mod map;
mod messages;
mod rng;

pub use map::{GridMap, MapDimensions, MapOracle};
pub use messages::{MessageLog, MessageSink, MessageTag, NullSink};
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Bundle of collaborator references threaded through the engine.
#[derive(Clone, Copy)]
pub struct Env<'a> {
    pub map: &'a dyn MapOracle,
    pub rng: &'a dyn RngOracle,
    pub messages: &'a dyn MessageSink,
}

impl<'a> Env<'a> {
    pub fn new(
        map: &'a dyn MapOracle,
        rng: &'a dyn RngOracle,
        messages: &'a dyn MessageSink,
    ) -> Self {
        Self { map, rng, messages }
    }
}
