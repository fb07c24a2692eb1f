//! Deterministic turn-based tactical engine.
//!
//! `breach-core` owns the rules of the dungeon simulation: the ticket
//! scheduler that decides who acts when, the line-of-fire geometry with its
//! obstacle bending and cover arithmetic, the dice-pool combat resolver,
//! and the per-entity behavior machine. Everything else (terrain, field of
//! view, rendering, input, persistence formats) is a collaborator handed in
//! through the traits in [`env`].
//!
//! All state mutation flows through [`engine::Engine`]; the full
//! [`state::GameState`] aggregate serializes as one snapshot.

pub mod action;
pub mod behavior;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod fire;
pub mod geometry;
pub mod scheduler;
pub mod state;

pub use action::{ActionError, ActionKind};
pub use behavior::{Behavior, BehaviorVerdict, find_path};
pub use combat::{DamageRoll, HitRoll, StrayOutcome};
pub use config::GameConfig;
pub use engine::{Engine, EngineError, TurnOutcome, TurnSignal};
pub use env::{
    Env, GridMap, MapDimensions, MapOracle, MessageLog, MessageSink, MessageTag, NullSink, PcgRng,
    RngOracle, compute_seed,
};
pub use fire::{FireLine, FireLines, HitStat, Obstruction};
pub use scheduler::{Ticket, TurnError, TurnQueue};
pub use state::{
    Direction, EntitiesState, Entity, EntityId, EntityKind, GameState, Loadout, Position,
    SizeClass, Tick, Vitals, Weapon, WeaponKind,
};
