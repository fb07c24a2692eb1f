/// Engine tuning constants and runtime-adjustable parameters.
///
/// The literal values mirror the balance numbers the rules were tuned
/// against; they are not derived from anything.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Radius cap for the auto-explore ring search. Exceeding it without
    /// finding an unexplored reachable tile cancels the automation.
    pub explore_radius_cap: u32,
}

impl GameConfig {
    // ===== timeline =====
    /// Time units per derived global turn. Periodic upkeep (stun decay,
    /// regeneration) runs once per elapsed multiple of this, no matter how
    /// many tickets fired inside the window.
    pub const TURN_UNITS: u64 = 60;
    /// Base action speed: an unhurt, unstunned actor spends one full turn
    /// per action.
    pub const BASE_SPEED: u64 = 60;
    /// Reschedule interval applied when an automated actor's turn fails.
    /// Failed turns still consume time so a blocked AI cannot spin forever.
    pub const BLOCKED_TURN_PENALTY: u64 = 60;

    // ===== vitals =====
    /// Health is tracked at 100x precision so regeneration can be fractional.
    pub const HEALTH_SCALE: i32 = 100;
    /// Centi-health restored per derived turn.
    pub const REGEN_CENTI_PER_TURN: i32 = 5;
    /// Stun points shed per derived turn.
    pub const STUN_DECAY_PER_TURN: i32 = 1;

    // ===== line of fire =====
    /// Attack pool penalty per path cell beyond weapon range.
    pub const RANGE_PENALTY_PER_CELL: i32 = 2;

    pub const DEFAULT_EXPLORE_RADIUS_CAP: u32 = 60;

    pub fn new() -> Self {
        Self {
            explore_radius_cap: Self::DEFAULT_EXPLORE_RADIUS_CAP,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
