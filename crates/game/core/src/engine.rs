//! Turn dispatch.
//!
//! The engine owns the loop the whole simulation hangs off: pop the next
//! ticket, run periodic upkeep for any global turns the clock crossed, and
//! either hand control back to the host (player) or invoke the entity's
//! behavior (everything else). Every resolved turn ends in exactly one
//! reschedule; failed AI turns are rescheduled at a fixed penalty so a
//! blocked entity can never spin the loop.

use tracing::debug;

use crate::action::{ActionError, ActionKind, execute};
use crate::behavior::{self, Behavior, BehaviorVerdict};
use crate::config::GameConfig;
use crate::env::{Env, MessageTag};
use crate::scheduler::TurnError;
use crate::state::{EntityId, GameState};

/// Why control came back to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnSignal {
    /// The player's ticket came due; the host must gather input and call
    /// [`Engine::perform`] (or [`Engine::tick_automation`]) until a turn
    /// is consumed, then advance again.
    PlayerTurn,
    /// The player-controlled entity is dead. Terminal for the session.
    PlayerDead,
}

/// Fatal engine failure: a scheduler invariant was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("scheduler invariant violated: {0}")]
    Scheduler(#[from] TurnError),
}

/// Outcome of one attempted player turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action executed and consumed `cost` time units.
    Acted { cost: u64 },
    /// The action was impossible. No time passed; try something else.
    Blocked(ActionError),
    /// The running automation stopped and manual control resumes.
    CancelAutomation(String),
    /// The player died during the action.
    FatalDeath,
}

/// Drives a [`GameState`] against a set of collaborators.
pub struct Engine<'s, 'e> {
    state: &'s mut GameState,
    env: Env<'e>,
    config: GameConfig,
}

impl<'s, 'e> Engine<'s, 'e> {
    pub fn new(state: &'s mut GameState, env: Env<'e>) -> Self {
        Self {
            state,
            env,
            config: GameConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Runs non-player turns until the player is due (or dead).
    pub fn advance(&mut self) -> Result<TurnSignal, EngineError> {
        loop {
            let actor = self.state.queue.invoke_next()?;
            self.run_upkeep();

            if actor.is_player() {
                if !self.player_alive() {
                    return Ok(TurnSignal::PlayerDead);
                }
                // the player's side begins: whatever the hostiles had
                // cached about their shots is stale now
                self.state.fire.hostile.clear_cache();
                return Ok(TurnSignal::PlayerTurn);
            }

            let Some(entity) = self.state.entities.get(actor) else {
                debug_assert!(false, "ticket for missing entity {actor}");
                continue;
            };
            if entity.is_actor() && !entity.is_alive() {
                // death unschedules, so a popped corpse is a stale ticket;
                // shed it without rescheduling
                continue;
            }

            self.state.nonce += 1;
            match behavior::tick(self.state, &self.env, actor, &self.config) {
                BehaviorVerdict::Acted | BehaviorVerdict::Reverted => {
                    let cost = self
                        .state
                        .entities
                        .get(actor)
                        .map(|e| e.action_speed())
                        .unwrap_or(GameConfig::BASE_SPEED);
                    self.state.queue.reschedule(cost, actor);
                }
                BehaviorVerdict::Blocked(error) => {
                    // a failed turn still consumes time
                    debug!(%actor, %error, "behavior blocked, penalty reschedule");
                    self.state
                        .queue
                        .reschedule(GameConfig::BLOCKED_TURN_PENALTY, actor);
                }
                BehaviorVerdict::Cancel(reason) => {
                    debug!(%actor, %reason, "automation signal from non-player entity");
                    self.state
                        .queue
                        .reschedule(GameConfig::BLOCKED_TURN_PENALTY, actor);
                }
                BehaviorVerdict::Expired => {}
            }

            if !self.player_alive() {
                return Ok(TurnSignal::PlayerDead);
            }
        }
    }

    /// Executes one manual player action.
    ///
    /// On success the player is rescheduled at their action speed. On
    /// failure no time passes and the player stays off the queue; the host
    /// keeps trying actions until one lands, then calls
    /// [`Engine::advance`] again.
    pub fn perform(&mut self, action: ActionKind) -> TurnOutcome {
        if !self.player_alive() {
            return TurnOutcome::FatalDeath;
        }

        self.state.nonce += 1;
        match execute(self.state, &self.env, EntityId::PLAYER, &action) {
            Ok(()) => {
                if let Some(player) = self.state.entities.player_mut() {
                    if matches!(action, ActionKind::Wait) {
                        // holding still is how you settle in: take aim,
                        // press into cover
                        player.aim_stack += 1;
                        player.hunker_stack += 1;
                    } else {
                        player.aim_stack = 0;
                        player.hunker_stack = 0;
                    }
                }

                let cost = self
                    .state
                    .entities
                    .player()
                    .map(|p| p.action_speed())
                    .unwrap_or(GameConfig::BASE_SPEED);
                self.state.queue.reschedule(cost, EntityId::PLAYER);

                if !self.player_alive() {
                    TurnOutcome::FatalDeath
                } else {
                    TurnOutcome::Acted { cost }
                }
            }
            Err(error) => {
                self.env
                    .messages
                    .post(&crate::action::capitalize(&error.to_string()), MessageTag::Warning);
                TurnOutcome::Blocked(error)
            }
        }
    }

    /// Replaces the player's behavior with an automated one and runs its
    /// first turn.
    pub fn start_automation(&mut self, automation: Behavior) -> TurnOutcome {
        debug_assert!(automation.is_automated());
        if let Some(player) = self.state.entities.player_mut() {
            player.behavior = Some(automation);
        }
        self.tick_automation()
    }

    /// Runs one turn of the player's automated behavior.
    ///
    /// Cancellation reverts the player to manual control, posts the
    /// reason, and consumes no time. It never swallows combat that already
    /// resolved earlier in the turn sequence.
    pub fn tick_automation(&mut self) -> TurnOutcome {
        if !self.player_alive() {
            return TurnOutcome::FatalDeath;
        }
        if !self
            .state
            .entities
            .player()
            .and_then(|p| p.behavior.as_ref())
            .is_some_and(Behavior::is_automated)
        {
            return TurnOutcome::CancelAutomation("You are not in an automated mode.".into());
        }

        self.state.nonce += 1;
        match behavior::tick(self.state, &self.env, EntityId::PLAYER, &self.config) {
            BehaviorVerdict::Acted | BehaviorVerdict::Reverted => {
                if let Some(player) = self.state.entities.player_mut() {
                    player.aim_stack = 0;
                    player.hunker_stack = 0;
                }
                let cost = self
                    .state
                    .entities
                    .player()
                    .map(|p| p.action_speed())
                    .unwrap_or(GameConfig::BASE_SPEED);
                self.state.queue.reschedule(cost, EntityId::PLAYER);
                TurnOutcome::Acted { cost }
            }
            BehaviorVerdict::Blocked(error) => self.cancel_automation(error.to_string()),
            BehaviorVerdict::Cancel(reason) => self.cancel_automation(reason),
            BehaviorVerdict::Expired => TurnOutcome::FatalDeath,
        }
    }

    fn cancel_automation(&mut self, reason: String) -> TurnOutcome {
        if let Some(player) = self.state.entities.player_mut() {
            player.behavior = Some(Behavior::Idle);
        }
        self.env
            .messages
            .post(&crate::action::capitalize(&reason), MessageTag::Warning);
        TurnOutcome::CancelAutomation(reason)
    }

    /// Applies stun decay and regeneration once per global turn the clock
    /// just crossed, uniformly across all combatants.
    fn run_upkeep(&mut self) {
        let crossed = self.state.queue.take_elapsed_turns();
        if crossed == 0 {
            return;
        }
        debug!(crossed, turn = self.state.queue.turn_count(), "upkeep");
        for _ in 0..crossed {
            for entity in self.state.entities.iter_mut() {
                if let Some(vitals) = entity.vitals.as_mut() {
                    vitals.upkeep();
                }
            }
        }
    }

    fn player_alive(&self) -> bool {
        self.state.entities.player().is_some_and(|p| p.is_alive())
    }
}
