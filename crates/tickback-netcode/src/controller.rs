//! Per-entity tick controller
//!
//! Owns both history buffers of one networked entity and advances them once
//! per network tick according to the entity's [`Role`]:
//!
//! | role | per tick |
//! |---|---|
//! | authority-remote | replay from the oldest newly received input |
//! | client-local | record and send input, replay from the newest correction |
//! | authority-local | record input, simulate the current tick immediately |
//! | spectator | nothing; history is filled by state commits |
//!
//! Every role then refreshes the interpolation endpoints, displaying the
//! state `display_offset` ticks behind the current tick so that it has had
//! time to settle through reconciliation.
//!
//! Message handlers ([`receive_input_commit`](TickController::receive_input_commit),
//! [`receive_state_commit`](TickController::receive_state_commit)) only touch
//! the buffers and markers. All resimulation happens inside
//! [`tick`](TickController::tick), so a handler can never run in the middle
//! of one.

use crate::interpolation::{Endpoints, Interpolator};
use crate::markers::DivergenceMarkers;
use crate::protocol::{CommitOutcome, InputCommit, NetMessage, Outbox, StateCommit};
use crate::resimulation::{resimulate, ResimRange};
use crate::NetcodeConfig;
use tickback_core::{
    Input, InputSource, Movement, Role, Simulation, State, Tick, TickContext, TickHistory, Vec3,
};
use tickback_rollback_buffer::HistoryBuffer;
use tracing::{debug, trace, warn};

/// Counters describing reconciliation activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Resimulation passes run
    pub resimulations: u64,
    /// Ticks recomputed across all passes
    pub resimulated_ticks: u64,
    /// Input commits written into history
    pub inputs_received: u64,
    /// State commits that overwrote a divergent prediction
    pub corrections_applied: u64,
    /// State commits that already matched
    pub commits_unchanged: u64,
}

/// Prediction and reconciliation state machine for one entity
pub struct TickController<S: Simulation = Movement> {
    config: NetcodeConfig,
    simulation: S,
    is_local: bool,
    is_authority: bool,
    inputs: HistoryBuffer<Input>,
    states: HistoryBuffer<State>,
    markers: DivergenceMarkers,
    interpolator: Interpolator,
    outbox: Outbox,
    current_tick: Tick,
    last_resimulated: Option<ResimRange>,
    stats: ReconcileStats,
}

impl TickController<Movement> {
    /// Create a controller using the configured movement step
    pub fn new(
        config: NetcodeConfig,
        is_local: bool,
        is_authority: bool,
        spawn: State,
        spawn_tick: Tick,
    ) -> crate::Result<Self> {
        let movement = config.movement();
        Self::with_simulation(config, movement, is_local, is_authority, spawn, spawn_tick)
    }
}

impl<S: Simulation> TickController<S> {
    /// Create a controller with a custom simulation step.
    ///
    /// Validates `config`; the state history is seeded with `spawn` both as
    /// the entry for `spawn_tick` and as its default value.
    pub fn with_simulation(
        config: NetcodeConfig,
        simulation: S,
        is_local: bool,
        is_authority: bool,
        spawn: State,
        spawn_tick: Tick,
    ) -> crate::Result<Self> {
        config.validate()?;
        let capacity = config.history_capacity;
        let role = Role::from_flags(is_local, is_authority);
        debug!(%role, capacity, spawn_tick, %spawn, "network presence established");

        Ok(Self {
            inputs: HistoryBuffer::new(capacity, Input::NONE, spawn_tick),
            states: HistoryBuffer::seeded(capacity, spawn, spawn_tick),
            markers: DivergenceMarkers::new(),
            interpolator: Interpolator::new(spawn, 0.0),
            outbox: Outbox::new(),
            current_tick: spawn_tick,
            last_resimulated: None,
            stats: ReconcileStats::default(),
            config,
            simulation,
            is_local,
            is_authority,
        })
    }

    /// Role for the current ownership flags
    pub fn role(&self) -> Role {
        Role::from_flags(self.is_local, self.is_authority)
    }

    /// Change ownership; takes effect on the next tick
    pub fn set_ownership(&mut self, is_local: bool, is_authority: bool) {
        self.is_local = is_local;
        self.is_authority = is_authority;
    }

    /// Advance one network tick.
    ///
    /// `input` is polled only by locally controlled roles.
    pub fn tick<I: InputSource + ?Sized>(&mut self, ctx: &TickContext, input: &mut I) {
        let role = self.role();
        let tick = ctx.tick;
        let delta_time = ctx.delta_time as f32;
        self.current_tick = tick;
        self.interpolator.begin_tick(ctx.time, ctx.delta_time);

        match role {
            Role::AuthorityRemote => {
                if let Some(from) = self.markers.take_input(tick) {
                    self.run_resimulation(from, tick + 1, delta_time);
                }
            }
            Role::ClientLocal => {
                let sample = self.record_input(input, tick);
                self.outbox.push(InputCommit {
                    input: sample,
                    tick,
                });
                if let Some(from) = self.markers.take_state() {
                    self.run_resimulation(from, tick + 1, delta_time);
                }
            }
            Role::AuthorityLocal => {
                self.record_input(input, tick);
                self.run_resimulation(tick, tick + 1, delta_time);
            }
            Role::Spectator => {}
        }

        let shown = self.states.get(tick - self.config.display_offset);
        self.interpolator.end_tick(shown);
        trace!(%role, tick, %shown, "tick complete");
    }

    fn record_input<I: InputSource + ?Sized>(&mut self, source: &mut I, tick: Tick) -> Input {
        let sample = source.poll(tick);
        self.inputs.set(sample, tick);
        sample
    }

    fn run_resimulation(&mut self, from: Tick, to: Tick, delta_time: f32) {
        let window_start = self.states.window_start(to);
        if from < window_start {
            warn!(
                from,
                window_start,
                "resimulation starts outside the history window, replaying from defaults"
            );
        }

        let broadcast = self.role().is_authority();
        let outbox = &mut self.outbox;
        let range = resimulate(
            &self.simulation,
            &self.inputs,
            &mut self.states,
            from,
            to,
            delta_time,
            |tick, state| {
                if broadcast {
                    outbox.push(StateCommit { state, tick });
                }
            },
        );

        if !range.is_empty() {
            self.stats.resimulations += 1;
            self.stats.resimulated_ticks += range.len();
            self.last_resimulated = Some(range);
        }
    }

    /// Dispatch any protocol message to its handler
    pub fn receive(&mut self, message: NetMessage) -> CommitOutcome {
        match message {
            NetMessage::InputCommit(commit) => self.receive_input_commit(commit),
            NetMessage::StateCommit(commit) => self.receive_state_commit(commit),
        }
    }

    /// Handle an input commit from the controlling client.
    ///
    /// Only the authority accepts inputs. The input is stored and the
    /// pending replay widened back to its tick, whatever order inputs
    /// arrive in.
    pub fn receive_input_commit(&mut self, commit: InputCommit) -> CommitOutcome {
        if !self.role().is_authority() {
            trace!(tick = commit.tick, "input commit ignored, not the authority");
            return CommitOutcome::Ignored;
        }
        self.warn_if_outside_window("input", commit.tick);

        self.inputs.set(commit.input, commit.tick);
        self.markers.mark_input(commit.tick);
        self.stats.inputs_received += 1;
        CommitOutcome::Applied
    }

    /// Handle an authoritative state commit.
    ///
    /// A commit within tolerance of the buffered state is a no-op. Otherwise
    /// the buffered entry is overwritten and the pending replay moved forward
    /// to the newest corrected tick. A spectator never resimulates, so it
    /// only stores the commit.
    pub fn receive_state_commit(&mut self, commit: StateCommit) -> CommitOutcome {
        let role = self.role();
        if role.is_authority() {
            trace!(tick = commit.tick, "state commit ignored, already the authority");
            return CommitOutcome::Ignored;
        }

        let buffered = self.states.get(commit.tick);
        if buffered.approx_eq(&commit.state, self.config.tolerance) {
            trace!(tick = commit.tick, "state commit matches prediction");
            self.stats.commits_unchanged += 1;
            return CommitOutcome::Unchanged;
        }
        self.warn_if_outside_window("state", commit.tick);

        debug!(
            tick = commit.tick,
            predicted = %buffered,
            authoritative = %commit.state,
            "applying state correction"
        );
        self.states.set(commit.state, commit.tick);
        if role.simulates() {
            self.markers.mark_state(commit.tick);
        }
        self.stats.corrections_applied += 1;
        CommitOutcome::Applied
    }

    fn warn_if_outside_window(&self, stream: &'static str, tick: Tick) {
        let window_start = self.states.window_start(self.current_tick);
        if tick < window_start {
            warn!(
                stream,
                tick,
                window_start,
                current = self.current_tick,
                "commit is older than the history window, increase history_capacity"
            );
        }
    }

    /// Interpolated position at wall-clock `now`; updates the rendered position
    pub fn render(&mut self, now: f64) -> Vec3 {
        self.interpolator.render(now)
    }

    /// Current interpolation endpoints, copied as a pair
    pub fn endpoints(&self) -> Endpoints {
        self.interpolator.endpoints()
    }

    /// Last rendered position
    pub fn rendered(&self) -> Vec3 {
        self.interpolator.rendered()
    }

    /// Take every message produced since the last drain, oldest first
    pub fn drain_outbox(&mut self) -> Vec<NetMessage> {
        self.outbox.drain().collect()
    }

    /// Buffered state for `tick`, or the spawn state if none is held
    pub fn state_at(&self, tick: Tick) -> State {
        self.states.get(tick)
    }

    /// Buffered input for `tick`, or no input if none is held
    pub fn input_at(&self, tick: Tick) -> Input {
        self.inputs.get(tick)
    }

    pub fn states(&self) -> &HistoryBuffer<State> {
        &self.states
    }

    pub fn inputs(&self) -> &HistoryBuffer<Input> {
        &self.inputs
    }

    /// Oldest input tick awaiting resimulation on the authority
    pub fn pending_input_resim(&self) -> Option<Tick> {
        self.markers.pending_input()
    }

    /// Newest corrected tick awaiting resimulation on a client
    pub fn pending_state_resim(&self) -> Option<Tick> {
        self.markers.pending_state()
    }

    pub fn last_resimulated(&self) -> Option<ResimRange> {
        self.last_resimulated
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn stats(&self) -> ReconcileStats {
        self.stats
    }

    pub fn config(&self) -> &NetcodeConfig {
        &self.config
    }
}
