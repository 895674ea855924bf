#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Beam channel controller that drives a cast from start to termination.
//!
//! The host scheduler calls [`BeamChannel::step`] once per simulation step.
//! Each step checks, in order, that the caster is still valid, that the beam
//! has not overloaded and that the channel has time left; only then are the
//! visuals refreshed and, on pulse steps, area damage queued. Every
//! termination path releases the channel's visual segments before reporting.

mod visuals;

use astral_beam_core::{
    ActorState, BeamConfig, CasterSnapshot, CellCoord, Command, ConfigError, GridQuery,
    SegmentSink,
};
use astral_beam_system_affected_cells::AffectedCells;
use astral_beam_system_overload::{find_overload, validate_cast, CastRejection};
use astral_beam_system_tracing::BeamGeometry;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::visuals::BeamVisuals;

/// Tick counters advanced by a live channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelState {
    /// Steps completed since the cast started.
    pub elapsed_ticks: u32,
    /// Steps left before the next damage pulse; zero pulses on the coming step.
    pub ticks_until_next_pulse: u32,
}

/// Why a channel stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The caster died, left the grid or stands on another grid.
    CasterInvalid,
    /// The host cancelled the channel.
    Cancelled,
    /// An obstruction came too close to the caster and the beam exploded.
    Overloaded,
    /// The channel ran for its full duration.
    Expired,
}

/// Outcome of a single channel step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelStatus {
    /// The channel keeps running.
    Active,
    /// The channel has stopped and released its visuals.
    Terminated(TerminationReason),
}

impl ChannelStatus {
    /// Reports whether the channel keeps running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Persisted form of a channel.
///
/// Geometry, collisions and visual handles are not stored; they are recomputed
/// from the configuration on the first step after [`BeamChannel::restore`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Configuration the channel was cast with.
    pub config: BeamConfig,
    /// Tick counters at the time of the snapshot.
    pub state: ChannelState,
    /// Whether cancellation was requested but not yet observed.
    pub cancelled: bool,
}

/// Controller of one channelled beam.
#[derive(Debug)]
pub struct BeamChannel {
    config: BeamConfig,
    state: ChannelState,
    cancelled: bool,
    termination: Option<TerminationReason>,
    visuals: BeamVisuals,
    resolver: AffectedCells,
    cells: Vec<CellCoord>,
}

impl BeamChannel {
    /// Starts a channel after validating the cast against the current grid.
    pub fn cast<G, S>(grid: &G, config: BeamConfig, sink: &S) -> Result<Self, CastRejection>
    where
        G: GridQuery,
        S: SegmentSink,
    {
        validate_cast(grid, &config)?;
        Ok(Self::from_parts(config, ChannelState::default(), false, sink))
    }

    /// Rebuilds a channel from a snapshot.
    ///
    /// The grid may have changed since the snapshot was taken, so no overload
    /// check happens here; the next step performs it.
    pub fn restore<S>(snapshot: ChannelSnapshot, sink: &S) -> Result<Self, ConfigError>
    where
        S: SegmentSink,
    {
        snapshot.config.validate()?;
        Ok(Self::from_parts(
            snapshot.config,
            snapshot.state,
            snapshot.cancelled,
            sink,
        ))
    }

    fn from_parts<S>(config: BeamConfig, state: ChannelState, cancelled: bool, sink: &S) -> Self
    where
        S: SegmentSink,
    {
        Self {
            config,
            state,
            cancelled,
            termination: None,
            visuals: BeamVisuals::resolve(sink),
            resolver: AffectedCells::new(),
            cells: Vec::new(),
        }
    }

    /// Configuration the channel was cast with.
    #[must_use]
    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    /// Current tick counters.
    #[must_use]
    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Reason the channel stopped, if it has.
    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Number of visual segments currently owned by the channel.
    #[must_use]
    pub fn live_segments(&self) -> usize {
        self.visuals.live_segments()
    }

    /// Requests cancellation; the next step terminates the channel.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Captures the persisted form of the channel.
    #[must_use]
    pub fn snapshot(&self) -> ChannelSnapshot {
        ChannelSnapshot {
            config: self.config.clone(),
            state: self.state,
            cancelled: self.cancelled,
        }
    }

    /// Terminates the channel immediately, as when the host discards it.
    pub fn destroy<S>(&mut self, sink: &mut S) -> ChannelStatus
    where
        S: SegmentSink,
    {
        match self.termination {
            Some(reason) => ChannelStatus::Terminated(reason),
            None => self.terminate(TerminationReason::Cancelled, sink),
        }
    }

    /// Advances the channel by one simulation step.
    ///
    /// `caster` is `None` when the caster no longer exists. Damage is queued
    /// into `out` for the host world to apply. A terminated channel stays
    /// terminated and queues nothing.
    pub fn step<G, S>(
        &mut self,
        grid: &G,
        caster: Option<&CasterSnapshot>,
        sink: &mut S,
        out: &mut Vec<Command>,
    ) -> ChannelStatus
    where
        G: GridQuery,
        S: SegmentSink,
    {
        if let Some(reason) = self.termination {
            return ChannelStatus::Terminated(reason);
        }

        let Some(caster) = caster.filter(|caster| self.is_valid_caster(caster)) else {
            return self.terminate(TerminationReason::CasterInvalid, sink);
        };
        if self.cancelled {
            return self.terminate(TerminationReason::Cancelled, sink);
        }

        if let Some(overload) = find_overload(grid, &self.config, caster.position) {
            info!(
                "beam of actor {} overloaded: strand {} blocked at {:.2}",
                self.config.caster.get(),
                overload.strand,
                overload.distance
            );
            out.push(Command::ApplyExplosion {
                center: caster.cell,
                radius: self.config.explosion_radius,
                amount: self.config.damage_amount,
                armor_penetration: self.config.armor_penetration,
                kind: self.config.damage_kind,
                source: self.config.caster,
                excluded: vec![self.config.caster],
            });
            return self.terminate(TerminationReason::Overloaded, sink);
        }

        if self.state.elapsed_ticks >= self.config.total_duration_ticks {
            return self.terminate(TerminationReason::Expired, sink);
        }

        let geometry = BeamGeometry::from_positions(
            caster.position,
            self.config.target_position,
            self.config.strand_count,
        );
        self.visuals
            .refresh(grid, geometry.as_ref(), self.config.max_range, sink);

        if self.state.ticks_until_next_pulse == 0 {
            self.pulse(grid, geometry.as_ref(), caster.cell, out);
            self.state.ticks_until_next_pulse = self.config.pulse_interval_ticks;
        }

        self.state.elapsed_ticks = self.state.elapsed_ticks.saturating_add(1);
        self.state.ticks_until_next_pulse = self.state.ticks_until_next_pulse.saturating_sub(1);
        ChannelStatus::Active
    }

    fn is_valid_caster(&self, caster: &CasterSnapshot) -> bool {
        caster.actor == self.config.caster
            && caster.state == ActorState::Active
            && caster.grid == self.config.grid
    }

    fn pulse<G>(
        &mut self,
        grid: &G,
        geometry: Option<&BeamGeometry>,
        caster_cell: CellCoord,
        out: &mut Vec<Command>,
    ) where
        G: GridQuery,
    {
        let Some(geometry) = geometry else {
            return;
        };

        self.resolver.handle(
            grid,
            geometry,
            self.config.max_range,
            caster_cell,
            &mut self.cells,
        );
        if self.cells.is_empty() {
            return;
        }

        out.push(Command::ApplyAreaDamage {
            cells: self.cells.clone(),
            amount: self.config.damage_amount,
            armor_penetration: self.config.armor_penetration,
            kind: self.config.damage_kind,
            source: self.config.caster,
            excluded: vec![self.config.caster],
        });
    }

    fn terminate<S>(&mut self, reason: TerminationReason, sink: &mut S) -> ChannelStatus
    where
        S: SegmentSink,
    {
        debug!(
            "beam of actor {} terminated after {} ticks: {reason:?}",
            self.config.caster.get(),
            self.state.elapsed_ticks
        );
        self.visuals.release(sink);
        self.termination = Some(reason);
        ChannelStatus::Terminated(reason)
    }
}
