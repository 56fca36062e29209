//! Phase state machine sequencing camera rotation, fade-out and termination.
//!
//! Transitions are a table keyed on the time since merge (τ) and on whether
//! the wavefront cascade has dissipated. Camera azimuth and body opacity are
//! separate pure functions of the phase and τ, so nothing here depends on
//! the order in which a renderer consumes the results.

use serde::{Deserialize, Serialize};

use crate::config::PhaseParameters;

/// Stage of the choreography. Ordered: later variants compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhaseState {
    /// Bodies closing in, no contact yet
    Approaching,
    /// Rings spreading, camera held
    Expansion,
    /// Camera sweeping around the scene
    Rotating,
    /// Bodies fading out
    Dissolving,
    /// Only the rings remain
    WaveOnly,
    /// Nothing left to animate
    Terminated,
}

impl PhaseState {
    /// All phases in order.
    pub const ORDER: [PhaseState; 6] = [
        PhaseState::Approaching,
        PhaseState::Expansion,
        PhaseState::Rotating,
        PhaseState::Dissolving,
        PhaseState::WaveOnly,
        PhaseState::Terminated,
    ];
}

/// What the scheduler needs to know about the world this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseInputs {
    /// Seconds since merge
    pub elapsed: f32,
    /// Whether the last ring has reached its maximum
    pub cascade_dissipated: bool,
}

/// Phase timing windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimeline {
    pub expansion: f32,
    pub rotation: f32,
    pub dissolve: f32,
}

impl PhaseTimeline {
    /// Build from configuration.
    pub fn from_parameters(params: &PhaseParameters) -> Self {
        Self {
            expansion: params.expansion_duration,
            rotation: params.rotation_duration,
            dissolve: params.dissolve_duration,
        }
    }

    /// τ at which the camera starts rotating.
    pub fn rotation_start(&self) -> f32 {
        self.expansion
    }

    /// τ at which the bodies start dissolving.
    pub fn dissolve_start(&self) -> f32 {
        self.expansion + self.rotation
    }

    /// τ at which only the rings remain.
    pub fn wave_only_start(&self) -> f32 {
        self.expansion + self.rotation + self.dissolve
    }

    /// Camera sweep progress in [0, 1].
    pub fn rotation_progress(&self, elapsed: f32) -> f32 {
        window_progress(elapsed - self.rotation_start(), self.rotation)
    }

    /// Body fade progress in [0, 1].
    pub fn dissolve_progress(&self, elapsed: f32) -> f32 {
        window_progress(elapsed - self.dissolve_start(), self.dissolve)
    }
}

fn window_progress(into_window: f32, window: f32) -> f32 {
    if window <= 0.0 {
        return if into_window >= 0.0 { 1.0 } else { 0.0 };
    }
    (into_window / window).clamp(0.0, 1.0)
}

/// The single step out of `phase`, if its exit condition holds.
///
/// `Approaching` only leaves through [`PhaseScheduler::on_contact`].
pub fn transition(phase: PhaseState, timeline: &PhaseTimeline, inputs: PhaseInputs) -> Option<PhaseState> {
    let tau = inputs.elapsed;
    match phase {
        PhaseState::Approaching => None,
        PhaseState::Expansion if tau >= timeline.rotation_start() => Some(PhaseState::Rotating),
        PhaseState::Rotating if tau > timeline.dissolve_start() => Some(PhaseState::Dissolving),
        PhaseState::Dissolving if tau > timeline.wave_only_start() => Some(PhaseState::WaveOnly),
        PhaseState::WaveOnly if inputs.cascade_dissipated => Some(PhaseState::Terminated),
        _ => None,
    }
}

/// Camera and opacity outputs of the choreography.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseEffects {
    /// Fraction of the camera sweep done, in [0, 1]
    pub rotation_progress: f32,
    /// Multiplier on the bodies' initial opacities, in [0, 1]
    pub body_visibility: f32,
}

/// Pure mapping from phase and τ to camera/opacity effects.
pub fn effects(phase: PhaseState, timeline: &PhaseTimeline, elapsed: f32) -> PhaseEffects {
    match phase {
        PhaseState::Approaching | PhaseState::Expansion => PhaseEffects {
            rotation_progress: 0.0,
            body_visibility: 1.0,
        },
        PhaseState::Rotating => PhaseEffects {
            rotation_progress: timeline.rotation_progress(elapsed),
            body_visibility: 1.0,
        },
        PhaseState::Dissolving => PhaseEffects {
            rotation_progress: 1.0,
            body_visibility: 1.0 - timeline.dissolve_progress(elapsed),
        },
        PhaseState::WaveOnly | PhaseState::Terminated => PhaseEffects {
            rotation_progress: 1.0,
            body_visibility: 0.0,
        },
    }
}

/// Drives [`PhaseState`] forward.
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    phase: PhaseState,
    timeline: PhaseTimeline,
}

impl PhaseScheduler {
    /// Start in `Approaching`.
    pub fn new(timeline: PhaseTimeline) -> Self {
        Self {
            phase: PhaseState::Approaching,
            timeline,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PhaseState {
        self.phase
    }

    /// Timing windows.
    pub fn timeline(&self) -> &PhaseTimeline {
        &self.timeline
    }

    /// Whether the driving loop should stop.
    pub fn is_terminated(&self) -> bool {
        self.phase == PhaseState::Terminated
    }

    /// First contact: `Approaching → Expansion`. Ignored in any other phase.
    pub fn on_contact(&mut self) -> bool {
        if self.phase == PhaseState::Approaching {
            self.enter(PhaseState::Expansion);
            true
        } else {
            false
        }
    }

    /// Apply every transition whose condition holds for `inputs`.
    ///
    /// Returns the phases entered during this call, in order.
    pub fn advance(&mut self, inputs: PhaseInputs) -> Vec<PhaseState> {
        let mut entered = Vec::new();
        while let Some(next) = transition(self.phase, &self.timeline, inputs) {
            self.enter(next);
            entered.push(next);
        }
        entered
    }

    /// Effects for the current phase at τ = `elapsed`.
    pub fn effects(&self, elapsed: f32) -> PhaseEffects {
        effects(self.phase, &self.timeline, elapsed)
    }

    fn enter(&mut self, next: PhaseState) {
        debug_assert!(next > self.phase, "phase transitions must move forward");
        log::info!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
