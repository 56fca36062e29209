//! Fixed-timestep driver tying the physics and the choreography together.
//!
//! Per tick: integrate the bodies, incrust them if merged, otherwise test for
//! contact and merge on the first hit. Once merged, refresh the interface,
//! grow the rings, update the glows and advance the phase. Every tick ends
//! with an immutable [`FrameSnapshot`].

use crate::choreography::{AzimuthSweep, CameraRig, PhaseInputs, PhaseScheduler, PhaseState, PhaseTimeline};
use crate::config::{ConfigError, FusionConfig, GeometryMode};
use crate::physics::body::{BodyPair, ContactDetector};
use crate::physics::glow::GlowField;
use crate::physics::interface::clipped_outline;
use crate::physics::merge::{MergeResolver, MergeState};
use crate::physics::wavefront::WavefrontCascade;
use crate::snapshot::{
    BodySnapshot, CameraSnapshot, FrameSnapshot, GlowSnapshot, InterfaceSnapshot, RingSnapshot,
};

/// What the renderer reports back before a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFeedback {
    /// Whether the drawn bodies visually touch. Gates the merge only.
    pub bodies_closed: bool,
}

impl Default for RenderFeedback {
    fn default() -> Self {
        Self { bodies_closed: true }
    }
}

/// Why [`FusionSimulation::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The choreography finished
    Terminated,
    /// Simulated time reached `time_limit`
    TimeLimit,
    /// Frame count reached `max_frames`
    FrameLimit,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub time: f32,
    /// Simulated time of first contact
    pub merge_time: Option<f32>,
    pub final_phase: PhaseState,
    pub stop_reason: StopReason,
}

/// The whole scene: two bodies, their merge and its aftermath.
// put id:'sim_tick_loop', label:'Fixed-step tick loop', input:'final_config.internal', output:'frame_snapshot.internal'
pub struct FusionSimulation {
    config: FusionConfig,
    pair: BodyPair,
    resolver: MergeResolver,
    merge: Option<MergeState>,
    cascade: WavefrontCascade,
    glows: GlowField,
    scheduler: PhaseScheduler,
    camera: CameraRig,
    sweep: AzimuthSweep,
    frame: u64,
    time: f32,
    merge_time: Option<f32>,
}

impl FusionSimulation {
    /// Build the scene from a configuration.
    pub fn new(config: FusionConfig) -> Self {
        let pair = BodyPair::new(&config.body_a, &config.body_b);
        let resolver = MergeResolver::new(
            config.merge.incrustation_rate,
            config.merge.bridge_growth_rate,
            config.merge.bridge_cap_fraction * config.reference_radius(),
        );
        let cascade = WavefrontCascade::new(&config.wavefronts, config.ring_radius_max());
        let glows = GlowField::new(&config.glow, config.wavefronts.count as usize);
        let scheduler = PhaseScheduler::new(PhaseTimeline::from_parameters(&config.phases));
        let mut camera = CameraRig::new(&config.camera);
        camera.target = pair.midpoint();
        let sweep = AzimuthSweep::from_parameters(&config.camera);

        Self {
            config,
            pair,
            resolver,
            merge: None,
            cascade,
            glows,
            scheduler,
            camera,
            sweep,
            frame: 0,
            time: 0.0,
            merge_time: None,
        }
    }

    /// Validate the configuration, then build the scene.
    pub fn try_new(config: FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn pair(&self) -> &BodyPair {
        &self.pair
    }

    /// Merge state, present from the tick of first contact.
    pub fn merge_state(&self) -> Option<&MergeState> {
        self.merge.as_ref()
    }

    pub fn cascade(&self) -> &WavefrontCascade {
        &self.cascade
    }

    pub fn glows(&self) -> &GlowField {
        &self.glows
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn phase(&self) -> PhaseState {
        self.scheduler.phase()
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time in seconds.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Simulated time of first contact.
    pub fn merge_time(&self) -> Option<f32> {
        self.merge_time
    }

    /// Whether the driving loop should stop.
    pub fn is_terminated(&self) -> bool {
        self.scheduler.is_terminated()
    }

    /// Advance one step with the bodies assumed visually closed.
    pub fn tick(&mut self) -> FrameSnapshot {
        self.tick_with(RenderFeedback::default())
    }

    /// Advance one step.
    pub fn tick_with(&mut self, feedback: RenderFeedback) -> FrameSnapshot {
        let dt = self.config.dt;
        self.time += dt;

        self.pair.step(dt);

        if self.merge.is_some() {
            self.resolver.incrust(&mut self.pair, dt);
        } else if feedback.bodies_closed
            && ContactDetector::check_pair(&self.pair)
            && let Some(state) = self.resolver.resolve(&mut self.pair)
        {
            self.merge = Some(state);
            self.merge_time = Some(self.time);
            self.scheduler.on_contact();
        }

        let mut elapsed = None;
        if let Some(state) = self.merge.as_mut() {
            let tau = state.elapsed;
            self.resolver.refresh(&self.pair, state);
            self.cascade.update(dt);
            self.glows.update(&self.cascade, dt);

            let entered = self.scheduler.advance(PhaseInputs {
                elapsed: tau,
                cascade_dissipated: self.cascade.is_dissipated(),
            });
            if entered.contains(&PhaseState::WaveOnly) {
                self.glows.clear();
                log::debug!("Glow decorations removed");
            }

            state.elapsed += dt;
            elapsed = Some(tau);
        }

        let effects = self.scheduler.effects(elapsed.unwrap_or(0.0));
        self.camera.target = self.pair.midpoint();
        self.camera.set_azimuth(self.sweep.at(effects.rotation_progress));

        let snapshot = self.snapshot(elapsed, effects.body_visibility);
        self.frame += 1;
        snapshot
    }

    /// Tick until `Terminated` or a safety ceiling, handing every frame to `sink`.
    pub fn run<F>(&mut self, mut sink: F) -> RunSummary
    where
        F: FnMut(&FrameSnapshot),
    {
        log::info!(
            "Running fusion simulation: dt={}, time limit {}s, frame limit {:?}",
            self.config.dt,
            self.config.time_limit,
            self.config.max_frames
        );

        let stop_reason = loop {
            let snapshot = self.tick();
            sink(&snapshot);

            if snapshot.is_terminal() {
                break StopReason::Terminated;
            }
            if self.time >= self.config.time_limit {
                log::warn!(
                    "Time limit {}s reached in phase {:?}",
                    self.config.time_limit,
                    self.phase()
                );
                break StopReason::TimeLimit;
            }
            if self.config.max_frames.is_some_and(|max| self.frame >= max) {
                log::warn!("Frame limit reached after {} frames in phase {:?}", self.frame, self.phase());
                break StopReason::FrameLimit;
            }
        };

        let summary = RunSummary {
            frames: self.frame,
            time: self.time,
            merge_time: self.merge_time,
            final_phase: self.phase(),
            stop_reason,
        };
        log::info!(
            "Simulation stopped ({:?}) after {} frames, {:.2}s",
            summary.stop_reason,
            summary.frames,
            summary.time
        );
        summary
    }

    fn snapshot(&self, elapsed: Option<f32>, visibility: f32) -> FrameSnapshot {
        let interface = self.merge.as_ref().map(|state| &state.interface);
        let fill = (self.config.phases.fill_opacity * visibility).clamp(0.0, 1.0);
        let stroke = (self.config.phases.stroke_opacity * visibility).clamp(0.0, 1.0);

        let bodies = self.pair.bodies().clone().map(|body| {
            let outline = match self.config.mode {
                GeometryMode::Planar => {
                    clipped_outline(&body, interface, self.config.merge.outline_samples)
                }
                GeometryMode::Spatial => Vec::new(),
            };
            BodySnapshot::new(&body, fill, stroke, outline)
        });

        let (rings, glows) = match interface {
            Some(interface) => {
                let radius_max = self.cascade.radius_max();
                let rings = self
                    .cascade
                    .active_rings()
                    .map(|ring| RingSnapshot::new(ring, radius_max, interface))
                    .collect();
                let glows = self
                    .glows
                    .place(interface, &self.cascade)
                    .iter()
                    .map(|glow| GlowSnapshot::new(glow, interface))
                    .collect();
                (rings, glows)
            }
            None => (Vec::new(), Vec::new()),
        };

        FrameSnapshot {
            frame: self.frame,
            time: self.time,
            phase: self.scheduler.phase(),
            merge_elapsed: elapsed,
            bodies,
            interface: interface.map(InterfaceSnapshot::from),
            rings,
            glows,
            camera: CameraSnapshot::from(&self.camera),
        }
    }
}
