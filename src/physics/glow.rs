//! Glow points that flare up on the interface plane as the rings pass.
//!
//! Each ring owns a cluster of glows scattered over the interface disk. A glow
//! waits until its ring has swept past it, ignites quickly, then fades slowly
//! while drifting outward. Offsets are kept in disk-local coordinates and
//! carried onto the live interface plane every frame.

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::interface::InterfaceGeometry;
use super::wavefront::WavefrontCascade;
use crate::config::GlowParameters;

/// Innermost trigger radius of a glow.
const MIN_TRIGGER_RADIUS: f32 = 0.1;

/// Halo opacity relative to the core.
pub const HALO_OPACITY_RATIO: f32 = 0.3;

/// Halo outline opacity relative to the halo fill.
pub const HALO_STROKE_RATIO: f32 = 0.5;

/// Lifecycle of one glow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlowStage {
    /// Waiting for its ring
    Dormant,
    /// Brightening toward its peak
    Igniting,
    /// Dimming toward zero
    Fading,
    /// Finished or cleared; never shown again
    Spent,
}

/// One decorative glow.
#[derive(Debug, Clone)]
pub struct Glow {
    /// Position in disk-local coordinates (z = 0)
    pub offset: Vec3,
    /// Ring radius at which the glow is triggered
    pub trigger_radius: f32,
    /// Unit outward drift direction in disk-local coordinates
    pub radial_direction: Vec3,
    pub ignite_rate: f32,
    pub fade_rate: f32,
    /// Peak core opacity
    pub brightness: f32,
    /// Wait after the ring passes before igniting
    pub delay: f32,
    pub drift_speed: f32,
    pub core_size: f32,
    pub halo_size: f32,
    pub stage: GlowStage,
    pub opacity: f32,
    waited: f32,
}

impl Glow {
    /// Draw a glow from the decoration parameters.
    fn sample(rng: &mut StdRng, params: &GlowParameters) -> Self {
        // Non-finite or undersized zones collapse onto the innermost radius
        let zone_radius = params.zone_radius;
        let trigger_radius = if zone_radius > MIN_TRIGGER_RADIUS && zone_radius.is_finite() {
            rng.gen_range(MIN_TRIGGER_RADIUS..=zone_radius)
        } else {
            MIN_TRIGGER_RADIUS
        };
        let angle = rng.gen_range(0.0..TAU);
        let (sin, cos) = angle.sin_cos();
        let radial_direction = Vec3::new(cos, sin, 0.0);

        Self {
            offset: radial_direction * trigger_radius,
            trigger_radius,
            radial_direction,
            ignite_rate: params.ignite_rate * rng.gen_range(0.7..1.3),
            fade_rate: params.fade_rate * rng.gen_range(0.6..1.4),
            brightness: rng.gen_range(0.5..1.0),
            delay: rng.gen_range(0.0..0.15),
            drift_speed: params.drift_speed * rng.gen_range(0.8..1.2),
            core_size: params.core_size * rng.gen_range(0.8..1.2),
            halo_size: params.halo_size * rng.gen_range(0.8..1.2),
            stage: GlowStage::Dormant,
            opacity: 0.0,
            waited: 0.0,
        }
    }

    /// Whether the glow should be drawn.
    pub fn is_visible(&self) -> bool {
        matches!(self.stage, GlowStage::Igniting | GlowStage::Fading)
    }

    /// Advance by one step given the radius of the ring that owns it.
    fn advance(&mut self, ring_radius: f32, dt: f32) {
        if self.stage == GlowStage::Dormant && ring_radius >= self.trigger_radius {
            self.waited += dt;
            if self.waited >= self.delay {
                self.stage = GlowStage::Igniting;
            }
        }

        match self.stage {
            GlowStage::Igniting => {
                self.opacity = (self.opacity + self.ignite_rate * dt).min(self.brightness);
                if self.opacity >= self.brightness {
                    self.stage = GlowStage::Fading;
                }
            }
            GlowStage::Fading => {
                self.opacity = (self.opacity - self.fade_rate * dt).max(0.0);
                if self.opacity <= 0.0 {
                    self.stage = GlowStage::Spent;
                }
            }
            GlowStage::Dormant | GlowStage::Spent => {}
        }

        if self.is_visible() {
            self.offset += self.radial_direction * self.drift_speed * dt;
        }
    }

    fn clear(&mut self) {
        self.stage = GlowStage::Spent;
        self.opacity = 0.0;
    }
}

/// A glow placed in world space for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlow {
    /// Ring the glow belongs to
    pub ring: usize,
    pub position: Vec3,
    pub core_opacity: f32,
    pub halo_opacity: f32,
    pub core_size: f32,
    pub halo_size: f32,
}

/// Bob along the normal caused by rings passing near `radius`.
///
/// Each active ring within `width` of the glow lifts it by
/// `amplitude * cos²(π/2 · gap / width)`.
pub fn buoy_offset(cascade: &WavefrontCascade, radius: f32, amplitude: f32, width: f32) -> f32 {
    if amplitude == 0.0 || width <= 0.0 {
        return 0.0;
    }

    cascade
        .active_rings()
        .map(|ring| (ring.radius - radius).abs())
        .filter(|gap| *gap < width)
        .map(|gap| amplitude * ((gap / width) * FRAC_PI_2).cos().powi(2))
        .sum()
}

/// Every glow cluster of the scene, one per ring.
#[derive(Debug, Clone)]
pub struct GlowField {
    clusters: Vec<Vec<Glow>>,
    buoy_amplitude: f32,
    buoy_width: f32,
    cleared: bool,
}

impl GlowField {
    /// Seed `ring_count` clusters deterministically from `params.seed`.
    pub fn new(params: &GlowParameters, ring_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(params.seed);
        let clusters = (0..ring_count)
            .map(|_| {
                (0..params.count_per_ring)
                    .map(|_| Glow::sample(&mut rng, params))
                    .collect()
            })
            .collect();

        Self {
            clusters,
            buoy_amplitude: params.buoy_amplitude,
            buoy_width: params.buoy_width,
            cleared: false,
        }
    }

    /// Clusters, indexed by ring.
    pub fn clusters(&self) -> &[Vec<Glow>] {
        &self.clusters
    }

    /// Whether [`GlowField::clear`] has run.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    /// Advance the clusters of every active ring.
    ///
    /// Call after the cascade has been updated for this tick. When ring `i`
    /// has just started, the cluster of ring `i - 2` is cleared so that at
    /// most two clusters are lit at once.
    pub fn update(&mut self, cascade: &WavefrontCascade, dt: f32) {
        if self.cleared {
            return;
        }

        for ring in cascade.active_rings() {
            let index = ring.index;
            if index >= self.clusters.len() {
                continue;
            }

            if index >= 2 && ring.age < dt * 2.0 {
                let stale = &mut self.clusters[index - 2];
                if stale.iter().any(|glow| glow.stage != GlowStage::Spent) {
                    log::debug!("Clearing glow cluster {} as ring {} starts", index - 2, index);
                    stale.iter_mut().for_each(Glow::clear);
                }
            }

            for glow in &mut self.clusters[index] {
                glow.advance(ring.radius, dt);
            }
        }
    }

    /// Remove every glow for good.
    pub fn clear(&mut self) {
        for glow in self.clusters.iter_mut().flatten() {
            glow.clear();
        }
        self.cleared = true;
    }

    /// World-space placement of every visible glow on the current interface.
    pub fn place(&self, interface: &InterfaceGeometry, cascade: &WavefrontCascade) -> Vec<PlacedGlow> {
        let mut placed = Vec::new();

        for (ring, cluster) in self.clusters.iter().enumerate() {
            for glow in cluster.iter().filter(|glow| glow.is_visible()) {
                let lift = buoy_offset(cascade, glow.trigger_radius, self.buoy_amplitude, self.buoy_width);
                let halo_opacity = glow.opacity * HALO_OPACITY_RATIO;
                placed.push(PlacedGlow {
                    ring,
                    position: interface.place(glow.offset) + interface.normal * lift,
                    core_opacity: glow.opacity,
                    halo_opacity,
                    core_size: glow.core_size,
                    halo_size: glow.halo_size,
                });
            }
        }

        placed
    }

    /// Number of glows currently visible.
    pub fn visible_count(&self) -> usize {
        self.clusters
            .iter()
            .flatten()
            .filter(|glow| glow.is_visible())
            .count()
    }
}
