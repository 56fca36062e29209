//! Cascade of expanding shockwave rings emitted from the interface.
//!
//! Ring `i` expands at `speed_0 * f_v^i` up to a shared maximum radius and
//! fades linearly as it grows. Ring `i + 1` starts the first tick ring `i`
//! has covered the activation fraction of the maximum radius, so the rings
//! trail each other, each slower and dimmer than the last.

use crate::config::WavefrontParameters;

/// Fraction of the maximum radius the last ring must reach to dissipate.
pub const DISSIPATION_PROGRESS: f32 = 0.99;

/// One expanding ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Wavefront {
    /// Position in the cascade
    pub index: usize,
    /// Expansion speed (units/s)
    pub speed: f32,
    /// Opacity at zero radius
    pub opacity_max: f32,
    /// Stroke width handed to the renderer
    pub stroke_width: f32,
    /// Current radius, monotone and capped
    pub radius: f32,
    /// Seconds spent active
    pub age: f32,
    /// Whether the ring has started
    pub active: bool,
    /// Whether the ring has been emitted at least once
    pub ever_added: bool,
}

impl Wavefront {
    /// Build ring `index` from the cascade parameters.
    pub fn new(index: usize, params: &WavefrontParameters) -> Self {
        let i = index as i32;
        Self {
            index,
            speed: params.base_speed * params.speed_decay.powi(i),
            opacity_max: params.base_opacity * params.opacity_decay.powi(i),
            stroke_width: (params.base_stroke_width * params.stroke_width_decay.powi(i))
                .max(params.min_stroke_width),
            radius: 0.0,
            age: 0.0,
            active: index == 0,
            ever_added: false,
        }
    }

    /// Fraction of `radius_max` covered, in [0, 1].
    pub fn progress(&self, radius_max: f32) -> f32 {
        if radius_max > 0.0 {
            (self.radius / radius_max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Current opacity, fading linearly to zero at `radius_max`.
    pub fn opacity(&self, radius_max: f32) -> f32 {
        let ceiling = self.opacity_max.max(0.0);
        (self.opacity_max * (1.0 - self.progress(radius_max))).clamp(0.0, ceiling)
    }
}

/// All rings of one merge.
#[derive(Debug, Clone)]
pub struct WavefrontCascade {
    rings: Vec<Wavefront>,
    radius_max: f32,
    activation_threshold: f32,
}

impl WavefrontCascade {
    /// Create the cascade. Only the first ring starts active.
    pub fn new(params: &WavefrontParameters, radius_max: f32) -> Self {
        let rings = (0..params.count as usize)
            .map(|index| Wavefront::new(index, params))
            .collect();

        Self {
            rings,
            radius_max,
            activation_threshold: params.activation_threshold,
        }
    }

    /// Advance every active ring by one step.
    ///
    /// A ring started during this call is also processed in this call, with
    /// zero age.
    pub fn update(&mut self, dt: f32) {
        let radius_max = self.radius_max;
        let count = self.rings.len();

        for i in 0..count {
            let ring = &mut self.rings[i];
            if !ring.active {
                continue;
            }
            ring.ever_added = true;
            ring.radius = (ring.age * ring.speed).min(radius_max).max(ring.radius);
            let progress = ring.progress(radius_max);
            ring.age += dt;

            if i + 1 < count && !self.rings[i + 1].active && progress >= self.activation_threshold {
                self.rings[i + 1].active = true;
                log::debug!("Wavefront {} activated at progress {:.2} of ring {}", i + 1, progress, i);
            }
        }
    }

    /// All rings, active or not.
    pub fn rings(&self) -> &[Wavefront] {
        &self.rings
    }

    /// Rings that have started.
    pub fn active_rings(&self) -> impl Iterator<Item = &Wavefront> {
        self.rings.iter().filter(|ring| ring.active)
    }

    /// Number of rings that have started.
    pub fn active_count(&self) -> usize {
        self.active_rings().count()
    }

    /// Shared maximum radius.
    pub fn radius_max(&self) -> f32 {
        self.radius_max
    }

    /// True once the last ring is active and has nearly reached the maximum.
    pub fn is_dissipated(&self) -> bool {
        self.rings
            .last()
            .is_some_and(|last| last.active && last.radius >= self.radius_max * DISSIPATION_PROGRESS)
    }
}
