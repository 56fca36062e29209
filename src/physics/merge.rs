//! Merge resolution and post-contact incrustation.

use glam::Vec3;

use super::body::BodyPair;
use super::interface::{InterfaceGeometry, bridge_radius};

/// State owned by the pair from the tick of first contact.
#[derive(Debug, Clone)]
pub struct MergeState {
    /// Interface geometry, refreshed every tick
    pub interface: InterfaceGeometry,
    /// Seconds since contact (τ)
    pub elapsed: f32,
    /// Common velocity assigned at contact
    pub merged_velocity: Vec3,
}

impl MergeState {
    /// Unit normal from body A toward body B.
    pub fn contact_normal(&self) -> Vec3 {
        self.interface.normal
    }

    /// Midpoint of the two centers.
    pub fn contact_center(&self) -> Vec3 {
        self.interface.center
    }

    /// Current bridge disk radius.
    pub fn interface_radius(&self) -> f32 {
        self.interface.bridge_radius
    }
}

/// Perfectly inelastic velocity shared by both bodies after contact.
pub fn inelastic_velocity(mass_a: f32, velocity_a: Vec3, mass_b: f32, velocity_b: Vec3) -> Vec3 {
    (velocity_a * mass_a + velocity_b * mass_b) / (mass_a + mass_b)
}

/// Applies the one-time merge and the per-tick incrustation.
#[derive(Debug, Clone)]
pub struct MergeResolver {
    /// Approach speed of each body after merge (units/s)
    pub incrustation_rate: f32,
    /// Bridge radius growth (units/s)
    pub bridge_growth_rate: f32,
    /// Bridge radius cap
    pub bridge_cap: f32,
}

impl MergeResolver {
    /// Create a resolver.
    pub fn new(incrustation_rate: f32, bridge_growth_rate: f32, bridge_cap: f32) -> Self {
        Self {
            incrustation_rate,
            bridge_growth_rate,
            bridge_cap,
        }
    }

    /// Merge the pair, conserving momentum.
    ///
    /// Returns the new merge state, or `None` if the pair had already merged.
    pub fn resolve(&self, pair: &mut BodyPair) -> Option<MergeState> {
        if pair.is_merged() {
            return None;
        }

        let (a, b) = pair.split_mut();
        let velocity = inelastic_velocity(a.mass, a.velocity, b.mass, b.velocity);
        a.velocity = velocity;
        b.velocity = velocity;
        pair.link();

        let interface = InterfaceGeometry::compute(pair, self.bridge_radius(0.0));
        log::info!(
            "Bodies merged at separation {:.3}, common velocity ({:.3}, {:.3}, {:.3})",
            interface.separation,
            velocity.x,
            velocity.y,
            velocity.z
        );

        Some(MergeState {
            interface,
            elapsed: 0.0,
            merged_velocity: velocity,
        })
    }

    /// Draw the merged bodies toward each other by one step.
    ///
    /// Both bodies move by the same amount in opposite directions, so the
    /// midpoint is unchanged. The step never exceeds half the separation.
    pub fn incrust(&self, pair: &mut BodyPair, dt: f32) {
        if !pair.is_merged() {
            return;
        }

        let (a, b) = pair.split_mut();
        let delta = b.position - a.position;
        let distance = delta.length();
        if distance <= 0.0 {
            return;
        }

        let direction = delta / distance;
        let step = (self.incrustation_rate * dt).min(distance / 2.0);
        a.position += direction * step;
        b.position -= direction * step;
    }

    /// Bridge radius after `elapsed` seconds of merge.
    pub fn bridge_radius(&self, elapsed: f32) -> f32 {
        bridge_radius(elapsed, self.bridge_growth_rate, self.bridge_cap)
    }

    /// Refresh the interface for the current positions and merge time.
    pub fn refresh(&self, pair: &BodyPair, state: &mut MergeState) {
        let radius = self.bridge_radius(state.elapsed);
        state.interface.recompute(pair, radius);
    }
}
