//! Bodies and the two-body pair they live in.
//!
//! The pair is a two-slot arena: bodies refer to their merge partner by
//! [`BodyId`] instead of holding a reference, so the back-link is non-owning
//! and can never dangle.

use glam::Vec3;

use crate::config::BodyParameters;

/// Index of a body inside its [`BodyPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BodyId {
    A,
    B,
}

impl BodyId {
    /// The other slot of the pair.
    pub fn other(self) -> Self {
        match self {
            BodyId::A => BodyId::B,
            BodyId::B => BodyId::A,
        }
    }

    fn index(self) -> usize {
        match self {
            BodyId::A => 0,
            BodyId::B => 1,
        }
    }
}

/// Kinematic state of one bubble.
#[derive(Debug, Clone)]
pub struct Body {
    /// Slot of this body in its pair
    pub id: BodyId,
    /// Center position in world space
    pub position: Vec3,
    /// Current velocity (units/s)
    pub velocity: Vec3,
    /// Radius, always > 0
    pub radius: f32,
    /// Mass, always > 0
    pub mass: f32,
    merged: bool,
    partner: Option<BodyId>,
}

impl Body {
    /// Create a free (unmerged) body.
    pub fn new(id: BodyId, position: Vec3, velocity: Vec3, radius: f32, mass: f32) -> Self {
        Self {
            id,
            position,
            velocity,
            radius,
            mass,
            merged: false,
            partner: None,
        }
    }

    /// Create a body from its configuration block.
    pub fn from_parameters(id: BodyId, params: &BodyParameters) -> Self {
        Self::new(
            id,
            Vec3::from_array(params.position),
            Vec3::from_array(params.velocity),
            params.radius,
            params.mass,
        )
    }

    /// Advance the position by one fixed step.
    pub fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
    }

    /// Linear momentum `m * v`.
    pub fn momentum(&self) -> Vec3 {
        self.velocity * self.mass
    }

    /// Whether this body has merged. Never reverts once true.
    pub fn is_merged(&self) -> bool {
        self.merged
    }

    /// The body this one merged with.
    pub fn partner(&self) -> Option<BodyId> {
        self.partner
    }

    /// Distance between the two centers.
    pub fn distance_to(&self, other: &Body) -> f32 {
        (other.position - self.position).length()
    }
}

/// The two bodies of the scene.
#[derive(Debug, Clone)]
pub struct BodyPair {
    bodies: [Body; 2],
}

impl BodyPair {
    /// Create a pair from two configuration blocks.
    pub fn new(a: &BodyParameters, b: &BodyParameters) -> Self {
        Self {
            bodies: [
                Body::from_parameters(BodyId::A, a),
                Body::from_parameters(BodyId::B, b),
            ],
        }
    }

    /// Create a pair from already built bodies. Ids are reassigned to slots.
    pub fn from_bodies(mut a: Body, mut b: Body) -> Self {
        a.id = BodyId::A;
        b.id = BodyId::B;
        Self { bodies: [a, b] }
    }

    /// Get a body by slot.
    pub fn get(&self, id: BodyId) -> &Body {
        &self.bodies[id.index()]
    }

    /// Get mutable access to a body by slot.
    pub fn get_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.index()]
    }

    /// Both bodies, A first.
    pub fn bodies(&self) -> &[Body; 2] {
        &self.bodies
    }

    /// Body A.
    pub fn a(&self) -> &Body {
        &self.bodies[0]
    }

    /// Body B.
    pub fn b(&self) -> &Body {
        &self.bodies[1]
    }

    /// Mutable access to both bodies at once.
    pub fn split_mut(&mut self) -> (&mut Body, &mut Body) {
        let [a, b] = &mut self.bodies;
        (a, b)
    }

    /// Integrate both bodies by one fixed step.
    pub fn step(&mut self, dt: f32) {
        for body in &mut self.bodies {
            body.step(dt);
        }
    }

    /// Total linear momentum of the pair.
    pub fn total_momentum(&self) -> Vec3 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Distance between the two centers.
    pub fn separation(&self) -> f32 {
        self.a().distance_to(self.b())
    }

    /// Midpoint between the two centers.
    pub fn midpoint(&self) -> Vec3 {
        (self.a().position + self.b().position) * 0.5
    }

    /// Whether the pair has merged.
    pub fn is_merged(&self) -> bool {
        self.a().merged && self.b().merged
    }

    /// Mark both bodies merged and link them to each other.
    ///
    /// Returns false if the pair was already merged.
    pub(crate) fn link(&mut self) -> bool {
        if self.is_merged() {
            return false;
        }
        let (a, b) = self.split_mut();
        a.merged = true;
        b.merged = true;
        a.partner = Some(b.id);
        b.partner = Some(a.id);
        true
    }
}

/// Pairwise contact test between two bodies.
pub struct ContactDetector;

impl ContactDetector {
    /// True iff `a` is still free and the centers are within the sum of radii.
    pub fn check(a: &Body, b: &Body) -> bool {
        !a.is_merged() && a.distance_to(b) <= a.radius + b.radius
    }

    /// Check the pair, A against B.
    pub fn check_pair(pair: &BodyPair) -> bool {
        Self::check(pair.a(), pair.b())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(id: BodyId, x: f32, vx: f32) -> Body {
        Body::new(id, Vec3::new(x, 0.0, 0.0), Vec3::new(vx, 0.0, 0.0), 1.5, 1.0)
    }

    #[test]
    fn test_body_creation() {
        let body = body(BodyId::A, -3.0, 0.6);
        assert_eq!(body.id, BodyId::A);
        assert!(!body.is_merged());
        assert!(body.partner().is_none());
    }

    #[test]
    fn test_step_integrates_velocity() {
        let mut body = body(BodyId::A, -3.0, 0.6);
        body.step(0.5);
        assert!((body.position.x - (-2.7)).abs() < 1e-6);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn test_other_id() {
        assert_eq!(BodyId::A.other(), BodyId::B);
        assert_eq!(BodyId::B.other(), BodyId::A);
    }

    #[test]
    fn test_contact_detection() {
        let a = body(BodyId::A, 0.0, 0.0);
        let touching = body(BodyId::B, 3.0, 0.0);
        let apart = body(BodyId::B, 3.01, 0.0);

        assert!(ContactDetector::check(&a, &touching)); // 3.0 <= 1.5 + 1.5
        assert!(!ContactDetector::check(&a, &apart));
    }

    #[test]
    fn test_contact_ignored_after_merge() {
        let mut pair = BodyPair::from_bodies(body(BodyId::A, 0.0, 0.0), body(BodyId::B, 1.0, 0.0));
        assert!(ContactDetector::check_pair(&pair));

        assert!(pair.link());
        assert!(!ContactDetector::check_pair(&pair));
    }

    #[test]
    fn test_link_is_symmetric_and_once() {
        let mut pair = BodyPair::from_bodies(body(BodyId::A, 0.0, 0.0), body(BodyId::B, 1.0, 0.0));
        assert!(pair.link());
        assert_eq!(pair.a().partner(), Some(BodyId::B));
        assert_eq!(pair.b().partner(), Some(BodyId::A));
        assert!(!pair.link());
        assert!(pair.is_merged());
    }

    #[test]
    fn test_pair_total_momentum() {
        let mut a = body(BodyId::A, -3.0, 0.6);
        a.mass = 2.0;
        let pair = BodyPair::from_bodies(a, body(BodyId::B, 3.0, -0.6));
        let momentum = pair.total_momentum();
        assert!((momentum.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_from_bodies_reassigns_ids() {
        let pair = BodyPair::from_bodies(body(BodyId::B, 0.0, 0.0), body(BodyId::B, 1.0, 0.0));
        assert_eq!(pair.a().id, BodyId::A);
        assert_eq!(pair.b().id, BodyId::B);
        assert!((pair.midpoint().x - 0.5).abs() < 1e-6);
    }
}
