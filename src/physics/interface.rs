//! Flat interface geometry between two merged bodies.
//!
//! # Geometry Background
//!
//! ## Chord height
//! A circle of radius `r` cut by a line at distance `d` from its center has a
//! chord of length `2 * sqrt(r² - d²)`. With the interface at the midpoint of
//! the centers, `d` is half the separation.
//!
//! ## Oriented disk
//! The interface disk is modelled in the XY plane (axis +Z) and rotated onto
//! the contact normal with an axis-angle rotation. Points attached to the
//! plane are carried along with the Rodrigues formula:
//!
//! ```text
//! v_rot = v cosθ + (k × v) sinθ + k (k · v)(1 - cosθ)
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::body::{Body, BodyId, BodyPair};

/// Separations below this are treated as coincident centers.
pub const COINCIDENT_EPSILON: f32 = 1e-3;

/// Cross products shorter than this are treated as parallel axes.
pub const PARALLEL_EPSILON: f32 = 1e-3;

/// Normal used when the two centers coincide.
pub const FALLBACK_NORMAL: Vec3 = Vec3::X;

/// Axis of the canonical, unrotated disk.
pub const DISK_AXIS: Vec3 = Vec3::Z;

/// Unit vector from `from` toward `to`, or [`FALLBACK_NORMAL`] when they coincide.
pub fn contact_normal(from: Vec3, to: Vec3) -> Vec3 {
    let delta = to - from;
    let distance = delta.length();
    if distance < COINCIDENT_EPSILON {
        FALLBACK_NORMAL
    } else {
        delta / distance
    }
}

/// Length of the chord cut from a circle of `radius` by a plane at
/// `half_separation` from its center. Zero once the plane is outside.
pub fn chord_height(radius: f32, half_separation: f32) -> f32 {
    let d = half_separation;
    if d < radius {
        2.0 * (radius * radius - d * d).sqrt()
    } else {
        0.0
    }
}

/// Axis-angle rotation carrying the canonical disk axis onto a normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskOrientation {
    /// Unit rotation axis
    pub axis: Vec3,
    /// Rotation angle in radians, in [0, π]
    pub angle: f32,
}

impl DiskOrientation {
    /// No rotation.
    pub const IDENTITY: Self = Self {
        axis: DISK_AXIS,
        angle: 0.0,
    };

    /// Rotation taking [`DISK_AXIS`] onto `normal`.
    ///
    /// When the normal is antiparallel to the disk axis the cross product
    /// vanishes, and a half turn about +X is used instead.
    pub fn from_normal(normal: Vec3) -> Self {
        let cross = DISK_AXIS.cross(normal);
        let cross_norm = cross.length();
        let dot = DISK_AXIS.dot(normal);

        if cross_norm > PARALLEL_EPSILON {
            Self {
                axis: cross / cross_norm,
                angle: dot.clamp(-1.0, 1.0).acos(),
            }
        } else if dot < 0.0 {
            Self {
                axis: Vec3::X,
                angle: PI,
            }
        } else {
            Self::IDENTITY
        }
    }

    /// Whether this is the antiparallel half-turn.
    pub fn is_half_turn(&self) -> bool {
        (self.angle - PI).abs() < 1e-6 && self.axis == Vec3::X
    }

    /// Rotate a vector with the Rodrigues formula.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        if self.angle == 0.0 {
            return v;
        }
        let k = self.axis;
        let (sin, cos) = self.angle.sin_cos();
        v * cos + k.cross(v) * sin + k * k.dot(v) * (1.0 - cos)
    }

    /// The same rotation as a quaternion, for renderers that want one.
    pub fn to_quat(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle)
    }
}

impl Default for DiskOrientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Interface between two merged bodies, recomputed every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceGeometry {
    /// Unit normal pointing from body A toward body B
    pub normal: Vec3,
    /// Midpoint of the two centers
    pub center: Vec3,
    /// Distance between the two centers
    pub separation: f32,
    /// Chord length of body A's circle at the interface
    pub chord_height: f32,
    /// Current bridge disk radius
    pub bridge_radius: f32,
    /// Rotation placing the canonical disk on the interface plane
    pub orientation: DiskOrientation,
}

impl InterfaceGeometry {
    /// Compute the interface for a merged pair.
    ///
    /// `bridge_radius` is supplied by the caller, see [`bridge_radius`].
    pub fn compute(pair: &BodyPair, bridge_radius: f32) -> Self {
        let a = pair.a();
        let b = pair.b();
        let normal = contact_normal(a.position, b.position);
        let separation = a.distance_to(b);

        Self {
            normal,
            center: (a.position + b.position) * 0.5,
            separation,
            chord_height: chord_height(a.radius, separation / 2.0),
            bridge_radius,
            orientation: DiskOrientation::from_normal(normal),
        }
    }

    /// Recompute in place after the bodies moved.
    pub fn recompute(&mut self, pair: &BodyPair, bridge_radius: f32) {
        *self = Self::compute(pair, bridge_radius);
    }

    /// Normal as seen from `id`, pointing toward its partner.
    pub fn normal_from(&self, id: BodyId) -> Vec3 {
        match id {
            BodyId::A => self.normal,
            BodyId::B => -self.normal,
        }
    }

    /// Place a point given in disk-local coordinates onto the interface plane.
    pub fn place(&self, local_offset: Vec3) -> Vec3 {
        self.center + self.orientation.rotate(local_offset)
    }
}

/// Bridge disk radius after `elapsed` seconds of merge.
///
/// Grows linearly and is clamped into `[0, cap]`.
pub fn bridge_radius(elapsed: f32, growth_rate: f32, cap: f32) -> f32 {
    (elapsed * growth_rate).clamp(0.0, cap.max(0.0))
}

/// Sample a body's silhouette in the XY plane, flattened against the interface.
///
/// Samples are spaced uniformly in angle. Without an interface the full
/// circle is returned. With one, samples facing the partner that lie beyond
/// the interface line are pulled back onto it.
pub fn clipped_outline(body: &Body, interface: Option<&InterfaceGeometry>, samples: u32) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(samples as usize);

    for i in 0..samples {
        let angle = TAU * i as f32 / samples as f32;
        let (sin, cos) = angle.sin_cos();
        let direction = Vec3::new(cos, sin, 0.0);
        let mut point = body.position + direction * body.radius;

        if let Some(interface) = interface {
            let to_interface = (interface.center - body.position).truncate();
            let normal = interface.normal_from(body.id).truncate();

            if direction.truncate().dot(to_interface) > 0.0 {
                let past_plane = (point.truncate() - interface.center.truncate()).dot(normal);
                if past_plane > 0.0 {
                    point -= (normal * past_plane).extend(0.0);
                }
            }
        }

        points.push(point);
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn merged_pair(separation: f32) -> BodyPair {
        let a = Body::new(BodyId::A, Vec3::new(-separation / 2.0, 0.0, 0.0), Vec3::ZERO, 1.5, 1.0);
        let b = Body::new(BodyId::B, Vec3::new(separation / 2.0, 0.0, 0.0), Vec3::ZERO, 1.5, 1.0);
        let mut pair = BodyPair::from_bodies(a, b);
        pair.link();
        pair
    }

    #[test]
    fn test_chord_height_known_value() {
        let height = chord_height(1.5, 1.0);
        let expected = 2.0 * (1.5_f32 * 1.5 - 1.0).sqrt();
        assert!((height - expected).abs() < 1e-6);
        assert!((height - 2.236).abs() < 1e-3);
    }

    #[test]
    fn test_chord_height_outside_is_zero() {
        assert_eq!(chord_height(1.5, 1.5), 0.0);
        assert_eq!(chord_height(1.5, 4.0), 0.0);
    }

    #[test]
    fn test_chord_height_at_center_is_diameter() {
        assert!((chord_height(1.5, 0.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_normal_fallback_on_coincident_centers() {
        let normal = contact_normal(Vec3::ONE, Vec3::ONE);
        assert_eq!(normal, Vec3::X);

        let normal = contact_normal(Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0));
        assert!((normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_rotation_onto_x_is_quarter_turn_about_y() {
        let orientation = DiskOrientation::from_normal(Vec3::X);
        assert!((orientation.angle - FRAC_PI_2).abs() < 1e-6);
        assert!((orientation.axis.abs() - Vec3::Y).length() < 1e-6);
        // Z x X = +Y
        assert!((orientation.axis - Vec3::Y).length() < 1e-6);

        let rotated = orientation.rotate(Vec3::Z);
        assert!((rotated - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_rotation_onto_negative_z_uses_half_turn() {
        let orientation = DiskOrientation::from_normal(Vec3::NEG_Z);
        assert!(orientation.is_half_turn());

        let rotated = orientation.rotate(Vec3::new(0.3, 0.4, 0.5));
        assert!((rotated - Vec3::new(0.3, -0.4, -0.5)).length() < 1e-6);
    }

    #[test]
    fn test_rotation_onto_z_is_identity() {
        let orientation = DiskOrientation::from_normal(Vec3::Z);
        assert_eq!(orientation, DiskOrientation::IDENTITY);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(orientation.rotate(v), v);
    }

    #[test]
    fn test_rodrigues_matches_quaternion() {
        let normals = [
            Vec3::new(1.0, 1.0, 0.0).normalize(),
            Vec3::new(-0.3, 0.2, 0.9).normalize(),
            Vec3::new(0.0, -1.0, -1.0).normalize(),
        ];
        let v = Vec3::new(0.25, -0.1, 0.4);

        for normal in normals {
            let orientation = DiskOrientation::from_normal(normal);
            let by_formula = orientation.rotate(v);
            let by_quat = orientation.to_quat() * v;
            assert!(
                (by_formula - by_quat).length() < 1e-5,
                "Rodrigues mismatch for normal {:?}",
                normal
            );
            // The disk axis must land on the normal
            assert!((orientation.rotate(DISK_AXIS) - normal).length() < 1e-5);
        }
    }

    #[test]
    fn test_rotation_keeps_plane_points_in_plane() {
        let normal = Vec3::new(0.6, 0.0, 0.8);
        let orientation = DiskOrientation::from_normal(normal);
        let in_plane = orientation.rotate(Vec3::new(0.3, -0.2, 0.0));
        assert!(in_plane.dot(normal).abs() < 1e-6);
    }

    #[test]
    fn test_interface_compute() {
        let pair = merged_pair(2.0);
        let interface = InterfaceGeometry::compute(&pair, 0.4);

        assert!((interface.normal - Vec3::X).length() < 1e-6);
        assert!(interface.center.length() < 1e-6);
        assert!((interface.chord_height - 2.0 * (1.25_f32).sqrt()).abs() < 1e-5);
        assert!((interface.bridge_radius - 0.4).abs() < 1e-6);
        assert_eq!(interface.normal_from(BodyId::B), Vec3::NEG_X);
    }

    #[test]
    fn test_bridge_radius_growth_and_cap() {
        assert!((bridge_radius(0.5, 0.8, 1.5) - 0.4).abs() < 1e-6);
        assert!((bridge_radius(10.0, 0.8, 1.5) - 1.5).abs() < 1e-6);
        assert_eq!(bridge_radius(-1.0, 0.8, 1.5), 0.0);
    }

    #[test]
    fn test_outline_without_interface_is_circle() {
        let body = Body::new(BodyId::A, Vec3::new(1.0, 2.0, 0.0), Vec3::ZERO, 1.5, 1.0);
        let outline = clipped_outline(&body, None, 100);
        assert_eq!(outline.len(), 100);
        for point in &outline {
            assert!(((*point - body.position).length() - 1.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_outline_is_flattened_at_interface() {
        let pair = merged_pair(2.0);
        let interface = InterfaceGeometry::compute(&pair, 0.0);

        for id in [BodyId::A, BodyId::B] {
            let body = pair.get(id);
            let outline = clipped_outline(body, Some(&interface), 100);
            let toward = interface.normal_from(id);

            for point in &outline {
                // Nothing crosses the interface line at x = 0
                let past = (*point - interface.center).dot(toward);
                assert!(past <= 1e-5, "sample crosses interface: {:?}", point);
                assert!(point.is_finite());
            }

            // The sample pointing straight at the partner sits on the plane
            let facing = if id == BodyId::A { outline[0] } else { outline[50] };
            assert!(facing.x.abs() < 1e-5);
        }
    }

    #[test]
    fn test_outline_far_side_untouched() {
        let pair = merged_pair(2.0);
        let interface = InterfaceGeometry::compute(&pair, 0.0);
        let body = pair.a();
        let outline = clipped_outline(body, Some(&interface), 100);

        // Sample at angle π faces away from B
        let away = outline[50];
        assert!((away - Vec3::new(-2.5, 0.0, 0.0)).length() < 1e-5);
    }
}
