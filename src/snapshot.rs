//! Immutable per-tick views of the simulation handed to renderers and exporters

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::choreography::{CameraRig, PhaseState};
use crate::physics::body::{Body, BodyId};
use crate::physics::glow::{HALO_STROKE_RATIO, PlacedGlow};
use crate::physics::interface::InterfaceGeometry;
use crate::physics::wavefront::Wavefront;

/// One body as it should be drawn this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub position: Vec3,
    pub radius: f32,
    /// Unit sphere to world: scale by radius, then translate
    pub transform: Mat4,
    pub fill_opacity: f32,
    pub stroke_opacity: f32,
    pub merged: bool,
    /// Clipped silhouette, planar mode only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outline: Vec<Vec3>,
}

impl BodySnapshot {
    /// Snapshot `body` drawn at the given opacities.
    pub fn new(body: &Body, fill_opacity: f32, stroke_opacity: f32, outline: Vec<Vec3>) -> Self {
        Self {
            id: body.id,
            position: body.position,
            radius: body.radius,
            transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(body.radius),
                Quat::IDENTITY,
                body.position,
            ),
            fill_opacity,
            stroke_opacity,
            merged: body.is_merged(),
            outline,
        }
    }
}

/// Interface disk between the merged bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterfaceSnapshot {
    pub center: Vec3,
    pub normal: Vec3,
    pub chord_height: f32,
    pub bridge_radius: f32,
    /// Rotation axis taking +Z onto the normal
    pub axis: Vec3,
    /// Rotation angle (radians)
    pub angle: f32,
}

impl From<&InterfaceGeometry> for InterfaceSnapshot {
    fn from(interface: &InterfaceGeometry) -> Self {
        Self {
            center: interface.center,
            normal: interface.normal,
            chord_height: interface.chord_height,
            bridge_radius: interface.bridge_radius,
            axis: interface.orientation.axis,
            angle: interface.orientation.angle,
        }
    }
}

/// An active shockwave ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingSnapshot {
    pub index: usize,
    pub center: Vec3,
    pub radius: f32,
    pub opacity: f32,
    pub stroke_width: f32,
    pub axis: Vec3,
    pub angle: f32,
}

impl RingSnapshot {
    /// Ring `ring` lying on `interface`.
    pub fn new(ring: &Wavefront, radius_max: f32, interface: &InterfaceGeometry) -> Self {
        Self {
            index: ring.index,
            center: interface.center,
            radius: ring.radius,
            opacity: ring.opacity(radius_max),
            stroke_width: ring.stroke_width,
            axis: interface.orientation.axis,
            angle: interface.orientation.angle,
        }
    }

    /// GPU instance view of this ring.
    pub fn to_instance(&self) -> RingInstance {
        RingInstance {
            center: self.center.to_array(),
            radius: self.radius,
            axis: self.axis.to_array(),
            angle: self.angle,
            opacity: self.opacity,
            stroke_width: self.stroke_width,
            index: self.index as f32,
            _padding: 0.0,
        }
    }
}

/// Ring instance data for a renderer's instance buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct RingInstance {
    // Placement (8 floats)
    pub center: [f32; 3],
    pub radius: f32,
    pub axis: [f32; 3],
    pub angle: f32,

    // Appearance (4 floats)
    pub opacity: f32,
    pub stroke_width: f32,
    pub index: f32,
    pub _padding: f32,
}

/// A visible glow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowSnapshot {
    pub ring: usize,
    pub position: Vec3,
    pub core_opacity: f32,
    pub halo_opacity: f32,
    /// Opacity of the halo's outline
    pub halo_stroke_opacity: f32,
    pub core_size: f32,
    pub halo_size: f32,
    /// Halo orientation, shared with the interface
    pub axis: Vec3,
    pub angle: f32,
}

impl GlowSnapshot {
    pub fn new(glow: &PlacedGlow, interface: &InterfaceGeometry) -> Self {
        Self {
            ring: glow.ring,
            position: glow.position,
            core_opacity: glow.core_opacity,
            halo_opacity: glow.halo_opacity,
            halo_stroke_opacity: glow.halo_opacity * HALO_STROKE_RATIO,
            core_size: glow.core_size,
            halo_size: glow.halo_size,
            axis: interface.orientation.axis,
            angle: interface.orientation.angle,
        }
    }
}

/// Camera pose for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl From<&CameraRig> for CameraSnapshot {
    fn from(camera: &CameraRig) -> Self {
        Self {
            azimuth: camera.azimuth,
            elevation: camera.elevation,
            distance: camera.distance,
            position: camera.position(),
            target: camera.target,
        }
    }
}

/// Everything a renderer needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Zero-based tick index
    pub frame: u64,
    /// Simulated time at the end of the tick (seconds)
    pub time: f32,
    pub phase: PhaseState,
    /// Seconds since merge, absent before contact
    pub merge_elapsed: Option<f32>,
    pub bodies: [BodySnapshot; 2],
    pub interface: Option<InterfaceSnapshot>,
    pub rings: Vec<RingSnapshot>,
    pub glows: Vec<GlowSnapshot>,
    pub camera: CameraSnapshot,
}

impl FrameSnapshot {
    /// Instance buffer contents for the active rings.
    pub fn ring_instances(&self) -> Vec<RingInstance> {
        self.rings.iter().map(RingSnapshot::to_instance).collect()
    }

    /// Whether the driving loop stops after this frame.
    pub fn is_terminal(&self) -> bool {
        self.phase == PhaseState::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::BodyPair;

    #[test]
    fn test_ring_instance_size() {
        // 12 floats, tightly packed
        assert_eq!(std::mem::size_of::<RingInstance>(), 48);
    }

    #[test]
    fn test_ring_instance_bytes() {
        let ring = RingSnapshot {
            index: 2,
            center: Vec3::new(1.0, 2.0, 3.0),
            radius: 0.5,
            opacity: 0.25,
            stroke_width: 4.0,
            axis: Vec3::Y,
            angle: 1.0,
        };
        let instances = [ring.to_instance()];
        let floats: &[f32] = bytemuck::cast_slice(&instances);
        assert_eq!(floats.len(), 12);
        assert_eq!(&floats[0..4], &[1.0, 2.0, 3.0, 0.5]);
        assert_eq!(floats[10], 2.0);
    }

    #[test]
    fn test_body_transform_scales_unit_sphere() {
        let body = Body::new(BodyId::A, Vec3::new(1.0, -2.0, 0.5), Vec3::ZERO, 1.5, 1.0);
        let snapshot = BodySnapshot::new(&body, 0.1, 0.35, Vec::new());

        let surface = snapshot.transform.transform_point3(Vec3::X);
        assert!((surface - Vec3::new(2.5, -2.0, 0.5)).length() < 1e-6);
        assert!(!snapshot.merged);
    }

    #[test]
    fn test_outline_omitted_when_empty() {
        let body = Body::new(BodyId::B, Vec3::ZERO, Vec3::ZERO, 1.0, 1.0);
        let snapshot = BodySnapshot::new(&body, 0.1, 0.35, Vec::new());
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("outline"));

        let with_outline = BodySnapshot::new(&body, 0.1, 0.35, vec![Vec3::X]);
        let json = serde_json::to_string(&with_outline).unwrap();
        assert!(json.contains("outline"));
    }

    #[test]
    fn test_glow_snapshot_halo_stroke() {
        let a = Body::new(BodyId::A, Vec3::ZERO, Vec3::ZERO, 1.5, 1.0);
        let b = Body::new(BodyId::B, Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, 1.5, 1.0);
        let mut pair = BodyPair::from_bodies(a, b);
        pair.link();
        let interface = InterfaceGeometry::compute(&pair, 0.0);

        let placed = PlacedGlow {
            ring: 1,
            position: Vec3::new(0.0, 1.0, 0.2),
            core_opacity: 0.8,
            halo_opacity: 0.24,
            core_size: 0.02,
            halo_size: 0.05,
        };
        let snapshot = GlowSnapshot::new(&placed, &interface);
        assert!((snapshot.halo_stroke_opacity - 0.12).abs() < 1e-6);
        assert_eq!(snapshot.axis, interface.orientation.axis);
        assert_eq!(snapshot.ring, 1);
    }

    #[test]
    fn test_interface_snapshot_carries_orientation() {
        let a = Body::new(BodyId::A, Vec3::ZERO, Vec3::ZERO, 1.5, 1.0);
        let b = Body::new(BodyId::B, Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO, 1.5, 1.0);
        let mut pair = BodyPair::from_bodies(a, b);
        pair.link();
        let interface = InterfaceGeometry::compute(&pair, 0.4);

        let snapshot = InterfaceSnapshot::from(&interface);
        assert_eq!(snapshot.center, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(snapshot.bridge_radius, 0.4);
        assert!((snapshot.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }
}
