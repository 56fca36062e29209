//! Choreography of the merge aftermath
//!
//! - Phase: forward-only state machine and its pure camera/opacity effects
//! - Camera: orbit rig swept by the rotation phase

pub mod camera;
pub mod phase;

pub use camera::{AzimuthSweep, CameraRig};
pub use phase::{PhaseEffects, PhaseInputs, PhaseScheduler, PhaseState, PhaseTimeline};
