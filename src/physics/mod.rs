//! Physics modules
//!
//! Contains the models behind a two-body merge:
//! - Body: kinematic state, pair arena and contact detection
//! - Interface: contact normal, chord height, outline clipping, oriented disk
//! - Merge: momentum-conserving resolution and incrustation
//! - Wavefront: cascade of expanding shockwave rings
//! - Glow: decorative glow clusters riding the interface plane

pub mod body;
pub mod interface;
pub mod merge;
pub mod wavefront;
pub mod glow;

pub use body::{Body, BodyId, BodyPair, ContactDetector};
pub use interface::{DiskOrientation, InterfaceGeometry};
pub use merge::{MergeResolver, MergeState};
pub use wavefront::{Wavefront, WavefrontCascade};
pub use glow::{GlowField, GlowStage, PlacedGlow};
