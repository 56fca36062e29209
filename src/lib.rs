//! Bubble Fusion Library
//!
//! Two-body contact and merge engine with its aftermath:
//! - Momentum-conserving merge with incrustation
//! - Oriented interface disk and clipped planar outlines
//! - Cascading shockwave rings and glow decorations
//! - Phase choreography driving camera and opacity

pub mod config;
pub mod physics;
pub mod choreography;
pub mod snapshot;
pub mod simulation;
pub mod export;

pub use config::FusionConfig;
pub use simulation::{FusionSimulation, RenderFeedback};
pub use snapshot::FrameSnapshot;
