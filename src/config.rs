//! Configuration module for the bubble fusion engine.
//!
//! This module defines the parameter structures for the simulation: the two
//! bodies, the merge behaviour, the shockwave cascade, the phase timings, the
//! glow decorations and the camera. Configurations are plain JSON and can be
//! built from named presets.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Kinematic parameters of one body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyParameters {
    /// Initial center position (x, y, z)
    pub position: [f32; 3],

    /// Initial velocity (units/s)
    pub velocity: [f32; 3],

    /// Radius (must be > 0)
    pub radius: f32,

    /// Mass (must be > 0)
    #[serde(default = "default_mass")]
    pub mass: f32,
}

fn default_mass() -> f32 {
    1.0
}

impl BodyParameters {
    /// The left-hand body of the classic scene.
    pub fn left() -> Self {
        Self {
            position: [-3.0, 0.0, 0.0],
            velocity: [0.6, 0.0, 0.0],
            radius: 1.5,
            mass: 1.0,
        }
    }

    /// The right-hand body of the classic scene.
    pub fn right() -> Self {
        Self {
            position: [3.0, 0.0, 0.0],
            velocity: [-0.6, 0.0, 0.0],
            radius: 1.5,
            mass: 1.0,
        }
    }
}

/// Parameters controlling what happens after contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeParameters {
    /// Speed at which each merged body sinks into the other (units/s)
    #[serde(default = "default_incrustation_rate")]
    pub incrustation_rate: f32,

    /// Growth speed of the bridge disk radius (units/s)
    #[serde(default = "default_bridge_growth")]
    pub bridge_growth_rate: f32,

    /// Bridge radius cap as a fraction of the body radius
    #[serde(default = "default_bridge_cap")]
    pub bridge_cap_fraction: f32,

    /// Number of outline samples per body for the planar silhouette
    #[serde(default = "default_outline_samples")]
    pub outline_samples: u32,
}

fn default_incrustation_rate() -> f32 {
    0.15
}

fn default_bridge_growth() -> f32 {
    0.8
}

fn default_bridge_cap() -> f32 {
    1.0
}

fn default_outline_samples() -> u32 {
    100
}

impl Default for MergeParameters {
    fn default() -> Self {
        Self {
            incrustation_rate: default_incrustation_rate(),
            bridge_growth_rate: default_bridge_growth(),
            bridge_cap_fraction: default_bridge_cap(),
            outline_samples: default_outline_samples(),
        }
    }
}

/// Parameters for the expanding shockwave rings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WavefrontParameters {
    /// Number of rings in the cascade
    #[serde(default = "default_ring_count")]
    pub count: u32,

    /// Expansion speed of the first ring (units/s)
    #[serde(default = "default_base_speed")]
    pub base_speed: f32,

    /// Per-ring speed decay factor, in (0, 1)
    #[serde(default = "default_speed_decay")]
    pub speed_decay: f32,

    /// Peak opacity of the first ring
    #[serde(default = "default_base_opacity")]
    pub base_opacity: f32,

    /// Per-ring opacity decay factor, in (0, 1)
    #[serde(default = "default_opacity_decay")]
    pub opacity_decay: f32,

    /// Stroke width of the first ring
    #[serde(default = "default_base_width")]
    pub base_stroke_width: f32,

    /// Per-ring stroke width decay factor, in (0, 1)
    #[serde(default = "default_width_decay")]
    pub stroke_width_decay: f32,

    /// Lower bound for the stroke width
    #[serde(default = "default_min_width")]
    pub min_stroke_width: f32,

    /// Progress of ring i at which ring i+1 starts
    #[serde(default = "default_activation_threshold")]
    pub activation_threshold: f32,

    /// Maximum ring radius as a fraction of the body radius
    #[serde(default = "default_radius_fraction")]
    pub radius_fraction: f32,
}

fn default_ring_count() -> u32 {
    4
}

fn default_base_speed() -> f32 {
    0.6
}

fn default_speed_decay() -> f32 {
    0.7
}

fn default_base_opacity() -> f32 {
    0.9
}

fn default_opacity_decay() -> f32 {
    0.75
}

fn default_base_width() -> f32 {
    6.0
}

fn default_width_decay() -> f32 {
    0.85
}

fn default_min_width() -> f32 {
    2.0
}

fn default_activation_threshold() -> f32 {
    0.5
}

fn default_radius_fraction() -> f32 {
    0.8
}

impl Default for WavefrontParameters {
    fn default() -> Self {
        Self {
            count: default_ring_count(),
            base_speed: default_base_speed(),
            speed_decay: default_speed_decay(),
            base_opacity: default_base_opacity(),
            opacity_decay: default_opacity_decay(),
            base_stroke_width: default_base_width(),
            stroke_width_decay: default_width_decay(),
            min_stroke_width: default_min_width(),
            activation_threshold: default_activation_threshold(),
            radius_fraction: default_radius_fraction(),
        }
    }
}

/// Timing and look of the choreography phases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseParameters {
    /// Time after contact before the camera starts rotating (s)
    #[serde(default = "default_expansion")]
    pub expansion_duration: f32,

    /// Length of the camera sweep (s)
    #[serde(default = "default_window")]
    pub rotation_duration: f32,

    /// Length of the body fade-out (s)
    #[serde(default = "default_window")]
    pub dissolve_duration: f32,

    /// Initial body fill opacity
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f32,

    /// Initial body stroke opacity
    #[serde(default = "default_stroke_opacity")]
    pub stroke_opacity: f32,
}

fn default_expansion() -> f32 {
    2.0
}

fn default_window() -> f32 {
    1.0
}

fn default_fill_opacity() -> f32 {
    0.10
}

fn default_stroke_opacity() -> f32 {
    0.35
}

impl Default for PhaseParameters {
    fn default() -> Self {
        Self {
            expansion_duration: default_expansion(),
            rotation_duration: default_window(),
            dissolve_duration: default_window(),
            fill_opacity: default_fill_opacity(),
            stroke_opacity: default_stroke_opacity(),
        }
    }
}

/// Decorative glow points riding on the interface plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlowParameters {
    /// Glows per ring (0 disables the decoration)
    #[serde(default = "default_glow_count")]
    pub count_per_ring: u32,

    /// Seed for the deterministic glow layout
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Outer radius of the zone where glows are placed
    #[serde(default = "default_zone_radius")]
    pub zone_radius: f32,

    /// Base ignition rate (opacity/s)
    #[serde(default = "default_ignite_rate")]
    pub ignite_rate: f32,

    /// Base fade rate (opacity/s)
    #[serde(default = "default_fade_rate")]
    pub fade_rate: f32,

    /// Base radial drift speed (units/s)
    #[serde(default = "default_drift_speed")]
    pub drift_speed: f32,

    /// Base core size
    #[serde(default = "default_core_size")]
    pub core_size: f32,

    /// Base halo size
    #[serde(default = "default_halo_size")]
    pub halo_size: f32,

    /// Height of the bob along the normal when a ring passes (0 disables)
    #[serde(default)]
    pub buoy_amplitude: f32,

    /// Radial half-width of a ring's influence on the bob
    #[serde(default = "default_buoy_width")]
    pub buoy_width: f32,
}

fn default_glow_count() -> u32 {
    20
}

fn default_seed() -> u64 {
    0x5eed_b0b1
}

fn default_zone_radius() -> f32 {
    0.35
}

fn default_ignite_rate() -> f32 {
    6.0
}

fn default_fade_rate() -> f32 {
    0.8
}

fn default_drift_speed() -> f32 {
    0.3
}

fn default_core_size() -> f32 {
    0.02
}

fn default_halo_size() -> f32 {
    0.05
}

fn default_buoy_width() -> f32 {
    0.2
}

impl Default for GlowParameters {
    fn default() -> Self {
        Self {
            count_per_ring: default_glow_count(),
            seed: default_seed(),
            zone_radius: default_zone_radius(),
            ignite_rate: default_ignite_rate(),
            fade_rate: default_fade_rate(),
            drift_speed: default_drift_speed(),
            core_size: default_core_size(),
            halo_size: default_halo_size(),
            buoy_amplitude: 0.0,
            buoy_width: default_buoy_width(),
        }
    }
}

/// Initial orbit camera placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraParameters {
    /// Initial azimuth in degrees
    #[serde(default = "default_azimuth")]
    pub azimuth_deg: f32,

    /// Elevation above the XY plane in degrees
    #[serde(default = "default_elevation")]
    pub elevation_deg: f32,

    /// Azimuth swept during the rotation phase, in degrees
    #[serde(default = "default_sweep")]
    pub sweep_deg: f32,

    /// Distance from the target
    #[serde(default = "default_distance")]
    pub distance: f32,
}

fn default_azimuth() -> f32 {
    30.0
}

fn default_elevation() -> f32 {
    20.0
}

fn default_sweep() -> f32 {
    180.0
}

fn default_distance() -> f32 {
    12.0
}

impl Default for CameraParameters {
    fn default() -> Self {
        Self {
            azimuth_deg: default_azimuth(),
            elevation_deg: default_elevation(),
            sweep_deg: default_sweep(),
            distance: default_distance(),
        }
    }
}

/// How the interface is presented to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GeometryMode {
    /// Flat circles in the XY plane with clipped outlines
    Planar,
    /// Spheres with an oriented interface disk
    #[default]
    Spatial,
}

/// Complete simulation configuration combining all parameter groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// First body
    pub body_a: BodyParameters,

    /// Second body
    pub body_b: BodyParameters,

    /// Merge and incrustation behaviour
    #[serde(default)]
    pub merge: MergeParameters,

    /// Shockwave cascade
    #[serde(default)]
    pub wavefronts: WavefrontParameters,

    /// Choreography timings
    #[serde(default)]
    pub phases: PhaseParameters,

    /// Decorative glows
    #[serde(default)]
    pub glow: GlowParameters,

    /// Orbit camera
    #[serde(default)]
    pub camera: CameraParameters,

    /// Planar or spatial presentation
    #[serde(default)]
    pub mode: GeometryMode,

    /// Fixed simulation time step in seconds
    pub dt: f32,

    /// Simulated-time safety ceiling in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit: f32,

    /// Optional frame-count safety ceiling
    #[serde(default)]
    pub max_frames: Option<u64>,
}

fn default_time_limit() -> f32 {
    20.0
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            body_a: BodyParameters::left(),
            body_b: BodyParameters::right(),
            merge: MergeParameters::default(),
            wavefronts: WavefrontParameters::default(),
            phases: PhaseParameters::default(),
            glow: GlowParameters::default(),
            camera: CameraParameters::default(),
            mode: GeometryMode::default(),
            dt: 0.03,
            time_limit: default_time_limit(),
            max_frames: None,
        }
    }
}

/// Names accepted by [`FusionConfig::preset`].
pub const PRESET_NAMES: &[&str] = &["classic", "planar", "protocosmos", "glow_buoy"];

impl FusionConfig {
    /// Build one of the named scene presets.
    ///
    /// * `classic` - two 1.5-radius spheres closing at 1.2 units/s
    /// * `planar` - the same scene drawn as flat circles with clipped outlines
    ///   and no glow decoration
    /// * `protocosmos` - 1.16-radius spheres starting 5 units apart at dt=0.05
    /// * `glow_buoy` - a single glow per ring that bobs as rings pass
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::default()),
            "planar" => {
                let mut config = Self::default();
                config.mode = GeometryMode::Planar;
                config.glow.count_per_ring = 0;
                Some(config)
            }
            "protocosmos" => {
                let radius = 1.16;
                let mut config = Self {
                    body_a: BodyParameters {
                        position: [-2.5, 0.0, 0.0],
                        velocity: [0.5, 0.0, 0.0],
                        radius,
                        mass: 1.0,
                    },
                    body_b: BodyParameters {
                        position: [2.5, 0.0, 0.0],
                        velocity: [-0.5, 0.0, 0.0],
                        radius,
                        mass: 1.0,
                    },
                    dt: 0.05,
                    ..Self::default()
                };
                config.camera.distance = 10.0;
                Some(config)
            }
            "glow_buoy" => {
                let mut config = Self::default();
                config.body_a.radius = 1.2;
                config.body_b.radius = 1.2;
                config.dt = 0.05;
                config.glow.count_per_ring = 1;
                config.glow.ignite_rate = 8.0;
                config.glow.core_size = 0.03;
                config.glow.halo_size = 0.08;
                config.glow.buoy_amplitude = 0.15;
                Some(config)
            }
            _ => None,
        }
    }

    /// Load configuration from a JSON file.
    ///
    /// The loaded configuration is validated before it is returned.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref()).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|error| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents =
            serde_json::to_string_pretty(self).map_err(|error| ConfigError::Serialize { error })?;
        fs::write(path.as_ref(), contents).map_err(|error| ConfigError::Io {
            path: path.as_ref().to_path_buf(),
            error,
        })
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, body) in [("body_a", &self.body_a), ("body_b", &self.body_b)] {
            check_positive(&format!("{}.radius", name), body.radius)?;
            check_positive(&format!("{}.mass", name), body.mass)?;
        }

        check_positive("dt", self.dt)?;
        check_positive("time_limit", self.time_limit)?;
        check_non_negative("merge.incrustation_rate", self.merge.incrustation_rate)?;
        check_non_negative("merge.bridge_growth_rate", self.merge.bridge_growth_rate)?;
        check_positive("merge.bridge_cap_fraction", self.merge.bridge_cap_fraction)?;

        let waves = &self.wavefronts;
        if waves.count == 0 {
            return Err(invalid("wavefronts.count", "at least one ring is required"));
        }
        check_positive("wavefronts.base_speed", waves.base_speed)?;
        check_positive("wavefronts.radius_fraction", waves.radius_fraction)?;
        check_unit_interval("wavefronts.base_opacity", waves.base_opacity)?;
        for (field, factor) in [
            ("speed_decay", waves.speed_decay),
            ("opacity_decay", waves.opacity_decay),
            ("stroke_width_decay", waves.stroke_width_decay),
        ] {
            if !(factor > 0.0 && factor < 1.0) {
                return Err(invalid(
                    &format!("wavefronts.{}", field),
                    "decay factor must lie in (0, 1)",
                ));
            }
        }
        if !(waves.activation_threshold > 0.0 && waves.activation_threshold <= 1.0) {
            return Err(invalid(
                "wavefronts.activation_threshold",
                "threshold must lie in (0, 1]",
            ));
        }

        check_non_negative("phases.expansion_duration", self.phases.expansion_duration)?;
        check_positive("phases.rotation_duration", self.phases.rotation_duration)?;
        check_positive("phases.dissolve_duration", self.phases.dissolve_duration)?;
        check_unit_interval("phases.fill_opacity", self.phases.fill_opacity)?;
        check_unit_interval("phases.stroke_opacity", self.phases.stroke_opacity)?;

        if self.glow.count_per_ring > 0 {
            if !(self.glow.zone_radius >= 0.1 && self.glow.zone_radius.is_finite()) {
                return Err(invalid("glow.zone_radius", "zone radius must be at least 0.1"));
            }
            check_positive("glow.ignite_rate", self.glow.ignite_rate)?;
            check_positive("glow.fade_rate", self.glow.fade_rate)?;
        }

        Ok(())
    }

    /// Radius used for the ring cap and the bridge cap.
    pub fn reference_radius(&self) -> f32 {
        self.body_a.radius
    }

    /// Maximum radius reached by every ring.
    pub fn ring_radius_max(&self) -> f32 {
        self.reference_radius() * self.wavefronts.radius_fraction
    }
}

fn check_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be positive, got {}", value)))
    }
}

fn check_non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, &format!("must not be negative, got {}", value)))
    }
}

fn check_unit_interval(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, &format!("must lie in [0, 1], got {}", value)))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Error types for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error when reading or writing configuration files
    Io {
        path: std::path::PathBuf,
        error: std::io::Error,
    },
    /// JSON parsing error
    Parse {
        path: std::path::PathBuf,
        error: serde_json::Error,
    },
    /// JSON serialization error
    Serialize { error: serde_json::Error },
    /// A parameter violates an engine invariant
    Invalid { field: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, error } => {
                write!(
                    formatter,
                    "Failed to read/write config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Parse { path, error } => {
                write!(
                    formatter,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    error
                )
            }
            ConfigError::Serialize { error } => {
                write!(formatter, "Failed to serialize config: {}", error)
            }
            ConfigError::Invalid { field, reason } => {
                write!(formatter, "Invalid config value '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { error, .. } => Some(error),
            ConfigError::Parse { error, .. } => Some(error),
            ConfigError::Serialize { error } => Some(error),
            ConfigError::Invalid { .. } => None,
        }
    }
}
