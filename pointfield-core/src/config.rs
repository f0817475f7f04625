//! Construction-time configuration for point fields
//!
//! Every parameter a field needs is carried explicitly in a [`FieldConfig`];
//! nothing is read from ambient state. Configurations can be built in code,
//! taken from one of the presets, or loaded from TOML:
//!
//! ```rust
//! use pointfield_core::{Domain, FieldConfig, Motion};
//!
//! let config = FieldConfig::from_toml_str(r#"
//!     [sampler]
//!     domain = "uniform_random_volume"
//!     count = 500
//!     bound = 2.5
//!
//!     [animation]
//!     motion = "float"
//! "#).unwrap();
//!
//! assert_eq!(config.sampler.domain, Domain::UniformRandomVolume);
//! assert_eq!(config.animation.motion, Motion::Float);
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Parametric family the initial points are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Domain {
    /// Uniform over the surface of a sphere of `radius`
    SphereSurface,
    /// Regular `slices` x `stacks` grid over a hyperbolic helicoid
    HyperbolicHelicoid,
    /// Uniform inside the cube `[-bound, bound]^3`
    UniformRandomVolume,
    /// Uniform over the faces of a `box_size` box turned by `orientation`
    BoxSurface,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::SphereSurface,
        Domain::HyperbolicHelicoid,
        Domain::UniformRandomVolume,
        Domain::BoxSurface,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::SphereSurface => "sphere_surface",
            Domain::HyperbolicHelicoid => "hyperbolic_helicoid",
            Domain::UniformRandomVolume => "uniform_random_volume",
            Domain::BoxSurface => "box_surface",
        }
    }

    /// Whether points carry (u, v) parameters that are re-evaluated every frame
    pub fn is_parametric(&self) -> bool {
        matches!(self, Domain::HyperbolicHelicoid)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        match name.as_str() {
            "sphere_surface" | "sphere" => Ok(Domain::SphereSurface),
            "hyperbolic_helicoid" | "helicoid" => Ok(Domain::HyperbolicHelicoid),
            "uniform_random_volume" | "volume" => Ok(Domain::UniformRandomVolume),
            "box_surface" | "box" => Ok(Domain::BoxSurface),
            _ => Err(Error::invalid_argument(format!("unknown domain '{}'", s))),
        }
    }
}

impl TryFrom<String> for Domain {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.as_str().to_string()
    }
}

/// How per-point colors are assigned at sampling time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "entries")]
pub enum ColorMode {
    /// Positions only; the renderer applies a uniform material color
    #[default]
    None,
    /// Each point picks one palette entry uniformly at random
    Palette(Vec<[f32; 3]>),
    /// Each channel drawn uniformly from `[0, 1)`
    Random,
}

impl ColorMode {
    pub fn validate(&self) -> Result<()> {
        if let ColorMode::Palette(entries) = self {
            if entries.is_empty() {
                return Err(Error::invalid_argument("color palette must not be empty"));
            }
            let in_range = entries
                .iter()
                .flatten()
                .all(|c| c.is_finite() && (0.0..=1.0).contains(c));
            if !in_range {
                return Err(Error::invalid_argument("palette channels must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

/// Parameters consumed by the sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub domain: Domain,
    /// Point count for the random domains. The helicoid uses `slices * stacks`.
    pub count: usize,
    /// Sphere radius
    pub radius: f32,
    /// Half extent of the random volume
    pub bound: f32,
    /// Full edge lengths of the sampled box
    pub box_size: [f32; 3],
    /// Fixed x, y, z Euler rotation of the sampled box, in radians
    pub orientation: [f32; 3],
    /// Helicoid grid resolution along u
    pub slices: usize,
    /// Helicoid grid resolution along v
    pub stacks: usize,
    /// Helicoid twist constant `t`
    pub twist: f32,
    /// Fixed RNG seed; `None` draws from OS entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub colors: ColorMode,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            domain: Domain::SphereSurface,
            count: 390,
            radius: 2.0,
            bound: 2.5,
            box_size: [3.0; 3],
            orientation: [0.0; 3],
            slices: 150,
            stacks: 150,
            twist: 5.0,
            seed: None,
            colors: ColorMode::None,
        }
    }
}

impl SamplerConfig {
    /// Number of points this configuration samples
    pub fn point_count(&self) -> Result<usize> {
        match self.domain {
            Domain::HyperbolicHelicoid => self.slices.checked_mul(self.stacks).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "helicoid grid {}x{} overflows the point count",
                    self.slices, self.stacks
                ))
            }),
            Domain::SphereSurface | Domain::UniformRandomVolume | Domain::BoxSurface => Ok(self.count),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.domain {
            Domain::SphereSurface => {
                ensure_count(self.count)?;
                ensure_non_negative("radius", self.radius)?;
            }
            Domain::UniformRandomVolume => {
                ensure_count(self.count)?;
                ensure_non_negative("bound", self.bound)?;
            }
            Domain::BoxSurface => {
                ensure_count(self.count)?;
                for edge in self.box_size {
                    ensure_non_negative("box edge", edge)?;
                }
                let [x, y, z] = self.box_size;
                if x * y + y * z + x * z <= 0.0 {
                    return Err(Error::invalid_argument(format!(
                        "box {:?} has no surface area",
                        self.box_size
                    )));
                }
                for angle in self.orientation {
                    ensure_finite("box orientation", angle)?;
                }
            }
            Domain::HyperbolicHelicoid => {
                if self.slices < 2 || self.stacks < 2 {
                    return Err(Error::invalid_argument(format!(
                        "helicoid needs at least 2 slices and 2 stacks, got {}x{}",
                        self.slices, self.stacks
                    )));
                }
                ensure_finite("twist", self.twist)?;
                self.point_count()?;
            }
        }
        self.colors.validate()
    }
}

/// Per-frame update rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    /// Points never move after sampling
    Static,
    /// Vertical sine bob around each sampled position
    #[default]
    Float,
    /// Full re-evaluation of the helicoid from stored (u, v) and time
    Helicoid,
    /// Instances chase orbiting targets and spin
    Swarm,
}

impl Motion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Motion::Static => "static",
            Motion::Float => "float",
            Motion::Helicoid => "helicoid",
            Motion::Swarm => "swarm",
        }
    }
}

impl FromStr for Motion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Motion::Static),
            "float" => Ok(Motion::Float),
            "helicoid" => Ok(Motion::Helicoid),
            "swarm" => Ok(Motion::Swarm),
            _ => Err(Error::invalid_argument(format!("unknown motion '{}'", s))),
        }
    }
}

/// Constants of the instanced-swarm motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Exponential approach rate toward the target, per second
    pub rate: f32,
    /// Angular speed of the target orbit in rad/s
    pub movement_speed: f32,
    /// Radius of the target orbit
    pub target_radius: f32,
    /// Per-instance phase multipliers for the x, y and z target components
    pub target_multipliers: [f32; 3],
    /// Spin of each instance about its local Y axis in rad/s
    pub spin_rate: f32,
    /// Seconds of elapsed time before instances start moving
    pub start_delay: f32,
    /// The swarm is split into this many groups; only the first one moves
    pub group_count: usize,
    /// Rewrite instance colors every frame
    pub animate_colors: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            // -ln(1 - 0.0085) * 60: a 0.0085 per-frame lerp at 60 fps
            rate: 0.512,
            movement_speed: 0.5,
            target_radius: 1.0,
            target_multipliers: [40.0, 4.0, 1.0],
            spin_rate: 2.9,
            start_delay: 2.0,
            group_count: 1,
            animate_colors: true,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("swarm rate", self.rate)?;
        ensure_finite("swarm movement_speed", self.movement_speed)?;
        ensure_finite("swarm target_radius", self.target_radius)?;
        for m in self.target_multipliers {
            ensure_finite("swarm target multiplier", m)?;
        }
        ensure_finite("swarm spin_rate", self.spin_rate)?;
        ensure_non_negative("swarm start_delay", self.start_delay)?;
        if self.group_count == 0 {
            return Err(Error::invalid_argument("swarm group_count must be at least 1"));
        }
        Ok(())
    }
}

/// Parameters consumed by the animator; replaceable at runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub motion: Motion,
    /// Time multiplier for float and helicoid motion
    pub speed: f32,
    /// Float motion offset amplitude
    pub amplitude: f32,
    /// Whole-field rotation rate about x, y, z in rad/s
    pub spin: [f32; 3],
    /// Fixed x, y, z Euler orientation of the whole field, applied before the spin
    pub base_rotation: [f32; 3],
    pub swarm: SwarmConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            motion: Motion::Float,
            speed: 1.0,
            amplitude: 0.06,
            spin: [0.0; 3],
            base_rotation: [0.0; 3],
            swarm: SwarmConfig::default(),
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("speed", self.speed)?;
        ensure_finite("amplitude", self.amplitude)?;
        for s in self.spin {
            ensure_finite("spin", s)?;
        }
        for r in self.base_rotation {
            ensure_finite("base_rotation", r)?;
        }
        self.swarm.validate()
    }
}

/// Complete description of a point field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FieldConfig {
    pub sampler: SamplerConfig,
    pub animation: AnimationConfig,
}

impl FieldConfig {
    /// 390 points on a radius-2 sphere tipped a quarter turn about x, gently bobbing
    pub fn particles_sphere() -> Self {
        Self {
            sampler: SamplerConfig {
                domain: Domain::SphereSurface,
                count: 390,
                radius: 2.0,
                ..SamplerConfig::default()
            },
            animation: AnimationConfig {
                motion: Motion::Float,
                base_rotation: [std::f32::consts::FRAC_PI_2, 0.0, 0.0],
                ..AnimationConfig::default()
            },
        }
    }

    /// 150 x 150 helicoid grid with a four-entry palette, turning about Y
    pub fn hyperbolic_helicoid() -> Self {
        Self {
            sampler: SamplerConfig {
                domain: Domain::HyperbolicHelicoid,
                slices: 150,
                stacks: 150,
                twist: 5.0,
                colors: ColorMode::Palette(vec![
                    [0.5, 0.5, 0.5],
                    [0.5, 0.5, 0.5],
                    [1.0, 1.0, 1.0],
                    [0.0, 0.33, 0.67],
                ]),
                ..SamplerConfig::default()
            },
            animation: AnimationConfig {
                motion: Motion::Helicoid,
                spin: [0.0, 0.5, 0.0],
                ..AnimationConfig::default()
            },
        }
    }

    /// 486 randomly colored instances on the faces of a tilted 3x3x3 box that
    /// start chasing orbit targets after two seconds
    pub fn surface_swarm() -> Self {
        Self {
            sampler: SamplerConfig {
                domain: Domain::BoxSurface,
                count: 486,
                box_size: [3.0; 3],
                orientation: [0.4, 0.2, 0.0],
                colors: ColorMode::Random,
                ..SamplerConfig::default()
            },
            animation: AnimationConfig {
                motion: Motion::Swarm,
                spin: [0.003, -0.03, 0.0],
                swarm: SwarmConfig::default(),
                ..AnimationConfig::default()
            },
        }
    }

    /// Look up a preset by name (`sphere`, `helicoid`, `swarm`)
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sphere" | "particles_sphere" => Ok(Self::particles_sphere()),
            "helicoid" | "hyperbolic_helicoid" => Ok(Self::hyperbolic_helicoid()),
            "swarm" | "surface_swarm" => Ok(Self::surface_swarm()),
            _ => Err(Error::invalid_argument(format!("unknown preset '{}'", name))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        self.animation.validate()?;
        if self.animation.motion == Motion::Helicoid && self.sampler.domain != Domain::HyperbolicHelicoid {
            return Err(Error::invalid_argument(format!(
                "helicoid motion needs the hyperbolic_helicoid domain, not {}",
                self.sampler.domain
            )));
        }
        Ok(())
    }

    /// Parse a TOML configuration. Unknown domain or motion names are
    /// reported as [`Error::InvalidArgument`], like their `FromStr` parsers.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = text.parse()?;
        if let Some(domain) = toml_name(&table, "sampler", "domain") {
            domain.parse::<Domain>()?;
        }
        if let Some(motion) = toml_name(&table, "animation", "motion") {
            motion.parse::<Motion>()?;
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Read a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!("loaded {} field config from {}", config.sampler.domain, path.display());
        Ok(config)
    }
}

fn toml_name<'a>(table: &'a toml::Table, section: &str, key: &str) -> Option<&'a str> {
    table.get(section)?.get(key)?.as_str()
}

fn ensure_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::invalid_argument("point count must be positive"));
    }
    Ok(())
}

fn ensure_finite(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_argument(format!("{} must be finite, got {}", name, value)));
    }
    Ok(())
}

fn ensure_non_negative(name: &str, value: f32) -> Result<()> {
    ensure_finite(name, value)?;
    if value < 0.0 {
        return Err(Error::invalid_argument(format!("{} must not be negative, got {}", name, value)));
    }
    Ok(())
}
