//! Per-frame rewriting of sampled point buffers
//!
//! Every animator mutates the buffer in place, never resizes it, and marks it
//! dirty when contents changed. All per-frame state is allocated up front when
//! the animator is built, so a steady-state frame performs no heap allocation.

use log::trace;
use nalgebra::Vector3;
use pointfield_core::{
    AnimationConfig, Color3f, Error, FrameTime, Motion, PointBuffer, Result, SamplerConfig,
    SwarmConfig, Transform3D, COMPONENTS,
};

use crate::sampler::{evaluate_helicoid, Sample, SampleParameters};

/// Seconds of color phase offset between consecutive swarm instances
const SWARM_COLOR_STAGGER: f32 = 0.1;

/// Trait for per-frame point buffer updates
pub trait Animate {
    /// Rewrite `buffer` for the frame described by `time`
    fn animate(&mut self, buffer: &mut PointBuffer, time: FrameTime) -> Result<()>;

    /// Per-instance transforms, for animators that drive instanced meshes
    fn instances(&self) -> Option<&[Transform3D]> {
        None
    }
}

fn check_count(expected: usize, buffer: &PointBuffer, what: &str) -> Result<()> {
    if expected != buffer.count() {
        return Err(Error::InvalidState(format!(
            "{} animator holds {} points but the buffer has {}",
            what,
            expected,
            buffer.count()
        )));
    }
    Ok(())
}

/// Vertical sine bob around each point's sampled position.
///
/// `y = base_y + amplitude * sin(speed * t + i)`. The offset is absolute, so the
/// field stays within `amplitude` of where it was sampled no matter how long it runs.
#[derive(Debug, Clone)]
pub struct FloatAnimator {
    base: Vec<f32>,
    amplitude: f32,
    speed: f32,
}

impl FloatAnimator {
    pub fn new(buffer: &PointBuffer, amplitude: f32, speed: f32) -> Self {
        Self {
            base: buffer.positions().to_vec(),
            amplitude,
            speed,
        }
    }

    /// Sampled positions the offsets are applied to
    pub fn base(&self) -> &[f32] {
        &self.base
    }

    pub fn set_constants(&mut self, amplitude: f32, speed: f32) {
        self.amplitude = amplitude;
        self.speed = speed;
    }
}

impl Animate for FloatAnimator {
    fn animate(&mut self, buffer: &mut PointBuffer, time: FrameTime) -> Result<()> {
        check_count(self.base.len() / COMPONENTS, buffer, "float")?;

        let phase = self.speed * time.elapsed;
        for (i, (out, base)) in buffer
            .positions_mut()
            .chunks_exact_mut(COMPONENTS)
            .zip(self.base.chunks_exact(COMPONENTS))
            .enumerate()
        {
            out[1] = base[1] + (phase + i as f32).sin() * self.amplitude;
        }
        buffer.mark_dirty();
        Ok(())
    }
}

/// Re-evaluates the hyperbolic helicoid from stored (u, v) at `speed * t`
#[derive(Debug, Clone)]
pub struct HelicoidAnimator {
    uv: Vec<[f32; 2]>,
    twist: f32,
    speed: f32,
}

impl HelicoidAnimator {
    pub fn new(uv: Vec<[f32; 2]>, twist: f32, speed: f32) -> Self {
        Self { uv, twist, speed }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }
}

impl Animate for HelicoidAnimator {
    fn animate(&mut self, buffer: &mut PointBuffer, time: FrameTime) -> Result<()> {
        check_count(self.uv.len(), buffer, "helicoid")?;
        evaluate_helicoid(&self.uv, self.twist, self.speed * time.elapsed, buffer.positions_mut())?;
        buffer.mark_dirty();
        Ok(())
    }
}

/// Instanced swarm: each instance eases toward an orbiting target and spins.
///
/// The approach uses `factor = 1 - exp(-rate * dt)` so the visual speed is the
/// same at any frame rate. The buffer positions mirror the instance translations.
#[derive(Debug, Clone)]
pub struct SwarmAnimator {
    transforms: Vec<Transform3D>,
    config: SwarmConfig,
    spin: Transform3D,
}

impl SwarmAnimator {
    pub fn new(buffer: &PointBuffer, config: SwarmConfig) -> Self {
        let transforms = buffer
            .iter()
            .map(|p| Transform3D::translation(p.coords))
            .collect();
        Self {
            transforms,
            config,
            spin: Transform3D::identity(),
        }
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SwarmConfig) {
        self.config = config;
    }

    /// Number of instances that move: the first of `group_count` groups
    pub fn active_count(&self) -> usize {
        self.transforms.len().div_ceil(self.config.group_count.max(1))
    }

    /// Orbit target of instance `index` at elapsed time `elapsed`
    pub fn target(&self, index: usize, elapsed: f32) -> Vector3<f32> {
        let angle = self.config.movement_speed * elapsed;
        let i = index as f32;
        let [mx, my, mz] = self.config.target_multipliers;
        Vector3::new(
            (angle + i * mx).cos(),
            (angle + i * my).sin(),
            (angle + i * mz).sin(),
        ) * self.config.target_radius
    }

    /// Instance color at elapsed time `elapsed`
    pub fn color(index: usize, elapsed: f32) -> Color3f {
        let t = elapsed + index as f32 * SWARM_COLOR_STAGGER;
        Color3f::new(t.cos(), (t * 10.0).sin(), 0.0).clamped()
    }
}

impl Animate for SwarmAnimator {
    fn animate(&mut self, buffer: &mut PointBuffer, time: FrameTime) -> Result<()> {
        check_count(self.transforms.len(), buffer, "swarm")?;
        if time.elapsed < self.config.start_delay {
            return Ok(());
        }

        // A negative or NaN step would turn the easing factor into an extrapolation
        let dt = time.delta.max(0.0);
        let factor = 1.0 - (-self.config.rate * dt).exp();
        self.spin = Transform3D::rotation_y(self.config.spin_rate * dt);
        let active = self.active_count();
        let animate_colors = self.config.animate_colors;

        let (positions, mut colors) = buffer.attributes_mut();
        for i in 0..active {
            let target = self.target(i, time.elapsed);
            let transform = &mut self.transforms[i];
            let next = transform.position().lerp(&target, factor);
            transform.set_position(&next);
            transform.multiply_in_place(&self.spin);

            let p = i * COMPONENTS;
            positions[p..p + COMPONENTS].copy_from_slice(next.as_slice());

            if let (true, Some(colors)) = (animate_colors, colors.as_deref_mut()) {
                colors[p..p + COMPONENTS].copy_from_slice(&Self::color(i, time.elapsed).to_array());
            }
        }
        buffer.mark_dirty();
        Ok(())
    }

    fn instances(&self) -> Option<&[Transform3D]> {
        Some(&self.transforms)
    }
}

/// Animator selected by [`Motion`]
#[derive(Debug, Clone)]
pub enum Animator {
    Static,
    Float(FloatAnimator),
    Helicoid(HelicoidAnimator),
    Swarm(SwarmAnimator),
}

impl Animator {
    /// Build the animator for a freshly sampled field
    pub fn for_sample(sample: &Sample, sampler: &SamplerConfig, config: &AnimationConfig) -> Result<Self> {
        config.validate()?;
        if sample.parameters.len() != sample.buffer.count() {
            return Err(Error::InvalidState(format!(
                "{} sample parameters for {} points",
                sample.parameters.len(),
                sample.buffer.count()
            )));
        }

        Ok(match config.motion {
            Motion::Static => Animator::Static,
            Motion::Float => Animator::Float(FloatAnimator::new(&sample.buffer, config.amplitude, config.speed)),
            Motion::Helicoid => match &sample.parameters {
                SampleParameters::Uv(uv) => Animator::Helicoid(HelicoidAnimator::new(uv.clone(), sampler.twist, config.speed)),
                SampleParameters::Indexed { .. } => {
                    return Err(Error::InvalidArgument(format!(
                        "helicoid motion needs (u, v) parameters, but {} samples are indexed",
                        sample.domain
                    )))
                }
            },
            Motion::Swarm => Animator::Swarm(SwarmAnimator::new(&sample.buffer, config.swarm.clone())),
        })
    }

    pub fn motion(&self) -> Motion {
        match self {
            Animator::Static => Motion::Static,
            Animator::Float(_) => Motion::Float,
            Animator::Helicoid(_) => Motion::Helicoid,
            Animator::Swarm(_) => Motion::Swarm,
        }
    }

    /// Replace animation constants in place. The motion kind cannot change
    /// without re-sampling, since each kind keeps different per-point state.
    pub fn reconfigure(&mut self, config: &AnimationConfig) -> Result<()> {
        config.validate()?;
        if config.motion != self.motion() {
            return Err(Error::InvalidArgument(format!(
                "cannot switch motion from {:?} to {:?} on a live field; rebuild it instead",
                self.motion(),
                config.motion
            )));
        }
        match self {
            Animator::Static => {}
            Animator::Float(a) => a.set_constants(config.amplitude, config.speed),
            Animator::Helicoid(a) => a.set_speed(config.speed),
            Animator::Swarm(a) => a.set_config(config.swarm.clone()),
        }
        Ok(())
    }
}

impl Animate for Animator {
    fn animate(&mut self, buffer: &mut PointBuffer, time: FrameTime) -> Result<()> {
        trace!("animating {:?} frame {} at t={:.3}", self.motion(), time.frame, time.elapsed);
        match self {
            Animator::Static => Ok(()),
            Animator::Float(a) => a.animate(buffer, time),
            Animator::Helicoid(a) => a.animate(buffer, time),
            Animator::Swarm(a) => a.animate(buffer, time),
        }
    }

    fn instances(&self) -> Option<&[Transform3D]> {
        match self {
            Animator::Swarm(a) => a.instances(),
            _ => None,
        }
    }
}
