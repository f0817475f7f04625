//! The point field component: sampling, per-frame animation and buffer hand-off
//!
//! A [`ProceduralPointField`] goes through three states:
//!
//! ```text
//! Uninitialized --initialize--> Ready --animate/update--> Ready --release--> Released
//! ```
//!
//! A failed `initialize` leaves the field `Uninitialized` so the host can fix the
//! configuration and try again. Nothing but `state`/`config` is valid after release.
//!
//! ```rust
//! use pointfield_algorithms::{FieldState, ProceduralPointField};
//! use pointfield_core::{FieldConfig, FrameClock};
//!
//! let mut field = ProceduralPointField::build(FieldConfig::particles_sphere()).unwrap();
//! let mut clock = FrameClock::manual();
//!
//! for _ in 0..3 {
//!     field.animate(clock.advance(1.0 / 60.0)).unwrap();
//!     let mut uploaded = 0;
//!     field.present(&mut |view: &pointfield_core::BufferView<'_>| uploaded = view.count).unwrap();
//!     assert_eq!(uploaded, 390);
//! }
//!
//! field.release().unwrap();
//! assert_eq!(field.state(), FieldState::Released);
//! assert!(field.animate(clock.advance(1.0 / 60.0)).is_err());
//! ```

use log::{debug, warn};
use pointfield_core::{
    AnimationConfig, BufferView, Error, FieldConfig, FrameTime, PointBuffer, Result, Transform3D,
    UploadSink,
};
use rand::Rng;

use crate::animator::{Animate, Animator};
use crate::sampler::{SampleParameters, Sampler};

/// Lifecycle of a point field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Uninitialized,
    Ready,
    Released,
}

#[derive(Debug)]
struct Live {
    buffer: PointBuffer,
    parameters: SampleParameters,
    animator: Animator,
}

/// A fixed-size, procedurally sampled and animated point field
#[derive(Debug)]
pub struct ProceduralPointField {
    config: FieldConfig,
    state: FieldState,
    live: Option<Live>,
    last: FrameTime,
}

impl ProceduralPointField {
    /// Create an uninitialized field. Nothing is allocated until [`ProceduralPointField::initialize`].
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            state: FieldState::Uninitialized,
            live: None,
            last: FrameTime::default(),
        }
    }

    /// Create and initialize a field in one step
    pub fn build(config: FieldConfig) -> Result<Self> {
        let mut field = Self::new(config);
        field.initialize()?;
        Ok(field)
    }

    /// Sample the field with the configured seed (or entropy)
    pub fn initialize(&mut self) -> Result<()> {
        let mut sampler = Sampler::from_seed(self.config.sampler.seed);
        self.initialize_with(&mut sampler)
    }

    /// Sample the field with a caller-provided sampler
    pub fn initialize_with<R: Rng>(&mut self, sampler: &mut Sampler<R>) -> Result<()> {
        match self.state {
            FieldState::Uninitialized => {}
            FieldState::Ready => return Err(Error::InvalidState("point field is already initialized".into())),
            FieldState::Released => return Err(Error::InvalidState("point field has been released".into())),
        }

        self.config.validate()?;
        let sample = sampler.sample(&self.config.sampler)?;
        let animator = Animator::for_sample(&sample, &self.config.sampler, &self.config.animation)?;

        debug!(
            "point field ready: {} points on {}, {:?} motion",
            sample.buffer.count(),
            sample.domain,
            animator.motion()
        );

        self.live = Some(Live {
            buffer: sample.buffer,
            parameters: sample.parameters,
            animator,
        });
        self.last = FrameTime::default();
        self.state = FieldState::Ready;
        Ok(())
    }

    pub fn state(&self) -> FieldState {
        self.state
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    fn live(&self) -> Result<&Live> {
        match (self.state, &self.live) {
            (FieldState::Ready, Some(live)) => Ok(live),
            (FieldState::Released, _) => Err(Error::InvalidState("point field has been released".into())),
            _ => Err(Error::InvalidState("point field is not initialized".into())),
        }
    }

    fn live_mut(&mut self) -> Result<&mut Live> {
        match (self.state, &mut self.live) {
            (FieldState::Ready, Some(live)) => Ok(live),
            (FieldState::Released, _) => Err(Error::InvalidState("point field has been released".into())),
            _ => Err(Error::InvalidState("point field is not initialized".into())),
        }
    }

    /// Number of points
    pub fn count(&self) -> Result<usize> {
        Ok(self.live()?.buffer.count())
    }

    /// Rewrite the buffer for `time`.
    ///
    /// Time must be finite and `delta` non-negative; use [`ProceduralPointField::update`]
    /// to feed a clock that may step backwards.
    pub fn animate(&mut self, time: FrameTime) -> Result<()> {
        if !time.elapsed.is_finite() || !time.delta.is_finite() {
            return Err(Error::InvalidArgument(format!(
                "frame time must be finite, got elapsed={} delta={}",
                time.elapsed, time.delta
            )));
        }
        if time.delta < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "frame delta must not be negative, got {}",
                time.delta
            )));
        }
        let live = self.live_mut()?;
        live.animator.animate(&mut live.buffer, time)?;
        self.last = time;
        Ok(())
    }

    /// Animate from a bare elapsed-time reading, deriving the delta from the previous frame.
    ///
    /// Elapsed time that goes backwards is treated as a zero-length frame.
    pub fn update(&mut self, elapsed: f32) -> Result<()> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "elapsed time must be a non-negative number, got {}",
                elapsed
            )));
        }
        self.live()?;

        let mut delta = elapsed - self.last.elapsed;
        if delta < 0.0 {
            warn!(
                "elapsed time went backwards ({} -> {}); treating as a zero-length frame",
                self.last.elapsed, elapsed
            );
            delta = 0.0;
        }
        let time = FrameTime::new(elapsed.max(self.last.elapsed), delta, self.last.frame + 1);
        self.animate(time)
    }

    /// Replace the animation constants of a ready field
    pub fn set_animation(&mut self, animation: AnimationConfig) -> Result<()> {
        let live = self.live_mut()?;
        live.animator.reconfigure(&animation)?;
        self.config.animation = animation;
        Ok(())
    }

    /// Read-only view of the buffer for the renderer
    pub fn view(&self) -> Result<BufferView<'_>> {
        let live = self.live()?;
        let view = live.buffer.view();
        Ok(match live.animator.instances() {
            Some(instances) => view.with_instances(instances),
            None => view,
        })
    }

    /// Borrow the underlying buffer
    pub fn buffer(&self) -> Result<&PointBuffer> {
        Ok(&self.live()?.buffer)
    }

    /// Per-point sample parameters kept from sampling
    pub fn parameters(&self) -> Result<&SampleParameters> {
        Ok(&self.live()?.parameters)
    }

    /// Whether the renderer must re-upload before the next draw
    pub fn needs_update(&self) -> Result<bool> {
        Ok(self.live()?.buffer.needs_update())
    }

    /// Hand the buffer to `sink` if it changed, then clear the dirty flag.
    ///
    /// Returns whether an upload happened.
    pub fn present<S: UploadSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        let live = self.live_mut()?;
        if !live.buffer.needs_update() {
            return Ok(false);
        }
        let view = live.buffer.view();
        let view = match live.animator.instances() {
            Some(instances) => view.with_instances(instances),
            None => view,
        };
        sink.upload(&view);
        live.buffer.acknowledge_upload();
        Ok(true)
    }

    /// Whole-field rotation at the last animated frame: the fixed `base_rotation`,
    /// followed by `spin * elapsed` about x, y, z
    pub fn model_transform(&self) -> Transform3D {
        let animation = &self.config.animation;
        let [sx, sy, sz] = animation.spin;
        let t = self.last.elapsed;
        Transform3D::from_euler_angles([sx * t, sy * t, sz * t]) * Transform3D::from_euler_angles(animation.base_rotation)
    }

    /// The most recently animated frame
    pub fn last_frame(&self) -> FrameTime {
        self.last
    }

    /// Drop the buffer. Further animation or presentation fails with `InvalidState`.
    pub fn release(&mut self) -> Result<()> {
        match self.state {
            FieldState::Ready => {
                if let Some(live) = self.live.take() {
                    debug!("releasing point field of {} points", live.buffer.count());
                }
                self.state = FieldState::Released;
                Ok(())
            }
            FieldState::Uninitialized => Err(Error::InvalidState("point field is not initialized".into())),
            FieldState::Released => Err(Error::InvalidState("point field has already been released".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointfield_core::{Domain, FrameClock, Motion, SamplerConfig};

    fn seeded(mut config: FieldConfig) -> FieldConfig {
        config.sampler.seed = Some(17);
        config
    }

    fn small_helicoid() -> FieldConfig {
        let mut config = seeded(FieldConfig::hyperbolic_helicoid());
        config.sampler.slices = 16;
        config.sampler.stacks = 16;
        config
    }

    #[test]
    fn test_lifecycle() {
        let mut field = ProceduralPointField::new(seeded(FieldConfig::particles_sphere()));
        assert_eq!(field.state(), FieldState::Uninitialized);
        assert!(field.animate(FrameTime::at(0.0)).unwrap_err().is_invalid_state());
        assert!(field.view().is_err());

        field.initialize().unwrap();
        assert_eq!(field.state(), FieldState::Ready);
        assert_eq!(field.count().unwrap(), 390);
        assert!(field.initialize().unwrap_err().is_invalid_state());

        field.animate(FrameTime::at(0.1)).unwrap();
        field.release().unwrap();
        assert_eq!(field.state(), FieldState::Released);
        assert!(field.animate(FrameTime::at(0.2)).unwrap_err().is_invalid_state());
        assert!(field.release().unwrap_err().is_invalid_state());
        assert!(field.initialize().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_failed_initialize_stays_uninitialized() {
        let mut config = FieldConfig::particles_sphere();
        config.sampler.count = 0;
        let mut field = ProceduralPointField::new(config);
        assert!(field.initialize().unwrap_err().is_invalid_argument());
        assert_eq!(field.state(), FieldState::Uninitialized);
        assert!(field.release().unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_present_only_when_dirty() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::particles_sphere())).unwrap();
        let mut uploads = 0;
        let mut sink = |_: &BufferView<'_>| uploads += 1;

        assert!(field.present(&mut sink).unwrap());
        assert!(!field.present(&mut sink).unwrap());
        field.animate(FrameTime::at(0.5)).unwrap();
        assert!(field.needs_update().unwrap());
        assert!(field.present(&mut sink).unwrap());
        drop(sink);
        assert_eq!(uploads, 2);
    }

    #[test]
    fn test_animate_never_resizes() {
        for name in ["sphere", "helicoid", "swarm"] {
            let mut config = FieldConfig::preset(name).unwrap();
            config.sampler.seed = Some(3);
            config.sampler.slices = 12;
            config.sampler.stacks = 9;
            let mut field = ProceduralPointField::build(config).unwrap();
            let len = field.buffer().unwrap().len();
            let mut clock = FrameClock::manual();
            for _ in 0..200 {
                field.animate(clock.advance(1.0 / 30.0)).unwrap();
            }
            assert_eq!(field.buffer().unwrap().len(), len, "{} resized", name);
        }
    }

    #[test]
    fn test_update_derives_delta_and_clamps_backwards_time() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::surface_swarm())).unwrap();
        field.update(1.0).unwrap();
        field.update(1.25).unwrap();
        let last = field.last_frame();
        assert_eq!(last.frame, 2);
        assert!((last.delta - 0.25).abs() < 1e-6);

        field.update(1.0).unwrap();
        let last = field.last_frame();
        assert_eq!(last.delta, 0.0);
        assert_eq!(last.elapsed, 1.25);

        assert!(field.update(f32::NAN).unwrap_err().is_invalid_argument());
        assert!(field.update(-1.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_swarm_view_carries_instances() {
        let field = ProceduralPointField::build(seeded(FieldConfig::surface_swarm())).unwrap();
        let view = field.view().unwrap();
        assert_eq!(view.instances.map(|i| i.len()), Some(486));
        assert_eq!(view.as_instance_bytes().unwrap().len(), 486 * 64);
    }

    #[test]
    fn test_set_animation() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::particles_sphere())).unwrap();
        let mut animation = field.config().animation.clone();
        animation.amplitude = 0.3;
        field.set_animation(animation).unwrap();
        assert_eq!(field.config().animation.amplitude, 0.3);

        let mut animation = field.config().animation.clone();
        animation.motion = Motion::Swarm;
        assert!(field.set_animation(animation).is_err());
        assert_eq!(field.config().animation.motion, Motion::Float);

        let mut animation = field.config().animation.clone();
        animation.speed = f32::INFINITY;
        assert!(field.set_animation(animation).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_model_transform_is_absolute() {
        let mut field = ProceduralPointField::build(small_helicoid()).unwrap();
        assert!(field.model_transform().is_identity(1e-6));
        field.animate(FrameTime::new(std::f32::consts::PI, 0.1, 1)).unwrap();
        let expected = Transform3D::rotation_y(0.5 * std::f32::consts::PI);
        assert!((field.model_transform().matrix - expected.matrix).norm() < 1e-5);
    }

    #[test]
    fn test_non_finite_frame_rejected() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::particles_sphere())).unwrap();
        let err = field.animate(FrameTime::new(f32::NAN, 0.0, 1)).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_negative_delta_rejected() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::surface_swarm())).unwrap();
        field.animate(FrameTime::new(4.0, 0.1, 1)).unwrap();
        let before = field.buffer().unwrap().clone();

        let err = field.animate(FrameTime::new(5.0, -200.0, 2)).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(field.buffer().unwrap(), &before);
        assert_eq!(field.last_frame().frame, 1);
    }

    #[test]
    fn test_model_transform_starts_from_base_rotation() {
        let mut field = ProceduralPointField::build(seeded(FieldConfig::particles_sphere())).unwrap();
        let base = Transform3D::from_euler_angles([std::f32::consts::FRAC_PI_2, 0.0, 0.0]);
        assert!((field.model_transform().matrix - base.matrix).norm() < 1e-6);

        // The preset does not spin, so the orientation holds over time
        field.animate(FrameTime::new(10.0, 0.1, 1)).unwrap();
        assert!((field.model_transform().matrix - base.matrix).norm() < 1e-6);

        let mut animation = field.config().animation.clone();
        animation.spin = [0.0, 1.0, 0.0];
        field.set_animation(animation).unwrap();
        let expected = Transform3D::rotation_y(10.0) * base;
        assert!((field.model_transform().matrix - expected.matrix).norm() < 1e-5);
    }

    #[test]
    fn test_unknown_domain_never_reaches_ready() {
        let err = "klein_bottle".parse::<Domain>().unwrap_err();
        assert!(err.is_invalid_argument());
        let config = FieldConfig {
            sampler: SamplerConfig { domain: Domain::SphereSurface, radius: -2.0, ..SamplerConfig::default() },
            ..FieldConfig::default()
        };
        assert!(ProceduralPointField::build(config).unwrap_err().is_invalid_argument());
    }
}
