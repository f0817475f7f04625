//! Initial point generation over parametric domains
//!
//! The sampler runs once per field. For the sphere and volume domains it draws
//! random positions; for the hyperbolic helicoid it lays a regular (u, v) grid
//! and keeps the parameters so the animator can re-evaluate the surface every
//! frame instead of accumulating drift.

use std::f32::consts::TAU;

use log::debug;
use nalgebra::{Rotation3, Vector3};
use pointfield_core::{ColorMode, Domain, Error, Point3f, PointBuffer, Result, SamplerConfig, COMPONENTS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale of the helicoid x, y and z coordinates
pub const HELICOID_SCALE: [f32; 3] = [2.0, 1.5, 2.0];

/// Per-point parameters kept alongside a sampled buffer
#[derive(Debug, Clone, PartialEq)]
pub enum SampleParameters {
    /// Points are identified by index alone
    Indexed { count: usize },
    /// One (u, v) pair in `[0, 1]^2` per point
    Uv(Vec<[f32; 2]>),
}

impl SampleParameters {
    pub fn len(&self) -> usize {
        match self {
            SampleParameters::Indexed { count } => *count,
            SampleParameters::Uv(uv) => uv.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_uv(&self) -> Option<&[[f32; 2]]> {
        match self {
            SampleParameters::Uv(uv) => Some(uv),
            SampleParameters::Indexed { .. } => None,
        }
    }
}

/// Output of a sampling run
#[derive(Debug, Clone)]
pub struct Sample {
    pub domain: Domain,
    pub buffer: PointBuffer,
    pub parameters: SampleParameters,
}

/// Cartesian point on a sphere from polar angle `theta` and azimuth `phi`
#[inline]
pub fn sphere_point(theta: f32, phi: f32, radius: f32) -> Point3f {
    let (sin_theta, cos_theta) = theta.sin_cos();
    let (sin_phi, cos_phi) = phi.sin_cos();
    Point3f::new(
        radius * sin_theta * cos_phi,
        radius * sin_theta * sin_phi,
        radius * cos_theta,
    )
}

/// Point on the hyperbolic helicoid for grid parameters `(u, v)` at `time`.
///
/// `alpha = 2π(u - 0.5) + time`, `theta = 2π(v - 0.5)`. The surface is
/// `(sinh α cos(tθ), cosh α sinh θ, sinh α sin(tθ)) / (1 + cosh α cosh θ)`,
/// evaluated with numerator and denominator divided by `cosh α` so that large
/// `alpha` saturates to `tanh α = 1` instead of overflowing. The denominator
/// `sech α + cosh θ` is at least 1.
#[inline]
pub fn helicoid_point(u: f32, v: f32, twist: f32, time: f32) -> Point3f {
    let alpha = TAU * (u - 0.5) + time;
    let theta = TAU * (v - 0.5);
    let tanh_a = alpha.tanh();
    let sech_a = alpha.cosh().recip();
    let (sinh_t, cosh_t) = (theta.sinh(), theta.cosh());
    let (sin_tw, cos_tw) = (twist * theta).sin_cos();
    let bottom = sech_a + cosh_t;

    Point3f::new(
        HELICOID_SCALE[0] * tanh_a * cos_tw / bottom,
        HELICOID_SCALE[1] * sinh_t / bottom,
        HELICOID_SCALE[2] * tanh_a * sin_tw / bottom,
    )
}

/// Regular `slices` x `stacks` grid of (u, v) parameters, u-major
pub fn helicoid_grid(slices: usize, stacks: usize) -> Result<Vec<[f32; 2]>> {
    if slices < 2 || stacks < 2 {
        return Err(Error::InvalidArgument(format!(
            "helicoid needs at least 2 slices and 2 stacks, got {}x{}",
            slices, stacks
        )));
    }
    let count = slices.checked_mul(stacks).ok_or_else(|| {
        Error::InvalidArgument(format!("helicoid grid {}x{} is too large", slices, stacks))
    })?;

    let mut uv = Vec::with_capacity(count);
    for i in 0..slices {
        for j in 0..stacks {
            let u = i as f32 / (slices - 1) as f32;
            let v = j as f32 / (stacks - 1) as f32;
            uv.push([u, v]);
        }
    }
    Ok(uv)
}

/// Evaluate the helicoid for every (u, v) into `positions` (interleaved xyz).
///
/// Pure in `(uv, twist, time)`: evaluating twice at the same time writes identical bits.
pub fn evaluate_helicoid(uv: &[[f32; 2]], twist: f32, time: f32, positions: &mut [f32]) -> Result<()> {
    if positions.len() != uv.len() * COMPONENTS {
        return Err(Error::InvalidState(format!(
            "{} helicoid parameters do not match a buffer of {} floats",
            uv.len(),
            positions.len()
        )));
    }
    for (&[u, v], out) in uv.iter().zip(positions.chunks_exact_mut(COMPONENTS)) {
        let p = helicoid_point(u, v, twist, time);
        out[0] = p.x;
        out[1] = p.y;
        out[2] = p.z;
    }
    Ok(())
}

/// Draws initial point sets from a random number generator
#[derive(Debug, Clone)]
pub struct Sampler<R = StdRng> {
    rng: R,
}

impl Sampler<StdRng> {
    /// Sampler seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic sampler
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Seeded when `seed` is set, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }
}

impl Default for Sampler<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Sampler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Sample positions (and colors, if configured) for `config`
    pub fn sample(&mut self, config: &SamplerConfig) -> Result<Sample> {
        config.validate()?;

        let (buffer, parameters) = match config.domain {
            Domain::SphereSurface => (
                self.sphere_surface(config.count, config.radius)?,
                SampleParameters::Indexed { count: config.count },
            ),
            Domain::UniformRandomVolume => (
                self.uniform_volume(config.count, config.bound)?,
                SampleParameters::Indexed { count: config.count },
            ),
            Domain::BoxSurface => (
                self.box_surface(config.count, config.box_size, config.orientation)?,
                SampleParameters::Indexed { count: config.count },
            ),
            Domain::HyperbolicHelicoid => {
                let uv = helicoid_grid(config.slices, config.stacks)?;
                let mut buffer = PointBuffer::new(uv.len())?;
                evaluate_helicoid(&uv, config.twist, 0.0, buffer.positions_mut())?;
                (buffer, SampleParameters::Uv(uv))
            }
        };

        let buffer = match self.colors(buffer.count(), &config.colors) {
            Some(colors) => buffer.with_colors(colors)?,
            None => buffer,
        };

        debug!(
            "sampled {} points on {} (colors: {})",
            buffer.count(),
            config.domain,
            buffer.has_colors()
        );

        Ok(Sample {
            domain: config.domain,
            buffer,
            parameters,
        })
    }

    /// `count` points uniformly distributed over a sphere surface.
    ///
    /// The polar angle is drawn as `acos(2r - 1)`; drawing it uniformly would
    /// cluster points at the poles.
    pub fn sphere_surface(&mut self, count: usize, radius: f32) -> Result<PointBuffer> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(Error::InvalidArgument(format!("radius must be a non-negative number, got {}", radius)));
        }
        let mut buffer = PointBuffer::new(count)?;
        for out in buffer.positions_mut().chunks_exact_mut(COMPONENTS) {
            let theta = (2.0 * self.rng.gen::<f32>() - 1.0).acos();
            let phi = TAU * self.rng.gen::<f32>();
            let p = sphere_point(theta, phi, radius);
            out.copy_from_slice(&[p.x, p.y, p.z]);
        }
        Ok(buffer)
    }

    /// `count` points with every coordinate uniform in `[-bound, bound]`
    pub fn uniform_volume(&mut self, count: usize, bound: f32) -> Result<PointBuffer> {
        if !bound.is_finite() || bound < 0.0 {
            return Err(Error::InvalidArgument(format!("bound must be a non-negative number, got {}", bound)));
        }
        let mut buffer = PointBuffer::new(count)?;
        for c in buffer.positions_mut() {
            *c = self.rng.gen_range(-bound..=bound);
        }
        Ok(buffer)
    }

    /// `count` points uniformly distributed over the faces of a box with edge
    /// lengths `size`, centered on the origin and turned by the x, y, z Euler
    /// angles `orientation`.
    ///
    /// A face pair is picked in proportion to its area, then a side and a
    /// uniform point on that face.
    pub fn box_surface(&mut self, count: usize, size: [f32; 3], orientation: [f32; 3]) -> Result<PointBuffer> {
        if size.iter().any(|e| !e.is_finite() || *e < 0.0) {
            return Err(Error::InvalidArgument(format!("box edges must be non-negative numbers, got {:?}", size)));
        }
        let [sx, sy, sz] = size;
        // Faces normal to x, y and z
        let areas = [sy * sz, sx * sz, sx * sy];
        let total: f32 = areas.iter().sum();
        if total <= 0.0 {
            return Err(Error::InvalidArgument(format!("box {:?} has no surface area", size)));
        }

        let rotation = Rotation3::from_euler_angles(orientation[0], orientation[1], orientation[2]);
        let half = Vector3::new(sx, sy, sz) * 0.5;
        let mut buffer = PointBuffer::new(count)?;
        for out in buffer.positions_mut().chunks_exact_mut(COMPONENTS) {
            let pick = self.rng.gen::<f32>() * total;
            let axis = if pick < areas[0] {
                0
            } else if pick < areas[0] + areas[1] {
                1
            } else {
                2
            };

            let mut local = Vector3::<f32>::zeros();
            for k in 0..COMPONENTS {
                local[k] = if k == axis {
                    if self.rng.gen::<bool>() { half[k] } else { -half[k] }
                } else {
                    self.rng.gen_range(-half[k]..=half[k])
                };
            }
            out.copy_from_slice((rotation * local).as_slice());
        }
        Ok(buffer)
    }

    /// Interleaved rgb colors for `count` points, or `None` for [`ColorMode::None`]
    pub fn colors(&mut self, count: usize, mode: &ColorMode) -> Option<Vec<f32>> {
        match mode {
            ColorMode::None => None,
            ColorMode::Random => Some((0..count * COMPONENTS).map(|_| self.rng.gen::<f32>()).collect()),
            ColorMode::Palette(entries) if entries.is_empty() => None,
            ColorMode::Palette(entries) => {
                let mut colors = Vec::with_capacity(count * COMPONENTS);
                for _ in 0..count {
                    let pick = entries[self.rng.gen_range(0..entries.len())];
                    colors.extend_from_slice(&pick);
                }
                Some(colors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pointfield_core::Drawable;

    #[test]
    fn test_sphere_points_on_radius() {
        let mut sampler = Sampler::seeded(7);
        let buffer = sampler.sphere_surface(1000, 2.0).unwrap();
        assert_eq!(buffer.len(), 3000);
        for p in buffer.iter() {
            assert_relative_eq!(p.coords.norm(), 2.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_sphere_is_not_pole_clustered() {
        // Uniform on the surface means z is uniform in [-r, r]: about half the
        // points fall in |z| < r/2.
        let mut sampler = Sampler::seeded(11);
        let buffer = sampler.sphere_surface(20_000, 1.0).unwrap();
        let band = buffer.iter().filter(|p| p.z.abs() < 0.5).count() as f32 / 20_000.0;
        assert!((band - 0.5).abs() < 0.02, "equatorial band fraction {}", band);
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut sampler = Sampler::seeded(0);
        assert!(sampler.sphere_surface(10, -1.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_zero_count_rejected() {
        let mut sampler = Sampler::seeded(0);
        assert!(sampler.sphere_surface(0, 1.0).unwrap_err().is_invalid_argument());
        assert!(sampler.uniform_volume(0, 1.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_single_point() {
        let mut sampler = Sampler::seeded(3);
        let buffer = sampler.sphere_surface(1, 1.0).unwrap();
        assert_eq!(buffer.count(), 1);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_volume_within_bound() {
        let mut sampler = Sampler::seeded(5);
        let buffer = sampler.uniform_volume(500, 2.5).unwrap();
        assert!(buffer.positions().iter().all(|c| (-2.5..=2.5).contains(c)));
        let (min, max) = buffer.bounding_box();
        assert!(min.x < -2.0 && max.x > 2.0);
    }

    #[test]
    fn test_zero_bound_collapses_to_origin() {
        let mut sampler = Sampler::seeded(5);
        let buffer = sampler.uniform_volume(8, 0.0).unwrap();
        assert!(buffer.positions().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_same_seed_same_points() {
        let a = Sampler::seeded(42).sphere_surface(64, 1.0).unwrap();
        let b = Sampler::seeded(42).sphere_surface(64, 1.0).unwrap();
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn test_helicoid_grid_corners() {
        let uv = helicoid_grid(3, 4).unwrap();
        assert_eq!(uv.len(), 12);
        assert_eq!(uv[0], [0.0, 0.0]);
        assert_eq!(uv[3], [0.0, 1.0]);
        assert_eq!(uv[11], [1.0, 1.0]);
        assert!(helicoid_grid(1, 4).is_err());
    }

    #[test]
    fn test_box_points_lie_on_faces() {
        let orientation = [0.4, 0.2, 0.0];
        let buffer = Sampler::seeded(21).box_surface(2000, [3.0, 2.0, 1.0], orientation).unwrap();
        let inverse = Rotation3::from_euler_angles(orientation[0], orientation[1], orientation[2]).inverse();
        let half = [1.5, 1.0, 0.5];

        for p in buffer.iter() {
            let local = inverse * p.coords;
            let mut on_face = false;
            for k in 0..3 {
                assert!(local[k].abs() <= half[k] + 1e-4, "{:?} outside the box", local);
                on_face |= (local[k].abs() - half[k]).abs() < 1e-4;
            }
            assert!(on_face, "{:?} is inside the box", local);
        }
    }

    #[test]
    fn test_box_faces_weighted_by_area() {
        // Faces normal to x have area 1, the others 4 each: 1/9 of the points land on x faces.
        let buffer = Sampler::seeded(4).box_surface(18_000, [4.0, 1.0, 1.0], [0.0; 3]).unwrap();
        let on_x = buffer.iter().filter(|p| (p.x.abs() - 2.0).abs() < 1e-5).count() as f32 / 18_000.0;
        assert!((on_x - 1.0 / 9.0).abs() < 0.015, "x-face fraction {}", on_x);
    }

    #[test]
    fn test_flat_box_and_bad_edges() {
        let mut sampler = Sampler::seeded(6);
        let flat = sampler.box_surface(100, [2.0, 0.0, 2.0], [0.0; 3]).unwrap();
        assert!(flat.iter().all(|p| p.y == 0.0));
        assert!(sampler.box_surface(10, [0.0, 0.0, 5.0], [0.0; 3]).unwrap_err().is_invalid_argument());
        assert!(sampler.box_surface(10, [1.0, f32::NAN, 1.0], [0.0; 3]).is_err());
    }

    #[test]
    fn test_helicoid_matches_closed_form() {
        // Direct form in f64, where moderate alpha cannot overflow
        for &(u, v, time) in &[(0.1f32, 0.3f32, 0.0f32), (0.8, 0.9, 1.5), (0.5, 0.05, -2.0), (0.95, 0.6, 4.0)] {
            let alpha = std::f64::consts::TAU * (u as f64 - 0.5) + time as f64;
            let theta = std::f64::consts::TAU * (v as f64 - 0.5);
            let bottom = 1.0 + alpha.cosh() * theta.cosh();
            let x = 2.0 * alpha.sinh() * (5.0 * theta).cos() / bottom;
            let y = 1.5 * alpha.cosh() * theta.sinh() / bottom;
            let z = 2.0 * alpha.sinh() * (5.0 * theta).sin() / bottom;

            let p = helicoid_point(u, v, 5.0, time);
            assert_relative_eq!(p.x as f64, x, epsilon = 1e-4);
            assert_relative_eq!(p.y as f64, y, epsilon = 1e-4);
            assert_relative_eq!(p.z as f64, z, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_helicoid_finite_at_large_times() {
        let uv = helicoid_grid(20, 20).unwrap();
        let mut positions = vec![0.0; uv.len() * 3];
        for time in [85.0, 100.0, 120.0, 1e3, 1e5, -1e5] {
            evaluate_helicoid(&uv, 5.0, time, &mut positions).unwrap();
            assert!(positions.iter().all(|c| c.is_finite()), "non-finite coordinate at t={}", time);
            assert!(positions.iter().all(|c| c.abs() <= 2.0), "coordinate escaped the surface at t={}", time);
        }
    }

    #[test]
    fn test_helicoid_center_is_origin() {
        let p = helicoid_point(0.5, 0.5, 5.0, 0.0);
        assert_relative_eq!(p.coords.norm(), 0.0);
    }

    #[test]
    fn test_helicoid_sample_counts_and_params() {
        let config = SamplerConfig {
            domain: Domain::HyperbolicHelicoid,
            slices: 10,
            stacks: 7,
            ..SamplerConfig::default()
        };
        let sample = Sampler::seeded(1).sample(&config).unwrap();
        assert_eq!(sample.buffer.count(), 70);
        assert_eq!(sample.parameters.len(), 70);
        assert!(sample.parameters.as_uv().is_some());
        assert!(sample.buffer.positions().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_evaluate_helicoid_length_mismatch() {
        let uv = helicoid_grid(2, 2).unwrap();
        let mut positions = vec![0.0; 9];
        assert!(evaluate_helicoid(&uv, 5.0, 0.0, &mut positions).unwrap_err().is_invalid_state());
    }

    #[test]
    fn test_palette_colors_come_from_palette() {
        let palette = vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let config = SamplerConfig {
            count: 50,
            colors: ColorMode::Palette(palette.clone()),
            ..SamplerConfig::default()
        };
        let sample = Sampler::seeded(9).sample(&config).unwrap();
        let colors = sample.buffer.colors().unwrap();
        for rgb in colors.chunks_exact(3) {
            assert!(palette.iter().any(|p| p[..] == rgb[..]));
        }
    }

    #[test]
    fn test_random_colors_in_unit_range() {
        let mut sampler = Sampler::seeded(2);
        let colors = sampler.colors(100, &ColorMode::Random).unwrap();
        assert_eq!(colors.len(), 300);
        assert!(colors.iter().all(|c| (0.0..1.0).contains(c)));
        assert!(sampler.colors(100, &ColorMode::None).is_none());
    }
}
