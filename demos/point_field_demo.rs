//! Headless point field demo
//!
//! Builds a field from a preset or a TOML config, drives it on a fixed-step
//! clock and reports what a renderer would have received.
//!
//! ```text
//! RUST_LOG=debug cargo run --bin point_field_demo -- --preset swarm --frames 600
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use pointfield_algorithms::ProceduralPointField;
use pointfield_core::{BufferView, Drawable, FieldConfig, FrameClock, Point3f};

#[derive(Parser)]
#[command(name = "point_field_demo")]
#[command(about = "Sample and animate a procedural point field without a window", long_about = None)]
#[command(version)]
struct Cli {
    /// Preset to start from: sphere, helicoid or swarm
    #[arg(short, long, default_value = "sphere")]
    preset: String,

    /// TOML config file; overrides --preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 300)]
    frames: u64,

    /// Fixed frame rate of the simulated clock
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Sampling seed; random when omitted
    #[arg(short, long)]
    seed: Option<u64>,
}

/// Stands in for a GPU upload: counts uploads and folds the extent of every uploaded frame.
#[derive(Default)]
struct StatsSink {
    uploads: u64,
    bytes: usize,
    instanced: bool,
    min: Option<Point3f>,
    max: Option<Point3f>,
}

impl StatsSink {
    fn record(&mut self, view: &BufferView<'_>) {
        self.uploads += 1;
        self.bytes += view.as_position_bytes().len()
            + view.as_color_bytes().map_or(0, <[u8]>::len)
            + view.as_instance_bytes().map_or(0, <[u8]>::len);
        self.instanced |= view.instances.is_some();

        for xyz in view.positions.chunks_exact(3) {
            let p = Point3f::new(xyz[0], xyz[1], xyz[2]);
            self.min = Some(self.min.map_or(p, |m| m.inf(&p)));
            self.max = Some(self.max.map_or(p, |m| m.sup(&p)));
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            FieldConfig::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => FieldConfig::preset(&cli.preset)?,
    };
    if cli.seed.is_some() {
        config.sampler.seed = cli.seed;
    }
    anyhow::ensure!(cli.fps.is_finite() && cli.fps > 0.0, "fps must be positive, got {}", cli.fps);

    let mut field = ProceduralPointField::build(config).context("initializing point field")?;
    info!(
        "{} points on {} with {:?} motion",
        field.count()?,
        field.config().sampler.domain,
        field.config().animation.motion
    );

    let mut clock = FrameClock::manual();
    let mut sink = StatsSink::default();
    let mut record = |view: &BufferView<'_>| sink.record(view);
    let dt = 1.0 / cli.fps;

    for frame in 0..cli.frames {
        field.animate(clock.advance(dt))?;
        field.present(&mut record)?;
        if frame > 0 && frame % 120 == 0 {
            info!("frame {} at t={:.2}s", frame, clock.elapsed());
        }
    }

    let center = field.buffer()?.center();
    let model = field.model_transform();
    let spin = model.transform_vector(&pointfield_core::Vector3::x());
    field.release()?;

    info!(
        "{} frames, {} uploads, {:.1} KiB uploaded{}",
        cli.frames,
        sink.uploads,
        sink.bytes as f64 / 1024.0,
        if sink.instanced { " (instanced)" } else { "" }
    );
    if let (Some(min), Some(max)) = (sink.min, sink.max) {
        info!(
            "extent ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    info!("final center ({:.2}, {:.2}, {:.2})", center.x, center.y, center.z);
    info!("model x axis now points at ({:.2}, {:.2}, {:.2})", spin.x, spin.y, spin.z);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointfield_core::PointBuffer;

    #[test]
    fn test_stats_sink_folds_extent_across_uploads() {
        let mut sink = StatsSink::default();
        let a = PointBuffer::from_points(&[Point3f::new(1.0, -2.0, 0.5), Point3f::new(-1.0, 0.0, 3.0)]).unwrap();
        let b = PointBuffer::from_points(&[Point3f::new(4.0, 1.0, -3.0)]).unwrap();

        sink.record(&a.view());
        sink.record(&b.view());

        assert_eq!(sink.uploads, 2);
        assert_eq!(sink.bytes, 9 * std::mem::size_of::<f32>());
        assert_eq!(sink.min, Some(Point3f::new(-1.0, -2.0, -3.0)));
        assert_eq!(sink.max, Some(Point3f::new(4.0, 1.0, 3.0)));
        assert!(!sink.instanced);
    }
}
