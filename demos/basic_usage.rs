//! Basic usage example for pointfield
//!
//! This example demonstrates fundamental operations:
//! - Sampling a field from a preset
//! - Animating it on a fixed clock
//! - Handing the buffer to a renderer
//! - Releasing it

use pointfield_algorithms::{FieldState, ProceduralPointField, Sampler};
use pointfield_core::{BufferView, Drawable, FieldConfig, FrameClock, SamplerConfig};

fn main() -> anyhow::Result<()> {
    println!("pointfield Basic Usage Example");
    println!("==============================");

    // Sample a sphere directly
    let mut sampler = Sampler::seeded(42);
    let sample = sampler.sample(&SamplerConfig::default())?;
    let (min, max) = sample.buffer.bounding_box();
    println!("Sampled {} points on {}", sample.buffer.count(), sample.domain);
    println!("- Bounds: ({:.2}, {:.2}, {:.2}) .. ({:.2}, {:.2}, {:.2})", min.x, min.y, min.z, max.x, max.y, max.z);

    // Drive each preset for one second at 60 fps
    for name in ["sphere", "helicoid", "swarm"] {
        let mut config = FieldConfig::preset(name)?;
        config.sampler.seed = Some(42);
        let mut field = ProceduralPointField::build(config)?;
        let mut clock = FrameClock::manual();
        let mut uploads = 0;
        let mut bytes = 0;

        for _ in 0..60 {
            field.animate(clock.advance(1.0 / 60.0))?;
            field.present(&mut |view: &BufferView<'_>| {
                uploads += 1;
                bytes += view.as_position_bytes().len();
            })?;
        }

        let center = field.buffer()?.center();
        println!("\n{} preset:", name);
        println!("- {} points, {} uploads, {} position bytes", field.count()?, uploads, bytes);
        println!("- Center after 1s: ({:.3}, {:.3}, {:.3})", center.x, center.y, center.z);

        field.release()?;
        assert_eq!(field.state(), FieldState::Released);
    }

    println!("\nExample completed successfully!");
    Ok(())
}
