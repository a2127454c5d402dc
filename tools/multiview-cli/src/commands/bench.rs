//! Frame generation benchmark.

use std::path::PathBuf;
use std::time::Instant;

use multiview_common::{FrameStats, RateController, SessionClock};
use multiview_model::{SensorSnapshot, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::open_composer;
use super::render::feed_test_patterns;

pub fn run(path: PathBuf, frames: u32, fps: u32, seed: Option<u64>) -> anyhow::Result<()> {
    let mut composer = open_composer(&path)?;
    feed_test_patterns(&mut composer);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!(
        "Benchmarking {} layout(s), {} camera(s), {frames} tick(s){}",
        composer.layout_count(),
        composer.camera_names().len(),
        if fps > 0 {
            format!(" at {fps} Hz")
        } else {
            String::new()
        }
    );

    let clock = SessionClock::start();
    let mut rate = RateController::new(fps);
    let mut stats = FrameStats::default();
    let mut ticks = 0;

    while ticks < frames {
        let now = clock.elapsed_ns();
        if !rate.should_tick(now) {
            std::thread::sleep(rate.wait_hint(now));
            continue;
        }

        let updates = jitter(composer.sensor_data(), &mut rng);
        composer.update_dynamic_data(updates);

        let started = Instant::now();
        let generated = composer.generate_frame();
        stats.record(generated.len() as u64, started.elapsed());
        ticks += 1;
    }

    let cache = composer.renderer().cache().stats();
    println!("  Frames generated: {}", stats.frames);
    println!("  Throughput: {:.1} frames/s", stats.fps());
    println!("  Average: {:.2} ms/frame", stats.ms_per_frame());
    println!(
        "  Overlay cache: {} hits, {} misses ({:.0}% hit rate)",
        cache.hits,
        cache.misses,
        cache.hit_rate() * 100.0
    );
    println!("  Wall time: {:.2}s", clock.elapsed_secs());

    composer.shutdown();
    Ok(())
}

/// Perturb numeric sensor values; booleans flip occasionally, strings stay.
fn jitter(sensor: &SensorSnapshot, rng: &mut impl Rng) -> Vec<(String, Value)> {
    sensor
        .iter()
        .filter_map(|(name, value)| {
            let next = match value {
                Value::Int(v) => Value::Int(v + rng.gen_range(-2..=2)),
                Value::Float(v) => Value::Float(v + rng.gen_range(-0.5..0.5)),
                Value::Bool(b) if rng.gen_bool(0.05) => Value::Bool(!b),
                _ => return None,
            };
            Some((name.to_string(), next))
        })
        .collect()
}
