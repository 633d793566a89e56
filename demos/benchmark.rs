//! Simple benchmark showing the benefit of rendering frames in parallel.
//!
//! Renders the same synthetic timeline once frame by frame and once through
//! the Rayon batch renderer, and compares wall-clock time.

use slice_vis::data_source::GridSpec;
use slice_vis::errors::SliceVisError;
use slice_vis::memory_source::MemorySnapshot;
use slice_vis::parallel::render_timeline_with;
use slice_vis::render::{RenderParameters, RenderSession};
use slice_vis::timeline::build_timeline_with;
use std::path::Path;
use std::time::Instant;

const FRAMES: u64 = 8;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔬 slice_vis Parallel Rendering Benchmark");
    println!("==========================================\n");

    let available_threads = rayon::current_num_threads();
    println!(
        "System has {} logical CPU cores available\n",
        available_threads
    );

    let grid = GridSpec::new(64, 64, 48, 100.0, 100.0, 50.0);
    let mut snapshot = MemorySnapshot::new("bench.jld2", grid);
    for index in 0..FRAMES {
        snapshot.insert_time(index, index as f64 * 60.0);
        snapshot.insert_field_with("T", index, |_, i, j| {
            19.0 + 0.01 * ((i + j + index as usize) % 100) as f64
        });
    }
    let open = |_: &Path| Ok::<_, SliceVisError>(snapshot.clone());

    let timeline = build_timeline_with(&["bench.jld2"], open)?;
    let session = RenderSession::default();
    let params = RenderParameters {
        dpi: 100.0,
        ..RenderParameters::default()
    };
    let out_dir = tempfile::tempdir()?;

    for dpi in [50.0, 100.0] {
        let params = RenderParameters { dpi, ..params.clone() };
        println!("📊 Rendering {} frames at {} dpi:", FRAMES, dpi);
        println!("-------------------------------------------");

        println!("🐌 Sequential rendering:");
        let start = Instant::now();
        for record in &timeline {
            let output = out_dir.path().join(format!("seq_{}.png", record.index));
            session.render_from_reader(&snapshot, record.index, &output, &params)?;
        }
        let seq_time = start.elapsed().as_secs_f64();
        println!("   ⏱️  Duration: {:.3} seconds\n", seq_time);

        println!("⚡ Parallel rendering ({} threads):", available_threads);
        let start = Instant::now();
        let report = render_timeline_with(&session, &timeline, &params, out_dir.path(), open)?;
        let par_time = start.elapsed().as_secs_f64();
        println!("   ⏱️  Duration: {:.3} seconds", par_time);
        println!("   Frames written: {}", report.rendered.len());

        let speedup = seq_time / par_time;
        println!("   🚀 Speedup: {:.2}x faster\n", speedup);
        println!("=========================================\n");
    }

    println!("💡 Key Takeaways:");
    println!("   - Frames are independent, so batches scale with core count");
    println!("   - Use --threads with --all to control parallelism");
    Ok(())
}
