//! Creates a sample snapshot container for trying out slice_vis.
//!
//! The file holds a warm mixed layer over a cooler interior, with a thermocline
//! that deepens over six timesteps, in the same layout the ocean model writes.
//!
//! ```text
//! cargo run --example create_test_snapshot
//! cargo run -- --slices test_snapshot.jld2 --output test_frame.png
//! ```

use slice_vis::data_source::{GridSpec, SlicePlane};
use slice_vis::hdf5_io::write_snapshot;
use slice_vis::memory_source::MemorySnapshot;
use std::path::Path;

const STEPS: u64 = 6;
const SAVE_INTERVAL: u64 = 600;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_snapshot.jld2");
    println!("🔨 Creating test snapshot container: {}", output_path.display());

    let grid = GridSpec::new(32, 32, 24, 100.0, 100.0, 50.0);
    let mut snapshot = MemorySnapshot::new(output_path, grid);

    for step in 0..STEPS {
        let index = step * SAVE_INTERVAL;
        let t = index as f64 * 6.0;
        snapshot.insert_time(index, t);

        let mixed_layer = 8.0 + 3.0 * step as f64;
        snapshot.insert_field_with("T", index, |plane, i, j| {
            temperature(&grid, plane, i, j, mixed_layer, t)
        });
    }

    write_snapshot(output_path, &snapshot)?;
    println!(
        "✅ Wrote {} timesteps of T on a {}x{}x{} grid",
        STEPS, grid.nx, grid.ny, grid.nz
    );
    Ok(())
}

/// Temperature at interior cell `(i, j)` of `plane`; the horizontal slice is
/// taken at the surface, the vertical ones at the domain's origin sides.
fn temperature(grid: &GridSpec, plane: SlicePlane, i: usize, j: usize, mixed_layer: f64, t: f64) -> f64 {
    let dz = grid.lz / grid.nz as f64;
    let dx = grid.lx / grid.nx as f64;
    let dy = grid.ly / grid.ny as f64;

    // (x, y, depth below surface)
    let (x, y, depth) = match plane {
        SlicePlane::Xy => (i as f64 * dx, j as f64 * dy, 0.0),
        SlicePlane::Xz => (i as f64 * dx, 0.0, (j as f64 + 0.5) * dz),
        SlicePlane::Yz => (0.0, i as f64 * dy, (j as f64 + 0.5) * dz),
    };

    let wave = 0.02 * ((x / grid.lx * 4.0 + t / 3600.0).sin() + (y / grid.ly * 3.0).cos());
    let stratification = 0.8 / (1.0 + ((depth - mixed_layer) / 2.0).exp());
    19.15 + stratification + wave
}
