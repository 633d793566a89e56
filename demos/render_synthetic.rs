//! Renders one frame from an in-memory container, no input file needed.
//!
//! ```text
//! cargo run --example render_synthetic -- synthetic.png 100
//! ```
//! Arguments are the output path and the DPI (default 100).

use slice_vis::prelude::*;
use std::path::PathBuf;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "synthetic.png".to_string()));
    let dpi = args
        .next()
        .map(|s| s.parse::<f64>())
        .transpose()
        .map_err(|e| SliceVisError::InvalidParameters(format!("bad dpi: {e}")))?
        .unwrap_or(100.0);

    let grid = GridSpec::new(48, 48, 32, 400.0, 400.0, 100.0);
    let mut snapshot = MemorySnapshot::new("synthetic", grid);
    snapshot.insert_time(36000, 36000.0);
    snapshot.insert_field_with("T", 36000, |plane, i, j| {
        let (a, b) = plane.interior_shape(&grid);
        let u = i as f64 / a as f64;
        let v = j as f64 / b as f64;
        match plane {
            SlicePlane::Xy => 19.6 + 0.3 * (6.0 * u).sin() * (5.0 * v).cos(),
            SlicePlane::Xz | SlicePlane::Yz => 20.0 - 0.9 * v + 0.05 * (8.0 * u).sin(),
        }
    });

    let params = RenderParameters {
        dpi,
        ..RenderParameters::default()
    };

    println!("🎨 Rendering synthetic frame at {} dpi", dpi);
    RenderSession::default().render_from_reader(&snapshot, 36000, &output, &params)?;
    println!("✅ Saved {}", output.display());
    Ok(())
}
