//! Unit tests for the public SliceVis API
//!
//! These exercise the building blocks without touching the file system.

use ndarray::Array2;
use slice_vis::config::RenderConfig;
use slice_vis::data_source::{trim_halo, GridSpec};
use slice_vis::errors::SliceVisError;
use slice_vis::memory_source::MemorySnapshot;
use slice_vis::parallel::{get_parallel_info, ParallelConfig};
use slice_vis::render::colormap::Colormap;
use slice_vis::render::levels::{
    contour_levels, contour_spacing, ColorbarTicks, ContourBands, LEGACY_TEMPERATURE_TICKS,
};
use slice_vis::render::{format_title, RenderParameters, RenderSession};
use slice_vis::timeline::build_timeline_with;
use slice_vis::utils::sort_naturally;
use std::path::Path;

#[test]
fn test_error_messages() {
    let err = SliceVisError::MissingInput {
        path: "run.jld2".into(),
        reason: "no such file".to_string(),
    };
    assert!(err.to_string().contains("run.jld2"));

    let err = SliceVisError::missing_key("run.jld2", "timeseries/T_xy_slice/0");
    assert!(err.to_string().contains("Key 'timeseries/T_xy_slice/0' not found"));

    assert!(SliceVisError::EmptyTimeline.to_string().contains("Timeline is empty"));
    assert!(SliceVisError::UnknownColormap { name: "jet".into() }
        .to_string()
        .contains("jet"));
}

#[test]
fn test_trim_returns_interior_block() {
    for (nx, ny) in [(1, 1), (2, 5), (6, 3)] {
        let raw = Array2::from_shape_fn((nx + 2, ny + 2), |(i, j)| (i * 1000 + j) as f64);
        let trimmed = trim_halo(&raw, (nx, ny)).expect("Trim failed");
        assert_eq!(trimmed.dim(), (nx, ny));
        assert!(trimmed
            .indexed_iter()
            .all(|((i, j), &v)| v == raw[[i + 1, j + 1]]));
    }
}

#[test]
fn test_natural_sort_of_file_names() {
    let mut names = vec!["frame1.jld2", "frame10.jld2", "frame2.jld2"];
    sort_naturally(&mut names);
    assert_eq!(names, vec!["frame1.jld2", "frame2.jld2", "frame10.jld2"]);
}

#[test]
fn test_timeline_keeps_duplicate_indices() {
    let grid = GridSpec::new(2, 2, 2, 1.0, 1.0, 1.0);
    let open = |path: &Path| {
        let mut snapshot = MemorySnapshot::new(path, grid);
        for index in [10, 0, 5] {
            snapshot.insert_time(index, 0.0);
        }
        Ok::<_, SliceVisError>(snapshot)
    };

    let timeline = build_timeline_with(&["first.jld2", "second.jld2"], open).expect("Index failed");
    let indices: Vec<u64> = timeline.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 5, 10, 0, 5, 10]);
    assert_eq!(timeline.first().unwrap().source, Path::new("first.jld2"));
}

#[test]
fn test_temperature_contour_levels() {
    assert!((contour_spacing(19.0, 20.05, 100) - 0.0105).abs() < 1e-12);

    let levels = contour_levels(19.0, 20.05, 100);
    assert_eq!(levels.len(), 100);
    assert_eq!(levels[0], 19.0);
    assert!(levels[99] >= 20.039 - 1e-9 && levels[99] < 20.05);

    let bands = ContourBands::new(levels).expect("Bands failed");
    assert_eq!(bands.band_count(), 99);
    assert_eq!(bands.classify(25.0), Some(98));
    assert_eq!(bands.classify(0.0), Some(0));
}

#[test]
fn test_default_ticks_reproduce_legacy_set() {
    let params = RenderParameters::default();
    assert_eq!(
        params.ticks.resolve(params.vmin, params.vmax),
        LEGACY_TEMPERATURE_TICKS.to_vec()
    );
    assert_eq!(
        ColorbarTicks::Fixed(vec![1.0]).resolve(params.vmin, params.vmax),
        vec![1.0]
    );
}

#[test]
fn test_title_format() {
    assert_eq!(format_title(3661.0), "t = 03661 s (1.02 hours)");
    assert_eq!(format_title(0.0), "t = 00000 s (0.00 hours)");
}

#[test]
fn test_colormap_lookup() {
    assert!(Colormap::by_name("inferno").is_ok());
    assert!(Colormap::by_name("magma_r").unwrap().is_reversed());
    assert!(matches!(
        Colormap::by_name("rainbow"),
        Err(SliceVisError::UnknownColormap { .. })
    ));
}

#[test]
fn test_config_precedence() {
    let file = RenderConfig::from_json(r#"{"vmin": 10, "vmax": 12, "colormap": "viridis"}"#)
        .expect("Config parse failed");
    let flags = RenderConfig {
        vmax: Some(11.0),
        ..RenderConfig::default()
    };
    let params = file.merge(flags).to_parameters();
    assert_eq!((params.vmin, params.vmax), (10.0, 11.0));
    assert_eq!(params.colormap, "viridis");
    assert_eq!(params.n_contours, 100);
}

#[test]
fn test_in_memory_frame() {
    let mut snapshot = MemorySnapshot::new("synthetic", GridSpec::new(8, 6, 5, 200.0, 150.0, 50.0));
    snapshot.insert_time(3, 7200.0);
    snapshot.insert_field_with("T", 3, |_, i, j| 19.0 + 0.1 * (i + j) as f64);

    let params = RenderParameters { dpi: 15.0, ..RenderParameters::default() };
    let frame = RenderSession::default()
        .compose_frame(&snapshot, 3, &params)
        .expect("Compose failed");

    assert_eq!(frame.title, "t = 07200 s (2.00 hours)");
    assert_eq!((frame.width, frame.height), (240, 135));
    assert!(frame.rgb.iter().any(|&c| c > 0));
}

#[test]
fn test_parallel_config() {
    let config = ParallelConfig::from_thread_option(Some(2));
    assert_eq!(config.num_threads, Some(2));
    assert!(config.current_threads() >= 1);

    let info = get_parallel_info();
    assert!(info.available_cores >= 1);
    assert!(info.available_parallelism >= 1);
}
