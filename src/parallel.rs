//! Parallel processing configuration and batch frame rendering
//!
//! This module configures Rayon's global thread pool and renders a whole
//! timeline as a numbered frame sequence, one frame per task. A frame that
//! fails is logged and reported; it never stops the others.

use crate::data_source::SnapshotReader;
use crate::errors::{Result, SliceVisError};
use crate::hdf5_io::Hdf5Snapshot;
use crate::render::{RenderParameters, RenderSession};
use crate::timeline::Timeline;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Configuration for parallel processing
#[derive(Debug, Clone, Default)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    /// Configuration for a `--threads` option: that many threads when given,
    /// all CPU cores otherwise
    pub fn from_thread_option(num_threads: Option<usize>) -> Self {
        match num_threads {
            Some(n) => Self::with_threads(n),
            None => Self::all_cores(),
        }
    }

    /// Set up the global Rayon thread pool with the specified configuration
    pub fn setup_global_pool(&self) -> Result<()> {
        if let Some(num_threads) = self.num_threads {
            ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build_global()
                .map_err(|e| {
                    SliceVisError::ThreadPool(format!(
                        "Failed to initialize thread pool with {} threads: {}",
                        num_threads, e
                    ))
                })?;

            info!("Configured parallel rendering with {} threads", num_threads);
        } else {
            info!("Using default thread pool configuration");
        }

        Ok(())
    }

    /// Get the current number of threads being used
    pub fn current_threads(&self) -> usize {
        rayon::current_num_threads()
    }

    /// Create a configuration that uses all available CPU cores
    pub fn all_cores() -> Self {
        Self {
            num_threads: Some(num_cpus::get()),
        }
    }

    /// Create a configuration that uses a specific number of threads
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
        }
    }
}

/// Get information about the current parallel configuration
pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

/// Information about the parallel processing environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

impl ParallelInfo {
    /// Log parallel processing information at debug level
    pub fn log(&self) {
        debug!(
            current_threads = self.current_threads,
            available_cores = self.available_cores,
            available_parallelism = self.available_parallelism,
            "Parallel processing information"
        );
    }
}

/// Outcome of rendering a whole timeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Written frames, in sequence order
    pub rendered: Vec<PathBuf>,
    /// Sequence number and error message of every failed frame
    pub failed: Vec<(usize, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.rendered.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// File name of frame `seq` of `field` in a movie sequence
pub fn frame_file_name(field: &str, seq: usize) -> String {
    format!("{field}_{seq:05}.png")
}

/// Renders every timeline record into `out_dir`, opening each container
/// from disk.
///
/// # Errors
///
/// Fails as a whole only for invalid parameters, an empty timeline, or an
/// output directory that cannot be created. Per-frame failures end up in the
/// returned [`BatchReport`].
pub fn render_timeline(
    session: &RenderSession,
    timeline: &Timeline,
    params: &RenderParameters,
    out_dir: &Path,
) -> Result<BatchReport> {
    render_timeline_with(session, timeline, params, out_dir, |path: &Path| {
        Hdf5Snapshot::open(path)
    })
}

/// Renders every timeline record, using `open` to obtain a reader per frame.
pub fn render_timeline_with<R, F>(
    session: &RenderSession,
    timeline: &Timeline,
    params: &RenderParameters,
    out_dir: &Path,
    open: F,
) -> Result<BatchReport>
where
    R: SnapshotReader,
    F: Fn(&Path) -> Result<R> + Sync,
{
    params.validate()?;
    if timeline.is_empty() {
        return Err(SliceVisError::EmptyTimeline);
    }
    std::fs::create_dir_all(out_dir)?;

    info!(
        "Rendering {} frames of {} into {}",
        timeline.len(),
        params.field,
        out_dir.display()
    );

    let outcomes: Vec<(usize, Result<PathBuf>)> = timeline
        .records()
        .par_iter()
        .enumerate()
        .map(|(seq, record)| {
            let output = out_dir.join(frame_file_name(&params.field, seq));
            let outcome = open(&record.source)
                .and_then(|reader| {
                    session.render_from_reader(&reader, record.index, &output, params)
                })
                .map(|()| output);
            (seq, outcome)
        })
        .collect();

    let mut report = BatchReport::default();
    for (seq, outcome) in outcomes {
        match outcome {
            Ok(path) => report.rendered.push(path),
            Err(e) => {
                error!("Frame {} failed: {}", seq, e);
                report.failed.push((seq, e.to_string()));
            }
        }
    }

    info!(
        "Rendered {} of {} frames",
        report.rendered.len(),
        report.total()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::GridSpec;
    use crate::memory_source::MemorySnapshot;
    use crate::timeline::build_timeline_with;
    use std::collections::HashMap;

    fn containers() -> HashMap<PathBuf, MemorySnapshot> {
        let grid = GridSpec::new(4, 4, 4, 100.0, 100.0, 100.0);
        let mut good = MemorySnapshot::new("run_1.jld2", grid);
        let mut partial = MemorySnapshot::new("run_2.jld2", grid);
        for index in [0, 60] {
            good.insert_time(index, index as f64);
            good.insert_constant_field("T", index, 19.5);
        }
        // second timestep has no slices
        partial.insert_time(120, 120.0);
        partial.insert_constant_field("T", 120, 19.7);
        partial.insert_time(180, 180.0);

        [("run_1.jld2", good), ("run_2.jld2", partial)]
            .into_iter()
            .map(|(name, snapshot)| (PathBuf::from(name), snapshot))
            .collect()
    }

    fn small() -> RenderParameters {
        RenderParameters {
            n_contours: 10,
            dpi: 10.0,
            ..RenderParameters::default()
        }
    }

    #[test]
    fn test_frame_file_name() {
        assert_eq!(frame_file_name("T", 7), "T_00007.png");
        assert_eq!(frame_file_name("u", 123456), "u_123456.png");
    }

    #[test]
    fn test_failures_are_isolated_per_frame() {
        let map = containers();
        let open = |path: &Path| {
            map.get(path).cloned().ok_or_else(|| SliceVisError::MissingInput {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            })
        };
        let timeline = build_timeline_with(&["run_2.jld2", "run_1.jld2"], open).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let report = render_timeline_with(
            &RenderSession::default(),
            &timeline,
            &small(),
            dir.path(),
            open,
        )
        .unwrap();

        assert_eq!(report.total(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, 3);
        assert!(report.failed[0].1.contains("T_xy_slice/180"));
        assert_eq!(
            report.rendered,
            (0..3)
                .map(|seq| dir.path().join(frame_file_name("T", seq)))
                .collect::<Vec<_>>()
        );
        assert!(report.rendered.iter().all(|p| p.metadata().unwrap().len() > 0));
        assert!(!dir.path().join(frame_file_name("T", 3)).exists());
    }

    #[test]
    fn test_empty_timeline_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_timeline(
            &RenderSession::default(),
            &Timeline::default(),
            &small(),
            dir.path(),
        )
        .unwrap_err();
        assert!(matches!(err, SliceVisError::EmptyTimeline));
    }

    #[test]
    fn test_parallel_config_constructors() {
        assert_eq!(ParallelConfig::default().num_threads, None);
        assert_eq!(ParallelConfig::with_threads(3).num_threads, Some(3));
        assert!(ParallelConfig::all_cores().num_threads.unwrap() >= 1);
        assert_eq!(
            ParallelConfig::from_thread_option(Some(5)).num_threads,
            Some(5)
        );
        assert_eq!(
            ParallelConfig::from_thread_option(None).num_threads,
            Some(num_cpus::get())
        );
        assert!(get_parallel_info().available_cores >= 1);
    }
}
