//! Snapshot index: ordered (timestep, source file) records across all inputs
//!
//! Input paths are ordered naturally by name, then each file contributes its
//! own timesteps in ascending order. Records are never merged or
//! de-duplicated across files: the same index in two files is two records.

use crate::data_source::SnapshotReader;
use crate::errors::{Result, SliceVisError};
use crate::hdf5_io::Hdf5Snapshot;
use crate::utils::sort_paths_naturally;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One renderable timestep and the container it lives in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestepRecord {
    pub index: u64,
    pub source: PathBuf,
}

/// Ordered sequence of timestep records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    records: Vec<TimestepRecord>,
    file_count: usize,
}

impl Timeline {
    pub fn records(&self) -> &[TimestepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of input files the timeline was built from
    pub fn file_count(&self) -> usize {
        self.file_count
    }

    /// # Errors
    ///
    /// Returns [`SliceVisError::EmptyTimeline`] if no timesteps were found.
    pub fn first(&self) -> Result<&TimestepRecord> {
        self.records.first().ok_or(SliceVisError::EmptyTimeline)
    }

    /// # Errors
    ///
    /// Returns [`SliceVisError::EmptyTimeline`] if no timesteps were found.
    pub fn last(&self) -> Result<&TimestepRecord> {
        self.records.last().ok_or(SliceVisError::EmptyTimeline)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimestepRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimestepRecord;
    type IntoIter = std::slice::Iter<'a, TimestepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Builds the timeline from HDF5/JLD2 snapshot files.
///
/// # Errors
///
/// Fails with [`SliceVisError::MissingInput`] for unreadable paths and
/// [`SliceVisError::MissingKey`] if a file lacks `timeseries/t`.
pub fn build_timeline<P: AsRef<Path>>(paths: &[P]) -> Result<Timeline> {
    build_timeline_with(paths, |path: &Path| Hdf5Snapshot::open(path))
}

/// Builds the timeline using `open` to obtain a reader for each path.
pub fn build_timeline_with<P, R, F>(paths: &[P], open: F) -> Result<Timeline>
where
    P: AsRef<Path>,
    R: SnapshotReader,
    F: Fn(&Path) -> Result<R>,
{
    let mut ordered: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    sort_paths_naturally(&mut ordered);

    let mut records = Vec::new();
    for path in &ordered {
        let reader = open(path)?;
        let indices = reader.timesteps()?;
        debug!(
            path = %path.display(),
            count = indices.len(),
            "Indexed snapshot file"
        );
        records.extend(indices.into_iter().map(|index| TimestepRecord {
            index,
            source: path.clone(),
        }));
    }

    let timeline = Timeline {
        records,
        file_count: ordered.len(),
    };

    match (timeline.records.first(), timeline.records.last()) {
        (Some(first), Some(last)) => info!(
            "Found {} snapshots per field across {} files: i={}->{}",
            timeline.len(),
            timeline.file_count,
            first.index,
            last.index
        ),
        _ => info!(
            "Found 0 snapshots per field across {} files",
            timeline.file_count
        ),
    }

    Ok(timeline)
}
