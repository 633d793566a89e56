//! HDF5 (and HDF5-compatible JLD2) snapshot I/O
//!
//! [`Hdf5Snapshot`] opens a container read-only and implements
//! [`SnapshotReader`]. [`write_snapshot`] goes the other way and stores a
//! [`MemorySnapshot`] in the same layout, which is how the demos and tests
//! produce fixture files.

use crate::data_source::{grid_path, squeeze_to_2d, time_path, GridSpec, SlicePlane, SnapshotReader, TIME_GROUP};
use crate::errors::{Result, SliceVisError};
use crate::memory_source::MemorySnapshot;
use hdf5::{Dataset, File, Group};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read handle on one snapshot file
///
/// Each handle owns its own HDF5 file id, so independent handles can be used
/// from different render workers.
pub struct Hdf5Snapshot {
    path: PathBuf,
    file: File,
}

impl Hdf5Snapshot {
    /// Open a snapshot container for reading
    ///
    /// # Errors
    ///
    /// Returns [`SliceVisError::MissingInput`] if the file does not exist or is
    /// not a valid HDF5 container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SliceVisError::MissingInput {
                path: path.to_path_buf(),
                reason: "no such file".to_string(),
            });
        }

        let file = File::open(path).map_err(|e| SliceVisError::MissingInput {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "Opened snapshot container");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn dataset(&self, key: &str) -> Result<Dataset> {
        if !self.file.link_exists(key) {
            return Err(SliceVisError::missing_key(&self.path, key));
        }
        Ok(self.file.dataset(key)?)
    }

    fn read_f64(&self, key: &str) -> Result<f64> {
        Ok(self.dataset(key)?.read_scalar::<f64>()?)
    }

    fn read_size(&self, key: &str) -> Result<usize> {
        let value = self.dataset(key)?.read_scalar::<i64>()?;
        usize::try_from(value).map_err(|_| {
            SliceVisError::invalid_slice(format!("grid size {key} = {value} is negative"))
        })
    }
}

impl SnapshotReader for Hdf5Snapshot {
    fn source(&self) -> &Path {
        &self.path
    }

    fn timestep_keys(&self) -> Result<Vec<String>> {
        if !self.file.link_exists(TIME_GROUP) {
            return Err(SliceVisError::missing_key(&self.path, TIME_GROUP));
        }
        Ok(self.file.group(TIME_GROUP)?.member_names()?)
    }

    fn time(&self, index: u64) -> Result<f64> {
        self.read_f64(&time_path(index))
    }

    fn grid(&self) -> Result<GridSpec> {
        Ok(GridSpec {
            nx: self.read_size(&grid_path("Nx"))?,
            ny: self.read_size(&grid_path("Ny"))?,
            nz: self.read_size(&grid_path("Nz"))?,
            lx: self.read_f64(&grid_path("Lx"))?,
            ly: self.read_f64(&grid_path("Ly"))?,
            lz: self.read_f64(&grid_path("Lz"))?,
        })
    }

    fn raw_slice(&self, field: &str, plane: SlicePlane, index: u64) -> Result<Array2<f64>> {
        let key = plane.dataset_path(field, index);
        let data = self.dataset(&key)?.read_dyn::<f64>()?;
        squeeze_to_2d(data)
    }
}

/// Writes `snapshot` to `path` in the container layout, replacing any existing file.
pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &MemorySnapshot) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;

    let grid = snapshot.grid();
    let grid_group = file.create_group("grid")?;
    for (name, size) in [("Nx", grid.nx), ("Ny", grid.ny), ("Nz", grid.nz)] {
        write_scalar_i64(&grid_group, name, size as i64)?;
    }
    for (name, extent) in [("Lx", grid.lx), ("Ly", grid.ly), ("Lz", grid.lz)] {
        write_scalar_f64(&grid_group, name, extent)?;
    }

    let timeseries = file.create_group("timeseries")?;
    let times = timeseries.create_group("t")?;
    for (key, &t) in snapshot.time_entries() {
        write_scalar_f64(&times, key, t)?;
    }

    for (dataset_path, raw) in snapshot.slice_entries() {
        // dataset_path is "timeseries/<group>/<index>"
        let mut parts = dataset_path.splitn(3, '/').skip(1);
        let (Some(group_name), Some(index)) = (parts.next(), parts.next()) else {
            return Err(SliceVisError::invalid_slice(format!(
                "unexpected slice path '{dataset_path}'"
            )));
        };
        let group = match timeseries.group(group_name) {
            Ok(group) => group,
            Err(_) => timeseries.create_group(group_name)?,
        };
        let dataset = group.new_dataset::<f64>().shape(raw.dim()).create(index)?;
        dataset.write(raw)?;
    }

    debug!(path = %path.display(), "Wrote snapshot container");
    Ok(())
}

fn write_scalar_f64(group: &Group, name: &str, value: f64) -> Result<()> {
    let dataset = group.new_dataset::<f64>().shape(()).create(name)?;
    dataset.write_scalar(&value)?;
    Ok(())
}

fn write_scalar_i64(group: &Group, name: &str, value: i64) -> Result<()> {
    let dataset = group.new_dataset::<i64>().shape(()).create(name)?;
    dataset.write_scalar(&value)?;
    Ok(())
}
