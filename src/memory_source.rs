//! In-memory snapshot container
//!
//! Holds the same path layout as an on-disk container, so synthetic frames and
//! test fixtures go through exactly the same [`SnapshotReader`] code paths.

use crate::data_source::{time_path, GridSpec, SlicePlane, SnapshotReader};
use crate::errors::{Result, SliceVisError};
use ndarray::Array2;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    name: PathBuf,
    grid: GridSpec,
    times: BTreeMap<String, f64>,
    slices: BTreeMap<String, Array2<f64>>,
}

impl MemorySnapshot {
    /// Create an empty container; `name` stands in for the file path in logs and errors.
    pub fn new(name: impl Into<PathBuf>, grid: GridSpec) -> Self {
        Self {
            name: name.into(),
            grid,
            times: BTreeMap::new(),
            slices: BTreeMap::new(),
        }
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    /// Register a timestep and its simulation time in seconds
    pub fn insert_time(&mut self, index: u64, t: f64) {
        self.times.insert(index.to_string(), t);
    }

    /// Register a raw key under `timeseries/t`, valid or not
    pub fn insert_time_key(&mut self, key: impl Into<String>, t: f64) {
        self.times.insert(key.into(), t);
    }

    /// Store an untrimmed slice array (halo included)
    pub fn insert_slice(&mut self, field: &str, plane: SlicePlane, index: u64, raw: Array2<f64>) {
        self.slices.insert(plane.dataset_path(field, index), raw);
    }

    /// Store all three planes of `field` with a constant interior and a zero halo
    pub fn insert_constant_field(&mut self, field: &str, index: u64, value: f64) {
        self.insert_field_with(field, index, |_, _, _| value);
    }

    /// Store all three planes of `field`, evaluating `f(plane, i, j)` on interior cells.
    ///
    /// `i` and `j` are interior indices along the plane's first and second axis;
    /// halo cells are zero.
    pub fn insert_field_with<F>(&mut self, field: &str, index: u64, f: F)
    where
        F: Fn(SlicePlane, usize, usize) -> f64,
    {
        for plane in SlicePlane::ALL {
            let (n1, n2) = plane.interior_shape(&self.grid);
            let raw = Array2::from_shape_fn((n1 + 2, n2 + 2), |(a, b)| {
                if a == 0 || b == 0 || a == n1 + 1 || b == n2 + 1 {
                    0.0
                } else {
                    f(plane, a - 1, b - 1)
                }
            });
            self.insert_slice(field, plane, index, raw);
        }
    }

    /// `timeseries/t` keys and times, in key order
    pub fn time_entries(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.times.iter()
    }

    /// Slice dataset paths and raw arrays, in path order
    pub fn slice_entries(&self) -> impl Iterator<Item = (&String, &Array2<f64>)> {
        self.slices.iter()
    }
}

impl SnapshotReader for MemorySnapshot {
    fn source(&self) -> &Path {
        &self.name
    }

    fn timestep_keys(&self) -> Result<Vec<String>> {
        Ok(self.times.keys().cloned().collect())
    }

    fn time(&self, index: u64) -> Result<f64> {
        self.times
            .get(&index.to_string())
            .copied()
            .ok_or_else(|| SliceVisError::missing_key(&self.name, time_path(index)))
    }

    fn grid(&self) -> Result<GridSpec> {
        Ok(self.grid)
    }

    fn raw_slice(&self, field: &str, plane: SlicePlane, index: u64) -> Result<Array2<f64>> {
        let key = plane.dataset_path(field, index);
        self.slices
            .get(&key)
            .cloned()
            .ok_or_else(|| SliceVisError::missing_key(&self.name, key))
    }
}
