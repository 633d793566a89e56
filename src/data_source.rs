//! Data source abstraction over simulation snapshot containers
//!
//! A snapshot container is a read-only hierarchy of datasets addressed by
//! string paths. The layout written by the ocean model is:
//!
//! ```text
//! timeseries/t/<index>                   simulation time in seconds
//! grid/{Nx,Ny,Nz}                        grid sizes
//! grid/{Lx,Ly,Lz}                        physical extents
//! timeseries/<field>_<plane>_slice/<index>  2-D slice with a one-cell halo
//! ```
//!
//! [`SlicePlane::dataset_path`] is the only place that knows how slice paths are
//! spelled, and [`SnapshotReader::get_slice`] is the typed accessor every
//! reader gets for free.

use crate::errors::{Result, SliceVisError};
use ndarray::{s, Array2, ArrayD, Axis, Ix2};
use std::fmt;
use std::path::Path;

/// Group whose keys enumerate the available timesteps
pub const TIME_GROUP: &str = "timeseries/t";

/// Path of the simulation time scalar for a timestep
pub fn time_path(index: u64) -> String {
    format!("{TIME_GROUP}/{index}")
}

/// Path of a grid scalar such as `Nx` or `Lz`
pub fn grid_path(name: &str) -> String {
    format!("grid/{name}")
}

/// Orientation of a 2-D cross section through the 3-D field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlicePlane {
    /// Horizontal slice, shape `Nx × Ny`
    Xy,
    /// Vertical slice along x, shape `Nx × Nz`
    Xz,
    /// Vertical slice along y, shape `Ny × Nz`
    Yz,
}

impl SlicePlane {
    pub const ALL: [SlicePlane; 3] = [SlicePlane::Xy, SlicePlane::Xz, SlicePlane::Yz];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xy => "xy",
            Self::Xz => "xz",
            Self::Yz => "yz",
        }
    }

    /// Dataset path of this plane's slice of `field` at `index`
    #[must_use]
    pub fn dataset_path(self, field: &str, index: u64) -> String {
        format!("timeseries/{field}_{}_slice/{index}", self.as_str())
    }

    /// Interior (halo-free) shape of this plane on `grid`
    #[must_use]
    pub const fn interior_shape(self, grid: &GridSpec) -> (usize, usize) {
        match self {
            Self::Xy => (grid.nx, grid.ny),
            Self::Xz => (grid.nx, grid.nz),
            Self::Yz => (grid.ny, grid.nz),
        }
    }
}

impl fmt::Display for SlicePlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grid sizes and physical extents, constant across a container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub lx: f64,
    pub ly: f64,
    pub lz: f64,
}

impl GridSpec {
    pub fn new(nx: usize, ny: usize, nz: usize, lx: f64, ly: f64, lz: f64) -> Self {
        Self {
            nx,
            ny,
            nz,
            lx,
            ly,
            lz,
        }
    }
}

/// The three halo-trimmed slices of one field at one timestep
#[derive(Debug, Clone, PartialEq)]
pub struct SliceTriple {
    /// Shape `Nx × Ny`
    pub xy: Array2<f64>,
    /// Shape `Nx × Nz`
    pub xz: Array2<f64>,
    /// Shape `Ny × Nz`
    pub yz: Array2<f64>,
}

/// Read-only access to one snapshot container
///
/// Implementations only provide raw dataset access; halo trimming and slice
/// assembly are shared provided methods.
pub trait SnapshotReader {
    /// Location the container was opened from, used in error messages and logs
    fn source(&self) -> &Path;

    /// Raw keys of the [`TIME_GROUP`] group, in storage order
    fn timestep_keys(&self) -> Result<Vec<String>>;

    /// Simulation time in seconds for a timestep
    fn time(&self, index: u64) -> Result<f64>;

    /// Grid sizes and extents
    fn grid(&self) -> Result<GridSpec>;

    /// Untrimmed slice array as stored, squeezed to two dimensions
    fn raw_slice(&self, field: &str, plane: SlicePlane, index: u64) -> Result<Array2<f64>>;

    /// Timestep indices parsed from [`SnapshotReader::timestep_keys`], ascending
    fn timesteps(&self) -> Result<Vec<u64>> {
        let mut indices = self
            .timestep_keys()?
            .iter()
            .map(|key| parse_timestep_key(key))
            .collect::<Result<Vec<u64>>>()?;
        indices.sort_unstable();
        Ok(indices)
    }

    /// Halo-trimmed slice of `field` on `plane` at `index`
    fn get_slice(&self, field: &str, plane: SlicePlane, index: u64) -> Result<Array2<f64>> {
        let grid = self.grid()?;
        let raw = self.raw_slice(field, plane, index)?;
        trim_halo(&raw, plane.interior_shape(&grid))
    }

    /// All three trimmed slices for one render call
    fn slice_triple(&self, field: &str, index: u64, grid: &GridSpec) -> Result<SliceTriple> {
        let read = |plane: SlicePlane| -> Result<Array2<f64>> {
            let raw = self.raw_slice(field, plane, index)?;
            trim_halo(&raw, plane.interior_shape(grid))
        };

        Ok(SliceTriple {
            xy: read(SlicePlane::Xy)?,
            xz: read(SlicePlane::Xz)?,
            yz: read(SlicePlane::Yz)?,
        })
    }
}

/// Grid and timestep overview of one container
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub source: std::path::PathBuf,
    pub grid: GridSpec,
    /// Ascending timestep indices
    pub timesteps: Vec<u64>,
    /// Simulation time of the first and last timestep, in seconds
    pub time_span: Option<(f64, f64)>,
}

impl SnapshotSummary {
    pub fn from_reader<R: SnapshotReader + ?Sized>(reader: &R) -> Result<Self> {
        let timesteps = reader.timesteps()?;
        let time_span = match (timesteps.first(), timesteps.last()) {
            (Some(&first), Some(&last)) => Some((reader.time(first)?, reader.time(last)?)),
            _ => None,
        };

        Ok(Self {
            source: reader.source().to_path_buf(),
            grid: reader.grid()?,
            timesteps,
            time_span,
        })
    }
}

impl fmt::Display for SnapshotSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.grid;
        writeln!(f, "{}", self.source.display())?;
        writeln!(f, "  grid: {} x {} x {} cells", g.nx, g.ny, g.nz)?;
        writeln!(f, "  domain: {} x {} x {} m", g.lx, g.ly, g.lz)?;
        match (self.timesteps.first(), self.timesteps.last(), self.time_span) {
            (Some(first), Some(last), Some((t0, t1))) => write!(
                f,
                "  timesteps: {} (i={}->{}, t={}->{} s)",
                self.timesteps.len(),
                first,
                last,
                t0,
                t1
            ),
            _ => write!(f, "  timesteps: none"),
        }
    }
}

/// Drops the one-cell halo, returning the `[1..n1+1, 1..n2+1]` block.
///
/// # Errors
///
/// Returns [`SliceVisError::InvalidSlice`] if `raw` is smaller than
/// `(n1 + 2, n2 + 2)`.
pub fn trim_halo(raw: &Array2<f64>, interior: (usize, usize)) -> Result<Array2<f64>> {
    let (n1, n2) = interior;
    let (r1, r2) = raw.dim();
    if r1 < n1 + 2 || r2 < n2 + 2 {
        return Err(SliceVisError::invalid_slice(format!(
            "raw slice of shape ({r1}, {r2}) cannot hold a ({n1}, {n2}) interior with a one-cell halo"
        )));
    }

    Ok(raw.slice(s![1..n1 + 1, 1..n2 + 1]).to_owned())
}

/// Removes singleton axes until the array is two-dimensional.
///
/// Some writers store slices as `(n1, n2, 1)`; those are accepted.
pub fn squeeze_to_2d(data: ArrayD<f64>) -> Result<Array2<f64>> {
    let original_shape = data.shape().to_vec();
    let mut data = data;

    while data.ndim() > 2 {
        match data.shape().iter().rposition(|&len| len == 1) {
            Some(axis) => data = data.index_axis_move(Axis(axis), 0),
            None => break,
        }
    }

    data.into_dimensionality::<Ix2>().map_err(|_| {
        SliceVisError::invalid_slice(format!(
            "expected a 2-D slice, found shape {original_shape:?}"
        ))
    })
}

/// Parses a `timeseries/t` key as a non-negative integer index.
pub fn parse_timestep_key(key: &str) -> Result<u64> {
    key.trim().parse::<u64>().map_err(|_| {
        SliceVisError::invalid_slice(format!(
            "timestep key '{key}' is not a non-negative integer"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_slice_paths() {
        assert_eq!(
            SlicePlane::Xy.dataset_path("T", 120),
            "timeseries/T_xy_slice/120"
        );
        assert_eq!(
            SlicePlane::Yz.dataset_path("u", 0),
            "timeseries/u_yz_slice/0"
        );
        assert_eq!(time_path(7), "timeseries/t/7");
        assert_eq!(grid_path("Lz"), "grid/Lz");
    }

    #[test]
    fn test_interior_shapes() {
        let grid = GridSpec::new(4, 5, 6, 1.0, 1.0, 1.0);
        assert_eq!(SlicePlane::Xy.interior_shape(&grid), (4, 5));
        assert_eq!(SlicePlane::Xz.interior_shape(&grid), (4, 6));
        assert_eq!(SlicePlane::Yz.interior_shape(&grid), (5, 6));
    }

    #[test]
    fn test_trim_halo_interior_block() {
        for (n1, n2) in [(1, 1), (1, 3), (4, 4), (7, 2)] {
            let raw = Array2::from_shape_fn((n1 + 2, n2 + 2), |(i, j)| (i * 100 + j) as f64);
            let trimmed = trim_halo(&raw, (n1, n2)).unwrap();
            assert_eq!(trimmed.dim(), (n1, n2));
            for ((i, j), &value) in trimmed.indexed_iter() {
                assert_eq!(value, raw[[i + 1, j + 1]]);
            }
        }
    }

    #[test]
    fn test_trim_halo_rejects_small_array() {
        let raw = Array2::<f64>::zeros((5, 5));
        let err = trim_halo(&raw, (4, 4)).unwrap_err();
        assert!(matches!(err, SliceVisError::InvalidSlice { .. }));
    }

    #[test]
    fn test_squeeze_singleton_axis() {
        let data = Array3::from_shape_fn((3, 4, 1), |(i, j, _)| (i + j) as f64).into_dyn();
        let squeezed = squeeze_to_2d(data).unwrap();
        assert_eq!(squeezed.dim(), (3, 4));
        assert_eq!(squeezed[[2, 3]], 5.0);
    }

    #[test]
    fn test_squeeze_rejects_volume() {
        let data = Array3::<f64>::zeros((3, 4, 2)).into_dyn();
        assert!(squeeze_to_2d(data).is_err());
    }

    #[test]
    fn test_summary() {
        use crate::memory_source::MemorySnapshot;

        let mut snapshot = MemorySnapshot::new("run.jld2", GridSpec::new(4, 4, 8, 100.0, 100.0, 50.0));
        for index in [120, 0, 60] {
            snapshot.insert_time(index, index as f64 * 10.0);
        }

        let summary = SnapshotSummary::from_reader(&snapshot).unwrap();
        assert_eq!(summary.timesteps, vec![0, 60, 120]);
        assert_eq!(summary.time_span, Some((0.0, 1200.0)));
        let text = summary.to_string();
        assert!(text.contains("grid: 4 x 4 x 8 cells"));
        assert!(text.contains("timesteps: 3 (i=0->120, t=0->1200 s)"));
    }

    #[test]
    fn test_parse_timestep_key() {
        assert_eq!(parse_timestep_key("0").unwrap(), 0);
        assert_eq!(parse_timestep_key("36000").unwrap(), 36000);
        assert!(parse_timestep_key("-1").is_err());
        assert!(parse_timestep_key("t5").is_err());
    }
}
