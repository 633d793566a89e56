//! Coordinate meshes for the three contour faces
//!
//! Each face is a planar rectangle on one side of the bounding box
//! `[0, Lx] × [0, Ly] × [-Lz, 0]`. Its in-plane coordinates come from a
//! meshgrid of evenly spaced samples, with depth running downward so the
//! vertical axis samples `0 → -Lz`.

use crate::data_source::{GridSpec, SliceTriple};
use crate::errors::{Result, SliceVisError};
use ndarray::{Array1, Array2};

/// `n` evenly spaced samples from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, end, n)
}

/// Coordinate matrices from two coordinate vectors, with `xy` indexing:
/// both outputs have shape `(b.len(), a.len())`, `A[[i, j]] = a[j]` and
/// `B[[i, j]] = b[i]`.
pub fn meshgrid(a: &Array1<f64>, b: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (b.len(), a.len());
    (
        Array2::from_shape_fn(shape, |(_, j)| a[j]),
        Array2::from_shape_fn(shape, |(i, _)| b[i]),
    )
}

/// World axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldAxis {
    X,
    Y,
    Z,
}

impl WorldAxis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Distance of each face from its side of the box
///
/// The x-face sits `Lx / 1000` inside the box; the other two faces sit
/// exactly on their sides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceOffsets {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FaceOffsets {
    pub fn observed(grid: &GridSpec) -> Self {
        Self {
            x: grid.lx / 1000.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// One filled-contour face: a meshgrid over two world axes, a fixed
/// coordinate on the third, and the field values at every mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceMesh {
    normal: WorldAxis,
    offset: f64,
    u_axis: WorldAxis,
    v_axis: WorldAxis,
    u_mesh: Array2<f64>,
    v_mesh: Array2<f64>,
    /// Shape `(nv, nu)`, aligned with the meshes
    values: Array2<f64>,
}

impl FaceMesh {
    /// Builds a face from 1-D coordinates and a slice.
    ///
    /// Values follow the meshgrid convention: `slice[[r, c]]` sits at
    /// `(u[c], v[r])`, so a slice shaped `(nv, nu)` is used as stored. A
    /// non-square slice shaped `(nu, nv)` cannot be read that way and is
    /// placed with `slice[[i, j]]` at `(u[i], v[j])`.
    ///
    /// # Errors
    ///
    /// Returns [`SliceVisError::RenderBackend`] if either axis has fewer than two
    /// samples, and [`SliceVisError::InvalidSlice`] if the slice shape matches
    /// neither orientation.
    pub fn new(
        normal: WorldAxis,
        offset: f64,
        (u_axis, u): (WorldAxis, Array1<f64>),
        (v_axis, v): (WorldAxis, Array1<f64>),
        slice: &Array2<f64>,
    ) -> Result<Self> {
        if u.len() < 2 || v.len() < 2 {
            return Err(SliceVisError::RenderBackend(format!(
                "a filled contour face needs at least a 2x2 mesh, got {}x{}",
                u.len(),
                v.len()
            )));
        }
        let values = if slice.dim() == (v.len(), u.len()) {
            slice.to_owned()
        } else if slice.dim() == (u.len(), v.len()) {
            slice.t().to_owned()
        } else {
            return Err(SliceVisError::invalid_slice(format!(
                "slice of shape {:?} does not match a {}x{} mesh",
                slice.dim(),
                u.len(),
                v.len()
            )));
        };

        let (u_mesh, v_mesh) = meshgrid(&u, &v);
        Ok(Self {
            normal,
            offset,
            u_axis,
            v_axis,
            u_mesh,
            v_mesh,
            values,
        })
    }

    /// The three faces of one frame: z-face `(x, y)`, x-face `(y, -z)` and
    /// y-face `(x, -z)`.
    pub fn faces(grid: &GridSpec, slices: &SliceTriple, offsets: FaceOffsets) -> Result<[Self; 3]> {
        let x = linspace(0.0, grid.lx, grid.nx);
        let y = linspace(0.0, grid.ly, grid.ny);
        let depth = linspace(0.0, -grid.lz, grid.nz);

        Ok([
            Self::new(
                WorldAxis::Z,
                offsets.z,
                (WorldAxis::X, x.clone()),
                (WorldAxis::Y, y.clone()),
                &slices.xy,
            )?,
            Self::new(
                WorldAxis::X,
                offsets.x,
                (WorldAxis::Y, y),
                (WorldAxis::Z, depth.clone()),
                &slices.yz,
            )?,
            Self::new(
                WorldAxis::Y,
                offsets.y,
                (WorldAxis::X, x),
                (WorldAxis::Z, depth),
                &slices.xz,
            )?,
        ])
    }

    pub fn normal(&self) -> WorldAxis {
        self.normal
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn u_mesh(&self) -> &Array2<f64> {
        &self.u_mesh
    }

    pub fn v_mesh(&self) -> &Array2<f64> {
        &self.v_mesh
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// World position of the point at fractional mesh position `(s, t)`,
    /// `s` along the u axis and `t` along the v axis, both in `[0, 1]`.
    pub fn world(&self, s: f64, t: f64) -> [f64; 3] {
        let (nv, nu) = self.values.dim();
        let u0 = self.u_mesh[[0, 0]];
        let u1 = self.u_mesh[[0, nu - 1]];
        let v0 = self.v_mesh[[0, 0]];
        let v1 = self.v_mesh[[nv - 1, 0]];

        let mut point = [0.0; 3];
        point[self.normal.index()] = self.offset;
        point[self.u_axis.index()] = u0 + s * (u1 - u0);
        point[self.v_axis.index()] = v0 + t * (v1 - v0);
        point
    }

    /// Corners in `(s, t)` order `(0,0)`, `(1,0)`, `(1,1)`, `(0,1)`
    pub fn corners(&self) -> [[f64; 3]; 4] {
        [
            self.world(0.0, 0.0),
            self.world(1.0, 0.0),
            self.world(1.0, 1.0),
            self.world(0.0, 1.0),
        ]
    }

    pub fn center(&self) -> [f64; 3] {
        self.world(0.5, 0.5)
    }

    /// Bilinear interpolation of the node values at `(s, t)`.
    ///
    /// NaN nodes contribute NaN to every cell they touch.
    pub fn sample(&self, s: f64, t: f64) -> f64 {
        let (nv, nu) = self.values.dim();
        let (col, fx) = cell(s, nu);
        let (row, fy) = cell(t, nv);

        let v00 = self.values[[row, col]];
        let v01 = self.values[[row, col + 1]];
        let v10 = self.values[[row + 1, col]];
        let v11 = self.values[[row + 1, col + 1]];

        let top = v00 + (v01 - v00) * fx;
        let bottom = v10 + (v11 - v10) * fx;
        top + (bottom - top) * fy
    }
}

// Lower node index and fraction within the cell for a unit position on `n` nodes.
fn cell(position: f64, n: usize) -> (usize, f64) {
    let scaled = position.clamp(0.0, 1.0) * (n - 1) as f64;
    let lower = (scaled.floor() as usize).min(n - 2);
    (lower, scaled - lower as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSpec {
        GridSpec::new(3, 4, 5, 100.0, 200.0, 50.0)
    }

    fn triple(grid: &GridSpec) -> SliceTriple {
        SliceTriple {
            xy: Array2::from_shape_fn((grid.nx, grid.ny), |(i, j)| (10 * i + j) as f64),
            xz: Array2::from_shape_fn((grid.nx, grid.nz), |(i, k)| (10 * i + k) as f64),
            yz: Array2::from_shape_fn((grid.ny, grid.nz), |(j, k)| (10 * j + k) as f64),
        }
    }

    #[test]
    fn test_meshgrid_xy_indexing() {
        let (a, b) = meshgrid(&linspace(0.0, 2.0, 3), &linspace(0.0, -1.0, 2));
        assert_eq!(a.dim(), (2, 3));
        assert_eq!(a.row(1).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(b.column(2).to_vec(), vec![0.0, -1.0]);
    }

    #[test]
    fn test_face_geometry() {
        let grid = grid();
        let [top, x_face, y_face] =
            FaceMesh::faces(&grid, &triple(&grid), FaceOffsets::observed(&grid)).unwrap();

        assert_eq!(top.corners()[2], [100.0, 200.0, 0.0]);
        assert_eq!(x_face.corners()[0], [0.1, 0.0, 0.0]);
        assert_eq!(x_face.corners()[2], [0.1, 200.0, -50.0]);
        assert_eq!(y_face.corners()[2], [100.0, 0.0, -50.0]);
        assert_eq!(y_face.values().dim(), (grid.nz, grid.nx));
    }

    #[test]
    fn test_sample_hits_nodes_and_interpolates() {
        let grid = grid();
        let [top, _, _] =
            FaceMesh::faces(&grid, &triple(&grid), FaceOffsets::observed(&grid)).unwrap();

        // non-square xy[[i, j]] = 10 i + j: i runs along x (3 nodes), j along y (4 nodes)
        assert_eq!(top.sample(0.0, 0.0), 0.0);
        assert_eq!(top.sample(1.0, 1.0), 23.0);
        assert_eq!(top.sample(0.5, 0.0), 10.0);
        assert!((top.sample(0.25, 0.0) - 5.0).abs() < 1e-12);
        assert!((top.sample(0.0, 0.5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_square_slice_rows_run_along_v() {
        // xy[[r, c]] = r on a square grid: the value grows along y, not x
        let grid = GridSpec::new(3, 3, 3, 30.0, 30.0, 30.0);
        let slices = SliceTriple {
            xy: Array2::from_shape_fn((3, 3), |(r, _)| r as f64),
            xz: Array2::from_shape_fn((3, 3), |(r, _)| r as f64),
            yz: Array2::from_shape_fn((3, 3), |(r, _)| r as f64),
        };
        let [top, x_face, y_face] =
            FaceMesh::faces(&grid, &slices, FaceOffsets::observed(&grid)).unwrap();

        assert_eq!(top.sample(1.0, 0.0), 0.0);
        assert_eq!(top.sample(0.0, 1.0), 2.0);
        assert_eq!(top.values(), &slices.xy);

        // vertical faces: rows run down the depth axis
        for face in [&x_face, &y_face] {
            assert_eq!(face.sample(1.0, 0.0), 0.0);
            assert_eq!(face.sample(0.0, 1.0), 2.0);
            assert_eq!(face.world(0.0, 1.0)[2], -30.0);
        }
    }

    #[test]
    fn test_mismatched_slice_is_invalid() {
        let err = FaceMesh::new(
            WorldAxis::Z,
            0.0,
            (WorldAxis::X, linspace(0.0, 1.0, 3)),
            (WorldAxis::Y, linspace(0.0, 1.0, 4)),
            &Array2::zeros((2, 5)),
        )
        .unwrap_err();
        assert!(matches!(err, SliceVisError::InvalidSlice { .. }));
    }

    #[test]
    fn test_single_sample_axis_is_backend_error() {
        let grid = GridSpec::new(1, 4, 4, 1.0, 1.0, 1.0);
        let slices = SliceTriple {
            xy: Array2::zeros((1, 4)),
            xz: Array2::zeros((1, 4)),
            yz: Array2::zeros((4, 4)),
        };
        let err = FaceMesh::faces(&grid, &slices, FaceOffsets::observed(&grid)).unwrap_err();
        assert!(matches!(err, SliceVisError::RenderBackend(_)));
    }

    #[test]
    fn test_nan_nodes_propagate() {
        let mut values = Array2::from_elem((2, 2), 1.0);
        values[[1, 1]] = f64::NAN;
        let face = FaceMesh::new(
            WorldAxis::Z,
            0.0,
            (WorldAxis::X, linspace(0.0, 1.0, 2)),
            (WorldAxis::Y, linspace(0.0, 1.0, 2)),
            &values,
        )
        .unwrap();
        assert!(face.sample(0.5, 0.5).is_nan());
    }
}
