//! Orthographic view of the bounding box
//!
//! The box `[0, Lx] × [0, Ly] × [-Lz, 0]` is first normalised to a 4:4:3
//! aspect centred on the origin, then projected along the viewing direction
//! given by elevation and azimuth (degrees, matplotlib convention) and scaled
//! to fit a pixel rectangle.

use crate::data_source::GridSpec;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Relative box side lengths along x, y and z
pub const BOX_ASPECT: DVec3 = DVec3::new(1.0, 1.0, 0.75);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            elevation_deg: 30.0,
            azimuth_deg: -135.0,
        }
    }
}

impl Camera {
    pub fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            elevation_deg,
            azimuth_deg,
        }
    }

    /// Unit vectors `(toward viewer, screen right, screen up)`
    pub fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let e = self.elevation_deg.to_radians();
        let a = self.azimuth_deg.to_radians();
        let eye = DVec3::new(e.cos() * a.cos(), e.cos() * a.sin(), e.sin());
        let right = DVec3::new(-a.sin(), a.cos(), 0.0);
        let up = eye.cross(right);
        (eye, right, up)
    }
}

/// Pixel rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> [f64; 2] {
        [self.x + self.width / 2.0, self.y + self.height / 2.0]
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Same centre, each side scaled by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let [cx, cy] = self.center();
        let width = self.width * factor;
        let height = self.height * factor;
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }
}

/// World-to-pixel mapping for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    eye: DVec3,
    right: DVec3,
    up: DVec3,
    extents: DVec3,
    scale: f64,
    anchor: [f64; 2],
}

impl Projection {
    /// Fits the projected bounding box of `grid` inside `rect`, preserving aspect.
    pub fn fit(camera: &Camera, grid: &GridSpec, rect: PixelRect) -> Self {
        let (eye, right, up) = camera.basis();
        let mut projection = Self {
            eye,
            right,
            up,
            extents: DVec3::new(grid.lx, grid.ly, grid.lz),
            scale: 1.0,
            anchor: [0.0, 0.0],
        };

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for corner in projection.box_corners() {
            let p = projection.normalize(corner);
            let (sx, sy) = (p.dot(right), p.dot(up));
            min_x = min_x.min(sx);
            max_x = max_x.max(sx);
            min_y = min_y.min(sy);
            max_y = max_y.max(sy);
        }

        let span_x = (max_x - min_x).max(f64::EPSILON);
        let span_y = (max_y - min_y).max(f64::EPSILON);
        projection.scale = (rect.width / span_x).min(rect.height / span_y);

        let [cx, cy] = rect.center();
        projection.anchor = [
            cx - projection.scale * (min_x + max_x) / 2.0,
            cy + projection.scale * (min_y + max_y) / 2.0,
        ];
        projection
    }

    /// The eight corners of `[0, Lx] × [0, Ly] × [-Lz, 0]`
    pub fn box_corners(&self) -> [[f64; 3]; 8] {
        let [lx, ly, lz] = self.extents.to_array();
        let mut corners = [[0.0; 3]; 8];
        for (n, corner) in corners.iter_mut().enumerate() {
            *corner = [
                if n & 1 == 0 { 0.0 } else { lx },
                if n & 2 == 0 { 0.0 } else { ly },
                if n & 4 == 0 { -lz } else { 0.0 },
            ];
        }
        corners
    }

    /// World point to pixel coordinates
    pub fn to_screen(&self, world: [f64; 3]) -> [f64; 2] {
        let p = self.normalize(world);
        [
            self.anchor[0] + self.scale * p.dot(self.right),
            self.anchor[1] - self.scale * p.dot(self.up),
        ]
    }

    /// Signed distance toward the viewer; larger is nearer.
    pub fn depth(&self, world: [f64; 3]) -> f64 {
        self.normalize(world).dot(self.eye)
    }

    /// For each axis, the box coordinate of the side facing away from the viewer
    pub fn far_sides(&self) -> [f64; 3] {
        let [lx, ly, lz] = self.extents.to_array();
        [
            if self.eye.x < 0.0 { lx } else { 0.0 },
            if self.eye.y < 0.0 { ly } else { 0.0 },
            if self.eye.z < 0.0 { 0.0 } else { -lz },
        ]
    }

    /// The opposite of [`Projection::far_sides`]
    pub fn near_sides(&self) -> [f64; 3] {
        let [lx, ly, lz] = self.extents.to_array();
        let far = self.far_sides();
        [lx - far[0], ly - far[1], -lz - far[2]]
    }

    pub fn extents(&self) -> [f64; 3] {
        self.extents.to_array()
    }

    /// Maps the box onto `BOX_ASPECT` centred on the origin
    fn normalize(&self, world: [f64; 3]) -> DVec3 {
        let shifted = DVec3::from(world) + DVec3::new(0.0, 0.0, self.extents.z);
        (shifted / self.extents - 0.5) * BOX_ASPECT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        let grid = GridSpec::new(4, 4, 4, 100.0, 100.0, 100.0);
        Projection::fit(
            &Camera::default(),
            &grid,
            PixelRect::new(0.0, 0.0, 800.0, 600.0),
        )
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let (eye, right, up) = Camera::default().basis();
        for v in [eye, right, up] {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
        assert!(eye.dot(right).abs() < 1e-12);
        assert!(eye.dot(up).abs() < 1e-12);
        assert!(right.dot(up).abs() < 1e-12);
        // screen up keeps a positive world z component
        assert!(up.z > 0.0);
    }

    #[test]
    fn test_default_view_sees_origin_sides() {
        let projection = projection();
        // viewer sits at negative x and y, above the surface
        assert_eq!(projection.far_sides(), [100.0, 100.0, -100.0]);
        assert_eq!(projection.near_sides(), [0.0, 0.0, 0.0]);
        assert!(projection.depth([0.0, 0.0, 0.0]) > projection.depth([100.0, 100.0, -100.0]));
    }

    #[test]
    fn test_box_fits_inside_rect() {
        let projection = projection();
        for corner in projection.box_corners() {
            let [x, y] = projection.to_screen(corner);
            assert!((-1e-9..=800.0 + 1e-9).contains(&x), "x = {x}");
            assert!((-1e-9..=600.0 + 1e-9).contains(&y), "y = {y}");
        }
    }

    #[test]
    fn test_surface_projects_above_bottom() {
        let projection = projection();
        let top = projection.to_screen([50.0, 50.0, 0.0]);
        let bottom = projection.to_screen([50.0, 50.0, -100.0]);
        assert!(top[1] < bottom[1]);
        assert!((top[0] - bottom[0]).abs() < 1e-9);
    }
}
