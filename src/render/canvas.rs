//! Figure composition on a tiny-skia pixmap
//!
//! Vector parts (panes, axis lines, tick marks, text strokes) go through
//! tiny-skia paths. Contour faces and the colour bar are shaded per pixel:
//! every covered pixel centre is mapped back to unit face coordinates,
//! sampled and classified into a band, rows in parallel.

use crate::errors::{Result, SliceVisError};
use crate::render::camera::{PixelRect, Projection};
use crate::render::colormap::Rgb;
use crate::render::levels::{format_ticks, ContourBands};
use crate::render::mesh::{linspace, FaceMesh};
use crate::render::text::{Typeface, PAD};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

/// Figure size in inches
pub const FIGURE_INCHES: (f64, f64) = (16.0, 9.0);

const TITLE_PT: f64 = 12.0;
const LABEL_PT: f64 = 10.0;
const TICK_PT: f64 = 10.0;
const LINE_PT: f64 = 0.8;
const GRID_PT: f64 = 0.6;
const TICKS_PER_AXIS: usize = 5;

/// Background style of a figure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light strokes on black
    #[default]
    Dark,
    /// Dark strokes on white
    Light,
}

impl Theme {
    pub fn background(self) -> Rgb {
        match self {
            Self::Dark => [0, 0, 0],
            Self::Light => [255, 255, 255],
        }
    }

    pub fn foreground(self) -> Rgb {
        match self {
            Self::Dark => [255, 255, 255],
            Self::Light => [0, 0, 0],
        }
    }

    /// Half-transparent light grey panes blended onto the background
    pub fn pane(self) -> Rgb {
        let [r, g, b] = self.background();
        let blend = |c: u8| ((u16::from(c) + 242) / 2) as u8;
        [blend(r), blend(g), blend(b)]
    }

    pub fn grid(self) -> Rgb {
        match self {
            Self::Dark => [200, 200, 200],
            Self::Light => [176, 176, 176],
        }
    }
}

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

/// Pixel regions of the figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Region holding the 3-D axes and their labels
    pub axes: PixelRect,
    /// Region the bounding box is fitted into
    pub plot: PixelRect,
    pub colorbar: PixelRect,
    /// Centre of the title baseline row
    pub title: [f64; 2],
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (f64::from(width), f64::from(height));
        let axes = PixelRect::new(0.04 * w, 0.10 * h, 0.60 * w, 0.82 * h);
        let colorbar_height = 0.9 * axes.height;
        let colorbar = PixelRect::new(
            0.68 * w,
            axes.y + (axes.height - colorbar_height) / 2.0,
            0.018 * w,
            colorbar_height,
        );

        Self {
            axes,
            plot: axes.scaled(0.78),
            colorbar,
            title: [axes.center()[0], 0.07 * h],
        }
    }
}

/// Screen-space parallelogram spanned by a face's unit coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenQuad {
    origin: [f64; 2],
    u: [f64; 2],
    v: [f64; 2],
    det: f64,
}

impl ScreenQuad {
    /// From the pixel positions of unit coordinates `(0,0)`, `(1,0)` and `(0,1)`
    pub fn from_corners(p00: [f64; 2], p10: [f64; 2], p01: [f64; 2]) -> Self {
        let u = [p10[0] - p00[0], p10[1] - p00[1]];
        let v = [p01[0] - p00[0], p01[1] - p00[1]];
        Self {
            origin: p00,
            u,
            v,
            det: u[0] * v[1] - u[1] * v[0],
        }
    }

    pub fn corners(&self) -> [[f64; 2]; 4] {
        let [ox, oy] = self.origin;
        [
            [ox, oy],
            [ox + self.u[0], oy + self.u[1]],
            [ox + self.u[0] + self.v[0], oy + self.u[1] + self.v[1]],
            [ox + self.v[0], oy + self.v[1]],
        ]
    }

    /// Unit coordinates of a pixel position, if it lies inside the quad
    pub fn unit_coords(&self, p: [f64; 2]) -> Option<(f64, f64)> {
        const EPS: f64 = 1e-9;
        if self.det.abs() < EPS {
            return None;
        }

        let d = [p[0] - self.origin[0], p[1] - self.origin[1]];
        let s = (d[0] * self.v[1] - d[1] * self.v[0]) / self.det;
        let t = (self.u[0] * d[1] - self.u[1] * d[0]) / self.det;
        let inside = |c: f64| (-EPS..=1.0 + EPS).contains(&c);
        (inside(s) && inside(t)).then(|| (s.clamp(0.0, 1.0), t.clamp(0.0, 1.0)))
    }

    // Half-open pixel index ranges (x0, x1, y0, y1) clipped to the image
    fn pixel_bounds(&self, width: usize, height: usize) -> Option<(usize, usize, usize, usize)> {
        let corners = self.corners();
        let min = |i: usize| corners.iter().map(|c| c[i]).fold(f64::INFINITY, f64::min);
        let max = |i: usize| corners.iter().map(|c| c[i]).fold(f64::NEG_INFINITY, f64::max);

        let clip = |v: f64, limit: usize| v.max(0.0).min(limit as f64) as usize;
        let (x0, x1) = (clip(min(0).floor(), width), clip(max(0).ceil(), width));
        let (y0, y1) = (clip(min(1).floor(), height), clip(max(1).ceil(), height));
        (x0 < x1 && y0 < y1).then_some((x0, x1, y0, y1))
    }
}

/// A figure being drawn; released when dropped
pub struct Figure {
    pixmap: Pixmap,
    typeface: Typeface,
    theme: Theme,
    dpi: f64,
}

impl Figure {
    /// A 16 × 9 inch figure at `dpi`, filled with the theme background.
    ///
    /// # Errors
    ///
    /// Returns [`SliceVisError::RenderBackend`] if the pixmap cannot be allocated
    /// or the embedded font cannot be loaded.
    pub fn new(dpi: f64, theme: Theme) -> Result<Self> {
        let width = (FIGURE_INCHES.0 * dpi).round() as u32;
        let height = (FIGURE_INCHES.1 * dpi).round() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SliceVisError::RenderBackend(format!("cannot allocate a {width}x{height} canvas"))
        })?;

        let [r, g, b] = theme.background();
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
        Ok(Self {
            pixmap,
            typeface: Typeface::embedded()?,
            theme,
            dpi,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Typographic points to pixels
    pub fn points(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    // Font size in pixels of text set at `pt` points
    fn text_size(&self, pt: f64) -> f64 {
        self.points(pt)
    }

    pub fn fill_polygon(&mut self, points: &[[f64; 2]], color: Rgb) {
        let Some(path) = polyline(points, true) else {
            return;
        };
        let paint = solid(color);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    pub fn stroke_polyline(&mut self, points: &[[f64; 2]], color: Rgb, width: f64) {
        let Some(path) = polyline(points, false) else {
            return;
        };
        let stroke = Stroke {
            width: width.max(1.0) as f32,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &solid(color), &stroke, Transform::identity(), None);
    }

    pub fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], color: Rgb, width: f64) {
        self.stroke_polyline(&[from, to], color, width);
    }

    /// Draws `text` at font size `size` pixels with its capitals vertically
    /// centred on `at`.
    pub fn draw_text(
        &mut self,
        text: &str,
        at: [f64; 2],
        size: f64,
        anchor: Anchor,
        color: Rgb,
    ) {
        let px = size as f32;
        let Some(label) = self.typeface.rasterize(text, px, color) else {
            return;
        };

        let width = f64::from(self.typeface.width(text, px));
        let left = match anchor {
            Anchor::Start => at[0],
            Anchor::Middle => at[0] - width / 2.0,
            Anchor::End => at[0] - width,
        };
        let top = at[1] - f64::from(self.typeface.cap_middle(px));

        self.pixmap.draw_pixmap(
            left.round() as i32 - PAD as i32,
            top.round() as i32 - PAD as i32,
            label.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Paints every pixel whose centre lies in `quad` with `shade(s, t)`;
    /// `None` leaves the pixel untouched.
    pub fn paint_quad<F>(&mut self, quad: &ScreenQuad, shade: F)
    where
        F: Fn(f64, f64) -> Option<Rgb> + Sync,
    {
        let width = self.pixmap.width() as usize;
        let height = self.pixmap.height() as usize;
        let Some((x0, x1, y0, y1)) = quad.pixel_bounds(width, height) else {
            return;
        };

        self.pixmap
            .data_mut()
            .par_chunks_mut(width * 4)
            .enumerate()
            .skip(y0)
            .take(y1 - y0)
            .for_each(|(y, row)| {
                let py = y as f64 + 0.5;
                for x in x0..x1 {
                    let Some((s, t)) = quad.unit_coords([x as f64 + 0.5, py]) else {
                        continue;
                    };
                    if let Some([r, g, b]) = shade(s, t) {
                        row[x * 4..x * 4 + 4].copy_from_slice(&[r, g, b, 255]);
                    }
                }
            });
    }

    /// Back panes with grid lines at the axis ticks
    pub fn draw_panes(&mut self, projection: &Projection) {
        let far = projection.far_sides();
        let ranges = axis_ranges(projection);
        let pane = self.theme.pane();
        let grid = self.theme.grid();
        let grid_width = self.points(GRID_PT);

        for axis in 0..3 {
            let (b, d) = ((axis + 1) % 3, (axis + 2) % 3);
            let corner = |vb: f64, vd: f64| {
                let mut p = [0.0; 3];
                p[axis] = far[axis];
                p[b] = vb;
                p[d] = vd;
                projection.to_screen(p)
            };

            let (b0, b1) = ranges[b];
            let (d0, d1) = ranges[d];
            self.fill_polygon(
                &[corner(b0, d0), corner(b1, d0), corner(b1, d1), corner(b0, d1)],
                pane,
            );

            for value in tick_values(projection, b) {
                self.stroke_line(corner(value, d0), corner(value, d1), grid, grid_width);
            }
            for value in tick_values(projection, d) {
                self.stroke_line(corner(b0, value), corner(b1, value), grid, grid_width);
            }
        }
    }

    /// Fills one contour face, each pixel coloured by the band of its
    /// interpolated value; NaN values stay unfilled.
    pub fn draw_face(
        &mut self,
        projection: &Projection,
        face: &FaceMesh,
        bands: &ContourBands,
        band_colors: &[Rgb],
    ) {
        let [c00, c10, _, c01] = face.corners();
        let quad = ScreenQuad::from_corners(
            projection.to_screen(c00),
            projection.to_screen(c10),
            projection.to_screen(c01),
        );
        self.paint_quad(&quad, |s, t| {
            bands
                .classify(face.sample(s, t))
                .and_then(|k| band_colors.get(k).copied())
        });
    }

    /// Axis lines, tick marks, tick labels and axis labels
    pub fn draw_axes(&mut self, projection: &Projection) {
        const LABELS: [&str; 3] = ["x (m)", "y (m)", "z (m)"];

        let fg = self.theme.foreground();
        let line_width = self.points(LINE_PT);
        let tick_size = self.text_size(TICK_PT);
        let label_size = self.text_size(LABEL_PT);
        let tick_length = self.points(3.5);

        let [lx, ly, lz] = projection.extents();
        let center = projection.to_screen([lx / 2.0, ly / 2.0, -lz / 2.0]);

        for (axis, label) in LABELS.iter().enumerate() {
            let (start, end) = axis_edge(projection, axis);
            let (p0, p1) = (projection.to_screen(start), projection.to_screen(end));
            self.stroke_line(p0, p1, fg, line_width);

            let mid = [(p0[0] + p1[0]) / 2.0, (p0[1] + p1[1]) / 2.0];
            let out = unit([mid[0] - center[0], mid[1] - center[1]]);
            let along = |d: f64| [mid[0] + out[0] * d, mid[1] + out[1] * d];

            let values = tick_values(projection, axis);
            for (value, text) in values.iter().zip(format_ticks(&values)) {
                let mut world = start;
                world[axis] = *value;
                let p = projection.to_screen(world);
                let tip = [p[0] + out[0] * tick_length, p[1] + out[1] * tick_length];
                self.stroke_line(p, tip, fg, line_width);

                let gap = tick_length + tick_size * 1.1;
                let at = [p[0] + out[0] * gap, p[1] + out[1] * gap];
                self.draw_text(&text, at, tick_size, Anchor::Middle, fg);
            }

            self.draw_text(label, along(tick_length + tick_size * 3.5), label_size, Anchor::Middle, fg);
        }
    }

    /// Vertical colour bar of the contour bands, labelled with `ticks`
    /// that fall inside the level range.
    pub fn draw_colorbar(
        &mut self,
        rect: PixelRect,
        bands: &ContourBands,
        band_colors: &[Rgb],
        ticks: &[f64],
        label: &str,
    ) {
        let (lo, hi) = (bands.lowest(), bands.highest());
        let quad = ScreenQuad::from_corners(
            [rect.x, rect.y],
            [rect.right(), rect.y],
            [rect.x, rect.bottom()],
        );
        self.paint_quad(&quad, |_, t| {
            bands
                .classify(hi - t * (hi - lo))
                .and_then(|k| band_colors.get(k).copied())
        });

        let fg = self.theme.foreground();
        let line_width = self.points(LINE_PT);
        let corners = quad.corners();
        self.stroke_polyline(
            &[corners[0], corners[1], corners[2], corners[3], corners[0]],
            fg,
            line_width,
        );

        let tick_size = self.text_size(TICK_PT);
        let tick_length = self.points(3.5);
        let visible: Vec<f64> = ticks
            .iter()
            .copied()
            .filter(|v| (lo..=hi).contains(v))
            .collect();
        for (value, text) in visible.iter().zip(format_ticks(&visible)) {
            let y = rect.y + (hi - value) / (hi - lo) * rect.height;
            self.stroke_line([rect.right(), y], [rect.right() + tick_length, y], fg, line_width);
            self.draw_text(
                &text,
                [rect.right() + tick_length + tick_size * 0.4, y],
                tick_size,
                Anchor::Start,
                fg,
            );
        }

        let label_size = self.text_size(LABEL_PT);
        self.draw_text(
            label,
            [rect.center()[0], rect.y - label_size * 1.3],
            label_size,
            Anchor::Middle,
            fg,
        );
    }

    pub fn draw_title(&mut self, title: &str, at: [f64; 2]) {
        let size = self.text_size(TITLE_PT);
        let fg = self.theme.foreground();
        self.draw_text(title, at, size, Anchor::Middle, fg);
    }

    /// Tightly packed RGB bytes, row-major
    pub fn to_rgb(&self) -> Vec<u8> {
        self.pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }
}

/// `(min, max)` world coordinate along each axis
fn axis_ranges(projection: &Projection) -> [(f64, f64); 3] {
    let [lx, ly, lz] = projection.extents();
    [(0.0, lx), (0.0, ly), (-lz, 0.0)]
}

/// Five evenly spaced ticks; z counts down from the surface.
fn tick_values(projection: &Projection, axis: usize) -> Vec<f64> {
    let [lx, ly, lz] = projection.extents();
    let (start, end) = match axis {
        0 => (0.0, lx),
        1 => (0.0, ly),
        _ => (0.0, -lz),
    };
    linspace(start, end, TICKS_PER_AXIS).to_vec()
}

/// Box edge carrying the given axis: x and y run along the bottom near
/// edges, z along the right-most vertical edge.
fn axis_edge(projection: &Projection, axis: usize) -> ([f64; 3], [f64; 3]) {
    let near = projection.near_sides();
    let far = projection.far_sides();
    let ranges = axis_ranges(projection);
    let bottom = ranges[2].0;

    let mut start = match axis {
        0 => [0.0, near[1], bottom],
        1 => [near[0], 0.0, bottom],
        _ => {
            let candidates = [[near[0], far[1]], [far[0], near[1]], [near[0], near[1]], [far[0], far[1]]];
            let [x, y] = candidates
                .into_iter()
                .max_by(|a, b| {
                    let ax = projection.to_screen([a[0], a[1], 0.0])[0];
                    let bx = projection.to_screen([b[0], b[1], 0.0])[0];
                    ax.total_cmp(&bx)
                })
                .unwrap_or([far[0], near[1]]);
            [x, y, 0.0]
        }
    };
    start[axis] = ranges[axis].0;
    let mut end = start;
    end[axis] = ranges[axis].1;
    (start, end)
}

fn unit(v: [f64; 2]) -> [f64; 2] {
    let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
    if len < f64::EPSILON {
        [0.0, 1.0]
    } else {
        [v[0] / len, v[1] / len]
    }
}

fn solid(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = true;
    paint
}

fn polyline(points: &[[f64; 2]], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first[0] as f32, first[1] as f32);
    for p in rest {
        builder.line_to(p[0] as f32, p[1] as f32);
    }
    if close {
        builder.close();
    }
    builder.finish()
}
