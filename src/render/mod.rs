//! Composite contour-slice renderer
//!
//! One frame shows three filled-contour faces of a field on the sides of the
//! bounding box `[0, Lx] × [0, Ly] × [-Lz, 0]`: the surface slice on top and
//! the two vertical slices on the walls facing the viewer, plus a shared
//! colour bar and a time title.
//!
//! Rendering is re-entrant. A [`RenderSession`] only carries the figure
//! style, so one session can serve any number of concurrent calls, each
//! opening its own reader.

pub mod camera;
pub mod canvas;
pub mod colormap;
pub mod levels;
pub mod mesh;
pub mod png;
pub mod text;

use crate::data_source::{GridSpec, SnapshotReader};
use crate::errors::{Result, SliceVisError};
use crate::hdf5_io::Hdf5Snapshot;
use camera::{Camera, Projection};
use canvas::{Figure, Layout, Theme};
use colormap::{Colormap, Rgb};
use levels::{contour_levels, contour_spacing, ColorbarTicks, ContourBands};
use mesh::{FaceMesh, FaceOffsets};
use std::path::Path;
use tracing::{debug, info};

/// Output resolution used when nothing else is requested
pub const DEFAULT_DPI: f64 = 300.0;

const DPI_RANGE: std::ops::RangeInclusive<f64> = 10.0..=1200.0;

/// Everything that controls how one field is drawn
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParameters {
    pub field: String,
    pub vmin: f64,
    pub vmax: f64,
    pub n_contours: usize,
    pub colormap: String,
    /// Accepted for compatibility; not applied to the data
    pub value_offset: f64,
    pub ticks: ColorbarTicks,
    pub colorbar_label: String,
    pub dpi: f64,
    pub camera: Camera,
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            field: "T".to_string(),
            vmin: 19.0,
            vmax: 20.05,
            n_contours: 100,
            colormap: "inferno".to_string(),
            value_offset: 0.0,
            ticks: ColorbarTicks::Derived,
            colorbar_label: "T (°C)".to_string(),
            dpi: DEFAULT_DPI,
            camera: Camera::default(),
        }
    }
}

impl RenderParameters {
    /// Checks the parameters before any file is opened.
    ///
    /// # Errors
    ///
    /// [`SliceVisError::InvalidParameters`] for an empty field name, a
    /// non-finite or empty value range, zero contours, a non-finite camera or
    /// a DPI outside 10..=1200; [`SliceVisError::UnknownColormap`] for an
    /// unregistered colormap.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(SliceVisError::InvalidParameters(message));

        if self.field.is_empty() {
            return invalid("field name is empty".to_string());
        }
        if !self.vmin.is_finite() || !self.vmax.is_finite() {
            return invalid(format!(
                "value range must be finite, got [{}, {}]",
                self.vmin, self.vmax
            ));
        }
        if self.vmin >= self.vmax {
            return invalid(format!(
                "vmin ({}) must be less than vmax ({})",
                self.vmin, self.vmax
            ));
        }
        if self.n_contours == 0 {
            return invalid("number of contours must be positive".to_string());
        }
        let spacing = contour_spacing(self.vmin, self.vmax, self.n_contours);
        if !spacing.is_finite() || spacing <= 0.0 {
            return invalid(format!("contour spacing {spacing} is not positive and finite"));
        }
        if !DPI_RANGE.contains(&self.dpi) {
            return invalid(format!(
                "dpi must be within {}..={}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                self.dpi
            ));
        }
        if !self.camera.elevation_deg.is_finite() || !self.camera.azimuth_deg.is_finite() {
            return invalid("camera angles must be finite".to_string());
        }

        Colormap::by_name(&self.colormap).map(|_| ())
    }

    /// Contour levels for the configured range
    pub fn levels(&self) -> Vec<f64> {
        contour_levels(self.vmin, self.vmax, self.n_contours)
    }
}

/// Frame title: whole seconds zero-padded to five digits, then hours.
///
/// ```
/// assert_eq!(slice_vis::render::format_title(3661.0), "t = 03661 s (1.02 hours)");
/// ```
pub fn format_title(t: f64) -> String {
    format!("t = {:05} s ({:.2} hours)", t.trunc() as i64, t / 3600.0)
}

/// A rendered frame held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeFrame {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub title: String,
    /// Row-major RGB
    pub rgb: Vec<u8>,
}

impl CompositeFrame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        png::encode_png(&self.rgb, self.width, self.height, self.dpi)
    }
}

/// Figure style scoped to a set of renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSession {
    theme: Theme,
}

impl RenderSession {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Renders timestep `index` of the container at `source` into `output`.
    ///
    /// The parameters are validated before the container is opened, and the
    /// output file only appears once the whole frame has been encoded.
    pub fn render(
        &self,
        source: &Path,
        index: u64,
        output: &Path,
        params: &RenderParameters,
    ) -> Result<()> {
        params.validate()?;
        let reader = Hdf5Snapshot::open(source)?;
        self.render_from_reader(&reader, index, output, params)
    }

    /// Like [`RenderSession::render`], reading from an already opened container.
    pub fn render_from_reader<R: SnapshotReader + ?Sized>(
        &self,
        reader: &R,
        index: u64,
        output: &Path,
        params: &RenderParameters,
    ) -> Result<()> {
        let frame = self.compose_frame(reader, index, params)?;
        let bytes = frame.encode_png()?;
        png::write_atomic(output, &bytes)?;
        info!("Saving: {}", output.display());
        Ok(())
    }

    /// Draws one frame without writing it anywhere.
    pub fn compose_frame<R: SnapshotReader + ?Sized>(
        &self,
        reader: &R,
        index: u64,
        params: &RenderParameters,
    ) -> Result<CompositeFrame> {
        params.validate()?;
        let colormap = Colormap::by_name(&params.colormap)?;
        let bands = ContourBands::new(params.levels())?;

        let t = reader.time(index)?;
        let grid = reader.grid()?;
        check_extents(&grid)?;
        let slices = reader.slice_triple(&params.field, index, &grid)?;
        let faces = FaceMesh::faces(&grid, &slices, FaceOffsets::observed(&grid))?;

        debug!(
            source = %reader.source().display(),
            index,
            field = %params.field,
            levels = bands.levels().len(),
            nx = grid.nx,
            ny = grid.ny,
            nz = grid.nz,
            value_offset = params.value_offset,
            "Composing frame"
        );

        let band_colors: Vec<Rgb> = (0..bands.band_count())
            .map(|k| colormap.sample(bands.band_position(k)))
            .collect();

        let mut figure = Figure::new(params.dpi, self.theme)?;
        let layout = Layout::new(figure.width(), figure.height());
        let projection = Projection::fit(&params.camera, &grid, layout.plot);

        figure.draw_panes(&projection);

        let mut back_to_front: Vec<&FaceMesh> = faces.iter().collect();
        back_to_front.sort_by(|a, b| {
            projection
                .depth(a.center())
                .total_cmp(&projection.depth(b.center()))
        });
        for face in back_to_front {
            figure.draw_face(&projection, face, &bands, &band_colors);
        }

        figure.draw_axes(&projection);
        figure.draw_colorbar(
            layout.colorbar,
            &bands,
            &band_colors,
            &params.ticks.resolve(params.vmin, params.vmax),
            &params.colorbar_label,
        );

        let title = format_title(t);
        figure.draw_title(&title, layout.title);

        Ok(CompositeFrame {
            width: figure.width(),
            height: figure.height(),
            dpi: params.dpi,
            title,
            rgb: figure.to_rgb(),
        })
    }
}

/// Renders one frame with the default dark style.
pub fn render(source: &Path, index: u64, output: &Path, params: &RenderParameters) -> Result<()> {
    RenderSession::default().render(source, index, output, params)
}

fn check_extents(grid: &GridSpec) -> Result<()> {
    for (name, extent) in [("Lx", grid.lx), ("Ly", grid.ly), ("Lz", grid.lz)] {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(SliceVisError::RenderBackend(format!(
                "domain extent {name} = {extent} cannot be drawn"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_source::MemorySnapshot;

    fn snapshot() -> MemorySnapshot {
        let mut snapshot = MemorySnapshot::new("mem", GridSpec::new(4, 4, 4, 100.0, 100.0, 100.0));
        snapshot.insert_time(0, 0.0);
        snapshot.insert_constant_field("T", 0, 19.5);
        snapshot
    }

    fn small() -> RenderParameters {
        RenderParameters {
            n_contours: 10,
            dpi: 20.0,
            ..RenderParameters::default()
        }
    }

    #[test]
    fn test_title_formatting() {
        assert_eq!(format_title(3661.0), "t = 03661 s (1.02 hours)");
        assert_eq!(format_title(0.0), "t = 00000 s (0.00 hours)");
        assert_eq!(format_title(36000.9), "t = 36000 s (10.00 hours)");
    }

    #[test]
    fn test_defaults() {
        let params = RenderParameters::default();
        assert_eq!(params.field, "T");
        assert_eq!((params.vmin, params.vmax, params.n_contours), (19.0, 20.05, 100));
        assert_eq!(params.colormap, "inferno");
        assert_eq!(params.dpi, 300.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_precondition_failures() {
        let cases = [
            RenderParameters { vmin: 20.0, vmax: 19.0, ..small() },
            RenderParameters { vmin: 19.0, vmax: 19.0, ..small() },
            RenderParameters { vmax: f64::NAN, ..small() },
            RenderParameters { n_contours: 0, ..small() },
            RenderParameters { dpi: 0.0, ..small() },
            RenderParameters { field: String::new(), ..small() },
        ];
        for params in cases {
            assert!(
                matches!(params.validate(), Err(SliceVisError::InvalidParameters(_))),
                "{params:?} should be rejected"
            );
        }

        let params = RenderParameters { colormap: "nope".into(), ..small() };
        assert!(matches!(params.validate(), Err(SliceVisError::UnknownColormap { .. })));
    }

    #[test]
    fn test_single_contour_is_backend_error() {
        let params = RenderParameters { n_contours: 1, ..small() };
        let err = RenderSession::default()
            .compose_frame(&snapshot(), 0, &params)
            .unwrap_err();
        assert!(matches!(err, SliceVisError::RenderBackend(_)));
    }

    #[test]
    fn test_compose_frame() {
        let frame = RenderSession::default()
            .compose_frame(&snapshot(), 0, &small())
            .unwrap();
        assert_eq!((frame.width, frame.height), (320, 180));
        assert_eq!(frame.rgb.len(), 320 * 180 * 3);
        assert_eq!(frame.title, "t = 00000 s (0.00 hours)");
        assert_eq!(frame.pixel(0, 179), Some([0, 0, 0]));
        assert_eq!(frame.pixel(320, 0), None);

        // 19.5 lies in band 4 of 9 for levels 19.0, 19.105, ...
        let bands = ContourBands::new(small().levels()).unwrap();
        let k = bands.classify(19.5).unwrap();
        let expected = Colormap::default().sample(bands.band_position(k));
        assert!(frame.rgb.chunks_exact(3).any(|px| px == expected));
    }

    #[test]
    fn test_missing_field_is_missing_key() {
        let params = RenderParameters { field: "S".into(), ..small() };
        let err = RenderSession::default()
            .compose_frame(&snapshot(), 0, &params)
            .unwrap_err();
        assert!(matches!(err, SliceVisError::MissingKey { .. }));
    }

    #[test]
    fn test_light_theme_background() {
        let frame = RenderSession::new(Theme::Light)
            .compose_frame(&snapshot(), 0, &small())
            .unwrap();
        assert_eq!(frame.pixel(0, 0), Some([255, 255, 255]));
    }

    #[test]
    fn test_session_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<RenderSession>();
    }
}
