//! Defines command-line interface options using `clap` for the slice_vis application.

use crate::config::RenderConfig;
use crate::render::canvas::Theme;
use clap::Parser;
use std::path::PathBuf;

/// Render 3-D contour-slice frames from ocean model snapshot output
#[derive(Parser, Debug)]
#[command(
    version,
    name = "slice_vis",
    about = "Render 3-D composite contour-slice frames from HDF5/JLD2 snapshot output"
)]
pub struct Args {
    /// Snapshot files (HDF5 or JLD2) holding the slice output
    #[arg(short, long, num_args = 1.., required = true)]
    pub slices: Vec<PathBuf>,

    /// Field to plot [default: T]
    #[arg(short, long)]
    pub field: Option<String>,

    /// Lower end of the colour range [default: 19]
    #[arg(long, allow_hyphen_values = true)]
    pub vmin: Option<f64>,

    /// Upper end of the colour range [default: 20.05]
    #[arg(long, allow_hyphen_values = true)]
    pub vmax: Option<f64>,

    /// Number of contour levels [default: 100]
    #[arg(short = 'n', long = "contours")]
    pub n_contours: Option<usize>,

    /// Colormap name, `_r` suffix reverses it [default: inferno]
    #[arg(long)]
    pub cmap: Option<String>,

    /// Offset carried with the field; not applied to the data [default: 0]
    #[arg(long, allow_hyphen_values = true)]
    pub value_offset: Option<f64>,

    /// Literal colour-bar ticks, comma separated; derived from the range if unset
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub ticks: Option<Vec<f64>>,

    /// Colour-bar title [default: "T (°C)"]
    #[arg(long)]
    pub colorbar_label: Option<String>,

    /// Output resolution [default: 300]
    #[arg(long)]
    pub dpi: Option<f64>,

    /// Figure style [default: dark]
    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    /// Output image for the final timestep
    #[arg(short, long, default_value = "test_frame.png")]
    pub output: PathBuf,

    /// Render every timestep as a numbered frame sequence instead
    #[arg(long, default_value_t = false)]
    pub all: bool,

    /// Directory for the frame sequence written by --all
    #[arg(long, default_value = "frames")]
    pub output_dir: PathBuf,

    /// JSON render configuration; explicit flags take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print grid and timestep information for each file and exit
    #[arg(long, default_value_t = false)]
    pub describe: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Log level: trace, debug, info, warn or error (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The render settings given explicitly on the command line
    pub fn render_overrides(&self) -> RenderConfig {
        RenderConfig {
            field: self.field.clone(),
            vmin: self.vmin,
            vmax: self.vmax,
            n_contours: self.n_contours,
            colormap: self.cmap.clone(),
            value_offset: self.value_offset,
            ticks: self.ticks.clone(),
            colorbar_label: self.colorbar_label.clone(),
            dpi: self.dpi,
            elevation: None,
            azimuth: None,
            theme: self.theme,
        }
    }
}
