//! SliceVis: 3-D composite contour-slice frames from ocean model output
//!
//! Ocean model runs write 2-D slices of each field (xy, xz, yz planes) into
//! HDF5-based containers (`.h5`, `.jld2`), one dataset per timestep. SliceVis
//! indexes the timesteps across many such files and renders each one as a
//! single picture: three filled-contour faces on the sides of the domain's
//! bounding box, a shared colour bar, and a time title.
//!
//! ## Key Features
//!
//! - **Snapshot index**: natural ordering of files, ascending timesteps per file
//! - **Composite renderer**: orthographic 3-D view, filled contour bands, PNG output
//! - **Parallel batches**: every timestep rendered on Rayon, failures isolated per frame
//! - **Pluggable sources**: anything implementing [`SnapshotReader`] can be rendered
//!
//! ## Module Organization
//!
//! - [`data_source`]: container layout, the [`SnapshotReader`] trait, halo trimming
//! - [`hdf5_io`]: HDF5/JLD2 reader and writer
//! - [`memory_source`]: in-memory containers for tests and synthetic frames
//! - [`timeline`]: snapshot index builder
//! - [`render`]: contour levels, colormaps, projection and figure composition
//! - [`parallel`]: thread pool configuration and batch rendering
//! - [`config`]: JSON render configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use slice_vis::prelude::*;
//! use std::path::Path;
//!
//! let timeline = build_timeline(&["run_part1.jld2", "run_part2.jld2"]).unwrap();
//! let last = timeline.last().unwrap();
//!
//! let session = RenderSession::default();
//! session
//!     .render(&last.source, last.index, Path::new("frame.png"), &RenderParameters::default())
//!     .unwrap();
//! ```

// Core modules
pub mod config;
pub mod data_source;
pub mod errors;
pub mod hdf5_io;
pub mod memory_source;
pub mod parallel;
pub mod render;
pub mod timeline;
pub mod utils;

// Command-line surface, shared with the binary
pub mod cli;

// Direct re-exports for the public API
pub use data_source::{GridSpec, SlicePlane, SliceTriple, SnapshotReader, SnapshotSummary};
pub use errors::{Result, SliceVisError};
pub use render::{format_title, render, RenderParameters, RenderSession};
pub use timeline::{build_timeline, Timeline, TimestepRecord};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::RenderConfig;
    pub use crate::data_source::{GridSpec, SlicePlane, SnapshotReader};
    pub use crate::errors::{Result, SliceVisError};
    pub use crate::hdf5_io::Hdf5Snapshot;
    pub use crate::memory_source::MemorySnapshot;
    pub use crate::parallel::{render_timeline, BatchReport, ParallelConfig};
    pub use crate::render::canvas::Theme;
    pub use crate::render::levels::ColorbarTicks;
    pub use crate::render::{RenderParameters, RenderSession};
    pub use crate::timeline::{build_timeline, Timeline, TimestepRecord};
}
