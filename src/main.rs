//! Entry point for the slice_vis application.
//! Handles CLI parsing and logging setup, builds the timeline and renders either
//! the final timestep or the whole sequence.

use clap::Parser;
use slice_vis::cli::Args;
use slice_vis::config::RenderConfig;
use slice_vis::data_source::SnapshotSummary;
use slice_vis::hdf5_io::Hdf5Snapshot;
use slice_vis::parallel::{get_parallel_info, render_timeline, ParallelConfig};
use slice_vis::render::RenderSession;
use slice_vis::timeline::build_timeline;
use slice_vis::utils::sort_paths_naturally;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over --log-level
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let parallel = ParallelConfig::from_thread_option(args.threads);
    parallel.setup_global_pool()?;
    info!("Rendering with {} threads", parallel.current_threads());
    get_parallel_info().log();

    if args.describe {
        let mut paths = args.slices.clone();
        sort_paths_naturally(&mut paths);
        for path in &paths {
            let snapshot = Hdf5Snapshot::open(path)?;
            println!("{}", SnapshotSummary::from_reader(&snapshot)?);
        }
        return Ok(());
    }

    // Defaults, then the config file, then explicit flags
    let file_config = match &args.config {
        Some(path) => RenderConfig::from_file(path)?,
        None => RenderConfig::default(),
    };
    let config = file_config.merge(args.render_overrides());
    let params = config.to_parameters();
    params.validate()?;
    let session = RenderSession::new(config.theme());

    let timeline = build_timeline(&args.slices)?;

    if args.all {
        let report = render_timeline(&session, &timeline, &params, &args.output_dir)?;
        if !report.is_complete() {
            warn!(
                "{} of {} frames failed",
                report.failed.len(),
                report.total()
            );
            return Err(format!("{} frames could not be rendered", report.failed.len()).into());
        }
    } else {
        let last = timeline.last()?;
        info!(
            "Rendering timestep {} from {}",
            last.index,
            last.source.display()
        );
        session.render(&last.source, last.index, &args.output, &params)?;
    }

    Ok(())
}
