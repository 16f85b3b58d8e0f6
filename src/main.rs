use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{debug, info};

use prc::backend::{DocumentSource, default_loader};
use prc::capture::{CategoryLabel, FileSinkClient};
use prc::config::Config;
use prc::error::{AppError, AppResult};
use prc::geometry::Point;
use prc::gesture::{PointerEvent, PointerPhase, TrackedRegion};
use prc::logging;
use prc::render::PageOutcome;
use prc::session::{LoadStatus, ViewerSession};

/// Captures a region of a PDF as an image and hands it to the analysis sink.
#[derive(Parser, Debug)]
#[command(name = "prc")]
struct Cli {
    pdf: PathBuf,
    /// Drag start in container coordinates, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    from: Point,
    /// Drag end in container coordinates, as `X,Y`.
    #[arg(long, value_parser = parse_point)]
    to: Point,
    #[arg(long)]
    zoom: Option<f32>,
    #[arg(long)]
    label: Option<String>,
    /// Output path without extension.
    #[arg(long, default_value = "capture")]
    out: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    logging::init(&config.log)?;

    let client = Arc::new(FileSinkClient::new(&cli.out));
    let mut session = ViewerSession::new(
        &config,
        default_loader(),
        client,
        TrackedRegion::unbounded(),
    )?;

    if let LoadStatus::Loaded { page_count } = session
        .load_in_background(DocumentSource::path(&cli.pdf))
        .await?
    {
        info!("{} has {page_count} page(s)", cli.pdf.display());
    }
    if let Some(zoom) = cli.zoom {
        session.set_zoom(zoom);
    }

    session.render_all(|progress| {
        if progress.outcome == PageOutcome::Failed {
            debug!("page {} left blank", progress.page);
        }
    });

    session.set_selection_mode(true);
    for (phase, point) in [
        (PointerPhase::Start, cli.from),
        (PointerPhase::Move, cli.to),
        (PointerPhase::End, cli.to),
    ] {
        session.handle_pointer(PointerEvent::mouse(phase, point.x, point.y));
    }

    let label = match &cli.label {
        Some(label) => CategoryLabel::new(label)?,
        None => session.default_label().clone(),
    };
    let Some(submission) = session.submit(&label).await? else {
        return Err(AppError::invalid_argument(
            "selection is too small to capture",
        ));
    };
    let response = submission.result?;
    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|err| AppError::analysis(format!("failed to print reply: {err}")))?;
    println!("{rendered}");

    session.dispose();
    Ok(())
}

fn parse_point(value: &str) -> Result<Point, String> {
    let Some((x, y)) = value.split_once(',') else {
        return Err(format!("expected X,Y but got {value:?}"));
    };
    let parse = |part: &str| {
        part.trim()
            .parse::<f64>()
            .map_err(|err| format!("bad coordinate {part:?}: {err}"))
    };
    let point = Point::new(parse(x)?, parse(y)?);
    if !point.is_finite() {
        return Err(format!("coordinates must be finite: {value:?}"));
    }
    Ok(point)
}
