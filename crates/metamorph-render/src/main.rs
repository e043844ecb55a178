mod config;

use anyhow::{Context, Result};
use metamorph_core::export::render_svg;
use metamorph_core::{parse_history, ExportFormat, Msg, RasterExporter, Session, SessionConfig};
use tokio::runtime::Handle;

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = config::parse_args()?;

    let mut session_cfg = match &args.config {
        Some(path) => config::load_session_config(path)?,
        None => SessionConfig::default(),
    };
    if let Some(width) = args.width {
        session_cfg.width = width;
    }
    if let Some(height) = args.height {
        session_cfg.height = height;
    }

    let json = tokio::fs::read_to_string(&args.history)
        .await
        .with_context(|| format!("failed to read history {}", args.history.display()))?;
    let history = parse_history(&json)
        .with_context(|| format!("failed to decode history {}", args.history.display()))?;

    let mut session = Session::new(history, session_cfg);
    session.set_timeline(args.fraction);
    if !args.search.is_empty() {
        session.dispatch(Msg::SearchChanged(args.search.clone()));
    }

    let stats = session.stats();
    tracing::info!(
        commits = stats.commits,
        files = stats.files_changed,
        total_changes = stats.total_changes,
        active_days = stats.active_days,
        oldest = ?stats.oldest,
        newest = ?stats.newest,
        displayed = session.visible().nodes.len(),
        "window selected"
    );
    for share in &stats.by_extension {
        tracing::debug!(
            extension = %share.extension,
            files = share.count,
            changes = share.changes,
            percent = share.percent_of(stats.total_changes),
            "file distribution"
        );
    }

    let mut ticks = 0;
    while ticks < args.max_ticks && session.tick().is_some() {
        ticks += 1;
    }
    if session.is_running() {
        tracing::warn!(ticks, "layout still moving; exporting current positions");
        session.stop();
    } else {
        tracing::info!(ticks, "layout settled");
    }

    let scene = session.scene();
    if let Some(msg) = &scene.placeholder {
        tracing::warn!(%msg, "nothing to draw");
    }

    if let Some(path) = &args.svg {
        tokio::fs::write(path, render_svg(&scene))
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), mime = ExportFormat::Svg.mime(), "wrote svg");
    }

    if let Some(path) = &args.png {
        let exporter = RasterExporter::new(Handle::current()).with_system_fonts();
        let png = exporter.export_png(&scene)?.finish().await?;
        tokio::fs::write(path, &png)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            mime = ExportFormat::Png.mime(),
            bytes = png.len(),
            "wrote png"
        );
    }

    Ok(())
}
