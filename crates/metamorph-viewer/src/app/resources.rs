use anyhow::Context;
use bevy::prelude::Resource;
use metamorph_core::export::{render_svg, ExportFormat};
use metamorph_core::{HistoryStats, Msg, PendingExport, Point, RasterExporter, Session};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;

use crate::util::config::{self, ViewerConfig};
use crate::util::files;

/// Window statistics for the session generation they were computed for.
#[derive(Default)]
pub struct StatsCache {
    entry: Option<(u64, HistoryStats)>,
}

impl StatsCache {
    pub fn get(&mut self, session: &Session) -> &HistoryStats {
        let generation = session.generation();
        if self.entry.as_ref().is_some_and(|(g, _)| *g != generation) {
            self.entry = None;
        }
        &self
            .entry
            .get_or_insert_with(|| (generation, session.stats()))
            .1
    }
}

/// Everything the systems share: the session, the export machinery and the
/// text buffers backing the side panel.
#[derive(Resource)]
pub struct ViewerState {
    pub session: Session,
    pub cfg: ViewerConfig,
    pub exporter: RasterExporter,
    pub pending: Option<PendingExport>,
    pub history_input: String,
    pub search_input: String,
    pub panning: bool,
    pub status: Option<String>,
    pub stats: StatsCache,
    // Declared last so in-flight exports are dropped before their runtime.
    _runtime: Runtime,
}

impl ViewerState {
    pub fn new(cfg: ViewerConfig, history: Option<PathBuf>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("metamorph-export")
            .build()
            .context("failed to start export runtime")?;
        let mut exporter = RasterExporter::new(runtime.handle().clone());
        if cfg.system_fonts {
            exporter = exporter.with_system_fonts();
        }

        let history = history.or_else(|| cfg.last_history.clone());
        let mut st = Self {
            session: Session::new(Vec::new(), cfg.session_config()),
            history_input: history
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            cfg,
            exporter,
            pending: None,
            search_input: String::new(),
            panning: false,
            status: None,
            stats: StatsCache::default(),
            _runtime: runtime,
        };
        if let Some(path) = history {
            st.load_history(&path);
        }
        Ok(st)
    }

    pub fn load_history_from_input(&mut self) {
        let input = self.history_input.trim();
        if input.is_empty() {
            self.status = Some("Enter a path to a commit history JSON file".to_string());
            return;
        }
        let path = PathBuf::from(input);
        self.load_history(&path);
    }

    fn load_history(&mut self, path: &Path) {
        match files::read_history(path) {
            Ok(commits) => {
                tracing::info!(path = %path.display(), commits = commits.len(), "history loaded");
                self.status = Some(format!("Loaded {} commits", commits.len()));
                self.session.load_history(commits);
                self.cfg.last_history = Some(path.to_path_buf());
            }
            Err(e) => {
                let msg = format!("{e:#}");
                tracing::warn!(error = %msg, "history load failed");
                self.status = Some(msg);
            }
        }
    }

    pub fn set_search(&mut self, text: String) {
        self.session.dispatch(Msg::SearchChanged(text));
    }

    /// Zoom around `anchor`, or the canvas centre when there is no pointer.
    pub fn zoom_step(&mut self, factor: f64, anchor: Option<Point>) {
        let anchor = anchor.unwrap_or_else(|| {
            let (w, h) = self.session.size();
            Point::new(w / 2.0, h / 2.0)
        });
        self.session.zoom_at(factor, anchor);
    }

    pub fn export_svg(&mut self) {
        let svg = render_svg(&self.session.scene());
        self.deliver(ExportFormat::Svg, svg.as_bytes());
    }

    pub fn start_png_export(&mut self) {
        match self.exporter.export_png(&self.session.scene()) {
            Ok(pending) => {
                self.pending = Some(pending);
                self.status = Some("Rendering PNG...".to_string());
            }
            Err(e) => {
                tracing::warn!(error = %e, "png export not started");
                self.status = Some(e.to_string());
            }
        }
    }

    /// Once per frame. Writes the PNG when the render task has delivered it.
    pub fn poll_export(&mut self) {
        let Some(result) = self.pending.as_mut().and_then(PendingExport::try_finish) else {
            return;
        };
        self.pending = None;
        match result {
            Ok(png) => self.deliver(ExportFormat::Png, &png),
            Err(e) => {
                tracing::warn!(error = %e, "png export failed");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn save_config(&mut self) {
        match config::save(&self.cfg) {
            Ok(path) => self.status = Some(format!("Settings saved to {}", path.display())),
            Err(e) => self.status = Some(format!("{e:#}")),
        }
    }

    fn deliver(&mut self, format: ExportFormat, bytes: &[u8]) {
        let dir = self.cfg.resolved_export_dir();
        match files::write_artifact(&dir, format, bytes) {
            Ok(path) => {
                tracing::info!(path = %path.display(), bytes = bytes.len(), "export written");
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                let msg = format!("{e:#}");
                tracing::warn!(error = %msg, "export write failed");
                self.status = Some(msg);
            }
        }
    }
}
