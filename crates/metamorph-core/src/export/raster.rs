use std::sync::Arc;

use resvg::{tiny_skia, usvg};
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

use super::svg::render_svg;
use super::ExportError;
use crate::scene::Scene;

/// Largest edge tiny-skia will allocate for us.
const MAX_EDGE: u32 = 16_384;

type PngResult = Result<Vec<u8>, ExportError>;

/// PNG export off the caller's thread. One export at a time.
#[derive(Clone)]
pub struct RasterExporter {
    runtime: Handle,
    slot: Arc<Semaphore>,
    fonts: Arc<usvg::fontdb::Database>,
}

impl RasterExporter {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slot: Arc::new(Semaphore::new(1)),
            fonts: Arc::new(usvg::fontdb::Database::new()),
        }
    }

    /// Loads the host's fonts so labels and placeholders show up in the image.
    pub fn with_system_fonts(mut self) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system fonts");
        self.fonts = Arc::new(db);
        self
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Starts rasterizing `scene`. The scene is serialized right away, so later frames do not leak in.
    pub fn export_png(&self, scene: &Scene) -> Result<PendingExport, ExportError> {
        let permit = self
            .slot
            .clone()
            .try_acquire_owned()
            .map_err(|_| ExportError::Busy)?;

        let (width, height) = scene.pixel_size();
        if width > MAX_EDGE || height > MAX_EDGE {
            return Err(ExportError::Canvas { width, height });
        }

        let svg = render_svg(scene);
        let fonts = self.fonts.clone();
        let (tx, rx) = oneshot::channel();
        info!(width, height, "png export started");

        self.runtime.spawn_blocking(move || {
            let result = rasterize(&svg, width, height, fonts);
            if let Err(e) = &result {
                warn!(error = %e, "png export failed");
            }
            if tx.send(result).is_err() {
                debug!("png export abandoned by caller");
            }
        });

        Ok(PendingExport {
            rx,
            _permit: permit,
        })
    }
}

/// An export in flight. Holds the exporter's slot until dropped.
pub struct PendingExport {
    rx: oneshot::Receiver<PngResult>,
    _permit: OwnedSemaphorePermit,
}

impl PendingExport {
    pub async fn finish(self) -> PngResult {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(ExportError::Cancelled),
        }
    }

    /// Non-blocking poll for frame loops. Drop the handle once this yields `Some`.
    pub fn try_finish(&mut self) -> Option<PngResult> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(ExportError::Cancelled)),
        }
    }
}

/// Decodes the vector document, draws it onto a pixel buffer and encodes the buffer as PNG.
pub(crate) fn rasterize(
    svg: &str,
    width: u32,
    height: u32,
    fonts: Arc<usvg::fontdb::Database>,
) -> PngResult {
    let opt = usvg::Options {
        fontdb: fonts,
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| ExportError::Decode(e.to_string()))?;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(ExportError::Canvas { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| ExportError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, VisibleSet};
    use crate::interaction::Interaction;
    use crate::scene::{SceneInputs, SceneStyle};
    use crate::viewport::Viewport;
    use crate::{CommitRecord, FileChange, Point};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn scene(width: f64, height: f64) -> Scene {
        let g = build_graph(
            &[CommitRecord::with_files(vec![
                FileChange::new("a.ts", 80),
                FileChange::new("b.json", 20),
            ])],
            1.0,
        );
        let vis = VisibleSet::all(&g);
        Scene::compose(SceneInputs {
            graph: &g,
            visible: &vis,
            positions: &[Point::new(40.0, 40.0), Point::new(90.0, 60.0)],
            viewport: Viewport::default(),
            interaction: &Interaction::default(),
            width,
            height,
            style: &SceneStyle::default(),
        })
    }

    fn png_size(png: &[u8]) -> (u32, u32) {
        let be = |at: usize| u32::from_be_bytes([png[at], png[at + 1], png[at + 2], png[at + 3]]);
        (be(16), be(20))
    }

    #[tokio::test]
    async fn exports_png_of_canvas_size() {
        let exporter = RasterExporter::new(Handle::current());
        let png = exporter
            .export_png(&scene(160.0, 120.0))
            .expect("start")
            .finish()
            .await
            .expect("png");
        assert!(png.starts_with(PNG_MAGIC));
        assert_eq!(png_size(&png), (160, 120));
    }

    #[tokio::test]
    async fn second_request_is_rejected_while_pending() {
        let exporter = RasterExporter::new(Handle::current());
        let s = scene(64.0, 64.0);

        let pending = exporter.export_png(&s).expect("start");
        assert!(exporter.is_busy());
        assert_eq!(exporter.export_png(&s).err(), Some(ExportError::Busy));

        pending.finish().await.expect("png");
        assert!(!exporter.is_busy());
        assert!(exporter.export_png(&s).is_ok());
    }

    #[tokio::test]
    async fn try_finish_eventually_yields() {
        let exporter = RasterExporter::new(Handle::current());
        let mut pending = exporter.export_png(&scene(32.0, 32.0)).expect("start");
        let result = loop {
            if let Some(r) = pending.try_finish() {
                break r;
            }
            tokio::task::yield_now().await;
        };
        assert!(result.expect("png").starts_with(PNG_MAGIC));
    }

    #[test]
    fn oversized_canvas_is_refused() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        let exporter = RasterExporter::new(rt.handle().clone());
        let err = exporter.export_png(&scene(20_000.0, 10.0)).err();
        assert_eq!(
            err,
            Some(ExportError::Canvas {
                width: 20_000,
                height: 10
            })
        );
        assert!(!exporter.is_busy());
    }

    #[test]
    fn malformed_document_fails_to_decode() {
        let fonts = Arc::new(usvg::fontdb::Database::new());
        assert!(matches!(
            rasterize("<svg", 10, 10, fonts),
            Err(ExportError::Decode(_))
        ));
    }
}
