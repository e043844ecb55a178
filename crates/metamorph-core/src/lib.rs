use serde::{Deserialize, Serialize};
use std::fmt;

pub mod classify;
pub mod export;
pub mod graph;
pub mod history;
pub mod interaction;
pub mod scene;
pub mod session;
pub mod simulation;
pub mod stats;
pub mod viewport;

pub use classify::Category;
pub use export::{ExportError, ExportFormat, PendingExport, RasterExporter};
pub use graph::{build_graph, CommitGraph, VisibleSet};
pub use history::{parse_history, HistoryError};
pub use interaction::{Interaction, Msg};
pub use scene::{Scene, SceneStyle};
pub use session::{NodeDetail, Session, SessionConfig};
pub use simulation::{Simulation, SimulationConfig};
pub use stats::{ExtensionShare, HistoryStats};
pub use viewport::Viewport;

/// File path of a node; unique within one graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment, used for on-canvas labels.
    pub fn basename(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub group: u8,
    /// Sum of added + removed lines over every windowed commit touching this file.
    pub value: u64,
}

/// Co-change record. Stored directionally; a commit touching `k` files yields `k*(k-1)` of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    pub changes: u64,
}

impl FileChange {
    pub fn new(filename: impl Into<String>, changes: u64) -> Self {
        Self {
            filename: filename.into(),
            changes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitRecord {
    pub sha: Option<String>,
    pub author: Option<String>,
    /// ISO-8601 author timestamp as delivered upstream.
    pub date: Option<String>,
    pub message: Option<String>,
    pub files: Vec<FileChange>,
}

impl CommitRecord {
    pub fn with_files(files: Vec<FileChange>) -> Self {
        Self {
            files,
            ..Self::default()
        }
    }
}
