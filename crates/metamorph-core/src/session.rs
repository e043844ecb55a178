use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{self, Category};
use crate::graph::{build_graph, CommitGraph, VisibleSet};
use crate::interaction::{Effect, Interaction, Msg};
use crate::scene::{Scene, SceneInputs, SceneStyle};
use crate::simulation::{Simulation, SimulationConfig};
use crate::stats::HistoryStats;
use crate::viewport::Viewport;
use crate::{CommitRecord, NodeId, Point};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub simulation: SimulationConfig,
    pub style: SceneStyle,
    pub width: f64,
    pub height: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            style: SceneStyle::default(),
            width: 800.0,
            height: 600.0,
        }
    }
}

/// What the detail panel shows for the selected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetail {
    pub id: NodeId,
    pub extension: Option<String>,
    pub category: Category,
    pub value: u64,
}

impl NodeDetail {
    pub fn category_label(&self) -> &'static str {
        self.category.label()
    }
}

/// One visualization: history, window, the derived graph and its single live simulation.
///
/// Changing the history, the timeline fraction or the search text tears the
/// simulation down and rebuilds everything from scratch; `generation` counts
/// those rebuilds so hosts can tell when cached per-graph state is stale.
pub struct Session {
    cfg: SessionConfig,
    history: Vec<CommitRecord>,
    fraction: f64,
    graph: CommitGraph,
    visible: VisibleSet,
    simulation: Simulation,
    viewport: Viewport,
    interaction: Interaction,
    generation: u64,
}

impl Session {
    pub fn new(history: Vec<CommitRecord>, cfg: SessionConfig) -> Self {
        let simulation = Simulation::new(
            std::iter::empty::<(NodeId, u64)>(),
            &[],
            cfg.simulation.clone(),
            Point::default(),
        );
        let mut session = Self {
            cfg,
            history,
            fraction: 1.0,
            graph: CommitGraph::default(),
            visible: VisibleSet::default(),
            simulation,
            viewport: Viewport::default(),
            interaction: Interaction::default(),
            generation: 0,
        };
        session.rebuild();
        session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn history(&self) -> &[CommitRecord] {
        &self.history
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn graph(&self) -> &CommitGraph {
        &self.graph
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn size(&self) -> (f64, f64) {
        (self.cfg.width, self.cfg.height)
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats::for_window(&self.history, self.fraction)
    }

    pub fn load_history(&mut self, history: Vec<CommitRecord>) {
        self.history = history;
        self.rebuild();
    }

    /// Moves the timeline. Out-of-range values are clamped; NaN selects nothing.
    pub fn set_timeline(&mut self, fraction: f64) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        if fraction == self.fraction {
            return;
        }
        self.fraction = fraction;
        self.rebuild();
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let effects = self.interaction.update(msg, &self.viewport);
        for effect in effects {
            match effect {
                Effect::Refilter => self.rebuild(),
                Effect::Reheat => self.simulation.reheat(self.cfg.simulation.reheat_alpha),
                Effect::Cool => self.simulation.cool(),
                Effect::Pin { id, at } => {
                    self.simulation.pin(&id, at);
                }
                Effect::Unpin(id) => {
                    self.simulation.unpin(&id);
                }
            }
        }
    }

    /// Updates hover from a pointer position, sending enter/exit only on change.
    pub fn hover_at(&mut self, screen: Point) -> Option<NodeId> {
        let hit = self.hit_test(screen);
        if hit.as_ref() != self.interaction.hovered() {
            match &hit {
                Some(id) => self.dispatch(Msg::HoverEnter(id.clone())),
                None => self.dispatch(Msg::HoverExit),
            }
        }
        hit
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, factor: f64, anchor: Point) {
        self.viewport.zoom_at(factor, anchor);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    /// New canvas size. The layout recentres gradually on the next ticks.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.cfg.width = width;
        self.cfg.height = height;
        self.simulation.set_center(self.center());
    }

    pub fn tick(&mut self) -> Option<&[Point]> {
        self.simulation.tick()
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    /// Cancels the live simulation; it produces no more positions until the next rebuild.
    pub fn stop(&mut self) {
        self.simulation.stop();
    }

    /// Topmost displayed node whose drawn disc contains the screen point.
    pub fn hit_test(&self, screen: Point) -> Option<NodeId> {
        let p = self.viewport.invert(screen);
        let style = &self.cfg.style;
        self.visible
            .nodes
            .iter()
            .zip(self.simulation.positions())
            .rev()
            .find(|&(&gi, &at)| {
                let node = &self.graph.nodes[gi];
                let r = style.radius(node.value, self.interaction.is_hovered(&node.id));
                at.distance(p) <= r.max(2.0)
            })
            .map(|(&gi, _)| self.graph.nodes[gi].id.clone())
    }

    pub fn detail(&self) -> Option<NodeDetail> {
        let id = self.interaction.selected()?;
        let node = self.graph.node(id)?;
        Some(NodeDetail {
            id: node.id.clone(),
            extension: classify::extension(node.id.as_str()).map(str::to_string),
            category: Category::from_group(node.group),
            value: node.value,
        })
    }

    pub fn scene(&self) -> Scene {
        Scene::compose(SceneInputs {
            graph: &self.graph,
            visible: &self.visible,
            positions: self.simulation.positions(),
            viewport: self.viewport,
            interaction: &self.interaction,
            width: self.cfg.width,
            height: self.cfg.height,
            style: &self.cfg.style,
        })
    }

    fn center(&self) -> Point {
        Point::new(self.cfg.width / 2.0, self.cfg.height / 2.0)
    }

    fn rebuild(&mut self) {
        self.simulation.stop();
        self.graph = build_graph(&self.history, self.fraction);
        self.visible = VisibleSet::filter(&self.graph, self.interaction.search());
        self.simulation = Simulation::new(
            self.visible.nodes.iter().map(|&i| {
                let node = &self.graph.nodes[i];
                (node.id.clone(), node.value)
            }),
            &self.visible.links,
            self.cfg.simulation.clone(),
            self.center(),
        );

        let sim = &self.simulation;
        self.interaction.retain_displayed(|id| sim.slot(id).is_some());
        self.generation += 1;
        debug!(
            generation = self.generation,
            fraction = self.fraction,
            displayed = self.visible.nodes.len(),
            "session rebuilt"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EMPTY_WINDOW, NO_MATCHES};
    use crate::FileChange;

    fn history() -> Vec<CommitRecord> {
        vec![
            CommitRecord::with_files(vec![
                FileChange::new("src/app.ts", 100),
                FileChange::new("src/style.css", 25),
            ]),
            CommitRecord::with_files(vec![
                FileChange::new("README.md", 9),
                FileChange::new("src/app.ts", 4),
            ]),
        ]
    }

    fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    fn settle(s: &mut Session) {
        for _ in 0..1_000 {
            if s.tick().is_none() {
                break;
            }
        }
    }

    #[test]
    fn new_session_builds_full_window() {
        let s = Session::new(history(), SessionConfig::default());
        assert_eq!(s.generation(), 1);
        assert_eq!(s.graph().nodes.len(), 3);
        assert_eq!(s.simulation().len(), 3);
        assert!(s.is_running());
        assert_eq!(s.graph().node(&id("src/app.ts")).map(|n| n.value), Some(104));
    }

    #[test]
    fn timeline_is_clamped_and_rebuilds() {
        let mut s = Session::new(history(), SessionConfig::default());

        s.set_timeline(0.5);
        assert_eq!(s.generation(), 2);
        assert_eq!(s.graph().nodes.len(), 2);

        s.set_timeline(7.0);
        assert_eq!(s.fraction(), 1.0);
        assert_eq!(s.graph().nodes.len(), 3);

        s.set_timeline(-1.0);
        assert_eq!(s.fraction(), 0.0);
        assert!(s.graph().is_empty());
        assert!(s.tick().is_none());
        assert_eq!(s.scene().placeholder.as_deref(), Some(EMPTY_WINDOW));
    }

    #[test]
    fn unchanged_timeline_keeps_simulation() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.tick();
        s.set_timeline(1.0);
        assert_eq!(s.generation(), 1);
        assert_eq!(s.simulation().ticks(), 1);
    }

    #[test]
    fn search_rebuilds_and_drops_hidden_selection() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.dispatch(Msg::Select(id("README.md")));
        s.dispatch(Msg::HoverEnter(id("src/app.ts")));

        s.dispatch(Msg::SearchChanged("SRC".into()));
        assert_eq!(s.generation(), 2);
        assert_eq!(s.visible().nodes.len(), 2);
        assert_eq!(s.simulation().alpha(), 1.0);
        assert_eq!(s.interaction().selected(), None);
        assert_eq!(s.interaction().hovered(), Some(&id("src/app.ts")));

        s.dispatch(Msg::SearchChanged("zzz".into()));
        assert_eq!(s.scene().placeholder.as_deref(), Some(NO_MATCHES));
    }

    #[test]
    fn dragged_node_follows_pointer_every_tick() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.zoom_at(2.0, Point::new(0.0, 0.0));
        s.pan_by(30.0, -20.0);
        settle(&mut s);

        let pointer = Point::new(500.0, 420.0);
        let want = s.viewport().invert(pointer);
        s.dispatch(Msg::DragStart {
            id: id("src/app.ts"),
            pointer,
        });
        assert!(s.is_running());
        assert_eq!(s.simulation().alpha_target(), 0.3);
        for _ in 0..5 {
            s.tick();
            assert_eq!(s.simulation().position(&id("src/app.ts")), Some(want));
        }

        let pointer = Point::new(100.0, 90.0);
        s.dispatch(Msg::DragMove { pointer });
        s.tick();
        assert_eq!(
            s.simulation().position(&id("src/app.ts")),
            Some(s.viewport().invert(pointer))
        );

        s.dispatch(Msg::DragEnd);
        assert!(!s.simulation().is_pinned(&id("src/app.ts")));
        assert_eq!(s.simulation().alpha_target(), 0.0);
        assert!(s.simulation().alpha() > 0.0);
        assert!(s.tick().is_some());
    }

    #[test]
    fn rebuild_cancels_active_drag() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.dispatch(Msg::DragStart {
            id: id("src/app.ts"),
            pointer: Point::new(10.0, 10.0),
        });
        s.set_timeline(0.5);
        assert!(s.interaction().drag().is_none());
        assert!(!s.simulation().is_pinned(&id("src/app.ts")));
    }

    #[test]
    fn hit_test_respects_viewport() {
        let mut s = Session::new(history(), SessionConfig::default());
        settle(&mut s);
        s.zoom_at(1.5, Point::new(400.0, 300.0));

        let at = s.simulation().position(&id("src/app.ts")).expect("laid out");
        let screen = s.viewport().apply(at);
        assert_eq!(s.hit_test(screen), Some(id("src/app.ts")));
        assert_eq!(s.hit_test(Point::new(-5_000.0, -5_000.0)), None);

        assert_eq!(s.hover_at(screen), Some(id("src/app.ts")));
        assert!(s.interaction().is_hovered(&id("src/app.ts")));
        s.hover_at(Point::new(-5_000.0, -5_000.0));
        assert_eq!(s.interaction().hovered(), None);
    }

    #[test]
    fn detail_describes_selected_node() {
        let mut s = Session::new(history(), SessionConfig::default());
        assert_eq!(s.detail(), None);

        s.dispatch(Msg::Select(id("src/style.css")));
        let d = s.detail().expect("selected");
        assert_eq!(d.extension.as_deref(), Some("css"));
        assert_eq!(d.category, Category::Styles);
        assert_eq!(d.category_label(), "Styles");
        assert_eq!(d.value, 25);
    }

    #[test]
    fn stop_silences_ticks_until_rebuild() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.stop();
        assert!(s.tick().is_none());

        s.load_history(history());
        assert_eq!(s.generation(), 2);
        assert!(s.tick().is_some());
    }

    #[test]
    fn resize_updates_canvas_and_ignores_nonsense() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.resize(1024.0, 768.0);
        assert_eq!(s.scene().pixel_size(), (1024, 768));
        s.resize(0.0, f64::NAN);
        assert_eq!(s.size(), (1024.0, 768.0));
    }

    #[test]
    fn view_controls_reset() {
        let mut s = Session::new(history(), SessionConfig::default());
        s.zoom_at(3.0, Point::new(10.0, 10.0));
        s.pan_by(5.0, 5.0);
        s.reset_view();
        assert_eq!(*s.viewport(), Viewport::IDENTITY);
    }

    #[test]
    fn stats_follow_timeline() {
        let mut s = Session::new(history(), SessionConfig::default());
        assert_eq!(s.stats().commits, 2);
        s.set_timeline(0.5);
        assert_eq!(s.stats().commits, 1);
        assert_eq!(s.stats().total_changes, 125);
    }
}
