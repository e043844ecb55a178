use std::collections::HashMap;

use crate::classify::Category;
use crate::{CommitRecord, Edge, FileChange, Node, NodeId};

/// Nodes and co-change edges folded from one window of history. Rebuilt from scratch per change.
#[derive(Debug, Clone, Default)]
pub struct CommitGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index: HashMap<NodeId, usize>,
}

impl CommitGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    fn accumulate(&mut self, filename: &str, changes: u64) {
        let id = NodeId::new(filename);
        match self.index.get(&id) {
            Some(&i) => {
                let node = &mut self.nodes[i];
                node.value = node.value.saturating_add(changes);
            }
            None => {
                self.index.insert(id.clone(), self.nodes.len());
                self.nodes.push(Node {
                    group: Category::of_path(filename).group(),
                    id,
                    value: changes,
                });
            }
        }
    }

    fn push_edge(&mut self, source: &str, target: &str) {
        self.edges.push(Edge {
            source: NodeId::new(source),
            target: NodeId::new(target),
            weight: 1,
        });
    }
}

/// Number of most-recent commits selected by a timeline fraction: `floor(len * p)`, `p` clamped to [0,1].
pub fn window_len(total: usize, fraction: f64) -> usize {
    if fraction.is_nan() {
        return 0;
    }
    let p = fraction.clamp(0.0, 1.0);
    (((total as f64) * p).floor() as usize).min(total)
}

/// Folds the most-recent-first prefix selected by `fraction` into a node/edge set.
pub fn build_graph(commits: &[CommitRecord], fraction: f64) -> CommitGraph {
    let take = window_len(commits.len(), fraction);
    let mut graph = CommitGraph::default();

    for commit in &commits[..take] {
        let files: Vec<&FileChange> = commit
            .files
            .iter()
            .filter(|f| !f.filename.is_empty())
            .collect();

        for file in files.iter() {
            graph.accumulate(&file.filename, file.changes);
            for other in files.iter() {
                if other.filename != file.filename {
                    graph.push_edge(&file.filename, &other.filename);
                }
            }
        }
    }

    tracing::debug!(
        commits = take,
        of = commits.len(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "graph rebuilt"
    );
    graph
}

/// Display-time projection of a graph through the search filter.
/// Slot `i` of the projection is graph node `nodes[i]`; the simulation arena uses the same slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub nodes: Vec<usize>,
    pub edges: Vec<usize>,
    /// Slot pairs for `edges`, same order.
    pub links: Vec<(usize, usize)>,
    slots: Vec<Option<usize>>,
}

impl VisibleSet {
    pub fn all(graph: &CommitGraph) -> Self {
        Self::filter(graph, "")
    }

    /// Case-insensitive substring match on the node id; only the empty query keeps everything.
    pub fn filter(graph: &CommitGraph, query: &str) -> Self {
        let needle = query.to_lowercase();
        let mut out = VisibleSet {
            slots: vec![None; graph.nodes.len()],
            ..Self::default()
        };

        for (i, node) in graph.nodes.iter().enumerate() {
            if needle.is_empty() || node.id.0.to_lowercase().contains(&needle) {
                out.slots[i] = Some(out.nodes.len());
                out.nodes.push(i);
            }
        }

        for (e, edge) in graph.edges.iter().enumerate() {
            let (Some(s), Some(t)) = (graph.index_of(&edge.source), graph.index_of(&edge.target))
            else {
                continue;
            };
            if let (Some(a), Some(b)) = (out.slots[s], out.slots[t]) {
                out.edges.push(e);
                out.links.push((a, b));
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn slot_of(&self, graph_index: usize) -> Option<usize> {
        self.slots.get(graph_index).copied().flatten()
    }

    /// Materializes the projection as its own graph.
    pub fn project(&self, graph: &CommitGraph) -> CommitGraph {
        let mut out = CommitGraph::default();
        for &i in &self.nodes {
            let node = graph.nodes[i].clone();
            out.index.insert(node.id.clone(), out.nodes.len());
            out.nodes.push(node);
        }
        out.edges = self.edges.iter().map(|&e| graph.edges[e].clone()).collect();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(files: &[(&str, u64)]) -> CommitRecord {
        CommitRecord::with_files(files.iter().map(|(f, c)| FileChange::new(*f, *c)).collect())
    }

    fn pairs(g: &CommitGraph) -> Vec<(&str, &str, u32)> {
        g.edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.weight))
            .collect()
    }

    #[test]
    fn single_commit_two_files() {
        let g = build_graph(&[commit(&[("a.ts", 5), ("b.css", 3)])], 1.0);

        assert_eq!(g.nodes.len(), 2);
        let a = g.node(&NodeId::new("a.ts")).expect("a.ts");
        let b = g.node(&NodeId::new("b.css")).expect("b.css");
        assert_eq!((a.value, Category::from_group(a.group)), (5, Category::TypeScript));
        assert_eq!((b.value, Category::from_group(b.group)), (3, Category::Styles));
        assert_eq!(pairs(&g), vec![("a.ts", "b.css", 1), ("b.css", "a.ts", 1)]);
    }

    #[test]
    fn repeated_file_accumulates_value() {
        let g = build_graph(&[commit(&[("a.ts", 5)]), commit(&[("a.ts", 2)])], 1.0);
        assert_eq!(g.nodes.len(), 1);
        assert_eq!(g.nodes[0].value, 7);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn k_files_yield_k_times_k_minus_one_edges() {
        let files: Vec<(String, u64)> = (0..6).map(|i| (format!("f{i}.js"), i + 1)).collect();
        let refs: Vec<(&str, u64)> = files.iter().map(|(f, c)| (f.as_str(), *c)).collect();
        let g = build_graph(&[commit(&refs)], 1.0);

        assert_eq!(g.nodes.len(), 6);
        assert_eq!(g.edges.len(), 6 * 5);
        assert!(g.edges.iter().all(|e| e.source != e.target && e.weight == 1));
        for (f, c) in &files {
            assert_eq!(g.node(&NodeId::new(f.as_str())).map(|n| n.value), Some(*c));
        }
    }

    #[test]
    fn repeated_pairs_are_not_merged() {
        let c = commit(&[("a.ts", 1), ("b.ts", 1)]);
        let g = build_graph(&[c.clone(), c], 1.0);
        assert_eq!(g.edges.len(), 4);
    }

    #[test]
    fn zero_fraction_or_empty_history_is_empty() {
        let history = vec![commit(&[("a.ts", 5), ("b.css", 3)])];
        assert!(build_graph(&history, 0.0).is_empty());
        assert!(build_graph(&[], 1.0).is_empty());
        assert!(build_graph(&history, f64::NAN).is_empty());
    }

    #[test]
    fn window_is_a_floor_prefix() {
        assert_eq!(window_len(10, 0.25), 2);
        assert_eq!(window_len(10, 1.0), 10);
        assert_eq!(window_len(10, 7.0), 10);
        assert_eq!(window_len(10, -1.0), 0);
        assert_eq!(window_len(3, 0.999), 2);
    }

    #[test]
    fn window_growth_is_monotonic() {
        let history = vec![
            commit(&[("a.ts", 5), ("b.css", 3)]),
            commit(&[("a.ts", 2), ("c.md", 9)]),
            commit(&[("d.json", 1)]),
            commit(&[("b.css", 4), ("d.json", 6), ("e.html", 2)]),
        ];
        let steps: Vec<f64> = (0..=20).map(|i| i as f64 / 20.0).collect();
        for w in steps.windows(2) {
            let lo = build_graph(&history, w[0]);
            let hi = build_graph(&history, w[1]);
            for n in &lo.nodes {
                let grown = hi.node(&n.id).expect("node kept as window grows");
                assert!(n.value <= grown.value);
            }
        }
    }

    #[test]
    fn group_is_independent_of_creation_order() {
        let g1 = build_graph(&[commit(&[("x.ts", 1), ("y.md", 1)])], 1.0);
        let g2 = build_graph(&[commit(&[("y.md", 1)]), commit(&[("x.ts", 1)])], 1.0);
        for id in ["x.ts", "y.md"] {
            let id = NodeId::new(id);
            assert_eq!(g1.node(&id).map(|n| n.group), g2.node(&id).map(|n| n.group));
        }
    }

    #[test]
    fn records_without_filename_are_skipped() {
        let g = build_graph(&[commit(&[("", 10), ("a.ts", 1)])], 1.0);
        assert_eq!(g.nodes.len(), 1);
        assert!(g.edges.is_empty());
    }

    #[test]
    fn filter_keeps_edges_with_both_endpoints() {
        let g = build_graph(&[commit(&[("src/App.tsx", 1), ("src/app.css", 1), ("README.md", 1)])], 1.0);
        let vis = VisibleSet::filter(&g, "APP");

        assert_eq!(vis.nodes.len(), 2);
        assert_eq!(vis.edges.len(), 2);
        for &(a, b) in &vis.links {
            assert!(a < 2 && b < 2);
        }
    }

    #[test]
    fn whitespace_in_query_is_matched_literally() {
        let g = build_graph(&[commit(&[("docs/My Notes.md", 1), ("src/a.ts", 2)])], 1.0);
        let ids = |vis: &VisibleSet| -> Vec<&str> {
            vis.nodes.iter().map(|&i| g.nodes[i].id.as_str()).collect()
        };

        assert_eq!(ids(&VisibleSet::filter(&g, " ")), vec!["docs/My Notes.md"]);
        assert!(VisibleSet::filter(&g, "a.ts ").is_empty());
        assert_eq!(ids(&VisibleSet::filter(&g, "my notes")), vec!["docs/My Notes.md"]);
        assert_eq!(VisibleSet::filter(&g, "").nodes.len(), 2);
    }

    #[test]
    fn filter_is_idempotent() {
        let g = build_graph(
            &[commit(&[("src/a.ts", 1), ("src/b.ts", 2), ("docs/c.md", 3)])],
            1.0,
        );
        let once = VisibleSet::filter(&g, "src").project(&g);
        let twice = VisibleSet::filter(&once, "src").project(&once);
        assert_eq!(once.nodes, twice.nodes);
        assert_eq!(once.edges, twice.edges);
    }

    #[test]
    fn filter_matching_nothing_is_empty_not_error() {
        let g = build_graph(&[commit(&[("a.ts", 1), ("b.ts", 2)])], 1.0);
        let vis = VisibleSet::filter(&g, "zzz");
        assert!(vis.is_empty());
        assert!(vis.edges.is_empty());
        // Underlying values untouched.
        assert_eq!(g.nodes.iter().map(|n| n.value).sum::<u64>(), 3);
    }
}
