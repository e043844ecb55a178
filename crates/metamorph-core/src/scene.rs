use serde::{Deserialize, Serialize};

use crate::graph::{CommitGraph, VisibleSet};
use crate::interaction::Interaction;
use crate::viewport::Viewport;
use crate::{NodeId, Point};

pub const EMPTY_WINDOW: &str = "No file changes found in the selected time period";
pub const NO_MATCHES: &str = "No files match the current search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    pub radius_scale: f64,
    pub hover_radius_scale: f64,
    /// Labels are drawn only for nodes busier than this.
    pub label_min_value: u64,
    pub label_gap: f64,
    pub font_size: f64,
    pub label_color: String,
    pub link_color: String,
    pub link_opacity: f64,
    pub node_stroke: String,
    pub node_stroke_width: f64,
    pub selected_stroke: String,
    pub selected_stroke_width: f64,
    pub placeholder_color: String,
    pub palette: Vec<String>,
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            radius_scale: 2.0,
            hover_radius_scale: 2.5,
            label_min_value: 50,
            label_gap: 5.0,
            font_size: 10.0,
            label_color: "#666".into(),
            link_color: "#999".into(),
            link_opacity: 0.6,
            node_stroke: "#fff".into(),
            node_stroke_width: 1.5,
            selected_stroke: "#f59e0b".into(),
            selected_stroke_width: 3.0,
            placeholder_color: "#666".into(),
            palette: [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2",
                "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

impl SceneStyle {
    pub fn fill_for(&self, group: u8) -> &str {
        if self.palette.is_empty() {
            return "#999";
        }
        &self.palette[group as usize % self.palette.len()]
    }

    pub fn radius(&self, value: u64, hovered: bool) -> f64 {
        let scale = if hovered {
            self.hover_radius_scale
        } else {
            self.radius_scale
        };
        (value as f64).sqrt() * scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkShape {
    pub from: Point,
    pub to: Point,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeShape {
    pub id: NodeId,
    pub center: Point,
    pub radius: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub label: Option<String>,
    /// Label offset from the centre, from the resting radius.
    pub label_dx: f64,
    pub title: String,
    pub hovered: bool,
    pub selected: bool,
}

/// Immediate-mode description of one frame. Shapes are in simulation space; `transform` maps to screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub transform: Viewport,
    pub links: Vec<LinkShape>,
    pub nodes: Vec<NodeShape>,
    pub placeholder: Option<String>,
    pub style: SceneStyle,
}

pub struct SceneInputs<'a> {
    pub graph: &'a CommitGraph,
    pub visible: &'a VisibleSet,
    /// Per visible slot.
    pub positions: &'a [Point],
    pub viewport: Viewport,
    pub interaction: &'a Interaction,
    pub width: f64,
    pub height: f64,
    pub style: &'a SceneStyle,
}

impl Scene {
    pub fn compose(input: SceneInputs<'_>) -> Self {
        let style = input.style;
        let mut scene = Scene {
            width: input.width,
            height: input.height,
            transform: input.viewport,
            links: Vec::new(),
            nodes: Vec::new(),
            placeholder: None,
            style: style.clone(),
        };

        if input.graph.is_empty() {
            scene.placeholder = Some(EMPTY_WINDOW.to_string());
            return scene;
        }
        if input.visible.is_empty() {
            scene.placeholder = Some(NO_MATCHES.to_string());
            return scene;
        }

        for (&e, &(a, b)) in input.visible.edges.iter().zip(&input.visible.links) {
            let (Some(&from), Some(&to)) = (input.positions.get(a), input.positions.get(b)) else {
                continue;
            };
            scene.links.push(LinkShape {
                from,
                to,
                width: (input.graph.edges[e].weight as f64).sqrt(),
            });
        }

        for (slot, &gi) in input.visible.nodes.iter().enumerate() {
            let Some(&center) = input.positions.get(slot) else {
                continue;
            };
            let node = &input.graph.nodes[gi];
            let hovered = input.interaction.is_hovered(&node.id);
            let selected = input.interaction.is_selected(&node.id);
            let (stroke, stroke_width) = if selected {
                (style.selected_stroke.clone(), style.selected_stroke_width)
            } else {
                (style.node_stroke.clone(), style.node_stroke_width)
            };

            scene.nodes.push(NodeShape {
                id: node.id.clone(),
                center,
                radius: style.radius(node.value, hovered),
                fill: style.fill_for(node.group).to_string(),
                stroke,
                stroke_width,
                label: (node.value > style.label_min_value).then(|| node.id.basename().to_string()),
                label_dx: style.radius(node.value, false) + style.label_gap,
                title: format!("{}\nChanges: {}", node.id, node.value),
                hovered,
                selected,
            });
        }
        scene
    }

    pub fn to_screen(&self, p: Point) -> Point {
        self.transform.apply(p)
    }

    /// Raster dimensions of the canvas, at least 1x1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |v: f64| {
            if v.is_finite() {
                v.round().clamp(1.0, u32::MAX as f64) as u32
            } else {
                1
            }
        };
        (px(self.width), px(self.height))
    }
}

/// `#rgb` / `#rrggbb` to components.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    let part = |from: usize, len: usize| u8::from_str_radix(hex.get(from..from + len)?, 16).ok();
    match hex.len() {
        3 => Some((part(0, 1)? * 17, part(1, 1)? * 17, part(2, 1)? * 17)),
        6 => Some((part(0, 2)?, part(2, 2)?, part(4, 2)?)),
        _ => None,
    }
}
