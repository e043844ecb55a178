mod quadtree;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{NodeId, Point};
use quadtree::QuadTree;

const INITIAL_RADIUS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub link_distance: f64,
    /// Many-body strength per node; negative repels.
    pub charge: f64,
    /// Barnes-Hut opening criterion.
    pub theta: f64,
    pub distance_min: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// Alpha target while a node is being dragged.
    pub reheat_alpha: f64,
    pub collide_scale: f64,
    pub collide_padding: f64,
    pub collide_strength: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min: f64 = 0.001;
        Self {
            link_distance: 100.0,
            charge: -200.0,
            theta: 0.9,
            distance_min: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            reheat_alpha: 0.3,
            collide_scale: 2.0,
            collide_padding: 5.0,
            collide_strength: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn collide_radius(&self, value: u64) -> f64 {
        (value as f64).sqrt() * self.collide_scale + self.collide_padding
    }
}

#[derive(Debug, Clone, Copy)]
struct Link {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

/// Deterministic jitter source used to separate coincident nodes.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = (1_664_525 * self.0 + 1_013_904_223) % 4_294_967_296;
        self.0 as f64 / 4_294_967_296.0
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

/// Force-directed layout over an arena of bodies.
///
/// Slot `i` in every per-body vector is the same node; `index` maps ids to slots.
/// The layout advances one frame per [`Simulation::tick`] while `alpha` decays
/// toward `alpha_target`, and stops on its own once alpha drops below `alpha_min`.
#[derive(Debug, Clone)]
pub struct Simulation {
    cfg: SimulationConfig,
    ids: Vec<NodeId>,
    index: HashMap<NodeId, usize>,
    radii: Vec<f64>,
    positions: Vec<Point>,
    velocities: Vec<Point>,
    pins: Vec<Option<Point>>,
    links: Vec<Link>,
    center: Point,
    alpha: f64,
    alpha_target: f64,
    running: bool,
    ticks: u64,
    rng: Lcg,
}

impl Simulation {
    /// `bodies` are `(id, value)` in slot order; `links` are slot pairs.
    pub fn new(
        bodies: impl IntoIterator<Item = (NodeId, u64)>,
        links: &[(usize, usize)],
        cfg: SimulationConfig,
        center: Point,
    ) -> Self {
        let mut ids = Vec::new();
        let mut radii = Vec::new();
        for (id, value) in bodies {
            radii.push(cfg.collide_radius(value));
            ids.push(id);
        }
        let n = ids.len();
        let index = ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();

        let golden = std::f64::consts::PI * (3.0 - 5f64.sqrt());
        let positions = (0..n)
            .map(|i| {
                let r = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let a = i as f64 * golden;
                Point::new(center.x + r * a.cos(), center.y + r * a.sin())
            })
            .collect();

        let mut degree = vec![0usize; n];
        for &(s, t) in links.iter().filter(|(s, t)| *s < n && *t < n) {
            degree[s] += 1;
            degree[t] += 1;
        }
        let links = links
            .iter()
            .filter(|(s, t)| *s < n && *t < n && s != t)
            .map(|&(source, target)| {
                let (ds, dt) = (degree[source] as f64, degree[target] as f64);
                Link {
                    source,
                    target,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        Self {
            cfg,
            ids,
            index,
            radii,
            positions,
            velocities: vec![Point::default(); n],
            pins: vec![None; n],
            links,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            running: n > 0,
            ticks: 0,
            rng: Lcg(1),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn position(&self, id: &NodeId) -> Option<Point> {
        self.index.get(id).map(|&i| self.positions[i])
    }

    pub fn slot(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_pinned(&self, id: &NodeId) -> bool {
        self.index
            .get(id)
            .map(|&i| self.pins[i].is_some())
            .unwrap_or(false)
    }

    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Advances one frame. Returns the new positions, or `None` once settled or stopped.
    pub fn tick(&mut self) -> Option<&[Point]> {
        if !self.running {
            return None;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.cfg.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();
        self.apply_collide();
        self.integrate();
        self.ticks += 1;

        if self.alpha < self.cfg.alpha_min {
            self.running = false;
            tracing::debug!(ticks = self.ticks, nodes = self.len(), "simulation settled");
        }
        Some(&self.positions)
    }

    /// Ticks until settled or `max_ticks` frames have run; returns frames run.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> u64 {
        let mut n = 0;
        while n < max_ticks && self.tick().is_some() {
            n += 1;
        }
        n
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Re-energizes to at least `target` and holds alpha there until [`Simulation::cool`].
    pub fn reheat(&mut self, target: f64) {
        self.alpha_target = target;
        self.alpha = self.alpha.max(target);
        self.running = !self.is_empty();
    }

    /// Lets alpha decay to rest again.
    pub fn cool(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Forces `id` to `at` on every tick until unpinned.
    pub fn pin(&mut self, id: &NodeId, at: Point) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.pins[i] = Some(at);
        self.positions[i] = at;
        self.velocities[i] = Point::default();
        true
    }

    pub fn unpin(&mut self, id: &NodeId) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        self.pins[i].take().is_some()
    }

    fn apply_links(&mut self) {
        let alpha = self.alpha;
        for link in &self.links {
            let (s, t) = (link.source, link.target);
            let mut x = self.positions[t].x + self.velocities[t].x
                - self.positions[s].x
                - self.velocities[s].x;
            let mut y = self.positions[t].y + self.velocities[t].y
                - self.positions[s].y
                - self.velocities[s].y;
            if x == 0.0 {
                x = self.rng.jiggle();
            }
            if y == 0.0 {
                y = self.rng.jiggle();
            }
            let mut l = (x * x + y * y).sqrt();
            l = (l - self.cfg.link_distance) / l * alpha * link.strength;
            x *= l;
            y *= l;

            let b = link.bias;
            self.velocities[t].x -= x * b;
            self.velocities[t].y -= y * b;
            self.velocities[s].x += x * (1.0 - b);
            self.velocities[s].y += y * (1.0 - b);
        }
    }

    fn apply_charge(&mut self) {
        let mut tree = QuadTree::build(&self.positions);
        tree.accumulate(&self.positions, self.cfg.charge);
        let Some(root) = tree.root() else {
            return;
        };

        let theta2 = self.cfg.theta * self.cfg.theta;
        let dmin2 = self.cfg.distance_min * self.cfg.distance_min;
        let alpha = self.alpha;
        let mut stack = Vec::new();

        for i in 0..self.positions.len() {
            let p = self.positions[i];
            let mut dv = Point::default();
            stack.clear();
            stack.push(root);

            while let Some(ci) = stack.pop() {
                let cell = &tree.cells[ci];
                if cell.charge == 0.0 {
                    continue;
                }
                let mut x = cell.cx - p.x;
                let mut y = cell.cy - p.y;
                let w = cell.width();
                let mut l = x * x + y * y;

                // Far enough: treat the whole cell as one body.
                if w * w / theta2 < l {
                    if x == 0.0 {
                        x = self.rng.jiggle();
                        l += x * x;
                    }
                    if y == 0.0 {
                        y = self.rng.jiggle();
                        l += y * y;
                    }
                    if l < dmin2 {
                        l = (dmin2 * l).sqrt();
                    }
                    dv.x += x * cell.charge * alpha / l;
                    dv.y += y * cell.charge * alpha / l;
                    continue;
                }

                if !cell.is_leaf() {
                    stack.extend(cell.children.iter().flatten().copied());
                    continue;
                }

                let only_self = cell.points.len() == 1 && cell.points[0] == i;
                if only_self {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                if l < dmin2 {
                    l = (dmin2 * l).sqrt();
                }
                for &j in &cell.points {
                    if j != i {
                        let w = self.cfg.charge * alpha / l;
                        dv.x += x * w;
                        dv.y += y * w;
                    }
                }
            }

            self.velocities[i].x += dv.x;
            self.velocities[i].y += dv.y;
        }
    }

    fn apply_center(&mut self) {
        let n = self.positions.len();
        if n == 0 {
            return;
        }
        let (sx, sy) = self
            .positions
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let dx = sx / n as f64 - self.center.x;
        let dy = sy / n as f64 - self.center.y;
        for p in &mut self.positions {
            p.x -= dx;
            p.y -= dy;
        }
    }

    fn apply_collide(&mut self) {
        let n = self.positions.len();
        if n < 2 {
            return;
        }
        let predicted: Vec<Point> = self
            .positions
            .iter()
            .zip(&self.velocities)
            .map(|(p, v)| Point::new(p.x + v.x, p.y + v.y))
            .collect();
        let max_r = self.radii.iter().copied().fold(0.0, f64::max);

        // Sweep along x; pairs further apart than the largest reach cannot touch.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| predicted[a].x.total_cmp(&predicted[b].x));

        for (a, &i) in order.iter().enumerate() {
            let ri = self.radii[i];
            for &j in &order[a + 1..] {
                if predicted[j].x - predicted[i].x > ri + max_r {
                    break;
                }
                let rj = self.radii[j];
                let r = ri + rj;
                let mut x = predicted[i].x - predicted[j].x;
                let mut y = predicted[i].y - predicted[j].y;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                let d = l.sqrt();
                let k = (r - d) / d * self.cfg.collide_strength;
                x *= k;
                y *= k;

                let share = (rj * rj) / (ri * ri + rj * rj);
                self.velocities[i].x += x * share;
                self.velocities[i].y += y * share;
                self.velocities[j].x -= x * (1.0 - share);
                self.velocities[j].y -= y * (1.0 - share);
            }
        }
    }

    fn integrate(&mut self) {
        let keep = 1.0 - self.cfg.velocity_decay;
        for i in 0..self.positions.len() {
            match self.pins[i] {
                Some(at) => {
                    self.positions[i] = at;
                    self.velocities[i] = Point::default();
                }
                None => {
                    let v = &mut self.velocities[i];
                    v.x *= keep;
                    v.y *= keep;
                    self.positions[i].x += v.x;
                    self.positions[i].y += v.y;
                }
            }
        }
    }
}
