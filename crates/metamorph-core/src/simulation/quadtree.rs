use crate::Point;

const MAX_DEPTH: usize = 48;

#[derive(Debug, Clone)]
pub(crate) struct Cell {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub children: [Option<usize>; 4],
    /// Non-empty only on leaves; more than one entry means coincident points.
    pub points: Vec<usize>,
    pub charge: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Cell {
    fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            children: [None; 4],
            points: Vec::new(),
            charge: 0.0,
            cx: 0.0,
            cy: 0.0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

/// Region quadtree over point indices, carrying aggregate charge per cell.
#[derive(Debug, Clone, Default)]
pub(crate) struct QuadTree {
    pub cells: Vec<Cell>,
}

impl QuadTree {
    pub fn build(points: &[Point]) -> Self {
        let mut tree = QuadTree::default();
        if points.is_empty() {
            return tree;
        }

        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        let size = (x1 - x0).max(y1 - y0).max(1.0);
        tree.cells.push(Cell::new(x0, y0, x0 + size, y0 + size));

        for i in 0..points.len() {
            tree.insert(0, i, points, 0);
        }
        tree
    }

    pub fn root(&self) -> Option<usize> {
        if self.cells.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn insert(&mut self, cell: usize, i: usize, points: &[Point], depth: usize) {
        if self.cells[cell].is_leaf() {
            let coincident = self.cells[cell]
                .points
                .first()
                .map(|&j| points[j] == points[i])
                .unwrap_or(true);
            if coincident || depth >= MAX_DEPTH {
                self.cells[cell].points.push(i);
                return;
            }
            let existing = std::mem::take(&mut self.cells[cell].points);
            for j in existing {
                self.insert_into_child(cell, j, points, depth);
            }
        }
        self.insert_into_child(cell, i, points, depth);
    }

    fn insert_into_child(&mut self, cell: usize, i: usize, points: &[Point], depth: usize) {
        let c = &self.cells[cell];
        let mx = (c.x0 + c.x1) * 0.5;
        let my = (c.y0 + c.y1) * 0.5;
        let right = points[i].x >= mx;
        let below = points[i].y >= my;
        let q = (right as usize) | ((below as usize) << 1);

        let child = match c.children[q] {
            Some(child) => child,
            None => {
                let (x0, x1) = if right { (mx, c.x1) } else { (c.x0, mx) };
                let (y0, y1) = if below { (my, c.y1) } else { (c.y0, my) };
                let idx = self.cells.len();
                self.cells.push(Cell::new(x0, y0, x1, y1));
                self.cells[cell].children[q] = Some(idx);
                idx
            }
        };
        self.insert(child, i, points, depth + 1);
    }

    /// Post-order pass: each cell's charge and charge-weighted centre.
    pub fn accumulate(&mut self, points: &[Point], strength: f64) {
        if let Some(root) = self.root() {
            self.accumulate_cell(root, points, strength);
        }
    }

    fn accumulate_cell(&mut self, cell: usize, points: &[Point], strength: f64) {
        if self.cells[cell].is_leaf() {
            let c = &mut self.cells[cell];
            if let Some(&first) = c.points.first() {
                c.cx = points[first].x;
                c.cy = points[first].y;
            }
            c.charge = strength * c.points.len() as f64;
            return;
        }

        let children = self.cells[cell].children;
        let (mut charge, mut weight, mut x, mut y) = (0.0, 0.0, 0.0, 0.0);
        for child in children.into_iter().flatten() {
            self.accumulate_cell(child, points, strength);
            let ch = &self.cells[child];
            let w = ch.charge.abs();
            if w > 0.0 {
                charge += ch.charge;
                weight += w;
                x += w * ch.cx;
                y += w * ch.cy;
            }
        }

        let c = &mut self.cells[cell];
        c.charge = charge;
        if weight > 0.0 {
            c.cx = x / weight;
            c.cy = y / weight;
        }
    }
}
