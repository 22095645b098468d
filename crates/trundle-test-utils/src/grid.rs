//! In-memory dense costmap stub.
//!
//! A minimal row-major cost grid implementing the [`Costmap`] capability,
//! sized and painted directly by tests.

use trundle_core::costmap::{COST_FREE, Costmap};

/// Dense 2D cost grid with a world-frame origin and square cells.
#[derive(Debug, Clone)]
pub struct GridCostmap {
    width: usize,
    height: usize,
    resolution: f64,
    origin_x: f64,
    origin_y: f64,
    cells: Vec<u8>,
    tracks_unknown: bool,
}

impl GridCostmap {
    /// Grid with every cell at `cost`. `(origin_x, origin_y)` is the world
    /// coordinate of cell (0, 0); `resolution` is meters per cell.
    pub fn uniform(
        width: usize,
        height: usize,
        resolution: f64,
        origin_x: f64,
        origin_y: f64,
        cost: u8,
    ) -> Self {
        Self {
            width,
            height,
            resolution,
            origin_x,
            origin_y,
            cells: vec![cost; width * height],
            tracks_unknown: false,
        }
    }

    /// All-free grid centered on the origin, `side` meters across.
    pub fn open_square(side: f64, resolution: f64) -> Self {
        let cells_per_side = (side / resolution).ceil() as usize;
        Self::uniform(
            cells_per_side,
            cells_per_side,
            resolution,
            -side / 2.0,
            -side / 2.0,
            COST_FREE,
        )
    }

    pub fn set_tracks_unknown(&mut self, tracks: bool) {
        self.tracks_unknown = tracks;
    }

    /// Paint every cell overlapping the world-frame axis-aligned rectangle.
    pub fn paint_rect(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64, cost: u8) {
        for cy in 0..self.height {
            for cx in 0..self.width {
                let wx = self.origin_x + (cx as f64 + 0.5) * self.resolution;
                let wy = self.origin_y + (cy as f64 + 0.5) * self.resolution;
                if wx >= min_x && wx <= max_x && wy >= min_y && wy <= max_y {
                    self.cells[cy * self.width + cx] = cost;
                }
            }
        }
    }
}

impl Costmap for GridCostmap {
    fn cost_at(&self, x: f64, y: f64) -> Option<u8> {
        let cx = (x - self.origin_x) / self.resolution;
        let cy = (y - self.origin_y) / self.resolution;
        if cx < 0.0 || cy < 0.0 || cx >= self.width as f64 || cy >= self.height as f64 {
            return None;
        }
        Some(self.cells[cy as usize * self.width + cx as usize])
    }

    fn tracks_unknown(&self) -> bool {
        self.tracks_unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trundle_core::costmap::COST_LETHAL;

    #[test]
    fn lookup_respects_origin_and_resolution() {
        let grid = GridCostmap::uniform(10, 10, 0.5, -2.5, -2.5, 7);
        assert_eq!(grid.cost_at(0.0, 0.0), Some(7));
        assert_eq!(grid.cost_at(-2.5, -2.5), Some(7));
        assert_eq!(grid.cost_at(2.6, 0.0), None);
        assert_eq!(grid.cost_at(0.0, -2.6), None);
    }

    #[test]
    fn paint_rect_marks_only_covered_cells() {
        let mut grid = GridCostmap::open_square(4.0, 0.5);
        grid.paint_rect(0.5, -0.5, 1.5, 0.5, COST_LETHAL);
        assert_eq!(grid.cost_at(1.0, 0.0), Some(COST_LETHAL));
        assert_eq!(grid.cost_at(-1.0, 0.0), Some(COST_FREE));
    }
}
