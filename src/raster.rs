use std::f64::consts::TAU;

pub const BLANK: char = ' ';
pub const ORBIT_GLYPH: char = '·';
/// Terminal cells are roughly twice as tall as they are wide.
pub const DEFAULT_ASPECT_RATIO: f64 = 2.0;

const MIN_OUTLINE_STEPS: usize = 720;

/// Character grid produced by one render pass. Each cell is blank or holds a
/// single glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<char> {
        self.idx(x, y).map(|i| self.cells[i])
    }

    /// Overwrites a cell. Out-of-grid writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, ch: char) {
        if let Some(i) = self.idx(x, y) {
            self.cells[i] = ch;
        }
    }

    /// Writes only into a blank cell.
    pub fn set_if_blank(&mut self, x: i32, y: i32, ch: char) {
        if let Some(i) = self.idx(x, y) {
            if self.cells[i] == BLANK {
                self.cells[i] = ch;
            }
        }
    }

    pub fn row(&self, y: usize) -> &[char] {
        let start = (y * self.width).min(self.cells.len());
        let end = (start + self.width).min(self.cells.len());
        &self.cells[start..end]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[char]> + '_ {
        (0..self.height).map(move |y| self.row(y))
    }

    pub fn count(&self, ch: char) -> usize {
        self.cells.iter().filter(|c| **c == ch).count()
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| *c == BLANK)
    }

    /// Coordinates of every non-blank cell, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != BLANK)
            .map(move |(i, c)| (i % self.width, i / self.width, *c))
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (y, row) in self.rows().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().collect();
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

/// Draws aspect-corrected circles: horizontal extents are multiplied by
/// `aspect_ratio` so shapes look round on non-square cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CircleRasterizer {
    aspect_ratio: f64,
}

impl Default for CircleRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_ASPECT_RATIO)
    }
}

impl CircleRasterizer {
    pub fn new(aspect_ratio: f64) -> Self {
        let aspect_ratio = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
            aspect_ratio
        } else {
            DEFAULT_ASPECT_RATIO
        };
        Self { aspect_ratio }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Cell at `angle` on a circle of `radius` rows around the center.
    pub fn position(&self, cx: i32, cy: i32, radius: f64, angle: f64) -> (i32, i32) {
        let x = cx + (radius * angle.cos() * self.aspect_ratio) as i32;
        let y = cy + (radius * angle.sin()) as i32;
        (x, y)
    }

    /// Orbit path: fills blank cells only, so bodies and earlier paths survive.
    pub fn outline(&self, grid: &mut Grid, cx: i32, cy: i32, radius: f64, glyph: char) {
        if !(radius.is_finite() && radius > 0.0) {
            return;
        }
        let steps = ((TAU * radius * 4.0) as usize).max(MIN_OUTLINE_STEPS);
        for i in 0..steps {
            let angle = i as f64 * TAU / steps as f64;
            let (x, y) = self.position(cx, cy, radius, angle);
            grid.set_if_blank(x, y, glyph);
        }
    }

    /// Solid disc scanned row by row; overwrites whatever is underneath.
    pub fn disc(&self, grid: &mut Grid, cx: i32, cy: i32, radius: i32, glyph: char) {
        for dy in -radius..=radius {
            let half = (((radius * radius - dy * dy) as f64).sqrt() * self.aspect_ratio) as i32;
            for dx in -half..=half {
                grid.set(cx + dx, cy + dy, glyph);
            }
        }
    }

    /// Single cell for radius ≤ 1, otherwise a disc.
    pub fn body(&self, grid: &mut Grid, x: i32, y: i32, radius: i32, glyph: char) {
        if radius <= 1 {
            grid.set(x, y, glyph);
        } else {
            self.disc(grid, x, y, radius, glyph);
        }
    }
}
