//! Damped diffusion grid behind the UI.
//!
//! Two buffers of equal size; `step` writes interior cells of the current
//! buffer from the previous one and then swaps which buffer is current.

pub struct FluidGrid {
    width: usize,
    height: usize,
    viscosity: f32,
    buffers: [Vec<f32>; 2],
    // Index into `buffers` of the buffer drawn and disturbed this frame
    current: usize,
}

impl FluidGrid {
    pub fn new(width: usize, height: usize, viscosity: f32, initial_fill: f32) -> Self {
        let len = width * height;
        Self {
            width,
            height,
            viscosity,
            buffers: [vec![initial_fill; len], vec![0.0; len]],
            current: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// True for cells not on the outermost ring.
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        x > 0 && y > 0 && x + 1 < self.width && y + 1 < self.height
    }

    /// Value of the current buffer, or `None` outside the grid.
    pub fn value(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.buffers[self.current][self.index(x, y)])
        } else {
            None
        }
    }

    /// Add `amount` to an interior cell. Border cells are left alone.
    pub fn disturb(&mut self, x: usize, y: usize, amount: f32) -> bool {
        if !self.is_interior(x, y) {
            return false;
        }
        let i = self.index(x, y);
        self.buffers[self.current][i] += amount;
        true
    }

    /// Overwrite an interior cell (full disturbance on press).
    pub fn set(&mut self, x: usize, y: usize, value: f32) -> bool {
        if !self.is_interior(x, y) {
            return false;
        }
        let i = self.index(x, y);
        self.buffers[self.current][i] = value;
        true
    }

    /// Map a position on a `area_w` x `area_h` surface to the grid cell under it.
    pub fn cell_at(&self, col: u16, row: u16, area_w: u16, area_h: u16) -> Option<(usize, usize)> {
        if area_w == 0 || area_h == 0 || col >= area_w || row >= area_h {
            return None;
        }
        let x = col as usize * self.width / area_w as usize;
        let y = row as usize * self.height / area_h as usize;
        Some((x, y))
    }

    pub fn step(&mut self) {
        if self.width < 3 || self.height < 3 {
            return;
        }

        let (first, second) = self.buffers.split_at_mut(1);
        let (cur, prev) = if self.current == 0 {
            (&mut first[0], &second[0])
        } else {
            (&mut second[0], &first[0])
        };

        let w = self.width;
        for y in 1..self.height - 1 {
            for x in 1..w - 1 {
                let i = y * w + x;
                let neighbors = prev[i - 1] + prev[i + 1] + prev[i - w] + prev[i + w];
                cur[i] = (neighbors / 4.0 - cur[i]) * self.viscosity;
            }
        }

        self.current = 1 - self.current;
    }
}
