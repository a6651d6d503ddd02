use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A rising bubble in logical canvas units.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub speed: f32,
}

/// Fixed pool of bubbles that rise and respawn below the canvas.
pub struct BubbleField {
    bubbles: Vec<Bubble>,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl BubbleField {
    pub fn new(count: usize, width: f32, height: f32) -> Self {
        Self::with_rng(count, width, height, StdRng::from_entropy())
    }

    pub fn with_seed(count: usize, width: f32, height: f32, seed: u64) -> Self {
        Self::with_rng(count, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, width: f32, height: f32, mut rng: StdRng) -> Self {
        let bubbles = (0..count)
            .map(|_| Bubble {
                x: spawn_x(&mut rng, width),
                y: spawn_y(&mut rng, height),
                radius: rng.gen_range(5..=15) as f32,
                speed: rng.gen_range(1.0..2.0),
            })
            .collect();

        Self { bubbles, width, height, rng }
    }

    #[cfg(test)]
    pub fn from_bubbles(bubbles: Vec<Bubble>, width: f32, height: f32) -> Self {
        Self { bubbles, width, height, rng: StdRng::seed_from_u64(0) }
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn update(&mut self) {
        for bubble in &mut self.bubbles {
            bubble.y -= bubble.speed;
            if bubble.y < -bubble.radius {
                bubble.y = spawn_y(&mut self.rng, self.height);
                bubble.x = spawn_x(&mut self.rng, self.width);
            }
        }
    }
}

fn spawn_x(rng: &mut StdRng, width: f32) -> f32 {
    let max = (width as i32 - 50).max(50);
    rng.gen_range(50..=max) as f32
}

fn spawn_y(rng: &mut StdRng, height: f32) -> f32 {
    height + rng.gen_range(10..=100) as f32
}
