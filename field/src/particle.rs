use rand::Rng;

use crate::{FieldConfig, Point, SurfaceSize};

/// Last known cursor position over the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Absent,
    At(Point),
}

impl Default for Pointer {
    fn default() -> Self {
        Pointer::Absent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub size: f32,
}

impl Particle {
    /// Uniform position over the surface, velocity in `±speed / 2` per axis.
    pub fn random(rng: &mut impl Rng, size: SurfaceSize, config: &FieldConfig) -> Self {
        Self {
            x: rng.gen::<f32>() * size.width,
            y: rng.gen::<f32>() * size.height,
            vx: (rng.gen::<f32>() - 0.5) * config.particle_speed,
            vy: (rng.gen::<f32>() - 0.5) * config.particle_speed,
            size: config.particle_size,
        }
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    /// One tick: move, get pushed by the pointer, wrap, damp.
    pub fn advance(&mut self, pointer: Pointer, size: SurfaceSize, config: &FieldConfig) {
        self.x += self.vx;
        self.y += self.vy;

        if let Pointer::At(target) = pointer {
            if config.mouse_interaction {
                self.repel(target, config);
            }
        }

        if !size.is_empty() {
            self.x = wrap(self.x, size.width);
            self.y = wrap(self.y, size.height);
        }

        self.vx *= config.damping;
        self.vy *= config.damping;
    }

    fn repel(&mut self, target: Point, config: &FieldConfig) {
        let dx = target.x - self.x;
        let dy = target.y - self.y;
        let distance = dx.hypot(dy);
        if distance < config.mouse_radius {
            let force = (config.mouse_radius - distance) / config.mouse_radius;
            let angle = dy.atan2(dx);
            self.vx -= angle.cos() * force * config.repulsion_strength;
            self.vy -= angle.sin() * force * config.repulsion_strength;
        }
    }
}

/// Toroidal wrap into `[0, extent)`, keeping the overshoot.
pub fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to exactly `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
