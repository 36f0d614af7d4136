use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{ConfigError, FieldConfig, Particle, Point, Pointer, Surface, SurfaceSize};

/// A line between two particles, as drawn by [`ParticleField::render`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Opacity of the line joining two particles `distance` apart, or `None` when
/// they are too far apart to be connected.
pub fn line_opacity(distance: f32, config: &FieldConfig) -> Option<f32> {
    if distance < config.line_distance {
        Some(((1.0 - distance / config.line_distance) * config.line_opacity).max(0.0))
    } else {
        None
    }
}

enum FieldState {
    Uninitialized,
    Running {
        size: SurfaceSize,
        particles: Vec<Particle>,
    },
}

pub struct ParticleField {
    config: FieldConfig,
    rng: StdRng,
    pointer: Pointer,
    state: FieldState,
}

impl ParticleField {
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            pointer: Pointer::Absent,
            state: FieldState::Uninitialized,
        })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, FieldState::Running { .. })
    }

    /// Empty until the field is running.
    pub fn particles(&self) -> &[Particle] {
        match &self.state {
            FieldState::Uninitialized => &[],
            FieldState::Running { particles, .. } => particles,
        }
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        match self.state {
            FieldState::Uninitialized => None,
            FieldState::Running { size, .. } => Some(size),
        }
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Replaces every particle with a fresh random set covering `size`.
    ///
    /// An empty size leaves the field uninitialized until a usable one arrives.
    pub fn reset(&mut self, size: SurfaceSize) {
        if size.is_empty() {
            debug!("Surface has no area yet, deferring particle field");
            self.state = FieldState::Uninitialized;
            return;
        }
        let rng = &mut self.rng;
        let config = &self.config;
        let particles = (0..config.particle_count)
            .map(|_| Particle::random(&mut *rng, size, config))
            .collect();
        debug!(
            "Spawned {} particles over {}x{}",
            config.particle_count, size.width, size.height
        );
        self.state = FieldState::Running { size, particles };
    }

    /// Replaces the particle set for the initial surface size or after a resize.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.reset(size);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Pointer::At(Point::new(x, y));
    }

    pub fn pointer_left(&mut self) {
        self.pointer = Pointer::Absent;
    }

    /// Moves every particle one tick. Does nothing while uninitialized.
    pub fn advance(&mut self) {
        if let FieldState::Running { size, particles } = &mut self.state {
            for particle in particles.iter_mut() {
                particle.advance(self.pointer, *size, &self.config);
            }
        }
    }

    /// Every unordered pair of particles close enough to be connected.
    pub fn connections(&self) -> Vec<Connection> {
        let particles = self.particles();
        let mut connections = Vec::new();
        for (a, first) in particles.iter().enumerate() {
            for (b, second) in particles.iter().enumerate().skip(a + 1) {
                let distance = first.pos().distance(second.pos());
                if let Some(opacity) = line_opacity(distance, &self.config) {
                    connections.push(Connection {
                        a,
                        b,
                        distance,
                        opacity,
                    });
                }
            }
        }
        connections
    }

    /// Clears `surface`, then draws particles and the lines between them.
    pub fn render(&self, surface: &mut impl Surface) {
        if !self.is_running() {
            return;
        }
        surface.clear();
        let config = &self.config;
        for particle in self.particles() {
            surface.fill_circle(
                particle.pos(),
                particle.size,
                config.glow_radius,
                config.particle_color,
            );
        }
        let particles = self.particles();
        for connection in self.connections() {
            surface.stroke_line(
                particles[connection.a].pos(),
                particles[connection.b].pos(),
                config.line_width,
                config.line_color.with_alpha(connection.opacity),
            );
        }
    }

    /// Advances and renders one frame.
    ///
    /// An uninitialized field first tries to start from the surface's current
    /// size; returns whether anything was drawn.
    pub fn tick(&mut self, surface: &mut impl Surface) -> bool {
        if !self.is_running() {
            let size = surface.size();
            if size.is_empty() {
                trace!("Skipping tick, surface not laid out");
                return false;
            }
            self.reset(size);
        }
        self.advance();
        self.render(surface);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rgba, StatsSurface};

    fn seeded(count: usize) -> FieldConfig {
        FieldConfig {
            particle_count: count,
            seed: Some(7),
            ..FieldConfig::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        size: Option<SurfaceSize>,
        ops: Vec<String>,
        lines: Vec<(Point, Point, Rgba)>,
    }

    impl Surface for Recorder {
        fn size(&self) -> SurfaceSize {
            self.size.unwrap_or(SurfaceSize::ZERO)
        }
        fn clear(&mut self) {
            self.ops.push("clear".to_owned());
        }
        fn fill_circle(&mut self, _center: Point, radius: f32, glow: f32, _color: Rgba) {
            self.ops.push(format!("circle {} {}", radius, glow));
        }
        fn stroke_line(&mut self, from: Point, to: Point, _width: f32, color: Rgba) {
            self.ops.push("line".to_owned());
            self.lines.push((from, to, color));
        }
    }

    #[test]
    fn opacity_fades_linearly() {
        let config = FieldConfig::default();
        assert_eq!(line_opacity(0.0, &config), Some(0.2));
        let half = line_opacity(75.0, &config).unwrap();
        assert!((half - 0.1).abs() < 1e-6);
        assert_eq!(line_opacity(150.0, &config), None);
        assert_eq!(line_opacity(400.0, &config), None);
    }

    #[test]
    fn uninitialized_field_ignores_ticks() {
        let mut field = ParticleField::new(seeded(10)).unwrap();
        let mut surface = StatsSurface::default();
        assert!(!field.tick(&mut surface));
        assert!(!field.is_running());
        assert_eq!(surface.clears, 0);
        assert!(field.particles().is_empty());
    }

    #[test]
    fn first_tick_with_size_starts_field() {
        let mut field = ParticleField::new(seeded(10)).unwrap();
        let mut surface = StatsSurface::new(SurfaceSize::new(800.0, 600.0));
        assert!(field.tick(&mut surface));
        assert!(field.is_running());
        assert_eq!(field.particles().len(), 10);
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.circles, 10);
    }

    #[test]
    fn resize_replaces_every_particle() {
        let mut field = ParticleField::new(seeded(30)).unwrap();
        field.resize(SurfaceSize::new(800.0, 600.0));
        let before = field.particles().to_vec();

        field.resize(SurfaceSize::new(100.0, 50.0));
        assert_eq!(field.particles().len(), 30);
        assert_ne!(field.particles(), &before[..]);
        for p in field.particles() {
            assert!(p.x >= 0.0 && p.x < 100.0);
            assert!(p.y >= 0.0 && p.y < 50.0);
        }
    }

    #[test]
    fn resize_to_nothing_defers() {
        let mut field = ParticleField::new(seeded(5)).unwrap();
        field.resize(SurfaceSize::new(800.0, 600.0));
        field.resize(SurfaceSize::ZERO);
        assert!(!field.is_running());
        assert_eq!(field.size(), None);
    }

    #[test]
    fn initial_velocity_scaled_by_speed() {
        let field = {
            let mut field = ParticleField::new(seeded(200)).unwrap();
            field.resize(SurfaceSize::new(800.0, 600.0));
            field
        };
        let half = field.config().particle_speed / 2.0;
        for p in field.particles() {
            assert!(p.vx.abs() <= half && p.vy.abs() <= half);
            assert_eq!(p.size, field.config().particle_size);
        }
    }

    #[test]
    fn coincident_particles_get_full_opacity_line() {
        let mut field = ParticleField::new(seeded(2)).unwrap();
        field.resize(SurfaceSize::new(800.0, 600.0));
        if let FieldState::Running { particles, .. } = &mut field.state {
            for p in particles.iter_mut() {
                p.x = 200.0;
                p.y = 200.0;
            }
        }
        let connections = field.connections();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].opacity, 0.2);

        let mut recorder = Recorder::default();
        field.render(&mut recorder);
        assert_eq!(recorder.lines.len(), 1);
        assert_eq!(recorder.lines[0].2.a, 0.2);
    }

    #[test]
    fn render_clears_then_draws_circles_then_lines() {
        let mut field = ParticleField::new(seeded(3)).unwrap();
        field.resize(SurfaceSize::new(800.0, 600.0));
        if let FieldState::Running { particles, .. } = &mut field.state {
            particles[0].x = 10.0;
            particles[0].y = 10.0;
            particles[1].x = 20.0;
            particles[1].y = 10.0;
            particles[2].x = 700.0;
            particles[2].y = 500.0;
        }
        let mut recorder = Recorder::default();
        field.render(&mut recorder);
        assert_eq!(
            recorder.ops,
            vec!["clear", "circle 2 10", "circle 2 10", "circle 2 10", "line"]
        );
    }

    #[test]
    fn lines_drawn_iff_closer_than_line_distance() {
        let mut field = ParticleField::new(seeded(40)).unwrap();
        field.resize(SurfaceSize::new(400.0, 300.0));
        let particles = field.particles();
        let connections = field.connections();
        for a in 0..particles.len() {
            for b in a + 1..particles.len() {
                let d = particles[a].pos().distance(particles[b].pos());
                let found = connections.iter().find(|c| c.a == a && c.b == b);
                assert_eq!(found.is_some(), d < 150.0);
                if let Some(c) = found {
                    let expected = (1.0 - d / 150.0) * 0.2;
                    assert!((c.opacity - expected).abs() < 1e-6);
                    assert!(c.opacity >= 0.0);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut first = ParticleField::new(seeded(12)).unwrap();
        let mut second = ParticleField::new(seeded(12)).unwrap();
        first.resize(SurfaceSize::new(640.0, 480.0));
        second.resize(SurfaceSize::new(640.0, 480.0));
        assert_eq!(first.particles(), second.particles());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = FieldConfig {
            particle_count: 0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            ParticleField::new(config),
            Err(ConfigError::NoParticles)
        ));
    }
}
