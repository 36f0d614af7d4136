//! Animated particle background: drifting glowing dots, pushed away by the
//! pointer, wrapping around the edges and joined by lines that fade with
//! distance.
//!
//! [`ParticleField`] holds the simulation, [`Scheduler`] drives it from a
//! host's display-refresh callbacks and [`Surface`] is whatever it draws on.

mod config;
mod error;
mod field;
mod particle;
mod scheduler;
mod surface;

pub use config::{FieldConfig, Preset, Rgba};
pub use error::ConfigError;
pub use field::{line_opacity, Connection, ParticleField};
pub use particle::{wrap, Particle, Pointer};
pub use scheduler::{FrameHost, Scheduler, SchedulerState};
pub use surface::{Point, StatsSurface, Surface, SurfaceSize};
