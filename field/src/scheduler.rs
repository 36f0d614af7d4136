use std::fmt;

use log::{debug, info, trace};

use crate::{ParticleField, Surface, SurfaceSize};

/// What the scheduler needs from whoever owns the display loop.
pub trait FrameHost {
    /// Identifies one requested callback so it can be cancelled.
    type Handle: Copy + PartialEq + fmt::Debug;

    /// Asks for [`Scheduler::on_frame`] to be called on the next refresh.
    fn request_frame(&mut self) -> Self::Handle;
    fn cancel_frame(&mut self, handle: Self::Handle);
    /// Starts delivering resize events, and pointer events when `pointer`.
    fn attach_listeners(&mut self, pointer: bool);
    fn detach_listeners(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// Terminal.
    Stopped,
}

/// Runs a [`ParticleField`] once per display refresh.
///
/// Every callback re-arms the next one, so the loop keeps itself alive until
/// [`stop`](Scheduler::stop). All entry points take `&mut self`, which means
/// a resize always lands entirely before or after a tick.
pub struct Scheduler<H: FrameHost> {
    host: H,
    field: ParticleField,
    state: SchedulerState,
    pending: Option<H::Handle>,
    frames: u64,
}

impl<H: FrameHost> Scheduler<H> {
    pub fn new(host: H, field: ParticleField) -> Self {
        Self {
            host,
            field,
            state: SchedulerState::Idle,
            pending: None,
            frames: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn pending(&self) -> Option<H::Handle> {
        self.pending
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Attaches listeners and requests the first frame. Only leaves `Idle`.
    pub fn start(&mut self) {
        if self.state != SchedulerState::Idle {
            debug!("Ignoring start in state {:?}", self.state);
            return;
        }
        let pointer = self.field.config().mouse_interaction;
        self.host.attach_listeners(pointer);
        self.pending = Some(self.host.request_frame());
        self.state = SchedulerState::Running;
        info!("Particle field started");
    }

    /// Host callback for `handle`. Ticks the field and re-arms.
    ///
    /// Returns whether the field drew anything. Stale or unexpected handles
    /// are ignored.
    pub fn on_frame(&mut self, handle: H::Handle, surface: &mut impl Surface) -> bool {
        if self.state != SchedulerState::Running || self.pending != Some(handle) {
            trace!("Ignoring frame {:?}", handle);
            return false;
        }
        self.pending = None;
        let drawn = self.field.tick(surface);
        self.frames += 1;
        self.pending = Some(self.host.request_frame());
        drawn
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.state == SchedulerState::Running {
            self.field.pointer_moved(x, y);
        }
    }

    pub fn on_pointer_leave(&mut self) {
        if self.state == SchedulerState::Running {
            self.field.pointer_left();
        }
    }

    pub fn on_resize(&mut self, size: SurfaceSize) {
        if self.state == SchedulerState::Running {
            debug!("Resized to {}x{}", size.width, size.height);
            self.field.resize(size);
        }
    }

    /// Cancels the pending frame and detaches listeners.
    ///
    /// Safe to call any number of times; returns `true` only for the call that
    /// actually tore things down.
    pub fn stop(&mut self) -> bool {
        match self.state {
            SchedulerState::Stopped => false,
            SchedulerState::Idle => {
                self.state = SchedulerState::Stopped;
                false
            }
            SchedulerState::Running => {
                if let Some(handle) = self.pending.take() {
                    self.host.cancel_frame(handle);
                }
                self.host.detach_listeners();
                self.state = SchedulerState::Stopped;
                info!("Particle field stopped after {} frames", self.frames);
                true
            }
        }
    }
}

impl<H: FrameHost> Drop for Scheduler<H> {
    fn drop(&mut self) {
        self.stop();
    }
}
