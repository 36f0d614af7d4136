use crate::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default, Debug)]
pub struct HeadlessHost {
    last_frame: u64,
    due: Option<u64>,
    pointer_listening: bool,
}

impl FrameHost for HeadlessHost {
    type Handle = u64;
    fn request_frame(&mut self) -> u64 {
        self.last_frame += 1;
        self.due = Some(self.last_frame);
        self.last_frame
    }
    fn cancel_frame(&mut self, handle: u64) {
        if self.due == Some(handle) {
            self.due = None;
        }
    }
    fn attach_listeners(&mut self, pointer: bool) {
        self.pointer_listening = pointer;
    }
    fn detach_listeners(&mut self) {
        self.pointer_listening = false;
    }
}

fn sweep_position(frame: u64, size: SurfaceSize) -> Point {
    let angle = frame as f32 * 0.02;
    let radius = size.width.min(size.height) * 0.35;
    Point::new(
        size.width / 2.0 + radius * angle.cos(),
        size.height / 2.0 + radius * angle.sin(),
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub state: SchedulerState,
    /// Whether the final `stop` was the one that tore the loop down.
    pub torn_down: bool,
}

/// Drives the field from a paced loop until `opts.frames` or Ctrl-C.
pub fn run_headless(opts: &HeadlessOpts, field: ParticleField) -> HeadlessReport {
    let interrupted = Arc::new(AtomicBool::new(false));
    if let Err(e) = ctrlc::set_handler({
        let interrupted = interrupted.clone();
        move || interrupted.store(true, Ordering::SeqCst)
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let size = SurfaceSize::new(opts.width, opts.height);
    let fps = opts.fps.max(1.0);
    let frame_time = Duration::from_secs_f64(1.0 / fps);
    let report_every = fps.round() as u64;

    let mut scheduler = Scheduler::new(HeadlessHost::default(), field);
    let mut surface = StatsSurface::new(size);
    scheduler.start();
    info!(
        "Headless run: {}x{} @ {:.0}fps, {}",
        size.width,
        size.height,
        fps,
        if opts.frames == 0 {
            "until interrupted".to_owned()
        } else {
            format!("{} frames", opts.frames)
        }
    );

    while opts.frames == 0 || scheduler.frames() < opts.frames {
        if interrupted.load(Ordering::SeqCst) {
            info!("Interrupted");
            break;
        }
        let handle = match scheduler.host_mut().due.take() {
            Some(handle) => handle,
            None => break,
        };
        if opts.pointer_sweep && scheduler.host().pointer_listening {
            let pos = sweep_position(scheduler.frames(), size);
            scheduler.on_pointer_move(pos.x, pos.y);
        }
        scheduler.on_frame(handle, &mut surface);

        if scheduler.frames() % report_every == 0 {
            let particles = scheduler.field().particles();
            let mean_speed = particles.iter().map(|p| p.speed()).sum::<f32>()
                / particles.len().max(1) as f32;
            info!(
                "frame={} lines/frame={:.1} mean line opacity={:.3} mean speed={:.3}",
                scheduler.frames(),
                surface.lines as f64 / report_every as f64,
                surface.line_opacity / surface.lines.max(1) as f64,
                mean_speed,
            );
            surface.reset();
        }
        std::thread::sleep(frame_time);
    }

    if opts.pointer_sweep {
        scheduler.on_pointer_leave();
    }
    let torn_down = scheduler.stop();
    HeadlessReport {
        frames: scheduler.frames(),
        state: scheduler.state(),
        torn_down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_stays_on_surface() {
        let size = SurfaceSize::new(640.0, 480.0);
        for frame in 0..1000 {
            let pos = sweep_position(frame, size);
            assert!(pos.x > 0.0 && pos.x < size.width);
            assert!(pos.y > 0.0 && pos.y < size.height);
        }
    }

    #[test]
    fn short_run_finishes_and_stops() {
        let field = ParticleField::new(FieldConfig {
            seed: Some(2),
            ..FieldConfig::default()
        })
        .unwrap();
        let opts = HeadlessOpts {
            frames: 3,
            fps: 1000.0,
            width: 320.0,
            height: 240.0,
            pointer_sweep: true,
        };
        let report = run_headless(&opts, field);
        assert_eq!(report.frames, 3);
        assert_eq!(report.state, SchedulerState::Stopped);
        assert!(report.torn_down);
    }
}
