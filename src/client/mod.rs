use crate::*;

mod circle_renderer;
mod line_renderer;

use circle_renderer::CircleRenderer;
use line_renderer::LineRenderer;

fn color(c: Rgba) -> Color<f32> {
    Color::rgba(c.r, c.g, c.b, c.a)
}

/// Frame requests and listener flags for the geng event loop.
///
/// geng calls `draw` on every refresh; a frame only reaches the scheduler if
/// one was requested and not cancelled since.
#[derive(Default, Debug)]
pub struct WindowHost {
    last_frame: u64,
    due: Option<u64>,
    resize_listening: bool,
    pointer_listening: bool,
}

impl FrameHost for WindowHost {
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
        self.resize_listening = true;
        self.pointer_listening = pointer;
    }
    fn detach_listeners(&mut self) {
        self.resize_listening = false;
        self.pointer_listening = false;
    }
}

/// Queues field primitives into the renderers for one frame.
struct FrameSurface<'a> {
    size: SurfaceSize,
    circles: &'a mut CircleRenderer,
    lines: &'a mut LineRenderer,
}

impl<'a> Surface for FrameSurface<'a> {
    fn size(&self) -> SurfaceSize {
        self.size
    }
    fn clear(&mut self) {
        self.circles.discard();
        self.lines.discard();
    }
    fn fill_circle(&mut self, center: Point, radius: f32, glow: f32, c: Rgba) {
        self.circles.queue(circle_renderer::Instance {
            i_pos: vec2(center.x, center.y),
            i_size: radius,
            i_glow: glow,
            i_color: color(c),
        });
    }
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, c: Rgba) {
        self.lines
            .queue(vec2(from.x, from.y), vec2(to.x, to.y), width, color(c));
    }
}

pub struct FieldApp {
    geng: Rc<Geng>,
    scheduler: Scheduler<WindowHost>,
    circle_renderer: CircleRenderer,
    line_renderer: LineRenderer,
    background: Color<f32>,
    framebuffer_size: Option<Vec2<usize>>,
}

impl FieldApp {
    pub fn new(geng: &Rc<Geng>, field: ParticleField, background: Rgba) -> Self {
        let mut scheduler = Scheduler::new(WindowHost::default(), field);
        scheduler.start();
        Self {
            geng: geng.clone(),
            scheduler,
            circle_renderer: CircleRenderer::new(geng),
            line_renderer: LineRenderer::new(geng),
            background: color(background),
            framebuffer_size: None,
        }
    }

    fn watch_resize(&mut self, framebuffer_size: Vec2<usize>) {
        if self.framebuffer_size == Some(framebuffer_size) {
            return;
        }
        let first = self.framebuffer_size.is_none();
        self.framebuffer_size = Some(framebuffer_size);
        if !first && self.scheduler.host().resize_listening {
            self.scheduler.on_resize(SurfaceSize::new(
                framebuffer_size.x as f32,
                framebuffer_size.y as f32,
            ));
        }
    }
}

impl geng::State for FieldApp {
    fn draw(&mut self, framebuffer: &mut ugli::Framebuffer) {
        let framebuffer_size = framebuffer.size();
        self.watch_resize(framebuffer_size);

        ugli::clear(framebuffer, Some(self.background), None);
        if let Some(handle) = self.scheduler.host_mut().due.take() {
            let mut surface = FrameSurface {
                size: SurfaceSize::new(framebuffer_size.x as f32, framebuffer_size.y as f32),
                circles: &mut self.circle_renderer,
                lines: &mut self.line_renderer,
            };
            self.scheduler.on_frame(handle, &mut surface);
        }
        self.circle_renderer.draw(framebuffer);
        self.line_renderer.draw(framebuffer);
    }
    fn handle_event(&mut self, event: geng::Event) {
        match event {
            geng::Event::MouseMove { position, .. } => {
                if !self.scheduler.host().pointer_listening {
                    return;
                }
                let position = position.map(|x| x as f32);
                let inside = self.framebuffer_size.map_or(false, |size| {
                    position.x >= 0.0
                        && position.y >= 0.0
                        && position.x < size.x as f32
                        && position.y < size.y as f32
                });
                if inside {
                    self.scheduler.on_pointer_move(position.x, position.y);
                } else {
                    self.scheduler.on_pointer_leave();
                }
            }
            geng::Event::KeyDown { key } => match key {
                geng::Key::Escape => {
                    if self.scheduler.stop() {
                        info!("Animation stopped, press R to restart");
                    }
                }
                geng::Key::R => {
                    if self.scheduler.state() == SchedulerState::Stopped {
                        let field = ParticleField::new(self.scheduler.field().config().clone());
                        match field {
                            Ok(field) => {
                                self.scheduler = Scheduler::new(WindowHost::default(), field);
                                self.scheduler.start();
                            }
                            Err(e) => error!("Failed to restart particle field: {}", e),
                        }
                    }
                }
                geng::Key::F => {
                    self.geng.window().toggle_fullscreen();
                }
                _ => {}
            },
            _ => {}
        }
    }
}
