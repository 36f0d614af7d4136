use crate::*;

#[derive(ugli::Vertex, Debug)]
pub struct LineVertex {
    pub a_pos: Vec2<f32>,
    pub a_color: Color<f32>,
}

pub struct LineRenderer {
    vertices: ugli::VertexBuffer<LineVertex>,
    line_width: f32,
    program: ugli::Program,
}

impl LineRenderer {
    pub fn new(geng: &Rc<Geng>) -> Self {
        Self {
            vertices: ugli::VertexBuffer::new_dynamic(geng.ugli(), Vec::new()),
            line_width: 1.0,
            program: geng
                .shader_lib()
                .compile(include_str!("program.glsl"))
                .unwrap(),
        }
    }
    pub fn queue(&mut self, from: Vec2<f32>, to: Vec2<f32>, width: f32, color: Color<f32>) {
        self.line_width = width;
        self.vertices.push(LineVertex {
            a_pos: from,
            a_color: color,
        });
        self.vertices.push(LineVertex {
            a_pos: to,
            a_color: color,
        });
    }
    pub fn discard(&mut self) {
        self.vertices.clear();
    }
    pub fn draw(&mut self, framebuffer: &mut ugli::Framebuffer) {
        if self.vertices.is_empty() {
            return;
        }
        let framebuffer_size = framebuffer.size().map(|x| x as f32);
        ugli::draw(
            framebuffer,
            &self.program,
            ugli::DrawMode::Lines {
                line_width: self.line_width,
            },
            &self.vertices,
            ugli::uniforms! {
                u_framebuffer_size: framebuffer_size,
            },
            ugli::DrawParameters {
                blend_mode: Some(default()),
                ..default()
            },
        );
        self.vertices.clear();
    }
}
