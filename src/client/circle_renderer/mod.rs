use crate::*;

#[derive(ugli::Vertex)]
struct QuadVertex {
    a_pos: Vec2<f32>,
}

#[derive(ugli::Vertex, Debug)]
pub struct Instance {
    pub i_pos: Vec2<f32>,
    pub i_size: f32,
    pub i_glow: f32,
    pub i_color: Color<f32>,
}

/// Glowing disks, one instanced draw call per frame. Positions are in
/// framebuffer pixels.
pub struct CircleRenderer {
    quad_geometry: ugli::VertexBuffer<QuadVertex>,
    instances: ugli::VertexBuffer<Instance>,
    program: ugli::Program,
}

impl CircleRenderer {
    pub fn new(geng: &Rc<Geng>) -> Self {
        Self {
            quad_geometry: ugli::VertexBuffer::new_static(
                geng.ugli(),
                vec![
                    QuadVertex {
                        a_pos: vec2(-1.0, -1.0),
                    },
                    QuadVertex {
                        a_pos: vec2(1.0, -1.0),
                    },
                    QuadVertex {
                        a_pos: vec2(1.0, 1.0),
                    },
                    QuadVertex {
                        a_pos: vec2(-1.0, 1.0),
                    },
                ],
            ),
            instances: ugli::VertexBuffer::new_dynamic(geng.ugli(), Vec::new()),
            program: geng
                .shader_lib()
                .compile(include_str!("program.glsl"))
                .unwrap(),
        }
    }
    pub fn queue(&mut self, instance: Instance) {
        self.instances.push(instance);
    }
    pub fn discard(&mut self) {
        self.instances.clear();
    }
    pub fn draw(&mut self, framebuffer: &mut ugli::Framebuffer) {
        if self.instances.is_empty() {
            return;
        }
        let framebuffer_size = framebuffer.size().map(|x| x as f32);
        ugli::draw(
            framebuffer,
            &self.program,
            ugli::DrawMode::TriangleFan,
            ugli::instanced(&self.quad_geometry, &self.instances),
            ugli::uniforms! {
                u_framebuffer_size: framebuffer_size,
            },
            ugli::DrawParameters {
                blend_mode: Some(default()),
                ..default()
            },
        );
        self.instances.clear();
    }
}
