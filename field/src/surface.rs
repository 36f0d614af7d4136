use crate::Rgba;

/// A position in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True while the surface has not been laid out yet.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// A 2D drawing target owned by the host.
pub trait Surface {
    fn size(&self) -> SurfaceSize;
    fn clear(&mut self);
    /// Filled disk with a soft halo extending `glow` pixels past `radius`.
    fn fill_circle(&mut self, center: Point, radius: f32, glow: f32, color: Rgba);
    /// `color.a` carries the line opacity.
    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Rgba);
}

/// Surface that draws nothing and only counts primitives.
#[derive(Debug, Clone, Default)]
pub struct StatsSurface {
    pub size: Option<SurfaceSize>,
    pub clears: u64,
    pub circles: u64,
    pub lines: u64,
    /// Sum of line opacities, for average brightness.
    pub line_opacity: f64,
}

impl StatsSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            size: self.size,
            ..Self::default()
        };
    }
}

impl Surface for StatsSurface {
    fn size(&self) -> SurfaceSize {
        self.size.unwrap_or(SurfaceSize::ZERO)
    }
    fn clear(&mut self) {
        self.clears += 1;
    }
    fn fill_circle(&mut self, _center: Point, _radius: f32, _glow: f32, _color: Rgba) {
        self.circles += 1;
    }
    fn stroke_line(&mut self, _from: Point, _to: Point, _width: f32, color: Rgba) {
        self.lines += 1;
        self.line_opacity += f64::from(color.a);
    }
}
