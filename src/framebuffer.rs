// CPU frame buffer with a software line rasterizer

use glam::Vec2;

/// An RGBA8 color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color(pub [u8; 4]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0, 255]);
    pub const WHITE: Color = Color([255, 255, 255, 255]);

    #[cfg(test)]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color([r, g, b, 255])
    }
}

/// Row-major pixel buffer the wireframe is rasterized into before it is
/// handed to the GPU for presentation.
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
    draw_color: Color,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
            draw_color: Color::WHITE,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for a new size. Contents are reset to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Color::BLACK);
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Raw RGBA bytes, rows top to bottom.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels[..])
    }

    /// Write one pixel in the draw color; anything off the buffer is dropped.
    #[inline]
    fn plot(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = self.draw_color;
    }

    /// Bresenham line between two pixel positions, both endpoints inclusive.
    ///
    /// Steps through every pixel between the endpoints, including those off
    /// the buffer; use `draw_segment` for unbounded input.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let (x0, y0, x1, y1) = (x0 as i64, y0 as i64, x1 as i64, y1 as i64);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.plot(x, y);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Draw a line between two screen-space points.
    ///
    /// The segment is clipped to the buffer before rasterizing, so the work
    /// is bounded by the buffer size however far the endpoints lie. Returns
    /// false without drawing when either endpoint is not finite (a vertex on
    /// the viewer plane) or nothing of the segment is visible.
    pub fn draw_segment(&mut self, from: Vec2, to: Vec2) -> bool {
        if !from.is_finite() || !to.is_finite() || self.width == 0 || self.height == 0 {
            return false;
        }
        let max = Vec2::new((self.width - 1) as f32, (self.height - 1) as f32);
        let Some((from, to)) = clip_segment(from, to, max) else {
            return false;
        };

        let (last_x, last_y) = (self.width as i32 - 1, self.height as i32 - 1);
        let snap = |p: Vec2| {
            (
                (p.x.round() as i32).clamp(0, last_x),
                (p.y.round() as i32).clamp(0, last_y),
            )
        };
        let (x0, y0) = snap(from);
        let (x1, y1) = snap(to);
        self.draw_line(x0, y0, x1, y1);
        true
    }
}

/// Liang-Barsky clip of a segment against the rectangle `[0, max]`.
fn clip_segment(from: Vec2, to: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    let d = to - from;
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    for (p, q) in [
        (-d.x, from.x),
        (d.x, max.x - from.x),
        (-d.y, from.y),
        (d.y, max.y - from.y),
    ] {
        if p == 0.0 {
            // Parallel to this boundary: entirely outside or no constraint.
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            if t > t1 {
                return None;
            }
            t0 = t0.max(t);
        } else {
            if t < t0 {
                return None;
            }
            t1 = t1.min(t);
        }
    }

    Some((from + d * t0, from + d * t1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(fb: &Framebuffer) -> usize {
        (0..fb.height())
            .flat_map(|y| (0..fb.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.pixel(x, y) == Some(Color::WHITE))
            .count()
    }

    #[test]
    fn test_new_buffer_is_black() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(lit(&fb), 0);
        assert_eq!(fb.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_clear_fills_every_pixel() {
        let mut fb = Framebuffer::new(5, 5);
        fb.clear(Color::WHITE);
        assert_eq!(lit(&fb), 25);
        fb.clear(Color::rgb(10, 20, 30));
        assert_eq!(fb.pixel(4, 4), Some(Color::rgb(10, 20, 30)));
        assert_eq!(&fb.as_bytes()[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_horizontal_line() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(2, 5, 7, 5);
        assert_eq!(lit(&fb), 6);
        assert_eq!(fb.pixel(2, 5), Some(Color::WHITE));
        assert_eq!(fb.pixel(7, 5), Some(Color::WHITE));
        assert_eq!(fb.pixel(8, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_diagonal_line_either_direction() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(8, 8, 1, 1);
        assert_eq!(lit(&fb), 8);
        for i in 1..=8 {
            assert_eq!(fb.pixel(i, i), Some(Color::WHITE));
        }
    }

    #[test]
    fn test_steep_line_has_one_pixel_per_row() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(3, 0, 5, 9);
        assert_eq!(lit(&fb), 10);
        for y in 0..10 {
            let row = (0..10).filter(|&x| fb.pixel(x, y) == Some(Color::WHITE)).count();
            assert_eq!(row, 1);
        }
    }

    #[test]
    fn test_single_point() {
        let mut fb = Framebuffer::new(3, 3);
        fb.draw_line(1, 1, 1, 1);
        assert_eq!(lit(&fb), 1);
    }

    #[test]
    fn test_offscreen_pixels_are_clipped() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_line(-3, 1, 6, 1);
        assert_eq!(lit(&fb), 4);
    }

    #[test]
    fn test_draw_color() {
        let mut fb = Framebuffer::new(4, 4);
        let red = Color::rgb(255, 0, 0);
        fb.set_draw_color(red);
        fb.draw_line(0, 0, 3, 0);
        assert_eq!(fb.pixel(3, 0), Some(red));
    }

    #[test]
    fn test_non_finite_segment_is_skipped() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(!fb.draw_segment(Vec2::new(f32::INFINITY, 0.0), Vec2::new(1.0, 1.0)));
        assert!(!fb.draw_segment(Vec2::ZERO, Vec2::new(1.0, f32::NAN)));
        assert_eq!(lit(&fb), 0);
        assert!(fb.draw_segment(Vec2::new(0.4, 0.4), Vec2::new(2.4, 0.4)));
        assert_eq!(lit(&fb), 3);
    }

    #[test]
    fn test_resize_resets_contents() {
        let mut fb = Framebuffer::new(2, 2);
        fb.clear(Color::WHITE);
        fb.resize(3, 5);
        assert_eq!((fb.width(), fb.height()), (3, 5));
        assert_eq!(fb.as_bytes().len(), 3 * 5 * 4);
        assert_eq!(lit(&fb), 0);
        assert_eq!(fb.pixel(3, 0), None);
    }

    #[test]
    fn test_far_endpoint_is_clipped() {
        let mut fb = Framebuffer::new(800, 600);
        assert!(fb.draw_segment(Vec2::new(400.0, 300.0), Vec2::new(3.0e9, 300.0)));
        assert_eq!(lit(&fb), 400);
        assert_eq!(fb.pixel(799, 300), Some(Color::WHITE));
        assert_eq!(fb.pixel(399, 300), Some(Color::BLACK));

        fb.clear(Color::BLACK);
        assert!(fb.draw_segment(Vec2::new(-2.0e9, -1.5e9), Vec2::new(2.0e9, 1.5e9)));
        assert!(lit(&fb) <= 800);
        assert_eq!(fb.pixel(0, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_near_viewer_plane_edge_stays_bounded() {
        let projection = crate::math::Projection::default();
        let far = projection.project(glam::Vec3::new(1.0, 0.0, -3.99999), 800, 600);
        assert!(far.is_finite());
        assert!(far.x > 1.0e6);

        let mut fb = Framebuffer::new(800, 600);
        let start = std::time::Instant::now();
        assert!(fb.draw_segment(Vec2::new(400.0, 300.0), far));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        assert!(lit(&fb) <= 400);
        assert_eq!(fb.pixel(799, 300), Some(Color::WHITE));
    }

    #[test]
    fn test_segment_outside_buffer_is_rejected() {
        let mut fb = Framebuffer::new(10, 10);
        assert!(!fb.draw_segment(Vec2::new(-5.0, -5.0), Vec2::new(20.0, -1.0)));
        assert!(!fb.draw_segment(Vec2::new(12.0, 0.0), Vec2::new(12.0, 9.0)));
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_extreme_integer_endpoints_do_not_overflow() {
        let mut fb = Framebuffer::new(4, 4);
        fb.draw_line(i32::MIN, 1, i32::MIN + 3, 1);
        assert_eq!(lit(&fb), 0);
    }
}
