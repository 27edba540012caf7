//! CPU sphere-tracing renderer
//!
//! This module marches one ray per terminal cell against the scene SDF,
//! shades hits with a fixed directional light and quantizes intensities into
//! glyphs and palette indices.

use crate::scene::Scene;
use crate::terminal::Palette;
use crate::{
    AMBIENT, CYCLE_STEPS, EPSILON, FOCAL_LENGTH, GLYPH_RAMP, MARCH_ITERS, MAX_MARCH_DIST, ZOOM,
};
use nalgebra::{Point3, Vector3};

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Camera described by a position and a look-at target. The view basis is
/// derived per ray from the fixed world up axis (0, 1, 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    /// Camera on the animation orbit: 36 steps of 10 degrees at radius 3,
    /// slightly below the equator, always aimed at the origin.
    pub fn orbit(cycle: u32) -> Self {
        let angle = (cycle as f32 * 10.0).to_radians();
        Self {
            position: Point3::new(angle.sin() * 3.0, -0.5, angle.cos() * 3.0),
            target: Point3::origin(),
        }
    }
}

/// Primary ray direction for normalized screen coordinates (x, y).
///
/// Precondition: position != target, so the forward axis never normalizes a
/// zero vector. The orbit camera guarantees this.
pub fn camera_ray_direction(x: f32, y: f32, camera: &Camera, focal: f32) -> Vector3<f32> {
    let forward = (camera.target - camera.position).normalize();
    let right = Vector3::y().cross(&forward).normalize();
    let up = forward.cross(&right).normalize();
    (right * x + up * y + forward * focal).normalize()
}

/// Sphere-trace `ray` against the scene. `Some(t)` is the hit distance along
/// the ray, `None` means the ray left the scene.
pub fn cast_ray(scene: &Scene, ray: &Ray) -> Option<f32> {
    // Small start offset avoids self-intersection at the ray origin.
    let mut t = 0.1;
    for _ in 0..MARCH_ITERS {
        let h = scene.distance(ray.at(t));
        // The hit threshold scales with t so distant hits don't demand
        // absolute precision. Exhausting the iteration budget while still
        // inside the max distance counts as a hit at the current t.
        if h < EPSILON * t || t > MAX_MARCH_DIST {
            break;
        }
        t += h;
    }
    if t > MAX_MARCH_DIST {
        None
    } else {
        Some(t)
    }
}

/// Surface normal at `p` from one-sided finite differences of the SDF.
///
/// One-sided (not centered) on purpose; the bias is invisible at the glyph
/// quantization this feeds.
pub fn estimate_normal(scene: &Scene, p: Point3<f32>) -> Vector3<f32> {
    let c = scene.distance(p);
    Vector3::new(
        scene.distance(p + Vector3::x() * EPSILON) - c,
        scene.distance(p + Vector3::y() * EPSILON) - c,
        scene.distance(p + Vector3::z() * EPSILON) - c,
    )
    .normalize()
}

/// Lighting intensity at a hit point: Lambertian diffuse from a fixed
/// directional light plus a constant ambient term. Intentionally left
/// unclamped; the quantizers clamp.
pub fn shade(scene: &Scene, p: Point3<f32>) -> f32 {
    let normal = estimate_normal(scene, p);
    let light = Vector3::new(0.5, -2.0, -0.5).normalize();
    let diffuse = normal.dot(&light).max(0.0);
    diffuse + AMBIENT
}

/// Map an intensity to a 1-based palette index. Index 0 stays reserved for
/// the terminal's default color.
pub fn color_index(intensity: f32, palette_len: usize) -> usize {
    1 + (intensity.clamp(0.0, 1.0) * (palette_len - 1) as f32).round() as usize
}

/// Map an intensity to a glyph from the ramp.
pub fn glyph(intensity: f32) -> char {
    let index = (intensity.clamp(0.0, 1.0) * (GLYPH_RAMP.len() - 1) as f32).round() as usize;
    GLYPH_RAMP[index]
}

/// The frame driver: owns the intensity framebuffer and the animation state.
pub struct Renderer {
    width: usize,
    height: usize,
    framebuffer: Vec<f32>,
    cycle: u32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            framebuffer: vec![0.0; width * height],
            cycle: 0,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.framebuffer = vec![0.0; width * height];
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Camera for the current animation step.
    pub fn camera(&self) -> Camera {
        Camera::orbit(self.cycle)
    }

    /// Advance the orbit by one step, wrapping after a full revolution.
    pub fn advance(&mut self) {
        self.cycle = (self.cycle + 1) % CYCLE_STEPS;
    }

    /// Render one frame into the intensity framebuffer.
    pub fn render(&mut self, scene: &Scene) {
        let camera = self.camera();
        // Integer division on purpose: the truncated ratio is part of the
        // proportions of the output.
        let aspect = (self.width / self.height) as f32;
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;

        for y in 0..self.height {
            for x in 0..self.width {
                let sx = (x as f32 - half_w) / half_w * 0.6 * ZOOM * aspect;
                let sy = (y as f32 - half_h) / half_h * ZOOM;
                let ray = Ray::new(
                    camera.position,
                    camera_ray_direction(sx, sy, &camera, FOCAL_LENGTH),
                );
                let intensity = match cast_ray(scene, &ray) {
                    Some(t) => shade(scene, ray.at(t)),
                    None => 0.0,
                };
                self.framebuffer[y * self.width + x] = intensity;
            }
        }
    }

    /// Monochrome frame: glyphs only, one line per terminal row.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.width * self.height + self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(glyph(self.framebuffer[y * self.width + x]));
            }
            out.push('\n');
        }
        out
    }

    /// Colored frame: 256-color foreground escapes around the glyphs, with
    /// redundant color changes elided to keep the frame small.
    pub fn to_ansi(&self, palette: &Palette) -> String {
        let estimated = self.width * self.height * 12 + self.height;
        let mut out = String::with_capacity(estimated);
        let mut last: Option<u8> = None;

        for y in 0..self.height {
            for x in 0..self.width {
                let intensity = self.framebuffer[y * self.width + x];
                let color = palette.color(color_index(intensity, palette.len()));
                if last != Some(color) {
                    out.push_str(&format!("\x1b[38;5;{}m", color));
                    last = Some(color);
                }
                out.push(glyph(intensity));
            }
            out.push('\n');
        }

        // Reset once at the very end.
        out.push_str("\x1b[0m");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::{ColorDepth, Palette};

    fn ramp_position(c: char) -> usize {
        GLYPH_RAMP.iter().position(|&g| g == c).unwrap()
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::origin(), Vector3::new(1.0, 0.0, 0.0));
        assert!((ray.at(5.0).x - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_cast_ray_hit_residual() {
        let scene = Scene::octahedron();
        let origin = Point3::new(0.0, -0.5, 3.0);
        let direction = (Point3::origin() - origin).normalize();
        let ray = Ray::new(origin, direction);

        let t = cast_ray(&scene, &ray).expect("ray aimed at the scene should hit");
        let h = scene.distance(ray.at(t));
        assert!(h.abs() <= EPSILON * t, "residual {} at t {}", h, t);
    }

    #[test]
    fn test_cast_ray_miss() {
        let scene = Scene::octahedron();
        let ray = Ray::new(Point3::new(0.0, -0.5, 3.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(cast_ray(&scene, &ray).is_none());
    }

    #[test]
    fn test_face_normal() {
        let scene = Scene::octahedron();
        // A point on the +x+y+z face of the size-2 octahedron.
        let p = Point3::new(0.7, 0.65, 0.65);
        let n = estimate_normal(&scene, p);
        let expected = Vector3::new(1.0, 1.0, 1.0).normalize();
        assert!(n.dot(&expected) > 0.999, "normal {:?}", n);
    }

    #[test]
    fn test_estimate_normal_is_unit() {
        let scene = Scene::octahedron();
        let n = estimate_normal(&scene, Point3::new(2.5, 0.0, 0.0));
        assert!((n.magnitude() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_color_index_bounds() {
        assert_eq!(color_index(0.0, 8), 1);
        assert_eq!(color_index(1.0, 8), 8);
        assert_eq!(color_index(-0.5, 8), 1);
        assert_eq!(color_index(2.0, 8), 8);
        assert_eq!(color_index(0.0, 4), 1);
        assert_eq!(color_index(1.0, 4), 4);
    }

    #[test]
    fn test_glyph_bounds() {
        assert_eq!(glyph(0.0), GLYPH_RAMP[0]);
        assert_eq!(glyph(1.0), GLYPH_RAMP[GLYPH_RAMP.len() - 1]);
        assert_eq!(glyph(-1.0), GLYPH_RAMP[0]);
        assert_eq!(glyph(1.5), GLYPH_RAMP[GLYPH_RAMP.len() - 1]);
    }

    #[test]
    fn test_quantizers_monotonic() {
        let mut last_color = 0;
        let mut last_glyph = 0;
        for step in 0..=20 {
            let intensity = step as f32 * 0.1 - 0.5;
            let c = color_index(intensity, 8);
            let g = ramp_position(glyph(intensity));
            assert!(c >= last_color, "color index regressed at {}", intensity);
            assert!(g >= last_glyph, "glyph regressed at {}", intensity);
            last_color = c;
            last_glyph = g;
        }
    }

    #[test]
    fn test_camera_orbit_radius() {
        for cycle in 0..CYCLE_STEPS {
            let camera = Camera::orbit(cycle);
            let horizontal =
                (camera.position.x * camera.position.x + camera.position.z * camera.position.z)
                    .sqrt();
            assert!((horizontal - 3.0).abs() < 1e-4);
            assert!((camera.position.y + 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cycle_wraps() {
        let mut renderer = Renderer::new(10, 10);
        let start = renderer.camera();
        for _ in 0..CYCLE_STEPS {
            renderer.advance();
        }
        assert_eq!(renderer.cycle(), 0);
        assert_eq!(renderer.camera(), start);
    }

    #[test]
    fn test_center_hit_corners_miss() {
        // Camera at cycle 0 sits at (0, -0.5, 3) aimed at the origin, so the
        // center cell of a 40x20 frame looks straight at the octahedron.
        let scene = Scene::octahedron();
        let mut renderer = Renderer::new(40, 20);
        renderer.render(&scene);

        let frame = renderer.to_ascii();
        let rows: Vec<Vec<char>> = frame.lines().map(|l| l.chars().collect()).collect();
        assert_eq!(rows.len(), 20);

        assert_ne!(rows[10][20], GLYPH_RAMP[0], "center cell should be a hit");
        assert_eq!(rows[0][0], GLYPH_RAMP[0], "top-left corner should miss");
        assert_eq!(rows[19][39], GLYPH_RAMP[0], "bottom-right corner should miss");
    }

    #[test]
    fn test_to_ascii_dimensions() {
        let renderer = Renderer::new(30, 15);
        let frame = renderer.to_ascii();
        assert_eq!(frame.lines().count(), 15);
        assert!(frame.lines().all(|l| l.chars().count() == 30));
    }

    #[test]
    fn test_resize() {
        let mut renderer = Renderer::new(40, 20);
        renderer.resize(25, 12);
        assert_eq!(renderer.width(), 25);
        assert_eq!(renderer.height(), 12);
        assert_eq!(renderer.to_ascii().lines().count(), 12);
    }

    #[test]
    fn test_to_ansi_escapes() {
        let scene = Scene::octahedron();
        let palette = Palette::for_depth(ColorDepth::Ansi256).unwrap();
        let mut renderer = Renderer::new(20, 10);
        renderer.render(&scene);

        let frame = renderer.to_ansi(&palette);
        assert!(frame.starts_with("\x1b[38;5;"));
        assert!(frame.ends_with("\x1b[0m"));
    }
}
