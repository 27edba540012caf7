//! ASCII SDF raymarcher
//!
//! Renders an animated octahedron to the terminal by sphere tracing one ray
//! per cell against a signed distance field, shading hits with a single
//! directional light and quantizing the result into a glyph ramp plus an
//! optional ANSI color palette.

pub mod renderer;
pub mod scene;
pub mod signals;
pub mod terminal;

pub use renderer::Renderer;
pub use scene::Scene;
pub use terminal::TerminalSurface;

/// Sphere tracing iteration budget per ray
pub const MARCH_ITERS: u32 = 80;

/// Hit threshold scale, also the finite-difference step for normals
pub const EPSILON: f32 = 0.001;

/// Rays that travel past this distance count as misses
pub const MAX_MARCH_DIST: f32 = 80.0;

/// Focal length of the pinhole camera (larger = narrower field of view)
pub const FOCAL_LENGTH: f32 = 2.0;

/// Screen-space zoom applied to normalized cell coordinates
pub const ZOOM: f32 = 2.0;

/// Constant ambient lighting term added to the diffuse contribution
pub const AMBIENT: f32 = 0.2;

/// Number of frames in one full camera orbit (10 degrees per frame)
pub const CYCLE_STEPS: u32 = 36;

/// Glyph ramp from faintest to densest
pub const GLYPH_RAMP: [char; 6] = [' ', '·', '-', '*', '#', 'W'];
