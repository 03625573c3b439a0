//! The procedural aurora gradient.
//!
//! Every function here is pure: the output depends only on the sample
//! coordinate, the elapsed time, and the three colors. The GLSL fragment
//! shader in the renderer crate evaluates the same expressions in the same
//! order so CPU and GPU frames agree.

use crate::color::Rgb;
use crate::uniforms::SurfaceUniforms;

/// How far the noise perturbation shifts the interpolation factors.
pub const BLEND_STRENGTH: f32 = 0.3;

/// Smooth, periodic pseudo-noise bounded to `[-1, 1]`.
pub fn noise(q: [f32; 2], t: f32) -> f32 {
    (q[0] * 1.2 + t * 0.5).sin() * (q[1] * 1.5 + t * 0.3).cos()
}

/// Averages two noise samples taken at different spatial and temporal phases.
pub fn blend(p: [f32; 2], t: f32) -> f32 {
    let drift = t * 0.1;
    let n1 = noise([p[0] * 2.5 + drift, p[1] * 2.5 + drift], t);
    let counter = t * 0.2;
    let n2 = noise([p[0] * 3.0 - counter, p[1] * 3.0 - counter], t);
    (n1 + n2) * 0.5
}

/// The two interpolation factors for a sample. Not clamped.
pub fn mix_factors(p: [f32; 2], t: f32) -> (f32, f32) {
    let perturbation = blend(p, t) * BLEND_STRENGTH;
    (p[0] + perturbation, p[1] + perturbation)
}

/// Color of the field at `p` for the current uniforms.
pub fn shade(p: [f32; 2], uniforms: &SurfaceUniforms) -> Rgb {
    let (fx, fy) = mix_factors(p, uniforms.elapsed_time);
    let across = uniforms.color1.lerp(uniforms.color2, fx);
    across.lerp(uniforms.color3, fy)
}

/// Rectangle of field space that a surface samples.
///
/// A surface coordinate `s` in `[0, 1]²` maps to `origin + s * extent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    pub origin: [f32; 2],
    pub extent: [f32; 2],
}

impl SampleWindow {
    /// Samples the whole unit square.
    pub const FULL: SampleWindow = SampleWindow {
        origin: [0.0, 0.0],
        extent: [1.0, 1.0],
    };

    pub fn new(origin: [f32; 2], extent: [f32; 2]) -> Self {
        Self { origin, extent }
    }

    /// Window of the given extent centred on `center`.
    pub fn centered(center: [f32; 2], extent: [f32; 2]) -> Self {
        Self {
            origin: [
                center[0] - extent[0] * 0.5,
                center[1] - extent[1] * 0.5,
            ],
            extent,
        }
    }

    pub fn map(&self, s: [f32; 2]) -> [f32; 2] {
        [
            self.origin[0] + s[0] * self.extent[0],
            self.origin[1] + s[1] * self.extent[1],
        ]
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// Evaluates the field at every pixel center of a `width` x `height` grid.
///
/// Rows are visited top to bottom; row 0 is the top edge, where the surface
/// coordinate `s.y` approaches 1. The callback receives `(column, row, color)`.
pub fn rasterize<F>(
    width: u32,
    height: u32,
    window: &SampleWindow,
    uniforms: &SurfaceUniforms,
    mut put: F,
) where
    F: FnMut(u32, u32, Rgb),
{
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    for row in 0..height {
        let sy = 1.0 - (row as f32 + 0.5) / h;
        for column in 0..width {
            let sx = (column as f32 + 0.5) / w;
            let p = window.map([sx, sy]);
            put(column, row, shade(p, uniforms));
        }
    }
}
