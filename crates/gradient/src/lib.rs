//! Colors and the procedural gradient behind the aurora backdrop.
//!
//! This crate has no GPU or windowing dependencies. It defines:
//! - [`ColorStops`], the three configured colors (base, mid, accent);
//! - [`SurfaceUniforms`], the per-frame record handed to the shading step;
//! - the field itself ([`field::shade`]), a two-stage color interpolation
//!   perturbed by a time-varying sine/cosine noise.
//!
//! The renderer crate compiles the same math into a fragment shader and uses
//! [`field::rasterize`] for CPU frames.

pub mod color;
pub mod field;
pub mod uniforms;

pub use color::{ColorError, ColorStops, Rgb};
pub use field::{blend, noise, rasterize, shade, SampleWindow};
pub use uniforms::SurfaceUniforms;
