//! GPU presentation of the backdrop.
//!
//! - `context` owns the wgpu instance, device, and swapchain and reconfigures
//!   it when the window resizes.
//! - `pipeline` builds the gradient and present pipelines from the GLSL in
//!   `compile`.
//! - `target` is the float texture the field is rendered into at the capped
//!   pixel-ratio size.
//! - `uniforms` is the std140 record written through the queue every frame.
//! - `state` glues everything together as [`GpuSurface`].

mod context;
mod pipeline;
mod state;
mod target;
mod uniforms;

pub use state::GpuSurface;
#[cfg(test)]
pub(crate) use uniforms::BackdropUniforms;
