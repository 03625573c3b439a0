use std::sync::Arc;

use anyhow::Result;
use gradient::SurfaceUniforms;
use tracing::{debug, trace};
use winit::window::Window;

use crate::driver::{FrameError, RenderSurface};
use crate::types::{BackdropOptions, GpuPowerPreference, SurfaceGeometry};

use super::context::GpuContext;
use super::pipeline::{create_vertex_module, GradientPipeline, PresentPipeline};
use super::target::OffscreenTarget;
use super::uniforms::BackdropUniforms;

/// wgpu-backed [`RenderSurface`] for a winit window.
pub struct GpuSurface {
    context: GpuContext,
    gradient: GradientPipeline,
    present: PresentPipeline,
    target: OffscreenTarget,
    present_bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniforms: BackdropUniforms,
    // Dropped last: the surface above was created from this window's handles.
    _window: Arc<Window>,
}

impl GpuSurface {
    pub fn new(
        window: Arc<Window>,
        geometry: &SurfaceGeometry,
        options: &BackdropOptions,
        power: GpuPowerPreference,
    ) -> Result<Self> {
        let context = GpuContext::new(window.as_ref(), geometry.window, options.color_space, power)?;
        let device = &context.device;

        let vertex_module = create_vertex_module(device);
        let gradient = GradientPipeline::new(device, &vertex_module, OffscreenTarget::FORMAT);
        let present = PresentPipeline::new(device, &vertex_module, context.surface_format);

        let target = OffscreenTarget::new(device, clamp_size(geometry.render, context.max_dimension));
        let present_bind_group = present.bind(device, &target.view);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop uniform buffer"),
            size: std::mem::size_of::<BackdropUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop uniform bind group"),
            layout: &gradient.uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        debug!(
            surface_format = ?context.surface_format,
            render_width = target.size.0,
            render_height = target.size.1,
            "GPU backdrop surface ready"
        );

        Ok(Self {
            uniforms: BackdropUniforms::new(&options.window),
            context,
            gradient,
            present,
            target,
            present_bind_group,
            uniform_buffer,
            uniform_bind_group,
            _window: window,
        })
    }

    fn encode(&self, encoder: &mut wgpu::CommandEncoder, frame_view: &wgpu::TextureView) {
        {
            let mut pass = begin_pass(encoder, "gradient pass", &self.target.view);
            pass.set_pipeline(&self.gradient.pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        let mut pass = begin_pass(encoder, "present pass", frame_view);
        pass.set_pipeline(&self.present.pipeline);
        pass.set_bind_group(0, &self.present_bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

impl RenderSurface for GpuSurface {
    fn resize(&mut self, geometry: SurfaceGeometry) {
        self.context.resize(geometry.window);
        let render = clamp_size(geometry.render, self.context.max_dimension);
        if render != self.target.size {
            self.target = OffscreenTarget::new(&self.context.device, render);
            self.present_bind_group = self.present.bind(&self.context.device, &self.target.view);
        }
        trace!(
            surface = ?self.context.size(),
            render = ?self.target.size,
            "surface reconfigured"
        );
    }

    fn render(&mut self, uniforms: &SurfaceUniforms) -> Result<(), FrameError> {
        let frame = self
            .context
            .surface
            .get_current_texture()
            .map_err(frame_error)?;

        self.uniforms.update(uniforms);
        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("backdrop encoder"),
                });
        self.encode(&mut encoder, &view);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn begin_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    label: &str,
    view: &'a wgpu::TextureView,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            depth_slice: None,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}

fn clamp_size(size: (u32, u32), max_dimension: u32) -> (u32, u32) {
    (
        size.0.clamp(1, max_dimension.max(1)),
        size.1.clamp(1, max_dimension.max(1)),
    )
}

fn frame_error(err: wgpu::SurfaceError) -> FrameError {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => FrameError::Outdated,
        wgpu::SurfaceError::Timeout => FrameError::Timeout,
        wgpu::SurfaceError::OutOfMemory => FrameError::Fatal("surface out of memory".into()),
        other => {
            debug!(error = ?other, "unexpected surface error; skipping frame");
            FrameError::Timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_errors_map_to_frame_errors() {
        assert_eq!(frame_error(wgpu::SurfaceError::Lost), FrameError::Outdated);
        assert_eq!(frame_error(wgpu::SurfaceError::Outdated), FrameError::Outdated);
        assert_eq!(frame_error(wgpu::SurfaceError::Timeout), FrameError::Timeout);
        assert!(matches!(
            frame_error(wgpu::SurfaceError::OutOfMemory),
            FrameError::Fatal(_)
        ));
    }

    #[test]
    fn render_size_respects_device_limits() {
        assert_eq!(clamp_size((9000, 0), 8192), (8192, 1));
        assert_eq!(clamp_size((640, 480), 8192), (640, 480));
    }
}
