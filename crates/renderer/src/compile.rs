use std::borrow::Cow;

use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader shared by both passes.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(
        device,
        "fullscreen triangle vertex",
        VERTEX_SHADER_GLSL,
        ShaderStage::Vertex,
    )
}

/// Compiles the aurora field fragment shader.
pub(crate) fn compile_gradient_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(
        device,
        "aurora gradient fragment",
        GRADIENT_SHADER_GLSL,
        ShaderStage::Fragment,
    )
}

/// Compiles the pass that scales the offscreen target onto the swapchain.
pub(crate) fn compile_present_shader(device: &wgpu::Device) -> wgpu::ShaderModule {
    compile_glsl(
        device,
        "present fragment",
        PRESENT_SHADER_GLSL,
        ShaderStage::Fragment,
    )
}

fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    })
}

/// Minimal full-screen triangle vertex shader.
///
/// `v_uv` runs from (0, 0) at the bottom-left to (1, 1) at the top-right of
/// the render target.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// The gradient field. Must evaluate exactly what `gradient::shade` does.
///
/// The block layout matches `BackdropUniforms` in the gpu module.
const GRADIENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform BackdropParams {
    vec4 color1;
    vec4 color2;
    vec4 color3;
    vec4 sample_window;
    float elapsed_time;
    float _padding0;
    float _padding1;
    float _padding2;
} params;

float aurora_noise(vec2 q, float t) {
    return sin(q.x * 1.2 + t * 0.5) * cos(q.y * 1.5 + t * 0.3);
}

void main() {
    float t = params.elapsed_time;
    vec2 p = params.sample_window.xy + v_uv * params.sample_window.zw;

    float n1 = aurora_noise(p * 2.5 + vec2(t * 0.1), t);
    float n2 = aurora_noise(p * 3.0 - vec2(t * 0.2), t);
    float perturbation = (n1 + n2) * 0.5 * 0.3;

    // Factors are not clamped.
    vec3 color = mix(params.color1.rgb, params.color2.rgb, vec3(p.x + perturbation));
    color = mix(color, params.color3.rgb, vec3(p.y + perturbation));
    outColor = vec4(color, 1.0);
}
";

/// Samples the offscreen target. Row 0 of the target is the top edge.
const PRESENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(set = 0, binding = 0) uniform texture2D backdrop_texture;
layout(set = 0, binding = 1) uniform sampler backdrop_sampler;

void main() {
    vec2 uv = vec2(v_uv.x, 1.0 - v_uv.y);
    vec3 color = texture(sampler2D(backdrop_texture, backdrop_sampler), uv).rgb;
    outColor = vec4(color, 1.0);
}
";
