use bytemuck::{Pod, Zeroable};
use gradient::{Rgb, SampleWindow, SurfaceUniforms};

/// std140 mirror of the `BackdropParams` block in the gradient shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct BackdropUniforms {
    pub color1: [f32; 4],
    pub color2: [f32; 4],
    pub color3: [f32; 4],
    /// Field-space origin in `xy`, extent in `zw`.
    pub sample_window: [f32; 4],
    pub elapsed_time: f32,
    pub _padding: [f32; 3],
}

impl BackdropUniforms {
    pub fn new(window: &SampleWindow) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.set_window(window);
        uniforms
    }

    pub fn set_window(&mut self, window: &SampleWindow) {
        self.sample_window = [
            window.origin[0],
            window.origin[1],
            window.extent[0],
            window.extent[1],
        ];
    }

    /// Copies the frame inputs into the GPU record.
    pub fn update(&mut self, source: &SurfaceUniforms) {
        self.color1 = vec4(source.color1);
        self.color2 = vec4(source.color2);
        self.color3 = vec4(source.color3);
        self.elapsed_time = source.elapsed_time;
    }
}

fn vec4(color: Rgb) -> [f32; 4] {
    [color.r, color.g, color.b, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient::ColorStops;

    #[test]
    fn record_is_std140_sized() {
        assert_eq!(std::mem::size_of::<BackdropUniforms>(), 80);
        assert_eq!(std::mem::size_of::<BackdropUniforms>() % 16, 0);
    }

    #[test]
    fn update_copies_colors_and_time() {
        let stops = ColorStops::parse(&["#ff0000", "#00ff00", "#0000ff"]).unwrap();
        let mut source = SurfaceUniforms::new(&stops);
        source.set_elapsed_time(7.5);

        let mut record = BackdropUniforms::new(&SampleWindow::FULL);
        record.update(&source);
        assert_eq!(record.color1, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(record.color3, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(record.elapsed_time, 7.5);
        assert_eq!(record.sample_window, [0.0, 0.0, 1.0, 1.0]);

        let bytes = bytemuck::bytes_of(&record);
        assert_eq!(&bytes[64..68], &7.5_f32.to_ne_bytes());
    }
}
