use crate::color::{ColorStops, Rgb};

/// Per-frame inputs of the gradient field.
///
/// Created once per mount and then mutated in place: the elapsed time every
/// frame, the colors only when the caller supplies different stops.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceUniforms {
    pub elapsed_time: f32,
    pub color1: Rgb,
    pub color2: Rgb,
    pub color3: Rgb,
}

impl SurfaceUniforms {
    pub fn new(stops: &ColorStops) -> Self {
        Self {
            elapsed_time: 0.0,
            color1: stops.base(),
            color2: stops.mid(),
            color3: stops.accent(),
        }
    }

    pub fn set_elapsed_time(&mut self, seconds: f32) {
        self.elapsed_time = seconds;
    }

    pub fn set_colors(&mut self, stops: &ColorStops) {
        self.color1 = stops.base();
        self.color2 = stops.mid();
        self.color3 = stops.accent();
    }

    pub fn colors(&self) -> [Rgb; 3] {
        [self.color1, self.color2, self.color3]
    }
}
