use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced while building colors or color stops.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("expected exactly 3 color stops, got {0}")]
    WrongStopCount(usize),
    #[error("malformed color '{0}'; expected #rgb, #rrggbb, or rgb(r, g, b)")]
    Malformed(String),
}

/// RGB triple with channels nominally in `[0, 1]`.
///
/// Values outside the unit range are allowed: the gradient field extrapolates
/// past its endpoint colors and the result is only clamped when quantized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Component-wise `a + (b - a) * f`. `f` is not clamped.
    pub fn lerp(self, other: Rgb, f: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * f,
            self.g + (other.g - self.g) * f,
            self.b + (other.b - self.b) * f,
        )
    }

    /// Quantizes to 8 bits per channel, clamping like a unorm render target.
    pub fn to_rgb8(self) -> [u8; 3] {
        fn quantize(value: f32) -> u8 {
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Decodes gamma-encoded sRGB channels into linear light.
    pub fn srgb_to_linear(self) -> Rgb {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Rgb::new(decode(self.r), decode(self.g), decode(self.b))
    }

    /// Encodes linear channels with the sRGB transfer curve.
    pub fn linear_to_srgb(self) -> Rgb {
        fn encode(c: f32) -> f32 {
            if c <= 0.003_130_8 {
                c * 12.92
            } else {
                1.055 * c.powf(1.0 / 2.4) - 0.055
            }
        }
        Rgb::new(encode(self.r), encode(self.g), encode(self.b))
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let malformed = || ColorError::Malformed(trimmed.to_string());

        if let Some(inner) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let channels = inner
                .split(',')
                .map(|part| part.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| malformed())?;
            return match channels.as_slice() {
                [r, g, b] => Ok(Rgb::from_rgb8(*r, *g, *b)),
                _ => Err(malformed()),
            };
        }

        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        match hex.len() {
            3 => {
                let nibble = |index: usize| {
                    u8::from_str_radix(&hex[index..index + 1], 16).map(|value| value * 17)
                };
                let r = nibble(0).map_err(|_| malformed())?;
                let g = nibble(1).map_err(|_| malformed())?;
                let b = nibble(2).map_err(|_| malformed())?;
                Ok(Rgb::from_rgb8(r, g, b))
            }
            6 => {
                let byte = |index: usize| u8::from_str_radix(&hex[index..index + 2], 16);
                let r = byte(0).map_err(|_| malformed())?;
                let g = byte(2).map_err(|_| malformed())?;
                let b = byte(4).map_err(|_| malformed())?;
                Ok(Rgb::from_rgb8(r, g, b))
            }
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// The three colors of the backdrop, in base → mid → accent order.
///
/// Equality compares the parsed colors, so `"#FFF"` and `"#ffffff"` are the
/// same stops even though the strings differ.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ColorStops {
    stops: [Rgb; 3],
}

impl ColorStops {
    /// Stops used when the caller does not configure any.
    pub const COMPONENT_DEFAULT: ColorStops = ColorStops {
        stops: [
            Rgb::new(141.0 / 255.0, 10.0 / 255.0, 10.0 / 255.0),
            Rgb::new(22.0 / 255.0, 35.0 / 255.0, 150.0 / 255.0),
            Rgb::new(54.0 / 255.0, 20.0 / 255.0, 138.0 / 255.0),
        ],
    };

    pub const fn new(stops: [Rgb; 3]) -> Self {
        Self { stops }
    }

    /// Parses exactly three color strings.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, ColorError> {
        if values.len() != 3 {
            return Err(ColorError::WrongStopCount(values.len()));
        }
        let base = values[0].as_ref().parse()?;
        let mid = values[1].as_ref().parse()?;
        let accent = values[2].as_ref().parse()?;
        Ok(Self::new([base, mid, accent]))
    }

    pub fn base(&self) -> Rgb {
        self.stops[0]
    }

    pub fn mid(&self) -> Rgb {
        self.stops[1]
    }

    pub fn accent(&self) -> Rgb {
        self.stops[2]
    }

    pub fn as_array(&self) -> &[Rgb; 3] {
        &self.stops
    }

    /// Decodes every stop from sRGB into linear light.
    pub fn to_linear(&self) -> ColorStops {
        ColorStops::new(self.stops.map(Rgb::srgb_to_linear))
    }
}

impl Default for ColorStops {
    fn default() -> Self {
        Self::COMPONENT_DEFAULT
    }
}

impl TryFrom<Vec<String>> for ColorStops {
    type Error = ColorError;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        ColorStops::parse(&values)
    }
}

impl From<ColorStops> for Vec<String> {
    fn from(stops: ColorStops) -> Self {
        stops.stops.iter().map(|stop| stop.to_hex()).collect()
    }
}

impl fmt::Display for ColorStops {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.stops[0], self.stops[1], self.stops[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!("#951515".parse::<Rgb>().unwrap().to_rgb8(), [0x95, 0x15, 0x15]);
        assert_eq!("131D7C".parse::<Rgb>().unwrap().to_rgb8(), [0x13, 0x1d, 0x7c]);
        assert_eq!("#fff".parse::<Rgb>().unwrap(), Rgb::new(1.0, 1.0, 1.0));
        assert_eq!("#0a0".parse::<Rgb>().unwrap().to_rgb8(), [0, 0xaa, 0]);
    }

    #[test]
    fn parses_functional_rgb() {
        let color: Rgb = "rgb(36, 69, 136)".parse().unwrap();
        assert_eq!(color.to_rgb8(), [36, 69, 136]);
        assert!("rgb(36, 69)".parse::<Rgb>().is_err());
        assert!("rgb(300, 0, 0)".parse::<Rgb>().is_err());
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["", "#12", "#12345", "#gggggg", "red", "#1234567"] {
            assert!(
                matches!(value.parse::<Rgb>(), Err(ColorError::Malformed(_))),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn lerp_extrapolates_outside_unit_range() {
        let a = Rgb::new(0.2, 0.2, 0.2);
        let b = Rgb::new(0.6, 0.6, 0.6);
        let beyond = a.lerp(b, 1.5);
        assert!((beyond.r - 0.8).abs() < 1e-6);
        let before = a.lerp(b, -0.5);
        assert!((before.g - 0.0).abs() < 1e-6);
    }

    #[test]
    fn quantize_clamps_out_of_range_channels() {
        assert_eq!(Rgb::new(-0.3, 0.5, 1.7).to_rgb8(), [0, 128, 255]);
    }

    #[test]
    fn srgb_round_trip_is_stable() {
        let color: Rgb = "#36148a".parse().unwrap();
        let back = color.srgb_to_linear().linear_to_srgb();
        assert_eq!(back.to_rgb8(), color.to_rgb8());
        assert!(color.srgb_to_linear().r < color.r);
    }

    #[test]
    fn stops_require_exactly_three_values() {
        assert_eq!(
            ColorStops::parse(&["#000", "#fff"]),
            Err(ColorError::WrongStopCount(2))
        );
        assert_eq!(
            ColorStops::parse(&["#000", "#fff", "#111", "#222"]),
            Err(ColorError::WrongStopCount(4))
        );
        let stops = ColorStops::parse(&["#951515", "#131d7c", "#1b0553"]).unwrap();
        assert_eq!(stops.accent().to_hex(), "#1b0553");
    }

    #[test]
    fn stops_compare_by_value_not_spelling() {
        let a = ColorStops::parse(&["#FFF", "#000000", "rgb(16, 32, 48)"]).unwrap();
        let b = ColorStops::parse(&[
            "#ffffff".to_string(),
            "000".to_string(),
            "#102030".to_string(),
        ])
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn default_matches_component_colors() {
        let parsed = ColorStops::parse(&["#8d0a0a", "#162396", "#36148a"]).unwrap();
        assert_eq!(ColorStops::default(), parsed);
    }

    #[test]
    fn stops_deserialize_from_toml_list() {
        #[derive(Deserialize)]
        struct Wrapper {
            colors: ColorStops,
        }
        let wrapper: Wrapper =
            toml::from_str(r##"colors = ["#951515", "#131d7c", "#1b0553"]"##).unwrap();
        assert_eq!(wrapper.colors.base().to_hex(), "#951515");

        let err = toml::from_str::<Wrapper>(r##"colors = ["#951515"]"##)
            .err()
            .expect("single stop must fail");
        assert!(err.to_string().contains("exactly 3"));
    }
}
