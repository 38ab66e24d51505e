use std::fmt;

/// A single color picked out of an image, along with how many sampled pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    red: u8,
    green: u8,
    blue: u8,
    population: u32,
}

impl Swatch {
    pub fn new((red, green, blue): (u8, u8, u8), population: u32) -> Swatch {
        Self {
            red,
            green,
            blue,
            population,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// Hue in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
    pub fn hsl(self) -> (f32, f32, f32) {
        super::rgb_to_hsl(self.rgb())
    }

    pub fn population(self) -> u32 {
        self.population
    }

    /// The color as a lowercase `#rrggbb` string.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Returns a swatch with the same hue but the given saturation and lightness. The population is reset to zero
    /// since the color no longer occurs in the image.
    pub(crate) fn with_hsl(self, saturation: Option<f32>, lightness: Option<f32>) -> Swatch {
        let (h, s, l) = self.hsl();
        let rgb = super::hsl_to_rgb((h, saturation.unwrap_or(s), lightness.unwrap_or(l)));

        Swatch::new(rgb, 0)
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hex(), self.population)
    }
}
