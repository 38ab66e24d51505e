const WHITE_MIN_CHANNEL: u8 = 250;

/// A trait used to implement filters for the image quantization process.
///
/// During quantization, filters remove colors from the histogram before boxes are split, and remove final swatches
/// whose average color ends up filtered.
///
/// See [`crate::PaletteBuilder::add_filter`] on how to add filters to the quantization process.
pub trait Filter {
    /// Return whether a given color should be allowed or not. The same color is given in both sRGB
    /// and HSL for convenience.
    fn is_allowed(&self, rgb: (u8, u8, u8), hsl: (f32, f32, f32)) -> bool;
}

/// The default filter included in every [`crate::PaletteBuilder`].
///
/// Disallows colors where every channel is close to full intensity, i.e. white and near-white backgrounds.
#[derive(Debug)]
pub struct DefaultFilter;
impl Filter for DefaultFilter {
    fn is_allowed(&self, (r, g, b): (u8, u8, u8), _: (f32, f32, f32)) -> bool {
        !(r > WHITE_MIN_CHANNEL && g > WHITE_MIN_CHANNEL && b > WHITE_MIN_CHANNEL)
    }
}
