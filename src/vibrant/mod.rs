//! Prominent color extraction.
//!
//! Samples an image, reduces it to a handful of representative swatches with a median cut quantizer, and then picks
//! the swatch best matching each [`SwatchKind`] by saturation, lightness and population.

mod filter;
mod quantizer;
mod swatch;
mod target;

pub use filter::{DefaultFilter, Filter};
pub use swatch::Swatch;
pub use target::{SwatchKind, Target};

use image::{imageops::FilterType, DynamicImage, RgbaImage};
use palette::{FromColor, Hsl, Srgb};
use quantizer::Quantizer;
use std::collections::BTreeMap;
use target::{TARGET_DARK_LUMA, TARGET_LIGHT_LUMA, TARGET_MUTED_SATURATION, TARGET_NORMAL_LUMA};

pub const DEFAULT_COLOR_COUNT: usize = 64;
pub const DEFAULT_QUALITY: u32 = 5;

/// Settings for how an image is sampled before quantization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteOptions {
    /// Downscale factor: the image is shrunk to `1 / quality` of its size on both axes. Ignored when
    /// `max_dimension` is set.
    pub quality: u32,
    /// Shrink the image so its longer side is at most this many pixels.
    pub max_dimension: Option<u32>,
    /// Upper bound on the number of swatches the quantizer produces.
    pub color_count: usize,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            max_dimension: None,
            color_count: DEFAULT_COLOR_COUNT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    swatches: Vec<Swatch>,
    named: BTreeMap<SwatchKind, Swatch>,
}

pub struct PaletteBuilder {
    image: RgbaImage,
    options: PaletteOptions,
    filters: Vec<Box<dyn Filter>>,
}

impl Palette {
    pub fn from_image(image: &DynamicImage) -> PaletteBuilder {
        PaletteBuilder::from_image(image)
    }

    /// Selects the named swatches out of an already quantized set of colors.
    pub fn from_swatches(swatches: Vec<Swatch>) -> Palette {
        let max_population = swatches.iter().map(|swatch| swatch.population()).max().unwrap_or(0);
        let mut named = BTreeMap::new();

        for kind in SwatchKind::ALL {
            if let Some(swatch) = best_swatch_for_target(&swatches, kind.target(), max_population, &named) {
                named.insert(kind, swatch);
            }
        }

        fill_missing_swatches(&mut named);

        Self { swatches, named }
    }

    /// Builds a palette from swatches that are already assigned to their kinds.
    pub fn from_named<I>(named: I) -> Palette
    where
        I: IntoIterator<Item = (SwatchKind, Swatch)>,
    {
        let named: BTreeMap<_, _> = named.into_iter().collect();

        Self {
            swatches: named.values().copied().collect(),
            named,
        }
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.swatches
    }

    pub fn swatch(&self, kind: SwatchKind) -> Option<Swatch> {
        self.named.get(&kind).copied()
    }

    pub fn vibrant_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::Vibrant)
    }

    pub fn light_vibrant_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::LightVibrant)
    }

    pub fn dark_vibrant_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::DarkVibrant)
    }

    pub fn muted_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::Muted)
    }

    pub fn light_muted_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::LightMuted)
    }

    pub fn dark_muted_swatch(&self) -> Option<Swatch> {
        self.swatch(SwatchKind::DarkMuted)
    }

    pub fn most_prominent_swatch(&self) -> Option<Swatch> {
        self.swatches.iter().copied().max_by_key(|swatch| swatch.population())
    }
}

impl PaletteBuilder {
    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            image: image.to_rgba8(),
            options: PaletteOptions::default(),
            filters: vec![Box::new(DefaultFilter)],
        }
    }

    pub fn options(self, options: &PaletteOptions) -> Self {
        Self {
            options: options.clone(),
            ..self
        }
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.options.quality = quality;
        self
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.options.max_dimension = Some(max_dimension);
        self
    }

    pub fn color_count(mut self, color_count: usize) -> Self {
        self.options.color_count = color_count;
        self
    }

    pub fn add_filter<F>(mut self, filter: F) -> Self
    where
        F: Filter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn clear_filters(self) -> Self {
        Self {
            filters: Vec::new(),
            ..self
        }
    }

    pub fn generate(mut self) -> Palette {
        self.scale_image_down();

        let swatches = Quantizer::new(self.options.color_count, &self.filters).quantize(&self.image);
        Palette::from_swatches(swatches)
    }

    fn scale_image_down(&mut self) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 {
            return;
        }

        let ratio = match self.options.max_dimension {
            Some(max_dimension) if max_dimension > 0 => {
                let longer_side = width.max(height);

                if longer_side > max_dimension {
                    max_dimension as f32 / longer_side as f32
                } else {
                    1.0
                }
            }
            _ => 1.0 / self.options.quality.max(1) as f32,
        };

        if ratio < 1.0 {
            self.image = image::imageops::resize(
                &self.image,
                ((width as f32 * ratio).ceil() as u32).max(1),
                ((height as f32 * ratio).ceil() as u32).max(1),
                FilterType::Nearest,
            );
        }
    }
}

fn best_swatch_for_target(
    swatches: &[Swatch],
    target: Target,
    max_population: u32,
    selected: &BTreeMap<SwatchKind, Swatch>,
) -> Option<Swatch> {
    let mut max_score = 0.0;
    let mut max_score_swatch = None;

    for swatch in swatches.iter().copied() {
        let (_, saturation, lightness) = swatch.hsl();

        if !target.accepts(saturation, lightness) || selected.values().any(|used| used.rgb() == swatch.rgb()) {
            continue;
        }

        let score = target.score(saturation, lightness, swatch.population(), max_population);
        if max_score_swatch.is_none() || score > max_score {
            max_score_swatch = Some(swatch);
            max_score = score;
        }
    }

    max_score_swatch
}

/// Derives the kinds nothing was found for from the ones that were, by moving an existing swatch's lightness or
/// saturation onto the missing kind's target.
fn fill_missing_swatches(named: &mut BTreeMap<SwatchKind, Swatch>) {
    use SwatchKind::*;

    if ![Vibrant, DarkVibrant, LightVibrant].iter().any(|kind| named.contains_key(kind)) {
        fill(named, DarkVibrant, DarkMuted, None, Some(TARGET_DARK_LUMA));
        fill(named, LightVibrant, LightMuted, None, Some(TARGET_LIGHT_LUMA));
    }

    fill(named, Vibrant, DarkVibrant, None, Some(TARGET_NORMAL_LUMA));
    fill(named, Vibrant, LightVibrant, None, Some(TARGET_NORMAL_LUMA));
    fill(named, DarkVibrant, Vibrant, None, Some(TARGET_DARK_LUMA));
    fill(named, LightVibrant, Vibrant, None, Some(TARGET_LIGHT_LUMA));
    fill(named, Muted, Vibrant, Some(TARGET_MUTED_SATURATION), None);
    fill(named, LightMuted, LightVibrant, Some(TARGET_MUTED_SATURATION), None);
    fill(named, DarkMuted, DarkVibrant, Some(TARGET_MUTED_SATURATION), None);
}

fn fill(
    named: &mut BTreeMap<SwatchKind, Swatch>,
    kind: SwatchKind,
    from: SwatchKind,
    saturation: Option<f32>,
    lightness: Option<f32>,
) {
    if named.contains_key(&kind) {
        return;
    }

    if let Some(swatch) = named.get(&from).map(|swatch| swatch.with_hsl(saturation, lightness)) {
        named.insert(kind, swatch);
    }
}

pub(crate) fn rgb_to_hsl(rgb: (u8, u8, u8)) -> (f32, f32, f32) {
    let rgb: Srgb<f32> = Srgb::<u8>::from_components(rgb).into_format();
    let hsl: Hsl = Hsl::from_color(rgb);
    let (h, s, l) = hsl.into_components();

    // float error can push fully saturated colors just past 1.0
    (h.into_positive_degrees(), s.clamp(0.0, 1.0), l.clamp(0.0, 1.0))
}

pub(crate) fn hsl_to_rgb((h, s, l): (f32, f32, f32)) -> (u8, u8, u8) {
    let rgb: Srgb<f32> = Srgb::from_color(Hsl::new_srgb(h, s.clamp(0.0, 1.0), l.clamp(0.0, 1.0)));
    let rgb: Srgb<u8> = rgb.into_format();

    rgb.into_components()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn solid(rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb(rgb)))
    }

    #[test]
    fn solid_red_is_vibrant() {
        let palette = Palette::from_image(&solid([255, 0, 0])).generate();

        assert_eq!(palette.vibrant_swatch().map(Swatch::hex).as_deref(), Some("#ff0000"));
    }

    #[test]
    fn dark_red_fills_in_vibrant() {
        let palette = Palette::from_image(&solid([100, 0, 0])).generate();

        assert_eq!(palette.dark_vibrant_swatch().map(Swatch::rgb), Some((100, 0, 0)));
        assert_eq!(palette.vibrant_swatch().map(Swatch::hex).as_deref(), Some("#ff0000"));
        assert_eq!(palette.vibrant_swatch().map(Swatch::population), Some(0));
    }

    #[test]
    fn grey_has_no_vibrant_swatch() {
        let palette = Palette::from_image(&solid([128, 128, 128])).generate();

        assert_eq!(palette.muted_swatch().map(Swatch::rgb), Some((128, 128, 128)));
        assert_eq!(palette.vibrant_swatch(), None);
        assert_eq!(palette.dark_vibrant_swatch(), None);
        assert_eq!(palette.light_vibrant_swatch(), None);
    }

    #[test]
    fn white_and_transparent_images_are_empty() {
        let white = Palette::from_image(&solid([255, 255, 255])).generate();
        assert!(white.swatches().is_empty());
        assert_eq!(white.vibrant_swatch(), None);

        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(6, 6, Rgba([255, 0, 0, 0])));
        assert_eq!(Palette::from_image(&clear).generate(), Palette::default());
    }

    #[test]
    fn clearing_filters_keeps_white() {
        let palette = Palette::from_image(&solid([255, 255, 255])).clear_filters().generate();

        assert_eq!(palette.swatches(), &[Swatch::new((255, 255, 255), 4)]);
        assert_eq!(palette.light_muted_swatch().map(Swatch::rgb), Some((255, 255, 255)));
    }

    struct NoBlue;

    impl Filter for NoBlue {
        fn is_allowed(&self, (r, _, b): (u8, u8, u8), _: (f32, f32, f32)) -> bool {
            b <= r
        }
    }

    fn red_and_blue() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        }))
    }

    #[test]
    fn added_filters_drop_colors() {
        let palette = Palette::from_image(&red_and_blue()).quality(1).add_filter(NoBlue).generate();

        assert_eq!(palette.swatches(), &[Swatch::new((255, 0, 0), 50)]);
        assert_eq!(palette.vibrant_swatch().map(Swatch::rgb), Some((255, 0, 0)));
    }

    #[test]
    fn color_count_limits_swatches() {
        let two = Palette::from_image(&red_and_blue()).quality(1).generate();
        assert_eq!(two.swatches().len(), 2);

        let one = Palette::from_image(&red_and_blue()).quality(1).color_count(1).generate();
        assert_eq!(one.swatches().len(), 1);
        assert_eq!(one.most_prominent_swatch().map(Swatch::population), Some(100));
    }

    #[test]
    fn downscaling_by_quality_and_max_dimension() {
        let image = solid([0, 0, 200]);

        let by_quality = Palette::from_image(&image).quality(5).generate();
        assert_eq!(by_quality.most_prominent_swatch().map(Swatch::population), Some(4));

        let full = Palette::from_image(&image).quality(1).generate();
        assert_eq!(full.most_prominent_swatch().map(Swatch::population), Some(100));

        let capped = Palette::from_image(&image).max_dimension(5).generate();
        assert_eq!(capped.most_prominent_swatch().map(Swatch::population), Some(25));
    }

    #[test]
    fn each_swatch_is_used_once() {
        // lightness 0.6 fits both the vibrant and the light vibrant ranges
        let only = Swatch::new((255, 51, 51), 10);
        let palette = Palette::from_swatches(vec![only]);

        assert_eq!(palette.vibrant_swatch(), Some(only));

        let light = palette.light_vibrant_swatch().expect("light vibrant is derived");
        assert_ne!(light, only);
        assert_eq!(light.population(), 0);
    }

    #[test]
    fn population_breaks_ties_between_equal_colors() {
        let swatches = vec![Swatch::new((200, 40, 40), 1), Swatch::new((40, 200, 40), 50)];
        let palette = Palette::from_swatches(swatches);

        // same saturation and lightness, so only the population differs
        assert_eq!(palette.vibrant_swatch().map(Swatch::rgb), Some((40, 200, 40)));
    }

    #[test]
    fn from_named_reports_given_swatches() {
        let vibrant = Swatch::new((0xaa, 0xbb, 0xcc), 3);
        let palette = Palette::from_named([(SwatchKind::Vibrant, vibrant)]);

        assert_eq!(palette.vibrant_swatch(), Some(vibrant));
        assert_eq!(palette.muted_swatch(), None);
        assert_eq!(palette.swatches(), &[vibrant]);
    }

    #[test]
    fn hsl_round_trip_of_pure_colors() {
        for rgb in [(255, 0, 0), (0, 255, 0), (0, 0, 255), (0, 0, 0)] {
            assert_eq!(hsl_to_rgb(rgb_to_hsl(rgb)), rgb);
        }
    }
}
