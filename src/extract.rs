use crate::{
    error::ExtractError,
    vibrant::{Palette, PaletteOptions},
};
use image::io::Reader as ImageReader;
use std::path::Path;

/// Produces a palette of named swatches for the image at a path.
///
/// Implementations are called from the blocking thread pool, one call per index record.
pub trait ColorExtractor: Send + Sync + 'static {
    fn extract(&self, path: &Path) -> Result<Palette, ExtractError>;
}

/// Decodes images with the `image` crate and runs them through the [`crate::vibrant`] quantizer.
#[derive(Debug, Clone, Default)]
pub struct VibrantExtractor {
    options: PaletteOptions,
}

impl VibrantExtractor {
    pub fn new(options: PaletteOptions) -> Self {
        Self { options }
    }
}

impl ColorExtractor for VibrantExtractor {
    fn extract(&self, path: &Path) -> Result<Palette, ExtractError> {
        // the format is guessed from the content, so misnamed files still decode
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let palette = Palette::from_image(&image).options(&self.options).generate();

        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            swatches = palette.swatches().len(),
            "Extracted palette"
        );

        Ok(palette)
    }
}
