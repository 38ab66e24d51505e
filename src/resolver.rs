use crate::{error::ExtractError, extract::ColorExtractor, index::Record, vibrant::SwatchKind};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Turns image paths into a single hex color, swallowing every extraction failure.
pub struct ColorResolver<E> {
    extractor: Arc<E>,
    asset_root: PathBuf,
    swatch: SwatchKind,
}

impl<E: ColorExtractor> ColorResolver<E> {
    pub fn new(extractor: Arc<E>, asset_root: impl Into<PathBuf>, swatch: SwatchKind) -> Self {
        Self {
            extractor,
            asset_root: asset_root.into(),
            swatch,
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn swatch(&self) -> SwatchKind {
        self.swatch
    }

    /// Resolves the color of an image given relative to the asset root.
    ///
    /// Returns `None` when the palette has no swatch of the configured kind, or when extraction fails for any reason;
    /// failures are logged with the offending path.
    pub async fn resolve(&self, relative_path: &str) -> Option<String> {
        let path = self.asset_path(relative_path);
        tracing::info!(path = %path.display(), "Determining common color");

        match self.extract(path.clone()).await {
            Ok(palette) => {
                let color = palette.swatch(self.swatch).map(|swatch| swatch.hex());
                if color.is_none() {
                    tracing::debug!(path = %path.display(), swatch = %self.swatch, "Palette has no matching swatch");
                }
                color
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Error determining common color");
                None
            }
        }
    }

    /// Like [`ColorResolver::resolve`], for a record's `path`. Records without a string path resolve to `None`.
    pub async fn resolve_record(&self, record: &Record) -> Option<String> {
        match record.path() {
            Some(path) => self.resolve(path).await,
            None => {
                tracing::warn!(record = ?record.fields(), "Record has no string path");
                None
            }
        }
    }

    /// Index paths are often site-absolute (`/images/a.png`); they still live under the asset root.
    fn asset_path(&self, relative_path: &str) -> PathBuf {
        self.asset_root.join(relative_path.trim_start_matches(['/', '\\']))
    }

    async fn extract(&self, path: PathBuf) -> Result<crate::vibrant::Palette, ExtractError> {
        let extractor = self.extractor.clone();

        tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))?
    }
}
