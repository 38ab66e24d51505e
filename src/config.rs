use crate::vibrant::{PaletteOptions, SwatchKind};
use std::path::PathBuf;

pub const DEFAULT_INDEX_FILE: &str = "src/assets/image-library.json";
pub const DEFAULT_ASSET_ROOT: &str = "public";
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Everything a [`crate::run`] needs to know. Nothing outlives the run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Index files to update, processed in order
    pub index_files: Vec<PathBuf>,
    /// Directory the records' `path` values are relative to
    pub asset_root: PathBuf,
    /// Maximum number of images decoded at the same time
    pub concurrency: usize,
    /// Which named swatch becomes the record's color
    pub swatch: SwatchKind,
    pub palette: PaletteOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_files: vec![PathBuf::from(DEFAULT_INDEX_FILE)],
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            concurrency: DEFAULT_CONCURRENCY,
            swatch: SwatchKind::Vibrant,
            palette: PaletteOptions::default(),
        }
    }
}
