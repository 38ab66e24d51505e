// Copyright 2022 Spanfile
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Annotate image index files with the prominent color of every image they list.
//!
//! An index file is a JSON array of records, each with a `path` to an image relative to an asset root. For every
//! record the image's palette is extracted and the hex value of its vibrant swatch is stored in the record's
//! `commonColor` field, or `null` when there is none or the image can't be read. The file is then rewritten in place.
//!
//! ```no_run
//! # async fn example() -> Result<(), common_colors::Error> {
//! let config = common_colors::Config::default();
//! let reports = common_colors::run(&config, common_colors::VibrantExtractor::default()).await?;
//!
//! for report in reports {
//!     println!("{}: {}/{} colored", report.index.display(), report.colored, report.total);
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod resolver;
pub mod vibrant;

pub use crate::{
    batch::BatchReport,
    config::Config,
    error::{Error, ExtractError, IndexError},
    extract::{ColorExtractor, VibrantExtractor},
    index::{ImageIndex, Record},
    resolver::ColorResolver,
    vibrant::{Palette, PaletteOptions, Swatch, SwatchKind},
};
pub use image;

use std::sync::Arc;

/// Updates every index file in the configuration, in order.
///
/// Per-image failures only turn into `null` colors. A missing, unparseable or unwritable index file stops the run;
/// files processed before it keep their updates.
pub async fn run<E: ColorExtractor>(config: &Config, extractor: E) -> Result<Vec<BatchReport>, Error> {
    let resolver = ColorResolver::new(Arc::new(extractor), &config.asset_root, config.swatch);
    let mut reports = Vec::with_capacity(config.index_files.len());

    tracing::debug!(
        indexes = config.index_files.len(),
        asset_root = %config.asset_root.display(),
        concurrency = config.concurrency,
        swatch = %config.swatch,
        "Starting run"
    );

    for index_file in &config.index_files {
        let report = batch::update_index(index_file, &resolver, config.concurrency).await?;
        reports.push(report);
    }

    Ok(reports)
}
