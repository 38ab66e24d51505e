use crate::{error::IndexError, extract::ColorExtractor, index::ImageIndex, index::Record, resolver::ColorResolver};
use futures_util::{stream, StreamExt};
use std::path::{Path, PathBuf};

/// Outcome of annotating one index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub index: PathBuf,
    pub total: usize,
    /// Records that ended up with a color rather than `null`.
    pub colored: usize,
}

/// Resolves a color for every record and stores it in the record's `commonColor`.
///
/// At most `concurrency` resolutions are in flight at once. Each record only ever receives its own result, so record
/// count and order are unchanged.
pub async fn annotate<E: ColorExtractor>(
    records: &mut [Record],
    resolver: &ColorResolver<E>,
    concurrency: usize,
) -> usize {
    let colors: Vec<Option<String>> = stream::iter(records.iter().map(|record| resolver.resolve_record(record)))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut colored = 0;
    for (record, color) in records.iter_mut().zip(colors) {
        if color.is_some() {
            colored += 1;
        }

        record.set_common_color(color);
    }

    colored
}

/// Loads an index file, annotates every record, and writes it back.
pub async fn update_index<E: ColorExtractor>(
    path: &Path,
    resolver: &ColorResolver<E>,
    concurrency: usize,
) -> Result<BatchReport, IndexError> {
    let mut index = ImageIndex::load(path)?;
    tracing::debug!(index = %path.display(), records = index.records().len(), "Loaded index");

    let colored = annotate(index.records_mut(), resolver, concurrency).await;
    index.save()?;

    let report = BatchReport {
        index: path.to_path_buf(),
        total: index.records().len(),
        colored,
    };

    tracing::info!(
        index = %path.display(),
        total = report.total,
        colored = report.colored,
        "Updated {} with common colors",
        path.display()
    );

    Ok(report)
}
