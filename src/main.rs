use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common_colors::config::{DEFAULT_ASSET_ROOT, DEFAULT_CONCURRENCY, DEFAULT_INDEX_FILE};
use common_colors::vibrant::{DEFAULT_COLOR_COUNT, DEFAULT_QUALITY};
use common_colors::{Config, PaletteOptions, SwatchKind, VibrantExtractor};

#[derive(Parser)]
#[command(name = "common-colors")]
#[command(about = "Store the prominent color of every image in an image index")]
struct Cli {
    /// Index files to update: JSON arrays of records with a `path` field
    #[arg(value_name = "INDEX", default_value = DEFAULT_INDEX_FILE)]
    index_files: Vec<PathBuf>,

    /// Directory the records' paths are relative to
    #[arg(short, long, default_value = DEFAULT_ASSET_ROOT)]
    asset_root: PathBuf,

    /// Maximum number of images processed at the same time
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Which palette swatch to store as the common color
    #[arg(short, long, value_enum, default_value_t = SwatchKind::Vibrant)]
    swatch: SwatchKind,

    /// Downscale images to 1/QUALITY of their size before sampling
    #[arg(long, default_value_t = DEFAULT_QUALITY)]
    quality: u32,

    /// Downscale images so their longer side is at most this many pixels (overrides --quality)
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Maximum number of colors the quantizer reduces an image to
    #[arg(long, default_value_t = DEFAULT_COLOR_COUNT)]
    colors: usize,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            index_files: self.index_files,
            asset_root: self.asset_root,
            concurrency: self.concurrency,
            swatch: self.swatch,
            palette: PaletteOptions {
                quality: self.quality,
                max_dimension: self.max_dimension,
                color_count: self.colors,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "common_colors=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = cli.into_config();
    let extractor = VibrantExtractor::new(config.palette.clone());
    let reports = common_colors::run(&config, extractor).await?;

    for report in &reports {
        tracing::debug!(
            index = %report.index.display(),
            colored = report.colored,
            missing = report.total - report.colored,
            "Index summary"
        );
    }

    Ok(())
}
