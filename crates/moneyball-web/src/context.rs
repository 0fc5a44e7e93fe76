// Application context shared by all handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use moneyball_core::config::Config;
use moneyball_core::db::{RecordStore, SqliteStore};
use moneyball_core::palette::{Palette, PaletteTable};
use moneyball_core::quotes::QuoteBook;
use moneyball_core::splits::SplitsService;

/// Everything a request needs, built once at startup. Immutable after
/// construction, so it is shared behind an `Arc` without locking.
pub struct AppContext {
    pub config: Config,
    pub splits: SplitsService,
    pub quotes: QuoteBook,
    /// Directory that relative paths in `config` resolve against.
    pub base_dir: PathBuf,
}

pub type SharedContext = Arc<AppContext>;

impl AppContext {
    /// Assemble a context from already-loaded parts.
    pub fn new(
        config: Config,
        base_dir: impl Into<PathBuf>,
        store: Arc<dyn RecordStore>,
        palettes: PaletteTable,
        quotes: QuoteBook,
    ) -> Self {
        let splits = SplitsService::new(
            store,
            palettes,
            config.scouting.default_player.clone(),
            config.scouting.default_metric(),
        );
        Self {
            config,
            splits,
            quotes,
            base_dir: base_dir.into(),
        }
    }

    /// Open the record store and load the palette and quote files named in
    /// `config`.
    pub fn from_config(config: Config, base_dir: &Path) -> anyhow::Result<Self> {
        let db_path = resolve(base_dir, &config.database.path);
        let store = SqliteStore::open(&db_path, &config.database.table)
            .context("failed to open record store")?;
        info!("Record store opened at {}", db_path.display());

        let default_palette = Palette::new(config.scouting.default_palette.clone());
        let palettes = PaletteTable::load(
            &resolve(base_dir, &config.data.team_colors),
            default_palette,
        )
        .context("failed to load team colors")?;
        info!("Loaded {} team palettes", palettes.len());

        let quotes = QuoteBook::load(&resolve(base_dir, &config.data.quotes))
            .context("failed to load quotes")?;
        info!("Loaded {} quotes", quotes.len());

        Ok(Self::new(config, base_dir, Arc::new(store), palettes, quotes))
    }

    /// Resolve a config path against `base_dir`.
    pub fn path(&self, configured: &str) -> PathBuf {
        resolve(&self.base_dir, configured)
    }
}

fn resolve(base_dir: &Path, configured: &str) -> PathBuf {
    let p = Path::new(configured);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
