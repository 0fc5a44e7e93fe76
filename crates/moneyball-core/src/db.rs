// Read-only SQLite access to the per-pitch Statcast table.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, Row};

use crate::config::{is_sql_identifier, DatabaseConfig};
use crate::splits::MetricKind;

/// One pitch as seen from the batter's side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub player_name: String,
    pub team: String,
    pub pitch_type: Option<String>,
    pub inning: i64,
    pub fielding_alignment: Option<String>,
    pub pitcher_hand: Option<String>,
    pub woba_value: Option<f64>,
    pub babip_value: Option<f64>,
    /// Plate-appearance outcome; empty unless the pitch ended the PA.
    pub events: Option<String>,
}

impl EventRecord {
    /// The value of `metric` for this pitch, `None` when null or NaN.
    pub fn metric(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::Woba => self.woba_value,
            MetricKind::Ba => self.babip_value,
        }
        .filter(|v| v.is_finite())
    }

    pub fn is_plate_appearance(&self) -> bool {
        self.events.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Queries the splits aggregator needs. Player names match
/// case-insensitively.
pub trait RecordStore: Send + Sync {
    fn records_for_player(&self, name: &str) -> Result<Vec<EventRecord>>;

    /// Team of the player's first stored record, if any.
    fn team_for_player(&self, name: &str) -> Result<Option<String>>;

    /// Mean of `metric` over the player's non-null records.
    fn metric_average(&self, name: &str, metric: MetricKind) -> Result<Option<f64>>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

/// SQLite-backed record store. Every call opens its own read-only
/// connection, so concurrent requests never share a handle.
pub struct SqliteStore {
    path: PathBuf,
    table: String,
}

impl SqliteStore {
    /// Check that the database exists and contains `table`. The connection
    /// used for the check is closed again.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        if !is_sql_identifier(table) {
            bail!("invalid table name {table:?}");
        }
        let store = Self {
            path: path.as_ref().to_path_buf(),
            table: table.to_string(),
        };

        let conn = store.connect()?;
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                params![store.table],
                |row| row.get(0),
            )
            .context("failed to inspect database schema")?;
        if !exists {
            bail!(
                "table {} not found in {}",
                store.table,
                store.path.display()
            );
        }

        Ok(store)
    }

    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::open(&config.path, &config.table)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database at {}", self.path.display()))?;
        conn.busy_timeout(std::time::Duration::from_secs(5))
            .context("failed to set busy timeout")?;
        register_name_fold(&conn)?;
        Ok(conn)
    }
}

/// Registers `fold_name(x)`, a Unicode lowercase. SQLite's `LOWER` folds
/// ASCII only. Bound names go through the same `name_key`.
fn register_name_fold(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fold_name",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| name_key(&s))),
    )
    .context("failed to register fold_name")
}

/// Case-folded form of a player name used for lookups.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Read a metric cell. Statcast exports store missing values as NULL or as
/// the text `'NaN'`; both, and anything else non-numeric, read as `None`.
fn metric_cell(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    let value: Value = row.get(idx)?;
    let parsed = match value {
        Value::Real(f) => Some(f),
        Value::Integer(i) => Some(i as f64),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Blob(_) => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

impl RecordStore for SqliteStore {
    fn records_for_player(&self, name: &str) -> Result<Vec<EventRecord>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT batter_name, batter_team, pitch_type, inning, if_fielding_alignment,
                    p_throws, woba_value, babip_value, events
             FROM {} WHERE fold_name(batter_name) = ?1",
            self.table
        );
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare records query")?;

        let records = stmt
            .query_map(params![name_key(name)], |row| {
                Ok(EventRecord {
                    player_name: row.get(0)?,
                    team: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    pitch_type: row.get(2)?,
                    inning: row.get(3)?,
                    fielding_alignment: row.get(4)?,
                    pitcher_hand: row.get(5)?,
                    woba_value: metric_cell(row, 6)?,
                    babip_value: metric_cell(row, 7)?,
                    events: row.get(8)?,
                })
            })
            .context("failed to query player records")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map player record rows")?;

        Ok(records)
    }

    fn team_for_player(&self, name: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let sql = format!(
            "SELECT batter_team FROM {} WHERE fold_name(batter_name) = ?1 LIMIT 1",
            self.table
        );
        let mut stmt = conn.prepare(&sql).context("failed to prepare team query")?;
        let mut rows = stmt
            .query_map(params![name_key(name)], |row| row.get::<_, Option<String>>(0))
            .context("failed to query player team")?;

        match rows.next() {
            Some(row) => Ok(row.context("failed to read team row")?),
            None => Ok(None),
        }
    }

    fn metric_average(&self, name: &str, metric: MetricKind) -> Result<Option<f64>> {
        // Averaged in Rust over the same cell parsing as `records_for_player`
        // so 'NaN' text never leaks into SQLite's numeric coercion.
        let conn = self.connect()?;
        let sql = format!(
            "SELECT {col} FROM {table}
             WHERE fold_name(batter_name) = ?1 AND {col} IS NOT NULL",
            col = metric.column(),
            table = self.table
        );
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare metric average query")?;
        let values = stmt
            .query_map(params![name_key(name)], |row| metric_cell(row, 0))
            .context("failed to query metric values")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map metric rows")?;

        let (sum, n) = values
            .into_iter()
            .flatten()
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        Ok((n > 0).then(|| sum / n as f64))
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Record store over a fixed set of records, for tests and fixtures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<EventRecord>,
}

impl MemoryStore {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }

    fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a EventRecord> + 'a {
        let wanted = name_key(name);
        self.records
            .iter()
            .filter(move |r| name_key(&r.player_name) == wanted)
    }
}

impl RecordStore for MemoryStore {
    fn records_for_player(&self, name: &str) -> Result<Vec<EventRecord>> {
        Ok(self.matching(name).cloned().collect())
    }

    fn team_for_player(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .matching(name)
            .next()
            .map(|r| r.team.clone())
            .filter(|t| !t.is_empty()))
    }

    fn metric_average(&self, name: &str, metric: MetricKind) -> Result<Option<f64>> {
        let records: Vec<EventRecord> = self.matching(name).cloned().collect();
        Ok(crate::splits::aggregate::overall_mean(&records, metric))
    }
}
