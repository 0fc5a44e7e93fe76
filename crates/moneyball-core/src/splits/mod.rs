// Scouting splits: one player's records bucketed along four dimensions.

pub mod aggregate;
pub mod bucket;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{EventRecord, RecordStore};
use crate::palette::{Palette, PaletteTable};
use aggregate::{aggregate_by, AggregateRow};
use bucket::{platoon_key, shift_key, InningGroup, PitchCategory};

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// The per-pitch value being averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MetricKind {
    #[serde(rename = "wOBA")]
    Woba,
    #[serde(rename = "BA")]
    Ba,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::Woba, MetricKind::Ba];

    /// Parse a metric label as sent by the scouting form (`"wOBA"`, `"BA"`).
    /// Matching ignores case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s))
    }

    /// Total mapping from an optional request parameter: anything missing or
    /// unrecognized becomes `default`.
    pub fn from_param(param: Option<&str>, default: MetricKind) -> Self {
        match param {
            Some(s) => Self::parse(s).unwrap_or_else(|| {
                debug!("unknown metric {s:?}, falling back to {}", default.label());
                default
            }),
            None => default,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::Woba => "wOBA",
            MetricKind::Ba => "BA",
        }
    }

    /// Column in the pitch table holding this metric.
    pub fn column(&self) -> &'static str {
        match self {
            MetricKind::Woba => "woba_value",
            MetricKind::Ba => "babip_value",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Dimensions and result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Shift,
    Pitch,
    Inning,
    Platoon,
}

impl Dimension {
    /// Axis title used by the chart grid.
    pub fn title(&self) -> &'static str {
        match self {
            Dimension::Shift => "Shift",
            Dimension::Pitch => "Pitch Type",
            Dimension::Inning => "Inning",
            Dimension::Platoon => "Platoon",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DimensionSplits {
    pub dimension: Dimension,
    pub rows: Vec<AggregateRow>,
}

impl DimensionSplits {
    pub fn row(&self, key: &str) -> Option<&AggregateRow> {
        self.rows.iter().find(|r| r.key == key)
    }
}

/// Everything the scouting page needs for one player and metric.
#[derive(Debug, Clone, Serialize)]
pub struct SplitsResult {
    /// Player name as stored in the database.
    pub player: String,
    /// True when the requested player was empty or unknown and the default
    /// player was used instead.
    pub fell_back: bool,
    pub metric: MetricKind,
    pub team: Option<String>,
    /// Player's mean of `metric` over all non-null records.
    pub overall_mean: Option<f64>,
    pub shift: DimensionSplits,
    pub pitch: DimensionSplits,
    pub inning: DimensionSplits,
    pub platoon: DimensionSplits,
    pub palette: Palette,
}

impl SplitsResult {
    /// The four dimensions in chart-grid order (row-major).
    pub fn dimensions(&self) -> [&DimensionSplits; 4] {
        [&self.shift, &self.pitch, &self.platoon, &self.inning]
    }

    /// Buckets that had records but no non-null metric value.
    pub fn empty_buckets(&self) -> Vec<(Dimension, &str)> {
        self.dimensions()
            .into_iter()
            .flat_map(|d| {
                d.rows
                    .iter()
                    .filter(|r| r.is_empty_bucket())
                    .map(move |r| (d.dimension, r.key.as_str()))
            })
            .collect()
    }
}

/// Aggregate one player's records along all four dimensions.
pub fn aggregate_dimensions(
    records: &[EventRecord],
    metric: MetricKind,
) -> [DimensionSplits; 4] {
    [
        DimensionSplits {
            dimension: Dimension::Shift,
            rows: aggregate_by(records, metric, shift_key),
        },
        DimensionSplits {
            dimension: Dimension::Pitch,
            rows: aggregate_by(records, metric, |r| {
                PitchCategory::from_code(r.pitch_type.as_deref())
            }),
        },
        DimensionSplits {
            dimension: Dimension::Inning,
            rows: aggregate_by(records, metric, |r| InningGroup::from_inning(r.inning)),
        },
        DimensionSplits {
            dimension: Dimension::Platoon,
            rows: aggregate_by(records, metric, platoon_key),
        },
    ]
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SplitsError {
    #[error("no records found for player {player:?}")]
    PlayerNotFound { player: String },

    #[error("record store unavailable: {0:#}")]
    StoreUnavailable(#[source] anyhow::Error),
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Computes scouting splits against a record store. Holds no mutable state,
/// so one instance is shared by all requests.
pub struct SplitsService {
    store: Arc<dyn RecordStore>,
    palettes: PaletteTable,
    default_player: String,
    default_metric: MetricKind,
}

impl SplitsService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        palettes: PaletteTable,
        default_player: impl Into<String>,
        default_metric: MetricKind,
    ) -> Self {
        Self {
            store,
            palettes,
            default_player: default_player.into(),
            default_metric,
        }
    }

    /// Entry point for request parameters: missing or unknown metrics fall
    /// back to the default metric, a missing player to the default player.
    pub fn compute_from_params(
        &self,
        player: Option<&str>,
        metric: Option<&str>,
    ) -> Result<SplitsResult, SplitsError> {
        let metric = MetricKind::from_param(metric, self.default_metric);
        self.compute_splits(player.unwrap_or(""), metric)
    }

    /// Compute all four splits for `player_name` (case-insensitive).
    ///
    /// An empty or unknown name falls back to the default player. Fails with
    /// `PlayerNotFound` only when the default player has no records either.
    pub fn compute_splits(
        &self,
        player_name: &str,
        metric: MetricKind,
    ) -> Result<SplitsResult, SplitsError> {
        let (lookup_name, records, fell_back) = self.load_records(player_name.trim())?;

        let team = self
            .store
            .team_for_player(&lookup_name)
            .map_err(SplitsError::StoreUnavailable)?;
        let overall_mean = self
            .store
            .metric_average(&lookup_name, metric)
            .map_err(SplitsError::StoreUnavailable)?;
        let palette = self.palettes.resolve(team.as_deref());

        let [shift, pitch, inning, platoon] = aggregate_dimensions(&records, metric);

        let player = records
            .first()
            .map(|r| r.player_name.clone())
            .unwrap_or(lookup_name);

        let result = SplitsResult {
            player,
            fell_back,
            metric,
            team,
            overall_mean,
            shift,
            pitch,
            inning,
            platoon,
            palette,
        };

        for (dimension, key) in result.empty_buckets() {
            warn!(
                "no non-null {} values for {} bucket {key:?} of {}",
                metric,
                dimension.title(),
                result.player
            );
        }
        info!(
            "computed {} splits for {} over {} records",
            metric,
            result.player,
            records.len()
        );

        Ok(result)
    }

    /// Fetch records for `name`, falling back to the default player when the
    /// name is empty or matches nothing. Returns the name actually used.
    fn load_records(&self, name: &str) -> Result<(String, Vec<EventRecord>, bool), SplitsError> {
        if !name.is_empty() {
            let records = self
                .store
                .records_for_player(name)
                .map_err(SplitsError::StoreUnavailable)?;
            if !records.is_empty() {
                return Ok((name.to_string(), records, false));
            }
            info!("no records for {name:?}, falling back to {:?}", self.default_player);
        }

        let records = self
            .store
            .records_for_player(&self.default_player)
            .map_err(SplitsError::StoreUnavailable)?;
        if records.is_empty() {
            return Err(SplitsError::PlayerNotFound {
                player: if name.is_empty() {
                    self.default_player.clone()
                } else {
                    name.to_string()
                },
            });
        }
        Ok((self.default_player.clone(), records, true))
    }
}
