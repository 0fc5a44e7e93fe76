// Team color palettes (team_colors.csv).

use serde::Serialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Ordered color tokens used to fill bar charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette(Vec<String>);

impl Palette {
    pub fn new(colors: Vec<String>) -> Self {
        Self(colors)
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }

    /// `n` colors starting at `offset`, wrapping around the palette.
    ///
    /// Adjacent subplots pass the previous subplot's bar count as the offset
    /// so colors keep alternating across the grid row.
    pub fn cycle(&self, n: usize, offset: usize) -> Vec<String> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0
            .iter()
            .cycle()
            .skip(offset % self.0.len())
            .take(n)
            .cloned()
            .collect()
    }
}

/// Team name -> palette, with a fallback for unknown teams.
#[derive(Debug, Clone)]
pub struct PaletteTable {
    teams: HashMap<String, Vec<String>>,
    default: Palette,
}

impl PaletteTable {
    pub fn new(teams: impl IntoIterator<Item = (String, Vec<String>)>, default: Palette) -> Self {
        Self {
            teams: teams.into_iter().collect(),
            default,
        }
    }

    /// Load `team,color1,color2,...` rows. Rows may have any number of color
    /// columns; blank cells are dropped.
    pub fn load(path: &Path, default: Palette) -> Result<Self, PaletteError> {
        let path_str = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| PaletteError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        let teams = parse_rows(file).map_err(|e| PaletteError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        debug!("loaded {} team palettes from {path_str}", teams.len());
        Ok(Self::new(teams, default))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Palette for `team` by exact name. Falls back to the default palette
    /// when the team is missing, unknown, or has fewer than two colors.
    pub fn resolve(&self, team: Option<&str>) -> Palette {
        match team.and_then(|t| self.teams.get(t)) {
            Some(colors) if colors.len() >= 2 => Palette::new(colors.clone()),
            Some(_) => {
                warn!("palette for {team:?} has fewer than two colors, using default");
                self.default.clone()
            }
            None => self.default.clone(),
        }
    }
}

fn parse_rows<R: Read>(rdr: R) -> Result<Vec<(String, Vec<String>)>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut teams = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut fields = record.iter().map(str::trim);
        let Some(team) = fields.next().filter(|t| !t.is_empty()) else {
            continue;
        };
        let colors: Vec<String> = fields.filter(|c| !c.is_empty()).map(String::from).collect();
        teams.push((team.to_string(), colors));
    }
    Ok(teams)
}
