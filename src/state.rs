use serde::{Deserialize, Serialize};

/// A school as it appears in the snapshot, identified by name within a
/// `(class, region, season)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub school: String,
    pub class: u16,
    pub region: u16,
    pub season: u16,
}

/// Final result of a game from the row school's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "T")]
    Tie,
}

/// One side of a match in the snapshot. Each real match normally appears
/// twice, once from each school's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub school: String,
    pub opponent: String,
    pub season: u16,
    pub is_final: bool,
    pub is_region: bool,
    pub result: Option<GameResult>,
    pub points_for: Option<u16>,
    pub points_against: Option<u16>,
}

/// Selects the region a run operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionQuery {
    pub class: u16,
    pub region: u16,
    pub season: u16,
}

/// One output row per school. Field names line up with the caller-side
/// standings schema so rows can be persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRow {
    pub school: String,
    pub class: u16,
    pub region: u16,
    pub season: u16,
    pub region_wins: u16,
    pub region_losses: u16,
    pub region_ties: u16,
    pub odds_1st: f64,
    pub odds_2nd: f64,
    pub odds_3rd: f64,
    pub odds_4th: f64,
    pub odds_playoffs: f64,
    pub final_odds_playoffs: f64,
    pub clinched: bool,
    pub eliminated: bool,
    pub coin_flip_needed: bool,
}

/// Structured warning attached to a report that finished abnormally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimWarning {
    /// Cooperative cancellation was observed between trials; odds cover
    /// only the trials completed before the flag was seen.
    Cancelled { trials_completed: u64 },
}

/// Result of a full simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub rows: Vec<OddsRow>,
    pub trials_requested: u64,
    pub trials_completed: u64,
    /// The master seed actually used. Equals the configured seed when one
    /// was given, otherwise the implementation-chosen seed is reported
    /// back here so the run can be reproduced.
    pub seed: u64,
    pub warning: Option<SimWarning>,
}
