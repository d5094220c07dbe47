use serde::{Deserialize, Serialize};

/// Number of playoff berths per region. The ranker itself never branches
/// on this; only renormalization uses it.
pub const PLAYOFF_SPOTS: usize = 4;

/// Per-opponent cap on head-to-head point differential in tiebreak Step 3.
pub const PD_CAP: i32 = 12;

/// A school at or above this playoff probability is treated as clinched.
pub const CLINCH_THRESHOLD: f64 = 0.999;

/// A school at or below this playoff probability is treated as eliminated.
pub const ELIM_THRESHOLD: f64 = 0.001;

/// Knobs for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of Monte Carlo trials; must be at least 1.
    #[serde(default = "default_trials")]
    pub trials: u64,
    /// Master RNG seed. When absent a seed is drawn from the thread RNG
    /// and reported back on the run's `SimReport`.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Worker thread count. `None` uses the machine's available
    /// parallelism; `Some(1)` forces the sequential path. Results are
    /// identical for every worker count at a fixed seed.
    #[serde(default)]
    pub workers: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            rng_seed: None,
            workers: None,
        }
    }
}

fn default_trials() -> u64 {
    20_000
}
