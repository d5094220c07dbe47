use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::error::SimError;
use crate::fixtures::{RegionFixtures, build_region_fixtures};
use crate::h2h::H2hTable;
use crate::odds::{SlotCounts, build_rows};
use crate::sampler::sample_game;
use crate::standings::{self, TeamLine};
use crate::state::{Game, RegionQuery, School, SimReport, SimWarning};
use crate::tiebreak::{PlaceRange, TiebreakScratch, assign_places};

/// Per-worker scratch for one trial: standings lines, the head-to-head
/// table, and the ranker's buffers. Reset from the completed-games
/// baselines at the top of each trial instead of reallocating.
struct SimState {
    h2h: H2hTable,
    lines: Vec<TeamLine>,
    order: Vec<usize>,
    bounds: Vec<usize>,
    scratch: TiebreakScratch,
    places: Vec<PlaceRange>,
    residual_tied: Vec<bool>,
}

impl SimState {
    fn new(baseline_h2h: &H2hTable, baseline_lines: &[TeamLine]) -> Self {
        let n = baseline_lines.len();
        Self {
            h2h: baseline_h2h.clone(),
            lines: baseline_lines.to_vec(),
            order: Vec::with_capacity(n),
            bounds: Vec::with_capacity(n + 1),
            scratch: TiebreakScratch::default(),
            places: vec![PlaceRange::default(); n],
            residual_tied: vec![false; n],
        }
    }

    // One trial end to end: sample the remaining pairs, fold them into the
    // lines and the head-to-head table, bucket, break ties, assign places.
    fn run_trial(
        &mut self,
        fixtures: &RegionFixtures,
        baseline_h2h: &H2hTable,
        baseline_lines: &[TeamLine],
        seed: u64,
        trial: u64,
    ) {
        self.h2h.reset_to(baseline_h2h);
        self.lines.copy_from_slice(baseline_lines);

        // Each trial gets its own ChaCha stream off the master seed, so
        // results do not depend on which worker runs which trial.
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(trial);

        for pair in &fixtures.remaining {
            let game = sample_game(&mut rng);
            self.h2h.add_sampled(pair.a, pair.b, &game);
            standings::apply_sampled(&mut self.lines, pair.a, pair.b, &game);
        }

        standings::rank_region(&self.lines, &mut self.order, &mut self.bounds);
        assign_places(
            &self.lines,
            &self.h2h,
            &self.order,
            &self.bounds,
            &mut self.scratch,
            &mut self.places,
            &mut self.residual_tied,
        );
    }
}

/// Run the full Monte Carlo for one region and return the odds rows.
///
/// The snapshot is read once up front; the trial loop touches only
/// in-memory state. `cancel` is checked between trials; when it trips the
/// report carries partial odds over the trials already completed plus a
/// `SimWarning::Cancelled`.
pub fn simulate_region(
    schools: &[School],
    games: &[Game],
    query: &RegionQuery,
    config: &SimConfig,
    cancel: Option<&AtomicBool>,
) -> Result<SimReport, SimError> {
    if config.trials < 1 {
        return Err(SimError::InvalidInput(
            "trials must be at least 1".to_string(),
        ));
    }

    let fixtures = build_region_fixtures(schools, games, query)?;
    let baseline_h2h = H2hTable::seeded(fixtures.len(), &fixtures.completed);
    let baseline_lines = standings::seed_lines(&fixtures);
    let seed = config.rng_seed.unwrap_or_else(|| rand::thread_rng().gen());
    let workers = config.workers.unwrap_or_else(default_workers);

    debug!(
        "region {}-{} season {}: {} schools, {} completed / {} remaining pairs, {} trials on {} workers",
        query.region,
        query.class,
        query.season,
        fixtures.len(),
        fixtures.completed.len(),
        fixtures.remaining.len(),
        config.trials,
        workers,
    );

    let counts = if workers <= 1 {
        run_serial(
            &fixtures,
            &baseline_h2h,
            &baseline_lines,
            seed,
            config.trials,
            cancel,
        )
    } else {
        run_parallel(
            &fixtures,
            &baseline_h2h,
            &baseline_lines,
            seed,
            config.trials,
            cancel,
            workers,
        )
    };

    let trials_completed = counts.trials();
    let warning = if trials_completed < config.trials {
        info!(
            "region {}-{} cancelled after {trials_completed} of {} trials",
            query.region, query.class, config.trials
        );
        Some(SimWarning::Cancelled { trials_completed })
    } else {
        None
    };

    let rows = build_rows(&fixtures, &baseline_lines, &counts);
    Ok(SimReport {
        rows,
        trials_requested: config.trials,
        trials_completed,
        seed,
        warning,
    })
}

fn run_serial(
    fixtures: &RegionFixtures,
    baseline_h2h: &H2hTable,
    baseline_lines: &[TeamLine],
    seed: u64,
    trials: u64,
    cancel: Option<&AtomicBool>,
) -> SlotCounts {
    let mut state = SimState::new(baseline_h2h, baseline_lines);
    let mut counts = SlotCounts::new(fixtures.len());
    for trial in 0..trials {
        if is_cancelled(cancel) {
            break;
        }
        state.run_trial(fixtures, baseline_h2h, baseline_lines, seed, trial);
        counts.credit(&state.places, &state.residual_tied);
    }
    counts
}

fn run_parallel(
    fixtures: &RegionFixtures,
    baseline_h2h: &H2hTable,
    baseline_lines: &[TeamLine],
    seed: u64,
    trials: u64,
    cancel: Option<&AtomicBool>,
    workers: usize,
) -> SlotCounts {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .ok();
    let body = || {
        (0..trials)
            .into_par_iter()
            .fold(
                || {
                    (
                        SimState::new(baseline_h2h, baseline_lines),
                        SlotCounts::new(fixtures.len()),
                    )
                },
                |(mut state, mut counts), trial| {
                    if !is_cancelled(cancel) {
                        state.run_trial(fixtures, baseline_h2h, baseline_lines, seed, trial);
                        counts.credit(&state.places, &state.residual_tied);
                    }
                    (state, counts)
                },
            )
            .map(|(_, counts)| counts)
            .reduce(|| SlotCounts::new(fixtures.len()), SlotCounts::merge)
    };
    match pool {
        Some(pool) => pool.install(body),
        None => body(),
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
