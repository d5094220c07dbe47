use crate::config::{CLINCH_THRESHOLD, ELIM_THRESHOLD, PLAYOFF_SPOTS};
use crate::fixtures::RegionFixtures;
use crate::standings::TeamLine;
use crate::state::OddsRow;
use crate::tiebreak::PlaceRange;

/// Per-school counters for the playoff slots, accumulated over trials.
///
/// A school co-placed over a range of `g` slots owns each of them with
/// probability `1/g`, so slot credit is fractional. Counts are kept in
/// integer units of `1/lcm(1..=n)` per trial; every group size divides the
/// unit, which keeps the arithmetic exact and the merge associative, so
/// totals are identical for any worker count or merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCounts {
    unit: u64,
    slots: Vec<[u64; PLAYOFF_SPOTS]>,
    residual_ties: Vec<u64>,
    trials: u64,
}

impl SlotCounts {
    pub fn new(n: usize) -> Self {
        Self {
            unit: lcm_up_to(n.max(1) as u64),
            slots: vec![[0; PLAYOFF_SPOTS]; n],
            residual_ties: vec![0; n],
            trials: 0,
        }
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Credit one finished trial: every playoff slot a school's range
    /// covers counts `1/width`.
    pub fn credit(&mut self, places: &[PlaceRange], residual_tied: &[bool]) {
        for (school, place) in places.iter().enumerate() {
            let share = self.unit / place.width() as u64;
            for k in 0..PLAYOFF_SPOTS {
                if place.covers(k + 1) {
                    self.slots[school][k] += share;
                }
            }
            if residual_tied[school] {
                self.residual_ties[school] += 1;
            }
        }
        self.trials += 1;
    }

    pub fn merge(mut self, other: Self) -> Self {
        for (mine, theirs) in self.slots.iter_mut().zip(&other.slots) {
            for k in 0..PLAYOFF_SPOTS {
                mine[k] += theirs[k];
            }
        }
        for (mine, theirs) in self.residual_ties.iter_mut().zip(&other.residual_ties) {
            *mine += theirs;
        }
        self.trials += other.trials;
        self
    }

    fn odds(&self, school: usize, k: usize) -> f64 {
        self.slots[school][k] as f64 / (self.unit * self.trials) as f64
    }
}

fn lcm_up_to(n: u64) -> u64 {
    (1..=n).fold(1, |acc, k| acc / gcd(acc, k) * k)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Turn accumulated counts into the final per-school rows: raw odds,
/// clinch/elimination clamping, region-wide renormalization, a second
/// clamp, and 5-decimal rounding.
pub fn build_rows(
    fixtures: &RegionFixtures,
    baseline_lines: &[TeamLine],
    counts: &SlotCounts,
) -> Vec<OddsRow> {
    let n = fixtures.len();
    let trials = counts.trials;

    let mut odds = vec![[0.0f64; PLAYOFF_SPOTS]; n];
    let mut playoffs = vec![0.0f64; n];
    let mut clinched = vec![false; n];
    let mut eliminated = vec![false; n];
    let mut adj = vec![0.0f64; n];
    let mut final_playoffs = vec![0.0f64; n];

    if trials > 0 {
        for s in 0..n {
            for k in 0..PLAYOFF_SPOTS {
                odds[s][k] = counts.odds(s, k);
            }
            playoffs[s] = odds[s].iter().sum();
            clinched[s] = playoffs[s] >= CLINCH_THRESHOLD;
            eliminated[s] = playoffs[s] <= ELIM_THRESHOLD;
            adj[s] = if clinched[s] {
                1.0
            } else if eliminated[s] {
                0.0
            } else {
                playoffs[s]
            };
        }

        // Redistribute the unresolved playoff-spot mass over the active
        // schools so the region's expectation matches the spots that are
        // neither locked nor lost.
        let locked: f64 = (0..n)
            .filter(|&s| clinched[s] || eliminated[s])
            .map(|s| adj[s])
            .sum();
        let free_spots = PLAYOFF_SPOTS as f64 - locked;
        let sum_active: f64 = (0..n)
            .filter(|&s| !clinched[s] && !eliminated[s])
            .map(|s| adj[s])
            .sum();

        for s in 0..n {
            let scaled = if clinched[s] {
                1.0
            } else if eliminated[s] {
                0.0
            } else if sum_active > 0.0 {
                adj[s] * free_spots / sum_active
            } else {
                adj[s]
            };
            // Renormalization can push an active school over a threshold;
            // the clamp applies again and the flags follow it.
            if scaled >= CLINCH_THRESHOLD {
                final_playoffs[s] = 1.0;
                clinched[s] = true;
            } else if scaled <= ELIM_THRESHOLD {
                final_playoffs[s] = 0.0;
                eliminated[s] = true;
            } else {
                final_playoffs[s] = scaled;
            }
        }
    }

    let mut rows: Vec<OddsRow> = (0..n)
        .map(|s| OddsRow {
            school: fixtures.schools[s].clone(),
            class: fixtures.class,
            region: fixtures.region,
            season: fixtures.season,
            region_wins: baseline_lines[s].wins,
            region_losses: baseline_lines[s].losses,
            region_ties: baseline_lines[s].ties,
            odds_1st: round5(odds[s][0]),
            odds_2nd: round5(odds[s][1]),
            odds_3rd: round5(odds[s][2]),
            odds_4th: round5(odds[s][3]),
            odds_playoffs: round5(playoffs[s]),
            final_odds_playoffs: round5(final_playoffs[s]),
            clinched: clinched[s],
            eliminated: eliminated[s],
            coin_flip_needed: counts.residual_ties[s] > 0,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.region
            .cmp(&b.region)
            .then_with(|| b.final_odds_playoffs.total_cmp(&a.final_odds_playoffs))
            .then_with(|| a.school.cmp(&b.school))
    });
    rows
}

fn round5(x: f64) -> f64 {
    (x * 100_000.0).round() / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures(names: &[&str]) -> RegionFixtures {
        RegionFixtures {
            class: 3,
            region: 5,
            season: 2025,
            schools: names.iter().map(|n| n.to_string()).collect(),
            completed: Vec::new(),
            remaining: Vec::new(),
        }
    }

    // Counts with whole-trial credit per slot, scaled to the unit.
    fn counts_from(slots: &[[u64; PLAYOFF_SPOTS]], trials: u64) -> SlotCounts {
        let mut counts = SlotCounts::new(slots.len());
        for (s, row) in slots.iter().enumerate() {
            for k in 0..PLAYOFF_SPOTS {
                counts.slots[s][k] = row[k] * counts.unit;
            }
        }
        counts.trials = trials;
        counts
    }

    fn row<'a>(rows: &'a [OddsRow], school: &str) -> &'a OddsRow {
        rows.iter().find(|r| r.school == school).unwrap()
    }

    #[test]
    fn lcm_covers_every_group_size() {
        assert_eq!(lcm_up_to(1), 1);
        assert_eq!(lcm_up_to(4), 12);
        assert_eq!(lcm_up_to(8), 840);
        for g in 1..=10 {
            assert_eq!(lcm_up_to(10) % g, 0);
        }
    }

    #[test]
    fn co_placed_schools_split_the_slots_evenly() {
        let places = [
            PlaceRange { first: 1, last: 3 },
            PlaceRange { first: 1, last: 3 },
            PlaceRange { first: 1, last: 3 },
            PlaceRange { first: 4, last: 4 },
        ];
        let residual = [true, true, true, false];
        let mut counts = SlotCounts::new(4);
        counts.credit(&places, &residual);
        let fx = fixtures(&["Aspen", "Briar", "Cove", "Dell"]);
        let baseline = vec![TeamLine::default(); 4];
        let rows = build_rows(&fx, &baseline, &counts);
        for name in ["Aspen", "Briar", "Cove"] {
            let r = row(&rows, name);
            assert_eq!(r.odds_1st, 0.33333);
            assert_eq!(r.odds_2nd, 0.33333);
            assert_eq!(r.odds_3rd, 0.33333);
            assert_eq!(r.odds_4th, 0.0);
            assert_eq!(r.odds_playoffs, 1.0);
            assert!(r.clinched);
            assert!(r.coin_flip_needed);
        }
        let dell = row(&rows, "Dell");
        assert_eq!(dell.odds_4th, 1.0);
        assert!(dell.clinched);
        assert!(!dell.coin_flip_needed);
    }

    #[test]
    fn renormalized_actives_can_clinch_on_output() {
        // One clinched school, two actives at 0.5, two eliminated. Three
        // spots remain for an active mass of 1.0, so each active scales
        // to 1.5 and the second clamp turns both into clinches.
        let fx = fixtures(&["Aspen", "Briar", "Cove", "Dell", "Elm"]);
        let slots = [
            [2, 0, 0, 0],
            [0, 1, 0, 0],
            [0, 0, 1, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ];
        let baseline = vec![TeamLine::default(); 5];
        let rows = build_rows(&fx, &baseline, &counts_from(&slots, 2));

        let aspen = row(&rows, "Aspen");
        assert!(aspen.clinched);
        assert_eq!(aspen.final_odds_playoffs, 1.0);

        for name in ["Briar", "Cove"] {
            let r = row(&rows, name);
            assert_eq!(r.odds_playoffs, 0.5);
            assert_eq!(r.final_odds_playoffs, 1.0);
            assert!(r.clinched, "{name} should clinch after renormalization");
            assert!(!r.eliminated);
        }
        for name in ["Dell", "Elm"] {
            let r = row(&rows, name);
            assert!(r.eliminated);
            assert_eq!(r.final_odds_playoffs, 0.0);
        }
    }

    #[test]
    fn renormalization_preserves_the_spot_total() {
        // One clinch plus actives summing to exactly the three free
        // spots: the scale factor is 1 and the finals sum to 4.
        let fx = fixtures(&["Aspen", "Briar", "Cove", "Dell", "Elm", "Fern"]);
        let slots = [
            [10, 0, 0, 0],
            [0, 9, 0, 0],
            [0, 0, 9, 0],
            [0, 0, 0, 9],
            [0, 1, 1, 1],
            [0, 0, 0, 0],
        ];
        let baseline = vec![TeamLine::default(); 6];
        let rows = build_rows(&fx, &baseline, &counts_from(&slots, 10));
        let total: f64 = rows.iter().map(|r| r.final_odds_playoffs).sum();
        assert!((total - PLAYOFF_SPOTS as f64).abs() < 1e-9);
        assert_eq!(row(&rows, "Briar").final_odds_playoffs, 0.9);
        assert_eq!(row(&rows, "Elm").final_odds_playoffs, 0.3);
    }

    #[test]
    fn zero_completed_trials_yield_unflagged_zero_rows() {
        let fx = fixtures(&["Aspen", "Briar"]);
        let baseline = vec![TeamLine::default(); 2];
        let rows = build_rows(&fx, &baseline, &SlotCounts::new(2));
        for r in &rows {
            assert_eq!(r.odds_playoffs, 0.0);
            assert_eq!(r.final_odds_playoffs, 0.0);
            assert!(!r.clinched);
            assert!(!r.eliminated);
        }
    }

    #[test]
    fn worker_accumulators_merge_by_summation() {
        let places = [
            PlaceRange { first: 1, last: 1 },
            PlaceRange { first: 2, last: 2 },
        ];
        let residual = [false, false];
        let mut left = SlotCounts::new(2);
        left.credit(&places, &residual);
        let mut right = SlotCounts::new(2);
        right.credit(&places, &residual);
        right.credit(&places, &residual);
        let merged = left.merge(right);
        assert_eq!(merged.trials(), 3);
        assert_eq!(merged.slots[0][0], 3 * merged.unit);
        assert_eq!(merged.slots[1][1], 3 * merged.unit);
    }

    #[test]
    fn rows_sort_by_final_odds_then_name() {
        // Active mass equals the free spots, so the scale factor is 1 and
        // no clamp disturbs the ordering.
        let fx = fixtures(&["Aspen", "Briar", "Cove", "Dell", "Elm"]);
        let slots = [
            [8, 0, 0, 0],
            [9, 0, 0, 0],
            [0, 8, 0, 0],
            [0, 0, 8, 0],
            [0, 0, 0, 7],
        ];
        let baseline = vec![TeamLine::default(); 5];
        let rows = build_rows(&fx, &baseline, &counts_from(&slots, 10));
        let names: Vec<_> = rows.iter().map(|r| r.school.as_str()).collect();
        assert_eq!(names, vec!["Briar", "Aspen", "Cove", "Dell", "Elm"]);
    }
}
