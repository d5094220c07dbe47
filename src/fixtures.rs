use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::SimError;
use crate::state::{Game, GameResult, RegionQuery, School};

/// A fully decided region series between two schools. `a` is always the
/// lexicographically lesser school; everything is stated from `a`'s side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedPair {
    pub a: usize,
    pub b: usize,
    /// +1 when `a` won the series, -1 when `b` did, 0 for a split/tie.
    pub res_a: i8,
    /// Signed point differential for `a` summed over the meetings.
    pub pd_a: i32,
    /// Points allowed by `a` in those meetings.
    pub pa_a: u32,
    /// Points allowed by `b` in those meetings.
    pub pa_b: u32,
}

/// A scheduled but undecided region matchup, `a < b` lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingPair {
    pub a: usize,
    pub b: usize,
}

/// Immutable inputs for a run: the region roster plus its game pairs,
/// split into completed and remaining. School indices are positions in
/// `schools`, which is sorted ascending, so index order is name order.
#[derive(Debug, Clone)]
pub struct RegionFixtures {
    pub class: u16,
    pub region: u16,
    pub season: u16,
    pub schools: Vec<String>,
    pub completed: Vec<CompletedPair>,
    pub remaining: Vec<RemainingPair>,
}

impl RegionFixtures {
    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }
}

// Running totals for one pair while collapsing both-sided rows. The a-side
// and b-side contributions are kept apart so the sides can be compared and
// the canonical one chosen at the end.
#[derive(Debug, Default)]
struct PairAccum {
    rows_a: u32,
    res_a: i32,
    pd_a: i32,
    pa_a: u32,
    pa_b: u32,
    rows_b: u32,
    res_inv: i32,
    pd_inv: i32,
    pa_a_inv: u32,
    pa_b_inv: u32,
}

/// Partition the snapshot's region games for `query` into completed and
/// remaining pairs.
///
/// Duplicate rows from the two perspectives of the same matchup collapse
/// onto the min/max pair key. Games touching no region school are ignored;
/// a region game with exactly one endpoint in the region is a defect.
pub fn build_region_fixtures(
    schools: &[School],
    games: &[Game],
    query: &RegionQuery,
) -> Result<RegionFixtures, SimError> {
    let mut roster: Vec<String> = schools
        .iter()
        .filter(|s| s.class == query.class && s.region == query.region && s.season == query.season)
        .map(|s| s.school.clone())
        .collect();
    roster.sort();
    roster.dedup();
    if roster.is_empty() {
        return Err(SimError::EmptyRegion {
            class: query.class,
            region: query.region,
            season: query.season,
        });
    }

    let index: HashMap<&str, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut completed_acc: BTreeMap<(usize, usize), PairAccum> = BTreeMap::new();
    let mut remaining_keys: BTreeSet<(usize, usize)> = BTreeSet::new();

    for game in games {
        if game.season != query.season || !game.is_region {
            continue;
        }
        let (si, oi) = match (
            index.get(game.school.as_str()),
            index.get(game.opponent.as_str()),
        ) {
            (Some(&si), Some(&oi)) => (si, oi),
            (Some(_), None) => {
                return Err(SimError::MissingOpponent {
                    school: game.school.clone(),
                    opponent: game.opponent.clone(),
                });
            }
            (None, Some(_)) => {
                return Err(SimError::MissingOpponent {
                    school: game.opponent.clone(),
                    opponent: game.school.clone(),
                });
            }
            (None, None) => continue,
        };
        if si == oi {
            return Err(SimError::InvalidInput(format!(
                "{} is scheduled against itself",
                game.school
            )));
        }
        let key = (si.min(oi), si.max(oi));

        if !game.is_final {
            remaining_keys.insert(key);
            continue;
        }

        let (Some(result), Some(pf), Some(pa)) = (game.result, game.points_for, game.points_against)
        else {
            return Err(SimError::InvalidInput(format!(
                "final region game {} vs {} is missing result or score",
                game.school, game.opponent
            )));
        };

        let acc = completed_acc.entry(key).or_default();
        let sign = match result {
            GameResult::Win => 1,
            GameResult::Loss => -1,
            GameResult::Tie => 0,
        };
        if si == key.0 {
            // Row from the canonical side.
            acc.rows_a += 1;
            acc.res_a += sign;
            acc.pd_a += i32::from(pf) - i32::from(pa);
            acc.pa_a += u32::from(pa);
            acc.pa_b += u32::from(pf);
        } else {
            // Row from `b`'s perspective, inverted onto `a`.
            acc.rows_b += 1;
            acc.res_inv -= sign;
            acc.pd_inv -= i32::from(pf) - i32::from(pa);
            acc.pa_a_inv += u32::from(pf);
            acc.pa_b_inv += u32::from(pa);
        }
    }

    let mut completed = Vec::with_capacity(completed_acc.len());
    for (&(a, b), acc) in &completed_acc {
        completed.push(merge_pair_rows(a, b, acc, &roster)?);
        // A pair decided in the completed set cannot also be remaining; a
        // leftover fixture row for it is a stale schedule artifact.
        remaining_keys.remove(&(a, b));
    }

    let remaining = remaining_keys
        .into_iter()
        .map(|(a, b)| RemainingPair { a, b })
        .collect();

    Ok(RegionFixtures {
        class: query.class,
        region: query.region,
        season: query.season,
        schools: roster,
        completed,
        remaining,
    })
}

/// The single point where the two perspectives of a completed series are
/// reconciled: the canonical `a` side (lesser school string) wins any
/// recoverable disagreement; when only `b`'s rows exist they are used
/// inverted. The sides claiming opposite series winners is the one
/// non-recoverable defect.
fn merge_pair_rows(
    a: usize,
    b: usize,
    acc: &PairAccum,
    roster: &[String],
) -> Result<CompletedPair, SimError> {
    if acc.rows_a > 0 && acc.rows_b > 0 && acc.res_a.signum() != acc.res_inv.signum() {
        return Err(SimError::InconsistentPair {
            a: roster[a].clone(),
            b: roster[b].clone(),
        });
    }
    let (res, pd_a, pa_a, pa_b) = if acc.rows_a > 0 {
        (acc.res_a, acc.pd_a, acc.pa_a, acc.pa_b)
    } else {
        (acc.res_inv, acc.pd_inv, acc.pa_a_inv, acc.pa_b_inv)
    };
    Ok(CompletedPair {
        a,
        b,
        res_a: res.signum() as i8,
        pd_a,
        pa_a,
        pa_b,
    })
}
