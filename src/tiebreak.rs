use std::cmp::Ordering;

use crate::config::PD_CAP;
use crate::h2h::H2hTable;
use crate::standings::TeamLine;

/// The finishing places a school covers in one trial, 1-based and
/// inclusive. `first < last` only when schools stay tied through every
/// tiebreak step and co-place over the range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceRange {
    pub first: usize,
    pub last: usize,
}

impl PlaceRange {
    pub fn width(&self) -> usize {
        self.last - self.first + 1
    }

    pub fn covers(&self, slot: usize) -> bool {
        (self.first..=self.last).contains(&slot)
    }
}

// The composite five-step comparator key for one school inside a tie
// bucket. The outside arrays are aligned to the standings order of the
// non-bucket schools; a missing game is `None`, which Rust's `Option`
// ordering already ranks below every `Some` — exactly the null-least
// lexicographic rule the league uses.
#[derive(Debug, Clone, Default)]
struct TieProfile {
    school: usize,
    h2h_pts_half: u32,
    vs_outside: Vec<Option<u8>>,
    h2h_pd_capped: i32,
    pd_outside: Vec<Option<i32>>,
    points_allowed: u32,
}

// Better-first ordering: Step 1 head-to-head points, Step 2 results vs
// ranked outside opponents, Step 3 capped in-bucket differential, Step 4
// uncapped differential vs the same outside opponents, Step 5 fewest
// points allowed.
fn rank_cmp(a: &TieProfile, b: &TieProfile) -> Ordering {
    b.h2h_pts_half
        .cmp(&a.h2h_pts_half)
        .then_with(|| b.vs_outside.cmp(&a.vs_outside))
        .then_with(|| b.h2h_pd_capped.cmp(&a.h2h_pd_capped))
        .then_with(|| b.pd_outside.cmp(&a.pd_outside))
        .then_with(|| a.points_allowed.cmp(&b.points_allowed))
}

fn same_rank(a: &TieProfile, b: &TieProfile) -> bool {
    rank_cmp(a, b) == Ordering::Equal
}

/// Reusable per-worker buffers for the ranker. Cleared, never shrunk.
#[derive(Debug, Default)]
pub struct TiebreakScratch {
    profiles: Vec<TieProfile>,
    in_bucket: Vec<bool>,
}

impl TiebreakScratch {
    fn ensure(&mut self, n: usize) {
        if self.profiles.len() < n {
            self.profiles.resize_with(n, TieProfile::default);
        }
        if self.in_bucket.len() < n {
            self.in_bucket.resize(n, false);
        }
    }
}

/// Order every bucket with the five-step procedure and assign absolute
/// slot ranges. Schools equal on all five steps share a range and are
/// flagged in `residual_tied` (a real coin flip under league rules; the
/// odds math co-places them instead).
pub fn assign_places(
    lines: &[TeamLine],
    h2h: &H2hTable,
    order: &[usize],
    bounds: &[usize],
    scratch: &mut TiebreakScratch,
    places: &mut [PlaceRange],
    residual_tied: &mut [bool],
) {
    scratch.ensure(lines.len());
    for flag in residual_tied.iter_mut() {
        *flag = false;
    }

    for window in bounds.windows(2) {
        let (start, end) = (window[0], window[1]);
        let bucket = &order[start..end];
        if bucket.len() == 1 {
            places[bucket[0]] = PlaceRange {
                first: start + 1,
                last: start + 1,
            };
            continue;
        }

        for &s in bucket {
            scratch.in_bucket[s] = true;
        }
        for (slot, &s) in bucket.iter().enumerate() {
            fill_profile(
                &mut scratch.profiles[slot],
                s,
                bucket,
                order,
                &scratch.in_bucket,
                lines,
                h2h,
            );
        }

        let profiles = &mut scratch.profiles[..bucket.len()];
        // Stable sort: profiles are built in name order, so equal keys
        // stay name-ascending without the name ever splitting a tie.
        profiles.sort_by(rank_cmp);

        let mut group_start = 0;
        for i in 1..=profiles.len() {
            if i < profiles.len() && same_rank(&profiles[group_start], &profiles[i]) {
                continue;
            }
            let range = PlaceRange {
                first: start + group_start + 1,
                last: start + i,
            };
            for profile in &profiles[group_start..i] {
                places[profile.school] = range;
                if range.width() > 1 {
                    residual_tied[profile.school] = true;
                }
            }
            group_start = i;
        }

        for &s in bucket {
            scratch.in_bucket[s] = false;
        }
    }
}

fn fill_profile(
    profile: &mut TieProfile,
    s: usize,
    bucket: &[usize],
    order: &[usize],
    in_bucket: &[bool],
    lines: &[TeamLine],
    h2h: &H2hTable,
) {
    profile.school = s;
    profile.points_allowed = lines[s].points_allowed;

    profile.h2h_pts_half = 0;
    profile.h2h_pd_capped = 0;
    for &o in bucket {
        if o == s {
            continue;
        }
        profile.h2h_pts_half += u32::from(h2h.pts_half(s, o));
        profile.h2h_pd_capped += h2h.pd(s, o).clamp(-PD_CAP, PD_CAP);
    }

    profile.vs_outside.clear();
    profile.pd_outside.clear();
    for &o in order {
        if in_bucket[o] {
            continue;
        }
        if h2h.played(s, o) {
            profile.vs_outside.push(Some(series_value(h2h, s, o)));
            profile.pd_outside.push(Some(h2h.pd(s, o)));
        } else {
            profile.vs_outside.push(None);
            profile.pd_outside.push(None);
        }
    }
}

// Aggregated series result vs one opponent: win 2, split 1, loss 0.
fn series_value(h2h: &H2hTable, s: usize, o: usize) -> u8 {
    let own = h2h.pts_half(s, o);
    let theirs = h2h.pts_half(o, s);
    match own.cmp(&theirs) {
        Ordering::Greater => 2,
        Ordering::Equal => 1,
        Ordering::Less => 0,
    }
}
