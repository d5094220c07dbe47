use crate::fixtures::CompletedPair;
use crate::sampler::SampledGame;

/// Head-to-head aggregates for every ordered pair of region schools.
///
/// Match points are stored in half-point units (series win = 2, split = 1
/// to each side) so tiebreak keys stay integral. For any ordered pair,
/// `pts_half(a, b) + pts_half(b, a)` is twice the number of series played
/// between them, and `pd(a, b) == -pd(b, a)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct H2hTable {
    n: usize,
    pts_half: Vec<u16>,
    pd: Vec<i32>,
}

impl H2hTable {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            pts_half: vec![0; n * n],
            pd: vec![0; n * n],
        }
    }

    /// Build the completed-games baseline shared by every trial.
    pub fn seeded(n: usize, completed: &[CompletedPair]) -> Self {
        let mut table = Self::new(n);
        for pair in completed {
            table.add_completed(pair);
        }
        table
    }

    /// Copy `other` into this table without reallocating.
    pub fn reset_to(&mut self, other: &H2hTable) {
        self.n = other.n;
        self.pts_half.clone_from(&other.pts_half);
        self.pd.clone_from(&other.pd);
    }

    fn idx(&self, a: usize, b: usize) -> usize {
        a * self.n + b
    }

    pub fn pts_half(&self, a: usize, b: usize) -> u16 {
        self.pts_half[self.idx(a, b)]
    }

    pub fn pd(&self, a: usize, b: usize) -> i32 {
        self.pd[self.idx(a, b)]
    }

    /// Whether the two schools have met at all (completed or simulated).
    pub fn played(&self, a: usize, b: usize) -> bool {
        self.pts_half(a, b) + self.pts_half(b, a) > 0
    }

    fn add_completed(&mut self, pair: &CompletedPair) {
        let ab_idx = self.idx(pair.a, pair.b);
        let ba_idx = self.idx(pair.b, pair.a);
        match pair.res_a {
            1 => self.pts_half[ab_idx] += 2,
            -1 => self.pts_half[ba_idx] += 2,
            _ => {
                self.pts_half[ab_idx] += 1;
                self.pts_half[ba_idx] += 1;
            }
        }
        let ab = self.idx(pair.a, pair.b);
        let ba = self.idx(pair.b, pair.a);
        self.pd[ab] += pair.pd_a;
        self.pd[ba] -= pair.pd_a;
    }

    pub fn add_sampled(&mut self, a: usize, b: usize, game: &SampledGame) {
        let margin = i32::from(game.margin());
        let (winner, loser, pd_a) = if game.a_won {
            (a, b, margin)
        } else {
            (b, a, -margin)
        };
        let win_idx = self.idx(winner, loser);
        self.pts_half[win_idx] += 2;
        let ab = self.idx(a, b);
        let ba = self.idx(b, a);
        self.pd[ab] += pd_a;
        self.pd[ba] -= pd_a;
    }
}
