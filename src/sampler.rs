use rand::Rng;

/// Victory margins and their weights, flattened to tenths: 3 points with
/// probability 0.4, 7 with 0.3, 10 with 0.2, 14 with 0.1.
const MARGIN_TENTHS: [u16; 10] = [3, 3, 3, 3, 7, 7, 7, 10, 10, 14];

/// Inclusive range the losing score is drawn from.
pub const LOSER_POINTS_MIN: u16 = 10;
pub const LOSER_POINTS_MAX: u16 = 30;

/// Outcome of one simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledGame {
    /// Whether the pair's lexicographically-lesser school won.
    pub a_won: bool,
    pub winner_points: u16,
    pub loser_points: u16,
}

impl SampledGame {
    pub fn margin(&self) -> u16 {
        self.winner_points - self.loser_points
    }
}

/// Draw one game outcome. The winner is a fair coin, the margin comes from
/// the fixed margin table, and the loser's score is uniform; the smallest
/// margin is 3, so a simulated game can never be a tie.
pub fn sample_game<R: Rng>(rng: &mut R) -> SampledGame {
    let a_won = rng.gen_bool(0.5);
    let margin = MARGIN_TENTHS[rng.gen_range(0..MARGIN_TENTHS.len())];
    let loser_points = rng.gen_range(LOSER_POINTS_MIN..=LOSER_POINTS_MAX);
    SampledGame {
        a_won,
        winner_points: loser_points + margin,
        loser_points,
    }
}
