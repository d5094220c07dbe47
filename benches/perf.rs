use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use region_odds::{Game, GameResult, RegionQuery, School, SimConfig, simulate_region};

const SEASON: u16 = 2025;

fn school(name: &str) -> School {
    School {
        school: name.to_string(),
        class: 4,
        region: 2,
        season: SEASON,
    }
}

fn game(school: &str, opponent: &str, final_score: Option<(u16, u16)>) -> Game {
    match final_score {
        Some((pf, pa)) => Game {
            school: school.to_string(),
            opponent: opponent.to_string(),
            season: SEASON,
            is_final: true,
            is_region: true,
            result: Some(if pf > pa {
                GameResult::Win
            } else {
                GameResult::Loss
            }),
            points_for: Some(pf),
            points_against: Some(pa),
        },
        None => Game {
            school: school.to_string(),
            opponent: opponent.to_string(),
            season: SEASON,
            is_final: false,
            is_region: true,
            result: None,
            points_for: None,
            points_against: None,
        },
    }
}

// Eight-team region halfway through the round robin: every pair with an
// even index distance is decided, the rest are open.
fn snapshot() -> (Vec<School>, Vec<Game>) {
    let names = [
        "Alder", "Birch", "Cedar", "Dogwood", "Elm", "Fir", "Gum", "Hazel",
    ];
    let schools = names.iter().map(|n| school(n)).collect();
    let mut games = Vec::new();
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            if (j - i) % 2 == 0 {
                let (pf, pa) = (21 + (i as u16 % 3) * 7, 14);
                games.push(game(names[i], names[j], Some((pf, pa))));
                games.push(game(names[j], names[i], Some((pa, pf))));
            } else {
                games.push(game(names[i], names[j], None));
                games.push(game(names[j], names[i], None));
            }
        }
    }
    (schools, games)
}

fn bench_simulate(c: &mut Criterion) {
    let (schools, games) = snapshot();
    let query = RegionQuery {
        class: 4,
        region: 2,
        season: SEASON,
    };

    c.bench_function("simulate_region_2k_trials_serial", |b| {
        let config = SimConfig {
            trials: 2_000,
            rng_seed: Some(42),
            workers: Some(1),
        };
        b.iter(|| {
            let report = simulate_region(
                black_box(&schools),
                black_box(&games),
                &query,
                &config,
                None,
            )
            .expect("bench simulation should run");
            black_box(report.rows.len())
        });
    });

    c.bench_function("simulate_region_2k_trials_parallel", |b| {
        let config = SimConfig {
            trials: 2_000,
            rng_seed: Some(42),
            workers: Some(4),
        };
        b.iter(|| {
            let report = simulate_region(
                black_box(&schools),
                black_box(&games),
                &query,
                &config,
                None,
            )
            .expect("bench simulation should run");
            black_box(report.rows.len())
        });
    });
}

criterion_group!(benches, bench_simulate);
criterion_main!(benches);
