use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use stepwise_pathfinding::{CellKind, GoalCheck, Pathfinder};

fn random_pathfinder(n: usize, wall_chance: f64, rng: &mut StdRng) -> Pathfinder {
    let mut kinds = (0..n * n)
        .map(|_| {
            if rng.gen_bool(wall_chance) {
                CellKind::Wall
            } else {
                CellKind::Free
            }
        })
        .collect::<Vec<_>>();
    kinds[0] = CellKind::Start;
    kinds[n * n - 1] = CellKind::End;
    Pathfinder::from_kinds(n, n, kinds).unwrap()
}

fn solve_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    for n in [32, 64] {
        // Reroll until the corners are connected so every iteration solves
        let base = loop {
            let candidate = random_pathfinder(n, 0.25, &mut rng);
            if candidate.end_reachable() {
                break candidate;
            }
        };
        for goal_check in [GoalCheck::OnDiscovery, GoalCheck::OnExpansion] {
            let pathfinder = base.clone().with_goal_check(goal_check);
            c.bench_function(format!("solve {n}x{n}, {goal_check:?}").as_str(), |b| {
                b.iter(|| {
                    let mut pathfinder = pathfinder.clone();
                    black_box(pathfinder.solve(usize::MAX));
                })
            });
        }
    }
}

fn frame_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut pathfinder = random_pathfinder(64, 0.2, &mut rng);
    // A single frame as a render loop drives it: one step and a retrace for drawing
    c.bench_function("step and retrace 64x64", |b| {
        b.iter(|| {
            if pathfinder.state() != stepwise_pathfinding::SearchState::Unsolved {
                pathfinder.reset_path();
            }
            let current = pathfinder.step();
            black_box(pathfinder.retrace_path(current));
        })
    });
}

criterion_group!(benches, solve_bench, frame_bench);
criterion_main!(benches);
