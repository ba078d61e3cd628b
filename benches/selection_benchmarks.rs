use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use kanadr::engine::filter::{CustomSelections, FilterState, ModifierFlags, ScriptFlags};
use kanadr::engine::performance::PerformanceTracker;
use kanadr::engine::progression::{LevelDescriptor, ScriptLevel};
use kanadr::engine::shuffle::{ShuffleMode, apply_shuffle};
use kanadr::engine::tiles::build_answer_tiles;

fn seeded_tracker() -> PerformanceTracker {
    let mut tracker = PerformanceTracker::default();
    for id in 1..=71u32 {
        let key = id.to_string();
        tracker.record_miss(&key);
        tracker.record_attempt(&key, Some(1.0 + (id % 7) as f64), 1);
    }
    tracker
}

fn bench_tile_build(c: &mut Criterion) {
    let tracker = seeded_tracker();
    c.bench_function("build_answer_tiles (71 syllables x 3 scripts)", |b| {
        b.iter(|| build_answer_tiles(black_box(&tracker)))
    });
}

fn bench_filter(c: &mut Criterion) {
    let tracker = seeded_tracker();
    let tiles = build_answer_tiles(&tracker);
    let scripts = ScriptFlags {
        hiragana: true,
        katakana: true,
        romaji: true,
    };
    let modifiers = ModifierFlags {
        dakuten: true,
        handakuten: true,
    };
    let level = LevelDescriptor::range_initial(ScriptLevel::Both);
    let state = FilterState::build(scripts, modifiers, &level, &CustomSelections::default());

    c.bench_function("filter full tile set (213 tiles)", |b| {
        b.iter(|| {
            tiles
                .iter()
                .filter(|tile| state.allows(black_box(tile)))
                .count()
        })
    });
}

fn bench_shuffle(c: &mut Criterion) {
    let tracker = PerformanceTracker::default();
    let tiles = build_answer_tiles(&tracker);

    for mode in [ShuffleMode::Horizontal, ShuffleMode::Vertical, ShuffleMode::Both] {
        c.bench_function(&format!("apply_shuffle {}", mode.to_key()), |b| {
            b.iter(|| {
                let mut tiles = tiles.clone();
                let mut rng = SmallRng::seed_from_u64(42);
                apply_shuffle(black_box(&mut tiles), mode, &mut rng);
                tiles
            })
        });
    }
}

fn bench_level_cycle(c: &mut Criterion) {
    c.bench_function("next_level full cycle", |b| {
        b.iter(|| {
            let initial = LevelDescriptor::linear_initial(ScriptLevel::Hiragana);
            let mut level = initial.next_level();
            let mut steps = 1u32;
            while level != initial {
                level = level.next_level();
                steps += 1;
            }
            black_box(steps)
        })
    });
}

criterion_group!(
    benches,
    bench_tile_build,
    bench_filter,
    bench_shuffle,
    bench_level_cycle
);
criterion_main!(benches);
