use std::collections::HashSet;
use std::time::{Duration, Instant};

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use devtype::engine::PracticeEngine;
use devtype::keyboard::catalog::{self, DEFAULT_LAYOUT_ID};
use devtype::keyboard::{LayoutIndex, LayoutRegistry, ModifierState};
use devtype::text::normalize;

const PASSAGE: &str = "आज मौसम अच्छा है और हम सब बाग़ में खेलने चलेंगे";

fn engine(layout: &str) -> PracticeEngine {
    let layouts = catalog::bundled_layouts().unwrap();
    let registry = LayoutRegistry::new(layouts, layout, DEFAULT_LAYOUT_ID).unwrap();
    PracticeEngine::new(registry, None)
}

/// Key presses that follow the guidance through the whole passage.
fn keystrokes(layout: &str) -> Vec<(String, HashSet<String>)> {
    let mut e = engine(layout);
    e.start_text(PASSAGE);
    let t0 = Instant::now();
    let mut out = Vec::new();
    let mut step = 0u64;
    while let Some(g) = e.guidance() {
        let key = g.candidate.key.to_string();
        let mut pressed: HashSet<String> = HashSet::from([key.clone()]);
        if matches!(g.candidate.state, ModifierState::Shift | ModifierState::AltGrShift) {
            pressed.insert("ShiftLeft".to_string());
        }
        if matches!(g.candidate.state, ModifierState::AltGr | ModifierState::AltGrShift) {
            pressed.insert("AltRight".to_string());
        }
        step += 1;
        e.handle_key(&key, &pressed, t0 + Duration::from_millis(step * 200));
        out.push((key, pressed));
    }
    out
}

fn bench_session(c: &mut Criterion) {
    let presses = keystrokes("remington-gail");

    c.bench_function("type passage (remington-gail)", |b| {
        b.iter(|| {
            let mut e = engine("remington-gail");
            e.start_text(PASSAGE);
            let t0 = Instant::now();
            for (i, (key, pressed)) in presses.iter().enumerate() {
                black_box(e.handle_key(key, pressed, t0 + Duration::from_millis(i as u64 * 200)));
            }
            e.snapshot(t0)
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize passage", |b| {
        b.iter(|| normalize(black_box(PASSAGE)))
    });
}

fn bench_index(c: &mut Criterion) {
    let layout = catalog::bundled_layout("inscript").unwrap();

    c.bench_function("build layout index (inscript)", |b| {
        b.iter(|| LayoutIndex::build(black_box(&layout)))
    });
}

criterion_group!(benches, bench_session, bench_normalize, bench_index);
criterion_main!(benches);
