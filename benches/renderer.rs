//! Diff detection and terminal flush benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use ansicanvas::color::Quantize;
use ansicanvas::renderer::{GridDiff, TerminalBuffer};
use ansicanvas::{Cell, ColorTransform, Grid, Rgb};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn filled(ch: char, fg: Rgb) -> Grid {
    Grid::filled(Cell::new(ch, fg, Rgb::BLACK))
}

fn diff_identical(c: &mut Criterion) {
    let a = Grid::new();
    let b = Grid::new();

    c.bench_function("diff_identical_80x25", |b_iter| {
        b_iter.iter(|| GridDiff::compute(black_box(&a), black_box(&b), None));
    });
}

fn diff_single_change(c: &mut Criterion) {
    let a = Grid::new();
    let mut b = Grid::new();
    b.set(12, 40, Cell::new('X', Rgb::RED, Rgb::BLACK));

    c.bench_function("diff_single_change_80x25", |b_iter| {
        b_iter.iter(|| GridDiff::compute(black_box(&a), black_box(&b), None));
    });
}

fn diff_scattered(c: &mut Criterion) {
    let a = Grid::new();
    let mut b = Grid::new();
    for row in 0..25 {
        for col in (0..80).step_by(3) {
            b.set(row, col, Cell::new('*', Rgb::BLUE, Rgb::BLACK));
        }
    }

    c.bench_function("diff_scattered_changes_80x25", |b_iter| {
        b_iter.iter(|| GridDiff::compute(black_box(&a), black_box(&b), None));
    });
}

fn diff_quantized(c: &mut Criterion) {
    // Nearby colors collapse to the same palette entry and must not count.
    let a = filled('#', Rgb::new(200, 10, 10));
    let b = filled('#', Rgb::new(201, 11, 9));
    let quantize = Quantize::Xterm256;
    let transform: Option<&dyn ColorTransform> = Some(&quantize);

    c.bench_function("diff_quantized_near_colors_80x25", |b_iter| {
        b_iter.iter(|| GridDiff::compute(black_box(&a), black_box(&b), transform));
    });
}

fn flush_full_repaint(c: &mut Criterion) {
    let grid = filled('#', Rgb::GREEN);

    c.bench_function("flush_full_repaint_80x25", |b_iter| {
        let mut term = TerminalBuffer::new();
        term.attach(String::new());
        b_iter.iter(|| {
            term.invalidate();
            black_box(term.flush(black_box(&grid), None));
            if let Some(sink) = term.sink_mut() {
                sink.clear();
            }
        });
    });
}

fn flush_alternating(c: &mut Criterion) {
    let even = filled('#', Rgb::GREEN);
    let mut odd = even.clone();
    for col in 0..80 {
        odd.set(12, col, Cell::new('=', Rgb::WHITE, Rgb::BLUE));
    }

    c.bench_function("flush_alternating_row_80x25", |b_iter| {
        let mut term = TerminalBuffer::new();
        term.attach(String::new());
        term.flush(&even, None);
        let mut flip = false;
        b_iter.iter(|| {
            flip = !flip;
            let grid = if flip { &odd } else { &even };
            black_box(term.flush(black_box(grid), None));
            if let Some(sink) = term.sink_mut() {
                sink.clear();
            }
        });
    });
}

criterion_group!(
    benches,
    diff_identical,
    diff_single_change,
    diff_scattered,
    diff_quantized,
    flush_full_repaint,
    flush_alternating,
);
criterion_main!(benches);
