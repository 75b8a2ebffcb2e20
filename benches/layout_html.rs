use criterion::{black_box, criterion_group, criterion_main, Criterion};

use plotshot::embed::layout_html;
use plotshot::layout::{Layout, Plot};
use plotshot::Resources;

fn bench_single_plot(c: &mut Criterion) {
    let layout = Layout::Plot(Plot::new("bench", 640, 480));
    let resources = Resources::default();

    c.bench_function("layout_html_single_plot", |b| {
        b.iter(|| layout_html(black_box(&layout), &resources, "bench", None, None))
    });
}

fn bench_grid(c: &mut Criterion) {
    let layout = Layout::column(
        (0..8)
            .map(|row| {
                Layout::row(
                    (0..8)
                        .map(|col| {
                            Layout::Plot(Plot::new(format!("plot {} {}", row, col), 200, 150))
                        })
                        .collect(),
                )
            })
            .collect(),
    );
    let resources = Resources::default();

    c.bench_function("layout_html_grid_8x8", |b| {
        b.iter(|| layout_html(black_box(&layout), &resources, "bench", None, None))
    });
}

criterion_group!(benches, bench_single_plot, bench_grid);
criterion_main!(benches);
