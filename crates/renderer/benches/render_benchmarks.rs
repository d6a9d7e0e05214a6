//! Benchmarks for the renderer crate: rasterization, reprojection and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks
//! Or a single group: cargo bench --package renderer -- png_encoding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo_types::{LineString, Polygon};
use map_common::{
    default_style_for, Color, Extent, Feature, Filter, MemoryFeatureSource, SrsId,
    StyleDefinition, StyleRule, SymbolSpec,
};
use rand::Rng;
use renderer::{png, RenderRequest};
use std::sync::Arc;
use test_utils::{create_checkerboard, create_point_grid, create_radial_lines};

const WORLD: (f64, f64, f64, f64) = (-180.0, -85.0, 180.0, 85.0);

fn checker_style() -> StyleDefinition {
    StyleDefinition::new(
        "checkers",
        None,
        Some(Color::rgb(40, 40, 40)),
        vec![
            StyleRule::new(Filter::eq("class", "even"), SymbolSpec::fill(Color::rgb(205, 235, 176))),
            StyleRule::new(Filter::eq("class", "odd"), SymbolSpec::fill(Color::rgb(170, 211, 223))),
        ],
    )
    .unwrap()
}

/// Jittered star-shaped polygons scattered over the world, 64 vertices each.
fn generate_random_polygons(count: usize) -> MemoryFeatureSource {
    let mut rng = rand::thread_rng();
    let mut source = MemoryFeatureSource::new(SrsId::wgs84());
    for i in 0..count {
        let cx = rng.gen_range(-170.0..170.0);
        let cy = rng.gen_range(-75.0..75.0);
        let ring: Vec<(f64, f64)> = (0..64)
            .map(|k| {
                let angle = k as f64 / 64.0 * std::f64::consts::TAU;
                let r = rng.gen_range(2.0..8.0);
                (cx + r * angle.cos(), cy + r * angle.sin())
            })
            .collect();
        let polygon = Polygon::new(LineString::from(ring), vec![]);
        source.push(Feature::new(polygon).with_attribute("id", i as i64));
    }
    source
}

/// Random RGBA noise: forces the truecolor encoder.
fn generate_rgba_data(width: u32, height: u32) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    let mut data = vec![0u8; (width * height * 4) as usize];
    for chunk in data.chunks_mut(4) {
        chunk[0] = rng.gen();
        chunk[1] = rng.gen();
        chunk[2] = rng.gen();
        chunk[3] = 255;
    }
    data
}

fn open(style: StyleDefinition, source: MemoryFeatureSource, srs: &SrsId) -> RenderRequest {
    RenderRequest::open(Arc::new(style), Arc::new(source), srs).unwrap()
}

// =============================================================================
// RASTERIZATION
// =============================================================================

fn bench_render_polygons(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_polygons");
    let extent = Extent::from(WORLD);
    let request = open(
        checker_style(),
        create_checkerboard(SrsId::wgs84(), extent, 32, 16),
        &SrsId::wgs84(),
    );

    for size in [256u32, 512, 1024] {
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(
            BenchmarkId::new("checkerboard", format!("{}x{}", size, size)),
            &size,
            |b, &size| {
                b.iter(|| request.render_extent(black_box(&extent), (size, size)).unwrap());
            },
        );
    }

    for count in [100usize, 1000] {
        let source = generate_random_polygons(count);
        let style = default_style_for(&source, (200, 0, 0));
        let request = open(style, source, &SrsId::wgs84());
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("random_polygons", count), &count, |b, _| {
            b.iter(|| request.render_extent(black_box(&extent), (512, 256)).unwrap());
        });
    }

    group.finish();
}

fn bench_render_lines_and_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_lines_points");
    let extent = Extent::new(-10.0, -10.0, 10.0, 10.0);

    let lines = create_radial_lines(SrsId::wgs84(), extent, 360);
    let request = open(default_style_for(&lines, (0, 0, 255)), lines, &SrsId::wgs84());
    group.bench_function("radial_lines_360", |b| {
        b.iter(|| request.render_extent(black_box(&extent), (512, 512)).unwrap());
    });

    let points = create_point_grid(SrsId::wgs84(), extent, 40);
    let request = open(default_style_for(&points, (0, 0, 255)), points, &SrsId::wgs84());
    group.bench_function("point_grid_1600", |b| {
        b.iter(|| request.render_extent(black_box(&extent), (512, 512)).unwrap());
    });

    group.finish();
}

// =============================================================================
// REPROJECTION
// =============================================================================

fn bench_reprojected_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("reprojected_render");
    let source = generate_random_polygons(500);
    let style = default_style_for(&source, (200, 0, 0));

    let identity = open(style.clone(), source.clone(), &SrsId::wgs84());
    group.bench_function("4326_to_4326", |b| {
        b.iter(|| identity.render_extent(&Extent::from(WORLD), (512, 256)).unwrap());
    });

    let mercator = open(style, source, &SrsId::web_mercator());
    let extent = Extent::new(-20037508.34, -19971868.88, 20037508.34, 19971868.88);
    group.bench_function("4326_to_3857", |b| {
        b.iter(|| mercator.render_extent(black_box(&extent), (512, 512)).unwrap());
    });

    group.finish();
}

fn bench_parallel_extents(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_extents");
    let extent = Extent::from(WORLD);
    let request = open(
        checker_style(),
        create_checkerboard(SrsId::wgs84(), extent, 32, 16),
        &SrsId::wgs84(),
    );

    // A 4x4 tile grid over the world
    let jobs: Vec<(Extent, (u32, u32))> = (0..16)
        .map(|i| {
            let (col, row) = ((i % 4) as f64, (i / 4) as f64);
            let w = extent.width() / 4.0;
            let h = extent.height() / 4.0;
            let min_x = extent.min_x + col * w;
            let min_y = extent.min_y + row * h;
            (Extent::new(min_x, min_y, min_x + w, min_y + h), (256, 256))
        })
        .collect();

    group.bench_function("sequential_16_tiles", |b| {
        b.iter(|| {
            for (extent, size) in &jobs {
                black_box(request.render_extent(extent, *size).unwrap());
            }
        });
    });
    group.bench_function("render_extents_16_tiles", |b| {
        b.iter(|| black_box(request.render_extents(&jobs)));
    });

    group.finish();
}

// =============================================================================
// PNG ENCODING
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");
    let sizes = [256u32, 512, 1024];

    for size in sizes {
        let data = generate_rgba_data(size, size);
        group.throughput(Throughput::Bytes((size * size * 4) as u64));
        group.bench_with_input(
            BenchmarkId::new("rgba_random", format!("{}x{}", size, size)),
            &data,
            |b, data| {
                b.iter(|| png::create_png(black_box(data), size, size).unwrap());
            },
        );
    }

    // Rendered map tiles have few colors and take the indexed path
    let extent = Extent::from(WORLD);
    let request = open(
        checker_style(),
        create_checkerboard(SrsId::wgs84(), extent, 32, 16),
        &SrsId::wgs84(),
    );
    for size in sizes {
        let tile = request.render_extent(&extent, (size, size)).unwrap();
        group.throughput(Throughput::Bytes((size * size * 4) as u64));
        group.bench_with_input(
            BenchmarkId::new("auto_map_tile", format!("{}x{}", size, size)),
            &tile,
            |b, tile| {
                b.iter(|| png::create_png_auto(black_box(tile.pixels()), size, size).unwrap());
            },
        );
        group.bench_with_input(
            BenchmarkId::new("rgba_map_tile", format!("{}x{}", size, size)),
            &tile,
            |b, tile| {
                b.iter(|| png::create_png(black_box(tile.pixels()), size, size).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render_polygons,
    bench_render_lines_and_points,
    bench_reprojected_render,
    bench_parallel_extents,
    bench_png_encoding,
);
criterion_main!(benches);
