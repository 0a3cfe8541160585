use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hifitime::{Epoch, Unit};

use flightframe::capabilities::Capabilities;
use flightframe::collection::{GroupOptions, GroupSpec};
use flightframe::frame::{Column, Frame, RowIndex};
use flightframe::pipeline::simplifier::{RdpSimplifier, SimplifyOutput, SimplifyParams};
use flightframe::pipeline::splitter::TimeGapSplitter;
use flightframe::pipeline::Pipeline;
use flightframe::roles::RoleOverrides;
use flightframe::trajectory::{Interpolation, Trajectory};

/// `flights` interleaved flights of `samples` points each, sampled every
/// second with a 20 minute hole in the middle of every flight.
fn build_traffic(flights: usize, samples: usize) -> Trajectory {
    let t0 = Epoch::from_gregorian_tai_at_midnight(2024, 6, 1);
    let n = flights * samples;

    let mut callsign = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);
    let mut lon = Vec::with_capacity(n);
    let mut alt = Vec::with_capacity(n);
    let mut time = Vec::with_capacity(n);
    for i in 0..samples {
        let hole = if i >= samples / 2 { 1200 } else { 0 };
        for f in 0..flights {
            let s = i as f64;
            callsign.push(format!("FL{f:04}"));
            lat.push(40.0 + f as f64 * 0.1 + 0.001 * s + 0.0005 * (s * 0.05).sin());
            lon.push(-3.0 + 0.002 * s + 0.0005 * (s * 0.03).cos());
            alt.push(10_000.0 + 5.0 * s);
            time.push(t0 + Unit::Second * (i as i64 + hole));
        }
    }

    let frame = Frame::from_columns([
        ("callsign", Column::from(callsign)),
        ("lat", Column::from(lat)),
        ("lon", Column::from(lon)),
        ("alt", Column::from(alt)),
    ])
    .and_then(|f| f.with_index(RowIndex::time("time", time)))
    .expect("valid frame");
    Trajectory::new(frame, &RoleOverrides::default()).expect("lat/lon present")
}

fn bench_split(c: &mut Criterion) {
    let traffic = build_traffic(50, 400);
    let flights = traffic
        .group_by(GroupSpec::keys(["callsign"]), GroupOptions::default())
        .expect("callsign column");
    let splitter = TimeGapSplitter::new(Unit::Minute * 10).expect("positive gap");

    c.bench_function("split/single_20k_rows", |b| {
        b.iter(|| splitter.split(black_box(&traffic)).expect("time index"))
    });
    c.bench_function("split/collection_50_flights", |b| {
        b.iter(|| splitter.split_collection(black_box(&flights)).expect("time index"))
    });
}

fn bench_simplify(c: &mut Criterion) {
    let flight = build_traffic(1, 5_000);
    let capabilities = Capabilities::detect();

    for (name, output) in [
        ("simplify/geometry_5k", SimplifyOutput::Geometry),
        ("simplify/rows_5k", SimplifyOutput::Rows),
    ] {
        let params = SimplifyParams::builder()
            .tolerance(1e-4)
            .preserve_topology(false)
            .output(output)
            .build()
            .expect("valid tolerance");
        let Ok(simplifier) = RdpSimplifier::new(params, &capabilities) else {
            continue;
        };
        c.bench_function(name, |b| {
            b.iter_batched(
                || flight.clone(),
                |t| {
                    Pipeline::new(t)
                        .pipe(simplifier.clone())
                        .and_then(|p| p.eval())
                        .expect("simplification")
                },
                BatchSize::LargeInput,
            )
        });
    }
}

fn bench_resample(c: &mut Criterion) {
    let flight = build_traffic(1, 2_000);
    c.bench_function("resample/linear_2s", |b| {
        b.iter(|| {
            flight
                .resample(black_box(Unit::Second * 2), Interpolation::Linear)
                .expect("time index")
        })
    });
}

criterion_group!(benches, bench_split, bench_simplify, bench_resample);
criterion_main!(benches);
