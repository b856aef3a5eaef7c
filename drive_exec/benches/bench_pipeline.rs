//! # Pipeline Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use drive_lib::{
    autopilot::{Autopilot, Params},
    frame::{Frame, FRAME_HEIGHT, FRAME_WIDTH},
    lane_det::{self, BoundaryPair},
    path_plan::{self, WaypointType},
};

fn pipeline_benchmark(c: &mut Criterion) {
    // ---- Build a gently curving road frame ----

    let mut frame = Frame::filled([0, 0, 0]);
    for r in 0..FRAME_HEIGHT {
        let dist = 67usize.saturating_sub(r) as f64;
        let shift = (0.005 * dist * dist) as usize;
        for c in (20 + shift)..=(77 + shift).min(FRAME_WIDTH - 1) {
            frame.set_pixel(r, c, [100, 100, 100]);
        }
    }

    let ld_params = lane_det::Params::default();
    let (boundaries, _) = lane_det::extract(&frame, &ld_params, BoundaryPair::default());

    // ---- Benchmarks ----

    c.bench_function("lane_det_extract", |b| {
        b.iter(|| lane_det::extract(&frame, &ld_params, BoundaryPair::default()))
    });

    let pp_params = path_plan::Params::default();
    for way_type in [WaypointType::Center, WaypointType::Smooth].iter() {
        c.bench_function(&format!("path_plan_predict_{:?}", way_type), |b| {
            b.iter(|| {
                path_plan::predict(
                    boundaries.left.as_ref(),
                    boundaries.right.as_ref(),
                    pp_params.num_waypoints,
                    *way_type,
                    pp_params.smoothing_beta,
                    &pp_params.optimiser
                )
            })
        });
    }

    let mut autopilot = Autopilot::new(Params::default()).unwrap();
    c.bench_function("autopilot_tick", |b| {
        b.iter(|| autopilot.tick(&frame, 20.0))
    });
}

criterion_group!(benches, pipeline_benchmark);
criterion_main!(benches);
