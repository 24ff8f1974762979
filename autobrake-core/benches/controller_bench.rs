#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::Criterion;

use autobrake_core::{CollisionController, InProcessBus, ObstacleDetected, SpeedUpdate};

fn bench_controller_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller_dispatch");

    for brake_subscribers in [0usize, 1, 8] {
        group.throughput(criterion::Throughput::Elements(2));
        group.bench_function(format!("brake_subscribers_{}", brake_subscribers), |b| {
            let bus = Arc::new(InProcessBus::new());
            let _controller = CollisionController::new(bus.clone());
            for _ in 0..brake_subscribers {
                bus.subscribe_brake(Box::new(|cmd: &autobrake_core::BrakeCommand| {
                    criterion::black_box(cmd.time_to_collision_s);
                }));
            }

            b.iter(|| {
                bus.publish_speed(SpeedUpdate::new(criterion::black_box(30.0)));
                bus.publish_obstacle(ObstacleDetected::new(criterion::black_box(45.0), 0.0));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_controller_dispatch);
criterion_main!(benches);
