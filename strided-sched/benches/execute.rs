use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;
use std::time::{Duration, Instant};
use strided_sched::{execute, schedule_transpose, DType, Permutation, RvvRegistry, TransposeOp};

/// Quartiles of wall time over the timed runs.
struct Timing {
    p25: Duration,
    p50: Duration,
    p75: Duration,
}

impl Timing {
    fn from_samples(mut samples: Vec<Duration>) -> Self {
        samples.sort();
        let at = |q: usize| samples[(samples.len() - 1) * q / 100];
        Self {
            p25: at(25),
            p50: at(50),
            p75: at(75),
        }
    }
}

fn time_kernel(label: &str, iters: usize, tiles: usize, bytes: usize, mut f: impl FnMut()) {
    f();
    let samples = (0..iters)
        .map(|_| {
            let t0 = Instant::now();
            f();
            t0.elapsed()
        })
        .collect();
    let t = Timing::from_samples(samples);
    let ms = |d: Duration| d.as_secs_f64() * 1e3;
    let ns_per_tile = t.p50.as_secs_f64() * 1e9 / tiles as f64;
    let gbps = bytes as f64 / t.p50.as_secs_f64() / 1e9;
    println!(
        "  {label:12} p50 {:8.3} ms [p25 {:.3}, p75 {:.3}]  {ns_per_tile:7.2} ns/tile  {gbps:6.2} GB/s",
        ms(t.p50),
        ms(t.p25),
        ms(t.p75),
    );
}

fn case(registry: &RvvRegistry, shape: &[usize], order: &[usize]) {
    let perm = Permutation::new(order.to_vec());
    let op = TransposeOp::new(shape.to_vec(), &perm, DType::F32).unwrap();
    let total = op.output_len();
    let mut rng = StdRng::seed_from_u64(0);
    let src: Vec<f32> = (0..total).map(|_| rng.gen()).collect();
    let mut dst = vec![0.0f32; total];

    let t0 = Instant::now();
    let schedule = schedule_transpose(&op, &perm, registry).unwrap();
    let plan_us = t0.elapsed().as_secs_f64() * 1e6;
    let tiles = schedule.outer().extent;
    println!(
        "{shape:?} perm {order:?}: {} x {tiles} tiles (planned in {plan_us:.1} us)",
        schedule.intrinsic()
    );

    let bytes = 2 * total * std::mem::size_of::<f32>();
    time_kernel("execute", 10, tiles, bytes, || {
        execute(&schedule, &op, &perm, black_box(&src), &mut dst).unwrap();
        black_box(&dst);
    });

    #[cfg(feature = "parallel")]
    time_kernel("execute_par", 10, tiles, bytes, || {
        strided_sched::execute_par(&schedule, &op, &perm, black_box(&src), &mut dst).unwrap();
        black_box(&dst);
    });
}

fn main() {
    let registry = RvvRegistry::default();
    println!("target: {}", registry.target().name);

    case(&registry, &[1024, 1024], &[1, 0]);
    case(&registry, &[64, 64, 64], &[2, 0, 1]);
    case(&registry, &[32, 32, 32, 32], &[0, 1, 3, 2]);
    case(&registry, &[32, 32, 32, 32], &[3, 2, 1, 0]);
}
