use biosig::kernel::KernelLifecycle;
use biosig::signal::spectral::{GapWelchConfig, GapWelchKernel};
use biosig::signal::traits::GapWelch1D;
use biosig::signal::windows::WindowSpec;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{s, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gap_welch(c: &mut Criterion) {
    const FS: f64 = 128.0;
    let mut rng = StdRng::seed_from_u64(11);
    let mut signal = Array2::from_shape_fn((1 << 16, 4), |(i, ch)| {
        (2.0 * std::f64::consts::PI * (5.0 + 3.0 * ch as f64) * i as f64 / FS).sin()
    });
    for _ in 0..32 {
        let ch = rng.random_range(0..4);
        let len = rng.random_range(1..=200);
        let start = rng.random_range(0..(1 << 16) - len);
        signal
            .slice_mut(s![start..start + len, ch])
            .fill(f64::NAN);
    }

    for nperseg in [256, 1024] {
        let mut config = GapWelchConfig::new(FS, WindowSpec::hann(nperseg));
        config.max_gap_len = Some(16);
        let kernel = GapWelchKernel::try_new(config).expect("welch kernel config should be valid");

        c.bench_with_input(
            BenchmarkId::new("gap_welch", nperseg),
            &signal,
            |bench, sig| bench.iter(|| kernel.run_channels(black_box(sig))),
        );
    }
}

criterion_group!(benches, gap_welch);
criterion_main!(benches);
