use biosig::kernel::KernelLifecycle;
use biosig::signal::filter::{
    FilterMode, FilterSpec, GapFilterConfig, GapFilterKernel, GapFilterOptions,
};
use biosig::signal::traits::GapFilter1D;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noisy multi-tone recording with randomly placed dropouts of 1 to `max_dropout` samples.
fn recording_with_dropouts(
    rng: &mut StdRng,
    samples: usize,
    channels: usize,
    dropouts: usize,
    max_dropout: usize,
) -> Array2<f64> {
    let mut x = Array2::from_shape_fn((samples, channels), |(i, c)| {
        let t = i as f64 / 250.0;
        (2.0 * std::f64::consts::PI * (1.2 + c as f64) * t).sin()
            + 0.3 * (2.0 * std::f64::consts::PI * 50.0 * t).sin()
    });
    x.mapv_inplace(|v| v + rng.random_range(-0.05..0.05));
    for _ in 0..dropouts {
        let c = rng.random_range(0..channels);
        let len = rng.random_range(1..=max_dropout);
        let start = rng.random_range(0..samples - len);
        x.column_mut(c)
            .slice_mut(ndarray::s![start..start + len])
            .fill(f64::NAN);
    }
    x
}

fn gap_filter(c: &mut Criterion) {
    // 4th order Butterworth low-pass at 40 Hz, fs = 250 Hz.
    let b = vec![
        0.046_582_906_636_443_66,
        0.186_331_626_545_774_6,
        0.279_497_439_818_661_9,
        0.186_331_626_545_774_6,
        0.046_582_906_636_443_66,
    ];
    let a = vec![
        1.0,
        -0.782_095_198_023_338_1,
        0.679_978_526_916_300_1,
        -0.182_675_697_753_033_6,
        0.030_118_875_043_169_3,
    ];
    let filter = FilterSpec::try_new(b, a).expect("benchmark coefficients should be valid");

    let mut rng = StdRng::seed_from_u64(7);
    let signal = recording_with_dropouts(&mut rng, 1 << 15, 8, 64, 40);

    for mode in [FilterMode::Causal, FilterMode::ZeroPhase] {
        let kernel = GapFilterKernel::try_new(GapFilterConfig {
            filter: filter.clone(),
            options: GapFilterOptions {
                mode,
                max_gap_len: Some(10),
                ..Default::default()
            },
        })
        .expect("gap filter kernel config should be valid");

        c.bench_with_input(
            BenchmarkId::new("gap_filter", format!("{mode:?}")),
            &signal,
            |bench, sig| bench.iter(|| kernel.run_channels(black_box(sig))),
        );
    }
}

criterion_group!(benches, gap_filter);
criterion_main!(benches);
