use approx::assert_relative_eq;
use biosig::runs::find_runs;
use biosig::signal::filter::{
    filter_channel_with_gaps, filter_with_gaps, FilterMode, FilterSpec, GapFilterOptions,
};
use biosig::signal::spectral::{estimate_spectrum_with_gaps, periodogram, GapWelchConfig, PerWindowPsd};
use biosig::signal::windows::WindowSpec;
use biosig::Diagnostic;
use ndarray::{array, Array2, Axis};

/// 2nd order Butterworth low-pass, cutoff at 0.2 of Nyquist.
fn butter2() -> FilterSpec {
    FilterSpec::try_new(
        vec![0.067_455_273_889_071_9, 0.134_910_547_778_143_8, 0.067_455_273_889_071_9],
        vec![1.0, -1.142_980_502_539_901, 0.412_801_598_096_188_8],
    )
    .expect("butterworth coefficients are valid")
}

fn channel_with_interior_gap() -> Vec<f64> {
    let mut x: Vec<f64> = (0..10).map(|i| (i as f64 * 0.6).sin() + 2.0).collect();
    x[4..7].iter_mut().for_each(|v| *v = f64::NAN);
    x
}

#[test]
fn runs_of_a_sequence_are_reported_zero_based() {
    let x = array![1., 1., 1., 2., 3., 3., 4., 5., 5., 5., 5., 6., 7., 7., 8.];
    let table = find_runs(&x, None).unwrap();

    let one = table.of_value(1.).next().expect("run of ones");
    assert_eq!((one.start, one.end, one.len), (0, 2, 3));
    let five = table.of_value(5.).next().expect("run of fives");
    assert_eq!((five.start, five.end, five.len), (7, 10, 4));
    let singles = table.iter().filter(|r| r.len == 1).count();
    assert_eq!(singles, 4);
}

#[test]
fn bounded_gap_is_interpolated_under_zero_phase_filtering() {
    let x = channel_with_interior_gap();
    let options = GapFilterOptions {
        mode: FilterMode::ZeroPhase,
        max_gap_len: Some(5),
        ..Default::default()
    };
    let out = filter_channel_with_gaps(&butter2(), &x, options).unwrap();
    assert_eq!(out.values.len(), 10);
    assert!(out.values.iter().all(|v| v.is_finite()));
    assert!(out.diagnostics.is_empty());
}

#[test]
fn gap_longer_than_bound_stays_missing() {
    let x = channel_with_interior_gap();
    let options = GapFilterOptions {
        mode: FilterMode::ZeroPhase,
        max_gap_len: Some(1),
        ..Default::default()
    };
    let out = filter_channel_with_gaps(&butter2(), &x, options).unwrap();
    let missing: Vec<usize> = (0..10).filter(|&i| out.values[i].is_nan()).collect();
    assert_eq!(missing, vec![4, 5, 6]);
    // Both remaining segments are shorter than the 6 samples a zero-phase 2nd order pass needs.
    assert_eq!(out.diagnostics.len(), 2);
    assert_eq!(&out.values[..4], &x[..4]);
    assert_eq!(&out.values[7..], &x[7..]);
}

#[test]
fn spectrum_pools_windows_across_a_long_gap() {
    let fs = 100.0;
    let mut signal = Array2::from_shape_fn((1000, 1), |(i, _)| {
        (2.0 * std::f64::consts::PI * 12.5 * i as f64 / fs).sin()
    });
    signal
        .column_mut(0)
        .slice_mut(ndarray::s![500..551])
        .fill(f64::NAN);

    let mut config = GapWelchConfig::new(fs, WindowSpec::hann(128));
    config.noverlap = Some(64);
    config.max_gap_len = Some(10);
    config.keep_windows = true;
    let out = estimate_spectrum_with_gaps(&signal, config).unwrap();
    assert!(out.diagnostics.is_empty());

    let pool = match out.per_window {
        Some(PerWindowPsd::Single(pool)) => pool,
        other => panic!("expected a single pool, got {other:?}"),
    };
    // 500 samples before the gap and 449 after give six windows each.
    assert_eq!(pool.dim(), (65, 12));

    let mean = pool.mean_axis(Axis(1)).unwrap();
    out.psd
        .column(0)
        .iter()
        .zip(mean.iter())
        .for_each(|(r, e)| assert_relative_eq!(*r, *e, max_relative = 1e-12));

    let x = signal.column(0).to_vec();
    let hann = WindowSpec::hann(128);
    let (_, first) = periodogram(&x[..128], &hann, None, fs).unwrap();
    let (_, after_gap) = periodogram(&x[551..679], &hann, None, fs).unwrap();
    pool.column(0)
        .iter()
        .zip(first.iter())
        .for_each(|(r, e)| assert_relative_eq!(*r, *e, max_relative = 1e-12));
    pool.column(6)
        .iter()
        .zip(after_gap.iter())
        .for_each(|(r, e)| assert_relative_eq!(*r, *e, max_relative = 1e-12));
}

#[test]
fn all_missing_channel_gives_nan_spectrum() {
    let signal = Array2::from_elem((1000, 1), f64::NAN);
    let mut config = GapWelchConfig::new(100.0, WindowSpec::hann(128));
    config.keep_windows = true;
    let out = estimate_spectrum_with_gaps(&signal, config).unwrap();

    assert!(out.psd.iter().all(|v| v.is_nan()));
    assert!(out.frequencies.iter().all(|v| v.is_finite()));
    match out.per_window {
        Some(PerWindowPsd::Single(pool)) => assert_eq!(pool.dim(), (65, 0)),
        other => panic!("expected a single empty pool, got {other:?}"),
    }
    assert_eq!(out.diagnostics, vec![Diagnostic::AllMissing { channel: 0 }]);

    let filtered = filter_with_gaps(&butter2(), &signal, GapFilterOptions::default()).unwrap();
    assert!(filtered.signal.iter().all(|v| v.is_nan()));
}
