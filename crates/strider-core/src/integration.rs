//! Quadrature over non-uniformly sampled trajectories.

/// Trapezoidal integral of `values` sampled at `times`:
/// `Σ 0.5·(f_k + f_{k+1})·(t_{k+1} − t_k)`.
///
/// Sequences with fewer than two samples integrate to `0.0`. Repeated time
/// stamps (event samples) contribute nothing. Both slices must have the same
/// length.
pub fn trapezoidal_integration(times: &[f64], values: &[f64]) -> f64 {
    assert_eq!(
        times.len(),
        values.len(),
        "trapezoidal_integration: {} times vs {} values",
        times.len(),
        values.len()
    );
    times
        .windows(2)
        .zip(values.windows(2))
        .map(|(t, f)| 0.5 * (f[0] + f[1]) * (t[1] - t[0]))
        .sum()
}

/// Trapezoidal integral of a per-sample quantity computed by `f`.
///
/// Avoids materializing the value trajectory when the integrand is derived
/// from a richer per-sample record.
pub fn trapezoidal_integration_by<T>(times: &[f64], samples: &[T], f: impl Fn(&T) -> f64) -> f64 {
    assert_eq!(times.len(), samples.len());
    let mut total = 0.0;
    let mut previous: Option<(f64, f64)> = None;
    for (&t, sample) in times.iter().zip(samples) {
        let value = f(sample);
        if let Some((t_prev, v_prev)) = previous {
            total += 0.5 * (v_prev + value) * (t - t_prev);
        }
        previous = Some((t, value));
    }
    total
}
