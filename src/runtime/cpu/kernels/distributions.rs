//! Per-element distribution samplers for CPU
//!
//! Each function turns one lane's bit stream plus that lane's parameter
//! values into a single draw (or one vector for dirichlet). Parameters are
//! validated by the caller before any stream is created; the samplers only
//! see structurally valid values or non-finite ones, and map the latter to
//! NaN.

use super::transforms::{
    LnGamma, ln_standard_gamma, raw_uniform, standard_exponential, standard_gamma, standard_normal,
    standard_uniform,
};
use crate::error::{Error, Result};
use rand::RngCore;
use rand_distr::{Binomial, Distribution};
use smallvec::SmallVec;

/// Below this mean count (`n * min(p, 1 - p)`) binomial uses inversion
pub(crate) const BINOMIAL_INVERSION_THRESHOLD: f64 = 30.0;

#[inline]
fn all_finite(params: &[f64]) -> bool {
    params.iter().all(|v| v.is_finite())
}

/// Largest f64 strictly below `x`
#[inline]
pub(crate) fn prev_f64(x: f64) -> f64 {
    if x.is_nan() || x == f64::NEG_INFINITY {
        return x;
    }
    if x == 0.0 {
        return -f64::from_bits(1);
    }
    let bits = x.to_bits();
    if x > 0.0 {
        f64::from_bits(bits - 1)
    } else {
        f64::from_bits(bits + 1)
    }
}

/// Largest f32 strictly below `x`, widened back to f64
#[inline]
pub(crate) fn prev_f32(x: f64) -> f64 {
    let h = x as f32;
    if (h as f64) < x {
        return h as f64;
    }
    if h == 0.0 {
        return -f32::from_bits(1) as f64;
    }
    let bits = h.to_bits();
    let below = if h > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    };
    below as f64
}

/// Smallest f32 at or above `x`, widened back to f64
#[inline]
pub(crate) fn ceil_f32(x: f64) -> f64 {
    let h = x as f32;
    if h as f64 >= x {
        return h as f64;
    }
    if h == 0.0 {
        return f32::from_bits(1) as f64;
    }
    let bits = h.to_bits();
    let above = if h > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    };
    above as f64
}

/// Uniform on [low, high)
///
/// `narrow` selects f32 as the storage precision: values that round below
/// `low` are raised to the smallest f32 at or above it, and values that round
/// onto `high` are pulled down to the largest f32 below it. An interval that
/// holds no f32 at all yields that largest f32 below `high`.
#[inline]
pub(crate) fn uniform<R: RngCore>(rng: &mut R, low: f64, high: f64, narrow: bool) -> f64 {
    if !all_finite(&[low, high]) {
        return f64::NAN;
    }
    let v = low + (high - low) * raw_uniform(rng);
    if narrow {
        let v = if ((v as f32) as f64) < low {
            ceil_f32(low)
        } else {
            v
        };
        if (v as f32) as f64 >= high {
            prev_f32(high)
        } else {
            v
        }
    } else if v >= high {
        prev_f64(high)
    } else {
        v
    }
}

#[inline]
pub(crate) fn normal<R: RngCore>(rng: &mut R, loc: f64, scale: f64) -> f64 {
    if !all_finite(&[loc, scale]) {
        return f64::NAN;
    }
    loc + scale * standard_normal(rng)
}

#[inline]
pub(crate) fn lognormal<R: RngCore>(rng: &mut R, mean: f64, sigma: f64) -> f64 {
    if !all_finite(&[mean, sigma]) {
        return f64::NAN;
    }
    (mean + sigma * standard_normal(rng)).exp()
}

/// Gumbel by inversion: `loc - scale * ln(-ln U)`
#[inline]
pub(crate) fn gumbel<R: RngCore>(rng: &mut R, loc: f64, scale: f64) -> f64 {
    if !all_finite(&[loc, scale]) {
        return f64::NAN;
    }
    let u = standard_uniform(rng);
    loc - scale * (-u.ln()).ln()
}

/// Laplace by inversion: `loc - scale * sign(U') * ln(1 - 2|U'|)`, `U' = U - 0.5`
#[inline]
pub(crate) fn laplace<R: RngCore>(rng: &mut R, loc: f64, scale: f64) -> f64 {
    if !all_finite(&[loc, scale]) {
        return f64::NAN;
    }
    // Open U keeps |U'| < 0.5, so the log argument stays positive
    let u = standard_uniform(rng) - 0.5;
    loc - scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

#[inline]
pub(crate) fn exponential<R: RngCore>(rng: &mut R, scale: f64) -> f64 {
    if !scale.is_finite() {
        return f64::NAN;
    }
    scale * standard_exponential(rng)
}

pub(crate) fn gamma<R: RngCore>(rng: &mut R, shape: f64, scale: f64) -> Result<f64> {
    if !all_finite(&[shape, scale]) {
        return Ok(f64::NAN);
    }
    Ok(scale * standard_gamma(rng, shape)?)
}

/// Normalize log-domain gamma draws into `out` so it sums to one
///
/// Draws are shifted by their maximum before exponentiating. When every
/// draw is `-inf` the largest one by rank takes all the mass.
fn ln_gamma_weights(draws: &[LnGamma], out: &mut [f64]) {
    let m = draws.iter().map(|d| d.value).fold(f64::NEG_INFINITY, f64::max);
    if m == f64::NEG_INFINITY {
        let top = draws.iter().map(|d| d.rank).fold(f64::NEG_INFINITY, f64::max);
        for (o, d) in out.iter_mut().zip(draws) {
            *o = if d.rank == top { 1.0 } else { 0.0 };
        }
    } else {
        for (o, d) in out.iter_mut().zip(draws) {
            *o = (d.value - m).exp();
        }
    }

    let sum: f64 = out.iter().sum();
    for o in out.iter_mut() {
        *o /= sum;
    }
}

/// Beta via two gamma draws: `X / (X + Y)`
///
/// When either shape is below one the ratio is formed from log-gammas,
/// so draws that underflow in linear space still give a value in [0, 1].
pub(crate) fn beta<R: RngCore>(rng: &mut R, a: f64, b: f64) -> Result<f64> {
    if !all_finite(&[a, b]) {
        return Ok(f64::NAN);
    }
    if a < 1.0 || b < 1.0 {
        let draws = [ln_standard_gamma(rng, a)?, ln_standard_gamma(rng, b)?];
        let mut weights = [0.0; 2];
        ln_gamma_weights(&draws, &mut weights);
        Ok(weights[0])
    } else {
        let x = standard_gamma(rng, a)?;
        let y = standard_gamma(rng, b)?;
        Ok(x / (x + y))
    }
}

/// Fill `out` with one Dirichlet(alpha) vector
///
/// `alpha` and `out` have the same length. A non-finite concentration turns
/// the whole vector into NaN.
pub(crate) fn dirichlet<R: RngCore>(rng: &mut R, alpha: &[f64], out: &mut [f64]) -> Result<()> {
    debug_assert_eq!(alpha.len(), out.len());
    if !all_finite(alpha) {
        out.fill(f64::NAN);
        return Ok(());
    }

    if alpha.iter().any(|&a| a < 1.0) {
        let draws = alpha
            .iter()
            .map(|&a| ln_standard_gamma(rng, a))
            .collect::<Result<SmallVec<[LnGamma; 8]>>>()?;
        ln_gamma_weights(&draws, out);
        return Ok(());
    }

    for (o, &a) in out.iter_mut().zip(alpha) {
        *o = standard_gamma(rng, a)?;
    }
    let sum: f64 = out.iter().sum();
    for o in out.iter_mut() {
        *o /= sum;
    }
    Ok(())
}

/// Binomial by sequential inversion of the CDF, for `n * p` below the threshold
///
/// Requires `0 < p <= 0.5`. The search restarts past `np + 10 sd`, which
/// bounds the work per attempt without biasing the result noticeably.
fn binomial_inversion<R: RngCore>(rng: &mut R, n: u64, p: f64) -> u64 {
    let q = 1.0 - p;
    let nf = n as f64;
    let qn = (nf * q.ln()).exp();
    let np = nf * p;
    let bound = nf.min(np + 10.0 * (np * q + 1.0).sqrt());

    let mut x = 0u64;
    let mut px = qn;
    let mut u = raw_uniform(rng);
    loop {
        if u <= px {
            return x;
        }
        x += 1;
        if x as f64 > bound {
            x = 0;
            px = qn;
            u = raw_uniform(rng);
        } else {
            u -= px;
            px = ((nf - x as f64 + 1.0) * p * px) / (x as f64 * q);
        }
    }
}

/// Binomial(n, p) as an f64 count
///
/// `n` must be a non-negative integer and `p` in [0, 1]; non-finite values
/// yield NaN. Small means use inversion, large ones BTPE from `rand_distr`.
/// `p > 0.5` is sampled as `n - Binomial(n, 1 - p)`.
pub(crate) fn binomial<R: RngCore>(rng: &mut R, n: f64, p: f64) -> Result<f64> {
    if !all_finite(&[n, p]) {
        return Ok(f64::NAN);
    }
    let trials = n as u64;
    if trials == 0 || p == 0.0 {
        return Ok(0.0);
    }
    if p == 1.0 {
        return Ok(n);
    }

    let flipped = p > 0.5;
    let q = if flipped { 1.0 - p } else { p };
    let k = if n * q < BINOMIAL_INVERSION_THRESHOLD {
        binomial_inversion(rng, trials, q)
    } else {
        Binomial::new(trials, q)
            .map_err(|e| Error::invalid_parameter("p", e.to_string()))?
            .sample(rng)
    };

    let k = if flipped { trials - k } else { k };
    Ok(k as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::cpu::kernels::PhiloxStream;

    fn draws(n: u64, mut f: impl FnMut(&mut PhiloxStream) -> f64) -> Vec<f64> {
        (0..n).map(|lane| f(&mut PhiloxStream::new(1234, lane))).collect()
    }

    fn mean(xs: &[f64]) -> f64 {
        xs.iter().sum::<f64>() / xs.len() as f64
    }

    #[test]
    fn test_prev_float() {
        assert!(prev_f64(2.0) < 2.0);
        assert_eq!(prev_f64(2.0).to_bits() + 1, 2.0f64.to_bits());
        assert!(prev_f64(0.0) < 0.0);
        assert!(prev_f64(-1.0) < -1.0);

        let below = prev_f32(1.0);
        assert!(below < 1.0);
        assert_eq!(below as f32, f32::from_bits(1.0f32.to_bits() - 1));
        // Not representable in f32: the nearest f32 below is already fine
        let x = 1.0 + 1e-12;
        assert_eq!(prev_f32(x), 1.0);
    }

    #[test]
    fn test_uniform_range() {
        let xs = draws(10_000, |r| uniform(r, -1.0, 3.0, false));
        assert!(xs.iter().all(|&x| (-1.0..3.0).contains(&x)));
        assert!((mean(&xs) - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_ceil_f32() {
        assert_eq!(ceil_f32(1.0), 1.0);
        assert_eq!(ceil_f32(0.7) as f32, f32::from_bits(0.7f32.to_bits() + 1));
        assert!(ceil_f32(0.7) >= 0.7);
        assert!(ceil_f32(-0.7) >= -0.7);
        assert_eq!(ceil_f32(1e-50), f32::from_bits(1) as f64);
    }

    #[test]
    fn test_uniform_narrow_stays_above_low() {
        // 0.7 rounds down in f32, so draws near it would land below low
        let (low, high) = (0.7, 0.7 + 1e-7);
        let xs = draws(2_000, |r| uniform(r, low, high, true));
        for x in xs {
            let stored = (x as f32) as f64;
            assert!(stored >= low && stored < high, "{} outside [{}, {})", stored, low, high);
        }
    }

    #[test]
    fn test_uniform_narrow_never_reaches_high() {
        // No f32 lies in this interval: the upper bound wins
        let high = 1.0;
        let low = prev_f64(high);
        let xs = draws(100, |r| uniform(r, low, high, true));
        assert!(xs.iter().all(|&x| ((x as f32) as f64) < high));
    }

    #[test]
    fn test_normal_moments() {
        let xs = draws(20_000, |r| normal(r, 5.0, 2.0));
        let m = mean(&xs);
        let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
        assert!((m - 5.0).abs() < 0.1, "mean = {}", m);
        assert!((var - 4.0).abs() < 0.2, "var = {}", var);
    }

    #[test]
    fn test_non_finite_params_give_nan() {
        let mut r = PhiloxStream::new(0, 0);
        assert!(normal(&mut r, f64::NAN, 1.0).is_nan());
        assert!(normal(&mut r, 0.0, f64::INFINITY).is_nan());
        assert!(uniform(&mut r, f64::NEG_INFINITY, 0.0, false).is_nan());
        assert!(lognormal(&mut r, 0.0, f64::NAN).is_nan());
        assert!(gumbel(&mut r, f64::NAN, 1.0).is_nan());
        assert!(laplace(&mut r, 0.0, f64::NAN).is_nan());
        assert!(exponential(&mut r, f64::NAN).is_nan());
        assert!(beta(&mut r, f64::NAN, 1.0).unwrap().is_nan());
        assert!(binomial(&mut r, 10.0, f64::NAN).unwrap().is_nan());

        let mut out = [0.0; 3];
        dirichlet(&mut r, &[1.0, f64::NAN, 1.0], &mut out).unwrap();
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_lognormal_positive() {
        let xs = draws(5_000, |r| lognormal(r, 0.0, 1.0));
        assert!(xs.iter().all(|&x| x > 0.0));
    }

    #[test]
    fn test_gumbel_mean() {
        // Mean is loc + scale * Euler-Mascheroni
        let xs = draws(20_000, |r| gumbel(r, 0.0, 1.0));
        assert!((mean(&xs) - 0.577_215_664_9).abs() < 0.05);
    }

    #[test]
    fn test_laplace_symmetric() {
        let xs = draws(20_000, |r| laplace(r, 2.0, 1.0));
        assert!((mean(&xs) - 2.0).abs() < 0.05);
        assert!(xs.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_beta_range_and_mean() {
        for &(a, b) in &[(2.0, 5.0), (0.5, 0.5), (1e-3, 1e-3)] {
            let xs = draws(5_000, |r| beta(r, a, b).unwrap());
            assert!(xs.iter().all(|&x| (0.0..=1.0).contains(&x)), "a={} b={}", a, b);
        }
        let xs = draws(20_000, |r| beta(r, 2.0, 5.0).unwrap());
        assert!((mean(&xs) - 2.0 / 7.0).abs() < 0.01);
    }

    #[test]
    fn test_dirichlet_sums_to_one() {
        for alpha in [[1.0, 1.0, 1.0], [0.01, 0.02, 0.5], [4.0, 2.0, 9.0]] {
            let mut out = [0.0; 3];
            for lane in 0..200 {
                let mut r = PhiloxStream::new(5, lane);
                dirichlet(&mut r, &alpha, &mut out).unwrap();
                let sum: f64 = out.iter().sum();
                assert!((sum - 1.0).abs() < 1e-9);
                assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
            }
        }
    }

    #[test]
    fn test_subnormal_shapes_stay_normalized() {
        let xs = draws(200, |r| beta(r, 1e-310, 1e-310).unwrap());
        assert!(xs.iter().all(|&x| (0.0..=1.0).contains(&x)));
        // Symmetric shapes put the mass on either end
        assert!(xs.iter().any(|&x| x == 0.0) && xs.iter().any(|&x| x == 1.0));

        let mut out = [0.0; 3];
        for lane in 0..200 {
            let mut r = PhiloxStream::new(11, lane);
            dirichlet(&mut r, &[1e-310, 1e-310, 0.5], &mut out).unwrap();
            let sum: f64 = out.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "lane {}: {:?}", lane, out);
            assert!(out.iter().all(|&x| (0.0..=1.0).contains(&x)));
        }
    }

    #[test]
    fn test_binomial_edges() {
        let mut r = PhiloxStream::new(0, 0);
        assert_eq!(binomial(&mut r, 0.0, 0.3).unwrap(), 0.0);
        assert_eq!(binomial(&mut r, 10.0, 0.0).unwrap(), 0.0);
        assert_eq!(binomial(&mut r, 10.0, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn test_binomial_inversion_and_btpe_means() {
        // (n, p): inversion, flipped inversion, BTPE, flipped BTPE
        for &(n, p) in &[(20.0, 0.3), (20.0, 0.9), (1000.0, 0.4), (1000.0, 0.75)] {
            let xs = draws(10_000, |r| binomial(r, n, p).unwrap());
            assert!(xs.iter().all(|&x| x >= 0.0 && x <= n && x.fract() == 0.0));
            let expected = n * p;
            let sd = (n * p * (1.0 - p)).sqrt();
            assert!(
                (mean(&xs) - expected).abs() < 0.1 * sd.max(1.0),
                "n={} p={} mean={}",
                n,
                p,
                mean(&xs)
            );
        }
    }

    #[test]
    fn test_gamma_scale() {
        let xs = draws(20_000, |r| gamma(r, 2.0, 3.0).unwrap());
        assert!((mean(&xs) - 6.0).abs() < 0.2);
    }

    #[test]
    fn test_exponential_mean() {
        let xs = draws(20_000, |r| exponential(r, 2.0));
        assert!(xs.iter().all(|&x| x >= 0.0));
        assert!((mean(&xs) - 2.0).abs() < 0.1);
    }
}
