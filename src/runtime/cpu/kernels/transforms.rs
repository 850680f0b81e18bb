//! Primitive transforms from raw bits to canonical variates
//!
//! Every higher-level sampler is built from these. All functions are generic
//! over `RngCore` so they run on a lane's `PhiloxStream` in production and on
//! any seeded generator in tests.

use super::philox::{u64_to_open_uniform, u64_to_uniform};
use crate::error::{Error, Result};
use rand::RngCore;
use std::f64::consts::PI;

/// Upper bound on Marsaglia-Tsang rejections for one gamma variate.
///
/// The acceptance rate is above 95% for every shape >= 1, so reaching this
/// bound means the shape parameter is degenerate.
pub(crate) const MAX_GAMMA_REJECTIONS: usize = 10_000;

/// Uniform in [0, 1), 53 bits of resolution
#[inline]
pub(crate) fn raw_uniform<R: RngCore>(rng: &mut R) -> f64 {
    u64_to_uniform(rng.next_u64())
}

/// Uniform in the open interval (0, 1), safe to divide by or take the log of
#[inline]
pub(crate) fn standard_uniform<R: RngCore>(rng: &mut R) -> f64 {
    u64_to_open_uniform(rng.next_u64())
}

/// Box-Muller transform: convert two uniform values to two standard normal values
///
/// `u1` must lie in (0, 1).
#[inline(always)]
pub(crate) fn box_muller(u1: f64, u2: f64) -> (f64, f64) {
    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * PI * u2;

    (r * theta.cos(), r * theta.sin())
}

/// N(0, 1) from two open uniforms (cosine branch of Box-Muller)
#[inline]
pub(crate) fn standard_normal<R: RngCore>(rng: &mut R) -> f64 {
    let u1 = standard_uniform(rng);
    let u2 = standard_uniform(rng);
    box_muller(u1, u2).0
}

/// Exp(1) by inversion: `-ln(1 - U)`
#[inline]
pub(crate) fn standard_exponential<R: RngCore>(rng: &mut R) -> f64 {
    -(1.0 - raw_uniform(rng)).ln()
}

fn check_gamma_shape(k: f64) -> Result<()> {
    if k.is_finite() && k > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameter(
            "shape",
            format!("standard gamma requires a finite shape > 0, got {}", k),
        ))
    }
}

/// Marsaglia & Tsang (2000) squeeze method, valid for `k >= 1`
fn marsaglia_tsang<R: RngCore>(rng: &mut R, k: f64) -> Result<f64> {
    let d = k - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    for _ in 0..MAX_GAMMA_REJECTIONS {
        let x = standard_normal(rng);
        let v = 1.0 + c * x;
        if v <= 0.0 {
            continue;
        }
        let v = v * v * v;
        let u = standard_uniform(rng);
        let x2 = x * x;

        // Squeeze first, exact test only when it fails
        if u < 1.0 - 0.0331 * x2 * x2 || u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
            return Ok(d * v);
        }
    }

    Err(Error::invalid_parameter(
        "shape",
        format!(
            "gamma sampler rejected {} candidates for shape {}",
            MAX_GAMMA_REJECTIONS, k
        ),
    ))
}

/// Gamma(k, 1)
///
/// Shapes below one are boosted: `G(k) = G(k + 1) * U^(1/k)`.
pub(crate) fn standard_gamma<R: RngCore>(rng: &mut R, k: f64) -> Result<f64> {
    check_gamma_shape(k)?;
    if k < 1.0 {
        let g = marsaglia_tsang(rng, k + 1.0)?;
        let u = standard_uniform(rng);
        Ok(g * u.powf(1.0 / k))
    } else {
        marsaglia_tsang(rng, k)
    }
}

/// A Gamma(k, 1) draw held in log space
#[derive(Debug, Clone, Copy)]
pub(crate) struct LnGamma {
    /// `ln G`, which is `-inf` once `G` is too small even for the log domain
    pub value: f64,
    /// Orders draws whose `value` is `-inf`: a larger rank is a larger draw
    pub rank: f64,
}

/// `ln` of a Gamma(k, 1) draw
///
/// For small shapes `U^(1/k)` underflows to zero in linear space; the log
/// domain keeps ratios of such draws exact. For subnormal `k` even `ln(U)/k`
/// overflows, and `rank = ln(k) - ln(-ln U)` still orders the draws.
pub(crate) fn ln_standard_gamma<R: RngCore>(rng: &mut R, k: f64) -> Result<LnGamma> {
    check_gamma_shape(k)?;
    if k < 1.0 {
        let g = marsaglia_tsang(rng, k + 1.0)?;
        let ln_u = standard_uniform(rng).ln();
        Ok(LnGamma {
            value: g.ln() + ln_u / k,
            rank: k.ln() - (-ln_u).ln(),
        })
    } else {
        Ok(LnGamma {
            value: marsaglia_tsang(rng, k)?.ln(),
            rank: f64::INFINITY,
        })
    }
}
