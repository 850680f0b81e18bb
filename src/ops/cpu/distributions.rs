//! CPU implementation of distribution sampling.

use crate::dtype::{DType, project_into};
use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::ops::{Distribution, DistributionOps, broadcast};
use crate::runtime::cpu::{
    CpuClient, PhiloxStream,
    helpers::ParamView,
    kernels::{self, distributions as sampler},
};
use crate::tensor::Tensor;
use smallvec::SmallVec;

/// Largest trial count binomial accepts: every integer up to it is exact in f64
const MAX_BINOMIAL_TRIALS: f64 = (1u64 << 53) as f64;

/// Parameter values of one lane, in declaration order
type LaneParams = SmallVec<[f64; 4]>;

/// Shared driver for distributions that draw one value per output element
///
/// Order of work: broadcast, dtype policy, parameter views, `validate`,
/// generator lock, lane evaluation, projection, commit. Every failure
/// happens before the commit, so the generator only advances on success.
#[allow(clippy::too_many_arguments)]
fn sample_elementwise<V, F>(
    client: &CpuClient,
    generator: &Generator,
    dist: Distribution,
    params: &[(&'static str, &Tensor)],
    shape: &[usize],
    dtype: DType,
    validate: V,
    f: F,
) -> Result<Tensor>
where
    V: FnOnce(&[ParamView], usize) -> Result<()>,
    F: Fn(&mut PhiloxStream, &[f64]) -> Result<f64> + Send + Sync,
{
    let shapes: Vec<&[usize]> = params.iter().map(|(_, t)| t.shape()).collect();
    let out_shape = broadcast(&shapes, shape)?;
    dist.dtype_policy().check(dtype)?;

    let views = params
        .iter()
        .map(|&(name, t)| ParamView::new(name, t, &out_shape))
        .collect::<Result<Vec<_>>>()?;
    let numel: usize = out_shape.iter().product();
    validate(&views, numel)?;

    if numel == 0 {
        return Ok(Tensor::empty(&out_shape, dtype));
    }

    let mut guard = generator.lock();
    let lanes = guard.lanes();
    let mut raw = vec![0.0f64; numel];
    kernels::fill_lanes(client, &mut raw, 1, |i, out| {
        let values: LaneParams = views.iter().map(|v| v.get(i)).collect();
        out[0] = f(&mut lanes.stream(i), &values)?;
        Ok(())
    })?;

    let out = project_into(&raw, &out_shape, dtype)?;
    guard.commit(numel);
    log::debug!(
        "{}: sampled {:?} as {} from position {}",
        dist,
        out_shape.as_slice(),
        dtype,
        lanes.base()
    );
    Ok(out)
}

/// Fail unless every non-NaN element pair satisfies `low < high`
fn check_ordered(low: &ParamView, high: &ParamView, numel: usize) -> Result<()> {
    for i in 0..numel {
        let (l, h) = (low.get(i), high.get(i));
        if l.is_nan() || h.is_nan() {
            continue;
        }
        if l >= h {
            return Err(Error::invalid_parameter(
                "low",
                format!("uniform requires low < high, got low = {}, high = {}", l, h),
            ));
        }
    }
    Ok(())
}

/// Binomial checks, including the integer-dtype ones that must happen before any draw
fn check_binomial(n: &ParamView, p: &ParamView, dtype: DType) -> Result<()> {
    n.check("an integer 0 <= n <= 2^53", |v| {
        v >= 0.0 && (v == f64::INFINITY || (v.fract() == 0.0 && v <= MAX_BINOMIAL_TRIALS))
    })?;
    p.check("0 <= p <= 1", |v| (0.0..=1.0).contains(&v))?;

    if dtype.is_int() {
        for view in [n, p] {
            if view.values().iter().any(|v| !v.is_finite()) {
                return Err(Error::invalid_parameter(
                    view.name(),
                    format!(
                        "non-finite {} cannot be sampled into integer dtype {}",
                        view.name(),
                        dtype
                    ),
                ));
            }
        }
        let max_n = n.values().iter().copied().fold(0.0, f64::max);
        if max_n > dtype.max_value() {
            return Err(Error::unsupported_dtype(dtype, "binomial"));
        }
    }
    Ok(())
}

impl DistributionOps for CpuClient {
    fn uniform(
        &self,
        generator: &Generator,
        low: &Tensor,
        high: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        let narrow = dtype == DType::F32;
        sample_elementwise(
            self,
            generator,
            Distribution::Uniform,
            &[("low", low), ("high", high)],
            shape,
            dtype,
            |p, numel| check_ordered(&p[0], &p[1], numel),
            |rng, p| Ok(sampler::uniform(rng, p[0], p[1], narrow)),
        )
    }

    fn normal(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Normal,
            &[("loc", loc), ("scale", scale)],
            shape,
            dtype,
            |p, _| p[1].check("scale >= 0", |v| v >= 0.0),
            |rng, p| Ok(sampler::normal(rng, p[0], p[1])),
        )
    }

    fn standard_normal(
        &self,
        generator: &Generator,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::StandardNormal,
            &[],
            shape,
            dtype,
            |_, _| Ok(()),
            |rng, _| Ok(sampler::normal(rng, 0.0, 1.0)),
        )
    }

    fn lognormal(
        &self,
        generator: &Generator,
        mean: &Tensor,
        sigma: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Lognormal,
            &[("mean", mean), ("sigma", sigma)],
            shape,
            dtype,
            |p, _| p[1].check("sigma >= 0", |v| v >= 0.0),
            |rng, p| Ok(sampler::lognormal(rng, p[0], p[1])),
        )
    }

    fn gumbel(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Gumbel,
            &[("loc", loc), ("scale", scale)],
            shape,
            dtype,
            |p, _| p[1].check("scale > 0", |v| v > 0.0),
            |rng, p| Ok(sampler::gumbel(rng, p[0], p[1])),
        )
    }

    fn laplace(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Laplace,
            &[("loc", loc), ("scale", scale)],
            shape,
            dtype,
            |p, _| p[1].check("scale >= 0", |v| v >= 0.0),
            |rng, p| Ok(sampler::laplace(rng, p[0], p[1])),
        )
    }

    fn beta(
        &self,
        generator: &Generator,
        a: &Tensor,
        b: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Beta,
            &[("a", a), ("b", b)],
            shape,
            dtype,
            |p, _| {
                p[0].check("a > 0", |v| v > 0.0)?;
                p[1].check("b > 0", |v| v > 0.0)
            },
            |rng, p| sampler::beta(rng, p[0], p[1]),
        )
    }

    fn dirichlet(
        &self,
        generator: &Generator,
        alpha: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        let dist = Distribution::Dirichlet;
        if alpha.ndim() == 0 {
            return Err(Error::invalid_parameter(
                "alpha",
                "dirichlet requires alpha with at least one dimension",
            ));
        }
        let out_shape = broadcast(&[alpha.shape()], shape)?;
        dist.dtype_policy().check(dtype)?;

        let view = ParamView::new("alpha", alpha, &out_shape)?;
        view.check("alpha > 0", |v| v > 0.0)?;

        let numel: usize = out_shape.iter().product();
        if numel == 0 {
            return Ok(Tensor::empty(&out_shape, dtype));
        }
        // alpha has rank >= 1 and broadcasts into out_shape, so it is non-empty
        let k = out_shape[out_shape.len() - 1];
        let vectors = numel / k;

        let mut guard = generator.lock();
        let lanes = guard.lanes();
        let mut raw = vec![0.0f64; numel];
        kernels::fill_lanes(self, &mut raw, k, |lane, out| {
            let alpha: SmallVec<[f64; 8]> = (0..k).map(|j| view.get(lane * k + j)).collect();
            sampler::dirichlet(&mut lanes.stream(lane), &alpha, out)
        })?;

        let out = project_into(&raw, &out_shape, dtype)?;
        guard.commit(vectors);
        log::debug!(
            "{}: sampled {} vectors of length {} as {} from position {}",
            dist,
            vectors,
            k,
            dtype,
            lanes.base()
        );
        Ok(out)
    }

    fn binomial(
        &self,
        generator: &Generator,
        n: &Tensor,
        p: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Binomial,
            &[("n", n), ("p", p)],
            shape,
            dtype,
            |v, _| check_binomial(&v[0], &v[1], dtype),
            |rng, v| sampler::binomial(rng, v[0], v[1]),
        )
    }

    fn gamma(
        &self,
        generator: &Generator,
        shape_param: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Gamma,
            &[("shape", shape_param), ("scale", scale)],
            shape,
            dtype,
            |p, _| {
                p[0].check("shape > 0", |v| v > 0.0)?;
                p[1].check("scale >= 0", |v| v >= 0.0)
            },
            |rng, p| sampler::gamma(rng, p[0], p[1]),
        )
    }

    fn exponential(
        &self,
        generator: &Generator,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        sample_elementwise(
            self,
            generator,
            Distribution::Exponential,
            &[("scale", scale)],
            shape,
            dtype,
            |p, _| p[0].check("scale >= 0", |v| v >= 0.0),
            |rng, p| Ok(sampler::exponential(rng, p[0])),
        )
    }
}
