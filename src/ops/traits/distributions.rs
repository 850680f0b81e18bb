//! Distribution sampling operations trait.

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::generator::{Generator, current_generator};
use crate::ops::Distribution;
use crate::tensor::Tensor;
use std::collections::HashMap;

/// Named distribution parameters for [`DistributionOps::sample`]
pub type Params<'a> = HashMap<&'a str, &'a Tensor>;

/// Sampling from parameterized probability distributions
///
/// Every method broadcasts its parameter tensors into `shape` (which is
/// never widened), draws one lane per output element from `generator`, and
/// returns a fresh contiguous tensor of `dtype`.
///
/// # Reproducibility
///
/// Output is a pure function of the generator's seed and position and of the
/// parameter values. A successful call advances the position by the number
/// of lanes it used; a failed call leaves it untouched.
///
/// # Parameter values
///
/// NaN or infinite parameter values yield NaN in the affected output
/// elements. Values outside a distribution's domain fail the call with
/// `Error::InvalidParameter` before anything is drawn.
///
/// # Example
///
/// ```
/// use numr_random::prelude::*;
///
/// let client = CpuClient::new();
/// let generator = Generator::new(0)?;
/// let low = Tensor::scalar(0.0f64);
/// let high = Tensor::scalar(2.0f64);
///
/// let x = client.uniform(&generator, &low, &high, &[3, 2], DType::F64)?;
/// assert_eq!(x.shape(), &[3, 2]);
/// assert!(x.to_vec::<f64>().iter().all(|v| (0.0..2.0).contains(v)));
/// # Ok::<(), numr_random::error::Error>(())
/// ```
pub trait DistributionOps {
    /// Uniform on `[low, high)`; requires `low < high` elementwise
    fn uniform(
        &self,
        generator: &Generator,
        low: &Tensor,
        high: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Normal `N(loc, scale^2)`; requires `scale >= 0`
    fn normal(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Standard normal `N(0, 1)`
    fn standard_normal(&self, generator: &Generator, shape: &[usize], dtype: DType)
    -> Result<Tensor>;

    /// Log-normal: `exp(N(mean, sigma^2))`; requires `sigma >= 0`
    fn lognormal(
        &self,
        generator: &Generator,
        mean: &Tensor,
        sigma: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Gumbel; requires `scale > 0`
    fn gumbel(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Laplace; requires `scale >= 0`
    fn laplace(
        &self,
        generator: &Generator,
        loc: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Beta on [0, 1]; requires `a > 0` and `b > 0`
    ///
    /// Also available in F16 and BF16.
    fn beta(
        &self,
        generator: &Generator,
        a: &Tensor,
        b: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Dirichlet vectors along the last axis of `shape`
    ///
    /// `alpha` must have at least one dimension and broadcast into `shape`;
    /// its last axis is the concentration axis. Every output vector sums to
    /// one. Also available in F16 and BF16.
    ///
    /// ```
    /// use numr_random::prelude::*;
    ///
    /// let client = CpuClient::new();
    /// let generator = Generator::new(1)?;
    /// let alpha = Tensor::from_slice(&[1.0f64, 1.0, 1.0], &[3]);
    ///
    /// let x = client.dirichlet(&generator, &alpha, &[4, 3], DType::F64)?;
    /// for row in x.to_vec::<f64>().chunks(3) {
    ///     assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    /// }
    /// # Ok::<(), numr_random::error::Error>(())
    /// ```
    fn dirichlet(
        &self,
        generator: &Generator,
        alpha: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Binomial counts; requires integer `n >= 0` and `p` in [0, 1]
    ///
    /// Integer output dtypes must be able to hold the largest `n`.
    fn binomial(
        &self,
        generator: &Generator,
        n: &Tensor,
        p: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Gamma with `shape_param > 0` and `scale >= 0`
    fn gamma(
        &self,
        generator: &Generator,
        shape_param: &Tensor,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Exponential with mean `scale >= 0`
    fn exponential(
        &self,
        generator: &Generator,
        scale: &Tensor,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor>;

    /// Sample distribution `name` with named `params` from `generator`
    ///
    /// # Errors
    ///
    /// `UnknownDistribution` for an unrecognized name; `InvalidParameter`
    /// when a parameter is missing or not accepted by the distribution.
    fn sample_with(
        &self,
        generator: &Generator,
        name: &str,
        params: &Params<'_>,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        let dist: Distribution = name.parse()?;
        let names = dist.param_names();

        if let Some(extra) = params.keys().find(|k| !names.iter().any(|n| n == *k)) {
            return Err(Error::invalid_parameter(
                "params",
                format!("{} does not take a parameter named '{}'", dist, extra),
            ));
        }
        let get = |arg: &'static str| {
            params.get(arg).copied().ok_or_else(|| {
                Error::invalid_parameter(arg, format!("{} requires parameter '{}'", dist, arg))
            })
        };

        match dist {
            Distribution::Uniform => {
                self.uniform(generator, get("low")?, get("high")?, shape, dtype)
            }
            Distribution::Normal => self.normal(generator, get("loc")?, get("scale")?, shape, dtype),
            Distribution::StandardNormal => self.standard_normal(generator, shape, dtype),
            Distribution::Lognormal => {
                self.lognormal(generator, get("mean")?, get("sigma")?, shape, dtype)
            }
            Distribution::Gumbel => self.gumbel(generator, get("loc")?, get("scale")?, shape, dtype),
            Distribution::Laplace => {
                self.laplace(generator, get("loc")?, get("scale")?, shape, dtype)
            }
            Distribution::Beta => self.beta(generator, get("a")?, get("b")?, shape, dtype),
            Distribution::Dirichlet => self.dirichlet(generator, get("alpha")?, shape, dtype),
            Distribution::Binomial => self.binomial(generator, get("n")?, get("p")?, shape, dtype),
            Distribution::Gamma => {
                self.gamma(generator, get("shape")?, get("scale")?, shape, dtype)
            }
            Distribution::Exponential => self.exponential(generator, get("scale")?, shape, dtype),
        }
    }

    /// [`sample_with`](Self::sample_with) on the process-wide current generator
    fn sample(
        &self,
        name: &str,
        params: &Params<'_>,
        shape: &[usize],
        dtype: DType,
    ) -> Result<Tensor> {
        let generator = current_generator();
        self.sample_with(&generator, name, params, shape, dtype)
    }
}
