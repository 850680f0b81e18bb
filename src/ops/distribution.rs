//! Names, parameters and dtype policies of the supported distributions

use crate::dtype::{DTypePolicy, DTypeSet};
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// A distribution that can be sampled by name
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// Uniform on [low, high)
    Uniform,
    /// Normal with location `loc` and standard deviation `scale`
    Normal,
    /// Normal with zero mean and unit variance
    StandardNormal,
    /// `exp` of a normal with `mean` and `sigma`
    Lognormal,
    /// Gumbel (type I extreme value)
    Gumbel,
    /// Laplace (double exponential)
    Laplace,
    /// Beta on [0, 1]
    Beta,
    /// Dirichlet over the last output axis
    Dirichlet,
    /// Binomial count of successes
    Binomial,
    /// Gamma with `shape` and `scale`
    Gamma,
    /// Exponential with `scale` (mean)
    Exponential,
}

impl Distribution {
    /// Every distribution, in a stable order
    pub const ALL: [Distribution; 11] = [
        Self::Uniform,
        Self::Normal,
        Self::StandardNormal,
        Self::Lognormal,
        Self::Gumbel,
        Self::Laplace,
        Self::Beta,
        Self::Dirichlet,
        Self::Binomial,
        Self::Gamma,
        Self::Exponential,
    ];

    /// Canonical name
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Normal => "normal",
            Self::StandardNormal => "standard_normal",
            Self::Lognormal => "lognormal",
            Self::Gumbel => "gumbel",
            Self::Laplace => "laplace",
            Self::Beta => "beta",
            Self::Dirichlet => "dirichlet",
            Self::Binomial => "binomial",
            Self::Gamma => "gamma",
            Self::Exponential => "exponential",
        }
    }

    /// Parameter names, in positional order
    pub const fn param_names(self) -> &'static [&'static str] {
        match self {
            Self::Uniform => &["low", "high"],
            Self::Normal | Self::Gumbel | Self::Laplace => &["loc", "scale"],
            Self::StandardNormal => &[],
            Self::Lognormal => &["mean", "sigma"],
            Self::Beta => &["a", "b"],
            Self::Dirichlet => &["alpha"],
            Self::Binomial => &["n", "p"],
            Self::Gamma => &["shape", "scale"],
            Self::Exponential => &["scale"],
        }
    }

    /// Output dtypes this distribution can be materialized in
    ///
    /// The continuous transforms need at least f32 range and resolution;
    /// beta and dirichlet live in [0, 1] and also project into 16-bit
    /// floats. Binomial counts go to any integer dtype or to f32/f64.
    pub const fn dtype_policy(self) -> DTypePolicy {
        let allowed = match self {
            Self::Beta | Self::Dirichlet => DTypeSet::FLOATS,
            Self::Binomial => DTypeSet::INTS.union(DTypeSet::FULL_FLOATS),
            _ => DTypeSet::FULL_FLOATS,
        };
        DTypePolicy::new(self.name(), allowed)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::UnknownDistribution {
                name: s.to_string(),
            })
    }
}
