//! CPU kernel implementations
//!
//! This module provides the lane bit streams, the primitive transforms built
//! on them, and the per-element distribution samplers. `fill_lanes` drives a
//! sampler over an output buffer, one lane per chunk.

pub mod distributions;
pub mod philox;
pub mod transforms;

pub use philox::PhiloxStream;

use super::CpuClient;
use crate::error::Result;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Evaluate `f` for every lane of `out`
///
/// `out` is split into consecutive chunks of `lane_width` values; `f`
/// receives the lane index and its chunk. Lanes are independent, so the
/// result does not depend on how they are scheduled. The first error aborts
/// the fill.
pub(crate) fn fill_lanes<F>(
    client: &CpuClient,
    out: &mut [f64],
    lane_width: usize,
    f: F,
) -> Result<()>
where
    F: Fn(usize, &mut [f64]) -> Result<()> + Send + Sync,
{
    debug_assert!(lane_width > 0);
    debug_assert_eq!(out.len() % lane_width, 0);

    #[cfg(feature = "rayon")]
    {
        let min_len = (client.rayon_min_len() / lane_width).max(1);
        return client.install_parallelism(|| {
            out.par_chunks_mut(lane_width)
                .enumerate()
                .with_min_len(min_len)
                .try_for_each(|(lane, chunk)| f(lane, chunk))
        });
    }

    #[cfg(not(feature = "rayon"))]
    {
        let _ = client;
        out.chunks_mut(lane_width)
            .enumerate()
            .try_for_each(|(lane, chunk)| f(lane, chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::cpu::ParallelismConfig;

    #[test]
    fn test_fill_lanes_visits_every_lane() {
        let client = CpuClient::new();
        let mut out = vec![0.0; 12];
        fill_lanes(&client, &mut out, 3, |lane, chunk| {
            chunk.fill(lane as f64);
            Ok(())
        })
        .unwrap();
        assert_eq!(
            out,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0]
        );
    }

    #[test]
    fn test_fill_lanes_independent_of_chunking() {
        let sample = |client: &CpuClient| {
            let mut out = vec![0.0; 4096];
            fill_lanes(client, &mut out, 1, |lane, chunk| {
                let mut rng = PhiloxStream::new(77, lane as u64);
                chunk[0] = transforms::standard_normal(&mut rng);
                Ok(())
            })
            .unwrap();
            out
        };
        let coarse = CpuClient::new();
        let fine = CpuClient::with_config(
            ParallelismConfig::default()
                .with_min_len(1)
                .with_num_threads(3),
        )
        .unwrap();
        assert_eq!(sample(&coarse), sample(&fine));
    }

    #[test]
    fn test_fill_lanes_propagates_error() {
        let client = CpuClient::new();
        let mut out = vec![0.0; 8];
        let err = fill_lanes(&client, &mut out, 1, |lane, _| {
            if lane == 5 {
                Err(Error::invalid_parameter("shape", "bad"))
            } else {
                Ok(())
            }
        })
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
