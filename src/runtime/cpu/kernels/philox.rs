//! Philox4x32-10 counter-based bit streams
//!
//! 10-round Feistel cipher from Salmon et al. "Parallel Random Numbers: As Easy as 1, 2, 3" (2011)
//!
//! Each lane owns the counter blocks `[lane_lo, lane_hi, block, 0]`, so the
//! words a lane produces depend only on (key, lane) and never on how lanes
//! are split across threads.

use rand::RngCore;

const PHILOX_M2X32_0: u32 = 0xD2511F53;
const PHILOX_M2X32_1: u32 = 0xCD9E8D57;
const PHILOX_W32_0: u32 = 0x9E3779B9;
const PHILOX_W32_1: u32 = 0xBB67AE85;

/// 2^-53, the spacing of 53-bit uniforms in [0, 1)
const INV_2_53: f64 = 1.0 / (1u64 << 53) as f64;
/// 2^-52, the spacing of the 52-bit open-interval uniforms
const INV_2_52: f64 = 1.0 / (1u64 << 52) as f64;

/// Philox4x32 round function
#[inline(always)]
fn philox_round(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let prod0 = (ctr[0] as u64).wrapping_mul(PHILOX_M2X32_0 as u64);
    let prod1 = (ctr[2] as u64).wrapping_mul(PHILOX_M2X32_1 as u64);

    [
        ((prod1 >> 32) as u32) ^ ctr[1] ^ key[0],
        prod1 as u32,
        ((prod0 >> 32) as u32) ^ ctr[3] ^ key[1],
        prod0 as u32,
    ]
}

/// Philox4x32-10: 10-round Feistel cipher
#[inline(always)]
pub(crate) fn philox4x32_10(ctr: [u32; 4], key: [u32; 2]) -> [u32; 4] {
    let mut c = ctr;
    let mut k = key;

    for _ in 0..10 {
        c = philox_round(c, k);
        k[0] = k[0].wrapping_add(PHILOX_W32_0);
        k[1] = k[1].wrapping_add(PHILOX_W32_1);
    }

    c
}

#[inline(always)]
fn split_u64(v: u64) -> [u32; 2] {
    [(v & 0xFFFFFFFF) as u32, (v >> 32) as u32]
}

/// Convert u64 to uniform float in [0, 1) using the top 53 bits
#[inline(always)]
pub(crate) fn u64_to_uniform(u: u64) -> f64 {
    (u >> 11) as f64 * INV_2_53
}

/// Convert u64 to uniform float in the open interval (0, 1)
///
/// Uses the top 52 bits offset by half a step, so neither 0 nor 1 is reachable.
#[inline(always)]
pub(crate) fn u64_to_open_uniform(u: u64) -> f64 {
    ((u >> 12) as f64 + 0.5) * INV_2_52
}

/// The word stream of one execution lane
///
/// A stream is a pure function of `(seed, lane)`: two streams built from the
/// same pair yield identical words. Blocks of four words are produced on
/// demand, giving each lane 2^34 words before the block index wraps.
#[derive(Clone, Debug)]
pub struct PhiloxStream {
    key: [u32; 2],
    lane: [u32; 2],
    block: u32,
    buf: [u32; 4],
    cursor: usize,
}

impl PhiloxStream {
    /// Create the stream for absolute counter position `lane` under `seed`
    pub fn new(seed: u64, lane: u64) -> Self {
        Self {
            key: split_u64(seed),
            lane: split_u64(lane),
            block: 0,
            buf: [0; 4],
            cursor: 4,
        }
    }

    /// Absolute counter position of this lane
    pub fn lane(&self) -> u64 {
        ((self.lane[1] as u64) << 32) | self.lane[0] as u64
    }

    #[inline]
    fn refill(&mut self) {
        let ctr = [self.lane[0], self.lane[1], self.block, 0];
        self.buf = philox4x32_10(ctr, self.key);
        self.block = self.block.wrapping_add(1);
        self.cursor = 0;
    }
}

impl RngCore for PhiloxStream {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        if self.cursor == 4 {
            self.refill();
        }
        let word = self.buf[self.cursor];
        self.cursor += 1;
        word
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        let lo = self.next_u32() as u64;
        let hi = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let word = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}
