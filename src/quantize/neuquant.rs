//! NeuQuant competitive-learning color quantization.
//!
//! A one-dimensional Kohonen network of color neurons is trained over a
//! prime-stepped sample of the image; after unbiasing, each neuron is one
//! palette entry. The classic algorithm (Anthony Dekker, "Kohonen neural
//! networks for optimal colour quantization", 1994) samples pseudo-randomly
//! but deterministically; the `seed` parameter rotates the sampling start so
//! distinct runs are reproducible on demand.

use alloc::vec;
use alloc::vec::Vec;

use rgb::RGB;

use crate::palette::RgbQuad;

// Network is arranged on a biased fixed-point scale.
const NET_BIAS_SHIFT: i32 = 4;
const CYCLES: i32 = 100;

const INT_BIAS_SHIFT: i32 = 16;
const INT_BIAS: i32 = 1 << INT_BIAS_SHIFT;
const GAMMA_SHIFT: i32 = 10;
const BETA_SHIFT: i32 = 10;
const BETA: i32 = INT_BIAS >> BETA_SHIFT;
const BETA_GAMMA: i32 = INT_BIAS << (GAMMA_SHIFT - BETA_SHIFT);

const RADIUS_BIAS_SHIFT: i32 = 6;
const RADIUS_BIAS: i32 = 1 << RADIUS_BIAS_SHIFT;
const RADIUS_DEC: i32 = 30;

const ALPHA_BIAS_SHIFT: i32 = 10;
const INIT_ALPHA: i32 = 1 << ALPHA_BIAS_SHIFT;
const RAD_BIAS_SHIFT: i32 = 8;
const RAD_BIAS: i32 = 1 << RAD_BIAS_SHIFT;
const ALPHA_RAD_B_SHIFT: i32 = ALPHA_BIAS_SHIFT + RAD_BIAS_SHIFT;
const ALPHA_RAD_BIAS: i32 = 1 << ALPHA_RAD_B_SHIFT;

// Sampling step primes; any one of them is coprime with most image sizes.
const PRIME1: usize = 499;
const PRIME2: usize = 491;
const PRIME3: usize = 487;
const PRIME4: usize = 503;

struct Network {
    /// Neuron channels (b, g, r) in biased fixed point.
    neurons: Vec<[i32; 3]>,
    bias: Vec<i32>,
    freq: Vec<i32>,
}

impl Network {
    fn new(netsize: usize) -> Self {
        let neurons = (0..netsize)
            .map(|i| {
                let v = ((i << (NET_BIAS_SHIFT + 8)) / netsize) as i32;
                [v, v, v]
            })
            .collect();
        Self {
            neurons,
            bias: vec![0; netsize],
            freq: vec![INT_BIAS / netsize as i32; netsize],
        }
    }

    /// Winning neuron for (b, g, r): best bias-adjusted distance. The bias
    /// and frequency updates implement the "conscience" that spreads wins
    /// across the network.
    fn contest(&mut self, b: i32, g: i32, r: i32) -> usize {
        let mut best_dist = i32::MAX;
        let mut best_bias_dist = i32::MAX;
        let mut best = 0usize;
        let mut best_bias = 0usize;

        for i in 0..self.neurons.len() {
            let n = &self.neurons[i];
            let dist = (n[0] - b).abs() + (n[1] - g).abs() + (n[2] - r).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
            let bias_dist = dist - (self.bias[i] >> (INT_BIAS_SHIFT - NET_BIAS_SHIFT));
            if bias_dist < best_bias_dist {
                best_bias_dist = bias_dist;
                best_bias = i;
            }
            let beta_freq = self.freq[i] >> BETA_SHIFT;
            self.freq[i] -= beta_freq;
            self.bias[i] += beta_freq << GAMMA_SHIFT;
        }
        self.freq[best] += BETA;
        self.bias[best] -= BETA_GAMMA;
        best_bias
    }

    /// Move neuron `i` toward the sample by `alpha`.
    fn alter_single(&mut self, alpha: i32, i: usize, b: i32, g: i32, r: i32) {
        let n = &mut self.neurons[i];
        n[0] -= alpha * (n[0] - b) / INIT_ALPHA;
        n[1] -= alpha * (n[1] - g) / INIT_ALPHA;
        n[2] -= alpha * (n[2] - r) / INIT_ALPHA;
    }

    /// Move neighbors of `i` toward the sample, falling off quadratically
    /// with distance in the ring.
    fn alter_neighbours(&mut self, radius: usize, i: usize, b: i32, g: i32, r: i32) {
        let netsize = self.neurons.len();
        let lo = i.saturating_sub(radius.min(i));
        let hi = (i + radius).min(netsize - 1);

        let rad = radius as i32;
        let rad_sq = rad * rad;
        let alpha_dec = ALPHA_RAD_BIAS / rad_sq.max(1);

        let mut j = i + 1;
        let mut k = i as isize - 1;
        let mut q = 0i32;
        while j <= hi || k >= lo as isize {
            q += 1;
            let a = ALPHA_RAD_BIAS - alpha_dec * q * q;
            if a <= 0 {
                break;
            }
            if j <= hi {
                let n = &mut self.neurons[j];
                n[0] -= a * (n[0] - b) / ALPHA_RAD_BIAS;
                n[1] -= a * (n[1] - g) / ALPHA_RAD_BIAS;
                n[2] -= a * (n[2] - r) / ALPHA_RAD_BIAS;
                j += 1;
            }
            if k >= lo as isize {
                let n = &mut self.neurons[k as usize];
                n[0] -= a * (n[0] - b) / ALPHA_RAD_BIAS;
                n[1] -= a * (n[1] - g) / ALPHA_RAD_BIAS;
                n[2] -= a * (n[2] - r) / ALPHA_RAD_BIAS;
                k -= 1;
            }
        }
    }
}

/// Train a `colors`-neuron network over `pixels` and return the resulting
/// palette. `sample_fraction` is clamped to `1..=30`; `seed` picks the
/// sampling start offset.
pub(crate) fn build_palette(
    pixels: &[RGB<u8>],
    colors: usize,
    sample_fraction: u32,
    seed: u32,
) -> Vec<RgbQuad> {
    if colors == 0 || pixels.is_empty() {
        return Vec::new();
    }
    if colors == 1 {
        // One slot: the mean color is the best single representative.
        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for px in pixels {
            r += u64::from(px.r);
            g += u64::from(px.g);
            b += u64::from(px.b);
        }
        let n = pixels.len() as u64;
        return vec![RgbQuad::new((r / n) as u8, (g / n) as u8, (b / n) as u8)];
    }

    let samplefac = sample_fraction.clamp(1, 30) as usize;
    let mut net = Network::new(colors);

    let sample_pixels = (pixels.len() / samplefac).max(1);
    let delta = (sample_pixels / CYCLES as usize).max(1);
    let mut alpha = INIT_ALPHA;
    let init_radius = (colors as i32 >> 3) * RADIUS_BIAS;
    let mut radius_fp = init_radius;

    let step = if pixels.len() < PRIME4 {
        1
    } else if pixels.len() % PRIME1 != 0 {
        PRIME1
    } else if pixels.len() % PRIME2 != 0 {
        PRIME2
    } else if pixels.len() % PRIME3 != 0 {
        PRIME3
    } else {
        PRIME4
    };

    let mut pos = seed as usize % pixels.len();
    let mut radius = (radius_fp >> RADIUS_BIAS_SHIFT).max(0) as usize;

    for i in 0..sample_pixels {
        let px = pixels[pos];
        let b = i32::from(px.b) << NET_BIAS_SHIFT;
        let g = i32::from(px.g) << NET_BIAS_SHIFT;
        let r = i32::from(px.r) << NET_BIAS_SHIFT;

        let j = net.contest(b, g, r);
        net.alter_single(alpha, j, b, g, r);
        if radius > 0 {
            net.alter_neighbours(radius, j, b, g, r);
        }

        pos += step;
        while pos >= pixels.len() {
            pos -= pixels.len();
        }

        if (i + 1) % delta == 0 {
            alpha -= alpha / (30 + (samplefac as i32 - 1) / 3);
            radius_fp -= radius_fp / RADIUS_DEC;
            radius = (radius_fp >> RADIUS_BIAS_SHIFT).max(0) as usize;
        }
    }

    net.neurons
        .iter()
        .map(|n| {
            let unbias = |v: i32| -> u8 { (v >> NET_BIAS_SHIFT).clamp(0, 255) as u8 };
            RgbQuad::new(unbias(n[2]), unbias(n[1]), unbias(n[0]))
        })
        .collect()
}
