//! Window functions for spectral analysis
//!
//! Tapers applied to time-domain samples before the FFT to reduce spectral
//! leakage. Each application first subtracts a bias, so the same routine
//! serves both plain windowing (bias 0) and detrending by the running mean.

use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// Hamming window: w[n] = 0.46 - 0.54*cos(2πn/(N-1))
    Hamming,

    /// Hann window: w[n] = 0.5*(1 - cos(2πn/(N-1)))
    Hann,

    /// Blackman window: w[n] = a0 - 0.5*cos(2πn/(N-1)) + a2*cos(4πn/(N-1))
    /// with a0 = (1-0.16)/2 and a2 = 0.16/2
    Blackman,
}

impl WindowType {
    /// Taper weight for position `i` in a window of length `n`.
    pub fn weight(&self, i: usize, n: usize) -> f64 {
        let angle = 2.0 * PI * i as f64 / (n as f64 - 1.0);
        match self {
            WindowType::Hamming => {
                const ALPHA: f64 = 0.46;
                ALPHA - (1.0 - ALPHA) * angle.cos()
            }
            WindowType::Hann => 0.5 * (1.0 - angle.cos()),
            WindowType::Blackman => {
                const ALPHA: f64 = 0.16;
                let a0 = (1.0 - ALPHA) / 2.0;
                let a2 = ALPHA / 2.0;
                a0 - 0.5 * angle.cos() + a2 * (2.0 * angle).cos()
            }
        }
    }

    /// Subtract `bias` from every element, then taper in place.
    ///
    /// Pure in-place mutation, no allocation.
    pub fn apply(&self, samples: &mut [f64], bias: f64) {
        let n = samples.len();
        for (i, s) in samples.iter_mut().enumerate() {
            *s -= bias;
            *s *= self.weight(i, n);
        }
    }
}
