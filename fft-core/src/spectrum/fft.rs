//! In-place FFT kernel and polar conversion
//!
//! Iterative radix-2 decimation-in-time transform over two parallel sample
//! arrays. Forward only, unscaled; the input is destroyed by design.

use std::f64::consts::PI;

/// In-place iterative radix-2 decimation-in-time complex FFT.
///
/// `real` and `imag` must have the same power-of-two length; the
/// [`TransformBuffer`](super::TransformBuffer) constructor guarantees this,
/// so the kernel does not re-validate per call. No normalization is applied.
pub(crate) fn fft_in_place(real: &mut [f64], imag: &mut [f64]) {
    let n = real.len();
    debug_assert_eq!(n, imag.len());
    debug_assert!(n.is_power_of_two());
    if n < 2 {
        return;
    }
    let stages = n.trailing_zeros();

    // Bit-reversal permutation: j accumulates the reversed index by
    // repeated halving against the current group size.
    let mut j = 0usize;
    for i in 1..n - 1 {
        let mut group = n / 2;
        while j >= group {
            j -= group;
            group /= 2;
        }
        j += group;
        if i < j {
            real.swap(i, j);
            imag.swap(i, j);
        }
    }

    // Butterfly stages: the group size doubles each stage and the angular
    // step is -2π over the group size.
    let mut half = 1usize;
    for _ in 0..stages {
        let size = half * 2;
        let step = -2.0 * PI / size as f64;
        let mut angle = 0.0_f64;
        for group in 0..half {
            let (c, s) = (angle.cos(), angle.sin());
            angle += step;
            let mut k = group;
            while k < n {
                let t1 = c * real[k + half] - s * imag[k + half];
                let t2 = s * real[k + half] + c * imag[k + half];
                real[k + half] = real[k] - t1;
                imag[k + half] = imag[k] - t2;
                real[k] += t1;
                imag[k] += t2;
                k += size;
            }
        }
        half = size;
    }
}

/// Replace a rectangular `(x, y)` pair with `(magnitude, phase)` in place.
pub fn to_polar(x: &mut f64, y: &mut f64) {
    let m = x.hypot(*y);
    let p = y.atan2(*x);
    *x = m;
    *y = p;
}
