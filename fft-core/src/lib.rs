//! Spectral Peaks - Discrete Fourier analysis core
//!
//! Fixed-size transform buffers with incremental running statistics,
//! windowing, an in-place radix-2 FFT and a moving-window statistical peak
//! search over the resulting spectrum.
//!
//! ```
//! use spectral_peaks::{BufferConfig, TransformBuffer, WindowType};
//!
//! let mut buf = TransformBuffer::new(BufferConfig {
//!     size_exponent: 10,          // 1024 samples
//!     sampling_frequency: 1024.0, // Hz
//!     window_size: 16,
//!     n_sigma: 2.0,
//!     output_path: None,
//! });
//!
//! // Fill from any sample source until capacity is reached
//! let n = buf.capacity();
//! for i in 0..n {
//!     let t = i as f64 / 1024.0;
//!     let x = (2.0 * std::f64::consts::PI * 50.0 * t).sin();
//!     buf.append(x, 0.0)?;
//! }
//!
//! buf.apply_window_detrended(WindowType::Hann);
//! let bins = buf.calc_spectrum();
//! let peaks = buf.search_peaks(5)?;
//!
//! assert_eq!(bins, n / 2);
//! assert_eq!(peaks, 1);
//! # Ok::<(), spectral_peaks::SpectrumError>(())
//! ```

pub mod error;
pub mod spectrum;

pub use error::SpectrumError;
pub use spectrum::{BufferConfig, Domain, RunningStats, TransformBuffer, WindowType};
