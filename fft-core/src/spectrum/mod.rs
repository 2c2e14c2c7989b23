//! Spectral analysis: windowing, in-place FFT and peak detection

pub mod buffer;
pub mod fft;
pub mod peaks;
pub mod windows;

pub use buffer::{BufferConfig, Domain, RunningStats, TransformBuffer};
pub use fft::to_polar;
pub use windows::WindowType;
