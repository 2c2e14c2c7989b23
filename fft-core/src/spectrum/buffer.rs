//! Fixed-size transform buffer with running statistics
//!
//! Owns two parallel sample arrays that start out in the time domain and are
//! overwritten in place by the transform, plus the precomputed time and
//! frequency axes and the incremental statistics collected while filling.

use std::path::PathBuf;

use crate::error::SpectrumError;
use crate::spectrum::fft::{fft_in_place, to_polar};
use crate::spectrum::peaks;
use crate::spectrum::windows::WindowType;

/// Construction-time configuration for a [`TransformBuffer`]
#[derive(Debug, Clone)]
pub struct BufferConfig {
    /// Buffer size exponent: capacity is `2^size_exponent` samples.
    /// Taking an exponent (rather than a raw length) makes non-power-of-two
    /// sizes unrepresentable.
    pub size_exponent: u32,

    /// Sampling frequency in Hz
    pub sampling_frequency: f64,

    /// Moving-window length for the peak search
    pub window_size: usize,

    /// Threshold multiplier on the global standard deviation
    pub n_sigma: f64,

    /// Optional diagnostic dump written during peak search, one line per
    /// scanned position
    pub output_path: Option<PathBuf>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            size_exponent: 10,
            sampling_frequency: 1000.0,
            window_size: 10,
            n_sigma: 2.0,
            output_path: None,
        }
    }
}

/// Which domain the sample arrays currently hold
///
/// The transform is only permitted from `Time` and the peak search only from
/// `Frequency`; `reset` returns the buffer to `Time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Arrays hold appended time-domain samples
    Time,
    /// Arrays hold (magnitude, phase) spectrum values; the original samples
    /// are irrecoverable
    Frequency,
}

/// Per-channel incremental statistics, updated on every append
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    /// Running mean of the samples appended so far
    pub mean: f64,
    /// Running sample standard deviation of the samples appended so far
    pub sd: f64,
}

impl RunningStats {
    /// Online recurrence for mean and sample standard deviation.
    /// `count` is the 1-based number of samples including `value`.
    fn update(&mut self, count: usize, value: f64) {
        if count <= 1 {
            self.mean = value;
            self.sd = 0.0;
        } else {
            let n = count as f64;
            let n1 = n - 1.0;
            let n2 = n - 2.0;
            self.mean = (n1 * self.mean + value) / n;
            let dev = self.mean - value;
            self.sd = ((n2 * self.sd * self.sd + (n / n1) * dev * dev) / n1).sqrt();
        }
    }
}

/// Fixed-size sample buffer shared between the time and frequency domains
///
/// Lifecycle: construct → [`append`](Self::append) until full → window →
/// [`calc_spectrum`](Self::calc_spectrum) → [`search_peaks`](Self::search_peaks)
/// → [`reset`](Self::reset) to reuse. The same storage backs both domains, so
/// computing the spectrum destroys the time-domain samples.
pub struct TransformBuffer {
    capacity: usize,
    pub(crate) real: Vec<f64>,
    pub(crate) imag: Vec<f64>,
    time: Vec<f64>,
    freq: Vec<f64>,
    stats: [RunningStats; 2],
    cursor: usize,
    pub(crate) domain: Domain,
    pub(crate) config: BufferConfig,
    pub(crate) global_stdev: f64,
    pub(crate) peaks: Vec<usize>,
}

impl TransformBuffer {
    /// Create a buffer of `2^config.size_exponent` samples.
    ///
    /// The time and frequency axes are computed once here and never mutated:
    /// `time[i] = i / fs`, `freq[i] = fs / n * i`.
    pub fn new(config: BufferConfig) -> Self {
        let capacity = 1usize << config.size_exponent;
        let fs = config.sampling_frequency;
        let time = (0..capacity).map(|i| i as f64 / fs).collect();
        let freq = (0..capacity)
            .map(|i| fs / capacity as f64 * i as f64)
            .collect();

        Self {
            capacity,
            real: vec![0.0; capacity],
            imag: vec![0.0; capacity],
            time,
            freq,
            stats: [RunningStats::default(); 2],
            cursor: 0,
            domain: Domain::Time,
            config,
            global_stdev: 0.0,
            peaks: Vec::new(),
        }
    }

    /// Append one `(x, y)` sample pair and update the running statistics.
    ///
    /// Samples are written 0-based from the start of the arrays. Returns
    /// whether capacity remains after the write, so fill loops can stop
    /// without a second length check. Errors with
    /// [`SpectrumError::BufferFull`] once capacity is reached or after the
    /// buffer has been transformed; reset before reusing.
    pub fn append(&mut self, x: f64, y: f64) -> Result<bool, SpectrumError> {
        if self.domain == Domain::Frequency || self.cursor >= self.capacity {
            return Err(SpectrumError::BufferFull);
        }
        self.real[self.cursor] = x;
        self.imag[self.cursor] = y;
        let count = self.cursor + 1;
        self.stats[0].update(count, x);
        self.stats[1].update(count, y);
        self.cursor = count;
        Ok(self.cursor < self.capacity)
    }

    /// Clear samples and statistics back to an empty time-domain buffer.
    ///
    /// Capacity, axes and configuration are preserved.
    pub fn reset(&mut self) {
        self.real.fill(0.0);
        self.imag.fill(0.0);
        self.stats = [RunningStats::default(); 2];
        self.cursor = 0;
        self.domain = Domain::Time;
    }

    /// Apply a window with zero bias to both channels.
    pub fn apply_window(&mut self, window: WindowType) {
        window.apply(&mut self.real, 0.0);
        window.apply(&mut self.imag, 0.0);
    }

    /// Apply a window with each channel's running mean as bias, detrending
    /// before tapering.
    pub fn apply_window_detrended(&mut self, window: WindowType) {
        window.apply(&mut self.real, self.stats[0].mean);
        window.apply(&mut self.imag, self.stats[1].mean);
    }

    /// Transform the buffer to its polar spectrum in place.
    ///
    /// From the time domain this runs the FFT kernel and converts every
    /// `(x, y)` pair to `(magnitude, phase)`, then tags the buffer as
    /// frequency-domain. Idempotent: a second call is a no-op. Returns the
    /// number of distinct bins, `n / 2` (a real-input spectrum is symmetric).
    pub fn calc_spectrum(&mut self) -> usize {
        if self.domain == Domain::Time {
            fft_in_place(&mut self.real, &mut self.imag);
            for (x, y) in self.real.iter_mut().zip(self.imag.iter_mut()) {
                to_polar(x, y);
            }
            self.domain = Domain::Frequency;
        }
        self.capacity / 2
    }

    /// Scan the magnitude spectrum for clusters of statistically unusual
    /// variability and record one representative peak per cluster.
    ///
    /// See [`peaks`](crate::spectrum::peaks) for the algorithm. Errors with
    /// [`SpectrumError::NotTransformed`] if the spectrum has not been
    /// computed yet.
    pub fn search_peaks(&mut self, max_peaks: usize) -> Result<usize, SpectrumError> {
        peaks::search_peaks(self, max_peaks)
    }

    /// Sample capacity (a power of two)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples appended since the last reset
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True once every slot has been filled
    pub fn is_full(&self) -> bool {
        self.cursor >= self.capacity
    }

    /// Current domain of the sample arrays
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Real channel: samples in the time domain, magnitudes in the
    /// frequency domain
    pub fn real(&self) -> &[f64] {
        &self.real
    }

    /// Imaginary channel: samples in the time domain, phases in the
    /// frequency domain
    pub fn imag(&self) -> &[f64] {
        &self.imag
    }

    /// Time axis in seconds, `time[i] = i / fs`
    pub fn time_axis(&self) -> &[f64] {
        &self.time
    }

    /// Frequency axis in Hz, `freq[i] = fs / n * i`
    pub fn freq_axis(&self) -> &[f64] {
        &self.freq
    }

    /// Running statistics for the real channel
    pub fn real_stats(&self) -> RunningStats {
        self.stats[0]
    }

    /// Running statistics for the imaginary channel
    pub fn imag_stats(&self) -> RunningStats {
        self.stats[1]
    }

    /// Global standard deviation computed by the most recent peak search
    pub fn global_stdev(&self) -> f64 {
        self.global_stdev
    }

    /// Peak indices recorded by the most recent search, one per cluster
    pub fn peaks(&self) -> &[usize] {
        &self.peaks
    }

    /// Number of peaks found by the most recent search
    pub fn peak_count(&self) -> usize {
        self.peaks.len()
    }

    /// Buffer configuration
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Change the peak-search window length
    pub fn set_window_size(&mut self, window_size: usize) {
        self.config.window_size = window_size;
    }

    /// Change the peak-search threshold multiplier
    pub fn set_n_sigma(&mut self, n_sigma: f64) {
        self.config.n_sigma = n_sigma;
    }

    /// Set or clear the diagnostic output path
    pub fn set_output_path(&mut self, path: Option<PathBuf>) {
        self.config.output_path = path;
    }
}
