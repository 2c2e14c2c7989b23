//! Moving-window statistical peak search over a polar spectrum
//!
//! This is a variability detector rather than a classical local-maximum
//! picker: any contiguous run of scan positions whose local standard
//! deviation exceeds a multiple of the whole-spectrum standard deviation is
//! treated as one cluster, and the largest sample observed inside the run is
//! reported as that cluster's peak.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SpectrumError;
use crate::spectrum::buffer::{Domain, TransformBuffer};

/// Summary statistics over a slice of the magnitude channel
#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    sd: f64,
    max: f64,
    max_idx: usize,
}

/// Two-pass sample standard deviation, max and max-index over
/// `values[start..end]`.
fn compute_stats(values: &[f64], start: usize, end: usize) -> BinStats {
    let count = (end - start) as f64;
    let mean = values[start..end].iter().sum::<f64>() / count;

    let mut stat = BinStats::default();
    let mut acc = 0.0;
    for (i, &v) in values[start..end].iter().enumerate() {
        acc += (v - mean) * (v - mean);
        if v > stat.max {
            stat.max = v;
            stat.max_idx = start + i;
        }
    }
    stat.sd = (acc / (count - 1.0)).sqrt();
    stat
}

/// Open the diagnostic sink and write its header.
///
/// Failure to open degrades gracefully: the search proceeds without
/// diagnostics and a warning is logged.
fn open_sink(path: Option<&Path>) -> Option<BufWriter<File>> {
    let path = path?;
    match File::create(path) {
        Ok(file) => {
            let mut sink = BufWriter::new(file);
            match writeln!(sink, "i\tfft\tw\trw\tc") {
                Ok(()) => Some(sink),
                Err(e) => {
                    log::warn!("diagnostic sink {} is unwritable: {}", path.display(), e);
                    None
                }
            }
        }
        Err(e) => {
            log::warn!("cannot open diagnostic sink {}: {}", path.display(), e);
            None
        }
    }
}

/// Scan the first half of the spectrum for clusters whose local variability
/// exceeds `n_sigma` times the global standard deviation.
///
/// Stops early once the cluster count exceeds `max_peaks`, keeping partial
/// results, so the returned count can be at most `max_peaks + 1`. A cluster
/// still open when the scan ends is not counted.
pub(crate) fn search_peaks(
    buffer: &mut TransformBuffer,
    max_peaks: usize,
) -> Result<usize, SpectrumError> {
    if buffer.domain != Domain::Frequency {
        return Err(SpectrumError::NotTransformed);
    }

    let n = buffer.capacity();
    let window_size = buffer.config.window_size;
    let n_sigma = buffer.config.n_sigma;

    // One slot past max_peaks: the early-exit boundary below closes one
    // extra cluster before stopping.
    buffer.peaks.clear();
    buffer.peaks.resize(max_peaks + 1, 0);

    // Scoped to this call; dropped (and flushed) on every exit path.
    let mut sink = open_sink(buffer.config.output_path.as_deref());

    let global = compute_stats(&buffer.real, 0, n);
    buffer.global_stdev = global.sd;

    // A flat spectrum has no detectable clusters, and the threshold and
    // diagnostic ratio both degenerate; report zero peaks outright.
    if global.sd == 0.0 {
        buffer.peaks.truncate(0);
        return Ok(0);
    }

    let mut count = 0usize;
    let mut in_cluster = false;
    let mut cluster_max = 0.0_f64;

    // Only the first half of the spectrum is distinct (real input).
    for i in 0..(n / 2).saturating_sub(window_size) {
        let stat = compute_stats(&buffer.real, i, (i + window_size).min(n));

        if stat.sd > n_sigma * global.sd {
            // Inside a cluster: a strictly larger local max whose index
            // differs from the last recorded peak replaces the candidate.
            let prev = if count > 0 {
                Some(buffer.peaks[count - 1])
            } else {
                None
            };
            if stat.max > cluster_max && prev != Some(stat.max_idx) {
                buffer.peaks[count] = stat.max_idx;
                cluster_max = stat.max;
            }
            in_cluster = true;
        } else {
            if in_cluster {
                count += 1;
            }
            if count > max_peaks {
                break;
            }
            cluster_max = 0.0;
            in_cluster = false;
        }

        if let Some(sink) = sink.as_mut() {
            let _ = writeln!(
                sink,
                "{}\t{:.6}\t{:.6}\t{:.6}\t{}",
                i,
                buffer.real[i],
                stat.sd,
                stat.sd / global.sd,
                in_cluster as u8
            );
        }
    }

    buffer.peaks.truncate(count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::buffer::BufferConfig;
    use std::f64::consts::PI;
    use std::io::Read;

    /// 1024-sample buffer at fs = 1024 Hz, so bin k sits at k Hz.
    fn tone_buffer(bins: &[usize], window_size: usize, n_sigma: f64) -> TransformBuffer {
        let mut buf = TransformBuffer::new(BufferConfig {
            size_exponent: 10,
            sampling_frequency: 1024.0,
            window_size,
            n_sigma,
            output_path: None,
        });
        let n = buf.capacity();
        for i in 0..n {
            let x: f64 = bins
                .iter()
                .map(|&b| (2.0 * PI * b as f64 * i as f64 / n as f64).sin())
                .sum();
            buf.append(x, 0.0).unwrap();
        }
        buf
    }

    #[test]
    fn test_search_requires_frequency_domain() {
        let mut buf = TransformBuffer::new(BufferConfig::default());
        buf.append(1.0, 0.0).unwrap();
        assert_eq!(buf.search_peaks(5), Err(SpectrumError::NotTransformed));
    }

    #[test]
    fn test_single_tone_yields_one_peak() {
        let mut buf = tone_buffer(&[32], 16, 2.0);
        buf.calc_spectrum();

        let count = buf.search_peaks(10).unwrap();

        assert_eq!(count, 1);
        assert_eq!(buf.peak_count(), 1);
        // The representative lands on the tone bin; the frequency axis maps
        // it straight back to 32 Hz.
        assert_eq!(buf.peaks()[0], 32);
        assert!((buf.freq_axis()[buf.peaks()[0]] - 32.0).abs() < 1.0);
        assert!(buf.global_stdev() > 0.0);
    }

    #[test]
    fn test_flat_zero_spectrum_yields_no_peaks() {
        let mut buf = TransformBuffer::new(BufferConfig {
            size_exponent: 8,
            sampling_frequency: 256.0,
            ..Default::default()
        });
        while buf.append(0.0, 0.0).unwrap() {}
        buf.calc_spectrum();

        let count = buf.search_peaks(5).unwrap();

        assert_eq!(count, 0);
        assert!(buf.peaks().is_empty());
        assert_eq!(buf.global_stdev(), 0.0);
    }

    #[test]
    fn test_early_exit_returns_max_peaks_plus_one() {
        // Eight well-separated tones produce eight clusters; the scan must
        // stop as soon as the count exceeds max_peaks, not clip to it.
        let bins = [50, 100, 150, 200, 250, 300, 350, 400];
        let mut buf = tone_buffer(&bins, 8, 1.5);
        buf.calc_spectrum();

        let max_peaks = 2;
        let count = buf.search_peaks(max_peaks).unwrap();

        assert_eq!(count, max_peaks + 1);
        assert_eq!(buf.peaks(), &[50, 100, 150]);
    }

    #[test]
    fn test_peak_count_never_exceeds_boundary() {
        let bins = [50, 100, 150, 200, 250, 300, 350, 400];
        for max_peaks in 0..6 {
            let mut buf = tone_buffer(&bins, 8, 1.5);
            buf.calc_spectrum();
            let count = buf.search_peaks(max_peaks).unwrap();
            assert!(count <= max_peaks + 1);
        }
    }

    #[test]
    fn test_diagnostic_sink_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("peaks.tsv");

        let mut buf = tone_buffer(&[32], 16, 2.0);
        buf.set_output_path(Some(path.clone()));
        buf.calc_spectrum();
        buf.search_peaks(10).unwrap();

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        // Header plus one line per scanned position: n/2 - window_size
        assert_eq!(lines[0], "i\tfft\tw\trw\tc");
        assert_eq!(lines.len(), 1 + (1024 / 2 - 16));

        let fields: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[0], "0");
        fields[1].parse::<f64>().unwrap();
        fields[2].parse::<f64>().unwrap();
        fields[3].parse::<f64>().unwrap();
        assert!(fields[4] == "0" || fields[4] == "1");
    }

    #[test]
    fn test_missing_sink_degrades_gracefully() {
        let mut buf = tone_buffer(&[32], 16, 2.0);
        buf.set_output_path(Some("/nonexistent-dir/peaks.tsv".into()));
        buf.calc_spectrum();

        // Search still succeeds, only the diagnostics are lost
        let count = buf.search_peaks(10).unwrap();
        assert_eq!(count, 1);
    }
}
