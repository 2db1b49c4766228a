//! Harmonic analysis of periodic field profiles
//!
//! Estimates the amplitude of the fundamental harmonic of a field sampled
//! along z. Used by the roll-off amplitude analysis, where only ratios between
//! transverse positions matter, so scalloping loss cancels out.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Window function applied before the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowFunction {
    /// Rectangular window (no windowing)
    Rectangular,
    /// Hann window (good general purpose)
    #[default]
    Hann,
}

impl WindowFunction {
    /// Compute window coefficient at position i out of n samples
    pub fn coefficient(&self, i: usize, n: usize) -> f64 {
        match self {
            WindowFunction::Rectangular => 1.0,
            WindowFunction::Hann => 0.5 * (1.0 - (2.0 * PI * i as f64 / n as f64).cos()),
        }
    }

    /// Mean of the window, used to undo its amplitude attenuation
    pub fn coherent_gain(&self, n: usize) -> f64 {
        if n == 0 {
            return 1.0;
        }
        (0..n).map(|i| self.coefficient(i, n)).sum::<f64>() / n as f64
    }
}

/// Dominant harmonic of a sampled profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Harmonic {
    /// FFT bin of the peak
    pub bin: usize,
    /// Spatial frequency (1/mm)
    pub frequency: f64,
    /// Peak amplitude (same unit as the samples)
    pub amplitude: f64,
}

/// FFT-based estimator for the fundamental harmonic
pub struct HarmonicAnalyzer {
    planner: FftPlanner<f64>,
    window: WindowFunction,
}

impl Default for HarmonicAnalyzer {
    fn default() -> Self {
        Self::new(WindowFunction::default())
    }
}

impl HarmonicAnalyzer {
    pub fn new(window: WindowFunction) -> Self {
        Self {
            planner: FftPlanner::new(),
            window,
        }
    }

    /// Find the strongest non-DC harmonic of `samples` taken every `step` mm.
    ///
    /// Returns `None` for fewer than 4 samples or a flat profile.
    pub fn fundamental(&mut self, samples: &[f64], step: f64) -> Option<Harmonic> {
        let n = samples.len();
        if n < 4 || step <= 0.0 {
            return None;
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let mut buffer: Vec<Complex<f64>> = samples
            .iter()
            .enumerate()
            .map(|(i, &s)| Complex::new((s - mean) * self.window.coefficient(i, n), 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let (bin, magnitude) = buffer[1..n / 2]
            .iter()
            .enumerate()
            .map(|(i, c)| (i + 1, c.norm()))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))?;

        if magnitude <= f64::EPSILON {
            return None;
        }

        let gain = self.window.coherent_gain(n);
        Some(Harmonic {
            bin,
            frequency: bin as f64 / (n as f64 * step),
            amplitude: 2.0 * magnitude / (n as f64 * gain),
        })
    }
}
