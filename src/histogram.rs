//! Work-distribution histograms for per-window quality control.
//!
//! Bins are uniform over `[min, max]` of the binned samples (or over the union
//! range when two sample sets are binned on shared edges, so a forward and a
//! backward distribution stay directly comparable). Each sample maps to exactly
//! one bin by `floor((value - min) / bin_width)`, with the exact maximum clamped
//! into the last bin. Probabilities are normalised per sample set and sum to one.

use crate::error::FepBarError;
use serde::Serialize;

/// One histogram bin: its centre value and the probability mass that fell in it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    /// Midpoint of the bin interval.
    pub center: f64,
    /// Fraction of the sample set that fell into this bin.
    pub probability: f64,
    /// Raw number of samples in this bin.
    pub count: usize,
}

/// A probability distribution over uniform value intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Lower edge of the binned range.
    pub min: f64,
    /// Upper edge of the binned range.
    pub max: f64,
    /// Width of each bin; zero for the degenerate single-bin case.
    pub bin_width: f64,
    /// The bins in ascending value order.
    pub bins: Vec<HistogramBin>,
}

/// Builds histograms with a fixed bin count.
#[derive(Debug, Clone, Copy)]
pub struct HistogramBuilder {
    bins: usize,
}

impl HistogramBuilder {
    /// Creates a builder producing `bins` uniform intervals.
    ///
    /// # Errors
    ///
    /// [`FepBarError::InvalidBinCount`] if `bins` is zero.
    pub fn new(bins: usize) -> Result<Self, FepBarError> {
        if bins == 0 {
            return Err(FepBarError::InvalidBinCount);
        }
        Ok(Self { bins })
    }

    /// Bins one sample set over its own `[min, max]` range.
    ///
    /// # Errors
    ///
    /// [`FepBarError::EmptySampleSet`] if `samples` is empty.
    pub fn build(&self, samples: &[f64]) -> Result<Histogram, FepBarError> {
        let (min, max) = sample_range(samples)?;
        Ok(self.bin_over_range(samples, min, max))
    }

    /// Bins two sample sets independently but on shared edges spanning the union
    /// of their ranges, so the two distributions are directly comparable.
    ///
    /// # Errors
    ///
    /// [`FepBarError::EmptySampleSet`] if either set is empty.
    pub fn build_shared(
        &self,
        first: &[f64],
        second: &[f64],
    ) -> Result<(Histogram, Histogram), FepBarError> {
        let (min_a, max_a) = sample_range(first)?;
        let (min_b, max_b) = sample_range(second)?;
        let min = min_a.min(min_b);
        let max = max_a.max(max_b);
        Ok((
            self.bin_over_range(first, min, max),
            self.bin_over_range(second, min, max),
        ))
    }

    fn bin_over_range(&self, samples: &[f64], min: f64, max: f64) -> Histogram {
        // Zero-variance sample set: one bin holding all mass, by definition.
        if min == max {
            return Histogram {
                min,
                max,
                bin_width: 0.0,
                bins: vec![HistogramBin {
                    center: min,
                    probability: 1.0,
                    count: samples.len(),
                }],
            };
        }

        let bin_width = (max - min) / self.bins as f64;
        let mut counts = vec![0usize; self.bins];
        for &value in samples {
            let index = (((value - min) / bin_width).floor() as usize).min(self.bins - 1);
            counts[index] += 1;
        }

        let total = samples.len() as f64;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                center: min + bin_width * (i as f64 + 0.5),
                probability: count as f64 / total,
                count,
            })
            .collect();

        Histogram {
            min,
            max,
            bin_width,
            bins,
        }
    }
}

fn sample_range(samples: &[f64]) -> Result<(f64, f64), FepBarError> {
    if samples.is_empty() {
        return Err(FepBarError::EmptySampleSet);
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &value in samples {
        min = min.min(value);
        max = max.max(value);
    }
    Ok((min, max))
}
