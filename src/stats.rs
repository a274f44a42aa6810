//! Descriptive statistics over `f64` samples.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Running accumulator (Welford)
// ---------------------------------------------------------------------------

/// Single-pass count / mean / variance / min / max.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: usize,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        RunningStats {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl RunningStats {
    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then_some(self.mean)
    }

    /// Sample standard deviation (n - 1). A single value gives 0.
    pub fn sample_std(&self) -> Option<f64> {
        match self.count {
            0 => None,
            1 => Some(0.0),
            n => Some((self.m2 / (n - 1) as f64).max(0.0).sqrt()),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Count, mean, median, sample std, min and max of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty sample; never a summary full of NaN.
    pub fn from_values(values: &[f64]) -> Option<Summary> {
        let mut acc = RunningStats::default();
        for &v in values {
            acc.push(v);
        }
        let mean = acc.mean()?;
        let std = acc.sample_std()?;
        let median = median(values)?;
        // Clamp: Welford's mean can drift by an ulp outside [min, max].
        let mean = mean.clamp(acc.min, acc.max);
        Some(Summary {
            count: acc.count(),
            mean,
            median,
            std,
            min: acc.min,
            max: acc.max,
        })
    }
}

/// Middle value; mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins over `[start, end]`; the last bin is closed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub start: f64,
    pub end: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `None` when there are no values or no bins.
    pub fn build(values: &[f64], bins: usize) -> Option<Histogram> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let mut start = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut end = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if (end - start).abs() < f64::EPSILON {
            start -= 0.5;
            end += 0.5;
        }
        let width = (end - start) / bins as f64;
        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - start) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Histogram { start, end, counts })
    }

    pub fn bin_width(&self) -> f64 {
        (self.end - self.start) / self.counts.len() as f64
    }

    /// `(lower edge, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        let width = self.bin_width();
        self.counts
            .iter()
            .enumerate()
            .map(move |(i, &c)| (self.start + i as f64 * width, c))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation. `None` when either side has zero variance or the
/// inputs are shorter than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= f64::EPSILON || syy <= f64::EPSILON {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_matches_known_values() {
        let s = Summary::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert!((s.median - 4.5).abs() < 1e-12);
        // sample std of this classic set: sqrt(32 / 7)
        assert!((s.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
    }

    #[test]
    fn empty_and_single_samples() {
        assert!(Summary::from_values(&[]).is_none());
        let one = Summary::from_values(&[3.0]).unwrap();
        assert_eq!(one.std, 0.0);
        assert_eq!(one.median, 3.0);
        assert!(one.min <= one.mean && one.mean <= one.max);
    }

    #[test]
    fn histogram_bins_cover_all_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let h = Histogram::build(&values, 10).unwrap();
        assert_eq!(h.total(), 100);
        assert!(h.counts.iter().all(|&c| c == 10));
        assert_eq!(h.bins().next(), Some((0.0, 10)));
    }

    #[test]
    fn histogram_of_constant_values() {
        let h = Histogram::build(&[5.0, 5.0, 5.0], 4).unwrap();
        assert_eq!(h.total(), 3);
        assert_eq!(h.start, 4.5);
        assert_eq!(h.end, 5.5);
        assert!(Histogram::build(&[], 4).is_none());
    }

    #[test]
    fn pearson_edges() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&[1.0], &[1.0]), None);
    }
}
