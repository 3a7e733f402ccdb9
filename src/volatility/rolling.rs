//! Trailing-window accumulators
//!
//! `RunningSum` keeps a sum over the last `width` values by adding the
//! entering value and subtracting the leaving one. Nonlinear reductions
//! (sample deviation, mean-then-sqrt) recompute over `window_range` slices.

use std::ops::Range;

/// Index range of the `i`-th trailing window of width `width`
pub fn window_range(i: usize, width: usize) -> Range<usize> {
    i..i + width
}

/// Number of full trailing windows over `len` values
pub fn window_count(len: usize, width: usize) -> usize {
    if width == 0 || len < width {
        0
    } else {
        len - width + 1
    }
}

/// Sum over a fixed-width trailing window, updated incrementally
#[derive(Debug, Clone)]
pub struct RunningSum<'a> {
    values: &'a [f64],
    width: usize,
    next: usize,
    sum: f64,
}

impl<'a> RunningSum<'a> {
    pub fn new(values: &'a [f64], width: usize) -> Self {
        Self {
            values,
            width,
            next: 0,
            sum: 0.0,
        }
    }

    /// Slide one position; returns the sum once the window is full
    pub fn advance(&mut self) -> Option<f64> {
        loop {
            let incoming = *self.values.get(self.next)?;
            self.sum += incoming;
            if self.next >= self.width {
                self.sum -= self.values[self.next - self.width];
            }
            self.next += 1;
            if self.next >= self.width {
                return Some(self.sum);
            }
        }
    }
}

/// Mean of a window
pub fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Sample standard deviation (n - 1 denominator), two-pass
pub fn sample_std(window: &[f64]) -> f64 {
    let m = mean(window);
    let ss: f64 = window.iter().map(|x| (x - m) * (x - m)).sum();
    (ss / (window.len() as f64 - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_sum_matches_direct() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut acc = RunningSum::new(&values, 3);
        let mut sums = Vec::new();
        while let Some(s) = acc.advance() {
            sums.push(s);
        }
        assert_eq!(sums, vec![6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_running_sum_short_input() {
        let values = [1.0, 2.0];
        let mut acc = RunningSum::new(&values, 3);
        assert_eq!(acc.advance(), None);
    }

    #[test]
    fn test_window_count() {
        assert_eq!(window_count(5, 3), 3);
        assert_eq!(window_count(2, 3), 0);
        assert_eq!(window_count(3, 3), 1);
    }

    #[test]
    fn test_sample_std() {
        let s = sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((s - 2.138089935).abs() < 1e-8);
    }
}
