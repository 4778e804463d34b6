//! Duration histograms for queried journeys.
//!
//! The query layer only depends on the [`DurationVisualizer`] trait; any
//! charting backend can implement it. [`TextHistogram`] is the built-in
//! implementation, drawing bars as text.
//!
//! # Binning
//!
//! Durations are truncated to whole minutes and counted in fixed-width bins
//! spanning `[0, max + width]`. Bins are closed on the right, with the first
//! one also including zero: `[0,2], (2,4], (4,6], ...`.

use crate::error::{JourneyError, Result};
use crate::utils::{DURATION, f64_values};
use polars::prelude::*;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

/// Default bin width, in minutes.
pub const DEFAULT_BIN_WIDTH: u32 = 2;

/// Widest bar drawn by [`TextHistogram`], in characters.
const MAX_BAR: usize = 40;

/// Renders the `duration` column of a journey table.
///
/// Implementations must be `Send + Sync`.
pub trait DurationVisualizer: Send + Sync {
    /// Render a histogram of `df`'s durations under `title`.
    fn render(&self, df: &DataFrame, title: &str) -> Result<()>;
}

/// One histogram bin covering `(lower, upper]` minutes (`[0, upper]` for the
/// first bin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub lower: i64,
    pub upper: i64,
    pub count: usize,
}

/// Counts of journey durations per fixed-width bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Histogram {
    pub bin_width: u32,
    pub bins: Vec<Bin>,
    /// Durations below zero, which no bin covers.
    pub out_of_range: usize,
}

impl Histogram {
    /// Bin `durations`, skipping nulls.
    ///
    /// Fails with [`JourneyError::InvalidConfig`] for a zero `bin_width`.
    pub fn from_durations(durations: &[Option<f64>], bin_width: u32) -> Result<Self> {
        if bin_width == 0 {
            return Err(JourneyError::InvalidConfig(
                "histogram bin width must be at least 1 minute".to_string(),
            ));
        }

        let minutes: Vec<i64> = durations
            .iter()
            .flatten()
            .filter(|d| d.is_finite())
            .map(|d| d.trunc() as i64)
            .collect();

        let width = i64::from(bin_width);
        let bin_count = match minutes.iter().max() {
            Some(&max) if max >= 0 => ((max + width) / width) as usize,
            _ => 0,
        };

        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| Bin {
                lower: i as i64 * width,
                upper: (i as i64 + 1) * width,
                count: 0,
            })
            .collect();

        let mut out_of_range = 0;
        for &value in &minutes {
            if value < 0 {
                out_of_range += 1;
                continue;
            }
            let index = if value == 0 { 0 } else { ((value - 1) / width) as usize };
            bins[index].count += 1;
        }

        Ok(Self {
            bin_width,
            bins,
            out_of_range,
        })
    }

    /// Bin the `duration` column of an enriched journey table.
    pub fn from_frame(df: &DataFrame, bin_width: u32) -> Result<Self> {
        Self::from_durations(&f64_values(df, DURATION)?, bin_width)
    }

    /// Number of durations placed in a bin.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

/// Draws histograms as rows of `#` characters.
pub struct TextHistogram {
    bin_width: u32,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TextHistogram {
    /// Render to `writer` with the default bin width.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            bin_width: DEFAULT_BIN_WIDTH,
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Render to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Use a different bin width; zero is rejected.
    pub fn with_bin_width(mut self, bin_width: u32) -> Result<Self> {
        if bin_width == 0 {
            return Err(JourneyError::InvalidConfig(
                "histogram bin width must be at least 1 minute".to_string(),
            ));
        }
        self.bin_width = bin_width;
        Ok(self)
    }

    /// Format `histogram` as text lines.
    pub fn format(histogram: &Histogram, title: &str) -> Vec<String> {
        let mut lines = vec![title.to_string()];

        if histogram.bins.is_empty() {
            lines.push("  (no durations to plot)".to_string());
            return lines;
        }

        let tallest = histogram.bins.iter().map(|b| b.count).max().unwrap_or(0);
        for (i, bin) in histogram.bins.iter().enumerate() {
            let label = if i == 0 {
                format!("[{}, {}]", bin.lower, bin.upper)
            } else {
                format!("({}, {}]", bin.lower, bin.upper)
            };
            let bar = if tallest == 0 {
                0
            } else {
                (bin.count * MAX_BAR).div_ceil(tallest)
            };
            lines.push(format!("  {:>10} | {} {}", label, "#".repeat(bar), bin.count));
        }

        if histogram.out_of_range > 0 {
            lines.push(format!(
                "  {} negative duration(s) not shown",
                histogram.out_of_range
            ));
        }

        lines
    }
}

impl DurationVisualizer for TextHistogram {
    fn render(&self, df: &DataFrame, title: &str) -> Result<()> {
        let histogram = Histogram::from_frame(df, self.bin_width)?;

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| JourneyError::Visualization("output writer poisoned".to_string()))?;
        for line in Self::format(&histogram, title) {
            writeln!(writer, "{line}").map_err(|e| JourneyError::Visualization(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| JourneyError::Visualization(e.to_string()))
    }
}

static_assertions::assert_impl_all!(TextHistogram: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn counts(histogram: &Histogram) -> Vec<usize> {
        histogram.bins.iter().map(|b| b.count).collect()
    }

    #[test]
    fn test_bins_span_zero_to_max_plus_width() {
        let histogram =
            Histogram::from_durations(&[Some(20.0), Some(21.0), Some(3.0)], 2).unwrap();

        assert_eq!(histogram.bins.len(), 11);
        assert_eq!(histogram.bins[0].lower, 0);
        assert_eq!(histogram.bins.last().unwrap().upper, 22);
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_bins_are_right_closed() {
        let histogram = Histogram::from_durations(
            &[Some(0.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            2,
        )
        .unwrap();

        assert_eq!(counts(&histogram), vec![2, 2, 1]);
    }

    #[test]
    fn test_fractions_are_truncated() {
        let histogram = Histogram::from_durations(&[Some(2.9), Some(4.99)], 2).unwrap();
        // 2 and 4 minutes
        assert_eq!(counts(&histogram), vec![1, 1, 0]);
    }

    #[test]
    fn test_nulls_and_negatives() {
        let histogram =
            Histogram::from_durations(&[None, Some(-1420.0), Some(6.0)], 2).unwrap();
        assert_eq!(histogram.out_of_range, 1);
        assert_eq!(histogram.total(), 1);

        let empty = Histogram::from_durations(&[None, Some(-5.0)], 2).unwrap();
        assert!(empty.bins.is_empty());
    }

    #[test]
    fn test_zero_bin_width_rejected() {
        assert!(Histogram::from_durations(&[Some(1.0)], 0).is_err());
        assert!(TextHistogram::stdout().with_bin_width(0).is_err());
    }

    #[test]
    fn test_text_histogram_renders_title_and_bars() {
        let buffer = SharedBuffer::default();
        let visualizer = TextHistogram::new(buffer.clone());
        let df = df!("duration" => &[Some(1.0), Some(3.0), Some(4.0), None]).unwrap();

        visualizer.render(&df, "Bank to Waterloo").unwrap();

        let output = buffer.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Bank to Waterloo");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("[0, 2]"));
        assert!(lines[1].ends_with(" 1"));
        assert!(lines[2].contains("(2, 4]"));
        assert!(lines[2].ends_with(" 2"));
    }

    #[test]
    fn test_text_histogram_empty_frame() {
        let lines = TextHistogram::format(
            &Histogram::from_durations(&[], DEFAULT_BIN_WIDTH).unwrap(),
            "A to B",
        );
        assert_eq!(lines.len(), 2);
    }
}
