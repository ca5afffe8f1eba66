//! Reporting hook fired once after training completes
//!
//! Plotting is deliberately decoupled from the epoch loop: the trainer hands
//! the recorded history to a caller-supplied `TrainingReport` and moves on.
//! Nothing is persisted unless the implementation chooses to.

use super::History;

/// Callback invoked with the full history after the final epoch
pub trait TrainingReport {
    fn on_training_complete(&mut self, history: &History);
}

/// Discards the history
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReport;

impl TrainingReport for NullReport {
    fn on_training_complete(&mut self, _history: &History) {}
}

/// Renders one fixed-height ASCII line chart per recorded series, titled
/// with the metric name
#[derive(Debug, Clone)]
pub struct ConsoleChart {
    width: usize,
    height: usize,
}

impl ConsoleChart {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width.max(1),
            height: height.max(2),
        }
    }

    /// Render every series to a string, one chart per series
    pub fn render(&self, history: &History) -> String {
        let mut out = String::new();
        for (name, values) in history.series() {
            out.push_str(&self.render_series(name, values));
        }
        out
    }

    fn render_series(&self, name: &str, values: &[f32]) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let _ = writeln!(out, "{name}");
        if values.is_empty() {
            let _ = writeln!(out, "  (no epochs recorded)");
            return out;
        }

        let columns = self.resample(values);
        let min = columns.iter().copied().fold(f32::INFINITY, f32::min);
        let max = columns.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let span = if (max - min).abs() < f32::EPSILON {
            1.0
        } else {
            max - min
        };

        // Row 0 is the top of the chart
        let mut grid = vec![vec![' '; columns.len()]; self.height];
        for (col, &v) in columns.iter().enumerate() {
            let level = ((v - min) / span * (self.height - 1) as f32).round() as usize;
            let row = self.height - 1 - level.min(self.height - 1);
            grid[row][col] = '*';
        }

        let _ = writeln!(out, "  {max:>10.4} +");
        for row in grid {
            let line: String = row.into_iter().collect();
            let _ = writeln!(out, "             |{line}");
        }
        let _ = writeln!(out, "  {min:>10.4} +{}", "-".repeat(columns.len()));
        let _ = writeln!(out, "             epochs: {}", values.len());
        out
    }

    /// Squeeze the series into at most `width` columns
    fn resample(&self, values: &[f32]) -> Vec<f32> {
        if values.len() <= self.width {
            return values.to_vec();
        }
        (0..self.width)
            .map(|i| {
                let idx = i * (values.len() - 1) / (self.width - 1).max(1);
                values[idx]
            })
            .collect()
    }
}

impl Default for ConsoleChart {
    fn default() -> Self {
        Self::new(60, 10)
    }
}

impl TrainingReport for ConsoleChart {
    fn on_training_complete(&mut self, history: &History) {
        print!("{}", self.render(history));
    }
}
