//! Tracking summary of the approximations against the official index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sprecon_index::{Approximations, CorrelationMatrix, TrackingStats};
use std::fmt;

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}%", v * 100.0))
}

fn num(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v))
}

/// Tracking statistics and return correlations for one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSummary {
    /// Run name.
    pub name: String,

    /// First date compared.
    pub period_start: Option<NaiveDate>,

    /// Last date compared.
    pub period_end: Option<NaiveDate>,

    /// Rebalancing frequency of Method B.
    pub frequency: String,

    /// One entry per approximation.
    pub tracking: Vec<TrackingStats>,

    /// Return correlation matrix.
    pub correlation: CorrelationMatrix,
}

impl ComparisonSummary {
    /// Summarize a comparison run.
    pub fn new(name: impl Into<String>, frequency: impl fmt::Display, result: &Approximations) -> Self {
        Self {
            name: name.into(),
            period_start: result.start,
            period_end: result.end,
            frequency: frequency.to_string(),
            tracking: result.tracking.clone(),
            correlation: result.correlation.clone(),
        }
    }

    fn period(&self) -> String {
        match (self.period_start, self.period_end) {
            (Some(start), Some(end)) => format!("{} to {}", start, end),
            _ => "empty".to_string(),
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nIndex Reconstruction: {}\n", self.name));
        output.push_str(&format!("Period: {}\n", self.period()));
        output.push_str(&format!("Method B rebalancing: {}\n", self.frequency));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output.push_str("\nTracking vs. official index:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "{:<8} {:>8} {:>12} {:>14} {:>14} {:>12} {:>6}\n",
            "Method", "Corr.", "Mean diff.", "Tracking err.", "Cum. approx", "Cum. S&P", "N"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');
        for stats in &self.tracking {
            output.push_str(&format!(
                "{:<8} {:>8} {:>12} {:>14} {:>14} {:>12} {:>6}\n",
                stats.method,
                num(stats.correlation),
                pct(stats.mean_difference),
                pct(stats.tracking_error),
                num(stats.final_cumret_approx),
                num(stats.final_cumret_official),
                stats.observations
            ));
        }

        if !self.correlation.labels.is_empty() {
            output.push_str("\nReturn correlations:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!("{:<16}", ""));
            for label in &self.correlation.labels {
                output.push_str(&format!(" {:>16}", label));
            }
            output.push('\n');
            for (label, row) in self.correlation.labels.iter().zip(&self.correlation.values) {
                output.push_str(&format!("{:<16}", label));
                for value in row {
                    output.push_str(&format!(" {:>16}", num(*value)));
                }
                output.push('\n');
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Index Reconstruction: {}\n\n", self.name));
        output.push_str(&format!("**Period:** {}\n\n", self.period()));
        output.push_str(&format!("**Method B rebalancing:** {}\n\n", self.frequency));

        output.push_str("## Tracking\n\n");
        output.push_str(
            "| Method | Correlation | Mean Difference | Tracking Error | Cumulative (approx) | Cumulative (S&P) | N |\n",
        );
        output.push_str(
            "|--------|-------------|-----------------|----------------|---------------------|------------------|---|\n",
        );
        for stats in &self.tracking {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                stats.method,
                num(stats.correlation),
                pct(stats.mean_difference),
                pct(stats.tracking_error),
                num(stats.final_cumret_approx),
                num(stats.final_cumret_official),
                stats.observations
            ));
        }

        if !self.correlation.labels.is_empty() {
            output.push_str("\n## Return Correlations\n\n|");
            for label in &self.correlation.labels {
                output.push_str(&format!(" | {}", label));
            }
            output.push_str(" |\n|---");
            for _ in &self.correlation.labels {
                output.push_str("|---");
            }
            output.push_str("|\n");
            for (label, row) in self.correlation.labels.iter().zip(&self.correlation.values) {
                output.push_str(&format!("| {}", label));
                for value in row {
                    output.push_str(&format!(" | {}", num(*value)));
                }
                output.push_str(" |\n");
            }
        }

        output
    }
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index Reconstruction: {} ({})", self.name, self.period())?;
        for stats in &self.tracking {
            writeln!(
                f,
                "  Method {}: correlation {}, tracking error {}, cumulative {} vs {}",
                stats.method,
                num(stats.correlation),
                pct(stats.tracking_error),
                num(stats.final_cumret_approx),
                num(stats.final_cumret_official)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn summary() -> ComparisonSummary {
        let days: Vec<i32> = (0..4).collect();
        let frame = DataFrame::new(vec![
            Series::new("date".into(), days)
                .cast(&DataType::Date)
                .unwrap()
                .into(),
            Series::new(
                "sprtrn".into(),
                vec![None, Some(0.01), Some(-0.02), Some(0.03)],
            )
            .into(),
            Series::new(
                "ret_approx_A".into(),
                vec![None, Some(0.012), Some(-0.018), Some(0.027)],
            )
            .into(),
            Series::new(
                "ret_approx_B".into(),
                vec![None, Some(0.0101), Some(-0.0199), Some(0.0301)],
            )
            .into(),
        ])
        .unwrap();

        ComparisonSummary {
            name: "S&P 500".to_string(),
            period_start: NaiveDate::from_ymd_opt(2019, 1, 31),
            period_end: NaiveDate::from_ymd_opt(2019, 4, 30),
            frequency: "quarterly".to_string(),
            tracking: vec![
                TrackingStats::compute("A", &frame, "ret_approx_A", "sprtrn").unwrap(),
                TrackingStats::compute("B", &frame, "ret_approx_B", "sprtrn").unwrap(),
            ],
            correlation: CorrelationMatrix::compute(&frame, &["sprtrn", "ret_approx_A"]).unwrap(),
        }
    }

    #[test]
    fn test_ascii_table() {
        let ascii = summary().to_ascii_table();
        assert!(ascii.contains("Index Reconstruction: S&P 500"));
        assert!(ascii.contains("Period: 2019-01-31 to 2019-04-30"));
        assert!(ascii.contains("quarterly"));
        assert!(ascii.contains("ret_approx_A"));
        assert!(ascii.contains("1.0000"));
    }

    #[test]
    fn test_markdown() {
        let markdown = summary().to_markdown();
        assert!(markdown.contains("# Index Reconstruction: S&P 500"));
        assert!(markdown.contains("| Method | Correlation |"));
        assert!(markdown.contains("## Return Correlations"));
        assert!(markdown.contains("| B |"));
    }

    #[test]
    fn test_display() {
        let text = summary().to_string();
        assert!(text.contains("Method A"));
        assert!(text.contains("Method B"));
    }

    #[test]
    fn test_missing_values_render_as_na() {
        let mut s = summary();
        s.tracking[0].correlation = None;
        s.period_end = None;
        assert!(s.to_ascii_table().contains("n/a"));
        assert!(s.to_ascii_table().contains("Period: empty"));
    }
}
