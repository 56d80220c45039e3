//! Coverage summary and threshold validation

use colored::Colorize;

use super::Coverage;

/// Totals over a whole report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageSummary {
    pub files: usize,
    pub lines_covered: u64,
    pub lines_total: u64,
    pub branches_covered: u64,
    pub branches_total: u64,
}

impl CoverageSummary {
    pub fn from_coverage(coverage: &Coverage) -> Self {
        let mut summary = CoverageSummary {
            files: coverage.len(),
            ..Default::default()
        };

        for line in coverage.values().flatten() {
            summary.lines_total += 1;
            if line.hits > 0 {
                summary.lines_covered += 1;
            }
            for branch in &line.branches {
                summary.branches_total += 1;
                if branch.hits > 0 {
                    summary.branches_covered += 1;
                }
            }
        }

        summary
    }

    /// Line coverage in percent; 100 when there are no lines.
    pub fn line_percentage(&self) -> f64 {
        percentage(self.lines_covered, self.lines_total)
    }

    /// Branch coverage in percent; 100 when there are no branches.
    pub fn branch_percentage(&self) -> f64 {
        percentage(self.branches_covered, self.branches_total)
    }

    pub fn print_summary(&self) {
        eprintln!(
            "  {} Lines:    {:.1}% ({}/{})",
            "•".cyan(),
            self.line_percentage(),
            self.lines_covered,
            self.lines_total
        );
        eprintln!(
            "  {} Branches: {:.1}% ({}/{})",
            "•".cyan(),
            self.branch_percentage(),
            self.branches_covered,
            self.branches_total
        );
        eprintln!("  {} Files:    {}", "•".cyan(), self.files);
    }
}

fn percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (covered as f64 / total as f64) * 100.0
}

/// Result of threshold validation
#[derive(Debug, Clone)]
pub struct ThresholdResult {
    pub passed: bool,
    pub line_coverage: f64,
    pub branch_coverage: f64,
    pub line_threshold: Option<f64>,
    pub branch_threshold: Option<f64>,
    pub line_delta: Option<f64>,
    pub branch_delta: Option<f64>,
}

impl ThresholdResult {
    pub fn print_summary(&self) {
        if let (Some(threshold), Some(delta)) = (self.line_threshold, self.line_delta) {
            print_check("Line", self.line_coverage, threshold, delta);
        }
        if let (Some(threshold), Some(delta)) = (self.branch_threshold, self.branch_delta) {
            print_check("Branch", self.branch_coverage, threshold, delta);
        }
    }
}

fn print_check(label: &str, coverage: f64, threshold: f64, delta: f64) {
    let status = if delta >= 0.0 { "✓".green() } else { "✗".red() };
    let delta_str = if delta >= 0.0 {
        format!("+{:.1}%", delta).green()
    } else {
        format!("{:.1}%", delta).red()
    };

    eprintln!(
        "  {} {} coverage: {:.1}% (threshold: {:.1}%, {})",
        status, label, coverage, threshold, delta_str
    );
}

/// Validate coverage against optional minimum percentages
pub fn validate_threshold(
    summary: &CoverageSummary,
    line_threshold: Option<f64>,
    branch_threshold: Option<f64>,
) -> ThresholdResult {
    let line_coverage = summary.line_percentage();
    let branch_coverage = summary.branch_percentage();

    let line_delta = line_threshold.map(|thresh| line_coverage - thresh);
    let branch_delta = branch_threshold.map(|thresh| branch_coverage - thresh);

    ThresholdResult {
        passed: line_delta.map_or(true, |d| d >= 0.0) && branch_delta.map_or(true, |d| d >= 0.0),
        line_coverage,
        branch_coverage,
        line_threshold,
        branch_threshold,
        line_delta,
        branch_delta,
    }
}
