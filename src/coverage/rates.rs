//! Line and branch rate calculation
//!
//! Rates are plain ratios in `0.0..=1.0`. A set with nothing to cover counts
//! as fully covered.

use super::{BranchCoverage, FileCoverage};

/// Fraction of lines with a nonzero hit count across `files`.
pub fn line_rate<'a, I>(files: I) -> f64
where
    I: IntoIterator<Item = &'a FileCoverage>,
{
    let (covered, total) = files
        .into_iter()
        .flatten()
        .fold((0u64, 0u64), |(covered, total), line| {
            (covered + u64::from(line.hits > 0), total + 1)
        });
    ratio(covered, total)
}

/// Fraction of branches with a nonzero hit count across `files`.
pub fn branch_rate<'a, I>(files: I) -> f64
where
    I: IntoIterator<Item = &'a FileCoverage>,
{
    let (covered, total) = files
        .into_iter()
        .flatten()
        .flat_map(|line| line.branches.iter())
        .fold((0u64, 0u64), |(covered, total), branch| {
            (covered + u64::from(branch.hits > 0), total + 1)
        });
    ratio(covered, total)
}

/// Branch summary of one line, e.g. `"50% (1/2)"`. The percentage is
/// truncated, not rounded.
pub fn branch_rate_string(branches: &[BranchCoverage]) -> String {
    let total = branches.len();
    if total == 0 {
        return "100% (0/0)".to_string();
    }
    let covered = branches.iter().filter(|b| b.hits > 0).count();
    format!("{}% ({}/{})", covered * 100 / total, covered, total)
}

fn ratio(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 1.0;
    }
    covered as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::LineCoverage;

    fn line(number: u32, hits: u64, branches: &[u64]) -> LineCoverage {
        LineCoverage {
            number,
            hits,
            branches: branches.iter().map(|&hits| BranchCoverage { hits }).collect(),
        }
    }

    #[test]
    fn test_empty_is_fully_covered() {
        let none: Vec<FileCoverage> = Vec::new();
        assert_eq!(line_rate(&none), 1.0);
        assert_eq!(branch_rate(&none), 1.0);

        let empty_file: FileCoverage = Vec::new();
        assert_eq!(line_rate([&empty_file]), 1.0);
        assert_eq!(branch_rate([&empty_file]), 1.0);
    }

    #[test]
    fn test_line_rate() {
        let file = vec![line(1, 1, &[]), line(2, 0, &[]), line(3, 7, &[]), line(4, 0, &[])];
        assert_eq!(line_rate([&file]), 0.5);

        let other = vec![line(1, 0, &[]), line(2, 0, &[]), line(3, 0, &[]), line(4, 0, &[])];
        assert_eq!(line_rate([&file, &other]), 0.25);
    }

    #[test]
    fn test_branch_rate_spans_lines_and_files() {
        let a = vec![line(1, 1, &[1, 0]), line(2, 1, &[])];
        let b = vec![line(1, 1, &[0, 0])];
        assert_eq!(branch_rate([&a]), 0.5);
        assert_eq!(branch_rate([&a, &b]), 0.25);
        // Lines without branches do not count toward the branch rate.
        assert_eq!(branch_rate([&vec![line(1, 0, &[])]]), 1.0);
    }

    #[test]
    fn test_branch_rate_string() {
        assert_eq!(branch_rate_string(&[]), "100% (0/0)");
        assert_eq!(branch_rate_string(&[BranchCoverage { hits: 0 }]), "0% (0/1)");
        assert_eq!(
            branch_rate_string(&[BranchCoverage { hits: 2 }, BranchCoverage { hits: 0 }]),
            "50% (1/2)"
        );
        let two_of_three = [BranchCoverage { hits: 1 }, BranchCoverage { hits: 1 }, BranchCoverage { hits: 0 }];
        assert_eq!(branch_rate_string(&two_of_three), "66% (2/3)");
    }
}
