//! Coverage module
//!
//! Provides:
//! - `llvm-cov show` report parsing
//! - Line and branch rate calculation
//! - Package grouping
//! - Cobertura XML generation
//! - Threshold validation

mod classify;
mod cobertura;
mod hits;
mod package;
mod parser;
mod rates;
mod threshold;

pub use classify::*;
pub use cobertura::*;
pub use hits::*;
pub use package::*;
pub use parser::*;
pub use rates::*;
pub use threshold::*;

use std::collections::BTreeMap;

/// Path of a source file relative to the source root, `/`-separated.
pub type FileName = String;

/// Execution count of one branch at a source location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchCoverage {
    pub hits: u64,
}

/// Coverage of a single source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCoverage {
    /// 1-based source line number
    pub number: u32,
    pub hits: u64,
    /// Branches in the order they appear in the report
    pub branches: Vec<BranchCoverage>,
}

impl LineCoverage {
    pub fn new(number: u32, hits: u64) -> Self {
        Self {
            number,
            hits,
            branches: Vec::new(),
        }
    }
}

/// Lines of one file, in report order. Untracked lines are absent.
pub type FileCoverage = Vec<LineCoverage>;

/// Coverage of every tracked file, keyed by root-relative file name.
///
/// Iteration is sorted by file name, which keeps generated reports stable
/// between runs.
pub type Coverage = BTreeMap<FileName, FileCoverage>;
