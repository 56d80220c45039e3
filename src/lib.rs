//! llvm-cov-xml - Cobertura reports from `llvm-cov show`
//!
//! A library for turning `llvm-cov show` text output into Cobertura XML:
//! - Line classification and a streaming report parser
//! - Line and branch rates at report, package and file level
//! - Incremental Cobertura XML generation
//! - Config file loading and `llvm-cov` invocation for the CLI

pub mod config;
pub mod coverage;
pub mod llvm_cov;
pub mod paths;

pub use config::Config;
pub use coverage::{
    parse_reader, parse_report, write_cobertura, Coverage, CoverageParser, CoverageSummary, Diagnostic,
    ParseOutcome, ParserOptions,
};
