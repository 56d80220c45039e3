//! `llvm-cov show` report parser
//!
//! Turns the line-oriented text report into a [`Coverage`] map. The parser
//! keeps two pieces of cross-line state: the file currently being filled and
//! the index of the last line appended to it, which branch counts attach to.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{classify_line, parse_hits, BranchCoverage, ColumnLayout, Coverage, FileName, LineCoverage, LineKind};
use crate::paths::relative_path;

/// Settings the parser needs from its caller.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Absolute source root; file names are made relative to it.
    pub root: PathBuf,
    /// Root-relative paths or path prefixes to leave out of the report.
    pub exclude: Vec<String>,
    pub layout: ColumnLayout,
}

/// A report line (or branch token) that could not be parsed and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("Failed to process hit count '{value}' at line {line_number}: {line}")]
    InvalidHitCount {
        line_number: usize,
        value: String,
        line: String,
    },

    #[error("Failed to process line number '{value}' at line {line_number}: {line}")]
    InvalidLineNumber {
        line_number: usize,
        value: String,
        line: String,
    },

    #[error("Failed to process branch hit count '{value}' at line {line_number}: {line}")]
    InvalidBranchHits {
        line_number: usize,
        value: String,
        line: String,
    },
}

impl Diagnostic {
    /// 1-based position of the offending line in the report.
    pub fn line_number(&self) -> usize {
        match self {
            Diagnostic::InvalidHitCount { line_number, .. }
            | Diagnostic::InvalidLineNumber { line_number, .. }
            | Diagnostic::InvalidBranchHits { line_number, .. } => *line_number,
        }
    }
}

/// What a finished parse produced.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub coverage: Coverage,
    pub diagnostics: Vec<Diagnostic>,
}

/// Streaming parser over report lines.
///
/// ```
/// use llvm_cov_xml::coverage::{CoverageParser, ParserOptions};
///
/// let mut parser = CoverageParser::new(ParserOptions {
///     root: "/a/b".into(),
///     ..Default::default()
/// });
/// parser.feed_line("/a/b/Foo.swift:");
/// parser.feed_line("    1| 5|code");
/// parser.feed_line("    ^3|code");
///
/// let outcome = parser.finish();
/// let lines = &outcome.coverage["Foo.swift"];
/// assert_eq!(lines[0].number, 1);
/// assert_eq!(lines[0].hits, 5);
/// assert_eq!(lines[0].branches[0].hits, 3);
/// ```
#[derive(Debug)]
pub struct CoverageParser {
    options: ParserOptions,
    coverage: Coverage,
    diagnostics: Vec<Diagnostic>,
    current_file: Option<FileName>,
    current_line: Option<usize>,
    lines_seen: usize,
}

impl CoverageParser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            coverage: Coverage::new(),
            diagnostics: Vec::new(),
            current_file: None,
            current_line: None,
            lines_seen: 0,
        }
    }

    /// Process the next report line.
    pub fn feed_line(&mut self, line: &str) {
        self.lines_seen += 1;

        match classify_line(line, self.options.layout) {
            LineKind::FileBegin(path) => self.begin_file(path),
            LineKind::UncoveredMarker => self.current_line = None,
            LineKind::LineHit { hits, number } => self.line_hit(line, hits, number),
            LineKind::BranchHits(tokens) => self.branch_hits(line, &tokens),
            LineKind::Other => {}
        }
    }

    /// Coverage collected so far.
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn finish(self) -> ParseOutcome {
        ParseOutcome {
            coverage: self.coverage,
            diagnostics: self.diagnostics,
        }
    }

    fn begin_file(&mut self, path: &str) {
        self.current_line = None;

        let name = relative_path(Path::new(path), &self.options.root);
        if name == ".." || name.starts_with("../") {
            tracing::debug!("Outside source root, skipped {}", path);
            self.current_file = None;
            return;
        }
        if is_excluded(&name, &self.options.exclude) {
            tracing::debug!("Skipped {}", name);
            self.current_file = None;
            return;
        }

        tracing::debug!("Processing {}", name);
        self.coverage.insert(name.clone(), Vec::new());
        self.current_file = Some(name);
    }

    fn line_hit(&mut self, line: &str, hits: &str, number: &str) {
        let Some(hits_value) = parse_hits(hits) else {
            self.report(Diagnostic::InvalidHitCount {
                line_number: self.lines_seen,
                value: hits.to_string(),
                line: line.to_string(),
            });
            return;
        };
        let Ok(number_value) = number.parse::<u32>() else {
            self.report(Diagnostic::InvalidLineNumber {
                line_number: self.lines_seen,
                value: number.to_string(),
                line: line.to_string(),
            });
            return;
        };

        let Some(lines) = self.current_lines() else {
            return;
        };
        lines.push(LineCoverage::new(number_value, hits_value));
        let index = lines.len() - 1;
        self.current_line = Some(index);
    }

    fn branch_hits(&mut self, line: &str, tokens: &[&str]) {
        let Some(index) = self.current_line else {
            return;
        };

        for token in tokens {
            match parse_hits(token) {
                Some(hits) => {
                    if let Some(target) = self.current_lines().and_then(|lines| lines.get_mut(index)) {
                        target.branches.push(BranchCoverage { hits });
                    }
                }
                None => self.report(Diagnostic::InvalidBranchHits {
                    line_number: self.lines_seen,
                    value: token.to_string(),
                    line: line.to_string(),
                }),
            }
        }
    }

    fn current_lines(&mut self) -> Option<&mut Vec<LineCoverage>> {
        let file = self.current_file.as_ref()?;
        self.coverage.get_mut(file)
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Whether `name` equals or starts with any exclusion entry.
pub fn is_excluded(name: &str, exclude: &[String]) -> bool {
    exclude
        .iter()
        .any(|prefix| name == prefix || name.starts_with(prefix.as_str()))
}

/// Parse a whole report held in memory.
pub fn parse_report(text: &str, options: ParserOptions) -> ParseOutcome {
    let mut parser = CoverageParser::new(options);
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}

/// Parse a report from a reader. Only a failure to read the text is an error;
/// malformed lines end up in [`ParseOutcome::diagnostics`].
///
/// Lines are decoded lossily; only I/O errors are returned.
pub fn parse_reader<R: BufRead>(mut reader: R, options: ParserOptions) -> Result<ParseOutcome> {
    let mut parser = CoverageParser::new(options);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read line {}", parser.lines_seen + 1))?;
        if read == 0 {
            break;
        }

        let mut bytes = buf.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        parser.feed_line(&String::from_utf8_lossy(bytes));
    }
    Ok(parser.finish())
}
