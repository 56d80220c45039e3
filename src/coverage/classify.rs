//! Line classification for `llvm-cov show` output
//!
//! Each report line is matched against a fixed, ordered set of patterns and
//! turned into a [`LineKind`]. Classification is stateless; deciding what a
//! kind means for the model is the parser's job.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// `/abs/path/File.swift:`
static FILE_BEGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(/.*):$").unwrap_or_else(|_| panic!("Invalid Regex")));

/// Two leading pipe-terminated columns, both non-blank. A leading `^` marks
/// a branch line, even when its source gutter holds more pipes.
static LINE_HIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+([^|\s^][^|\s]*)\s*\|\s*([^|\s^][^|\s]*)\s*\|")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// `   12|      |code`: line number with a blank count column.
static UNCOVERED_LINE_FIRST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\d+\|\s*(?:\||$)").unwrap_or_else(|_| panic!("Invalid Regex")));

/// `       |   12|code`: blank count column before the line number.
static UNCOVERED_COUNT_FIRST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\|\s*\d+\|").unwrap_or_else(|_| panic!("Invalid Regex")));

/// `  ^3  ^0`, optionally followed by a `|` gutter.
static BRANCH_HITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\^[^\s|]+(?:\s+\^[^\s|]+)*\s*(?:\|.*)?$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

/// Order of the two leading columns of a report line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnLayout {
    /// `<line>|<count>|source`, as printed by current `llvm-cov`.
    #[default]
    LineFirst,
    /// `<count>|<line>|source`, as printed by the Xcode 7 toolchain.
    CountFirst,
}

/// Classification of a single report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Start of a source file section, carrying its absolute path.
    FileBegin(&'a str),
    /// A source line outside coverage tracking.
    UncoveredMarker,
    /// Raw hit-count and line-number fields, not yet parsed.
    LineHit { hits: &'a str, number: &'a str },
    /// Raw branch counts with the leading `^` removed.
    BranchHits(Vec<&'a str>),
    Other,
}

/// Classify one report line. Rules are tried in priority order and the
/// first match wins.
pub fn classify_line(line: &str, layout: ColumnLayout) -> LineKind<'_> {
    if let Some(caps) = FILE_BEGIN_RE.captures(line) {
        if let Some(path) = caps.get(1) {
            return LineKind::FileBegin(path.as_str());
        }
    }

    let uncovered = match layout {
        ColumnLayout::LineFirst => &*UNCOVERED_LINE_FIRST_RE,
        ColumnLayout::CountFirst => &*UNCOVERED_COUNT_FIRST_RE,
    };
    if uncovered.is_match(line) {
        return LineKind::UncoveredMarker;
    }

    if let Some(caps) = LINE_HIT_RE.captures(line) {
        let first = caps.get(1).map_or("", |m| m.as_str());
        let second = caps.get(2).map_or("", |m| m.as_str());
        return match layout {
            ColumnLayout::LineFirst => LineKind::LineHit {
                hits: second,
                number: first,
            },
            ColumnLayout::CountFirst => LineKind::LineHit {
                hits: first,
                number: second,
            },
        };
    }

    if BRANCH_HITS_RE.is_match(line) {
        let counts = line.split('|').next().unwrap_or("");
        let tokens = counts
            .split_whitespace()
            .map(|token| token.strip_prefix('^').unwrap_or(token))
            .collect();
        return LineKind::BranchHits(tokens);
    }

    LineKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_begin() {
        assert_eq!(
            classify_line("/a/b/Foo.swift:", ColumnLayout::LineFirst),
            LineKind::FileBegin("/a/b/Foo.swift")
        );
        // Relative paths and trailing text are not file headers.
        assert_eq!(classify_line("a/b/Foo.swift:", ColumnLayout::LineFirst), LineKind::Other);
        assert_eq!(classify_line("/a/b/Foo.swift: x", ColumnLayout::LineFirst), LineKind::Other);
    }

    #[test]
    fn test_line_first_columns() {
        assert_eq!(
            classify_line("    1| 5|code", ColumnLayout::LineFirst),
            LineKind::LineHit { hits: "5", number: "1" }
        );
        assert_eq!(
            classify_line("   12|  2.5k|  foo(x)", ColumnLayout::LineFirst),
            LineKind::LineHit { hits: "2.5k", number: "12" }
        );
        assert_eq!(
            classify_line("   12|      |// comment", ColumnLayout::LineFirst),
            LineKind::UncoveredMarker
        );
        assert_eq!(classify_line("   12|", ColumnLayout::LineFirst), LineKind::UncoveredMarker);
    }

    #[test]
    fn test_count_first_columns() {
        assert_eq!(
            classify_line("      5|    1|func foo() {", ColumnLayout::CountFirst),
            LineKind::LineHit { hits: "5", number: "1" }
        );
        assert_eq!(
            classify_line("       |    2|// comment", ColumnLayout::CountFirst),
            LineKind::UncoveredMarker
        );
    }

    #[test]
    fn test_malformed_fields_still_classify_as_line_hit() {
        assert_eq!(
            classify_line("    3| abc|code", ColumnLayout::LineFirst),
            LineKind::LineHit { hits: "abc", number: "3" }
        );
    }

    #[test]
    fn test_branch_hits() {
        assert_eq!(
            classify_line("    ^3|code", ColumnLayout::LineFirst),
            LineKind::BranchHits(vec!["3"])
        );
        assert_eq!(
            classify_line("      ^0  ^1.2k    ^7", ColumnLayout::LineFirst),
            LineKind::BranchHits(vec!["0", "1.2k", "7"])
        );
        assert_eq!(
            classify_line("  ^2 ^x", ColumnLayout::CountFirst),
            LineKind::BranchHits(vec!["2", "x"])
        );
        // Pipes in the gutter's source text do not make it a line record.
        assert_eq!(
            classify_line("    ^3| a || b", ColumnLayout::LineFirst),
            LineKind::BranchHits(vec!["3"])
        );
        assert_eq!(
            classify_line("  ^1  ^0| x | y |", ColumnLayout::CountFirst),
            LineKind::BranchHits(vec!["1", "0"])
        );
    }

    #[test]
    fn test_other_lines() {
        for line in ["", "   ", "------------------", "  ^", "  ^3 foo", "Filename Regions"] {
            assert_eq!(classify_line(line, ColumnLayout::LineFirst), LineKind::Other, "{line:?}");
        }
    }
}
