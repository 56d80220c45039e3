//! Cobertura XML report generation
//!
//! The document is written element by element as the model is walked, so
//! large reports are never held in memory as a string.

use std::io::Write;

use anyhow::Result;
use quick_xml::escape::escape;

use super::{branch_rate, branch_rate_string, class_name, group_packages, line_rate, Coverage, LineCoverage};

pub const COBERTURA_DTD: &str = "http://cobertura.sourceforge.net/xml/coverage-03.dtd";

/// Value of the `version` attribute on `<coverage>`.
pub const GENERATOR_VERSION: &str = concat!("llvm-cov-xml ", env!("CARGO_PKG_VERSION"));

/// Write `coverage` as a Cobertura XML document.
///
/// `source_root` fills the single `<source>` element and `timestamp` is in
/// unix seconds.
pub fn write_cobertura<W: Write>(
    out: &mut W,
    coverage: &Coverage,
    source_root: &str,
    timestamp: i64,
) -> Result<()> {
    writeln!(out, "<?xml version=\"1.0\" ?>")?;
    writeln!(out, "<!DOCTYPE coverage SYSTEM '{}'>", COBERTURA_DTD)?;
    writeln!(
        out,
        "<coverage branch-rate=\"{}\" line-rate=\"{}\" timestamp=\"{}\" version=\"{}\">",
        format_rate(branch_rate(coverage.values())),
        format_rate(line_rate(coverage.values())),
        timestamp,
        GENERATOR_VERSION
    )?;
    writeln!(out, " <sources><source>{}</source></sources>", escape(source_root))?;
    writeln!(out, " <packages>")?;

    for (package, files) in group_packages(coverage) {
        let package_files = || files.iter().map(|(_, lines)| *lines);
        writeln!(
            out,
            "  <package branch-rate=\"{}\" complexity=\"0.0\" line-rate=\"{}\" name=\"{}\">",
            format_rate(branch_rate(package_files())),
            format_rate(line_rate(package_files())),
            escape(&package)
        )?;
        writeln!(out, "   <classes>")?;

        for (filename, file) in &files {
            writeln!(
                out,
                "    <class branch-rate=\"{}\" complexity=\"0.0\" filename=\"{}\" line-rate=\"{}\" name=\"{}\">",
                format_rate(branch_rate([*file])),
                escape(*filename),
                format_rate(line_rate([*file])),
                escape(&class_name(filename))
            )?;
            writeln!(out, "     <methods/>")?;
            writeln!(out, "     <lines>")?;
            for line in file.iter() {
                write_line(out, line)?;
            }
            writeln!(out, "     </lines>")?;
            writeln!(out, "    </class>")?;
        }

        writeln!(out, "   </classes>")?;
        writeln!(out, "  </package>")?;
    }

    writeln!(out, " </packages>")?;
    writeln!(out, "</coverage>")?;
    out.flush()?;

    Ok(())
}

fn write_line<W: Write>(out: &mut W, line: &LineCoverage) -> Result<()> {
    write!(out, "      <line number=\"{}\" hits=\"{}\"", line.number, line.hits)?;

    if line.branches.is_empty() {
        writeln!(out, " branch=\"false\"/>")?;
        return Ok(());
    }

    // Branches are summarized into a single synthetic jump condition.
    let summary = branch_rate_string(&line.branches);
    let percent = summary.split(' ').next().unwrap_or(&summary);
    writeln!(out, " branch=\"true\" condition-coverage=\"{}\">", summary)?;
    writeln!(
        out,
        "       <conditions><condition coverage=\"{}\" number=\"0\" type=\"jump\"/></conditions>",
        percent
    )?;
    writeln!(out, "      </line>")?;

    Ok(())
}

/// Format a rate as its shortest round-trip decimal, always with a
/// fractional part: `1.0`, `0.5`, `0.3333333333333333`.
pub fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.1}", rate)
    } else {
        format!("{}", rate)
    }
}

/// Render the whole document into a string.
pub fn cobertura_string(coverage: &Coverage, source_root: &str, timestamp: i64) -> Result<String> {
    let mut buf = Vec::new();
    write_cobertura(&mut buf, coverage, source_root, timestamp)?;
    Ok(String::from_utf8(buf)?)
}
