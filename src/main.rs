use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use llvm_cov_xml::config::Config;
use llvm_cov_xml::coverage::{
    parse_reader, parse_report, validate_threshold, write_cobertura, ColumnLayout, CoverageSummary,
    ParseOutcome, ParserOptions,
};
use llvm_cov_xml::llvm_cov::run_llvm_cov_show;
use llvm_cov_xml::paths::{relative_path, resolve_path};

const DEFAULT_OUTPUT: &str = "coverage.xml";
const STDIO: &str = "-";

#[derive(Parser)]
#[command(name = "llvm-cov-xml")]
#[command(about = "Convert llvm-cov show output into Cobertura XML")]
#[command(version)]
struct Cli {
    /// Source root directory (default: current directory)
    #[arg(short, long)]
    root: Option<String>,

    /// Output file path, "-" for stdout (default: <root>/coverage.xml)
    #[arg(short, long)]
    output: Option<String>,

    /// Exclude files/directories (path prefixes or full paths, comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Read the llvm-cov show report from a file, "-" for stdin (default: stdin)
    #[arg(short, long, conflicts_with_all = ["binary", "profdata"])]
    input: Option<String>,

    /// Instrumented executable to run llvm-cov show against
    #[arg(long, requires = "profdata")]
    binary: Option<String>,

    /// Profile data for --binary
    #[arg(long, requires = "binary")]
    profdata: Option<String>,

    /// Column order of the report
    #[arg(long, value_enum)]
    layout: Option<ColumnLayout>,

    /// Path to config file (default: <root>/llvm-cov-xml.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Fail when line coverage is below this percentage
    #[arg(long)]
    fail_under_lines: Option<f64>,

    /// Fail when branch coverage is below this percentage
    #[arg(long)]
    fail_under_branches: Option<f64>,
}

/// Where the report goes
enum Output {
    Stdout,
    File(PathBuf),
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("llvm_cov_xml={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Returns whether the configured coverage thresholds were met.
fn run(cli: Cli) -> Result<bool> {
    let cwd = std::env::current_dir().context("Could not determine current directory")?;

    let root = match cli.root.as_deref() {
        Some(root) => resolve_path(root, &cwd),
        None => cwd.clone(),
    };
    if !root.is_dir() {
        anyhow::bail!("Directory '{}' does not exist", root.display());
    }
    tracing::debug!("Working directory: {}", root.display());

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(&resolve_path(path, &cwd))?,
        None => Config::load_from_root(&root)?,
    };

    let line_threshold = cli.fail_under_lines.or(config.thresholds.line);
    let branch_threshold = cli.fail_under_branches.or(config.thresholds.branch);
    check_threshold("--fail-under-lines", cli.fail_under_lines)?;
    check_threshold("--fail-under-branches", cli.fail_under_branches)?;

    let masks = if cli.exclude.is_empty() {
        &config.report.exclude
    } else {
        &cli.exclude
    };
    let exclude: Vec<String> = masks
        .iter()
        .filter(|mask| !mask.trim().is_empty())
        .map(|mask| relative_path(&resolve_path(mask.trim(), &root), &root))
        // A mask naming the root itself would exclude every file.
        .filter(|mask| !mask.is_empty())
        .collect();

    let output = match (cli.output.as_deref(), config.report.output.as_deref()) {
        (Some(path), _) => output_target(path, &cwd),
        (None, Some(path)) => output_target(path, &root),
        (None, None) => Output::File(root.join(DEFAULT_OUTPUT)),
    };
    match &output {
        Output::Stdout => tracing::debug!("Output: stdout"),
        Output::File(path) => tracing::debug!("Output file: {}", path.display()),
    }

    let options = ParserOptions {
        root: root.clone(),
        exclude,
        layout: cli.layout.unwrap_or(config.report.layout),
    };

    let outcome = if let Some(input) = cli.input.as_deref() {
        read_report(input, &cwd, options)?
    } else if let (Some(binary), Some(profdata)) = (cli.binary.as_deref(), cli.profdata.as_deref()) {
        let text = run_llvm_cov_show(
            &config.llvm_cov.command,
            &resolve_path(binary, &cwd),
            &resolve_path(profdata, &cwd),
            &root,
        )?;
        parse_report(&text, options)
    } else if let (Some(binary), Some(profdata)) =
        (config.llvm_cov.binary.as_deref(), config.llvm_cov.profdata.as_deref())
    {
        let text = run_llvm_cov_show(
            &config.llvm_cov.command,
            &resolve_path(binary, &root),
            &resolve_path(profdata, &root),
            &root,
        )?;
        parse_report(&text, options)
    } else {
        read_report(STDIO, &cwd, options)?
    };

    write_report(&output, &root, &outcome)?;

    let summary = CoverageSummary::from_coverage(&outcome.coverage);
    match &output {
        Output::Stdout => eprintln!("\n{} Coverage report written to stdout", "📊".cyan()),
        Output::File(path) => eprintln!(
            "\n{} Coverage report generated: {}",
            "📊".cyan(),
            path.display().to_string().green()
        ),
    }
    summary.print_summary();
    if !outcome.diagnostics.is_empty() {
        eprintln!(
            "  {} {} malformed line(s) skipped",
            "!".yellow(),
            outcome.diagnostics.len()
        );
    }

    if line_threshold.is_none() && branch_threshold.is_none() {
        return Ok(true);
    }

    let result = validate_threshold(&summary, line_threshold, branch_threshold);
    result.print_summary();
    Ok(result.passed)
}

/// Reject a percentage outside 0..=100 before any work is done.
fn check_threshold(flag: &str, threshold: Option<f64>) -> Result<()> {
    if let Some(threshold) = threshold {
        if !(0.0..=100.0).contains(&threshold) {
            anyhow::bail!("{} must be between 0 and 100, got {}", flag, threshold);
        }
    }
    Ok(())
}

/// Resolve an output path; an existing directory gets `coverage.xml` inside it.
fn output_target(path: &str, base: &Path) -> Output {
    if path == STDIO {
        return Output::Stdout;
    }

    let path = resolve_path(path, base);
    if path.is_dir() {
        Output::File(path.join(DEFAULT_OUTPUT))
    } else {
        Output::File(path)
    }
}

fn read_report(input: &str, cwd: &Path, options: ParserOptions) -> Result<ParseOutcome> {
    if input == STDIO {
        return parse_reader(io::stdin().lock(), options).context("Failed to read coverage report from stdin");
    }

    let path = resolve_path(input, cwd);
    let file = File::open(&path)
        .with_context(|| format!("Failed to open coverage report: {}", path.display()))?;
    parse_reader(BufReader::new(file), options)
        .with_context(|| format!("Failed to read coverage report: {}", path.display()))
}

fn write_report(output: &Output, root: &Path, outcome: &ParseOutcome) -> Result<()> {
    let timestamp = Utc::now().timestamp();

    match output {
        Output::Stdout => {
            let mut out = BufWriter::new(io::stdout().lock());
            write_cobertura(&mut out, &outcome.coverage, ".", timestamp)
                .context("Cannot output to stdout")
        }
        Output::File(path) => {
            let source_root = source_root_for(root, path);
            let file = File::create(path)
                .with_context(|| format!("Cannot output to {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_cobertura(&mut out, &outcome.coverage, &source_root, timestamp)
                .with_context(|| format!("Cannot output to {}", path.display()))
        }
    }
}

/// The `<source>` entry: the source root as seen from the report's directory.
fn source_root_for(root: &Path, output: &Path) -> String {
    let output_dir = output.parent().unwrap_or(root);
    let relative = relative_path(root, output_dir);
    if relative.is_empty() {
        ".".to_string()
    } else {
        relative
    }
}
