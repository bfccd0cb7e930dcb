use crate::junit::JunitOptions;
use crate::page::{Clock, FixedClock, SystemClock};
use crate::record::TestRun;
use crate::sonar::ReporterOptions;
use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use std::{fs, io};
use structopt::StructOpt;

#[macro_use]
extern crate yaserde_derive;

mod junit;
mod model;
mod page;
mod record;
mod sonar;

#[derive(StructOpt, Debug)]
#[structopt()]
struct Opt {
    /// Silence all output
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbose mode (-v, -vv, -vvv, -vvvv). The levels are warnings, informational, debugging, and trace message.
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: usize,

    /// Timestamp (sec, ms, ns, none)
    #[structopt(short = "t", long = "timestamp")]
    ts: Option<stderrlog::Timestamp>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Convert test results into a SonarQube generic test execution report.
    Report(ReportOpt),
    /// Render the Developer Portal page as HTML.
    Render(RenderOpt),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum InputFormat {
    Jest,
    Junit,
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(format: &str) -> Result<Self> {
        match format {
            "jest" => Ok(InputFormat::Jest),
            "junit" => Ok(InputFormat::Junit),
            other => Err(anyhow!("Unsupported input format {:?} (jest, junit)", other)),
        }
    }
}

#[derive(StructOpt, Debug)]
struct ReportOpt {
    /// Test results to read. Reads standard input when omitted.
    #[structopt(short = "i", long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Format of the test results (jest, junit)
    #[structopt(short = "f", long, default_value = "jest")]
    format: InputFormat,

    /// Directory the report is written to.
    #[structopt(short = "o", long, parse(from_os_str), default_value = sonar::DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// File name of the report.
    #[structopt(short = "n", long, default_value = sonar::DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Also write a JUnit report to this file.
    #[structopt(long, parse(from_os_str))]
    junit: Option<PathBuf>,

    /// Separator between describe blocks and the test title in JUnit class names.
    #[structopt(long, default_value = junit::DEFAULT_ANCESTOR_SEPARATOR)]
    ancestor_separator: String,

    /// Name JUnit suites after their first describe block instead of the test file path.
    #[structopt(long)]
    no_path_suite_name: bool,
}

#[derive(StructOpt, Debug)]
struct RenderOpt {
    /// An optional target file to write the page to.
    #[structopt(short = "o", long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Render as if the current date were in this year.
    #[structopt(long)]
    year: Option<i32>,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    stderrlog::new()
        .module(module_path!())
        .quiet(opt.quiet)
        .verbosity(opt.verbose)
        .timestamp(opt.ts.unwrap_or(stderrlog::Timestamp::Off))
        .init()?;

    match opt.cmd {
        Command::Report(report) => run_report(report),
        Command::Render(render) => run_render(render),
    }
}

fn read_input(input: &Option<PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read test results from {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read test results from standard input")?;
            Ok(buffer)
        }
    }
}

fn run_report(opt: ReportOpt) -> Result<()> {
    let raw = read_input(&opt.input)?;
    let run = match opt.format {
        InputFormat::Jest => TestRun::from_jest_json(&raw)?,
        InputFormat::Junit => TestRun::from_junit_xml(&raw)?,
    };

    let summary = run.summary();
    if summary.total() == 0 {
        log::warn!("No test cases found in the test results");
    }
    log::info!(
        "{} test(s) in {} file(s): {} passed, {} failed, {} pending, {} skipped",
        summary.total(),
        run.files.len(),
        summary.passed,
        summary.failed,
        summary.pending,
        summary.skipped
    );

    let options = ReporterOptions {
        output_dir: opt.output_dir,
        output_name: opt.output_name,
    };
    let path = sonar::write_report(&run, &options)?;
    log::info!("Wrote SonarQube report to {}", path.display());

    if let Some(output) = opt.junit {
        let options = JunitOptions {
            output,
            ancestor_separator: opt.ancestor_separator,
            use_path_for_suite_name: !opt.no_path_suite_name,
        };
        let path = junit::write_junit(&run, &options)?;
        log::info!("Wrote JUnit report to {}", path.display());
    }

    Ok(())
}

fn run_render(opt: RenderOpt) -> Result<()> {
    let html = match opt.year {
        Some(year) => {
            let clock = FixedClock::from_year(year)
                .ok_or_else(|| anyhow!("Year {} is out of range", year))?;
            log::debug!("Rendering with fixed clock at {}", clock.now());
            page::document(&clock)
        }
        None => page::document(&SystemClock),
    };

    let mut out_writer = match &opt.output {
        Some(path) => Box::new(
            fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ) as Box<dyn io::Write>,
        None => Box::new(io::stdout()) as Box<dyn io::Write>,
    };

    out_writer
        .write_all(html.as_bytes())
        .map_err(|err| anyhow!("Failed to output page: {:?}", err))?;

    Ok(())
}
