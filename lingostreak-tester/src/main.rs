mod browser;
mod common;
mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use browser::{BrowserConfig, BrowserKind, new_session};
use common::scenario::{ScenarioCtx, get_scenario, list_scenarios, scenario_keys};
use common::{artifacts_dir, capture_artifacts, split_csv};
use logic::{LogicTester, ScenarioResult};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Session store scenarios against the in-memory backend (fast, no browser)
    Logic,
    /// Browser automation against a served build
    Browser,
    /// Run both logic and browser tests
    Both,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeadlessMode {
    /// Run browsers in headless mode
    Headless,
    /// Run browsers with visible windows
    Windowed,
}

impl HeadlessMode {
    const fn is_headless(self) -> bool {
        matches!(self, Self::Headless)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "lingostreak-tester", version)]
#[command(about = "Automated QA for Lingostreak - session logic, invariant fuzzing and browser smoke tests")]
struct Args {
    /// Test mode: logic (fast), browser (WebDriver), or both
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed (logic mode only)
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    // Browser-specific options
    /// Browsers to run (chrome,edge,firefox,safari) - browser mode only
    #[arg(long, default_value = "chrome")]
    browsers: String,

    /// Base URL of the served app
    #[arg(long, default_value = "http://localhost:8080/")]
    base_url: String,

    /// Artifacts directory for screenshots and DOM dumps
    #[arg(long, default_value = "target/test-artifacts")]
    artifacts_dir: String,

    /// Connect to a Selenium Grid hub instead of local drivers
    #[arg(long)]
    hub: Option<String>,

    /// Run headless where supported
    #[arg(long, value_enum, default_value_t = HeadlessMode::Headless)]
    headless: HeadlessMode,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;

    let logic_results = run_logic_scenarios(&args, &scenarios, &seeds);
    let browser_failures = run_browser_scenarios(&args, &scenarios, &seeds).await?;

    write_reports(&args, &logic_results, start_time)?;

    if browser_failures > 0 || logic_results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:25} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🦉 Lingostreak Automated Tester".bright_cyan().bold());
    println!("{}", "===============================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in scenario_keys() {
            if !scenarios.iter().any(|s| s == key) {
                scenarios.push(key.to_string());
            }
        }
    }
    scenarios
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    split_csv(seeds_arg)
        .iter()
        .map(|token| {
            token
                .parse::<u64>()
                .with_context(|| format!("invalid seed {token:?}"))
        })
        .collect()
}

fn build_browser_config(args: &Args) -> BrowserConfig {
    BrowserConfig {
        headless: args.headless.is_headless(),
        implicit_wait_secs: 3,
        remote_hub: args.hub.clone(),
    }
}

fn scenario_artifacts_dir(args: &Args, kind: BrowserKind, scenario: &str, seed: u64) -> String {
    artifacts_dir(&args.artifacts_dir, kind.label(), scenario, seed)
}

fn run_logic_scenarios(args: &Args, scenarios: &[String], seeds: &[u64]) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    if !matches!(args.mode, TestMode::Logic | TestMode::Both) {
        return results;
    }

    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(args.verbose);

    for scenario_name in scenarios {
        let Some(scenario) = get_scenario(scenario_name) else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
            continue;
        };
        if let Some(logic_scenario) = scenario.as_logic_scenario() {
            results.extend(logic_tester.run_scenario(&logic_scenario, seeds, args.iterations));
        } else {
            eprintln!(
                "⚠️  Scenario {} has no logic test implementation",
                scenario_name.yellow()
            );
        }
    }

    results
}

/// Returns how many browser runs failed.
async fn run_browser_scenarios(args: &Args, scenarios: &[String], seeds: &[u64]) -> Result<usize> {
    if !matches!(args.mode, TestMode::Browser | TestMode::Both) {
        return Ok(0);
    }

    println!("{}", "🌐 Running Browser Tests".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let cfg = build_browser_config(args);
    let mut failures = 0;

    for browser_name in split_csv(&args.browsers) {
        let Some(kind) = BrowserKind::parse(&browser_name) else {
            eprintln!("⚠️  Unknown browser: {}", browser_name.yellow());
            continue;
        };

        let driver = match new_session(kind, &cfg).await {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Could not start {}: {e}", kind.label());
                failures += 1;
                continue;
            }
        };

        failures += run_browser_scenarios_for_driver(args, scenarios, seeds, kind, &driver).await;
        if let Err(e) = driver.quit().await {
            log::warn!("failed to close {} session: {e}", kind.label());
        }
    }

    Ok(failures)
}

async fn run_browser_scenarios_for_driver(
    args: &Args,
    scenarios: &[String],
    seeds: &[u64],
    kind: BrowserKind,
    driver: &thirtyfour::WebDriver,
) -> usize {
    let mut failures = 0;
    for scenario_name in scenarios {
        let Some(scenario) = get_scenario(scenario_name) else {
            continue;
        };
        if !scenario.has_browser_flow() {
            if args.verbose {
                println!("⏭️  {scenario_name} is logic-only");
            }
            continue;
        }
        for &seed in seeds {
            let ctx = ScenarioCtx {
                base_url: args.base_url.clone(),
                seed,
                verbose: args.verbose,
            };
            let label = kind.label();
            let scenario_start = Instant::now();
            match scenario.run_browser(driver, &ctx).await {
                Ok(()) => {
                    println!(
                        "✅ [{} seed {}] {} - {:?}",
                        label.green(),
                        seed,
                        scenario_name,
                        scenario_start.elapsed()
                    );
                }
                Err(e) => {
                    failures += 1;
                    eprintln!(
                        "❌ [{} seed {}] {} - {:?}: {:#}",
                        label.red(),
                        seed,
                        scenario_name,
                        scenario_start.elapsed(),
                        e
                    );
                    let dir = scenario_artifacts_dir(args, kind, scenario_name, seed);
                    if let Err(capture_err) = capture_artifacts(driver, &dir, &e).await {
                        log::warn!("could not save artifacts to {dir}: {capture_err:#}");
                    }
                }
            }
        }
    }
    failures
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => logic::reports::generate_json_report(&mut output_target, results)?,
        ReportFormat::Markdown => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Lingostreak Logic Test Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        ReportFormat::Console => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
