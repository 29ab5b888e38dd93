//! Wellplan CLI - command-line interface for the Wellplan engine
//!
//! Commands:
//! - targets: Compute daily energy and macro targets for a profile
//! - plans: Generate nutrition, fitness and wellness plans
//! - analytics: Streak and rolling analytics for one metric
//! - summary: Wellness dashboard summary over all metrics
//! - validate: Validate daily log entries
//! - doctor: Check configuration and catalog health

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

use wellplan::adapters::{OnboardingAdapter, ProfileAdapter};
use wellplan::analytics::{validate_entries, LogEntryParser, Metric, MetricAnalytics, Recommendation};
use wellplan::entitlement::{Feature, Gated, Tier};
use wellplan::error::parse_date;
use wellplan::plan::{Catalog, GeneratorOptions, PlanHistory};
use wellplan::profile::UserProfile;
use wellplan::report::ReportEncoder;
use wellplan::{Engine, EngineConfig, EngineError, ENGINE_VERSION, PRODUCER_NAME};

/// Wellplan - personal metrics and plan engine
#[derive(Parser)]
#[command(name = "wellplan")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Compute targets, plans and wellness analytics", long_about = None)]
struct Cli {
    /// Engine configuration file (JSON); defaults apply when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log computed values to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "json-pretty")]
    format: OutputFormat,

    /// Subscription tier used to gate premium sections of the output
    #[arg(long, global = true, default_value = "pro")]
    tier: Tier,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute daily energy and macro targets
    Targets {
        /// Profile JSON file (use - for stdin)
        #[arg(short, long)]
        profile: PathBuf,

        /// Treat the input as raw onboarding answers
        #[arg(long)]
        onboarding: bool,

        /// Emit whole-number display values
        #[arg(long)]
        rounded: bool,
    },

    /// Generate nutrition, fitness and wellness plans
    Plans {
        /// Profile JSON file (use - for stdin)
        #[arg(short, long)]
        profile: PathBuf,

        /// Treat the input as raw onboarding answers
        #[arg(long)]
        onboarding: bool,

        /// Catalog JSON file; the built-in catalog is used when absent
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Tie-break seed; derived from the profile and catalog when absent
        #[arg(long)]
        seed: Option<u64>,

        /// Plan history file to regenerate into (created if missing)
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Streak and rolling analytics for one metric
    Analytics {
        /// Log entries (JSON array or NDJSON; use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Metric to analyse
        #[arg(short, long)]
        metric: String,

        /// As-of date (YYYY-MM-DD)
        #[arg(long)]
        as_of: String,

        /// Window length in days; the configured default when absent
        #[arg(short, long)]
        window: Option<u32>,

        /// Include the 90-day view alongside the short window
        #[arg(long)]
        overview: bool,
    },

    /// Wellness dashboard summary over all metrics
    Summary {
        /// Log entries (JSON array or NDJSON; use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// As-of date (YYYY-MM-DD)
        #[arg(long)]
        as_of: String,
    },

    /// Validate daily log entries
    Validate {
        /// Log entries (JSON array or NDJSON; use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check configuration and catalog health
    Doctor {
        /// Catalog file to check
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), WellplanCliError> {
    // Doctor reports a broken config instead of failing on it
    let engine = || -> Result<Engine, WellplanCliError> {
        let config = match &cli.config {
            Some(path) => EngineConfig::from_path(path)?,
            None => EngineConfig::default(),
        };
        Ok(Engine::new(config)?)
    };
    let out = Output {
        encoder: ReportEncoder::new(),
        pretty: matches!(cli.format, OutputFormat::JsonPretty),
    };

    match &cli.command {
        Commands::Targets {
            profile,
            onboarding,
            rounded,
        } => cmd_targets(&engine()?, &out, profile, *onboarding, *rounded),

        Commands::Plans {
            profile,
            onboarding,
            catalog,
            seed,
            history,
        } => cmd_plans(
            &engine()?,
            &out,
            &cli.tier,
            profile,
            *onboarding,
            catalog.as_deref(),
            *seed,
            history.as_deref(),
        ),

        Commands::Analytics {
            input,
            metric,
            as_of,
            window,
            overview,
        } => cmd_analytics(&engine()?, &out, &cli.tier, input, metric, as_of, *window, *overview),

        Commands::Summary { input, as_of } => cmd_summary(&engine()?, &out, &cli.tier, input, as_of),

        Commands::Validate { input, json } => cmd_validate(input, *json),

        Commands::Doctor { catalog, json } => cmd_doctor(cli.config.as_deref(), catalog.as_deref(), *json),
    }
}

struct Output {
    encoder: ReportEncoder,
    pretty: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, payload: &T) -> Result<(), WellplanCliError> {
        println!("{}", self.encoder.encode_to_json(payload, self.pretty)?);
        Ok(())
    }
}

fn cmd_targets(
    engine: &Engine,
    out: &Output,
    profile: &Path,
    onboarding: bool,
    rounded: bool,
) -> Result<(), WellplanCliError> {
    let profile = load_profile(profile, onboarding)?;
    let targets = engine.compute_targets(&profile)?;

    if rounded {
        out.emit(&targets.rounded())
    } else {
        out.emit(&serde_json::json!({
            "targets": targets,
            "macro_percentages": targets.macro_percentages(),
        }))
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_plans(
    engine: &Engine,
    out: &Output,
    tier: &Tier,
    profile: &Path,
    onboarding: bool,
    catalog: Option<&Path>,
    seed: Option<u64>,
    history: Option<&Path>,
) -> Result<(), WellplanCliError> {
    let profile = load_profile(profile, onboarding)?;
    let catalog = match catalog {
        Some(path) => Catalog::from_json(&fs::read_to_string(path)?)?,
        None => Catalog::builtin(),
    };
    let options = GeneratorOptions { seed };

    let bundle = match history {
        Some(path) => {
            let mut plans = if path.exists() {
                PlanHistory::from_json(&fs::read_to_string(path)?)?
            } else {
                PlanHistory::new()
            };
            let bundle = engine
                .regenerate_plans(&mut plans, &profile, &catalog, options, now_ms())?
                .bundle
                .clone();
            fs::write(path, plans.to_json()?)?;
            bundle
        }
        None => {
            let targets = engine.compute_targets(&profile)?;
            engine.generate_plans(&profile, &targets, &catalog, options)?
        }
    };

    out.emit(&Gated::new(tier, Feature::PersonalizedPlans, bundle))
}

/// Analytics with the recommendations pulled out for gating
#[derive(Serialize)]
struct AnalyticsView {
    analytics: MetricAnalytics,
    recommendations: Gated<Vec<Recommendation>>,
}

impl AnalyticsView {
    fn new(mut analytics: MetricAnalytics, tier: &Tier) -> Self {
        let recommendations = std::mem::take(&mut analytics.recommendations);
        Self {
            analytics,
            recommendations: Gated::new(tier, Feature::Recommendations, recommendations),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_analytics(
    engine: &Engine,
    out: &Output,
    tier: &Tier,
    input: &Path,
    metric: &str,
    as_of: &str,
    window: Option<u32>,
    overview: bool,
) -> Result<(), WellplanCliError> {
    let entries = LogEntryParser::parse_validated(&read_input(input)?)?;
    let metric = Metric::parse(metric)?;
    let as_of = parse_date(as_of)?;

    if overview {
        let overview = engine.metric_overview(&entries, metric, as_of)?;
        let long_term = Gated::new(
            tier,
            Feature::LongTermAnalytics,
            AnalyticsView::new(overview.ninety_day, tier),
        );
        out.emit(&serde_json::json!({
            "metric": metric,
            "seven_day": AnalyticsView::new(overview.seven_day, tier),
            "ninety_day": long_term,
        }))
    } else {
        let window = window.unwrap_or(engine.config().analytics.default_window_days);
        let analytics = engine.metric_analytics(&entries, metric, as_of, window)?;
        let feature = if window > engine.config().analytics.default_window_days {
            Feature::LongTermAnalytics
        } else {
            Feature::ShortTermAnalytics
        };
        out.emit(&Gated::new(tier, feature, AnalyticsView::new(analytics, tier)))
    }
}

fn cmd_summary(
    engine: &Engine,
    out: &Output,
    tier: &Tier,
    input: &Path,
    as_of: &str,
) -> Result<(), WellplanCliError> {
    let entries = LogEntryParser::parse_validated(&read_input(input)?)?;
    let summary = engine.wellness_summary(&entries, parse_date(as_of)?)?;
    out.emit(&Gated::new(tier, Feature::WellnessSummary, summary))
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), WellplanCliError> {
    let entries = LogEntryParser::parse(&read_input(input)?)?;
    let results = validate_entries(&entries);
    let invalid: Vec<_> = results.iter().filter(|r| !r.valid).collect();

    let report = ValidationReport {
        total_entries: results.len(),
        valid_entries: results.len() - invalid.len(),
        invalid_entries: invalid.len(),
        errors: invalid
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                date: r.date.clone(),
                metric: r.metric.to_string(),
                error: r.error.clone().unwrap_or_default(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total entries:   {}", report.total_entries);
        println!("Valid entries:   {}", report.valid_entries);
        println!("Invalid entries: {}", report.invalid_entries);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - Entry {} ({} {}): {}", err.index, err.date, err.metric, err.error);
            }
        }
    }

    if report.invalid_entries > 0 {
        Err(WellplanCliError::ValidationFailed(report.invalid_entries))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, catalog: Option<&Path>, json: bool) -> Result<(), WellplanCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "engine_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Wellplan engine {}", ENGINE_VERSION),
    });

    checks.push(match config {
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: "No config file; using defaults".to_string(),
        },
        Some(path) if !path.exists() => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: format!("Config file {} does not exist", path.display()),
        },
        Some(path) => match EngineConfig::from_path(path) {
            Ok(config) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Config valid (calories {}-{} kcal, {}-day window)",
                    config.targets.calorie_floor_kcal,
                    config.targets.calorie_ceiling_kcal,
                    config.analytics.default_window_days
                ),
            },
            Err(e) => DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        },
    });

    let builtin = Catalog::builtin();
    checks.push(match builtin.validate() {
        Ok(()) => DoctorCheck {
            name: "builtin_catalog".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "{}: {} meals, {} exercises, {} habits",
                builtin.version,
                builtin.meals.len(),
                builtin.exercises.len(),
                builtin.habits.len()
            ),
        },
        Err(e) => DoctorCheck {
            name: "builtin_catalog".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    });

    if let Some(path) = catalog {
        let loaded = fs::read_to_string(path)
            .map_err(EngineError::from)
            .and_then(|json| Catalog::from_json(&json));
        checks.push(match loaded {
            Ok(c) if c.meals.is_empty() || c.exercises.is_empty() || c.habits.is_empty() => DoctorCheck {
                name: "catalog".to_string(),
                status: CheckStatus::Warning,
                message: format!("{}: some sections are empty; plans will carry placeholders", c.version),
            },
            Ok(c) => DoctorCheck {
                name: "catalog".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "{}: {} meals, {} exercises, {} habits",
                    c.version,
                    c.meals.len(),
                    c.exercises.len(),
                    c.habits.len()
                ),
            },
            Err(e) => DoctorCheck {
                name: "catalog".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        });
    }

    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: if atty::is(atty::Stream::Stdin) {
            "stdin is a TTY (pass input files with -i/-p)".to_string()
        } else {
            "stdin is a pipe (use - to read input from it)".to_string()
        },
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: ENGINE_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Wellplan Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(WellplanCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_input(input: &Path) -> Result<String, WellplanCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_profile(path: &Path, onboarding: bool) -> Result<UserProfile, WellplanCliError> {
    let json = read_input(path)?;
    let profile = if onboarding {
        OnboardingAdapter.parse(&json, now_ms())?
    } else {
        UserProfile::from_json(&json)?
    };
    Ok(profile)
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// Error types

#[derive(Debug)]
enum WellplanCliError {
    Io(io::Error),
    Engine(EngineError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for WellplanCliError {
    fn from(e: io::Error) -> Self {
        WellplanCliError::Io(e)
    }
}

impl From<EngineError> for WellplanCliError {
    fn from(e: EngineError) -> Self {
        WellplanCliError::Engine(e)
    }
}

impl From<serde_json::Error> for WellplanCliError {
    fn from(e: serde_json::Error) -> Self {
        WellplanCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WellplanCliError> for CliError {
    fn from(e: WellplanCliError) -> Self {
        match e {
            WellplanCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WellplanCliError::Engine(e) => {
                let hint = match &e {
                    EngineError::InvalidProfile(_) => "Correct the profile fields and retry",
                    EngineError::InsufficientCatalog(_) => "Add matching archetypes to the catalog",
                    EngineError::InvalidWindow(_) => "Use a non-empty window ending on the as-of date",
                    EngineError::InvalidEntry(_) => "Run 'wellplan validate' for details",
                    EngineError::DateParseError(_) => "Dates use YYYY-MM-DD",
                    EngineError::ConfigError(_) => "Run 'wellplan doctor --config <path>'",
                    _ => "Check input format",
                };
                CliError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            WellplanCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            WellplanCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} entries failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            WellplanCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_entries: usize,
    valid_entries: usize,
    invalid_entries: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    metric: String,
    error: String,
}

#[derive(Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
