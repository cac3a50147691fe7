use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nestegg_core::domain::plan::SavedPlanRecord;
use nestegg_core::domain::request::PlanRequest;
use nestegg_core::engine::templates::TemplateSet;
use nestegg_core::engine::PlanEngine;

#[derive(Debug, Parser)]
#[command(name = "nestegg", about = "Build an allocation and growth plan")]
struct Args {
    /// Initial investment in dollars.
    #[arg(long, allow_negative_numbers = true)]
    amount: f64,

    /// Risk tolerance, 1 (conservative) to 10 (aggressive).
    #[arg(long, allow_negative_numbers = true)]
    risk_score: i64,

    /// Recurring monthly contribution in dollars.
    #[arg(long, allow_negative_numbers = true)]
    monthly_contribution: Option<f64>,

    /// Expected annual return in percent (0-100). Required with a monthly contribution.
    #[arg(long, allow_negative_numbers = true)]
    expected_return: Option<f64>,

    /// Projection horizon in years (1-50). Required with a monthly contribution.
    #[arg(long, allow_negative_numbers = true)]
    time_horizon: Option<i64>,

    /// Allocation templates JSON file. Overrides ALLOCATION_TEMPLATES_PATH.
    #[arg(long)]
    templates: Option<String>,

    /// Print the record handed to persistence (plan plus metadata) instead of the bare plan.
    #[arg(long)]
    saved_record: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn to_request(&self) -> PlanRequest {
        PlanRequest {
            amount: self.amount,
            risk_score: self.risk_score,
            monthly_contribution: self.monthly_contribution,
            expected_return: self.expected_return,
            time_horizon: self.time_horizon,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nestegg_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(&args, &settings);
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "plan failed");
    }
    result
}

fn run(args: &Args, settings: &nestegg_core::config::Settings) -> anyhow::Result<()> {
    let templates = match args.templates.as_deref() {
        Some(path) => TemplateSet::from_path(path)?,
        None => settings.load_templates()?,
    };
    let engine = PlanEngine::new(templates)?;

    let request = args.to_request();
    let input = request.validate()?;
    let plan = engine.build_plan_from_input(&input)?;

    let band = engine.band_for(&input);
    tracing::info!(
        amount = %input.amount,
        %band,
        with_contributions = plan.monthly_contribution.is_some(),
        "plan built"
    );

    let output = if args.saved_record {
        serde_json::to_value(SavedPlanRecord::new(plan, band, chrono::Utc::now()))
    } else {
        serde_json::to_value(&plan)
    }
    .context("serialize plan failed")?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");
    Ok(())
}

fn init_sentry(settings: &nestegg_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_contribution_flags() {
        let args = Args::try_parse_from([
            "nestegg",
            "--amount",
            "10000",
            "--risk-score",
            "5",
            "--monthly-contribution",
            "500",
            "--expected-return",
            "7",
            "--time-horizon",
            "10",
        ])
        .unwrap();
        assert_eq!(
            args.to_request(),
            PlanRequest::new(10_000.0, 5).with_contribution(500.0, 7.0, 10)
        );
        assert!(!args.saved_record);
    }

    #[test]
    fn out_of_range_score_reaches_validation() {
        let args =
            Args::try_parse_from(["nestegg", "--amount", "100", "--risk-score", "-3"]).unwrap();
        let err = args.to_request().validate().unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn requires_amount_and_score() {
        assert!(Args::try_parse_from(["nestegg", "--risk-score", "5"]).is_err());
        assert!(Args::try_parse_from(["nestegg", "--amount", "100"]).is_err());
    }
}
