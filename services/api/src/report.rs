use clap::Args;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use uhfs::answers::read_answer_file;
use uhfs::config::AppConfig;
use uhfs::error::AppError;
use uhfs::scoring::{Domain, RiskLevel, Ruleset, ScoreOutcome, ScoringEngine, UserAnswers};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding one user's answers (the five domain records, each optional)
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// JSON ruleset to score with (defaults to APP_RULESET_PATH, then the built-in tables)
    #[arg(long)]
    pub(crate) ruleset: Option<PathBuf>,
    /// Print the full breakdown as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Questionnaire export CSV with a `user_id` column and one column per answer field
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON ruleset to score with (defaults to APP_RULESET_PATH, then the built-in tables)
    #[arg(long)]
    pub(crate) ruleset: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RulesetExportArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::new(resolve_ruleset(args.ruleset.as_deref())?);
    let raw = std::fs::read(&args.answers)?;
    let answers: UserAnswers = serde_json::from_slice(&raw)?;

    let outcome = engine.evaluate(&answers);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_outcome(&outcome));
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let engine = ScoringEngine::new(resolve_ruleset(args.ruleset.as_deref())?);
    let rows = read_answer_file(&args.csv)?;

    let outcomes: Vec<(String, ScoreOutcome)> = rows
        .into_iter()
        .map(|(user_id, answers)| (user_id.0, engine.evaluate(&answers)))
        .collect();

    print!("{}", render_batch(&outcomes));
    Ok(())
}

pub(crate) fn run_ruleset_export(args: RulesetExportArgs) -> Result<(), AppError> {
    let ruleset = AppConfig::load()?.scoring.load_ruleset()?;
    let encoded = serde_json::to_string_pretty(&ruleset)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, encoded)?;
            println!("Wrote ruleset {} to {}", ruleset.version, path.display());
        }
        None => println!("{encoded}"),
    }

    Ok(())
}

fn resolve_ruleset(path: Option<&Path>) -> Result<Ruleset, AppError> {
    let ruleset = match path {
        Some(path) => Ruleset::from_path(path)?,
        None => AppConfig::load()?.scoring.load_ruleset()?,
    };
    Ok(ruleset)
}

pub(crate) fn render_outcome(outcome: &ScoreOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "UHFS score: {} ({} risk)", outcome.score, outcome.overall_risk.label());
    let _ = writeln!(
        out,
        "Composite: {:.4}  Ruleset: {}",
        outcome.composite, outcome.ruleset_version
    );
    let _ = writeln!(out);

    for domain in Domain::ALL {
        let _ = writeln!(
            out,
            "  [{}] {:<22} {:>6.3}  {:<6}  weight {:.2}",
            domain.code(),
            domain.label(),
            outcome.components.get(domain),
            outcome.domain_risk.get(domain).label(),
            outcome.weights.weight_for(domain),
        );
    }

    let unmatched: Vec<String> = [
        &outcome.details.income_stability,
        &outcome.details.financial_behavior,
        &outcome.details.reliability_tenure,
        &outcome.details.protection_readiness,
    ]
    .iter()
    .flat_map(|domain| domain.factors.iter())
    .filter(|factor| !factor.matched)
    .map(|factor| match &factor.answer {
        Some(answer) => format!("{} ('{}')", factor.factor, answer),
        None => factor.factor.to_string(),
    })
    .collect();

    if !unmatched.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Defaults applied: {}", unmatched.join(", "));
    }

    out
}

pub(crate) fn render_batch(outcomes: &[(String, ScoreOutcome)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16} {:>5}  {:<6}  I/F/R/P/L", "user_id", "score", "risk");

    let mut by_risk: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (user_id, outcome) in outcomes {
        *by_risk.entry(outcome.overall_risk.label()).or_default() += 1;
        let levels: Vec<&str> = outcome
            .domain_risk
            .levels()
            .iter()
            .map(|level| short_level(*level))
            .collect();
        let _ = writeln!(
            out,
            "{:<16} {:>5}  {:<6}  {}",
            user_id,
            outcome.score,
            outcome.overall_risk.label(),
            levels.join("/")
        );
    }

    let _ = writeln!(out);
    let summary: Vec<String> = by_risk
        .iter()
        .map(|(label, count)| format!("{label}: {count}"))
        .collect();
    let _ = writeln!(out, "Scored {} users. {}", outcomes.len(), summary.join(", "));
    out
}

fn short_level(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "H",
        RiskLevel::Medium => "M",
        RiskLevel::Low => "L",
    }
}
