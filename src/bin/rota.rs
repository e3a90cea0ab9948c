//! Command-line front end for the rotation engine.
//!
//! Loads a team CSV, runs the weekday solve (and optionally the weekend
//! planner), prints a summary or JSON, and maps the outcome to exit
//! codes: 0 clean, 2 soft violations, 3 infeasible, 4 timeout, 5 input
//! error.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rota_engine::io::{load_team_csv, schedule_to_csv};
use rota_engine::models::{
    FairnessCohorts, FairnessScope, InterTeamNightShare, NightFairnessMode, SolveConfig, Weekday,
    WeekendConfig,
};
use rota_engine::solver::{person_stats, score_breakdown, solve, solve_weekends, SolveStatus};
use rota_engine::SolveError;

const EXIT_OK: u8 = 0;
const EXIT_SOFT_VIOLATIONS: u8 = 2;
const EXIT_INFEASIBLE: u8 = 3;
const EXIT_TIMEOUT: u8 = 4;
const EXIT_INPUT_ERROR: u8 = 5;

/// Staff rotation solver.
#[derive(Debug, Parser)]
#[command(name = "rota", version, about)]
struct Cli {
    /// Team CSV file.
    #[arg(long)]
    team: PathBuf,

    /// Horizon length in weeks (1..=24).
    #[arg(long, default_value_t = 4)]
    weeks: u8,

    /// Multi-restart attempts (1..=50).
    #[arg(long, default_value_t = 2)]
    tries: u32,

    /// Base seed; 0 draws one from OS entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Per-attempt time budget in seconds.
    #[arg(long, default_value_t = 30)]
    time_limit: u64,

    /// Disable the rest day after night shifts.
    #[arg(long)]
    no_rest_after_night: bool,

    /// Disable the EDO machinery.
    #[arg(long)]
    no_edo: bool,

    /// Global fixed EDO day (Lun..Ven), for people without a preference.
    #[arg(long)]
    edo_day: Option<String>,

    /// Fairness cohorts: none, by-workdays, by-team.
    #[arg(long, default_value = "by-workdays")]
    fairness_cohorts: String,

    /// Night spread scope: off, global, cohort.
    #[arg(long, default_value = "cohort")]
    night_fairness: String,

    /// Night spread mode: count, rate.
    #[arg(long, default_value = "count")]
    night_fairness_mode: String,

    /// Evening spread scope: off, global, cohort.
    #[arg(long, default_value = "cohort")]
    evening_fairness: String,

    /// Inter-team night share: off, proportional, global.
    #[arg(long, default_value = "proportional")]
    inter_team_night_share: String,

    /// Maximum consecutive nights per person.
    #[arg(long, default_value_t = 3)]
    max_nights_sequence: u32,

    /// Maximum consecutive worked days per person.
    #[arg(long, default_value_t = 6)]
    max_consecutive_days: u32,

    /// Rebalancer step budget (0 disables).
    #[arg(long, default_value_t = 200)]
    post_rebalance_steps: u32,

    /// Treat staffing deficits as hard: any unfilled slot is infeasible.
    #[arg(long)]
    impose_targets: bool,

    /// Also plan Sat/Sun weekends.
    #[arg(long)]
    weekends: bool,

    /// Write the schedule CSV here.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit a JSON summary instead of text.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_INPUT_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let config = build_config(&cli)?;
    let team = load_team_csv(&cli.team)
        .with_context(|| format!("reading {}", cli.team.display()))?;

    let result = solve(&team, &config).map_err(|e: SolveError| anyhow!(e))?;

    let weekend = if cli.weekends {
        let weekend_config = WeekendConfig {
            weeks: cli.weeks,
            seed: cli.seed,
            time_limit_seconds: cli.time_limit,
            ..WeekendConfig::default()
        };
        Some(solve_weekends(&team, &weekend_config)?)
    } else {
        None
    };

    if let (Some(path), Some(schedule)) = (&cli.output, &result.schedule) {
        std::fs::write(path, schedule_to_csv(schedule)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if cli.json {
        print_json(&team, &result)?;
    } else {
        print_text(&team, &result, weekend.as_ref());
    }

    Ok(match result.status {
        SolveStatus::Optimal => EXIT_OK,
        SolveStatus::Feasible => {
            let soft = result
                .diagnostics
                .as_ref()
                .is_some_and(|d| d.has_soft_violations());
            if soft {
                EXIT_SOFT_VIOLATIONS
            } else {
                EXIT_OK
            }
        }
        SolveStatus::Infeasible => EXIT_INFEASIBLE,
        SolveStatus::Timeout => EXIT_TIMEOUT,
        SolveStatus::Error => EXIT_INPUT_ERROR,
    })
}

fn build_config(cli: &Cli) -> Result<SolveConfig> {
    let edo_fixed_day_global = cli
        .edo_day
        .as_deref()
        .map(|token| Weekday::parse(token).ok_or_else(|| anyhow!("unknown day token {token:?}")))
        .transpose()?;

    Ok(SolveConfig {
        weeks: cli.weeks,
        tries: cli.tries,
        seed: cli.seed,
        time_limit_seconds: cli.time_limit,
        rest_after_night: !cli.no_rest_after_night,
        edo_enabled: !cli.no_edo,
        edo_fixed_day_global,
        fairness_cohorts: parse_choice(&cli.fairness_cohorts, &[
            ("none", FairnessCohorts::None),
            ("by-workdays", FairnessCohorts::ByWorkdays),
            ("by-team", FairnessCohorts::ByTeam),
        ])?,
        night_fairness: parse_scope(&cli.night_fairness)?,
        night_fairness_mode: parse_choice(&cli.night_fairness_mode, &[
            ("count", NightFairnessMode::Count),
            ("rate", NightFairnessMode::Rate),
        ])?,
        evening_fairness: parse_scope(&cli.evening_fairness)?,
        inter_team_night_share: parse_choice(&cli.inter_team_night_share, &[
            ("off", InterTeamNightShare::Off),
            ("proportional", InterTeamNightShare::Proportional),
            ("global", InterTeamNightShare::Global),
        ])?,
        max_nights_sequence: cli.max_nights_sequence,
        max_consecutive_days: cli.max_consecutive_days,
        post_rebalance_steps: cli.post_rebalance_steps,
        impose_targets: cli.impose_targets,
    })
}

fn parse_scope(token: &str) -> Result<FairnessScope> {
    parse_choice(token, &[
        ("off", FairnessScope::Off),
        ("global", FairnessScope::Global),
        ("cohort", FairnessScope::Cohort),
    ])
}

fn parse_choice<T: Copy>(token: &str, choices: &[(&str, T)]) -> Result<T> {
    choices
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, value)| *value)
        .ok_or_else(|| {
            let names: Vec<&str> = choices.iter().map(|(n, _)| *n).collect();
            anyhow!("unknown option {token:?}, expected one of {names:?}")
        })
}

fn print_text(
    team: &[rota_engine::Person],
    result: &rota_engine::SolveResult,
    weekend: Option<&rota_engine::WeekendResult>,
) {
    println!("status: {:?}", result.status);
    println!("seed:   {}", result.seed_used);
    println!("score:  {:.2}", result.score);

    if let (Some(schedule), Some(diag)) = (&result.schedule, &result.diagnostics) {
        println!();
        println!("name            J   S   N   A  total  target  delta  edo");
        for s in person_stats(schedule, team) {
            println!(
                "{:<14} {:>3} {:>3} {:>3} {:>3} {:>6} {:>7} {:>+6} {:>4}",
                s.name, s.days, s.evenings, s.nights, s.admin, s.total, s.target, s.delta,
                s.edo_weeks
            );
        }

        println!();
        println!("vacant slots:        {}", diag.vacant_slots);
        println!("rolling 48h windows: {}", diag.rolling_48h_violations);
        println!("evening→day:         {}", diag.evening_to_day);
        println!("weekly misses:       {}", diag.weekly_misses);
        println!("contractor pairs:    {}", diag.contractor_pairs);
        for slot in &diag.unfilled {
            println!(
                "  unfilled: {} {} slot {}",
                slot.position(),
                slot.shift,
                slot.slot_idx
            );
        }
    }

    for failure in &result.failures {
        println!("attempt failure: {failure}");
    }

    if let Some(weekend) = weekend {
        println!();
        println!("weekend status: {:?} (score {})", weekend.status, weekend.score);
        if let Some(schedule) = &weekend.schedule {
            for a in &schedule.assignments {
                println!(
                    "  W{} {} {}: {}",
                    a.week,
                    a.day,
                    a.shift,
                    a.people.join(" / ")
                );
            }
        }
    }
}

fn print_json(team: &[rota_engine::Person], result: &rota_engine::SolveResult) -> Result<()> {
    let summary = serde_json::json!({
        "status": result.status,
        "seed_used": result.seed_used,
        "score": result.score,
        "score_breakdown": result.diagnostics.as_ref().map(score_breakdown),
        "diagnostics": result.diagnostics,
        "stats": result
            .schedule
            .as_ref()
            .map(|s| person_stats(s, team)),
        "failures": result
            .failures
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
