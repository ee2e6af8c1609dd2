//! Command-line job-shop scheduler.
//!
//! Reads a request as JSON from a file or stdin and prints the outcome as
//! JSON to stdout. A request is either a bare list of jobs or an object
//! `{"data": [...], "random_seed"?, "num_search_workers"?, "time_limit_ms"?,
//! "node_limit"?}`.
//!
//! Exit status: 0 when a schedule is found, 2 when the search reports no
//! solution, 1 on invalid input or I/O errors.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use u_jobshop::models::by_machine;
use u_jobshop::scheduler::ScheduleKpi;
use u_jobshop::{schedule_jobs, JobsData, SchedulerConfig, SchedulerOutcome, TaskInput};

#[derive(Parser, Debug)]
#[command(name = "jobshop", version, about = "Minimum-makespan job-shop scheduler")]
struct Args {
    /// Request file (reads stdin when omitted).
    input: Option<PathBuf>,

    /// Schedule the built-in three-job example instead of reading input.
    #[arg(long, conflicts_with = "input")]
    demo: bool,

    /// Random seed for the search workers.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of parallel search workers.
    #[arg(long)]
    workers: Option<usize>,

    /// Wall-clock budget in milliseconds.
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Search nodes per worker.
    #[arg(long)]
    node_limit: Option<u64>,

    /// Print KPIs and per-machine sequences to stderr.
    #[arg(long)]
    summary: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Request {
    Wrapped {
        data: JobsData,
        #[serde(flatten)]
        config: SchedulerConfig,
    },
    Bare(JobsData),
}

impl Request {
    fn into_parts(self) -> (JobsData, SchedulerConfig) {
        match self {
            Request::Wrapped { data, config } => (data, config),
            Request::Bare(data) => (data, SchedulerConfig::default()),
        }
    }
}

fn demo_jobs() -> JobsData {
    vec![
        vec![TaskInput::new(0, 3), TaskInput::new(1, 2), TaskInput::new(2, 2)],
        vec![TaskInput::new(0, 2), TaskInput::new(2, 1), TaskInput::new(1, 4)],
        vec![TaskInput::new(1, 4), TaskInput::new(2, 3)],
    ]
}

fn read_request(args: &Args) -> Result<(JobsData, SchedulerConfig)> {
    if args.demo {
        return Ok((demo_jobs(), SchedulerConfig::default()));
    }

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let request: Request = serde_json::from_str(&text).context("failed to parse request")?;
    Ok(request.into_parts())
}

/// Command-line flags take precedence over the request body.
fn apply_overrides(mut config: SchedulerConfig, args: &Args) -> SchedulerConfig {
    if let Some(seed) = args.seed {
        config.random_seed = Some(seed);
    }
    if let Some(workers) = args.workers {
        config.num_search_workers = Some(workers);
    }
    if let Some(ms) = args.time_limit_ms {
        config.time_limit_ms = Some(ms);
    }
    if let Some(nodes) = args.node_limit {
        config.node_limit = Some(nodes);
    }
    config
}

fn print_summary(jobs: &JobsData, outcome: &SchedulerOutcome) {
    let Some(success) = outcome.success() else {
        return;
    };
    let kpi = ScheduleKpi::calculate(jobs, &success.output);

    eprintln!("makespan: {}", kpi.makespan);
    eprintln!("avg utilization: {:.1}%", kpi.avg_utilization * 100.0);
    eprintln!("avg job completion: {:.2}", kpi.avg_job_completion);
    eprintln!("idle time: {}", kpi.total_idle_time);
    for (machine, entries) in by_machine(&success.output) {
        let sequence: Vec<String> = entries
            .iter()
            .map(|e| format!("job{}[{},{})", e.job, e.start, e.end))
            .collect();
        let utilization = kpi.utilization_by_machine.get(&machine).copied().unwrap_or(0.0);
        eprintln!(
            "machine {machine} ({:.1}%): {}",
            utilization * 100.0,
            sequence.join(" ")
        );
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let (jobs, config) = read_request(&args)?;
    let config = apply_overrides(config, &args);
    info!(jobs = jobs.len(), ?config, "scheduling");

    let outcome = schedule_jobs(&jobs, &config)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if args.summary {
        print_summary(&jobs, &outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
