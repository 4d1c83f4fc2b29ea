use std::path::{Path, PathBuf};

use clap::Args;
use indicatif::ProgressBar;
use lastmile_bench::{
    evaluation::evaluator::{EvaluationReport, Evaluator},
    json::{instance_file::load_instance, solution_file::load_solution},
    problem::{instance::Instance, solution::Solution, task::TaskKind},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    file_utils::json_files,
    network::{MetricArg, load_oracle},
    table::{reports_table, total_distance, totals_table},
};

#[derive(Args)]
pub struct EvaluateArgs {
    /// Instance file, or a folder of instances
    #[arg(short, long)]
    instance: PathBuf,

    /// Solution file, or a folder of solutions
    #[arg(short, long)]
    solution: PathBuf,

    /// Road network the distances are measured on
    #[arg(short, long)]
    network: PathBuf,

    /// Scores every solution as this task (cvrp, incremental, hub_placement)
    #[arg(short, long)]
    task: Option<TaskKind>,

    #[arg(long, value_enum, default_value_t = MetricArg::Distance)]
    metric: MetricArg,

    /// Writes the reports to this JSON file
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct EvaluationSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    hub_consistent: Option<bool>,
    feasible: bool,
    total_distance: f64,
    reports: Vec<EvaluationReport>,
}

impl EvaluationSummary {
    fn from_reports(reports: Vec<EvaluationReport>) -> Self {
        let feasible = reports.iter().all(|report| report.feasible);
        let total_distance = if feasible {
            reports.iter().map(|report| report.total_distance).sum()
        } else {
            f64::INFINITY
        };

        EvaluationSummary {
            hub_consistent: None,
            feasible,
            total_distance,
            reports,
        }
    }
}

fn load_all<T>(
    path: &Path,
    load: impl Fn(&Path) -> Result<T, anyhow::Error>,
) -> Result<Vec<T>, anyhow::Error> {
    let files = json_files(path)?;
    let bar = ProgressBar::new(files.len() as u64);

    let loaded = files
        .iter()
        .map(|file| {
            bar.inc(1);
            load(file)
        })
        .collect::<Result<Vec<T>, anyhow::Error>>()?;

    bar.finish_and_clear();
    Ok(loaded)
}

/// Pairs every instance with the solution naming it. A single instance and a
/// single solution are paired as they are.
fn pair_solutions<'a>(
    instances: &'a [Instance],
    solutions: &'a [Solution],
) -> Result<Vec<(&'a Instance, &'a Solution)>, anyhow::Error> {
    if let ([instance], [solution]) = (instances, solutions) {
        return Ok(vec![(instance, solution)]);
    }

    for solution in solutions {
        if !instances
            .iter()
            .any(|instance| instance.name() == solution.instance)
        {
            warn!(instance = %solution.instance, "Ignoring solution of an unknown instance");
        }
    }

    instances
        .iter()
        .map(|instance| {
            solutions
                .iter()
                .find(|solution| solution.instance == instance.name())
                .map(|solution| (instance, solution))
                .ok_or_else(|| anyhow::anyhow!("No solution for instance {}", instance.name()))
        })
        .collect()
}

pub fn run(args: EvaluateArgs) -> Result<(), anyhow::Error> {
    let oracle = load_oracle(&args.network, args.metric.oracle_params())?;

    let instances = load_all(&args.instance, |path| load_instance(path))?;
    let solutions: Vec<Solution> = load_all(&args.solution, |path| load_solution(path))?
        .into_iter()
        .map(|solution| match args.task {
            Some(task) => solution.with_task(task),
            None => solution,
        })
        .collect();

    let pairs = pair_solutions(&instances, &solutions)?;
    let evaluator = Evaluator::new(&oracle);

    let is_submission = !pairs.is_empty()
        && pairs.iter().all(|(instance, solution)| {
            Evaluator::task_of(instance, solution) == TaskKind::HubPlacement
        });

    let (summary, totals) = if is_submission {
        let submission = evaluator.evaluate_submission(&pairs)?;
        let totals = vec![
            ("hub consistent", submission.hub_consistent.to_string()),
            ("hubs", submission.hubs.len().to_string()),
            ("total distance", total_distance(&submission.reports)),
        ];
        let summary = EvaluationSummary {
            hub_consistent: Some(submission.hub_consistent),
            feasible: submission.feasible,
            total_distance: submission.total_distance,
            reports: submission.reports,
        };
        (summary, totals)
    } else {
        let reports = evaluator.evaluate_all(&pairs)?;
        let totals = vec![("total distance", total_distance(&reports))];
        (EvaluationSummary::from_reports(reports), totals)
    };

    println!("{}", reports_table(&summary.reports, &[]));
    println!("{}", totals_table(&totals));

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        info!(report = %path.display(), "Wrote evaluation report");
    }

    let reports = &summary.reports;
    let infeasible = reports.iter().filter(|report| !report.feasible).count();
    if infeasible > 0 {
        anyhow::bail!(
            "{} of {} solutions are infeasible",
            infeasible,
            reports.len()
        );
    }

    Ok(())
}
