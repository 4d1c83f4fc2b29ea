use std::{path::PathBuf, time::Duration};

use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use lastmile_bench::{
    baselines::{
        cluster::ClusterRouter,
        greedy::GreedyAppendRouter,
        p_hub::PHubBaseline,
        savings::SavingsSolver,
        solver::{MatrixProvider, estimate_num_vehicles},
        sweep::SweepRouter,
        task1::solve_cvrp_instance,
    },
    evaluation::evaluator::{EvaluationReport, Evaluator},
    json::{instance_file::load_instance, solution_file::save_solution},
    problem::{instance::Instance, solution::Solution, task::TaskKind},
    simulation::{router::IncrementalRouter, simulator::simulate},
};
use lastmile_routing::{oracle::DistanceOracle, stopwatch::Stopwatch};
use tracing::info;

use crate::{
    file_utils::{json_files, output_path},
    network::{MetricArg, load_oracle, matrix_cache},
    table::{format_time, reports_table, total_distance, totals_table},
};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Method {
    /// Task 1, Clarke-Wright savings
    Savings,
    /// Task 2, cheapest append
    Greedy,
    /// Task 2, zones learned from the history
    Cluster,
    /// Task 2, angular sectors around the depot learned from the history
    Sweep,
    /// Task 3, greedy p-median hubs then savings per hub
    PHub,
}

#[derive(Args)]
pub struct BaselineArgs {
    #[arg(short, long, value_enum)]
    method: Method,

    /// Instance file, or a folder of instances
    #[arg(short, long)]
    instances: PathBuf,

    /// Road network the instances are routed on
    #[arg(short, long)]
    network: PathBuf,

    /// Past instances the cluster and sweep routers learn their zones from
    #[arg(long)]
    history: Option<PathBuf>,

    /// Number of hubs of the p-hub baseline
    #[arg(long, default_value_t = 3)]
    hubs: usize,

    /// Number of zones of the cluster and sweep routers
    #[arg(long, default_value_t = 10)]
    clusters: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = MetricArg::Distance)]
    metric: MetricArg,

    /// Folder the solution files are written to
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn load_instances(path: &PathBuf) -> Result<Vec<Instance>, anyhow::Error> {
    json_files(path)?.iter().map(load_instance).collect()
}

fn progress_bar(len: usize) -> Result<ProgressBar, anyhow::Error> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} {msg}")?);
    Ok(bar)
}

/// Solution of one instance and how long it took. Incremental runs carry the
/// simulator's own report.
struct BaselineRun {
    solution: Solution,
    report: Option<EvaluationReport>,
    time: Duration,
}

fn solve_each(
    instances: &[Instance],
    mut solve: impl FnMut(&Instance) -> Result<(Solution, Option<EvaluationReport>), anyhow::Error>,
) -> Result<Vec<BaselineRun>, anyhow::Error> {
    let bar = progress_bar(instances.len())?;
    let mut runs = Vec::with_capacity(instances.len());

    for instance in instances {
        bar.set_message(instance.name().to_owned());

        let stopwatch = Stopwatch::new(instance.name());
        let (solution, report) = solve(instance)?;
        stopwatch.report();

        runs.push(BaselineRun {
            solution,
            report,
            time: stopwatch.elapsed(),
        });
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(runs)
}

fn simulate_each(
    router: &mut dyn IncrementalRouter,
    oracle: &DistanceOracle,
    instances: &[Instance],
    history: &[Instance],
) -> Result<Vec<BaselineRun>, anyhow::Error> {
    info!(router = router.name(), "Simulating arrivals");

    solve_each(instances, |instance| {
        let (solution, report) = simulate(router, instance, oracle, history)?;
        Ok((solution, Some(report)))
    })
}

fn load_history(args: &BaselineArgs) -> Result<Vec<Instance>, anyhow::Error> {
    match &args.history {
        Some(path) => load_instances(path),
        None => Ok(vec![]),
    }
}

pub fn run(args: BaselineArgs) -> Result<(), anyhow::Error> {
    let oracle = load_oracle(&args.network, args.metric.oracle_params())?;
    let cache = matrix_cache();
    let provider = match &cache {
        Some(cache) => MatrixProvider::with_cache(&oracle, cache),
        None => MatrixProvider::new(&oracle),
    };

    let instances = load_instances(&args.instances)?;
    info!(
        instances = instances.len(),
        method = ?args.method,
        "Running baseline"
    );

    let mut totals: Vec<(&str, String)> = vec![];

    let runs = match args.method {
        Method::Savings => solve_each(&instances, |instance| {
            Ok((solve_cvrp_instance(&SavingsSolver, &provider, instance)?, None))
        })?,
        Method::Greedy => simulate_each(&mut GreedyAppendRouter, &oracle, &instances, &[])?,
        Method::Cluster => {
            let history = load_history(&args)?;
            let mut router = ClusterRouter::pretrain(&history, args.clusters, args.seed);
            simulate_each(&mut router, &oracle, &instances, &history)?
        }
        Method::Sweep => {
            let history = load_history(&args)?;
            let mut router = SweepRouter::pretrain(&history, args.clusters);
            simulate_each(&mut router, &oracle, &instances, &history)?
        }
        Method::PHub => {
            let baseline = PHubBaseline::new(args.hubs);

            let stopwatch = Stopwatch::new("hub selection");
            let hubs = baseline.select(&oracle, &instances)?;
            totals.push(("hub selection time", format_time(stopwatch.elapsed())));

            solve_each(&instances, |instance| {
                let solution = baseline.solve_instance(&SavingsSolver, &provider, instance, &hubs)?;
                Ok((solution, None))
            })?
        }
    };

    if let Some(output) = &args.output {
        std::fs::create_dir_all(output)?;
        for run in &runs {
            save_solution(output_path(output, &run.solution.instance), &run.solution)?;
        }
        info!(solutions = runs.len(), output = %output.display(), "Wrote solutions");
    }

    let pairs: Vec<(&Instance, &Solution)> = instances
        .iter()
        .zip(runs.iter().map(|run| &run.solution))
        .collect();
    let evaluator = Evaluator::new(&oracle);

    let simulated: Option<Vec<EvaluationReport>> =
        runs.iter().map(|run| run.report.clone()).collect();

    let reports = match (args.method, simulated) {
        (Method::PHub, _) => {
            let submission = evaluator.evaluate_submission(&pairs)?;
            totals.push(("hub consistent", submission.hub_consistent.to_string()));
            totals.push(("hubs", submission.hubs.len().to_string()));
            submission.reports
        }
        // A failed run keeps the rejection that ended it
        (_, Some(reports)) if !reports.is_empty() => reports,
        _ => evaluator.evaluate_all(&pairs)?,
    };

    let estimate: usize = instances
        .iter()
        .zip(&reports)
        .filter(|(_, report)| report.task == TaskKind::Cvrp)
        .map(|(instance, _)| estimate_num_vehicles(instance))
        .sum();
    if estimate > 0 {
        totals.push(("vehicle estimate", estimate.to_string()));
    }
    totals.push((
        "vehicles",
        reports
            .iter()
            .map(|report| report.num_vehicles)
            .sum::<usize>()
            .to_string(),
    ));
    totals.push(("total distance", total_distance(&reports)));

    let times: Vec<Duration> = runs.iter().map(|run| run.time).collect();
    totals.push(("total time", format_time(times.iter().sum())));

    println!("{}", reports_table(&reports, &times));
    println!("{}", totals_table(&totals));

    Ok(())
}
