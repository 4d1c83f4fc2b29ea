use std::time::Duration;

use comfy_table::{Table, presets::UTF8_FULL};
use lastmile_bench::evaluation::evaluator::EvaluationReport;

fn format_distance(distance: f64) -> String {
    if distance.is_finite() {
        format!("{:.1}", distance)
    } else {
        "-".to_owned()
    }
}

pub fn format_time(time: Duration) -> String {
    format!("{:.3}s", time.as_secs_f64())
}

/// One row per report. `times` are the solve times of the same instances,
/// the time column is left out when there are none.
pub fn reports_table(reports: &[EvaluationReport], times: &[Duration]) -> Table {
    let mut header = vec![
        "instance", "task", "feasible", "distance", "vehicles", "reason",
    ];
    if !times.is_empty() {
        header.push("time");
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);

    for (index, report) in reports.iter().enumerate() {
        let mut row = vec![
            report.instance.clone(),
            report.task.to_string(),
            report.feasible.to_string(),
            format_distance(report.total_distance),
            report.num_vehicles.to_string(),
            report
                .reason
                .as_ref()
                .map(|reason| reason.to_string())
                .unwrap_or_default(),
        ];
        if !times.is_empty() {
            row.push(times.get(index).copied().map(format_time).unwrap_or_default());
        }
        table.add_row(row);
    }

    table
}

/// One line per total, under the per instance table.
pub fn totals_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value.clone()]);
    }

    table
}

pub fn total_distance(reports: &[EvaluationReport]) -> String {
    format_distance(reports.iter().map(|report| report.total_distance).sum())
}

#[cfg(test)]
mod tests {
    use lastmile_bench::problem::task::TaskKind;

    use super::*;

    fn report(instance: &str, total_distance: f64) -> EvaluationReport {
        EvaluationReport {
            instance: instance.to_owned(),
            task: TaskKind::Cvrp,
            feasible: total_distance.is_finite(),
            reason: None,
            total_distance,
            num_vehicles: 1,
        }
    }

    #[test]
    fn test_time_column() {
        let reports = vec![report("a", 1500.0), report("b", f64::INFINITY)];

        let timed = reports_table(&reports, &[Duration::from_millis(1250), Duration::ZERO]).to_string();
        assert!(timed.contains("time"));
        assert!(timed.contains("1.250s"));
        assert!(timed.contains("1500.0"));

        let untimed = reports_table(&reports, &[]).to_string();
        assert!(!untimed.contains("time"));
        assert_eq!(total_distance(&reports), "-");
    }
}
