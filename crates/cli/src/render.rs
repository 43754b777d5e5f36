use smegrowth_core::dashboard::{ChartSeries, DashboardSnapshot, HistoryRow};
use smegrowth_core::domain::category::Category;
use smegrowth_core::domain::prediction::{HealthStatus, HistoryRecord, PredictionResponse};
use smegrowth_core::form::{FormField, NumericKind, ValidationError, FIELDS};
use smegrowth_core::form::fields::SIZE_FIELD_LABEL;
use smegrowth_core::present::{present, PresentedResult};
use smegrowth_core::report::ExportedReport;

const BAR_WIDTH: usize = 30;

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn bar(percentage: f64) -> String {
    let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn local_time(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

pub fn fields(json: bool) -> anyhow::Result<()> {
    if json {
        let list: Vec<_> = FIELDS
            .iter()
            .map(|def| {
                serde_json::json!({
                    "key": def.key.as_str(),
                    "label": def.label,
                    "display_label": def.display_label,
                    "help": def.help,
                    "kind": def.kind,
                    "required": def.required,
                })
            })
            .collect();
        return print_json(&list);
    }

    for def in FIELDS.iter() {
        let kind = match def.kind {
            NumericKind::Float => "number",
            NumericKind::Integer => "integer",
        };
        println!("{:<24} {:<8} {}", def.key.as_str(), kind, def.display_label);
        println!("{:<24} {:<8} label: {}", "", "", def.label);
        println!("{:<24} {:<8} {}", "", "", def.help);
    }
    println!("{:<24} {:<8} Small, Medium or Large (--size)", "size", "choice");
    println!("{:<24} {:<8} label: {}", "", "", SIZE_FIELD_LABEL);
    Ok(())
}

pub fn validation_errors(errors: &[ValidationError]) {
    for err in errors {
        let key = match err.field() {
            FormField::Numeric(key) => key.as_str(),
            FormField::Size => "size",
        };
        eprintln!("  {key}: {err}");
    }
}

fn presented_text(result: &PresentedResult) {
    println!(
        "Growth potential: {} ({:.2}% confidence)",
        result.prediction, result.dominant_percentage
    );
    println!();
    for entry in &result.breakdown {
        println!(
            "  {:<7} {} {:>6.2}%",
            entry.category.as_str(),
            bar(entry.percentage),
            entry.percentage
        );
    }
    println!();
    println!("{}", result.interpretation);
}

pub fn prediction(response: &PredictionResponse, json: bool) -> anyhow::Result<()> {
    let result = present(response);
    if json {
        return print_json(&serde_json::json!({
            "result": result,
            "message": response.message,
        }));
    }

    presented_text(&result);
    if let Some(message) = &response.message {
        println!();
        println!("{message}");
    }
    Ok(())
}

pub fn record(record: &HistoryRecord, json: bool) -> anyhow::Result<()> {
    let result = present(&record.as_response());
    if json {
        return print_json(&serde_json::json!({
            "record": record,
            "result": result,
        }));
    }

    println!("Prediction #{} at {}", record.id, local_time(record.timestamp));
    println!(
        "Size: {}  Age: {}",
        record.enterprise_size.as_deref().unwrap_or("N/A"),
        record
            .enterprise_age
            .map(|age| format!("{age} years"))
            .unwrap_or_else(|| "N/A".to_string())
    );
    println!();
    presented_text(&result);
    Ok(())
}

fn charts_text(charts: &ChartSeries) {
    if !charts.has_data() {
        println!("  no predictions yet");
        return;
    }
    for (slice, point) in charts.pie.iter().zip(&charts.bar) {
        println!(
            "  {:<7} {} {:>6.2}% ({})",
            slice.name.as_str(),
            bar(point.percentage),
            point.percentage,
            slice.value
        );
    }
}

fn rows_text(rows: &[HistoryRow]) {
    if rows.is_empty() {
        println!("  no history");
        return;
    }
    println!(
        "  {:>6}  {:<16}  {:<7}  {:>10}  {:<7}  {:>4}",
        "ID", "Time", "Growth", "Confidence", "Size", "Age"
    );
    for row in rows {
        println!(
            "  {:>6}  {:<16}  {:<7}  {:>9.2}%  {:<7}  {:>4}",
            row.id,
            local_time(row.timestamp),
            row.prediction.as_str(),
            row.confidence,
            row.enterprise_size,
            row.enterprise_age
                .map(|age| age.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
}

pub fn dashboard(snapshot: &DashboardSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "generation": snapshot.generation,
            "statistics": snapshot.overall,
            "recent": snapshot.recent,
            "charts": snapshot.charts,
            "rows": snapshot.rows,
        }));
    }

    let overall = &snapshot.overall;
    println!("Total predictions: {}", overall.overall.total_predictions);
    println!("Last 7 days:       {}", overall.recent_predictions_7days);
    println!();
    println!("Growth distribution");
    charts_text(&snapshot.charts);

    let averages: Vec<String> = Category::ALL
        .iter()
        .filter_map(|c| {
            (*overall.average_confidence.get(*c)).map(|avg| format!("{c} {:.2}%", avg * 100.0))
        })
        .collect();
    if !averages.is_empty() {
        println!();
        println!("Average confidence: {}", averages.join(", "));
    }

    if !overall.size_distribution.is_empty() {
        let sizes: Vec<String> = overall
            .size_distribution
            .iter()
            .map(|(size, count)| format!("{size} {count}"))
            .collect();
        println!("By size: {}", sizes.join(", "));
    }

    println!();
    println!(
        "Recent predictions ({} shown: High {}, Medium {}, Low {})",
        snapshot.rows.len(),
        snapshot.recent.count(Category::High),
        snapshot.recent.count(Category::Medium),
        snapshot.recent.count(Category::Low)
    );
    rows_text(&snapshot.rows);
    Ok(())
}

pub fn exported(report: &ExportedReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "prediction_id": report.prediction_id,
            "path": report.path,
            "bytes": report.bytes,
        }));
    }
    println!(
        "Saved report for prediction #{} to {} ({} bytes)",
        report.prediction_id,
        report.path.display(),
        report.bytes
    );
    Ok(())
}

pub fn health(health: &HealthStatus, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(health);
    }
    match &health.message {
        Some(message) => println!("{}: {message}", health.status),
        None => println!("{}", health.status),
    }
    Ok(())
}
