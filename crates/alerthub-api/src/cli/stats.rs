//! `alerthub stats`: neighborhood and monthly report statistics.

use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use console::style;

use alerthub_types::heatmap::HeatmapFilter;
use alerthub_types::report::ReportStatus;

use crate::state::AppState;

pub async fn stats(
    state: &AppState,
    category: Option<String>,
    status: Option<String>,
    json: bool,
) -> Result<()> {
    let status = status
        .as_deref()
        .map(str::parse::<ReportStatus>)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let filter = HeatmapFilter {
        category_id: category,
        status,
        ..Default::default()
    };
    let stats = state.heatmap_service.statistics(&filter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Neighborhoods").bold());

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Neighborhood").fg(Color::White),
        Cell::new("Reports").fg(Color::White),
        Cell::new("Avg resolution (h)").fg(Color::White),
    ]);
    for row in &stats.neighborhood_statistics {
        let resolution = match row.avg_resolution_hours {
            Some(hours) => Cell::new(format!("{hours:.1}")),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&row.neighborhood_name).fg(Color::Cyan),
            Cell::new(row.report_count).set_alignment(CellAlignment::Right),
            resolution.set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    println!();
    println!("  {}", style("Monthly volume").bold());

    if stats.time_trends.is_empty() {
        println!("  {} No reports in range.", style("i").blue().bold());
    } else {
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Month").fg(Color::White),
            Cell::new("Reports").fg(Color::White),
        ]);
        for trend in &stats.time_trends {
            table.add_row(vec![
                Cell::new(&trend.month),
                Cell::new(trend.report_count).set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }
    println!();

    Ok(())
}
