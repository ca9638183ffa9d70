//! `alerthub alerts`: one-off community alert scan.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use alerthub_types::feed::AlertLevel;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum AlertsCommand {
    /// Search for current incidents near the default location.
    Scan,
}

pub async fn handle_alerts_command(
    cmd: AlertsCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        AlertsCommand::Scan => scan(state, json).await,
    }
}

async fn scan(state: &AppState, json: bool) -> Result<()> {
    let alerts = state.alert_monitor().scan().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!();
        println!(
            "  {} No alerts near {}.",
            style("✓").green().bold(),
            state.feed_service.default_location()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Level").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Link").fg(Color::White),
    ]);
    for alert in &alerts {
        table.add_row(vec![
            level_cell(alert.level),
            Cell::new(&alert.title),
            Cell::new(&alert.link).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

fn level_cell(level: AlertLevel) -> Cell {
    let color = match level {
        AlertLevel::Red => Color::Red,
        AlertLevel::Yellow => Color::Yellow,
        AlertLevel::Green => Color::Green,
    };
    Cell::new(level).fg(color)
}
