//! Report CLI commands: list, show, update.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use alerthub_core::repository::report::ReportFilter;
use alerthub_types::report::{AddUpdateRequest, Report, ReportId, ReportStatus};
use alerthub_types::user::UserId;

use crate::cli::status_cell;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ReportCommand {
    /// List reports, newest first.
    #[command(alias = "ls")]
    List {
        /// Only reports filed by this user id.
        #[arg(long)]
        user: Option<String>,

        /// Maximum number of reports.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show a report and its status history.
    Show {
        /// Report id.
        id: String,
    },

    /// Record a status change on a report.
    Update {
        /// Report id.
        id: String,

        /// New status: submitted, in_progress, resolved, closed.
        #[arg(long)]
        status: String,

        #[arg(long)]
        comment: String,

        /// User id recorded as the author of the update.
        #[arg(long)]
        user: String,
    },
}

pub async fn handle_report_command(
    cmd: ReportCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ReportCommand::List { user, limit } => list_reports(state, user, limit, json).await,
        ReportCommand::Show { id } => show_report(state, &id, json).await,
        ReportCommand::Update {
            id,
            status,
            comment,
            user,
        } => update_report(state, &id, &status, comment, &user, json).await,
    }
}

fn parse_report_id(raw: &str) -> Result<ReportId> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid report id"))
}

fn parse_user_id(raw: &str) -> Result<UserId> {
    raw.parse()
        .with_context(|| format!("'{raw}' is not a valid user id"))
}

async fn list_reports(
    state: &AppState,
    user: Option<String>,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let user_id = user.as_deref().map(parse_user_id).transpose()?;
    let reports = state
        .report_service
        .list_reports(ReportFilter { user_id, limit })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if reports.is_empty() {
        println!();
        println!("  {} No reports found.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Tracking #").fg(Color::White),
        Cell::new("Category").fg(Color::White),
        Cell::new("Severity").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("Description").fg(Color::White),
        Cell::new("Filed").fg(Color::White),
    ]);

    for report in &reports {
        table.add_row(vec![
            Cell::new(&report.tracking_number).fg(Color::Cyan),
            Cell::new(&report.category_id),
            severity_cell(report),
            status_cell(&report.status),
            Cell::new(truncate(&report.description, 48)),
            Cell::new(report.created_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} report{}",
        style(reports.len()).bold(),
        if reports.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn show_report(state: &AppState, id: &str, json: bool) -> Result<()> {
    let id = parse_report_id(id)?;
    let report = state.report_service.get_report(&id).await?;
    let updates = state.report_service.list_updates(&id).await?;

    if json {
        let out = serde_json::json!({ "report": report, "updates": updates });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&report.tracking_number).cyan().bold(),
        report.title.as_deref().unwrap_or_default()
    );
    println!();
    println!("  {}    {}", style("Category:").bold(), report.category_id);
    println!("  {}    {}", style("Severity:").bold(), report.severity.level());
    println!("  {}      {}", style("Status:").bold(), report.status);
    println!(
        "  {}    {:.5}, {:.5}",
        style("Location:").bold(),
        report.location.latitude,
        report.location.longitude
    );
    if let Some(address) = &report.address {
        println!("  {}     {}", style("Address:").bold(), address);
    }
    println!(
        "  {}       {}",
        style("Filed:").bold(),
        report.created_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(resolved) = report.resolved_at {
        println!(
            "  {}    {}",
            style("Resolved:").bold(),
            resolved.format("%Y-%m-%d %H:%M UTC")
        );
    }
    println!();
    println!("  {}", report.description);

    if !report.media.is_empty() {
        println!();
        println!("  {}", style("── Media ──").dim());
        for media in &report.media {
            println!("  {} {} {}", style("•").dim(), media.media_type, media.file_url);
        }
    }

    if !updates.is_empty() {
        println!();
        println!("  {}", style("── Updates ──").dim());
        for update in &updates {
            println!(
                "  {} {}  {}  {}",
                style("•").dim(),
                style(update.created_at.format("%Y-%m-%d %H:%M")).dim(),
                style(update.status_change).bold(),
                update.comment
            );
        }
    }
    println!();

    Ok(())
}

async fn update_report(
    state: &AppState,
    id: &str,
    status: &str,
    comment: String,
    user: &str,
    json: bool,
) -> Result<()> {
    let id = parse_report_id(id)?;
    let user_id = parse_user_id(user)?;
    let status: ReportStatus = status.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let update = state
        .report_service
        .add_update(
            &id,
            user_id,
            AddUpdateRequest {
                status_change: Some(status),
                comment: Some(comment),
            },
        )
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&update)?);
    } else {
        println!(
            "  {} Report {} is now {}",
            style("✓").green().bold(),
            style(id.to_string()).dim(),
            style(update.status_change).bold()
        );
    }

    Ok(())
}

fn severity_cell(report: &Report) -> Cell {
    let level = report.severity.level();
    let color = match level {
        4..=5 => Color::Red,
        3 => Color::Yellow,
        _ => Color::Green,
    };
    Cell::new(level).fg(color)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
