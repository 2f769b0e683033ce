use crate::{emit_success, OutputMode};
use foodshare::config::{self, FoodshareConfig, Settings};
use std::path::Path;
use foodshare::listing::{self, FoodListing};
use foodshare::report::{claim_status_series, Report};
use foodshare::storage::{self, Frame, Gateway, SourceState, TableName};
use foodshare::ui::{self, bar_chart, frame_table, Icons, TableBuilder};
use foodshare::ListingDetails;
use owo_colors::OwoColorize;

const CHART_WIDTH: usize = 40;

fn frame_json(frame: &Frame) -> serde_json::Value {
    serde_json::json!({
        "columns": frame.columns(),
        "rows": frame.to_records(),
    })
}

fn print_frame(frame: &Frame) {
    if frame.is_empty() {
        println!("{} No rows.", Icons::EMPTY);
    } else {
        println!("{}", frame_table(frame));
    }
}

pub fn run_home(gateway: &Gateway, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut counts = Vec::new();
    for table in TableName::all() {
        let frame = gateway.query(&table.count_sql(), &[])?;
        let n = frame.get(0, "n").and_then(|v| v.as_i64()).unwrap_or(0);
        counts.push((*table, n));
    }

    if output_mode.is_human() {
        ui::banner(
            "Local Food Wastage Management System",
            "Connecting food providers and receivers to reduce food waste.",
        );
        println!();
        println!("You can:");
        println!("  - View providers, receivers, listings and claims   (foodshare view <table>)");
        println!("  - Analyze trends                                   (foodshare analytics)");
        println!("  - Add, update and delete listings                  (foodshare add | update | delete)");
        println!();

        let mut builder = TableBuilder::new();
        for (table, n) in &counts {
            builder.add_row(table.as_str(), &n.to_string());
        }
        println!("{}", builder.build());
    } else {
        let data: serde_json::Map<String, serde_json::Value> = counts
            .iter()
            .map(|(table, n)| (table.as_str().to_string(), serde_json::json!(n)))
            .collect();
        emit_success(output_mode, "home", serde_json::Value::Object(data))?;
    }
    Ok(())
}

pub fn run_view(gateway: &Gateway, table: TableName, output_mode: OutputMode) -> anyhow::Result<()> {
    let frame = storage::view_table(gateway, table)?;

    if output_mode.is_human() {
        println!("{} {} ({} rows)", Icons::TABLE, table.as_str().bold(), frame.len());
        print_frame(&frame);
    } else {
        emit_success(output_mode, "view", frame_json(&frame))?;
    }
    Ok(())
}

pub fn run_analytics(gateway: &Gateway, only: Option<Report>, output_mode: OutputMode) -> anyhow::Result<()> {
    let reports: Vec<Report> = match only {
        Some(r) => vec![r],
        None => Report::all().to_vec(),
    };

    if output_mode.is_human() {
        ui::header("Key Insights");
        for report in &reports {
            ui::section(report.title());
            let frame = report.run(gateway)?;
            print_frame(&frame);

            if *report == Report::ClaimStatus && !frame.is_empty() {
                print!("{}", bar_chart(&claim_status_series(&frame), CHART_WIDTH));
            }
        }
    } else {
        let mut data = serde_json::Map::new();
        for report in &reports {
            let key = serde_json::to_value(report)?
                .as_str()
                .map(str::to_string)
                .unwrap_or_default();
            data.insert(key, frame_json(&report.run(gateway)?));
        }
        emit_success(output_mode, "analytics", serde_json::Value::Object(data))?;
    }
    Ok(())
}

fn print_listing(listing: &FoodListing) {
    let d = &listing.details;
    let mut builder = TableBuilder::new();
    builder.add_row("Food ID", &listing.food_id.to_string());
    builder.add_row("Food Name", &d.food_name);
    builder.add_row("Quantity", &d.quantity.to_string());
    builder.add_row("Expiry Date", &d.expiry_date.format("%Y-%m-%d").to_string());
    builder.add_row("Provider ID", &d.provider_id.to_string());
    builder.add_row("Provider Type", &d.provider_type);
    builder.add_row("Location", &d.location);
    builder.add_row("Food Type", &d.food_type);
    builder.add_row("Meal Type", &d.meal_type);
    println!("{}", builder.build());
}

pub fn run_add(gateway: &Gateway, details: &ListingDetails, output_mode: OutputMode) -> anyhow::Result<()> {
    let food_id = listing::create(gateway, details)?;

    if output_mode.is_human() {
        ui::success(&format!("{} Food listing added successfully! (Food ID {})", Icons::NEW, food_id));
    } else {
        emit_success(output_mode, "add", serde_json::json!({ "food_id": food_id }))?;
    }
    Ok(())
}

pub fn run_show(gateway: &Gateway, food_id: i64, output_mode: OutputMode) -> anyhow::Result<()> {
    let found = listing::read_for_edit(gateway, food_id)?;

    if output_mode.is_human() {
        match &found {
            Some(l) => print_listing(l),
            None => println!("{} No food listing with ID {}.", Icons::EMPTY, food_id),
        }
    } else {
        emit_success(output_mode, "show", serde_json::to_value(&found)?)?;
    }
    Ok(())
}

pub fn run_update(
    gateway: &Gateway,
    food_id: i64,
    details: &ListingDetails,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    listing::update(gateway, food_id, details)?;

    if output_mode.is_human() {
        ui::success(&format!("{} Food listing updated successfully!", Icons::EDIT));
        if let Some(l) = listing::read_for_edit(gateway, food_id)? {
            print_listing(&l);
        }
    } else {
        emit_success(output_mode, "update", serde_json::json!({ "food_id": food_id }))?;
    }
    Ok(())
}

pub fn run_delete(gateway: &Gateway, food_id: i64, output_mode: OutputMode) -> anyhow::Result<()> {
    listing::delete(gateway, food_id)?;

    if output_mode.is_human() {
        ui::success(&format!("{} Food listing with ID {} deleted.", Icons::DEL, food_id));
    } else {
        emit_success(output_mode, "delete", serde_json::json!({ "food_id": food_id }))?;
    }
    Ok(())
}

pub fn run_listings(gateway: &Gateway, output_mode: OutputMode) -> anyhow::Result<()> {
    let choices = listing::list_choices(gateway)?;

    if output_mode.is_human() {
        if choices.is_empty() {
            println!("{} No food listings.", Icons::EMPTY);
        }
        for choice in &choices {
            println!("  {:>5}  {}", choice.food_id.to_string().bold(), choice.food_name);
        }
    } else {
        emit_success(output_mode, "listings", serde_json::to_value(&choices)?)?;
    }
    Ok(())
}

pub fn run_status(settings: &Settings, output_mode: OutputMode) -> anyhow::Result<()> {
    let sources = storage::check_staleness(settings)?;

    if output_mode.is_human() {
        ui::info("Database", &settings.database.display().to_string());
        ui::info("Data directory", &settings.data_dir.display().to_string());
        println!();

        let mut builder = TableBuilder::new();
        for source in &sources {
            let state = match source.state {
                SourceState::Unchanged => "unchanged",
                SourceState::Changed => "changed since seed",
                SourceState::Missing => "missing",
            };
            builder.add_row(
                source.table.as_str(),
                &format!("{} rows, seeded {}, source {}", source.rows, source.seeded_at, state),
            );
        }
        println!("{}", builder.build());

        if sources.iter().any(|s| s.state != SourceState::Unchanged) {
            ui::warn("Seed files differ from the store. Run with --reseed to reload them (this discards listing edits).");
        }
    } else {
        emit_success(output_mode, "status", serde_json::to_value(&sources)?)?;
    }
    Ok(())
}

pub fn run_init(path: &Path, settings: &Settings, force: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let file = FoodshareConfig {
        database: Some(settings.database.display().to_string()),
        data_dir: Some(settings.data_dir.display().to_string()),
    };
    config::write_config(path, &file, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
    } else {
        emit_success(output_mode, "init", serde_json::json!({ "config": path.display().to_string() }))?;
    }
    Ok(())
}
