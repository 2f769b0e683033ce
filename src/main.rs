//! Foodshare CLI - Local food wastage management dashboard

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use foodshare::config::{self, Settings};
use foodshare::storage::{self, SeedOutcome, TableName};
use foodshare::{ListingDetails, Report};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "foodshare")]
#[command(version)]
#[command(about = "Local Food Wastage Management - connect food providers with receivers")]
#[command(long_about = r#"
Foodshare tracks surplus food offered by providers and claimed by receivers:
  • Browse providers, receivers, food listings and claims
  • Run coverage, food type and claim status reports
  • Add, update and delete food listings

On first run the store is seeded from providers_data.csv, receivers_data.csv,
food_listings_data.csv and claims_data.csv in the data directory.

Example usage:
  foodshare view food_listings
  foodshare analytics
  foodshare add --name Rice --quantity 10 --expiry 2030-01-01 --provider-id 1 \
      --provider-type Restaurant --location Austin --food-type Vegetarian --meal-type Lunch
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Directory holding the seed CSV files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to foodshare.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Discard the existing store and seed again from the CSV files
    #[arg(long, global = true)]
    reseed: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview of what is in the store
    Home,

    /// Show every row of one table
    View {
        /// providers, receivers, food_listings or claims
        #[arg(value_parser = parse_table)]
        table: TableName,
    },

    /// Run the report catalog
    Analytics {
        /// Run a single report (city_coverage, food_type_frequency, claim_status)
        #[arg(short, long, value_parser = parse_report)]
        report: Option<Report>,
    },

    /// Add a new food listing
    Add(AddArgs),

    /// Show one food listing
    Show {
        /// Food ID
        id: i64,
    },

    /// Update an existing food listing; omitted fields keep their current value
    Update(UpdateArgs),

    /// Delete a food listing
    Delete {
        /// Food ID
        id: i64,
    },

    /// List food IDs and names
    Listings,

    /// Show seed provenance and whether the CSV files changed since
    Status,

    /// Write the resolved database and data paths to foodshare.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Food name
    #[arg(long)]
    name: String,

    /// Quantity (at least 1)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: u32,

    /// Expiry date (YYYY-MM-DD), today or later
    #[arg(long, value_parser = parse_date)]
    expiry: NaiveDate,

    /// Provider ID
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    provider_id: i64,

    /// Provider type
    #[arg(long)]
    provider_type: String,

    /// Location
    #[arg(long)]
    location: String,

    /// Food type
    #[arg(long)]
    food_type: String,

    /// Meal type
    #[arg(long)]
    meal_type: String,
}

impl From<AddArgs> for ListingDetails {
    fn from(args: AddArgs) -> Self {
        ListingDetails {
            food_name: args.name,
            quantity: args.quantity,
            expiry_date: args.expiry,
            provider_id: args.provider_id,
            provider_type: args.provider_type,
            location: args.location,
            food_type: args.food_type,
            meal_type: args.meal_type,
        }
    }
}

#[derive(Args)]
struct UpdateArgs {
    /// Food ID to update
    id: i64,

    #[arg(long)]
    name: Option<String>,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    quantity: Option<u32>,

    #[arg(long, value_parser = parse_date)]
    expiry: Option<NaiveDate>,

    #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
    provider_id: Option<i64>,

    #[arg(long)]
    provider_type: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    food_type: Option<String>,

    #[arg(long)]
    meal_type: Option<String>,
}

impl UpdateArgs {
    /// The full record to write: current values overlaid with the given flags
    fn merge(self, current: ListingDetails) -> ListingDetails {
        ListingDetails {
            food_name: self.name.unwrap_or(current.food_name),
            quantity: self.quantity.unwrap_or(current.quantity),
            expiry_date: self.expiry.unwrap_or(current.expiry_date),
            provider_id: self.provider_id.unwrap_or(current.provider_id),
            provider_type: self.provider_type.unwrap_or(current.provider_type),
            location: self.location.unwrap_or(current.location),
            food_type: self.food_type.unwrap_or(current.food_type),
            meal_type: self.meal_type.unwrap_or(current.meal_type),
        }
    }
}

fn parse_table(s: &str) -> Result<TableName, String> {
    s.parse().map_err(|e: foodshare::Error| e.to_string())
}

fn parse_report(s: &str) -> Result<Report, String> {
    s.parse().map_err(|e: foodshare::Error| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

/// Print the JSON success envelope. No-op in human mode.
pub fn emit_success(mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "ok": true,
            "command": command,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    if let Err(e) = execute(cli, output_mode) {
        if output_mode.is_human() {
            foodshare::ui::error(&format!("{:#}", e));
        } else {
            println!("{}", serde_json::to_string_pretty(&failure_envelope(&e))?);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn failure_envelope(err: &anyhow::Error) -> serde_json::Value {
    serde_json::json!({ "ok": false, "error": format!("{:#}", err) })
}

/// Everything after logging setup. Any error here is reported in the selected output mode.
fn execute(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let file_config = config::load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(file_config.as_ref(), cli.database, cli.data_dir);

    if let Commands::Init { force } = cli.command {
        let path = cli.config.unwrap_or_else(config::default_config_path);
        return commands::run_init(&path, &settings, force, output_mode);
    }

    prepare_store(&settings, cli.reseed, output_mode)?;
    let gateway = foodshare::Gateway::new(&settings.database);
    run(cli.command, &gateway, &settings, output_mode)
}

/// Seed once before any gateway use.
fn prepare_store(settings: &Settings, reseed: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let spinner = output_mode
        .is_human()
        .then(|| foodshare::ui::Spinner::new("Preparing food database..."));

    let outcome = if reseed {
        storage::reseed(settings).map(SeedOutcome::Seeded)
    } else {
        storage::ensure_database(settings)
    };

    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }

    match outcome? {
        SeedOutcome::Existing => {}
        SeedOutcome::Seeded(summary) => {
            tracing::info!("Seeded {} from {}", settings.database.display(), settings.data_dir.display());
            if output_mode.is_human() {
                foodshare::ui::success(&format!("Database created at {}", settings.database.display()));
                for table in summary {
                    foodshare::ui::summary_row(table.table.as_str(), &table.rows.to_string());
                }
            }
        }
    }
    Ok(())
}

fn run(command: Commands, gateway: &foodshare::Gateway, settings: &Settings, output_mode: OutputMode) -> anyhow::Result<()> {
    match command {
        Commands::Home => commands::run_home(gateway, output_mode),
        Commands::View { table } => commands::run_view(gateway, table, output_mode),
        Commands::Analytics { report } => commands::run_analytics(gateway, report, output_mode),
        Commands::Add(args) => {
            let today = chrono::Local::now().date_naive();
            if args.expiry < today {
                anyhow::bail!("expiry date {} is in the past", args.expiry);
            }
            commands::run_add(gateway, &args.into(), output_mode)
        }
        Commands::Show { id } => commands::run_show(gateway, id, output_mode),
        Commands::Update(args) => {
            let id = args.id;
            let Some(current) = foodshare::listing::read_for_edit(gateway, id)? else {
                anyhow::bail!("no food listing with ID {}", id);
            };
            let details = args.merge(current.details);
            commands::run_update(gateway, id, &details, output_mode)
        }
        Commands::Delete { id } => commands::run_delete(gateway, id, output_mode),
        Commands::Listings => commands::run_listings(gateway, output_mode),
        Commands::Status => commands::run_status(settings, output_mode),
        Commands::Init { .. } => unreachable!("init is handled before the store is opened"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_cli(dir: &std::path::Path, config: &std::path::Path, extra: &[&str]) -> Cli {
        let db = dir.join("food_waste.db");
        let mut args = vec![
            "foodshare".to_string(),
            "--json".to_string(),
            "--config".to_string(),
            config.display().to_string(),
            "--database".to_string(),
            db.display().to_string(),
            "--data-dir".to_string(),
            dir.display().to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_bad_config_is_a_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("foodshare.toml");
        std::fs::write(&config, "database = [not toml").unwrap();

        let cli = json_cli(dir.path(), &config, &["home"]);
        let err = execute(cli, OutputMode::Json).unwrap_err();
        let envelope = failure_envelope(&err);
        assert_eq!(envelope["ok"], serde_json::json!(false));
        assert!(envelope["error"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn test_seed_failure_is_a_command_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cli = json_cli(dir.path(), &dir.path().join("absent.toml"), &["listings"]);

        let err = execute(cli, OutputMode::Json).unwrap_err();
        assert!(failure_envelope(&err)["error"]
            .as_str()
            .is_some_and(|m| m.contains("providers_data.csv")));
        assert!(!dir.path().join("food_waste.db").exists());
    }
}
