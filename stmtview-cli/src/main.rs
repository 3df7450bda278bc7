use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stmtview_core::{Analysis, Column, DashboardState, SortDirection, TableState, export_to_dir};
use stmtview_ingest::{run_analysis, validate_upload};

mod config;
mod dashboard;
mod logging;
mod render;
mod state;

use config::{Config, ReadinessMode};

#[derive(Parser, Debug)]
#[command(
    name = "stmtview",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("STMTVIEW_BUILD_SHA"), ")"),
    about = "Bank statement dashboard backed by a statement analysis service"
)]
struct Cli {
    /// Analysis service base URL (overrides config)
    #[arg(long, global = true)]
    server: Option<String>,

    /// How to tell that results are ready after the upload (overrides config)
    #[arg(long, global = true, value_enum)]
    readiness: Option<ReadinessMode>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a PDF statement and print the dashboard as text
    Analyze {
        pdf: PathBuf,

        /// Print the statement and statistics as parsed, in JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a PDF statement and print its transaction table
    Table {
        pdf: PathBuf,

        /// Column to sort by: date, description, amount, type
        #[arg(long)]
        sort: Option<Column>,

        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Only show rows matching this search text
        #[arg(long)]
        query: Option<String>,
    },

    /// Analyze a PDF statement and write its transactions to CSV
    Export {
        pdf: PathBuf,

        /// Output directory (defaults to [export].directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Interactive dashboard
    Dashboard {
        /// Statement to preselect
        pdf: Option<PathBuf>,
    },

    /// Manage ~/.stmtview/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Command::Dashboard { .. }) {
        logging::init_stderr(cli.verbose);
    }

    let cfg = config::load_config()?.with_overrides(cli.server, cli.readiness);

    match cli.command {
        Command::Analyze { pdf, json } => {
            let analysis = analyze(&cfg, &pdf).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", render::render_dashboard(&analysis, &TableState::new()));
            }
        }

        Command::Table {
            pdf,
            sort,
            desc,
            query,
        } => {
            let analysis = analyze(&cfg, &pdf).await?;
            let mut table = TableState::new();
            if let Some(column) = sort {
                let direction = if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                table.sort_by(column, direction);
            }
            if let Some(q) = query {
                table.set_query(q);
            }
            let txns = &analysis.statement.transactions;
            let rows = table.visible_rows(txns);
            print!("{}", render::render_table(txns, &rows, &table));
        }

        Command::Export { pdf, out } => {
            let analysis = analyze(&cfg, &pdf).await?;
            let dir = out.unwrap_or_else(|| cfg.export.directory.clone());
            let txns = &analysis.statement.transactions;
            let path = export_to_dir(&dir, txns, chrono::Local::now().naive_local())?;
            println!("Exported {} transactions to {}", txns.len(), path.display());
        }

        Command::Dashboard { pdf } => {
            logging::init_file(&state::log_path()?, cli.verbose)?;
            let handle = tokio::runtime::Handle::current();
            tokio::task::block_in_place(|| dashboard::run(&cfg, pdf, handle))?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config(&cfg)?,
        },
    }

    Ok(())
}

/// One analysis round trip through the same state the dashboard uses.
async fn analyze(cfg: &Config, pdf: &Path) -> Result<Analysis> {
    validate_upload(pdf)?;

    let service = cfg.service()?;
    let mut state = DashboardState::new();
    state.select_file(pdf);
    run_analysis(&mut state, &service, cfg.readiness()).await;

    if let Some(err) = state.error() {
        bail!("{err} (run with --verbose for details)");
    }
    state
        .analysis()
        .cloned()
        .with_context(|| format!("no results for {}", pdf.display()))
}
