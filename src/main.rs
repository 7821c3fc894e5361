use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ppm_core::conflicts::{conflicts_by_project, find_conflicts};
use ppm_core::heatmap::build_heatmap;
use ppm_core::model::{AppData, RiskLevel};
use ppm_core::portfolio::{CloneOptions, clone_into};
use ppm_core::register::{self, RiskColumn, RiskFilter, SortDirection, SortOrder};
use ppm_core::scoring::{EnrichedRisk, enrich_risks, score_risk};
use ppm_core::summary::summarize;
use ppm_core::transfer::{self, export_file_name};
use ppm_core::{PpmConfig, Risk, dates};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ppm")]
#[command(about = "Score project risks, check schedule conflicts and move portfolio data in and out of JSON")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = "ppm.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Normalize an exported JSON file and store it as the data file
    Import {
        /// JSON export to read
        input: PathBuf,
        /// Report what would be imported without writing the data file
        #[arg(long)]
        dry_run: bool,
        /// Replace an existing data file
        #[arg(long)]
        force: bool,
    },
    /// Write the data file as a dated export
    Export {
        /// Output path (defaults to <export_dir>/ppm-export-<date>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List scored risks across all projects
    Risks {
        /// Only risks of this type
        #[arg(long = "type", value_parser = parse_level)]
        risk_type: Option<RiskLevel>,
        /// Only risks of this project id
        #[arg(short, long)]
        project: Option<i64>,
        /// Column key to sort by (score, projectName, type, customFields.<id>, ...)
        #[arg(long, default_value = "score")]
        sort: RiskColumn,
        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,
        /// Write the register as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Show the impact x type risk matrix
    Heatmap {
        /// Print the matrix as JSON
        #[arg(long)]
        json: bool,
        /// List the rgba colour of every non-empty cell
        #[arg(long)]
        colors: bool,
    },
    /// List timeline events overlapping project schedules
    Conflicts {
        /// Only check this project id
        #[arg(short, long)]
        project: Option<i64>,
    },
    /// Show portfolio summary figures
    Summary {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clone a project into the data file
    Clone {
        /// Id of the project to clone
        #[arg(short, long)]
        project: i64,
        /// Name of the clone (defaults to "<name> (Copy)")
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        no_risks: bool,
        #[arg(long)]
        no_tasks: bool,
        #[arg(long)]
        no_actions: bool,
    },
    /// Score a single type/impact pair with the current settings
    Score {
        #[arg(long = "type", value_parser = parse_level)]
        risk_type: RiskLevel,
        #[arg(long, value_parser = parse_level)]
        impact: RiskLevel,
    },
}

/// Case-insensitive risk level for command line flags
fn parse_level(raw: &str) -> Result<RiskLevel, String> {
    RiskLevel::ALL
        .iter()
        .copied()
        .find(|level| level.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| format!("expected one of Low, Medium, High, Critical; got '{raw}'"))
}

fn load_portfolio(config: &PpmConfig) -> Result<AppData> {
    transfer::load_data(&config.data_file).with_context(|| {
        format!(
            "No usable data file at {}. Run `ppm import <file>` first.",
            config.data_file.display()
        )
    })
}

fn print_register(risks: &[&EnrichedRisk]) {
    println!(
        "{:>5}  {:<8}  {:<8}  {:<24}  {}",
        "SCORE", "TYPE", "IMPACT", "PROJECT", "DESCRIPTION"
    );
    for risk in risks {
        println!(
            "{:>5}  {:<8}  {:<8}  {:<24}  {}",
            risk.score, risk.risk.risk_type, risk.risk.impact, risk.project_name, risk.risk.description
        );
    }
}

/// Refuses to replace an existing file unless `force` is set.
fn ensure_replaceable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite it", path.display());
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ppm_core::config::load_config(&cli.config)?;
    ppm_core::logging::init_logging(&config.log_filter)?;
    ppm_core::config::log_loaded(&config, &cli.config);

    match cli.command {
        Commands::Init { force } => {
            ensure_replaceable(&cli.config, force)?;
            let default_config = ppm_core::config::create_default_config();
            ppm_core::config::save_config(&default_config, &cli.config)?;
            println!("Configuration file created at: {}", cli.config.display());
        }

        Commands::Import {
            input,
            dry_run,
            force,
        } => {
            if !dry_run {
                ensure_replaceable(&config.data_file, force)?;
            }
            let contents = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read import file: {}", input.display()))?;
            let data = transfer::import_data(&contents)
                .with_context(|| format!("Failed to import {}", input.display()))?;

            println!(
                "Parsed {} projects, {} timeline events, {} stakeholders, {} weekly tasks",
                data.projects.len(),
                data.timeline_events.len(),
                data.stakeholders.len(),
                data.weekly_tasks.len()
            );
            if dry_run {
                println!("Dry run: {} left unchanged", config.data_file.display());
            } else {
                transfer::save_data(&data, &config.data_file)?;
                println!("Data file replaced: {}", config.data_file.display());
            }
        }

        Commands::Export { output } => {
            let data = load_portfolio(&config)?;
            let path = output
                .unwrap_or_else(|| config.export_dir.join(export_file_name(dates::today())));
            transfer::save_data(&data, &path)?;
            println!("Exported {} projects to {}", data.projects.len(), path.display());
        }

        Commands::Risks {
            risk_type,
            project,
            sort,
            ascending,
            csv,
        } => {
            let data = load_portfolio(&config)?;
            let enriched = enrich_risks(&data.projects, &data.settings);
            let filter = RiskFilter {
                risk_type,
                project_id: project,
            };
            let order = SortOrder {
                column: sort,
                direction: if ascending {
                    SortDirection::Ascending
                } else {
                    SortDirection::Descending
                },
            };
            let selected = register::filter_and_sort(&enriched, &filter, &order);

            match csv {
                Some(path) => {
                    let columns =
                        register::resolve_columns(&config.risk_register.columns, &data.settings);
                    let csv = register::to_csv(&selected, &columns, &data.settings)?;
                    write_file(&path, &csv)?;
                    println!("Wrote {} risks to {}", selected.len(), path.display());
                }
                None => print_register(&selected),
            }
        }

        Commands::Heatmap { json, colors } => {
            let data = load_portfolio(&config)?;
            let heatmap = build_heatmap(data.projects.iter().flat_map(|p| p.risks.iter()));
            if json {
                println!("{}", serde_json::to_string_pretty(&heatmap)?);
            } else {
                print!("{:<10}", "impact");
                for risk_type in RiskLevel::ALL {
                    print!("{:>9}", risk_type.as_str());
                }
                println!();
                for impact in RiskLevel::ALL.iter().rev() {
                    print!("{:<10}", impact.as_str());
                    for risk_type in RiskLevel::ALL {
                        print!("{:>9}", heatmap.count(*impact, *risk_type));
                    }
                    println!();
                }
                println!("max cell: {}", heatmap.max_count);
            }
            if colors {
                let base = &data.settings.risk_chart_color_critical;
                for impact in RiskLevel::ALL.iter().rev() {
                    for risk_type in RiskLevel::ALL {
                        let count = heatmap.count(*impact, *risk_type);
                        if let Some(color) = heatmap.cell_color(count, base) {
                            println!("{impact}/{risk_type}: {count} {color}");
                        }
                    }
                }
            }
        }

        Commands::Conflicts { project } => {
            let data = load_portfolio(&config)?;
            let groups = match project {
                Some(id) => {
                    let project = data
                        .project(id)
                        .with_context(|| format!("No project with id {id}"))?;
                    let events = find_conflicts(project, &data.timeline_events);
                    vec![(project, events)]
                }
                None => conflicts_by_project(&data.projects, &data.timeline_events)
                    .into_iter()
                    .map(|group| (group.project, group.events))
                    .collect(),
            };

            if groups.iter().all(|(_, events)| events.is_empty()) {
                println!("No schedule conflicts");
            }
            for (project, events) in groups.iter().filter(|(_, events)| !events.is_empty()) {
                println!(
                    "{} ({} .. {}) conflicts with:",
                    project.name, project.start_date, project.delivery_date
                );
                for event in events {
                    let start = event.start_date.as_deref().unwrap_or_default();
                    let end = event.end_date.as_deref().unwrap_or(start);
                    println!("  {} [{}] {} .. {}", event.name, event.event_type, start, end);
                }
            }
        }

        Commands::Summary { json } => {
            let data = load_portfolio(&config)?;
            let summary = summarize(&data.projects);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Projects:        {}", summary.total_projects);
                println!("On track:        {}%", summary.green_percentage);
                println!("At risk (Red):   {}", summary.at_risk_projects);
                println!("Open tasks:      {}", summary.open_tasks);
                for (level, count) in &summary.risk_distribution {
                    println!("{:<8} risks:  {}", level.as_str(), count);
                }
            }
        }

        Commands::Clone {
            project,
            name,
            no_risks,
            no_tasks,
            no_actions,
        } => {
            let mut data = load_portfolio(&config)?;
            let options = CloneOptions {
                risks: !no_risks,
                tasks: !no_tasks,
                actions: !no_actions,
            };
            let Some(new_id) = clone_into(&mut data, project, name, options) else {
                bail!("No project with id {project}");
            };
            transfer::save_data(&data, &config.data_file)?;
            println!("Created project {new_id}");
        }

        Commands::Score { risk_type, impact } => {
            let settings = if config.data_file.exists() {
                load_portfolio(&config)?.settings
            } else {
                ppm_core::AppSettings::default()
            };
            let outcome = score_risk(&Risk::new(0, risk_type, impact), &settings);
            if let Some(warning) = outcome.warning {
                eprintln!("Warning: {}", warning.message());
            }
            println!("{}", outcome.score);
        }
    }

    Ok(())
}
