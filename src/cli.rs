//! CLI interface for quadrant-rater

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::aggregate::{sort_rows, SortColumn};
use crate::config::{self, Config};
use crate::render::{quadrant_svg, summary_text, PlotStyle, ViewParams};
use crate::session::Session;
use crate::types::{GroupId, Point};

#[derive(Parser)]
#[command(name = "quadrant-rater")]
#[command(about = "Rate solutions on a complexity/value quadrant, per group", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, env = "QUADRANT_RATER_CONFIG")]
    config: Option<PathBuf>,

    /// Ratings file, overriding `data_file` from the configuration
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default when no command given)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the summary table
    Show {
        /// Column to sort by, e.g. "Average_Value" or "Group 1_Complexity"
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one rating
    Get {
        group: String,
        solution: u32,
    },
    /// Set one rating (clamped to 0..=10, step 0.1)
    #[command(allow_negative_numbers = true)]
    Set {
        group: String,
        solution: u32,
        complexity: f64,
        value: f64,
    },
    /// Print per-solution averages over some groups
    Average {
        /// Group to include; repeat for several (default: all groups)
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },
    /// Write the quadrant plot as SVG
    Plot {
        /// Group to draw; repeat for several (default: all groups)
        #[arg(short, long = "group")]
        groups: Vec<String>,
        /// Draw the averages of the selected groups
        #[arg(long)]
        average: bool,
        /// Hide the individual groups when drawing averages
        #[arg(long)]
        hide_groups: bool,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or initialise the configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Print the configuration file path
        #[arg(long)]
        path: bool,
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

impl Cli {
    fn config_file(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::config_path(),
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(&self.config_file()?)?;
        if let Some(data) = &self.data {
            config.data_file = data.clone();
        }
        Ok(config)
    }
}

/// Resolve group names, defaulting to every configured group
fn resolve_groups(session: &Session, names: &[String]) -> Result<Vec<GroupId>> {
    if names.is_empty() {
        return Ok(session.roster().groups().to_vec());
    }
    Ok(session.view_groups(names.iter().map(String::as_str))?)
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        None => {
            let config = cli.load_config()?;
            let (host, port) = (config.server.host.clone(), config.server.port);
            crate::server::start(&host, port, config).await?;
        }
        Some(Commands::Serve { port, host }) => {
            let config = cli.load_config()?;
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            crate::server::start(&host, port, config).await?;
        }
        Some(Commands::Show { sort, desc, json }) => {
            let session = Session::open(&cli.load_config()?)?;
            let mut rows = session.summary();
            if let Some(name) = sort {
                let column = SortColumn::parse(name, session.roster().groups())
                    .with_context(|| format!("Unknown sort column '{}'", name))?;
                sort_rows(&mut rows, &column, *desc);
            }
            if *json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", summary_text(&rows, session.roster().groups()));
            }
        }
        Some(Commands::Get { group, solution }) => {
            let session = Session::open(&cli.load_config()?)?;
            let group = session.roster().group(group)?;
            let solution = session.roster().solution(*solution)?;
            let point = session.get(&group, solution)?;
            println!("{} / solution {}: complexity {:.1}, value {:.1}", group, solution, point.complexity, point.value);
        }
        Some(Commands::Set { group, solution, complexity, value }) => {
            let mut session = Session::open(&cli.load_config()?)?;
            let group = session.roster().group(group)?;
            let solution = session.roster().solution(*solution)?;
            let requested = Point::new(*complexity, *value);
            let stored = session.update(&group, solution, requested)?;
            println!("{} / solution {}: complexity {:.1}, value {:.1}", group, solution, stored.complexity, stored.value);
            if !requested.in_range() {
                println!("(input clamped to 0..=10)");
            }
        }
        Some(Commands::Average { groups }) => {
            let session = Session::open(&cli.load_config()?)?;
            let groups = resolve_groups(&session, groups)?;
            let names: Vec<&str> = groups.iter().map(GroupId::as_str).collect();
            println!("Average over: {}", names.join(", "));
            for (solution, point) in session.average(&groups) {
                println!("{:>4}  complexity {:>5.2}  value {:>5.2}", solution, point.complexity, point.value);
            }
        }
        Some(Commands::Plot { groups, average, hide_groups, output }) => {
            let config = cli.load_config()?;
            let session = Session::open(&config)?;
            let view = ViewParams {
                groups: resolve_groups(&session, groups)?,
                show_average: *average,
                hide_groups: *hide_groups,
            };
            let svg = quadrant_svg(session.store(), &view, &PlotStyle::from_config(&config));
            match output {
                Some(path) => {
                    std::fs::write(path, svg)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Plot written to {}", path.display());
                }
                None => println!("{}", svg),
            }
        }
        Some(Commands::Config { show, path, init }) => {
            let file = cli.config_file()?;
            if *init {
                if file.exists() {
                    println!("Config already exists at {}", file.display());
                } else {
                    Config::default().save_to(&file)?;
                    println!("Default config written to {}", file.display());
                }
            } else if *path {
                println!("{}", file.display());
            } else {
                let config = cli.load_config()?;
                config::show_config(&config, &file);
                if !*show {
                    println!();
                    println!("Use --path to print the file location, --init to create it.");
                }
            }
        }
    }

    Ok(())
}
