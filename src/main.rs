use anyhow::{Context, Result};
use bey_meta::analysis::sort::{BuildColumn, PartColumn};
use bey_meta::analysis::{aggregate, builds_for_part, matches_for_build, sort_rows, SortDirection};
use bey_meta::config::Config;
use bey_meta::display::output::{
    display_build_matches, display_builds, display_error, display_info, display_meta_summary,
    display_part_table, display_player_card, display_player_summary, display_success,
};
use bey_meta::error::AppError;
use bey_meta::export::{build_records, part_records, write_records, ExportFormat};
use bey_meta::models::PartType;
use bey_meta::source::{load_dataset, Dataset};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bey_meta")]
#[command(about = "Part and build meta analysis for Beyblade tournaments", long_about = None)]
#[command(version)]
struct Args {
    /// Directory with blades.csv, ratchets.csv, bits.csv and matches.csv
    /// (overrides the BEY_META_*_URL settings)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Ignore cached tables and fetch everything again
    #[arg(long, global = true)]
    refresh: bool,

    /// Only analyse matches (and registrations) of this tournament id
    #[arg(long, global = true)]
    tournament: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Usage, win rate and Wilson score per part
    Parts {
        /// Only show one part type (blade, ratchet, bit)
        #[arg(short = 't', long)]
        part_type: Option<PartType>,

        /// Column to sort by (name, detail, usage, wins, losses, win_rate, wilson)
        #[arg(short, long)]
        sort: Option<PartColumn>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Only show the first N rows of each table
        #[arg(long)]
        top: Option<usize>,
    },

    /// Every build and player that used one part
    Builds {
        /// Part type of the filter (blade, ratchet, bit)
        #[arg(short = 't', long)]
        part_type: PartType,

        /// Part key, e.g. "Dran Sword", "3-60" or "F"
        #[arg(short, long)]
        part: String,

        /// Column to sort by (build, player, wins, losses, win_rate, wilson)
        #[arg(short, long)]
        sort: Option<BuildColumn>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Match log of one build as played by one player
    Matches {
        /// Build in "<blade> <ratchet><bit>" form
        #[arg(short, long)]
        build: String,

        /// Player who used the build
        #[arg(short, long)]
        player: String,
    },

    /// Player standings, or one player's card
    Players {
        /// Show the detailed card for this player
        #[arg(short, long)]
        player: Option<String>,
    },

    /// Write part stats (or builds for one part) to a file
    Export {
        /// json or csv
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Export builds for this part type instead of part stats
        #[arg(short = 't', long, requires = "part")]
        part_type: Option<PartType>,

        /// Part key for the build export
        #[arg(short, long, requires = "part_type")]
        part: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, args.json_logs);

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn direction(desc: bool) -> SortDirection {
    if desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_env(args.data_dir.clone())?;

    display_info("Loading part catalog and match results...");
    let pb = ProgressBar::new(config.sources().count() as u64);
    let mut data = load_dataset(&config, args.refresh, &pb).context("loading tables")?;
    pb.finish_and_clear();

    if let Some(tournament) = &args.tournament {
        let known: Vec<String> = data.tournaments().into_iter().map(str::to_string).collect();
        data = data.for_tournament(tournament);
        if data.matches.is_empty() {
            tracing::warn!(tournament = %tournament, known = ?known, "no matches recorded for tournament");
        }
    }
    display_success(&format!(
        "Loaded {} matches ({} blades, {} ratchets, {} bits)",
        data.matches.len(),
        data.catalog.blade.len(),
        data.catalog.ratchet.len(),
        data.catalog.bit.len()
    ));

    if data.catalog.is_empty() {
        tracing::warn!("part catalog is empty; every combo will be skipped");
    }

    match args.command {
        Command::Parts {
            part_type,
            sort,
            desc,
            top,
        } => show_parts(&data, part_type, sort, desc, top),
        Command::Builds {
            part_type,
            part,
            sort,
            desc,
        } => {
            ensure_known_part(&data, part_type, &part)?;
            let mut builds = builds_for_part(&data.matches, &data.catalog, part_type, &part);
            if let Some(column) = sort {
                sort_rows(&mut builds, column, direction(desc));
            }
            display_builds(part_type, &part, &builds);
        }
        Command::Matches { build, player } => {
            let rows = matches_for_build(&data.matches, &data.catalog, &build, &player);
            display_build_matches(&build, &player, &rows);
        }
        Command::Players { player } => {
            let mut players = data.player_stats();
            match player {
                Some(name) => {
                    let card = players
                        .iter()
                        .find(|p| p.name == name)
                        .ok_or_else(|| AppError::NotFound(format!("player '{}'", name)))?;
                    display_player_card(card);
                }
                None => {
                    players.sort_by(|a, b| b.points.cmp(&a.points).then(b.wins.cmp(&a.wins)));
                    display_player_summary(&players);
                }
            }
        }
        Command::Export {
            format,
            output,
            part_type,
            part,
        } => {
            let written = match (part_type, part) {
                (Some(part_type), Some(part)) => {
                    ensure_known_part(&data, part_type, &part)?;
                    let builds = builds_for_part(&data.matches, &data.catalog, part_type, &part);
                    let records = build_records(&builds);
                    write_records(&records, format, &output)?;
                    records.len()
                }
                _ => {
                    let report = aggregate(&data.matches, &data.catalog);
                    let records = part_records(&report);
                    write_records(&records, format, &output)?;
                    records.len()
                }
            };
            display_success(&format!("Wrote {} records to {}", written, output.display()));
        }
    }

    Ok(())
}

fn show_parts(
    data: &Dataset,
    part_type: Option<PartType>,
    sort: Option<PartColumn>,
    desc: bool,
    top: Option<usize>,
) {
    let report = aggregate(&data.matches, &data.catalog);
    let types: Vec<PartType> = match part_type {
        Some(t) => vec![t],
        None => PartType::ALL.to_vec(),
    };

    for t in types {
        let mut rows = report.ranked(t);
        if let Some(column) = sort {
            sort_rows(&mut rows, column, direction(desc));
        }
        if let Some(n) = top {
            rows.truncate(n);
        }
        display_part_table(t, &rows);
    }
    println!();
    display_meta_summary(report.matches_seen, report.unparsed_combos);
}

fn ensure_known_part(data: &Dataset, part_type: PartType, key: &str) -> Result<(), AppError> {
    if data.catalog.contains(part_type, key) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("{} '{}' in the part catalog", part_type, key)))
    }
}
