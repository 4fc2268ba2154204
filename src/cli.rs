use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;

use crate::config::TrackerConfig;
use crate::display::{
    format_event, print_error, print_section, seat_map_table, simulation_table, state_table,
};
use crate::position::PositionMap;
use crate::registry::TableRegistry;
use crate::replay::Recording;
use crate::simulate::{simulate, SimConfig};

#[derive(Parser)]
#[command(name = "tracker", version, about = "Poker table tracker: reconstructs hands from periodic table snapshots.")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Tracker config file (JSON) replacing the built-in sites
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded polling session through the tracker
    Replay {
        /// Recording file (JSON)
        file: PathBuf,
        /// Print the tracked state of every table after each poll
        #[arg(long)]
        state: bool,
    },
    /// Reconstruct random hands from synthetic snapshots
    Simulate {
        /// Tables run in parallel
        #[arg(short, long, default_value = "4")]
        tables: usize,
        /// Hands per table
        #[arg(short = 'n', long, default_value = "250")]
        hands: usize,
        /// Players dealt in
        #[arg(short, long, default_value = "6")]
        players: usize,
        /// Seats at the table
        #[arg(long, default_value = "6")]
        seats: usize,
        /// Post a straddle every hand
        #[arg(long)]
        straddle: bool,
        /// Ante in big blinds
        #[arg(long, default_value = "0")]
        ante: f64,
        /// Probability of missing the poll after an action
        #[arg(long, default_value = "0")]
        skip: f64,
        /// RNG seed
        #[arg(long, default_value = "7")]
        seed: u64,
    },
    /// Show the seat-to-position map for a table
    Seats {
        /// Button seat
        #[arg(short, long)]
        button: usize,
        /// Occupied seats, comma separated (e.g., 0,2,3,5); all seats if omitted
        #[arg(short, long)]
        occupied: Option<String>,
        /// Seats at the table
        #[arg(short, long, default_value = "6")]
        size: usize,
    },
    /// List the configured poker sites
    Sites,
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

pub fn run_with_args(args: Vec<String>) {
    let cli = Cli::parse_from(args);
    dispatch(cli);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_target(false)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Option<TrackerConfig> {
    match path {
        None => Some(TrackerConfig::default()),
        Some(p) => match TrackerConfig::load(&p) {
            Ok(c) => Some(c),
            Err(e) => {
                print_error(&format!("{}: {}", p.display(), e));
                None
            }
        },
    }
}

fn dispatch(cli: Cli) {
    init_logging(cli.verbose);
    let Some(config) = load_config(cli.config) else {
        return;
    };
    match cli.command {
        Commands::Replay { file, state } => cmd_replay(config, file, state),
        Commands::Simulate {
            tables,
            hands,
            players,
            seats,
            straddle,
            ante,
            skip,
            seed,
        } => {
            let sim = SimConfig {
                seat_count: seats,
                players,
                straddle,
                ante,
                skip,
                ..SimConfig::default()
            };
            cmd_simulate(sim, tables, hands, seed)
        }
        Commands::Seats {
            button,
            occupied,
            size,
        } => cmd_seats(button, occupied, size),
        Commands::Sites => cmd_sites(&config),
    }
}

fn cmd_replay(config: TrackerConfig, file: PathBuf, show_state: bool) {
    let recording = match Recording::load(&file) {
        Ok(r) => r,
        Err(e) => {
            print_error(&format!("{}: {}", file.display(), e));
            return;
        }
    };

    let mut registry = TableRegistry::new(config);
    recording.play(&mut registry, |report, registry| {
        for id in &report.change.added {
            if let Some(table) = registry.get(id) {
                println!(
                    "{}",
                    format!("New Table: {} \"{}\" ({})", id, table.title, table.site.name).yellow()
                );
            }
        }
        for id in &report.change.removed {
            println!("{}", format!("Table closed: {}", id).yellow());
        }
        for (id, event) in &report.events {
            println!("{}", format_event(id, event));
        }
        if show_state {
            for table in registry.tables() {
                if let (Some(state), Some(seats)) = (table.tracker.state(), table.tracker.seats()) {
                    print_section(
                        &format!("Poll {}: {}", report.index, table.id),
                        &state_table(state, seats),
                    );
                }
            }
        }
    });
}

fn cmd_simulate(sim: SimConfig, tables: usize, hands: usize, seed: u64) {
    let outcomes = match simulate(&sim, tables, hands, seed) {
        Ok(o) => o,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };
    println!();
    println!(
        "  {} {} players, {} seats, skip {:.0}%{}",
        "Simulation:".bold(),
        sim.players,
        sim.seat_count,
        sim.skip * 100.0,
        if sim.straddle { ", straddle" } else { "" }
    );
    println!("{}", simulation_table(&outcomes));
    println!();
}

fn parse_seat_list(text: &str) -> Option<Vec<usize>> {
    text.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}

fn cmd_seats(button: usize, occupied: Option<String>, size: usize) {
    let mut valid = vec![occupied.is_none(); size];
    if let Some(text) = occupied {
        let Some(list) = parse_seat_list(&text) else {
            print_error(&format!("Invalid seat list: {}", text));
            return;
        };
        for seat in list {
            if seat >= size {
                print_error(&format!("Seat {} does not exist at a {}-seat table", seat, size));
                return;
            }
            valid[seat] = true;
        }
    }
    match PositionMap::build(&valid, button) {
        Ok(map) => {
            println!();
            println!("  {} seat {}", "Button:".bold(), button);
            println!("{}", seat_map_table(&map));
            println!();
        }
        Err(e) => print_error(&e.to_string()),
    }
}

fn cmd_sites(config: &TrackerConfig) {
    println!();
    println!("  {} {:.4} bb", "Tolerance:".bold(), config.tolerance);
    for site in &config.sites {
        println!(
            "  {:<20} {:>2} seats  title contains \"{}\"",
            site.name.bold(),
            site.seats,
            site.table_title
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seat_list() {
        assert_eq!(parse_seat_list("0, 2,5"), Some(vec![0, 2, 5]));
        assert_eq!(parse_seat_list("0,x"), None);
        assert_eq!(parse_seat_list(""), Some(vec![]));
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from(["tracker", "simulate", "-n", "3", "--skip", "0.2"]).unwrap();
        match cli.command {
            Commands::Simulate { hands, skip, .. } => {
                assert_eq!(hands, 3);
                assert!((skip - 0.2).abs() < 1e-12);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["tracker", "seats", "-b", "2", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
