use std::{fs, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{OptionExt, eyre};
use cube_stats::{AlgCountsData, MethodDescription, expected_alg_counts};
use cube_stats_core::{
    permutation::{BigScrambleGroup, PiecePermutationDescription},
    piece::PieceDescription,
};
use itertools::Itertools;
use log::LevelFilter;
use owo_colors::OwoColorize;

/// Computes the expected number of algs of blindfolded solving methods
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the expected alg counts of a method
    Expected {
        /// The method description in TOML format. Uses the default method if
        /// absent.
        #[arg(long, short = 'm', value_name = "METHOD")]
        method: Option<PathBuf>,
        /// Print the counts as TOML instead of a table
        #[arg(long)]
        toml: bool,
    },
    /// Enumerate the scramble groups of a piece type
    Groups {
        /// Either `corners` or `edges`
        #[arg(long)]
        piece_type: String,
        /// Count odd permutations as well, as for the piece type solved last
        #[arg(long)]
        allow_odd_permutations: bool,
    },
    /// Print the default method description in TOML format
    DefaultMethod,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    match cli.command {
        Commands::Expected { method, toml } => {
            let method = match method {
                Some(path) => MethodDescription::from_toml(&fs::read_to_string(path)?)?,
                None => MethodDescription::default(),
            };
            let data = expected_alg_counts(&method)?;
            if toml {
                print!("{}", data.to_toml()?);
            } else {
                print_alg_counts(&data);
            }
        }
        Commands::Groups {
            piece_type,
            allow_odd_permutations,
        } => {
            let piece_description = PieceDescription::standard(&piece_type)
                .ok_or_eyre("The piece type must be `corners` or `edges`")?;
            let description =
                PiecePermutationDescription::new(piece_description, allow_odd_permutations);
            let groups = description.groups()?;
            let count = description.count()?;
            let covered: u128 = groups.iter().map(BigScrambleGroup::count).sum();
            let num_shapes = groups
                .iter()
                .map(BigScrambleGroup::sorted_cycle_lengths)
                .unique()
                .count();

            println!(
                "{} scramble groups with {} cycle shapes cover {} scrambles",
                groups.len(),
                num_shapes,
                covered
            );
            if covered != count {
                return Err(eyre!("Expected the groups to cover {count} scrambles"));
            }
            println!("{}", "The groups cover every scramble".green());
        }
        Commands::DefaultMethod => {
            print!("{}", MethodDescription::default().to_toml()?);
        }
    }

    Ok(())
}

fn print_alg_counts(data: &AlgCountsData) {
    const HEADERS: [&str; 8] = [
        "pieces",
        "3-cycles",
        "5-cycles",
        "double swaps",
        "parities",
        "parity twists",
        "twists",
        "total",
    ];

    println!("{}", HEADERS.iter().map(|h| format!("{h:>13}")).join(" ").bold());
    for row in &data.rows {
        let counts = &row.alg_counts;
        let values = [
            counts.cycles_of_length(3),
            counts.cycles_of_length(5),
            counts.double_swaps(),
            counts.parities(),
            counts.parity_twists(),
            counts.total_twists(),
            counts.total(),
        ];
        println!(
            "{:>13} {}",
            row.plural_name,
            values.iter().map(|v| format!("{v:>13.4}")).join(" ")
        );
    }
    // Line the sum up with the totals
    let padding = " ".repeat(14 * (HEADERS.len() - 2));
    println!("{:>13} {padding}{:>13.4}", "sum".bold(), data.total().green());
}
