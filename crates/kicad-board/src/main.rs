use clap::{Parser, Subcommand};
use kicad_board::plan::BoardPlan;
use kicad_board::{
    project, summarize, Board, BoardError, FootprintLibrary, SequentialStamps, StampGenerator,
    UuidStamps,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kicad-board", about = "Compose KiCad boards from footprint templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write an empty seed project
    New {
        /// Project directory
        dir: PathBuf,

        /// Project name (file stem of .kicad_pcb / .kicad_pro)
        #[arg(short, long)]
        name: String,

        /// Directory holding <library>.pretty footprint libraries
        #[arg(short, long, default_value = ".")]
        library_root: PathBuf,
    },

    /// Build a project from a JSON plan
    Build {
        /// Plan file (thickness, nets, footprints, outline)
        plan: PathBuf,

        /// Project directory
        dir: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: String,

        /// Directory holding <library>.pretty footprint libraries
        #[arg(short, long, default_value = ".")]
        library_root: PathBuf,

        /// Use counter-based stamps instead of random UUIDs
        #[arg(long)]
        deterministic_stamps: bool,
    },

    /// Print a JSON summary of a .kicad_pcb file
    Info {
        /// Input board file
        input: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn build(
    plan: &Path,
    dir: &Path,
    name: &str,
    library_root: &Path,
    deterministic: bool,
) -> Result<(), BoardError> {
    let plan = BoardPlan::from_file(plan)?;
    let library = FootprintLibrary::new(library_root);
    let mut stamps: Box<dyn StampGenerator> = if deterministic {
        Box::new(SequentialStamps::new())
    } else {
        Box::new(UuidStamps)
    };
    let board = plan.apply(&Board::seed()?, &library, stamps.as_mut())?;
    let saved = project::save(&board, dir, name, &library)?;
    eprintln!("Written to {}", saved.board.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), BoardError> {
    match cli.command {
        Command::New {
            dir,
            name,
            library_root,
        } => {
            let library = FootprintLibrary::new(library_root);
            let saved = project::save(&Board::seed()?, &dir, &name, &library)?;
            eprintln!("Written to {}", saved.board.display());
        }
        Command::Build {
            plan,
            dir,
            name,
            library_root,
            deterministic_stamps,
        } => build(&plan, &dir, &name, &library_root, deterministic_stamps)?,
        Command::Info { input, pretty } => {
            let summary = summarize(&project::load(&input)?);
            let json = if pretty {
                serde_json::to_string_pretty(&summary)?
            } else {
                serde_json::to_string(&summary)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
