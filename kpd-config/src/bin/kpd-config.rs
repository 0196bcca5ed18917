use std::{io, path::PathBuf, process};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use kpd_config::{
    describe,
    image::{init_image, load_image, FileEeprom},
    list_keycodes,
    session::{run_session, SessionEnd},
};
use kpd_firmware::board::{BoardProfile, BOARDS};

/// Configure KPD keypads
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List special key names usable as `:index` when remapping
    KeycodesList(ListKeycodesArgs),
    /// Write a settings image holding the board defaults
    Init(ImageArgs),
    /// Show the settings stored in an image
    Show(ImageArgs),
    /// Run the keypad's configuration menu on stdin/stdout against an image
    Session(ImageArgs),
}

#[derive(Args)]
struct ListKeycodesArgs {
    /// Include the output code and what it sends
    #[clap(long, short)]
    verbose: bool,

    /// Only list key names containing pattern (case insensitive); `:N` selects index N
    #[clap()]
    pattern: Option<String>,
}

#[derive(Args)]
struct ImageArgs {
    /// settings image file
    image: PathBuf,

    /// board profile name
    #[clap(long, short, default_value = "four-key")]
    board: String,
}

impl ImageArgs {
    fn board(&self) -> Result<&'static BoardProfile> {
        BoardProfile::by_name(&self.board).ok_or_else(|| {
            let names = BOARDS.iter().map(|b| b.name).collect::<Vec<_>>();
            anyhow!(
                "Unknown board \"{}\"; expected one of: {}",
                self.board,
                names.join(", ")
            )
        })
    }
}

fn keycodes_list(args: &ListKeycodesArgs) -> Result<()> {
    for line in list_keycodes(args.pattern.as_deref(), args.verbose) {
        println!("{line}");
    }
    Ok(())
}

fn init(args: &ImageArgs) -> Result<()> {
    let board = args.board()?;
    let config = init_image(&args.image, board)?;
    log::info!("created {}", args.image.display());
    print!("{}", describe(board, &config));
    Ok(())
}

fn show(args: &ImageArgs) -> Result<()> {
    let board = args.board()?;
    let config = load_image(&args.image, board)?;
    print!("{}", describe(board, &config));
    Ok(())
}

fn session(args: &ImageArgs) -> Result<()> {
    let board = args.board()?;
    let storage = FileEeprom::open(&args.image)
        .with_context(|| format!("Failed to read {}", args.image.display()))?;
    match run_session(board, storage, io::stdin(), io::stdout()) {
        SessionEnd::Exited | SessionEnd::InputClosed => Ok(()),
        SessionEnd::Abandoned => Err(anyhow!("Input ended inside the menu; nothing saved")),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(message) = result {
        eprintln!("{message}");
        process::exit(1);
    };
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::KeycodesList(args) => keycodes_list(args),
        Commands::Init(args) => init(args),
        Commands::Show(args) => show(args),
        Commands::Session(args) => session(args),
    }
}
