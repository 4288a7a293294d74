use clap::{Parser, Subcommand};

use canon_cli::{run_paths, run_relock, run_validate, PathsArgs, RelockArgs, ValidateArgs};

#[derive(Parser, Debug)]
#[command(name = "canon", about = "Validate and query a canon content tree", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full validation pipeline and report every issue
    Validate(ValidateArgs),
    /// Re-pin tier-1 record hashes after an intentional edit
    Relock(RelockArgs),
    /// List every routable (category, identifier) pair
    Paths(PathsArgs),
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(args),
        Commands::Relock(args) => run_relock(args),
        Commands::Paths(args) => run_paths(args),
    };
    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
