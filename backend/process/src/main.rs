use std::path::PathBuf;

use clap::Parser;
use pantry::Store;
use tracing_subscriber::{EnvFilter, fmt};

/// Clean a recipe dataset and load it into the recipe store.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON document of recipes, keyed by id or as an array
    dataset: PathBuf,

    #[arg(long, env = "DATABASE_PATH", default_value = "recipes.db")]
    database: PathBuf,

    /// Replace previously loaded recipes with this dataset, in one transaction
    #[arg(long)]
    reset: bool,
}

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let store = Store::open(&args.database)?;
    println!("Store: {}", store.path().display());

    let inserted = process::load_recipes(&args.dataset, &store, args.reset)?;

    println!("Loaded recipes: {inserted}");
    println!("Recipe verification: {}", store.count()?);

    Ok(())
}
