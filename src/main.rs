//! CLI entry point for mash

use std::path::PathBuf;
use std::process;

use clap::Parser;
use mash::{analyze, load_config};

#[derive(Parser, Debug)]
#[command(name = "mash")]
#[command(about = "Squash repositories into digestible summaries")]
#[command(version)]
struct Args {
    /// Directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Include files regardless of gitignore rules and size limits
    #[arg(long = "force-cat")]
    force_cat: bool,

    /// Print selected file paths instead of the tree view
    #[arg(short = 'l', long = "list")]
    list: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.path.is_dir() {
        eprintln!("mash: {} is not a directory", args.path.display());
        process::exit(1);
    }

    let config = match load_config(&args.path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("mash: {}", err);
            process::exit(1);
        }
    };

    let info = match analyze(&args.path, &config, args.force_cat) {
        Ok(info) => info,
        Err(err) => {
            eprintln!("mash: {}", err);
            process::exit(1);
        }
    };

    if args.list {
        for record in &info.files {
            println!("{}", record.relative_path.display());
        }
    } else {
        print!("{}", info.tree_representation());
    }

    println!();
    println!(
        "{} files, {} python, {:.2} MB",
        info.total_file_count, info.python_file_count, info.total_size_mb
    );
}
