//! worsen CLI
//!
//! One-shot commands against a store directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};
use worsen::{Config, Store};

/// worsen CLI
#[derive(Parser, Debug)]
#[command(name = "worsen-cli")]
#[command(about = "CLI for the worsen file-backed key-value store")]
#[command(version)]
struct Args {
    /// Store directory
    #[arg(short, long, default_value = "./db_dir")]
    dir: PathBuf,

    /// Store name
    #[arg(short, long, default_value = worsen::config::DEFAULT_STORE_NAME)]
    name: String,

    /// Emit store debug diagnostics
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by uid
    Get {
        /// The uid to get
        uid: String,
    },

    /// Set a value (parsed as JSON, stored as a string otherwise)
    Set {
        /// The uid to set
        uid: String,

        /// The value to set
        value: String,
    },

    /// Print every entry
    List,

    /// Print every uid
    Keys,

    /// Show lock state
    Status,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,worsen=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> worsen::Result<()> {
    let mut builder = Config::builder().name(&args.name).data_dir(&args.dir);
    if args.debug {
        builder = builder.debug(true);
    }
    let store: Store<Value> = Store::open(builder.build())?;

    let needs_snapshot = !matches!(args.command, Commands::Set { .. } | Commands::Status);
    if needs_snapshot && !store.primary_path().exists() {
        return Err(worsen::StoreError::Config(format!(
            "Store does not exist: {}",
            store.primary_path().display()
        )));
    }

    if !matches!(args.command, Commands::Status) {
        store.init(None, None)?;
    }

    match args.command {
        Commands::Get { uid } => match store.read(&uid) {
            Some(value) => println!("{}", value),
            None => println!("(not found)"),
        },
        Commands::Set { uid, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let uid = store.write(Some(uid.as_str()), value)?;
            println!("OK {}", uid);
        }
        Commands::List => {
            for (uid, value) in store.snapshot().data {
                println!("{}\t{}", uid, value);
            }
        }
        Commands::Keys => {
            for uid in store.snapshot().data.keys() {
                println!("{}", uid);
            }
        }
        Commands::Status => {
            println!("worsen {}", worsen::VERSION);
            println!("lock: {}", store.lock_path().display());
            match store.lock_holder() {
                Some(holder) => println!(
                    "held by {} (operation {}, pid {})",
                    holder.owner_name, holder.operation_id, holder.process_id
                ),
                None if store.can_execute() => println!("free"),
                None => println!("held (unreadable record)"),
            }
        }
    }

    store.shutdown();
    Ok(())
}
