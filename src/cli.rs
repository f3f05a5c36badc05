use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::recommendation_merger::RecId;

#[derive(Parser, Debug)]
#[command(author, version, about = "Kitchen equipment maintenance and recommendation reconciliation", long_about = None)]
pub struct Cli {
    /// Directory holding equipment.json and grocery_lists.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path of the JSON cache file
    #[arg(long, global = true)]
    pub cache_file: Option<PathBuf>,

    /// User whose equipment and lists are used
    #[arg(long, global = true)]
    pub user_id: Option<i64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inspect or edit the equipment registry
    #[command(subcommand)]
    Equipment(EquipmentCommand),
    /// Show the maintenance schedule
    Schedule {
        /// Ask the advisor for a new schedule instead of showing the cached one
        #[arg(long)]
        refresh: bool,
    },
    /// Show equipment recommendations
    Recommend {
        #[arg(long)]
        refresh: bool,
        /// Budget in USD passed to the advisor
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Hide a recommendation from now on
    Dismiss {
        #[arg(allow_negative_numbers = true)]
        id: RecId,
    },
    /// Put a recommendation on the shopping list
    AddToList {
        #[arg(allow_negative_numbers = true)]
        id: RecId,
    },
}

#[derive(Subcommand, Debug)]
pub enum EquipmentCommand {
    List,
    Add(AddEquipmentArgs),
    Remove { id: i64 },
    /// Equipment whose service interval has elapsed
    Due,
}

#[derive(Args, Debug)]
pub struct AddEquipmentArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub category: String,
    /// Days between services
    #[arg(long)]
    pub interval: Option<u32>,
    /// Date of the last service (YYYY-MM-DD)
    #[arg(long)]
    pub last_maintained: Option<chrono::NaiveDate>,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
