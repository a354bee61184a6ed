//! Command-line arguments.

use std::path::PathBuf;

use agentdesk_core::ResourceKind;
use agentdesk_query::SortKey;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "agentdesk", version, about = "Search, filter and export travel-agent records")]
pub struct Cli {
    /// Config file (default: <config dir>/agentdesk/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding <resource>.json files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Signed-in agent
    #[arg(long, env = "AGENTDESK_AGENT_ID")]
    pub agent_id: Option<String>,

    /// Session token
    #[arg(long, env = "AGENTDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the filtered, sorted records of a resource
    List(ViewArgs),

    /// Write <resource>-report.csv for the filtered, sorted records
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output directory (default: [export] dir from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Validate and submit a new booking
    AddBooking(BookingArgs),
}

/// Query Spec for one resource.
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// bookings, vouchers or forex-orders
    pub resource: ResourceKind,

    /// Case-insensitive text matched against searchable columns
    #[arg(long)]
    pub search: Option<String>,

    /// Earliest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Sort column, optionally with :asc or :desc
    #[arg(long)]
    pub sort: Option<SortKey>,
}

/// Fields of the add-booking form. Validation happens after parsing so the
/// messages match the form's.
#[derive(Args, Debug, Clone)]
pub struct BookingArgs {
    #[arg(long, default_value = "")]
    pub client_name: String,

    #[arg(long, default_value = "")]
    pub destination: String,

    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub start: String,

    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub end: String,

    #[arg(long, default_value = "")]
    pub amount: String,
}
