//! Command line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const DEFAULT_WEBHOOK_URL: &str = "http://127.0.0.1:8000/webhook";

#[derive(Parser)]
#[command(name = "sarthi", about = "Agri-Sarthi WhatsApp advisory backend", version)]
pub struct Cli {
    /// Data directory holding the knowledge DB, vector index and models.
    #[arg(long, env = "SARTHI_DATA_DIR", default_value = "data", global = true)]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the webhook server.
    Serve,

    /// Seed the knowledge database with the curated advisory rows.
    Etl,

    /// Rebuild the vector index from the knowledge database.
    Index,

    /// Send a text question to a running server.
    Text {
        /// User message in Hindi or English.
        #[arg(long)]
        message: String,

        /// WhatsApp sender number.
        #[arg(long, default_value = "+910000000000")]
        from_number: String,

        /// User location.
        #[arg(long, default_value = "Jaipur, Rajasthan")]
        location: String,

        /// Webhook URL.
        #[arg(long, env = "WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
        url: String,
    },

    /// Send an audio file to a running server.
    Audio {
        /// Path to the audio file (e.g. OGG or MP3).
        #[arg(long)]
        file: PathBuf,

        /// WhatsApp sender number.
        #[arg(long, default_value = "+910000000000")]
        from_number: String,

        /// User location.
        #[arg(long, default_value = "Jaipur, Rajasthan")]
        location: String,

        /// Webhook URL.
        #[arg(long, env = "WEBHOOK_URL", default_value = DEFAULT_WEBHOOK_URL)]
        url: String,
    },
}
