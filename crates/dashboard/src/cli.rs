use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cyberguard",
    version,
    about = "Cybercrime withdrawal-risk dashboard with an SIH 2025 consultant"
)]
pub(crate) struct Args {
    /// Optional TOML config; built-in defaults apply when omitted.
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    /// Overrides the model identifier from the config file.
    #[arg(long)]
    pub(crate) model: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Forecast withdrawal risk for one location and print it as JSON.
    Predict {
        #[arg(long)]
        location: String,
        #[arg(long)]
        time: String,
        #[arg(long)]
        density: String,
    },
    /// Line-oriented consultant session on stdin/stdout.
    Chat,
}
