use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(
    name = "snapid",
    version,
    about = "Upload an album and search it by face with the SnapID service"
)]
pub struct Cli {
    /// JSON or YAML client config.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service API base URL, e.g. http://localhost:5000/api.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// The session cookie only lives for one process, so protected commands
/// sign in first.
#[derive(Debug, Clone, Args)]
pub struct SignIn {
    #[arg(long, env = "SNAPID_USERNAME")]
    pub username: String,

    #[arg(long, env = "SNAPID_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reports whether the service sees an active session.
    Session,
    Login {
        #[command(flatten)]
        auth: SignIn,
    },
    Register {
        #[command(flatten)]
        auth: SignIn,
    },
    /// Adds photos to the album in one request.
    Upload {
        #[command(flatten)]
        auth: SignIn,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Finds album photos matching the face in a probe photo.
    Search {
        #[command(flatten)]
        auth: SignIn,
        file: PathBuf,
        /// Save every matched original as `original_<name>` here.
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
    UpdateCache {
        #[command(flatten)]
        auth: SignIn,
    },
    Stats {
        #[command(flatten)]
        auth: SignIn,
    },
    Delete {
        #[command(flatten)]
        auth: SignIn,
        filename: String,
    },
    Logout {
        #[command(flatten)]
        auth: SignIn,
    },
    Health,
    /// Prints the effective config, or writes it to a file.
    Config {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Opens the desktop window.
    Gui,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub logged_in: bool,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MatchInfo {
    pub rank: usize,
    pub filename: String,
    pub similarity: f64,
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct SearchInfo {
    pub match_found: bool,
    pub message: Option<String>,
    pub matches: Vec<MatchInfo>,
}
