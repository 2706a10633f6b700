// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every setting can also come from the environment (clap's `env` feature),
// which is how the server is usually configured:
//
//   GITHUB_TOKEN, REPO_SCOUT_API_URL, REPO_SCOUT_TIMEOUT_SECS,
//   REPO_SCOUT_OUTPUT_DIR, REPO_SCOUT_LOG, REPO_SCOUT_USER
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use repo_scout::analysis::DEFAULT_DEPTH;
use repo_scout::github::{ClientConfig, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[command(
    name = "repo-scout",
    version,
    about = "Crawl a GitHub repository into a filtered file tree",
    long_about = "repo-scout walks a repository through the GitHub contents API, skipping build \
                  output, dependencies and lockfiles, and stores the resulting file tree as JSON. \
                  Runs once from the command line or as an HTTP service with progress and cancel endpoints."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the GitHub REST API (set this for GitHub Enterprise)
    #[arg(long, global = true, env = "REPO_SCOUT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Token for authenticated requests (higher rate limits)
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Per-request timeout for directory listings, in seconds
    #[arg(long, global = true, env = "REPO_SCOUT_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Directory where finished trees are written
    #[arg(long, global = true, env = "REPO_SCOUT_OUTPUT_DIR", default_value = "./trees")]
    pub output_dir: PathBuf,

    /// Extra name pattern to skip, on top of the built-in ones (repeatable)
    ///
    /// Example: --skip fixtures --skip '*.snap'
    #[arg(long = "skip", global = true, value_name = "PATTERN")]
    pub skip: Vec<String>,

    /// Log filter, e.g. "info" or "repo_scout=debug"
    #[arg(long, global = true, env = "REPO_SCOUT_LOG", default_value = "info")]
    pub log_level: String,
}

impl GlobalArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            token: self.github_token.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one repository and save its file tree
    ///
    /// Example: repo-scout analyze https://github.com/rust-lang/log --max-depth 3
    Analyze {
        /// Repository address (e.g., https://github.com/user/repo or user/repo)
        repo_url: String,

        /// How many directory levels to list (clamped to 1..=20)
        ///
        /// Depth 1 = only the root listing; its subdirectories are shown
        /// as truncated. Depth 2 = root + one level of subdirectories, etc.
        #[arg(long, default_value_t = DEFAULT_DEPTH as i64, allow_negative_numbers = true)]
        max_depth: i64,

        /// Print the outcome as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Caller identity used for the session
        #[arg(long, env = "REPO_SCOUT_USER", default_value = "local")]
        user: String,
    },

    /// Run the HTTP service (POST /analyze, POST /cancel, GET /progress)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}
