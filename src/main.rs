// src/main.rs
// =============================================================================
// Entry point of the repo-scout binary.
//
// What happens here:
// 1. Parse command-line arguments (and their environment fallbacks)
// 2. Set up logging
// 3. Build the Analyzer: GitHub client + skip filter + JSON store
// 4. Either run one analysis (`analyze`) or the HTTP service (`serve`)
//
// Exit codes for `analyze`: 0 = tree saved, 130 = cancelled, 2 = failed.
// =============================================================================

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use cli::{Cli, Commands, GlobalArgs};
use repo_scout::analysis::{self, AnalysisOutcome, Analyzer};
use repo_scout::crawl::{FileTreeNode, SkipFilter};
use repo_scout::github::GithubClient;
use repo_scout::server;
use repo_scout::session::CallerId;
use repo_scout::store::{JsonFileStore, StoredRecord};

const EXIT_CANCELLED: i32 = 130;
const EXIT_FAILED: i32 = 2;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILED
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_logging(&cli.global.log_level);

    let analyzer = Arc::new(build_analyzer(&cli.global)?);

    match cli.command {
        Commands::Analyze { repo_url, max_depth, json, user } => {
            handle_analyze(analyzer, &repo_url, max_depth, json, CallerId::new(user)).await
        }
        Commands::Serve { bind } => {
            server::serve(analyzer, &bind).await?;
            Ok(0)
        }
    }
}

fn build_analyzer(global: &GlobalArgs) -> Result<Analyzer> {
    let client = GithubClient::new(global.client_config()).context("invalid GitHub client settings")?;
    let filter = SkipFilter::new(global.skip.as_slice()).context("invalid --skip pattern")?;
    let store = JsonFileStore::new(&global.output_dir);
    Ok(Analyzer::new(Arc::new(client), Arc::new(store), filter))
}

// Runs one analysis in the foreground.
//
// Ctrl+C goes through request_cancel, the same path an HTTP client's cancel
// takes, and a ticker prints query_progress while the crawl runs.
async fn handle_analyze(
    analyzer: Arc<Analyzer>,
    repo_url: &str,
    max_depth: i64,
    json: bool,
    caller: CallerId,
) -> Result<i32> {
    println!("🔍 Analyzing repository: {}", repo_url);
    println!("📊 Max depth: {}", analysis::clamp_depth(max_depth));

    let ctrl_c = tokio::spawn({
        let analyzer = Arc::clone(&analyzer);
        let caller = caller.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n⏹️  Cancelling...");
                analyzer.request_cancel(&caller);
            }
        }
    });

    let ticker = tokio::spawn({
        let analyzer = Arc::clone(&analyzer);
        let caller = caller.clone();
        async move {
            let mut interval = tokio::time::interval(Duration::from_millis(500));
            loop {
                interval.tick().await;
                if let Some(snapshot) = analyzer.query_progress(&caller).session {
                    eprint!(
                        "\r   {:>3}%  depth {}  {:<50}",
                        snapshot.progress_percent,
                        snapshot.current_depth,
                        truncate_path(&snapshot.current_path, 50)
                    );
                }
            }
        }
    });

    let outcome = analyzer.start_analysis(&caller, repo_url, max_depth).await;
    ticker.abort();
    ctrl_c.abort();
    eprintln!();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }

    let code = match &outcome {
        AnalysisOutcome::Completed { record, tree } => {
            if !json {
                print_summary(record, tree);
            }
            0
        }
        AnalysisOutcome::Cancelled => {
            if !json {
                println!("⏹️  Analysis cancelled; nothing was saved");
            }
            EXIT_CANCELLED
        }
        AnalysisOutcome::Failed { reason } => {
            if !json {
                println!("❌ Analysis failed: {}", reason);
            }
            EXIT_FAILED
        }
    };
    Ok(code)
}

fn print_summary(record: &StoredRecord, tree: &FileTreeNode) {
    println!("✅ Analysis complete\n");

    println!("{:<40} {:<12} {:>12}", "TOP-LEVEL ENTRY", "KIND", "SIZE");
    println!("{}", "=".repeat(66));
    for child in tree.children() {
        let kind = if child.truncated {
            "dir (trunc)"
        } else if child.is_dir() {
            "dir"
        } else {
            "file"
        };
        let size = child.size.map(|s| s.to_string()).unwrap_or_default();
        println!("{:<40} {:<12} {:>12}", truncate_path(&child.name, 40), kind, size);
    }
    println!();

    let stats = &record.stats;
    println!("📊 Summary:");
    println!("   📄 Files: {}", stats.files);
    println!("   📁 Directories: {}", stats.directories);
    println!("   ✂️  Truncated at depth limit: {}", stats.truncated_directories);
    println!("   💾 Total size: {} bytes", stats.total_bytes);
    println!("   🗂️  Saved to: {}", record.location);
}

// Shortens long names for table display, keeping the end
fn truncate_path(path: &str, width: usize) -> String {
    let count = path.chars().count();
    if count <= width {
        return path.to_string();
    }
    let tail: String = path.chars().skip(count - (width - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("src/lib.rs", 20), "src/lib.rs");
        assert_eq!(truncate_path("a/very/long/path/to/file.rs", 12), "...o/file.rs");
        assert_eq!(truncate_path("a/very/long/path/to/file.rs", 12).chars().count(), 12);
    }

    #[test]
    fn test_build_analyzer_rejects_bad_skip_pattern() {
        let cli = Cli::try_parse_from(["repo-scout", "--skip", "[oops", "serve"]).unwrap();
        assert!(build_analyzer(&cli.global).is_err());
    }
}
