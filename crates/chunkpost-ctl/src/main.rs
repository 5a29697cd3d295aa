//! chunkpost-ctl: command-line client for the chunkpost endpoint.

mod cmd;

use std::path::Path;

use anyhow::{Context, Result};

use cmd::http::DEFAULT_URL;
use cmd::mode::Mode;
use cmd::upload::UploadOptions;

fn print_usage() {
    println!("Usage: chunkpost-ctl [--url <url>] <command>");
    println!();
    println!("Commands:");
    println!("  upload <file> [remote-path]   Upload a file in checksummed chunks");
    println!("  mode upload|default           Switch the server mode file");
    println!();
    println!("Options:");
    println!("  --url <url>          Endpoint URL (default: {})", DEFAULT_URL);
    println!("  --chunk-size <n>     Bytes per chunk (default: {})", cmd::upload::DEFAULT_CHUNK_SIZE);
    println!("  --max-try <n>        Retries per chunk (default: {})", cmd::upload::DEFAULT_MAX_TRY);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut url = DEFAULT_URL.to_string();
    let mut options = UploadOptions::default();
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--url" => {
                i += 1;
                url = args.get(i).context("--url requires a value")?.clone();
            }
            "--chunk-size" => {
                i += 1;
                options.chunk_size = args.get(i)
                    .context("--chunk-size requires a value")?
                    .parse()
                    .context("--chunk-size must be a number")?;
                anyhow::ensure!(options.chunk_size > 0, "--chunk-size must be positive");
            }
            "--max-try" => {
                i += 1;
                options.max_try = args.get(i)
                    .context("--max-try requires a value")?
                    .parse()
                    .context("--max-try must be a number")?;
            }
            other => remaining.push(other),
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["upload", local]            => cmd::upload::cmd_upload(&url, Path::new(local), None, &options).await,
        ["upload", local, remote]    => {
            cmd::upload::cmd_upload(&url, Path::new(local), Some(Path::new(remote)), &options).await
        }
        ["mode", mode]               => cmd::mode::cmd_mode(&url, Mode::parse(mode)?).await,
        ["help"] | ["--help"] | ["-h"] | [] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
