use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process;
use tokio::time::Duration;

use tgscout::logging;
use tgscout::scrape::{self, ChannelFetcher, ChannelStatus, CHANNEL_URL_BASE, PREVIEW_CHARS};

#[derive(Parser, Debug)]
#[command(author, version, about = "Probe a single channel page and show what was found", long_about = None)]
struct Args {
    /// Channel username, with or without a leading @
    username: String,

    /// Seconds to wait for the page
    #[arg(short = 't', long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// Page root the username is appended to
    #[arg(long, env = "CHANNEL_URL_BASE", default_value = CHANNEL_URL_BASE)]
    base_url: String,

    /// How many posts to list
    #[arg(short = 'n', long, default_value_t = 5)]
    limit: usize,

    /// Print the raw result as JSON instead of a report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let args = Args::parse();

    let username = args.username.trim().trim_start_matches('@');
    let fetcher = ChannelFetcher::with_base_url(&args.base_url, Duration::from_secs(args.timeout))?;
    let result = scrape::test_channel(&fetcher, username).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("\n{}", "═".repeat(100).bright_blue());
        println!(
            "{}  {}",
            "CHANNEL DIAGNOSTICS".bright_blue(),
            result.url.bright_yellow()
        );
        println!("{}", "═".repeat(100).bright_blue());

        let status_str = format!("{:?}", result.status);
        let colored_status = match result.status {
            ChannelStatus::Success => status_str.bright_green(),
            ChannelStatus::RequestFailed => status_str.bright_red(),
            _ => status_str.bright_yellow(),
        };
        println!("{}: {}", "Status".bright_blue(), colored_status);

        match result.http_status {
            Some(code) => println!("{}: {}", "HTTP Status".bright_blue(), code),
            None => println!("{}: {}", "HTTP Status".bright_blue(), "None".dimmed()),
        }
        println!(
            "{}: {}",
            "Message Containers".bright_blue(),
            result.containers_found
        );
        println!("{}: {}", "Posts With Text".bright_blue(), result.posts.len());
        println!("{}: {} ms", "Elapsed".bright_blue(), result.elapsed_ms);

        if !result.errors.is_empty() {
            println!("\n{}", "Errors".bright_red());
            println!("{}", "─".repeat(80).dimmed());
            for (i, error) in result.errors.iter().enumerate() {
                println!("{}. {}", i + 1, error.bright_red());
            }
        }

        if !result.posts.is_empty() {
            println!("\n{}", "Posts".bright_green());
            println!("{}", "─".repeat(80).dimmed());
            for (i, post) in result.posts.iter().take(args.limit).enumerate() {
                println!("{}. {}", i + 1, scrape::preview(post, PREVIEW_CHARS).bright_white());
            }
            if result.posts.len() > args.limit {
                println!("... and {} more posts", result.posts.len() - args.limit);
            }
        }

        println!("\n{}", "═".repeat(100).bright_blue());
    }

    match result.status {
        ChannelStatus::Success => Ok(()),
        _ => process::exit(1),
    }
}
