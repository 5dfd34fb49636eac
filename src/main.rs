use anyhow::{bail, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tokio::time::Duration;
use tracing::info;

use tgscout::channels::{channels_from_list, load_channels, ChannelDescriptor};
use tgscout::environment::get_env_var_as_vec;
use tgscout::logging;
use tgscout::scrape::{run_all, ChannelFetcher, ScanOptions, CHANNEL_URL_BASE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Preview the latest posts of public channels", long_about = None)]
struct Args {
    /// JSON file with the channels to scan, e.g. [{"username": "durov"}]
    #[arg(short = 'c', long, env = "CHANNELS_FILE", default_value = "channels.json")]
    channels_file: PathBuf,

    /// Seconds to wait for one channel page
    #[arg(short = 't', long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,

    /// Seconds to pause between channels
    #[arg(short = 'd', long, env = "CHANNEL_DELAY_SECS", default_value_t = 1)]
    delay: u64,

    /// Page root the channel username is appended to
    #[arg(long, env = "CHANNEL_URL_BASE", default_value = CHANNEL_URL_BASE)]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let args = Args::parse();

    let channels = configured_channels(&args)?;
    info!("Scanning {} channels", channels.len());

    let fetcher = ChannelFetcher::with_base_url(args.base_url, Duration::from_secs(args.timeout))?;
    let options = ScanOptions {
        delay: Duration::from_secs(args.delay),
        ..ScanOptions::default()
    };

    let mut stdout = io::stdout().lock();
    run_all(&fetcher, &channels, &options, &mut stdout).await?;

    Ok(())
}

// The file wins; CHANNELS=a,b,c is the fallback when there is no file
fn configured_channels(args: &Args) -> Result<Vec<ChannelDescriptor>> {
    if args.channels_file.exists() {
        return load_channels(&args.channels_file);
    }

    let channels = channels_from_list(get_env_var_as_vec("CHANNELS", ','));
    if channels.is_empty() {
        bail!(
            "No channels configured: {} does not exist and CHANNELS is empty",
            args.channels_file.display()
        );
    }
    Ok(channels)
}
