use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Duration;

use tgscout::bot::{self, AssetStore, BotApi, BotState};
use tgscout::logging;
use tgscout::scrape::{ChannelFetcher, CHANNEL_URL_BASE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Receive bot updates over a webhook and serve static assets", long_about = None)]
struct Args {
    /// Bot API token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Secret path segment (and header value) the platform must present
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    secret: String,

    /// Address to listen on
    #[arg(short = 'b', long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Directory holding the static text and image assets
    #[arg(short = 'a', long, env = "ASSETS_DIR", default_value = "assets")]
    assets_dir: PathBuf,

    /// Externally reachable root of this server, used to link assets
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,

    /// Seconds to wait for one channel page
    #[arg(short = 't', long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let args = Args::parse();
    bot::validate_secret(&args.secret)?;

    let state = Arc::new(BotState {
        api: BotApi::new(args.token),
        fetcher: ChannelFetcher::with_base_url(CHANNEL_URL_BASE, Duration::from_secs(args.timeout))?,
        assets: AssetStore::new(args.assets_dir),
        secret: args.secret,
        public_url: args.public_url,
    });

    bot::serve(state, &args.bind).await
}
