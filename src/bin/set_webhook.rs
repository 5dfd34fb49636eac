use anyhow::{bail, Result};
use clap::Parser;

use tgscout::bot::{public_link, validate_secret, BotApi};
use tgscout::logging;

#[derive(Parser, Debug)]
#[command(author, version, about = "Register (or remove) the bot webhook", long_about = None)]
struct Args {
    /// Bot API token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: String,

    /// Secret path segment (and header value) the platform will present
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Externally reachable root of the webhook server
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<String>,

    /// Remove the webhook instead of registering it
    #[arg(long)]
    delete: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::configure_logging();
    let args = Args::parse();
    let api = BotApi::new(args.token);

    if args.delete {
        api.delete_webhook().await?;
        println!("Webhook removed");
        return Ok(());
    }

    let (Some(public_url), Some(secret)) = (args.public_url, args.secret) else {
        bail!("--public-url and --secret are required to register a webhook");
    };

    validate_secret(&secret)?;
    let url = public_link(&public_url, &format!("webhook/{}", secret))?;
    api.set_webhook(&url, Some(&secret)).await?;
    println!("Webhook registered");

    Ok(())
}
