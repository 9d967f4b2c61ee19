use aftership_node::core::constants::SIGNATURE_HEADER;
use aftership_node::core::trigger::{
    compute_signature, WebhookEvent, WebhookOutcome, WebhookRequest, WebhookTrigger,
};
use aftership_node::utils::logger;
use aftership_node::NodeConfig;
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Parser)]
#[command(name = "webhook-check")]
#[command(about = "Replay a saved AfterShip webhook delivery through the trigger")]
struct Args {
    /// File holding the raw webhook body
    #[arg(short, long)]
    payload: String,

    /// Value of the aftership-hmac-sha256 header
    #[arg(short, long)]
    signature: Option<String>,

    /// Sign the payload with the configured secret instead of passing --signature
    #[arg(long)]
    sign: bool,

    /// TOML configuration file with a [trigger] section
    #[arg(short, long)]
    config: Option<String>,

    /// Override the event filter from the config
    #[arg(long)]
    event: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let mut trigger_config = match &args.config {
        Some(path) => NodeConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?
            .trigger(),
        None => Default::default(),
    };
    if let Some(event) = &args.event {
        trigger_config.event = event.parse::<WebhookEvent>()?;
    }

    let body = tokio::fs::read(&args.payload)
        .await
        .with_context(|| format!("Failed to read payload file '{}'", args.payload))?;

    let signature = match (&args.signature, args.sign) {
        (Some(signature), _) => Some(signature.clone()),
        (None, true) => {
            let secret = trigger_config
                .webhook_secret
                .as_deref()
                .context("--sign needs trigger.webhook_secret in the config")?;
            Some(compute_signature(secret, &body)?)
        }
        (None, false) => None,
    };

    let mut request = WebhookRequest::new(body);
    if let Some(signature) = signature {
        request = request.with_header(SIGNATURE_HEADER, signature);
    }

    let trigger = WebhookTrigger::new(trigger_config);
    tracing::info!("🔔 Listening for '{}' events", trigger.config().event);
    let outcome = trigger.handle(&request)?;

    match &outcome {
        WebhookOutcome::Triggered(records) => {
            tracing::info!("✅ Delivery triggered {} record(s)", records.len());
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        WebhookOutcome::Responded { status, body } => {
            tracing::info!("📭 Delivery answered with {} and not triggered", status);
            println!("{} {}", status, body);
        }
    }

    if outcome.status() >= 400 {
        std::process::exit(1);
    }

    Ok(())
}
