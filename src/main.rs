use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use vaultbot::config::Config;
use vaultbot::dispatcher::Dispatcher;
use vaultbot::session::SessionStore;
use vaultbot::store::FileStore;
use vaultbot::transfer::telegram_gateway;

/// Conversation id used for the local console session.
const CONSOLE_CONVERSATION: i64 = 0;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = vaultbot::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        vaultbot::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let store = match FileStore::new(&config.storage.upload_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open upload directory: {e}");
            std::process::exit(1);
        }
    };

    let gateway = match telegram_gateway(
        &config.bot.api_base,
        &config.bot.token,
        config.transfer.timeout_secs,
    ) {
        Ok(gateway) => gateway,
        Err(e) => {
            eprintln!("Failed to create transfer gateway: {e}");
            std::process::exit(1);
        }
    };

    let dispatcher = Dispatcher::new(
        SessionStore::new(config.auth.clone()),
        store,
        config.storage.clone(),
        &config.transfer,
        Box::new(gateway),
    );

    info!("vaultbot ready");
    info!(dir = %config.storage.upload_dir, "Serving upload directory");

    // The chat transport is an external collaborator; this binary drives
    // the dispatcher from stdin as a single local conversation.
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }
        for reply in dispatcher.dispatch(CONSOLE_CONVERSATION, &line).await {
            println!("{reply}");
        }
    }
}
