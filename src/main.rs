use std::fs::OpenOptions;
use std::io::Write;

use homework_bot::api::PracticumClient;
use homework_bot::banner;
use homework_bot::config::AppConfig;
use homework_bot::notifier::TelegramNotifier;
use homework_bot::poller::{Poller, PollerOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Falling back to the process environment");
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = config.require_credentials() {
        log::error!("fatal: {}, exiting", e);
        std::process::exit(1);
    }

    let client = reqwest::Client::new();
    let api = PracticumClient::new(client.clone(), config.practicum.clone());
    let notifier = TelegramNotifier::new(client, config.telegram.clone());

    let mut poller = Poller::new(
        api,
        notifier,
        PollerOptions::from(&config),
        chrono::Utc::now().timestamp(),
    );

    log::info!("Bot started");
    poller.run().await;
}

/// `<time>, <LEVEL>, <message>` lines to stderr, or to `LOG_FILE` when configured.
fn init_logging(config: &AppConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("debug"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{}, {}, {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = &config.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!(
                "⚠️  Warning: Could not open log file {}: {}",
                path.display(),
                e
            ),
        }
    }

    builder.init();
}
