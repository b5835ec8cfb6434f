use clap::Parser;
use memories_auth::adapters::console::{ConsoleNotifier, RouteRecorder};
use memories_auth::utils::{logger, validation::Validate};
use memories_auth::{AppwriteAccountService, CliConfig, RegistrationFlow, SubmitOutcome};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting memories-signup");
    tracing::debug!("Input: {:?}", cli.registration_input());

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let service = AppwriteAccountService::from_config(&config.service)?;
    let navigator = Arc::new(RouteRecorder::new());
    let mut flow = RegistrationFlow::with_schema(
        service,
        ConsoleNotifier,
        Arc::clone(&navigator),
        config.schema(),
    )
    .landing_route(config.landing_route());

    for (field, value) in cli.field_values() {
        flow.on_field_change(field, value);
    }

    match flow.on_submit().await {
        SubmitOutcome::Success => {
            let route = navigator.last_route().unwrap_or_default();
            tracing::info!("✅ Account created, continuing at {}", route);
            println!("✅ Account created and signed in");
            println!("➡️  {}", route);
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("❌ {}: {}", field, message);
            }
            std::process::exit(1);
        }
        SubmitOutcome::Failed(stage) => {
            tracing::error!("❌ Sign-up stopped at stage '{}'", stage);
            std::process::exit(2);
        }
    }

    Ok(())
}
