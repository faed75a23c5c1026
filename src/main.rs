use clap::Parser;
use cloudrun_url::utils::{logger, validation::Validate};
use cloudrun_url::{CliArgs, DefaultResolver, ErrorKind, ResolveError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting cloudrun-url");

    let config = match args.to_config().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Resolver config: {:?}", config);

    let resolver = match DefaultResolver::from_config(&config) {
        Ok(resolver) => resolver,
        Err(e) => exit_with(&e),
    };

    match resolver.resolve_service().await {
        Ok(resolved) => {
            tracing::info!(
                "Resolved service {} in {} (project {})",
                resolved.service,
                resolved.region,
                resolved.account_id
            );
            if args.json {
                println!("{}", serde_json::to_string_pretty(&resolved)?);
            } else {
                println!("{}", resolved.url);
            }
            Ok(())
        }
        Err(e) => exit_with(&e),
    }
}

fn exit_with(e: &ResolveError) -> ! {
    tracing::error!("Resolution failed: {} (kind: {:?})", e, e.kind());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("   {}", e);
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.kind() {
        ErrorKind::Config => 2,
        _ => 1,
    };
    std::process::exit(exit_code);
}
