use hfproxy::{logger, HfConfig, HfError, InferenceClient, ServerConfig};

#[actix_web::main]
async fn main() -> Result<(), HfError> {
    // Load .env before the logger reads LOG_* from the environment.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    if let Err(e) = logger::init() {
        eprintln!("{}", e);
    }

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = match HfConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let server_config = ServerConfig::from_env()?;

    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &server_config);
    logger::log_config_info(&config);

    log::info!("🔄 Creating inference client...");
    let client = InferenceClient::new(&config)?;
    log::info!("✅ Inference client ready for model {}", client.model());

    hfproxy::server::run(client, &server_config).await
}
