use anyhow::Result;
use std::net::SocketAddr;
use tracing::{debug, info};

use research_chat_backend::config::Config;
use research_chat_backend::routes;
use research_chat_backend::state::AppState;

fn load_config() -> Result<Config> {
    // Resolve paths next to the executable as well as the working directory
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let explicit = std::env::var("CONFIG_PATH").ok();
    let config_paths: Vec<String> = vec![
        explicit.clone(),
        Some("conf.yaml".to_string()),
        Some("conf.json".to_string()),
        exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
        exe_dir.join("conf.json").to_str().map(|s| s.to_string()),
    ]
    .into_iter()
    .flatten()
    .collect();

    let mut config = None;
    for path in &config_paths {
        match Config::load(path) {
            Ok(cfg) => {
                info!("Loaded configuration from: {}", path);
                config = Some(cfg);
                break;
            }
            Err(e) if explicit.as_deref() == Some(path.as_str()) => {
                return Err(e.context(format!("CONFIG_PATH points at an unusable file: {}", path)));
            }
            Err(e) => debug!("Failed to load config from {}: {:#}", path, e),
        }
    }

    let mut config = config.unwrap_or_else(|| {
        info!("No config file found (tried {:?}), using defaults", config_paths);
        Config::default()
    });
    config.apply_env_overrides(|name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    research_chat_backend::init_tracing("research_chat_backend=debug,tower_http=debug");

    let config = load_config()?;
    let addr: SocketAddr = format!("{}:{}", config.system_config.host, config.system_config.port)
        .parse()?;

    let app_state = AppState::new(config)?;
    let app = routes::create_routes(app_state);

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
