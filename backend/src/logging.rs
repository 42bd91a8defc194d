use anyhow::{anyhow, bail};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Unset or blank variables fall back to their defaults. `LOKI_ENABLED`
    /// accepts `true`/`1`/`yes` in any case.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            loki_enabled: non_empty("LOKI_ENABLED")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
            loki_url: non_empty("LOKI_URL"),
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| "pricetrack".to_string()),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: non_empty("RUST_LOG").unwrap_or_else(|| "info,tower_http=debug".to_string()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.loki_enabled {
            return Ok(());
        }
        match &self.loki_url {
            None => bail!("LOKI_ENABLED is true but LOKI_URL is not set"),
            Some(raw) => {
                url::Url::parse(raw).map_err(|e| anyhow!("LOKI_URL '{}' is not a valid URL: {}", raw, e))?;
            }
        }
        Ok(())
    }
}

pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    config.validate()?;

    #[cfg(feature = "loki")]
    {
        if config.loki_enabled {
            if let Some(loki_url) = config.loki_url.clone() {
                return init_with_loki(config, &loki_url);
            }
        }
    }

    init_console_only(config)
}

fn init_console_only(config: LoggingConfig) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("📊 Console logging initialized");
    Ok(())
}

#[cfg(feature = "loki")]
fn init_with_loki(config: LoggingConfig, loki_url: &str) -> anyhow::Result<()> {
    let url = url::Url::parse(loki_url)?;

    let (loki_layer, task) = tracing_loki::builder()
        .label("service", &config.service_name)?
        .label("environment", &config.environment)?
        .build_url(url)?;

    // Background task that ships logs to Loki
    tokio::spawn(task);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(loki_layer)
        .init();

    tracing::info!("✅ Loki logging initialized at {}", loki_url);
    Ok(())
}
