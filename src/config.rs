use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub model_api_base_url: String,
    pub model_api_key: String,
    pub model_name: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            model_api_base_url: std::env::var("MODEL_API_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
                .trim()
                .to_string(),
            model_api_key: std::env::var("MODEL_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .map_err(|_| {
                    anyhow::anyhow!("MODEL_API_KEY or GEMINI_API_KEY environment variable required")
                })
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("MODEL_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
        };

        if !config.model_api_base_url.starts_with("http://")
            && !config.model_api_base_url.starts_with("https://")
        {
            anyhow::bail!("MODEL_API_BASE_URL must start with http:// or https://");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model API base URL: {}", config.model_api_base_url);
        tracing::debug!("Model name: {}", config.model_name);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
