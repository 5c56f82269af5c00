use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub model_path: String,
    pub server_host: String,
    pub server_port: u16,
    pub rate_limit_per_minute: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/xgb_fare_model.json".to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            rate_limit_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .expect("RATE_LIMIT_PER_MINUTE must be a number"),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .expect("RATE_LIMIT_BURST must be a number"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Milliseconds between replenished rate limiter tokens
    pub fn rate_limit_period_ms(&self) -> u64 {
        (60_000 / self.rate_limit_per_minute.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(per_minute: u64) -> Config {
        Config {
            model_path: "fixtures/xgb_fare_model.json".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            rate_limit_per_minute: per_minute,
            rate_limit_burst: 10,
        }
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(config(600).server_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_rate_limit_period() {
        assert_eq!(config(600).rate_limit_period_ms(), 100);
        assert_eq!(config(0).rate_limit_period_ms(), 60_000);
        assert_eq!(config(1_000_000).rate_limit_period_ms(), 1);
    }
}
