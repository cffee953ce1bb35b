use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; every variable has a default or is optional.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent: documents are kept in process memory.
    pub database_url: Option<String>,
    /// Server-side generator key. A per-request key takes precedence.
    pub gemini_api_key: Option<String>,
    /// Absent or incomplete: exports are not archived.
    pub s3: Option<S3Config>,
    pub render_scale: f32,
    pub jpeg_quality: u8,
    pub product_name: String,
    pub port: u16,
    pub rust_log: String,
    /// Browser origins allowed by CORS. Empty: any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            gemini_api_key: None,
            s3: None,
            render_scale: 2.0,
            jpeg_quality: 95,
            product_name: "Folio".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let render_scale = match var("RENDER_SCALE") {
            Some(raw) => raw
                .trim()
                .parse::<f32>()
                .context("RENDER_SCALE must be a number")?,
            None => defaults.render_scale,
        };
        if !(render_scale > 0.0 && render_scale <= 4.0) {
            bail!("RENDER_SCALE must be in (0, 4], got {render_scale}");
        }

        let jpeg_quality = match var("JPEG_QUALITY") {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .context("JPEG_QUALITY must be an integer between 1 and 100")?,
            None => defaults.jpeg_quality,
        };
        if !(1..=100).contains(&jpeg_quality) {
            bail!("JPEG_QUALITY must be between 1 and 100, got {jpeg_quality}");
        }

        let s3 = match (
            var("S3_BUCKET"),
            var("S3_ENDPOINT"),
            var("AWS_ACCESS_KEY_ID"),
            var("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(bucket), Some(endpoint), Some(access_key_id), Some(secret_access_key)) => {
                Some(S3Config {
                    bucket,
                    endpoint,
                    access_key_id,
                    secret_access_key,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url: var("DATABASE_URL"),
            gemini_api_key: var("GEMINI_API_KEY"),
            s3,
            render_scale,
            jpeg_quality,
            product_name: var("PRODUCT_NAME").unwrap_or(defaults.product_name),
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or(defaults.rust_log),
            cors_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.render_scale, 2.0);
        assert_eq!(config.jpeg_quality, 95);
        assert_eq!(config.product_name, "Folio");
        assert!(config.database_url.is_none());
        assert!(config.gemini_api_key.is_none());
        assert!(config.s3.is_none());
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_cors_origins_are_comma_separated() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://folio.example, http://localhost:3000,,",
        )])
        .unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://folio.example", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = load(&[("DATABASE_URL", "  "), ("GEMINI_API_KEY", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn test_s3_requires_all_four_variables() {
        let partial = load(&[("S3_BUCKET", "exports"), ("S3_ENDPOINT", "http://minio:9000")]).unwrap();
        assert!(partial.s3.is_none());

        let full = load(&[
            ("S3_BUCKET", "exports"),
            ("S3_ENDPOINT", "http://minio:9000"),
            ("AWS_ACCESS_KEY_ID", "key"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
        ])
        .unwrap();
        assert_eq!(full.s3.unwrap().bucket, "exports");
    }

    #[test]
    fn test_invalid_numbers_fail() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("RENDER_SCALE", "0")]).is_err());
        assert!(load(&[("RENDER_SCALE", "9")]).is_err());
        assert!(load(&[("JPEG_QUALITY", "0")]).is_err());
        assert!(load(&[("JPEG_QUALITY", "300")]).is_err());
    }
}
