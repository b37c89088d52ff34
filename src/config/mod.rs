mod file_config;

pub use file_config::FileConfig;

use crate::library::ImageWritePolicy;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub port: u16,
    pub base_url: Option<String>,
    pub logging_level: RequestsLoggingLevel,
    pub fetch_timeout_sec: u64,
    pub image_write_policy: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub images_dir: PathBuf,
    pub port: u16,
    pub base_url: String,
    pub logging_level: RequestsLoggingLevel,
    pub fetch_timeout_sec: u64,
    pub image_write_policy: ImageWritePolicy,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified via the CLI or in the config file")
            })?;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        // The images directory sits next to the database unless pointed
        // elsewhere; it is created on first write.
        let images_dir = file
            .images_dir
            .map(PathBuf::from)
            .or_else(|| cli.images_dir.clone())
            .unwrap_or_else(|| {
                db_path
                    .parent()
                    .map(|p| p.join("images"))
                    .unwrap_or_else(|| PathBuf::from("images"))
            });

        let port = file.port.unwrap_or(cli.port);

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .unwrap_or_else(|| format!("http://localhost:{}", port));
        let base_url = base_url.trim_end_matches('/').to_string();

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let fetch_timeout_sec = file.fetch_timeout_sec.unwrap_or(cli.fetch_timeout_sec);
        if fetch_timeout_sec == 0 {
            bail!("fetch_timeout_sec must be greater than zero");
        }

        let image_write_policy = file
            .image_write_policy
            .as_deref()
            .or(Some(cli.image_write_policy.as_str()))
            .and_then(parse_image_write_policy)
            .ok_or_else(|| {
                anyhow::anyhow!("image_write_policy must be one of: open, owner-only")
            })?;

        Ok(Self {
            db_path,
            images_dir,
            port,
            base_url,
            logging_level,
            fetch_timeout_sec,
            image_write_policy,
        })
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

fn parse_image_write_policy(s: &str) -> Option<ImageWritePolicy> {
    match s {
        "open" => Some(ImageWritePolicy::Open),
        "owner-only" => Some(ImageWritePolicy::OwnerOnly),
        _ => None,
    }
}
