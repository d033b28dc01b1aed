//! Configuration for minifrag components

use crate::common::partition::{Partition, SiteId, SUPPORTED_DEPARTMENT};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable pointing at the TOML config file
pub const CONFIG_ENV: &str = "MINIFRAG_CONFIG";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Coordinator-specific config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator: Option<CoordinatorConfig>,

    /// Fragment-site-specific config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<SiteConfig>,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from `$MINIFRAG_CONFIG` (default `minifrag.toml`, optional),
    /// then `MINIFRAG__*` environment overrides.
    pub fn load() -> crate::Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "minifrag.toml".to_string());
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("MINIFRAG").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coordinator: None,
            site: None,
            log_level: default_log_level(),
        }
    }
}

/// Base addresses of the fragment sites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteEndpoints {
    #[serde(default = "default_site_a")]
    pub site_a: String,
    #[serde(default = "default_site_b")]
    pub site_b: String,
}

fn default_site_a() -> String {
    "http://localhost:3001".to_string()
}
fn default_site_b() -> String {
    "http://localhost:3002".to_string()
}

impl SiteEndpoints {
    pub fn base_url(&self, site: SiteId) -> &str {
        match site {
            SiteId::SiteA => &self.site_a,
            SiteId::SiteB => &self.site_b,
        }
    }
}

impl Default for SiteEndpoints {
    fn default() -> Self {
        Self {
            site_a: default_site_a(),
            site_b: default_site_b(),
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Bind address for the query API
    #[serde(default = "default_coord_bind")]
    pub bind_addr: SocketAddr,

    /// Fragment site addresses
    #[serde(default)]
    pub sites: SiteEndpoints,

    /// Department accepted by the classifier
    #[serde(default = "default_department")]
    pub department: String,

    /// Upper bound on each outbound site call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_coord_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3000))
}
fn default_department() -> String {
    SUPPORTED_DEPARTMENT.to_string()
}
fn default_request_timeout() -> u64 {
    5_000
}

impl CoordinatorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(crate::Error::InvalidConfig(
                "request_timeout_ms must be positive".into(),
            ));
        }
        for site in SiteId::ALL {
            let url = self.sites.base_url(site);
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(crate::Error::InvalidConfig(format!(
                    "{} address must be an http(s) URL: {}",
                    site, url
                )));
            }
        }
        Ok(())
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_coord_bind(),
            sites: SiteEndpoints::default(),
            department: default_department(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// Fragment site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Bind address for the site query surface
    pub bind_addr: SocketAddr,

    /// Slice of the dataset this site owns
    pub partition: Partition,

    /// Directory holding students.json, faculty.json, courses.json, enrollments.json
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl SiteConfig {
    pub fn new(partition: Partition) -> Self {
        let port = match partition {
            Partition::Advanced => 3001,
            Partition::Basic => 3002,
        };
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            partition,
            data_dir: default_data_dir(),
        }
    }
}
