use std::net::SocketAddr;

use serde::Deserialize;
use corsgate_core::error::{CorsGateError, Result};
use corsgate_core::{Bypass, CorsOptions};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub cors: CorsSection,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(CorsGateError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            CorsGateError::BadConfig(format!(
                "gateway.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:9000".into()
}

/// CORS policy as written in YAML. Empty lists fall back to the policy
/// defaults when compiled.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CorsSection {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
    pub allow_credentials: bool,
    pub expose_headers: Vec<String>,
    pub max_age: u32,
    /// Requests whose path starts with one of these skip CORS entirely.
    pub bypass_paths: Vec<String>,
}

impl CorsSection {
    pub fn to_options(&self) -> CorsOptions {
        CorsOptions {
            allow_origins: self.allow_origins.clone(),
            allow_methods: self.allow_methods.clone(),
            allow_headers: self.allow_headers.clone(),
            allow_credentials: self.allow_credentials,
            expose_headers: self.expose_headers.clone(),
            max_age: self.max_age,
            bypass: Bypass::path_prefixes(self.bypass_paths.iter().cloned()),
        }
    }
}
