//! # Configuration module
//!
//! This module provide utilities and helpers to interact with the configuration

use std::{
    convert::TryFrom,
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// -----------------------------------------------------------------------------
// Constants

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8000";

// -----------------------------------------------------------------------------
// Aws structure

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
pub struct Aws {
    #[serde(rename = "region", default)]
    pub region: Option<String>,
    #[serde(rename = "endpoint", default)]
    pub endpoint: Option<String>,
    #[serde(rename = "profile", default)]
    pub profile: Option<String>,
}

// -----------------------------------------------------------------------------
// Server structure

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Server {
    #[serde(rename = "listen")]
    pub listen: SocketAddr,
}

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to load file '{0:?}', {1}")]
    File(PathBuf, ConfigError),
    #[error("failed to load configuration, {0}")]
    Cast(ConfigError),
    #[error("failed to set default for key '{0}', {1}")]
    Default(String, ConfigError),
}

// -----------------------------------------------------------------------------
// Configuration structures

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Configuration {
    #[serde(rename = "aws", default)]
    pub aws: Aws,
    #[serde(rename = "server")]
    pub server: Server,
}

impl TryFrom<PathBuf> for Configuration {
    type Error = Error;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        let builder = Self::builder()?.add_source(File::from(path.as_path()).required(true));

        builder
            .build()
            .map_err(|err| Error::File(path, err))?
            .try_deserialize()
            .map_err(Error::Cast)
    }
}

impl Configuration {
    fn builder() -> Result<ConfigBuilder<DefaultState>, Error> {
        Ok(Config::builder()
            .set_default("server.listen", DEFAULT_LISTEN)
            .map_err(|err| Error::Default("server.listen".into(), err))?
            .add_source(
                Environment::with_prefix(&env!("CARGO_PKG_NAME").replace('-', "_"))
                    .prefix_separator("_")
                    .separator("__"),
            ))
    }

    fn locations() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(format!("/usr/share/{}/config", env!("CARGO_PKG_NAME"))),
            PathBuf::from(format!("/etc/{}/config", env!("CARGO_PKG_NAME"))),
        ];

        if let Some(home) = env::var_os("HOME") {
            let home = Path::new(&home);

            paths.push(home.join(".config").join(env!("CARGO_PKG_NAME")).join("config"));
            paths.push(
                home.join(".local")
                    .join("share")
                    .join(env!("CARGO_PKG_NAME"))
                    .join("config"),
            );
        }

        paths.push(PathBuf::from("config"));
        paths
    }

    pub fn try_default() -> Result<Self, Error> {
        let mut builder = Self::builder()?;

        for path in Self::locations() {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .build()
            .map_err(Error::Cast)?
            .try_deserialize()
            .map_err(Error::Cast)
    }

    pub fn help(&self) {
        info!(
            "Listening on '{}' when serving, use key 'server.listen' to change it",
            self.server.listen
        );

        if self.aws.region.is_none() {
            warn!("Configuration key 'aws.region' is not set, fallback on the aws default provider chain");
        }

        if self.aws.profile.is_none() {
            info!("Configuration key 'aws.profile' is not set, the default profile is used");
        }

        if let Some(endpoint) = &self.aws.endpoint {
            warn!(
                "Configuration key 'aws.endpoint' is set, requests are sent to '{}'",
                endpoint
            );
        }
    }
}
