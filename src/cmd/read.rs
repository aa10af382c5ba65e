//! # Read module
//!
//! This module provides the command line interface to resolve the orderable
//! instance matching the given filters.

use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    path::PathBuf,
    str::FromStr,
    sync::Arc,
};

use async_trait::async_trait;
use clap::Args;
use tracing::debug;

use crate::{
    cmd::Executor,
    svc::{
        cfg::Configuration,
        docdb::client::Client,
        orderable::{self, Filters, OrderableDbInstance},
    },
};

// -----------------------------------------------------------------------------
// Output enum

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub enum Output {
    Yaml,
    Json,
}

impl FromStr for Output {
    type Err = Box<dyn StdError + Send + Sync>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "failed to parse output format '{}', available options are 'yaml' or 'json'",
                s
            )
            .into()),
        }
    }
}

impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl Output {
    pub fn format(&self, instance: &OrderableDbInstance) -> Result<String, Error> {
        match self {
            Self::Yaml => serde_yaml::to_string(instance).map_err(Error::SerializeYaml),
            Self::Json => serde_json::to_string_pretty(instance)
                .map(|buf| buf + "\n")
                .map_err(Error::SerializeJson),
        }
    }
}

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to read filters from file '{0:?}', {1}")]
    Io(PathBuf, std::io::Error),
    #[error("failed to parse filters from file '{0:?}', {1}")]
    Parse(PathBuf, serde_yaml::Error),
    #[error("{0}")]
    Orderable(orderable::Error),
    #[error("failed to serialize orderable instance, {0}")]
    SerializeYaml(serde_yaml::Error),
    #[error("failed to serialize orderable instance, {0}")]
    SerializeJson(serde_json::Error),
}

// -----------------------------------------------------------------------------
// Read structure

#[derive(Args, Clone, Debug)]
pub struct Read {
    /// Load filters from a yaml or json file, flags take precedence
    #[clap(short = 'f', long = "filters")]
    pub filters: Option<PathBuf>,
    /// Instance class to look for
    #[clap(
        short = 'i',
        long = "instance-class",
        conflicts_with = "preferred_instance_classes"
    )]
    pub instance_class: Option<String>,
    /// Preferred instance class, could be given several times by order of
    /// priority
    #[clap(short = 'p', long = "preferred-instance-class")]
    pub preferred_instance_classes: Vec<String>,
    /// Database engine
    #[clap(short = 'e', long = "engine")]
    pub engine: Option<String>,
    /// Engine version
    #[clap(long = "engine-version", conflicts_with = "default_only")]
    pub engine_version: Option<String>,
    /// Only look for the default engine version
    #[clap(short = 'd', long = "default-only")]
    pub default_only: bool,
    /// License model
    #[clap(short = 'l', long = "license-model")]
    pub license_model: Option<String>,
    /// Whether the instance is in a vpc
    #[clap(long = "vpc")]
    pub vpc: Option<bool>,
    /// Output format, 'yaml' or 'json'
    #[clap(short = 'o', long = "output", default_value = "yaml")]
    pub output: Output,
}

impl Read {
    /// returns the filters of the file, if any, overridden by the flags
    pub async fn filters(&self) -> Result<Filters, Error> {
        let mut filters = match &self.filters {
            Some(path) => {
                let buf = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|err| Error::Io(path.to_owned(), err))?;

                serde_yaml::from_str::<Filters>(&buf)
                    .map_err(|err| Error::Parse(path.to_owned(), err))?
            }
            None => Filters::default(),
        };

        if self.instance_class.is_some() {
            filters.instance_class = self.instance_class.to_owned();
        }

        if !self.preferred_instance_classes.is_empty() {
            filters.preferred_instance_classes = self.preferred_instance_classes.to_owned();
        }

        if self.engine.is_some() {
            filters.engine = self.engine.to_owned();
        }

        if self.engine_version.is_some() {
            filters.engine_version = self.engine_version.to_owned();
        }

        if self.default_only {
            filters.default_only = Some(true);
        }

        if self.license_model.is_some() {
            filters.license_model = self.license_model.to_owned();
        }

        if self.vpc.is_some() {
            filters.vpc = self.vpc;
        }

        filters.validate().map_err(Error::Orderable)?;
        Ok(filters)
    }
}

#[async_trait]
impl Executor for Read {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error> {
        let filters = self.filters().await?;
        debug!(filters = format!("{:?}", filters), "Resolve orderable instance");

        let client = Client::new(&config.aws).await;
        let instance = orderable::read(&client, &filters)
            .await
            .map_err(Error::Orderable)?;

        print!("{}", self.output.format(&instance)?);
        Ok(())
    }
}
