//! # Command module
//!
//! This module provide command line interface structures and helpers
use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;

use crate::svc::{cfg::Configuration, docdb::client::Client, http::server};

pub mod read;
pub mod schema;

// -----------------------------------------------------------------------------
// Executor trait

#[async_trait]
pub trait Executor {
    type Error;

    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error>;
}

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to execute command '{0}', {1}")]
    Execution(String, Arc<Error>),
    #[error("failed to execute command, {0}")]
    Read(read::Error),
    #[error("failed to execute command, {0}")]
    Schema(schema::Error),
    #[error("failed to execute command, {0}")]
    Serve(server::Error),
}

// -----------------------------------------------------------------------------
// Command enum

#[derive(Subcommand, Clone, Debug)]
pub enum Command {
    /// Resolve the orderable instance matching the given filters
    #[clap(name = "read", aliases = &["r"])]
    Read(read::Read),
    /// Interact with the schema of the data source
    #[clap(name = "schema", aliases = &["s"], subcommand)]
    Schema(schema::Schema),
    /// Serve the data source over http
    #[clap(name = "serve")]
    Serve,
}

#[async_trait]
impl Executor for Command {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
    async fn execute(&self, config: Arc<Configuration>) -> Result<(), Self::Error> {
        match self {
            Self::Read(read) => read
                .execute(config)
                .await
                .map_err(Error::Read)
                .map_err(|err| Error::Execution("read".into(), Arc::new(err))),
            Self::Schema(schema) => schema
                .execute(config)
                .await
                .map_err(Error::Schema)
                .map_err(|err| Error::Execution("schema".into(), Arc::new(err))),
            Self::Serve => daemon(config)
                .await
                .map_err(|err| Error::Execution("serve".into(), Arc::new(err))),
        }
    }
}

// -----------------------------------------------------------------------------
// Args struct

#[derive(Parser, Clone, Debug)]
#[clap(author, version, about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Args {
    /// Increase log verbosity
    #[clap(short = 'v', global = true, action = ArgAction::Count)]
    pub verbosity: u8,
    /// Specify location of configuration
    #[clap(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Check if configuration is healthy
    #[clap(short = 't', long = "check", global = true)]
    pub check: bool,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

// -----------------------------------------------------------------------------
// daemon function

#[cfg_attr(feature = "trace", tracing::instrument(skip(config)))]
pub async fn daemon(config: Arc<Configuration>) -> Result<(), Error> {
    // -------------------------------------------------------------------------
    // Create a new documentdb client from the configuration or the aws default
    // provider chain
    let client = Arc::new(Client::new(&config.aws).await);

    // -------------------------------------------------------------------------
    // Serve until the termination signal
    info!("Start to serve the orderable instance data source");
    server::serve(client, config.server.listen)
        .await
        .map_err(Error::Serve)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_read() {
        let args = Args::try_parse_from([
            "docdb-orderable",
            "-vv",
            "read",
            "--preferred-instance-class",
            "db.r5.xlarge",
            "--preferred-instance-class",
            "db.r5.large",
            "--vpc",
            "false",
        ])
        .unwrap();

        assert_eq!(2, args.verbosity);
        match args.command {
            Some(Command::Read(read)) => {
                assert_eq!(
                    vec!["db.r5.xlarge", "db.r5.large"],
                    read.preferred_instance_classes
                );
                assert_eq!(Some(false), read.vpc);
            }
            command => panic!("unexpected command {:?}", command),
        }
    }

    #[test]
    fn test_parse_conflicting_flags() {
        let result = Args::try_parse_from([
            "docdb-orderable",
            "read",
            "--instance-class",
            "db.r5.large",
            "--preferred-instance-class",
            "db.r5.xlarge",
        ]);
        assert!(result.is_err());

        let result = Args::try_parse_from([
            "docdb-orderable",
            "read",
            "--engine-version",
            "4.0.0",
            "--default-only",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_without_command() {
        let args = Args::try_parse_from(["docdb-orderable", "-c", "config.toml"]).unwrap();

        assert!(args.command.is_none());
        assert_eq!(Some(PathBuf::from("config.toml")), args.config);
    }
}
