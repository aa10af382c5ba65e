//! # Schema module
//!
//! This module provides the command line interface to print the schema of the
//! data source, its filters and the orderable instance handed back.

use std::{error::Error as StdError, str::FromStr, sync::Arc};

use async_trait::async_trait;
use clap::Subcommand;
use schemars::schema_for;

use crate::{
    cmd::Executor,
    svc::{
        cfg::Configuration,
        orderable::{Filters, OrderableDbInstance},
    },
};

// -----------------------------------------------------------------------------
// Kind enum

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug)]
pub enum Kind {
    Filters,
    OrderableDbInstance,
}

impl FromStr for Kind {
    type Err = Box<dyn StdError + Send + Sync>;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "filters" => Ok(Self::Filters),
            "orderable-db-instance" => Ok(Self::OrderableDbInstance),
            _ => Err(format!("failed to parse '{}', available options are 'filters' or 'orderable-db-instance'", s).into()),
        }
    }
}

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to serialize schema, {0}")]
    Serialize(serde_yaml::Error),
}

// -----------------------------------------------------------------------------
// Schema enum

#[derive(Subcommand, Clone, Debug)]
pub enum Schema {
    /// View the json schema of the filters and the orderable instance
    #[clap(name = "view", aliases = &["v"])]
    View {
        #[clap(name = "kind")]
        kind: Option<Kind>,
    },
}

#[async_trait]
impl Executor for Schema {
    type Error = Error;

    #[cfg_attr(feature = "trace", tracing::instrument(skip(_config)))]
    async fn execute(&self, _config: Arc<Configuration>) -> Result<(), Self::Error> {
        match self {
            Self::View { kind } => {
                print!("{}", view(kind)?);
                Ok(())
            }
        }
    }
}

// -----------------------------------------------------------------------------
// view function

/// returns the yaml documents of the requested schemas, all of them if none is
/// given
pub fn view(kind: &Option<Kind>) -> Result<String, Error> {
    let kinds = match kind {
        Some(kind) => vec![kind.to_owned()],
        None => vec![Kind::Filters, Kind::OrderableDbInstance],
    };

    let mut documents = vec![];
    for kind in kinds {
        let schema = match kind {
            Kind::Filters => schema_for!(Filters),
            Kind::OrderableDbInstance => schema_for!(OrderableDbInstance),
        };

        documents.push(serde_yaml::to_string(&schema).map_err(Error::Serialize)?);
    }

    Ok(documents.join("---\n"))
}
