//! # DocumentDB module
//!
//! This module provide the seam between the resolver and the DocumentDB api.
//! It exposes the [`Api`] trait, the structures exchanged with it and the
//! implementation based on the `aws-sdk-docdb` crate.

use std::fmt::{self, Display, Formatter};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::trace;

pub mod client;
#[cfg(test)]
pub mod mock;

// -----------------------------------------------------------------------------
// Types

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to execute DescribeDBEngineVersions, {0}")]
    DescribeDbEngineVersions(BoxError),
    #[error("failed to execute DescribeOrderableDBInstanceOptions, {0}")]
    DescribeOrderableDbInstanceOptions(BoxError),
}

// -----------------------------------------------------------------------------
// EngineVersionsInput structure

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct EngineVersionsInput {
    #[serde(rename = "engine")]
    pub engine: String,
    #[serde(rename = "default_only")]
    pub default_only: bool,
}

// -----------------------------------------------------------------------------
// EngineVersion structure

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct EngineVersion {
    #[serde(rename = "engine")]
    pub engine: String,
    #[serde(rename = "engine_version")]
    pub engine_version: String,
}

// -----------------------------------------------------------------------------
// OrderableOptionsInput structure

/// Predicates forwarded to the orderable options listing, an absent predicate
/// does not constrain the listing.
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct OrderableOptionsInput {
    #[serde(rename = "db_instance_class")]
    pub db_instance_class: Option<String>,
    #[serde(rename = "engine")]
    pub engine: String,
    #[serde(rename = "engine_version")]
    pub engine_version: Option<String>,
    #[serde(rename = "license_model")]
    pub license_model: String,
    #[serde(rename = "vpc")]
    pub vpc: Option<bool>,
}

// -----------------------------------------------------------------------------
// AvailabilityZone structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct AvailabilityZone {
    #[serde(rename = "name")]
    pub name: String,
}

// -----------------------------------------------------------------------------
// OrderableOption structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct OrderableOption {
    #[serde(rename = "db_instance_class")]
    pub db_instance_class: String,
    #[serde(rename = "engine")]
    pub engine: String,
    #[serde(rename = "engine_version")]
    pub engine_version: String,
    #[serde(rename = "license_model")]
    pub license_model: String,
    #[serde(rename = "vpc")]
    pub vpc: Option<bool>,
    #[serde(rename = "availability_zones")]
    pub availability_zones: Vec<AvailabilityZone>,
}

impl Display for OrderableOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {}, license: {}, vpc: {})",
            self.db_instance_class,
            self.engine,
            self.engine_version,
            self.license_model,
            self.vpc
                .map(|vpc| vpc.to_string())
                .unwrap_or_else(|| "<none>".to_string())
        )
    }
}

// -----------------------------------------------------------------------------
// Page structure

/// One page of the orderable options listing, the page is the last one when it
/// does not carry a marker.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Page {
    pub options: Vec<Option<OrderableOption>>,
    pub marker: Option<String>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.marker.as_deref().map_or(true, str::is_empty)
    }
}

// -----------------------------------------------------------------------------
// Api trait

#[async_trait]
pub trait Api: Send + Sync {
    async fn describe_db_engine_versions(
        &self,
        input: &EngineVersionsInput,
    ) -> Result<Vec<EngineVersion>, Error>;

    async fn describe_orderable_db_instance_options(
        &self,
        input: &OrderableOptionsInput,
        marker: Option<String>,
    ) -> Result<Page, Error>;

    /// walks the pages of the orderable options listing in order, the callback
    /// receives the options of each page and whether it is the last one, it
    /// returns whether to fetch the next page
    async fn describe_orderable_db_instance_options_pages<F>(
        &self,
        input: &OrderableOptionsInput,
        mut callback: F,
    ) -> Result<(), Error>
    where
        F: FnMut(Vec<Option<OrderableOption>>, bool) -> bool + Send,
    {
        let mut marker = None;
        loop {
            let page = self
                .describe_orderable_db_instance_options(input, marker.take())
                .await?;

            let last_page = page.is_last();
            trace!(
                options = page.options.len(),
                last_page = last_page,
                "Receive a page of orderable instance options"
            );

            if !callback(page.options, last_page) || last_page {
                return Ok(());
            }

            marker = page.marker;
        }
    }
}
