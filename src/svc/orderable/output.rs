//! # Output module
//!
//! This module provides the record handed back to the caller once an option
//! has been selected.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::svc::{docdb::OrderableOption, orderable::filter::Filters};

// -----------------------------------------------------------------------------
// OrderableDbInstance structure

#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct OrderableDbInstance {
    /// Identifier of the data source, always equal to `instance_class`
    #[serde(rename = "id")]
    pub id: String,
    #[serde(rename = "instance_class")]
    pub instance_class: String,
    #[serde(rename = "preferred_instance_classes")]
    pub preferred_instance_classes: Vec<String>,
    #[serde(rename = "engine")]
    pub engine: String,
    #[serde(rename = "engine_version")]
    pub engine_version: String,
    #[serde(rename = "default_only")]
    pub default_only: bool,
    #[serde(rename = "license_model")]
    pub license_model: String,
    #[serde(rename = "vpc")]
    pub vpc: Option<bool>,
    /// Availability zones in the order given by the api
    #[serde(rename = "availability_zones")]
    pub availability_zones: Vec<String>,
}

impl OrderableDbInstance {
    pub fn bind(filters: &Filters, option: OrderableOption) -> Self {
        Self {
            id: option.db_instance_class.to_owned(),
            instance_class: option.db_instance_class,
            preferred_instance_classes: filters.preferred_instance_classes.to_owned(),
            engine: option.engine,
            engine_version: option.engine_version,
            default_only: filters.default_only(),
            license_model: option.license_model,
            vpc: option.vpc,
            availability_zones: option
                .availability_zones
                .into_iter()
                .map(|zone| zone.name)
                .collect(),
        }
    }
}
