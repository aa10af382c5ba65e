//! # Filter module
//!
//! This module provides the filters given by the caller and their
//! normalization into a [`QueryPlan`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::svc::{docdb::OrderableOptionsInput, orderable::Error};

// -----------------------------------------------------------------------------
// Constants

pub const DEFAULT_ENGINE: &str = "docdb";
pub const DEFAULT_LICENSE_MODEL: &str = "na";

// -----------------------------------------------------------------------------
// Filters structure

/// Filters given by the caller, every field is optional. An empty string or an
/// empty list is considered as unset.
#[derive(JsonSchema, Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct Filters {
    /// Instance class to look for, conflicts with `preferred_instance_classes`
    #[serde(rename = "instance_class", default, skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,
    /// Instance classes ordered by priority, the first one available wins.
    /// Conflicts with `instance_class`
    #[serde(
        rename = "preferred_instance_classes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub preferred_instance_classes: Vec<String>,
    /// Database engine, defaults to `docdb`
    #[serde(rename = "engine", default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Engine version, conflicts with `default_only`
    #[serde(rename = "engine_version", default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    /// Only look for the default engine version, conflicts with `engine_version`
    #[serde(rename = "default_only", default, skip_serializing_if = "Option::is_none")]
    pub default_only: Option<bool>,
    /// License model, defaults to `na`
    #[serde(rename = "license_model", default, skip_serializing_if = "Option::is_none")]
    pub license_model: Option<String>,
    /// Whether the instance is in a vpc, unset means both
    #[serde(rename = "vpc", default, skip_serializing_if = "Option::is_none")]
    pub vpc: Option<bool>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

impl Filters {
    pub fn instance_class(&self) -> Option<&str> {
        present(&self.instance_class)
    }

    pub fn engine(&self) -> &str {
        present(&self.engine).unwrap_or(DEFAULT_ENGINE)
    }

    pub fn engine_version(&self) -> Option<&str> {
        present(&self.engine_version)
    }

    pub fn default_only(&self) -> bool {
        self.default_only.unwrap_or(false)
    }

    pub fn license_model(&self) -> &str {
        present(&self.license_model).unwrap_or(DEFAULT_LICENSE_MODEL)
    }

    /// returns an error if both sides of a mutually exclusive pair are set
    pub fn validate(&self) -> Result<(), Error> {
        if self.instance_class().is_some() && !self.preferred_instance_classes.is_empty() {
            return Err(Error::Conflict("instance_class", "preferred_instance_classes"));
        }

        if self.engine_version().is_some() && self.default_only() {
            return Err(Error::Conflict("engine_version", "default_only"));
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// QueryPlan structure

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct QueryPlan {
    pub input: OrderableOptionsInput,
    pub default_only: bool,
    pub preferred_instance_classes: Vec<String>,
}

impl From<&Filters> for QueryPlan {
    fn from(filters: &Filters) -> Self {
        Self {
            input: OrderableOptionsInput {
                db_instance_class: filters.instance_class().map(ToString::to_string),
                engine: filters.engine().to_string(),
                engine_version: filters.engine_version().map(ToString::to_string),
                license_model: filters.license_model().to_string(),
                vpc: filters.vpc,
            },
            default_only: filters.default_only(),
            preferred_instance_classes: filters.preferred_instance_classes.to_owned(),
        }
    }
}
