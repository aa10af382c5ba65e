//! # Client module
//!
//! This module provides the [`Api`] implementation backed by the
//! `aws-sdk-docdb` crate.

use std::time::Instant;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_docdb::{config::Region, error::DisplayErrorContext, types};
#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use prometheus::{opts, register_counter_vec, CounterVec};
use tracing::debug;

use crate::svc::{
    cfg::Aws,
    docdb::{
        Api, AvailabilityZone, EngineVersion, EngineVersionsInput, Error, OrderableOption,
        OrderableOptionsInput, Page,
    },
};

// -----------------------------------------------------------------------------
// Telemetry

#[cfg(feature = "metrics")]
static UPSTREAM_REQUEST_SUCCESS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_upstream_request_success",
            "number of successful request sent to the documentdb api",
        ),
        &["operation"]
    )
    .expect("metrics 'docdb_orderable_upstream_request_success' to not be already registered")
});

#[cfg(feature = "metrics")]
static UPSTREAM_REQUEST_FAILURE: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_upstream_request_failure",
            "number of failed request sent to the documentdb api",
        ),
        &["operation"]
    )
    .expect("metrics 'docdb_orderable_upstream_request_failure' to not be already registered")
});

#[cfg(feature = "metrics")]
static UPSTREAM_REQUEST_DURATION: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_upstream_request_duration",
            "duration of request sent to the documentdb api",
        ),
        &["operation", "unit"]
    )
    .expect("metrics 'docdb_orderable_upstream_request_duration' to not be already registered")
});

#[cfg(feature = "metrics")]
fn measure<T, E>(operation: &str, begin: Instant, result: &Result<T, E>) {
    let duration = Instant::now().duration_since(begin).as_micros();

    match result {
        Ok(_) => UPSTREAM_REQUEST_SUCCESS
            .with_label_values(&[operation])
            .inc(),
        Err(_) => UPSTREAM_REQUEST_FAILURE
            .with_label_values(&[operation])
            .inc(),
    }

    UPSTREAM_REQUEST_DURATION
        .with_label_values(&[operation, "us"])
        .inc_by(duration as f64);
}

#[cfg(not(feature = "metrics"))]
fn measure<T, E>(_operation: &str, _begin: Instant, _result: &Result<T, E>) {}

// -----------------------------------------------------------------------------
// Conversions

/// returns the option, or none when the api did not give its instance class
/// so that it is skipped like a null entry
pub fn orderable_option(option: &types::OrderableDbInstanceOption) -> Option<OrderableOption> {
    let class = option
        .db_instance_class()
        .filter(|class| !class.is_empty())?;

    Some(OrderableOption {
        db_instance_class: class.to_string(),
        engine: option.engine().unwrap_or_default().to_string(),
        engine_version: option.engine_version().unwrap_or_default().to_string(),
        license_model: option.license_model().unwrap_or_default().to_string(),
        vpc: option.vpc(),
        availability_zones: option
            .availability_zones()
            .iter()
            .map(|zone| AvailabilityZone {
                name: zone.name().unwrap_or_default().to_string(),
            })
            .collect(),
    })
}

// -----------------------------------------------------------------------------
// Client structure

#[derive(Clone, Debug)]
pub struct Client {
    inner: aws_sdk_docdb::Client,
}

impl From<aws_sdk_docdb::Client> for Client {
    fn from(inner: aws_sdk_docdb::Client) -> Self {
        Self { inner }
    }
}

impl Client {
    /// returns a client using the shared aws configuration chain, overridden
    /// by the given configuration
    #[cfg_attr(feature = "trace", tracing::instrument)]
    pub async fn new(config: &Aws) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.to_owned()));
        }

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        debug!(
            region = sdk_config
                .region()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<none>".to_string()),
            "Create documentdb client"
        );

        Self::from(aws_sdk_docdb::Client::new(&sdk_config))
    }
}

#[async_trait]
impl Api for Client {
    #[cfg_attr(feature = "trace", tracing::instrument(skip(self)))]
    async fn describe_db_engine_versions(
        &self,
        input: &EngineVersionsInput,
    ) -> Result<Vec<EngineVersion>, Error> {
        debug!(
            engine = &input.engine,
            default_only = input.default_only,
            "Execute a request to describe engine versions"
        );

        let begin = Instant::now();
        let result = self
            .inner
            .describe_db_engine_versions()
            .engine(&input.engine)
            .default_only(input.default_only)
            .send()
            .await;

        measure("DescribeDBEngineVersions", begin, &result);
        let output = result.map_err(|err| {
            Error::DescribeDbEngineVersions(DisplayErrorContext(err).to_string().into())
        })?;

        Ok(output
            .db_engine_versions()
            .iter()
            .map(|version| EngineVersion {
                engine: version.engine().unwrap_or_default().to_string(),
                engine_version: version.engine_version().unwrap_or_default().to_string(),
            })
            .collect())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(skip(self)))]
    async fn describe_orderable_db_instance_options(
        &self,
        input: &OrderableOptionsInput,
        marker: Option<String>,
    ) -> Result<Page, Error> {
        debug!(
            engine = &input.engine,
            engine_version = input.engine_version.as_deref().unwrap_or("<none>"),
            instance_class = input.db_instance_class.as_deref().unwrap_or("<none>"),
            license_model = &input.license_model,
            vpc = input.vpc,
            marker = marker.as_deref().unwrap_or("<none>"),
            "Execute a request to describe orderable instance options"
        );

        let begin = Instant::now();
        let result = self
            .inner
            .describe_orderable_db_instance_options()
            .engine(&input.engine)
            .set_engine_version(input.engine_version.to_owned())
            .set_db_instance_class(input.db_instance_class.to_owned())
            .license_model(&input.license_model)
            .set_vpc(input.vpc)
            .set_marker(marker)
            .send()
            .await;

        measure("DescribeOrderableDBInstanceOptions", begin, &result);
        let output = result.map_err(|err| {
            Error::DescribeOrderableDbInstanceOptions(DisplayErrorContext(err).to_string().into())
        })?;

        Ok(Page {
            options: output
                .orderable_db_instance_options()
                .iter()
                .map(orderable_option)
                .collect(),
            marker: output.marker().map(ToString::to_string),
        })
    }
}
