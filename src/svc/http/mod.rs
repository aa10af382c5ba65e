//! # HTTP module
//!
//! This module exposes the orderable instance resolution over HTTP with
//! health and telemetry endpoints next to it.

use std::{collections::BTreeMap, sync::Arc, time::Instant};

use hyper::{
    body::HttpBody,
    header::{self, HeaderValue},
    Body, Method, Request, Response, StatusCode,
};
#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use prometheus::{opts, register_counter_vec, CounterVec};
use serde::Serialize;
use tracing::info;

use crate::svc::{
    docdb::Api,
    orderable::{self, Filters},
};

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod server;

// -----------------------------------------------------------------------------
// Constants

pub const READ_PATH: &str = "/v1/orderable-db-instance";
pub const UNKNOWN_ROUTE: &str = "<unknown>";
pub const MAX_BODY_SIZE: usize = 64 * 1024;

// -----------------------------------------------------------------------------
// Telemetry

#[cfg(feature = "metrics")]
static SERVER_REQUEST_SUCCESS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_server_request_success",
            "number of successful request handled by the server",
        ),
        &["method", "path", "status"]
    )
    .expect("metrics 'docdb_orderable_server_request_success' to not be already registered")
});

#[cfg(feature = "metrics")]
static SERVER_REQUEST_FAILURE: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_server_request_failure",
            "number of failed request handled by the server",
        ),
        &["method", "path", "status"]
    )
    .expect("metrics 'docdb_orderable_server_request_failure' to not be already registered")
});

#[cfg(feature = "metrics")]
static SERVER_REQUEST_DURATION: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        opts!(
            "docdb_orderable_server_request_duration",
            "duration of request handled by the server",
        ),
        &["method", "path", "status", "unit"]
    )
    .expect("metrics 'docdb_orderable_server_request_duration' to not be already registered")
});

// -----------------------------------------------------------------------------
// Error enum

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(feature = "metrics")]
    #[error("{0}")]
    Metrics(metrics::Error),
    #[error("failed to aggregate body, {0}")]
    BodyAggregation(hyper::Error),
    #[error("request body is larger than {0} bytes")]
    PayloadTooLarge(usize),
    #[error("failed to deserialize filters, {0}")]
    Deserialize(serde_json::Error),
    #[error("failed to serialize payload, {0}")]
    Serialize(serde_json::Error),
    #[error("{0}")]
    Orderable(orderable::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Deserialize(_) | Self::Orderable(orderable::Error::Conflict(_, _)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Orderable(orderable::Error::NotFound)
            | Self::Orderable(orderable::Error::NoDefaultEngineVersion(_)) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Orderable(orderable::Error::Ambiguous(_)) => StatusCode::CONFLICT,
            Self::Orderable(orderable::Error::DefaultEngineVersion(_))
            | Self::Orderable(orderable::Error::OrderableOptions(_)) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// -----------------------------------------------------------------------------
// Helper methods

fn json<T>(status: StatusCode, payload: &T) -> Result<Response<Body>, Error>
where
    T: Serialize,
{
    let mut res = Response::default();

    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    *res.status_mut() = status;
    *res.body_mut() = Body::from(serde_json::to_vec(payload).map_err(Error::Serialize)?);

    Ok(res)
}

/// returns the body of the request, it fails as soon as the body is known to
/// exceed [`MAX_BODY_SIZE`]
async fn collect(mut body: Body) -> Result<Vec<u8>, Error> {
    let hint = body.size_hint();
    if hint.lower() > MAX_BODY_SIZE as u64 {
        return Err(Error::PayloadTooLarge(MAX_BODY_SIZE));
    }

    let capacity = hint.upper().unwrap_or(0).min(MAX_BODY_SIZE as u64);
    let mut buf = Vec::with_capacity(capacity as usize);
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(Error::BodyAggregation)?;
        if buf.len() + chunk.len() > MAX_BODY_SIZE {
            return Err(Error::PayloadTooLarge(MAX_BODY_SIZE));
        }

        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}

#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn router<A>(api: Arc<A>, req: Request<Body>) -> Result<Response<Body>, Error>
where
    A: Api,
{
    let begin = Instant::now();
    let method = req.method().to_owned();
    let path = req.uri().path().to_string();
    let host = match req.uri().host() {
        Some(host) => host.to_string(),
        None => req
            .headers()
            .get(header::HOST)
            .map(|header| String::from_utf8_lossy(header.as_bytes()).to_string())
            .unwrap_or_else(|| String::from("<none>")),
    };

    // -------------------------------------------------------------------------
    // Basic routing, the route labels metrics so unknown paths share a series
    let (route, result) = match (&method, path.as_str()) {
        (&Method::GET, "/healthz") => ("/healthz", healthz(&req).await),
        #[cfg(feature = "metrics")]
        (&Method::GET, "/metrics") => (
            "/metrics",
            metrics::handler(&req).await.map_err(Error::Metrics),
        ),
        (&Method::POST, READ_PATH) => (READ_PATH, read(api.as_ref(), req).await),
        _ => (UNKNOWN_ROUTE, not_found(&req).await),
    };

    // -------------------------------------------------------------------------
    // Recover error
    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    let (res, succeed) = match result {
        Ok(res) => (res, true),
        Err(err) => {
            let mut map = BTreeMap::new();
            map.insert("error".to_string(), err.to_string());

            (json(err.status(), &map)?, false)
        }
    };

    let duration = Instant::now().duration_since(begin).as_micros();

    info!(
        method = method.as_str(),
        host = host,
        path = path,
        route = route,
        status = res.status().as_u16(),
        duration = duration,
        "Receive request"
    );

    #[cfg(feature = "metrics")]
    {
        let status = res.status().as_u16().to_string();
        let counter = if succeed {
            &SERVER_REQUEST_SUCCESS
        } else {
            &SERVER_REQUEST_FAILURE
        };

        counter
            .with_label_values(&[method.as_str(), route, &status])
            .inc();

        SERVER_REQUEST_DURATION
            .with_label_values(&[method.as_str(), route, &status, "us"])
            .inc_by(duration as f64);
    }

    Ok(res)
}

#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn read<A>(api: &A, req: Request<Body>) -> Result<Response<Body>, Error>
where
    A: Api,
{
    let buf = collect(req.into_body()).await?;

    let filters = if buf.is_empty() {
        Filters::default()
    } else {
        serde_json::from_slice::<Filters>(&buf).map_err(Error::Deserialize)?
    };

    filters.validate().map_err(Error::Orderable)?;

    let instance = orderable::read(api, &filters)
        .await
        .map_err(Error::Orderable)?;

    json(StatusCode::OK, &instance)
}

#[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
pub async fn healthz(_req: &Request<Body>) -> Result<Response<Body>, Error> {
    let mut res = Response::default();

    *res.status_mut() = StatusCode::NO_CONTENT;

    Ok(res)
}

#[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
pub async fn not_found(_req: &Request<Body>) -> Result<Response<Body>, Error> {
    let mut res = Response::default();

    *res.status_mut() = StatusCode::NOT_FOUND;

    Ok(res)
}
