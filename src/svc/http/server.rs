//! # Server module
//!
//! This module provides the server implementation based on the crate
//! [`hyper`].

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use hyper::{
    service::{make_service_fn, service_fn},
    Server,
};
use tracing::{error, info};

use crate::svc::{docdb::Api, http::router};

// -----------------------------------------------------------------------------
// Error

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to bind on socket '{0}', {1}")]
    Bind(SocketAddr, hyper::Error),
    #[error("failed to serve on socket '{0}', {1}")]
    Serve(SocketAddr, hyper::Error),
}

// -----------------------------------------------------------------------------
// helpers

/// serves requests on the given address until a termination signal is received
#[cfg_attr(feature = "trace", tracing::instrument(skip(api)))]
pub async fn serve<A>(api: Arc<A>, addr: SocketAddr) -> Result<(), Error>
where
    A: Api + 'static,
{
    let service = make_service_fn(move |_conn| {
        let api = api.to_owned();

        async move {
            Ok::<_, Infallible>(service_fn(move |req| router(api.to_owned(), req)))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|err| Error::Bind(addr, err))?
        .serve(service);

    info!(addr = addr.to_string(), "Begin to listen on address");
    server
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!(
                    error = err.to_string(),
                    "could not wait for the termination signal"
                );
            }

            info!("Receive termination signal, halting the server");
        })
        .await
        .map_err(|err| Error::Serve(addr, err))
}
