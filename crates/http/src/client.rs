// Copyright 2024 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use http::{
    header::{InvalidHeaderValue, USER_AGENT},
    HeaderValue, Request, Response,
};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tower::{timeout::TimeoutLayer, util::BoxCloneService, ServiceBuilder, ServiceExt};
use tower_http::set_header::SetRequestHeaderLayer;

use crate::BoxError;

/// The client used to download key sets
pub type HttpClient = BoxCloneService<Request<Empty<Bytes>>, Response<Incoming>, BoxError>;

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid user agent")]
    UserAgent(#[from] InvalidHeaderValue),

    #[error("could not set up TLS")]
    Tls(#[from] rustls::Error),
}

fn make_tls_config() -> Result<rustls::ClientConfig, rustls::Error> {
    let roots = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let tls_config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(tls_config)
}

/// Create a HTTP & HTTPS client, which sends the given `User-Agent` and
/// gives up on requests after `timeout`
///
/// # Errors
///
/// Returns an error if the user agent is not a valid header value, or if the
/// TLS configuration could not be built
pub fn make_client(timeout: Duration, user_agent: &str) -> Result<HttpClient, ClientInitError> {
    let user_agent = HeaderValue::from_str(user_agent)?;
    let tls_config = make_tls_config()?;

    let mut http = HttpConnector::new();
    http.enforce_http(false);

    let https = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    let client: Client<_, Empty<Bytes>> = Client::builder(TokioExecutor::new()).build(https);

    let client = ServiceBuilder::new()
        .layer(SetRequestHeaderLayer::overriding(USER_AGENT, user_agent))
        .layer(TimeoutLayer::new(timeout))
        .service(client)
        .boxed_clone();

    Ok(client)
}
