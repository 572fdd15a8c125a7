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

use bytes::Bytes;
use http::{Request, Response, StatusCode, Uri};
use http_body::Body;
use http_body_util::Empty;
use jwkpem_jose::{FormatError, JsonWebKeySet};
use thiserror::Error;
use tower::{Service, ServiceBuilder, ServiceExt};

use crate::{
    client::ClientInitError,
    layers::{
        expect_status::{self, ExpectStatusLayer},
        json_response::{self, JsonResponseLayer},
    },
    BoxError,
};

/// Error returned when a key set could not be downloaded
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not download the key set")]
    Network {
        #[source]
        inner: BoxError,
    },

    #[error("the key set endpoint answered with status {status_code}")]
    HttpStatus { status_code: StatusCode },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("could not create the HTTP client")]
    ClientInit(#[from] ClientInitError),
}

impl FetchError {
    fn network(inner: impl Into<BoxError>) -> Self {
        Self::Network {
            inner: inner.into(),
        }
    }
}

type LayerError<S, B> = json_response::Error<expect_status::Error<S>, B>;

impl<S, B> From<LayerError<S, B>> for FetchError
where
    S: Into<BoxError>,
    B: Into<BoxError>,
{
    fn from(e: LayerError<S, B>) -> Self {
        match e {
            json_response::Error::Service {
                inner: expect_status::Error::HttpStatus { status_code },
            } => Self::HttpStatus { status_code },
            json_response::Error::Service {
                inner: expect_status::Error::Service { inner },
            } => Self::network(inner),
            json_response::Error::Body { inner } => Self::network(inner),
            json_response::Error::Deserialize { inner } => {
                Self::Format(FormatError::InvalidJson { inner })
            }
        }
    }
}

/// Download and parse the key set published at `uri`.
///
/// Anything but a `200 OK` fails with [`FetchError::HttpStatus`], and the
/// body of such a response is never read.
///
/// # Errors
///
/// Returns an error if the request failed, if the server answered with an
/// unexpected status, or if the body is not a valid key set
#[tracing::instrument(name = "jwks.fetch", skip_all, fields(%uri))]
pub async fn fetch_jwks<S, B>(client: S, uri: &Uri) -> Result<JsonWebKeySet, FetchError>
where
    S: Service<Request<Empty<Bytes>>, Response = Response<B>>,
    S::Error: Into<BoxError> + 'static,
    S::Future: Send + 'static,
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    tracing::info!("Downloading keys");

    let mut request = Request::new(Empty::new());
    *request.uri_mut() = uri.clone();

    let response = ServiceBuilder::new()
        .layer(JsonResponseLayer::<JsonWebKeySet>::default())
        .layer(ExpectStatusLayer::exact(StatusCode::OK))
        .service(client)
        .oneshot(request)
        .await?;

    let jwks = response.into_body();
    tracing::info!(keys = jwks.len(), "Downloaded key set");

    Ok(jwks)
}
