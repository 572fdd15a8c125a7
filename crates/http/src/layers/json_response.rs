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

use std::{marker::PhantomData, task::Poll};

use futures_util::future::BoxFuture;
use http::{header::ACCEPT, HeaderValue, Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tower::{Layer, Service};

#[derive(Debug, Error)]
pub enum Error<ServiceError, BodyError> {
    /// An error from the inner service.
    #[error(transparent)]
    Service { inner: ServiceError },

    #[error("could not read the response body")]
    Body {
        #[source]
        inner: BodyError,
    },

    #[error("could not parse JSON payload")]
    Deserialize {
        #[source]
        inner: serde_json::Error,
    },
}

impl<S, B> Error<S, B> {
    fn service(inner: S) -> Self {
        Self::Service { inner }
    }

    fn body(inner: B) -> Self {
        Self::Body { inner }
    }

    fn deserialize(inner: serde_json::Error) -> Self {
        Self::Deserialize { inner }
    }
}

/// Reads the whole response body and parses it as JSON
#[derive(Clone)]
pub struct JsonResponse<S, T> {
    inner: S,
    _t: PhantomData<T>,
}

impl<S, T> JsonResponse<S, T> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            _t: PhantomData,
        }
    }
}

impl<S, T, ReqBody, ResBody> Service<Request<ReqBody>> for JsonResponse<S, T>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: Body + Send + 'static,
    ResBody::Data: Send,
    T: DeserializeOwned + Send + 'static,
{
    type Error = Error<S::Error, ResBody::Error>;
    type Response = Response<T>;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Error::service)
    }

    fn call(&mut self, mut request: Request<ReqBody>) -> Self::Future {
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = self.inner.call(request);

        let fut = async {
            let response = inner.await.map_err(Error::service)?;
            let (parts, body) = response.into_parts();

            let body = body.collect().await.map_err(Error::body)?.to_bytes();
            tracing::trace!(bytes = body.len(), "Received response body");

            let body = serde_json::from_slice(&body).map_err(Error::deserialize)?;

            Ok(Response::from_parts(parts, body))
        };

        Box::pin(fut)
    }
}

#[derive(Clone, Copy)]
pub struct JsonResponseLayer<T> {
    _t: PhantomData<T>,
}

impl<T> Default for JsonResponseLayer<T> {
    fn default() -> Self {
        Self { _t: PhantomData }
    }
}

impl<S, T> Layer<S> for JsonResponseLayer<T> {
    type Service = JsonResponse<S, T>;

    fn layer(&self, inner: S) -> Self::Service {
        JsonResponse::new(inner)
    }
}
