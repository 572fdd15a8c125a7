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

use futures_util::FutureExt;
use http::{Request, Response, StatusCode};
use thiserror::Error;
use tower::{Layer, Service};

#[derive(Debug, Error)]
pub enum Error<S> {
    #[error(transparent)]
    Service { inner: S },

    #[error("request failed with status {status_code}")]
    HttpStatus { status_code: StatusCode },
}

impl<S> Error<S> {
    fn service(inner: S) -> Self {
        Self::Service { inner }
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Service { .. } => None,
            Self::HttpStatus { status_code } => Some(*status_code),
        }
    }
}

/// A layer that turns every response which doesn't have the expected status
/// code into an error.
///
/// The body of those responses is dropped without being read.
#[derive(Clone)]
pub struct ExpectStatus<S> {
    inner: S,
    expected: StatusCode,
}

impl<S> ExpectStatus<S> {
    pub const fn new(inner: S, expected: StatusCode) -> Self {
        Self { inner, expected }
    }
}

type MapResult<Res, E> = Box<dyn FnOnce(Result<Res, E>) -> Result<Res, Error<E>> + Send + 'static>;

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ExpectStatus<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
{
    type Error = Error<S::Error>;
    type Response = Response<ResBody>;
    type Future = futures_util::future::Map<S::Future, MapResult<S::Response, S::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Error::service)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let expected = self.expected;
        let mapper: MapResult<S::Response, S::Error> = Box::new(move |res| {
            let response = res.map_err(Error::service)?;
            let status_code = response.status();

            if status_code == expected {
                Ok(response)
            } else {
                Err(Error::HttpStatus { status_code })
            }
        });

        self.inner.call(request).map(mapper)
    }
}

#[derive(Clone, Copy)]
pub struct ExpectStatusLayer {
    expected: StatusCode,
}

impl ExpectStatusLayer {
    #[must_use]
    pub const fn exact(expected: StatusCode) -> Self {
        Self { expected }
    }
}

impl<S> Layer<S> for ExpectStatusLayer {
    type Service = ExpectStatus<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExpectStatus::new(inner, self.expected)
    }
}
