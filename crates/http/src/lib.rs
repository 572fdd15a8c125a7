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

//! [`tower`] layers and a [`hyper`] client to download JSON Web Key Sets

#![allow(clippy::module_name_repetitions)]

mod client;
mod fetch;
mod layers {
    pub(crate) mod expect_status;
    pub(crate) mod json_response;
}

pub use self::{
    client::{make_client, ClientInitError, HttpClient},
    fetch::{fetch_jwks, FetchError},
    layers::{
        expect_status::{Error as ExpectStatusError, ExpectStatus, ExpectStatusLayer},
        json_response::{Error as JsonResponseError, JsonResponse, JsonResponseLayer},
    },
};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
