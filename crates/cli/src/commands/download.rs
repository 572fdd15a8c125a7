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

use anyhow::Context;
use clap::{Args, Parser};
use figment::Figment;
use http::Uri;
use jwkpem_config::{
    is_cognito_identifier, ConfigurationSection, HttpConfig, KeySource, KeySourceConfig,
    RootConfig,
};
use jwkpem_http::{fetch_jwks, make_client};
use jwkpem_jose::JsonWebKeySet;
use jwkpem_keystore::convert_with;
use tracing::{info, info_span, Instrument};
use url::Url;

use super::OutputArgs;
use crate::util::{load_jwks, render, write_atomically};

fn cognito_identifier(value: &str) -> Result<String, String> {
    if is_cognito_identifier(value) {
        Ok(value.to_owned())
    } else {
        Err("only letters, digits, `-` and `_` are allowed".to_owned())
    }
}

/// Where to download the key set from. Overrides the `source` section of the
/// configuration.
#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// AWS region of the Cognito user pool
    #[arg(long, requires = "user_pool_id", value_parser = cognito_identifier)]
    region: Option<String>,

    /// ID of the Cognito user pool
    #[arg(long, requires = "region", value_parser = cognito_identifier)]
    user_pool_id: Option<String>,

    /// Base URL of an issuer publishing its keys under `/.well-known/jwks.json`
    #[arg(long, conflicts_with_all = ["region", "user_pool_id", "jwks_uri"])]
    issuer: Option<Url>,

    /// URL of the key set document
    #[arg(long, conflicts_with_all = ["region", "user_pool_id"])]
    jwks_uri: Option<Url>,
}

impl SourceArgs {
    fn into_config(self) -> Option<KeySourceConfig> {
        if let (Some(region), Some(user_pool_id)) = (self.region, self.user_pool_id) {
            return Some(KeySourceConfig::Cognito {
                region,
                user_pool_id,
            });
        }

        if let Some(issuer) = self.issuer {
            return Some(KeySourceConfig::Issuer { issuer });
        }

        self.jwks_uri
            .map(|jwks_uri| KeySourceConfig::JwksUri { jwks_uri })
    }
}

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

async fn download(url: &Url, config: &HttpConfig) -> anyhow::Result<JsonWebKeySet> {
    let uri: Uri = url.as_str().parse().context("invalid key set URL")?;
    let client = make_client(config.timeout(), &config.user_agent)
        .context("could not create the HTTP client")?;

    let jwks = fetch_jwks(client, &uri)
        .await
        .with_context(|| format!("could not download keys from {url}"))?;

    Ok(jwks)
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<()> {
        let span = info_span!("cli.download");

        async move {
            let mut config =
                RootConfig::extract(figment).context("could not load configuration")?;

            if let Some(source) = self.source.into_config() {
                config.source = Some(source);
            }
            self.output.apply(&mut config.output);

            let source = config
                .source
                .context("no key source given, set one in the configuration or on the command line")?;
            let path = config
                .output
                .path
                .context("no output path given, set one in the configuration or with --output")?;

            let jwks = match source.resolve().context("invalid key source")? {
                KeySource::Remote(url) => download(&url, &config.http).await?,
                KeySource::File(file) => load_jwks(file).await?,
            };

            let pems = convert_with(&jwks, config.output.format).context("could not convert keys")?;
            let document = render(&pems, config.output.pretty)?;

            info!(%path, keys = pems.len(), "Saving keys");
            write_atomically(&path, document.as_bytes()).await?;

            Ok(())
        }
        .instrument(span)
        .await
    }
}
