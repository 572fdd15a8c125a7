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

use std::io::Write;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use figment::Figment;
use jwkpem_config::{ConfigurationSectionExt, OutputConfig};
use jwkpem_keystore::convert_with;
use tracing::{info, info_span, Instrument};

use super::OutputArgs;
use crate::util::{load_jwks, render, write_atomically};

#[derive(Parser, Debug)]
pub(super) struct Options {
    /// Path to the key set document
    #[arg(short, long)]
    input: Utf8PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<()> {
        let span = info_span!("cli.convert", input = %self.input);

        async move {
            let mut config =
                OutputConfig::extract_or_default(figment).context("could not load configuration")?;
            self.output.apply(&mut config);

            let jwks = load_jwks(&self.input).await?;
            let pems = convert_with(&jwks, config.format).context("could not convert keys")?;
            let document = render(&pems, config.pretty)?;

            if let Some(path) = config.path {
                info!(%path, keys = pems.len(), "Saving keys");
                write_atomically(&path, document.as_bytes()).await?;
            } else {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{document}")?;
                stdout.flush()?;
            }

            Ok(())
        }
        .instrument(span)
        .await
    }
}
