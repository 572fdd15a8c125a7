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
use clap::Parser;
use figment::Figment;
use jwkpem_config::{ConfigurationSection, KeySource, KeySourceConfig, RootConfig};
use tracing::{info, info_span};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Dump the current config as YAML
    Dump,

    /// Check a config file
    Check,

    /// Print the JSON schema of the config file
    Schema,
}

impl Options {
    pub fn run(self, figment: &Figment) -> anyhow::Result<()> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Dump => {
                let _span = info_span!("cli.config.dump").entered();

                let config = RootConfig::extract(figment).context("could not load configuration")?;

                serde_yaml::to_writer(std::io::stdout(), &config)?;
            }

            SC::Check => {
                let _span = info_span!("cli.config.check").entered();

                let config = RootConfig::extract(figment).context("could not load configuration")?;

                match config.source.as_ref().map(KeySourceConfig::resolve).transpose()? {
                    Some(KeySource::Remote(url)) => info!(%url, "Keys will be downloaded"),
                    Some(KeySource::File(path)) => info!(%path, "Keys will be read from a file"),
                    None => info!("No key source configured"),
                }

                info!("Configuration file looks good");
            }

            SC::Schema => {
                let _span = info_span!("cli.config.schema").entered();

                let schema = schemars::schema_for!(RootConfig);

                serde_json::to_writer_pretty(std::io::stdout(), &schema)?;
            }
        }

        Ok(())
    }
}
