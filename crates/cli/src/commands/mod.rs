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

use camino::Utf8PathBuf;
use clap::{Args, Parser, ValueEnum};
use figment::Figment;
use jwkpem_config::{OutputConfig, PemFormat};

mod config;
mod convert;
mod download;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Download a key set and save its RSA keys as PEM
    Download(self::download::Options),

    /// Convert a key set stored in a local file
    Convert(self::convert::Options),

    /// Configuration-related commands
    Config(self::config::Options),
}

#[derive(Parser, Debug)]
#[command(name = "jwkpem", version, about)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Subcommand,
}

impl Options {
    pub async fn run(self) -> anyhow::Result<()> {
        use Subcommand as S;

        let figment = self.figment();
        match self.subcommand {
            S::Download(c) => c.run(&figment).await,
            S::Convert(c) => c.run(&figment).await,
            S::Config(c) => c.run(&figment),
        }
    }

    /// Get a [`Figment`] instance with the configuration loaded
    pub fn figment(&self) -> Figment {
        jwkpem_config::figment(&self.config)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    /// X.509 `SubjectPublicKeyInfo` (`PUBLIC KEY`)
    Spki,

    /// PKCS#1 `RSAPublicKey` (`RSA PUBLIC KEY`)
    Pkcs1,
}

impl From<FormatArg> for PemFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Spki => Self::Spki,
            FormatArg::Pkcs1 => Self::Pkcs1,
        }
    }
}

/// Output flags shared by the commands writing key maps
#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Where to write the JSON file mapping key IDs to PEM documents
    #[arg(short, long)]
    output: Option<Utf8PathBuf>,

    /// Which PEM document to produce for each key
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,
}

impl OutputArgs {
    /// Override the configuration with the flags which were set
    fn apply(self, config: &mut OutputConfig) {
        if let Some(output) = self.output {
            config.path = Some(output);
        }

        if let Some(format) = self.format {
            config.format = format.into();
        }

        if self.pretty {
            config.pretty = true;
        }
    }
}
