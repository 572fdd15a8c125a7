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
use camino::{Utf8Path, Utf8PathBuf};
use jwkpem_jose::JsonWebKeySet;
use jwkpem_keystore::KeyPemMap;
use rand::{distributions::Alphanumeric, Rng};
use tokio::{fs::File, io::AsyncWriteExt};

/// Read and parse a key set document
pub async fn load_jwks(path: &Utf8Path) -> anyhow::Result<JsonWebKeySet> {
    tracing::info!(%path, "Loading keys from file");

    let document = tokio::fs::read(path)
        .await
        .with_context(|| format!("could not read {path}"))?;

    JsonWebKeySet::from_slice(&document).with_context(|| format!("invalid key set in {path}"))
}

/// Serialize the key map as a JSON object
pub fn render(pems: &KeyPemMap, pretty: bool) -> anyhow::Result<String> {
    let document = if pretty {
        serde_json::to_string_pretty(pems)?
    } else {
        serde_json::to_string(pems)?
    };

    Ok(document)
}

/// A sibling of `path` which doesn't exist yet
fn temporary_path(path: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("{path} is not a file path"))?;

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    Ok(path.with_file_name(format!(".{file_name}.{suffix}.tmp")))
}

/// Replace the content of `path` in one step: the data goes to a temporary
/// file in the same directory, which is then renamed over `path`.
pub async fn write_atomically(path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
    let temporary = temporary_path(path)?;

    let written = async {
        let mut file = File::create(&temporary).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        tokio::fs::rename(&temporary, path).await
    }
    .await;

    if let Err(e) = written {
        // Best effort, the file might not even have been created
        let _ = tokio::fs::remove_file(&temporary).await;
        return Err(e).with_context(|| format!("could not write {path}"));
    }

    Ok(())
}

/// A new empty directory for tests to write into
#[cfg(test)]
pub fn scratch_dir() -> Utf8PathBuf {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect();

    let dir = Utf8PathBuf::try_from(std::env::temp_dir())
        .unwrap()
        .join(format!("jwkpem-test-{suffix}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
