// Copyright 2025 RustFS Team
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

use std::io::IsTerminal;
use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::types::descriptor::WorkloadDescriptor;
use crate::types::kind::WorkloadKind;

pub mod console;
pub mod converter;
pub mod types;

#[cfg(test)]
mod tests;

pub use converter::{ParsedManifest, form_data_to_yaml, parse_manifest, yaml_to_form_data};

/// Logs go to stderr so rendered manifests on stdout stay clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

/// Renders a descriptor (JSON or YAML, from `file` or stdin) as a manifest.
pub async fn render(
    kind: WorkloadKind,
    file: Option<String>,
    output: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(file).await?;
    // JSON is a subset of YAML, so one parser covers both.
    let descriptor: WorkloadDescriptor = serde_yaml_ng::from_str(&input)?;
    let yaml = form_data_to_yaml(kind, &descriptor)?;

    write_output(output, yaml.as_bytes()).await?;
    Ok(())
}

/// Reads a manifest and prints the descriptor as pretty JSON.
pub async fn parse(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let input = read_input(file).await?;
    let parsed = parse_manifest(&input)?;
    if let Some(kind) = parsed.kind {
        info!(%kind, "detected workload kind");
    }

    let mut json = serde_json::to_string_pretty(&parsed.descriptor)?;
    json.push('\n');
    write_output(None, json.as_bytes()).await?;
    Ok(())
}

/// Prints the manifest of the page-load template for `kind`.
pub async fn template(kind: WorkloadKind, namespace: String) -> Result<(), Box<dyn std::error::Error>> {
    let yaml = form_data_to_yaml(kind, &WorkloadDescriptor::template(kind, &namespace))?;
    write_output(None, yaml.as_bytes()).await?;
    Ok(())
}

pub async fn run_console(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    console::server::run(port).await
}

async fn read_input(file: Option<String>) -> Result<String, std::io::Error> {
    let mut reader: Pin<Box<dyn AsyncRead + Send>> = if let Some(file) = file {
        Box::pin(tokio::fs::File::open(file).await?)
    } else {
        Box::pin(tokio::io::stdin())
    };

    let mut input = String::new();
    reader.read_to_string(&mut input).await?;
    Ok(input)
}

async fn write_output(file: Option<String>, bytes: &[u8]) -> Result<(), std::io::Error> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    writer.write_all(bytes).await?;
    writer.flush().await
}
