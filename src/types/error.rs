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

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid YAML: {}", source))]
    InvalidYaml { source: serde_yaml_ng::Error },

    #[snafu(display("manifest is empty"))]
    EmptyManifest,

    #[snafu(display("manifest root must be a mapping, found {}", found))]
    NotAnObject { found: String },

    #[snafu(display("failed to render {} manifest: {}", kind, source))]
    RenderManifest {
        kind: String,
        source: serde_yaml_ng::Error,
    },
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by rendering.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Error::RenderManifest { .. })
    }
}
