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

use std::sync::Arc;

use tracing::debug;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Console settings, read once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Namespace placed in page-load templates.
    pub default_namespace: String,
    /// Origin of the editor UI allowed by CORS.
    pub allowed_origin: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Reads `CONSOLE_DEFAULT_NAMESPACE` and `CONSOLE_ALLOWED_ORIGIN`, falling
    /// back to the defaults for unset or blank values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            default_namespace: read("CONSOLE_DEFAULT_NAMESPACE", DEFAULT_NAMESPACE),
            allowed_origin: read("CONSOLE_ALLOWED_ORIGIN", DEFAULT_ALLOWED_ORIGIN),
        };
        debug!(?config, "loaded console config");
        config
    }
}

/// Console 应用状态
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub config: Arc<ConsoleConfig>,
}

impl AppState {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
