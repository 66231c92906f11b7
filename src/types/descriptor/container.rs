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

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::{Deserialize, Serialize};

use super::{lines_text, split_lines};
use crate::types::k8s::{ImagePullPolicy, ProbeScheme, Protocol};

const DEFAULT_HTTP_PROBE_PATH: &str = "/";
const DEFAULT_HTTP_PROBE_PORT: i32 = 80;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerForm {
    pub name: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_policy: Option<ImagePullPolicy>,

    /// One token per line.
    #[serde(deserialize_with = "lines_text")]
    pub command: String,
    /// One token per line.
    #[serde(deserialize_with = "lines_text")]
    pub args: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<PortForm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVarForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceForm>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMountForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<LifecycleForm>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<ProbeForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<ProbeForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_probe: Option<ProbeForm>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stdin: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tty: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PortForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub container_port: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EnvVarForm {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_from: Option<EnvSource>,
}

/// Where an environment variable takes its value from when it is not a
/// literal. Serialized exactly like a Kubernetes `valueFrom` object.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EnvSource {
    ConfigMapKeyRef { name: String, key: String },
    SecretKeyRef { name: String, key: String },
    #[serde(rename_all = "camelCase")]
    FieldRef { field_path: String },
    #[serde(rename_all = "camelCase")]
    ResourceFieldRef {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        container_name: Option<String>,
        resource: String,
    },
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantities>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantities>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ResourceQuantities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(rename = "nvidia.com/gpu", skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeMountForm {
    pub name: String,
    pub mount_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LifecycleForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_start: Option<LifecycleHookForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_stop: Option<LifecycleHookForm>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct LifecycleHookForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecForm>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ExecForm {
    /// One token per line.
    #[serde(deserialize_with = "lines_text")]
    pub command: String,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProbeType {
    #[default]
    HttpGet,
    Exec,
    TcpSocket,
}

/// A health check as held by the form. Only the sub-object named by
/// `probe_type` is meaningful; the others may be left over from earlier edits.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeForm {
    /// Form-only switch; a disabled probe is not written to the manifest.
    pub enabled: bool,
    #[serde(rename = "type")]
    pub probe_type: ProbeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_socket: Option<TcpSocketForm>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_delay_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct HttpGetForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<IntOrString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<ProbeScheme>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TcpSocketForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<IntOrString>,
}

/// The one action a probe performs.
#[derive(Clone, Debug, PartialEq)]
pub enum ProbeHandler {
    HttpGet {
        path: String,
        port: IntOrString,
        scheme: Option<ProbeScheme>,
    },
    Exec {
        command: Vec<String>,
    },
    TcpSocket {
        port: IntOrString,
    },
}

impl ProbeForm {
    /// Resolves the selected probe type into its handler. Returns `None` when
    /// the selected type has nothing usable to run.
    pub fn handler(&self) -> Option<ProbeHandler> {
        match self.probe_type {
            ProbeType::HttpGet => self.http_get.as_ref().map(|http| ProbeHandler::HttpGet {
                path: http
                    .path
                    .clone()
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| DEFAULT_HTTP_PROBE_PATH.to_string()),
                port: http
                    .port
                    .clone()
                    .unwrap_or(IntOrString::Int(DEFAULT_HTTP_PROBE_PORT)),
                scheme: http.scheme,
            }),
            ProbeType::Exec => self
                .exec
                .as_ref()
                .map(|exec| split_lines(&exec.command))
                .filter(|command| !command.is_empty())
                .map(|command| ProbeHandler::Exec { command }),
            ProbeType::TcpSocket => self
                .tcp_socket
                .as_ref()
                .and_then(|tcp| tcp.port.clone())
                .map(|port| ProbeHandler::TcpSocket { port }),
        }
    }

    pub fn has_timing(&self) -> bool {
        self.initial_delay_seconds.is_some()
            || self.period_seconds.is_some()
            || self.timeout_seconds.is_some()
            || self.success_threshold.is_some()
            || self.failure_threshold.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(probe_type: ProbeType) -> ProbeForm {
        ProbeForm {
            enabled: true,
            probe_type,
            http_get: Some(HttpGetForm {
                path: Some("/healthz".to_string()),
                port: Some(IntOrString::Int(8080)),
                scheme: None,
            }),
            exec: Some(ExecForm {
                command: "cat\n/tmp/ready".to_string(),
            }),
            tcp_socket: Some(TcpSocketForm {
                port: Some(IntOrString::String("http".to_string())),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_handler_follows_selected_type() {
        assert_eq!(
            probe(ProbeType::Exec).handler(),
            Some(ProbeHandler::Exec {
                command: vec!["cat".to_string(), "/tmp/ready".to_string()]
            })
        );
        assert_eq!(
            probe(ProbeType::TcpSocket).handler(),
            Some(ProbeHandler::TcpSocket {
                port: IntOrString::String("http".to_string())
            })
        );
        assert!(matches!(
            probe(ProbeType::HttpGet).handler(),
            Some(ProbeHandler::HttpGet { ref path, .. }) if path == "/healthz"
        ));
    }

    #[test]
    fn test_http_handler_fills_defaults() {
        let form = ProbeForm {
            enabled: true,
            http_get: Some(HttpGetForm::default()),
            ..Default::default()
        };

        assert_eq!(
            form.handler(),
            Some(ProbeHandler::HttpGet {
                path: "/".to_string(),
                port: IntOrString::Int(80),
                scheme: None,
            })
        );
    }

    #[test]
    fn test_blank_exec_command_has_no_handler() {
        let form = ProbeForm {
            enabled: true,
            probe_type: ProbeType::Exec,
            exec: Some(ExecForm {
                command: "  \n\n".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(form.handler(), None);
    }

    #[test]
    fn test_env_source_uses_value_from_shape() {
        let source: EnvSource =
            serde_json::from_str(r#"{"fieldRef": {"fieldPath": "metadata.name"}}"#)
                .expect("field ref");
        assert_eq!(
            source,
            EnvSource::FieldRef {
                field_path: "metadata.name".to_string()
            }
        );

        let json = serde_json::to_value(EnvSource::ResourceFieldRef {
            container_name: None,
            resource: "limits.cpu".to_string(),
        })
        .expect("serialize");
        assert_eq!(json["resourceFieldRef"]["resource"], "limits.cpu");
        assert!(json["resourceFieldRef"].get("containerName").is_none());
    }
}
