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

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::types::descriptor::{
    ContainerForm, EnvSource, EnvVarForm, LifecycleHookForm, ProbeForm, ProbeHandler,
    ResourceForm, ResourceQuantities, split_lines,
};
use crate::types::k8s::Protocol;

const DEFAULT_CONTAINER_NAME: &str = "main";
const DEFAULT_IMAGE: &str = "nginx:latest";
const GPU_RESOURCE: &str = "nvidia.com/gpu";

pub(super) fn build_container(form: &ContainerForm) -> corev1::Container {
    let lifecycle = form.lifecycle.as_ref().and_then(|lifecycle| {
        let post_start = lifecycle.post_start.as_ref().and_then(build_hook);
        let pre_stop = lifecycle.pre_stop.as_ref().and_then(build_hook);
        (post_start.is_some() || pre_stop.is_some()).then(|| corev1::Lifecycle {
            post_start,
            pre_stop,
            ..Default::default()
        })
    });

    corev1::Container {
        name: non_empty(&form.name).unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
        image: Some(non_empty(&form.image).unwrap_or_else(|| DEFAULT_IMAGE.to_string())),
        image_pull_policy: form.image_pull_policy.as_ref().map(ToString::to_string),
        command: non_empty_vec(split_lines(&form.command)),
        args: non_empty_vec(split_lines(&form.args)),
        working_dir: form.working_dir.as_deref().and_then(non_empty),
        ports: non_empty_vec(
            form.ports
                .iter()
                .map(|port| corev1::ContainerPort {
                    name: port.name.as_deref().and_then(non_empty),
                    container_port: port.container_port,
                    // TCP is the API default and is left implicit
                    protocol: port
                        .protocol
                        .filter(|protocol| *protocol != Protocol::Tcp)
                        .map(|protocol| protocol.to_string()),
                    ..Default::default()
                })
                .collect(),
        ),
        env: non_empty_vec(form.env.iter().map(build_env_var).collect()),
        resources: form.resources.as_ref().and_then(build_resources),
        volume_mounts: non_empty_vec(
            form.volume_mounts
                .iter()
                .map(|mount| corev1::VolumeMount {
                    name: mount.name.clone(),
                    mount_path: mount.mount_path.clone(),
                    sub_path: mount.sub_path.as_deref().and_then(non_empty),
                    read_only: mount.read_only.then_some(true),
                    ..Default::default()
                })
                .collect(),
        ),
        lifecycle,
        startup_probe: form.startup_probe.as_ref().and_then(build_probe),
        liveness_probe: form.liveness_probe.as_ref().and_then(build_probe),
        readiness_probe: form.readiness_probe.as_ref().and_then(build_probe),
        stdin: form.stdin.then_some(true),
        tty: form.tty.then_some(true),
        ..Default::default()
    }
}

fn build_env_var(form: &EnvVarForm) -> corev1::EnvVar {
    match &form.value_from {
        Some(source) => corev1::EnvVar {
            name: form.name.clone(),
            value_from: Some(build_env_source(source)),
            ..Default::default()
        },
        None => corev1::EnvVar {
            name: form.name.clone(),
            value: Some(form.value.clone().unwrap_or_default()),
            ..Default::default()
        },
    }
}

fn build_env_source(source: &EnvSource) -> corev1::EnvVarSource {
    match source {
        EnvSource::ConfigMapKeyRef { name, key } => corev1::EnvVarSource {
            config_map_key_ref: Some(corev1::ConfigMapKeySelector {
                name: name.clone(),
                key: key.clone(),
                optional: None,
            }),
            ..Default::default()
        },
        EnvSource::SecretKeyRef { name, key } => corev1::EnvVarSource {
            secret_key_ref: Some(corev1::SecretKeySelector {
                name: name.clone(),
                key: key.clone(),
                optional: None,
            }),
            ..Default::default()
        },
        EnvSource::FieldRef { field_path } => corev1::EnvVarSource {
            field_ref: Some(corev1::ObjectFieldSelector {
                field_path: field_path.clone(),
                ..Default::default()
            }),
            ..Default::default()
        },
        EnvSource::ResourceFieldRef {
            container_name,
            resource,
        } => corev1::EnvVarSource {
            resource_field_ref: Some(corev1::ResourceFieldSelector {
                container_name: container_name.clone(),
                resource: resource.clone(),
                ..Default::default()
            }),
            ..Default::default()
        },
    }
}

fn build_resources(form: &ResourceForm) -> Option<corev1::ResourceRequirements> {
    let requests = form.requests.as_ref().and_then(quantities);
    let limits = form.limits.as_ref().and_then(quantities);
    if requests.is_none() && limits.is_none() {
        return None;
    }

    Some(corev1::ResourceRequirements {
        requests,
        limits,
        ..Default::default()
    })
}

fn quantities(form: &ResourceQuantities) -> Option<BTreeMap<String, Quantity>> {
    let map: BTreeMap<String, Quantity> = [
        ("cpu", &form.cpu),
        ("memory", &form.memory),
        (GPU_RESOURCE, &form.gpu),
    ]
    .into_iter()
    .filter_map(|(name, value)| {
        value
            .as_deref()
            .and_then(non_empty)
            .map(|value| (name.to_string(), Quantity(value)))
    })
    .collect();

    (!map.is_empty()).then_some(map)
}

fn build_hook(form: &LifecycleHookForm) -> Option<corev1::LifecycleHandler> {
    let command = form.exec.as_ref().map(|exec| split_lines(&exec.command))?;
    if command.is_empty() {
        return None;
    }

    Some(corev1::LifecycleHandler {
        exec: Some(corev1::ExecAction {
            command: Some(command),
        }),
        ..Default::default()
    })
}

/// A disabled probe is dropped whatever its sub-objects hold. An enabled one
/// carries at most the handler of its selected type.
pub(super) fn build_probe(form: &ProbeForm) -> Option<corev1::Probe> {
    if !form.enabled {
        return None;
    }

    let handler = form.handler();
    if handler.is_none() && !form.has_timing() {
        return None;
    }

    let mut probe = corev1::Probe {
        initial_delay_seconds: form.initial_delay_seconds,
        period_seconds: form.period_seconds,
        timeout_seconds: form.timeout_seconds,
        success_threshold: form.success_threshold,
        failure_threshold: form.failure_threshold,
        ..Default::default()
    };

    match handler {
        Some(ProbeHandler::HttpGet { path, port, scheme }) => {
            probe.http_get = Some(corev1::HTTPGetAction {
                path: Some(path),
                port,
                scheme: scheme.map(|scheme| scheme.to_string()),
                ..Default::default()
            });
        }
        Some(ProbeHandler::Exec { command }) => {
            probe.exec = Some(corev1::ExecAction {
                command: Some(command),
            });
        }
        Some(ProbeHandler::TcpSocket { port }) => {
            probe.tcp_socket = Some(corev1::TCPSocketAction { port, host: None });
        }
        None => {}
    }

    Some(probe)
}

pub(super) fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub(super) fn non_empty_vec<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::descriptor::{
        ExecForm, HttpGetForm, LifecycleForm, PortForm, ProbeType, TcpSocketForm,
        VolumeMountForm,
    };
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

    #[test]
    fn test_container_defaults_and_command_split() {
        let container = build_container(&ContainerForm {
            command: "/bin/sh\n-c\necho hi".to_string(),
            ..Default::default()
        });

        assert_eq!(container.name, "main");
        assert_eq!(container.image.as_deref(), Some("nginx:latest"));
        assert_eq!(
            container.command,
            Some(vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                "echo hi".to_string()
            ])
        );
        assert_eq!(container.args, None, "empty args must be omitted");
    }

    #[test]
    fn test_tcp_protocol_is_implicit() {
        let container = build_container(&ContainerForm {
            ports: vec![
                PortForm {
                    name: Some("http".to_string()),
                    container_port: 80,
                    protocol: Some(Protocol::Tcp),
                },
                PortForm {
                    name: None,
                    container_port: 53,
                    protocol: Some(Protocol::Udp),
                },
            ],
            ..Default::default()
        });

        let ports = container.ports.expect("ports");
        assert_eq!(ports[0].protocol, None);
        assert_eq!(ports[1].protocol.as_deref(), Some("UDP"));
    }

    #[test]
    fn test_env_literal_defaults_to_empty_string() {
        let container = build_container(&ContainerForm {
            env: vec![
                EnvVarForm {
                    name: "EMPTY".to_string(),
                    ..Default::default()
                },
                EnvVarForm {
                    name: "POD".to_string(),
                    value: Some("ignored".to_string()),
                    value_from: Some(EnvSource::FieldRef {
                        field_path: "metadata.name".to_string(),
                    }),
                },
            ],
            ..Default::default()
        });

        let env = container.env.expect("env");
        assert_eq!(env[0].value.as_deref(), Some(""));
        assert_eq!(env[1].value, None);
        assert_eq!(
            env[1]
                .value_from
                .as_ref()
                .and_then(|source| source.field_ref.as_ref())
                .map(|field| field.field_path.as_str()),
            Some("metadata.name")
        );
    }

    #[test]
    fn test_resources_skip_blank_quantities() {
        let container = build_container(&ContainerForm {
            resources: Some(ResourceForm {
                requests: Some(ResourceQuantities {
                    cpu: Some(String::new()),
                    ..Default::default()
                }),
                limits: Some(ResourceQuantities {
                    memory: Some("512Mi".to_string()),
                    gpu: Some("1".to_string()),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        });

        let resources = container.resources.expect("resources");
        assert_eq!(resources.requests, None);
        let limits = resources.limits.expect("limits");
        assert_eq!(limits.get("memory"), Some(&Quantity("512Mi".to_string())));
        assert_eq!(limits.get("nvidia.com/gpu"), Some(&Quantity("1".to_string())));
        assert!(!limits.contains_key("cpu"));
    }

    #[test]
    fn test_read_only_mount_flag_only_when_set() {
        let container = build_container(&ContainerForm {
            volume_mounts: vec![
                VolumeMountForm {
                    name: "config".to_string(),
                    mount_path: "/etc/app".to_string(),
                    read_only: true,
                    ..Default::default()
                },
                VolumeMountForm {
                    name: "data".to_string(),
                    mount_path: "/data".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        let mounts = container.volume_mounts.expect("mounts");
        assert_eq!(mounts[0].read_only, Some(true));
        assert_eq!(mounts[1].read_only, None);
    }

    #[test]
    fn test_lifecycle_hooks_need_a_command() {
        let container = build_container(&ContainerForm {
            lifecycle: Some(LifecycleForm {
                post_start: Some(LifecycleHookForm {
                    exec: Some(ExecForm {
                        command: String::new(),
                    }),
                }),
                pre_stop: Some(LifecycleHookForm {
                    exec: Some(ExecForm {
                        command: "sleep\n5".to_string(),
                    }),
                }),
            }),
            ..Default::default()
        });

        let lifecycle = container.lifecycle.expect("lifecycle");
        assert!(lifecycle.post_start.is_none());
        let command = lifecycle
            .pre_stop
            .and_then(|hook| hook.exec)
            .and_then(|exec| exec.command);
        assert_eq!(command, Some(vec!["sleep".to_string(), "5".to_string()]));
    }

    #[test]
    fn test_disabled_probe_is_dropped_even_with_stale_fields() {
        let probe = ProbeForm {
            enabled: false,
            probe_type: ProbeType::HttpGet,
            http_get: Some(HttpGetForm {
                path: Some("/healthz".to_string()),
                port: Some(IntOrString::Int(8080)),
                scheme: None,
            }),
            exec: Some(ExecForm {
                command: "true".to_string(),
            }),
            tcp_socket: Some(TcpSocketForm {
                port: Some(IntOrString::Int(8080)),
            }),
            period_seconds: Some(10),
            ..Default::default()
        };

        assert!(build_probe(&probe).is_none());
    }

    #[test]
    fn test_enabled_probe_emits_only_selected_handler() {
        let probe = build_probe(&ProbeForm {
            enabled: true,
            probe_type: ProbeType::Exec,
            http_get: Some(HttpGetForm {
                path: Some("/stale".to_string()),
                ..Default::default()
            }),
            exec: Some(ExecForm {
                command: "cat\n/tmp/healthy".to_string(),
            }),
            tcp_socket: Some(TcpSocketForm {
                port: Some(IntOrString::Int(9000)),
            }),
            initial_delay_seconds: Some(5),
            ..Default::default()
        })
        .expect("probe");

        assert!(probe.http_get.is_none());
        assert!(probe.tcp_socket.is_none());
        assert_eq!(
            probe.exec.and_then(|exec| exec.command),
            Some(vec!["cat".to_string(), "/tmp/healthy".to_string()])
        );
        assert_eq!(probe.initial_delay_seconds, Some(5));
    }

    #[test]
    fn test_enabled_probe_without_anything_is_dropped() {
        let probe = ProbeForm {
            enabled: true,
            probe_type: ProbeType::TcpSocket,
            ..Default::default()
        };
        assert!(build_probe(&probe).is_none());
    }
}
