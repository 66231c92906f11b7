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

//! Manifest to descriptor. Works on the untyped YAML tree and decodes each
//! sub-object on its own, so a malformed field only drops that field.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::de::DeserializeOwned;
use serde_yaml_ng::Value;
use snafu::ResultExt;
use tracing::debug;

use super::ParsedManifest;
use super::scheduling::unfold_affinity;
use crate::types::descriptor::{
    ConfigMapVolumeForm, ContainerForm, DnsConfigForm, DnsOptionForm, EmptyDirForm, EnvSource,
    EnvVarForm, ExecForm, HostPathForm, HttpGetForm, KeyToPathForm, KeyValue, LifecycleForm,
    LifecycleHookForm, PersistentVolumeClaimForm, PortForm, ProbeForm, ProbeType, ResourceForm,
    ResourceQuantities, RollingUpdateForm, SecretVolumeForm, TcpSocketForm, TolerationForm,
    UpdateStrategyForm, VolumeForm, VolumeMountForm, VolumeType, WorkloadDescriptor,
};
use crate::types::error::{EmptyManifestSnafu, Error, InvalidYamlSnafu, NotAnObjectSnafu};
use crate::types::k8s::UpdateStrategyType;
use crate::types::kind::WorkloadKind;

const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_CONTAINER_NAME: &str = "main";
const DEFAULT_INIT_CONTAINER_NAME: &str = "init";
const DESCRIPTION_ANNOTATION: &str = "description";
const POD_SPEC_PATH: &[&str] = &["spec", "template", "spec"];
const JOB_SPEC_PATH: &[&str] = &["spec"];

pub(super) fn parse(text: &str) -> Result<ParsedManifest, Error> {
    if text.trim().is_empty() {
        return EmptyManifestSnafu.fail();
    }

    let root: Value = serde_yaml_ng::from_str(text).context(InvalidYamlSnafu)?;
    match &root {
        Value::Mapping(_) => {}
        Value::Null => return EmptyManifestSnafu.fail(),
        other => {
            return NotAnObjectSnafu {
                found: type_name(other),
            }
            .fail();
        }
    }

    let kind = text_at(root.get("kind")).and_then(|kind| kind.parse::<WorkloadKind>().ok());
    let empty = Value::Null;
    let metadata = root.get("metadata").unwrap_or(&empty);
    let spec = root.get("spec").unwrap_or(&empty);
    let pod = lookup(&root, kind.map_or(POD_SPEC_PATH, |kind| kind.pod_spec_path())).unwrap_or(&empty);
    let job = lookup(
        &root,
        kind.and_then(|kind| kind.job_spec_path()).unwrap_or(JOB_SPEC_PATH),
    )
    .unwrap_or(&empty);

    let annotations = rows(metadata.get("annotations"));
    let description = annotations
        .iter()
        .find(|row| row.key == DESCRIPTION_ANNOTATION)
        .map(|row| row.value.clone());

    let descriptor = WorkloadDescriptor {
        name: text_at(metadata.get("name")).unwrap_or_default(),
        namespace: text_at(metadata.get("namespace"))
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        description,
        replicas: int_at(spec.get("replicas")),
        labels: rows(metadata.get("labels")),
        annotations: annotations
            .into_iter()
            .filter(|row| row.key != DESCRIPTION_ANNOTATION)
            .collect(),

        containers: containers(pod.get("containers"), DEFAULT_CONTAINER_NAME),
        init_containers: containers(pod.get("initContainers"), DEFAULT_INIT_CONTAINER_NAME),
        volumes: decode_each_with::<corev1::Volume>(pod.get("volumes"), &["name"])
            .into_iter()
            .map(volume_form)
            .collect(),
        image_pull_secrets: decode_each::<corev1::LocalObjectReference>(
            pod.get("imagePullSecrets"),
        )
        .into_iter()
        .map(|secret| secret.name)
        .filter(|name| !name.is_empty())
        .collect(),

        scheduling: decode::<corev1::Affinity>(pod.get("affinity"))
            .and_then(|affinity| unfold_affinity(&affinity)),
        node_selector: string_map(pod.get("nodeSelector")),
        tolerations: decode_each::<corev1::Toleration>(pod.get("tolerations"))
            .into_iter()
            .map(|toleration| TolerationForm {
                key: toleration.key,
                operator: toleration
                    .operator
                    .as_deref()
                    .and_then(parse_enum)
                    .unwrap_or_default(),
                value: toleration.value,
                effect: toleration.effect,
                toleration_seconds: toleration.toleration_seconds,
            })
            .collect(),

        strategy: update_strategy(kind, spec),
        min_ready_seconds: int_at(spec.get("minReadySeconds")),
        revision_history_limit: int_at(spec.get("revisionHistoryLimit")),
        progress_deadline_seconds: int_at(spec.get("progressDeadlineSeconds")),

        termination_grace_period_seconds: int_at(pod.get("terminationGracePeriodSeconds")),
        dns_policy: text_at(pod.get("dnsPolicy")).as_deref().and_then(parse_enum),
        dns_config: decode::<corev1::PodDNSConfig>(pod.get("dnsConfig")).map(dns_config_form),
        host_network: flag_at(pod.get("hostNetwork")),
        host_pid: flag_at(pod.get("hostPID")),
        host_ipc: flag_at(pod.get("hostIPC")),

        service_name: text_at(spec.get("serviceName")),
        pod_management_policy: text_at(spec.get("podManagementPolicy"))
            .as_deref()
            .and_then(parse_enum),

        schedule: text_at(spec.get("schedule")),
        suspend: spec.get("suspend").and_then(Value::as_bool),
        concurrency_policy: text_at(spec.get("concurrencyPolicy"))
            .as_deref()
            .and_then(parse_enum),
        successful_jobs_history_limit: int_at(spec.get("successfulJobsHistoryLimit")),
        failed_jobs_history_limit: int_at(spec.get("failedJobsHistoryLimit")),

        completions: int_at(job.get("completions")),
        parallelism: int_at(job.get("parallelism")),
        backoff_limit: int_at(job.get("backoffLimit")),
        active_deadline_seconds: int_at(job.get("activeDeadlineSeconds")),
        ttl_seconds_after_finished: int_at(job.get("ttlSecondsAfterFinished")),
    };

    Ok(ParsedManifest { kind, descriptor })
}

fn containers(value: Option<&Value>, default_name: &str) -> Vec<ContainerForm> {
    value
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_mapping())
                .map(|item| container_form(item, default_name))
                .collect()
        })
        .unwrap_or_default()
}

fn container_form(value: &Value, default_name: &str) -> ContainerForm {
    ContainerForm {
        name: text_at(value.get("name"))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| default_name.to_string()),
        image: text_at(value.get("image")).unwrap_or_default(),
        image_pull_policy: text_at(value.get("imagePullPolicy"))
            .as_deref()
            .and_then(parse_enum),
        command: lines(value.get("command")),
        args: lines(value.get("args")),
        working_dir: text_at(value.get("workingDir")),
        ports: decode_each_with::<corev1::ContainerPort>(value.get("ports"), &["containerPort"])
            .into_iter()
            .map(|port| PortForm {
                name: port.name,
                container_port: port.container_port,
                protocol: port.protocol.as_deref().and_then(parse_enum),
            })
            .collect(),
        env: value
            .get("env")
            .and_then(Value::as_sequence)
            .map(|items| items.iter().filter_map(env_form).collect())
            .unwrap_or_default(),
        resources: decode::<corev1::ResourceRequirements>(value.get("resources"))
            .and_then(resource_form),
        volume_mounts: decode_each_with::<corev1::VolumeMount>(
            value.get("volumeMounts"),
            &["name", "mountPath"],
        )
            .into_iter()
            .map(|mount| VolumeMountForm {
                name: mount.name,
                mount_path: mount.mount_path,
                sub_path: mount.sub_path,
                read_only: mount.read_only.unwrap_or(false),
            })
            .collect(),
        lifecycle: decode::<corev1::Lifecycle>(value.get("lifecycle")).and_then(lifecycle_form),
        liveness_probe: probe_form(value.get("livenessProbe")),
        readiness_probe: probe_form(value.get("readinessProbe")),
        startup_probe: probe_form(value.get("startupProbe")),
        stdin: flag_at(value.get("stdin")),
        tty: flag_at(value.get("tty")),
    }
}

/// Literal values are taken as text whatever their scalar type.
fn env_form(value: &Value) -> Option<EnvVarForm> {
    if !has_keys(value, &["name"]) {
        return None;
    }

    Some(EnvVarForm {
        name: text_at(value.get("name"))?,
        value: text_at(value.get("value")),
        value_from: decode::<corev1::EnvVarSource>(value.get("valueFrom")).and_then(env_source),
    })
}

fn env_source(source: corev1::EnvVarSource) -> Option<EnvSource> {
    if let Some(selector) = source.config_map_key_ref {
        return Some(EnvSource::ConfigMapKeyRef {
            name: selector.name,
            key: selector.key,
        });
    }
    if let Some(selector) = source.secret_key_ref {
        return Some(EnvSource::SecretKeyRef {
            name: selector.name,
            key: selector.key,
        });
    }
    if let Some(selector) = source.field_ref {
        return Some(EnvSource::FieldRef {
            field_path: selector.field_path,
        });
    }
    source
        .resource_field_ref
        .map(|selector| EnvSource::ResourceFieldRef {
            container_name: selector.container_name,
            resource: selector.resource,
        })
}

fn resource_form(resources: corev1::ResourceRequirements) -> Option<ResourceForm> {
    let quantities = |map: Option<BTreeMap<String, Quantity>>| {
        map.map(|map| ResourceQuantities {
            cpu: map.get("cpu").map(|quantity| quantity.0.clone()),
            memory: map.get("memory").map(|quantity| quantity.0.clone()),
            gpu: map.get("nvidia.com/gpu").map(|quantity| quantity.0.clone()),
        })
    };

    let form = ResourceForm {
        requests: quantities(resources.requests),
        limits: quantities(resources.limits),
    };
    (form.requests.is_some() || form.limits.is_some()).then_some(form)
}

fn lifecycle_form(lifecycle: corev1::Lifecycle) -> Option<LifecycleForm> {
    let hook = |handler: Option<corev1::LifecycleHandler>| {
        handler
            .and_then(|handler| handler.exec)
            .map(|exec| LifecycleHookForm {
                exec: Some(ExecForm {
                    command: exec.command.unwrap_or_default().join("\n"),
                }),
            })
    };

    let form = LifecycleForm {
        post_start: hook(lifecycle.post_start),
        pre_stop: hook(lifecycle.pre_stop),
    };
    (form.post_start.is_some() || form.pre_stop.is_some()).then_some(form)
}

/// A probe found in a manifest is always reported as enabled; the type is
/// inferred from its handler, exec first, then tcpSocket, then httpGet.
/// Ports come from the raw tree so an absent port stays unset.
fn probe_form(value: Option<&Value>) -> Option<ProbeForm> {
    let probe = decode::<corev1::Probe>(value)?;
    let port = |handler: &str| {
        decode::<IntOrString>(value.and_then(|raw| raw.get(handler)?.get("port")))
    };

    let probe_type = if probe.exec.is_some() {
        ProbeType::Exec
    } else if probe.tcp_socket.is_some() {
        ProbeType::TcpSocket
    } else {
        ProbeType::HttpGet
    };

    Some(ProbeForm {
        enabled: true,
        probe_type,
        http_get: probe.http_get.map(|http| HttpGetForm {
            path: http.path,
            port: port("httpGet"),
            scheme: http.scheme.as_deref().and_then(parse_enum),
        }),
        exec: probe.exec.map(|exec| ExecForm {
            command: exec.command.unwrap_or_default().join("\n"),
        }),
        tcp_socket: probe.tcp_socket.map(|_| TcpSocketForm {
            port: port("tcpSocket"),
        }),
        initial_delay_seconds: probe.initial_delay_seconds,
        period_seconds: probe.period_seconds,
        timeout_seconds: probe.timeout_seconds,
        success_threshold: probe.success_threshold,
        failure_threshold: probe.failure_threshold,
    })
}

/// The volume type is the first source present in the order hostPath,
/// configMap, secret, persistentVolumeClaim; anything else reads as emptyDir.
fn volume_form(volume: corev1::Volume) -> VolumeForm {
    let volume_type = if volume.host_path.is_some() {
        VolumeType::HostPath
    } else if volume.config_map.is_some() {
        VolumeType::ConfigMap
    } else if volume.secret.is_some() {
        VolumeType::Secret
    } else if volume.persistent_volume_claim.is_some() {
        VolumeType::PersistentVolumeClaim
    } else {
        VolumeType::EmptyDir
    };

    let items = |items: Option<Vec<corev1::KeyToPath>>| -> Vec<KeyToPathForm> {
        items
            .unwrap_or_default()
            .into_iter()
            .map(|item| KeyToPathForm {
                key: item.key,
                path: item.path,
            })
            .collect()
    };

    VolumeForm {
        name: volume.name,
        volume_type,
        empty_dir: volume.empty_dir.map(|empty_dir| EmptyDirForm {
            medium: empty_dir.medium,
            size_limit: empty_dir.size_limit.map(|quantity| quantity.0),
        }),
        host_path: volume.host_path.map(|host_path| HostPathForm {
            path: host_path.path,
            path_type: host_path.type_,
        }),
        config_map: volume.config_map.map(|config_map| ConfigMapVolumeForm {
            name: config_map.name,
            items: items(config_map.items),
            default_mode: config_map.default_mode,
        }),
        secret: volume.secret.map(|secret| SecretVolumeForm {
            secret_name: secret.secret_name.unwrap_or_default(),
            items: items(secret.items),
            default_mode: secret.default_mode,
        }),
        persistent_volume_claim: volume.persistent_volume_claim.map(|claim| {
            PersistentVolumeClaimForm {
                claim_name: claim.claim_name,
                read_only: claim.read_only.unwrap_or(false),
            }
        }),
    }
}

fn dns_config_form(dns: corev1::PodDNSConfig) -> DnsConfigForm {
    DnsConfigForm {
        nameservers: dns.nameservers.unwrap_or_default().join(","),
        searches: dns.searches.unwrap_or_default().join(","),
        options: dns
            .options
            .unwrap_or_default()
            .into_iter()
            .filter_map(|option| {
                Some(DnsOptionForm {
                    name: option.name?,
                    value: option.value,
                })
            })
            .collect(),
    }
}

/// Deployment strategies map directly; a Rollout's canary settings read back
/// as a rolling update with the same surge and unavailability limits.
fn update_strategy(kind: Option<WorkloadKind>, spec: &Value) -> Option<UpdateStrategyForm> {
    let strategy = spec.get("strategy")?;

    if kind == Some(WorkloadKind::Rollout) {
        let canary = strategy.get("canary").filter(|canary| canary.is_mapping())?;
        let rolling = RollingUpdateForm {
            max_unavailable: decode::<IntOrString>(canary.get("maxUnavailable")),
            max_surge: decode::<IntOrString>(canary.get("maxSurge")),
        };
        let has_limits = rolling.max_unavailable.is_some() || rolling.max_surge.is_some();
        return Some(UpdateStrategyForm {
            strategy_type: UpdateStrategyType::RollingUpdate,
            rolling_update: has_limits.then_some(rolling),
        });
    }

    let strategy = decode::<appsv1::DeploymentStrategy>(Some(strategy))?;
    Some(UpdateStrategyForm {
        strategy_type: strategy
            .type_
            .as_deref()
            .and_then(parse_enum)
            .unwrap_or_default(),
        rolling_update: strategy.rolling_update.map(|rolling| RollingUpdateForm {
            max_unavailable: rolling.max_unavailable,
            max_surge: rolling.max_surge,
        }),
    })
}

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(*key))
}

fn decode<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    let value = value.filter(|value| !value.is_null())?;
    match serde_yaml_ng::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            debug!(%error, "dropping malformed manifest field");
            None
        }
    }
}

fn decode_each<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    decode_each_with(value, &[])
}

/// Like `decode_each`, dropping items that lack any of the `required` keys.
/// Typed decoding alone would fill those with empty defaults.
fn decode_each_with<T: DeserializeOwned>(value: Option<&Value>, required: &[&str]) -> Vec<T> {
    value
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter(|item| has_keys(item, required))
                .filter_map(|item| decode(Some(item)))
                .collect()
        })
        .unwrap_or_default()
}

/// Every key is present with a non-null, non-blank value.
fn has_keys(value: &Value, keys: &[&str]) -> bool {
    keys.iter().all(|key| match value.get(*key) {
        None | Some(Value::Null) => false,
        Some(Value::String(text)) => !text.trim().is_empty(),
        Some(_) => true,
    })
}

/// Parses a Kubernetes enum string into one of the typed vocabularies.
pub(super) fn parse_enum<T: DeserializeOwned>(text: &str) -> Option<T> {
    serde_yaml_ng::from_value(Value::String(text.to_string())).ok()
}

/// Scalars as text; manifests often carry unquoted numbers or booleans in
/// label values.
fn text_at(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn int_at<T: TryFrom<i64>>(value: Option<&Value>) -> Option<T> {
    value?.as_i64().and_then(|number| T::try_from(number).ok())
}

fn flag_at(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

/// Newline-joined form of a command list; absent lists read as empty text.
fn lines(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| text_at(Some(item)))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}

fn rows(value: Option<&Value>) -> Vec<KeyValue> {
    value
        .and_then(Value::as_mapping)
        .map(|mapping| {
            mapping
                .iter()
                .filter_map(|(key, value)| {
                    Some(KeyValue::new(text_at(Some(key))?, text_at(Some(value))?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn string_map(value: Option<&Value>) -> BTreeMap<String, String> {
    rows(value)
        .into_iter()
        .map(|row| (row.key, row.value))
        .collect()
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
    .to_string()
}
