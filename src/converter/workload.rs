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

//! Assembly of the kind-specific manifest around a shared pod template.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1 as appsv1;
use k8s_openapi::api::batch::v1 as batchv1;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use serde::Serialize;
use snafu::ResultExt;

use super::container::{build_container, non_empty, non_empty_vec};
use super::scheduling::fold_affinity;
use super::volume::build_volume;
use crate::types::descriptor::{WorkloadDescriptor, split_commas};
use crate::types::error::{Error, RenderManifestSnafu};
use crate::types::k8s::UpdateStrategyType;
use crate::types::kind::WorkloadKind;
use crate::types::rollout::{CanaryStrategy, Rollout, RolloutSpec, RolloutStrategy};

const DEFAULT_NAME: &str = "example";
const DEFAULT_NAMESPACE: &str = "default";
const DEFAULT_REPLICAS: i32 = 1;
const DEFAULT_CRON_SCHEDULE: &str = "0 0 * * *";
const DESCRIPTION_ANNOTATION: &str = "description";
const BATCH_RESTART_POLICY: &str = "Never";

/// Pieces shared by every kind, resolved once with defaults applied.
struct Common {
    name: String,
    metadata: metav1::ObjectMeta,
    labels: BTreeMap<String, String>,
    pod_spec: corev1::PodSpec,
}

impl Common {
    fn new(descriptor: &WorkloadDescriptor) -> Self {
        let name = non_empty(&descriptor.name).unwrap_or_else(|| DEFAULT_NAME.to_string());
        let labels = workload_labels(descriptor, &name);
        let annotations = workload_annotations(descriptor);

        let metadata = metav1::ObjectMeta {
            name: Some(name.clone()),
            namespace: Some(
                non_empty(&descriptor.namespace).unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            ),
            labels: Some(labels.clone()),
            annotations: (!annotations.is_empty()).then_some(annotations),
            ..Default::default()
        };

        Self {
            name,
            metadata,
            labels,
            pod_spec: build_pod_spec(descriptor),
        }
    }

    /// Every call hands out its own copy of the labels so the selector, the
    /// pod template and the metadata never share a node in the output.
    fn selector(&self) -> metav1::LabelSelector {
        metav1::LabelSelector {
            match_labels: Some(self.labels.clone()),
            ..Default::default()
        }
    }

    fn pod_template(&self, restart_policy: Option<&str>) -> corev1::PodTemplateSpec {
        let mut spec = self.pod_spec.clone();
        if let Some(policy) = restart_policy {
            spec.restart_policy = Some(policy.to_string());
        }

        corev1::PodTemplateSpec {
            metadata: Some(metav1::ObjectMeta {
                labels: Some(self.labels.clone()),
                ..Default::default()
            }),
            spec: Some(spec),
        }
    }
}

/// Explicit label rows in order, later rows winning; `app: <name>` when none
/// are usable.
fn workload_labels(descriptor: &WorkloadDescriptor, name: &str) -> BTreeMap<String, String> {
    let mut labels: BTreeMap<String, String> = descriptor
        .labels
        .iter()
        .filter(|row| !row.key.is_empty() && !row.value.is_empty())
        .map(|row| (row.key.clone(), row.value.clone()))
        .collect();

    if labels.is_empty() {
        labels.insert("app".to_string(), name.to_string());
    }
    labels
}

fn workload_annotations(descriptor: &WorkloadDescriptor) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    if let Some(description) = descriptor.description.as_deref().and_then(non_empty) {
        annotations.insert(DESCRIPTION_ANNOTATION.to_string(), description);
    }
    annotations.extend(
        descriptor
            .annotations
            .iter()
            .filter(|row| !row.key.is_empty() && !row.value.is_empty())
            .map(|row| (row.key.clone(), row.value.clone())),
    );
    annotations
}

fn build_pod_spec(descriptor: &WorkloadDescriptor) -> corev1::PodSpec {
    let dns_config = descriptor.dns_config.as_ref().and_then(|dns| {
        let nameservers = non_empty_vec(split_commas(&dns.nameservers));
        let searches = non_empty_vec(split_commas(&dns.searches));
        let options = non_empty_vec(
            dns.options
                .iter()
                .filter(|option| !option.name.is_empty())
                .map(|option| corev1::PodDNSConfigOption {
                    name: Some(option.name.clone()),
                    value: option.value.clone(),
                })
                .collect(),
        );

        (nameservers.is_some() || searches.is_some() || options.is_some()).then_some(
            corev1::PodDNSConfig {
                nameservers,
                searches,
                options,
            },
        )
    });

    corev1::PodSpec {
        containers: descriptor.containers.iter().map(build_container).collect(),
        init_containers: non_empty_vec(
            descriptor.init_containers.iter().map(build_container).collect(),
        ),
        volumes: non_empty_vec(descriptor.volumes.iter().map(build_volume).collect()),
        affinity: descriptor.scheduling.as_ref().and_then(fold_affinity),
        node_selector: (!descriptor.node_selector.is_empty())
            .then(|| descriptor.node_selector.clone()),
        tolerations: non_empty_vec(
            descriptor
                .tolerations
                .iter()
                .map(|toleration| corev1::Toleration {
                    key: toleration.key.as_deref().and_then(non_empty),
                    operator: Some(toleration.operator.to_string()),
                    value: toleration.value.as_deref().and_then(non_empty),
                    effect: toleration.effect.as_deref().and_then(non_empty),
                    toleration_seconds: toleration.toleration_seconds,
                })
                .collect(),
        ),
        dns_policy: descriptor.dns_policy.map(|policy| policy.to_string()),
        dns_config,
        termination_grace_period_seconds: descriptor.termination_grace_period_seconds,
        host_network: descriptor.host_network.then_some(true),
        host_pid: descriptor.host_pid.then_some(true),
        host_ipc: descriptor.host_ipc.then_some(true),
        image_pull_secrets: non_empty_vec(
            descriptor
                .image_pull_secrets
                .iter()
                .filter(|name| !name.is_empty())
                .map(|name| corev1::LocalObjectReference { name: name.clone() })
                .collect(),
        ),
        ..Default::default()
    }
}

fn job_spec(descriptor: &WorkloadDescriptor, common: &Common) -> batchv1::JobSpec {
    batchv1::JobSpec {
        template: common.pod_template(Some(BATCH_RESTART_POLICY)),
        completions: descriptor.completions,
        parallelism: descriptor.parallelism,
        backoff_limit: descriptor.backoff_limit,
        active_deadline_seconds: descriptor.active_deadline_seconds,
        ttl_seconds_after_finished: descriptor.ttl_seconds_after_finished,
        ..Default::default()
    }
}

fn deployment_strategy(descriptor: &WorkloadDescriptor) -> Option<appsv1::DeploymentStrategy> {
    descriptor
        .strategy
        .as_ref()
        .map(|strategy| appsv1::DeploymentStrategy {
            type_: Some(strategy.strategy_type.to_string()),
            rolling_update: (strategy.strategy_type == UpdateStrategyType::RollingUpdate)
                .then(|| strategy.rolling_update.as_ref())
                .flatten()
                .map(|rolling| appsv1::RollingUpdateDeployment {
                    max_unavailable: rolling.max_unavailable.clone(),
                    max_surge: rolling.max_surge.clone(),
                }),
        })
}

fn rollout_strategy(descriptor: &WorkloadDescriptor) -> Option<RolloutStrategy> {
    descriptor.strategy.as_ref().map(|strategy| {
        let rolling = strategy.rolling_update.clone().unwrap_or_default();
        RolloutStrategy {
            canary: Some(CanaryStrategy {
                max_unavailable: rolling.max_unavailable,
                max_surge: rolling.max_surge,
            }),
        }
    })
}

fn to_yaml<T: Serialize>(kind: WorkloadKind, manifest: &T) -> Result<String, Error> {
    serde_yaml_ng::to_string(manifest).context(RenderManifestSnafu {
        kind: kind.to_string(),
    })
}

/// Renders the manifest of `kind` described by `descriptor`.
pub(super) fn render(kind: WorkloadKind, descriptor: &WorkloadDescriptor) -> Result<String, Error> {
    let common = Common::new(descriptor);
    let replicas = Some(descriptor.replicas.unwrap_or(DEFAULT_REPLICAS));

    match kind {
        WorkloadKind::Deployment => to_yaml(
            kind,
            &appsv1::Deployment {
                metadata: common.metadata.clone(),
                spec: Some(appsv1::DeploymentSpec {
                    replicas,
                    selector: common.selector(),
                    template: common.pod_template(None),
                    strategy: deployment_strategy(descriptor),
                    min_ready_seconds: descriptor.min_ready_seconds,
                    revision_history_limit: descriptor.revision_history_limit,
                    progress_deadline_seconds: descriptor.progress_deadline_seconds,
                    ..Default::default()
                }),
                ..Default::default()
            },
        ),
        WorkloadKind::StatefulSet => to_yaml(
            kind,
            &appsv1::StatefulSet {
                metadata: common.metadata.clone(),
                spec: Some(appsv1::StatefulSetSpec {
                    replicas,
                    service_name: Some(
                        descriptor
                            .service_name
                            .as_deref()
                            .and_then(non_empty)
                            .unwrap_or_else(|| common.name.clone()),
                    ),
                    selector: common.selector(),
                    template: common.pod_template(None),
                    pod_management_policy: descriptor
                        .pod_management_policy
                        .map(|policy| policy.to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        ),
        WorkloadKind::DaemonSet => to_yaml(
            kind,
            &appsv1::DaemonSet {
                metadata: common.metadata.clone(),
                spec: Some(appsv1::DaemonSetSpec {
                    selector: common.selector(),
                    template: common.pod_template(None),
                    min_ready_seconds: descriptor.min_ready_seconds,
                    revision_history_limit: descriptor.revision_history_limit,
                    ..Default::default()
                }),
                ..Default::default()
            },
        ),
        WorkloadKind::Job => to_yaml(
            kind,
            &batchv1::Job {
                metadata: common.metadata.clone(),
                spec: Some(job_spec(descriptor, &common)),
                ..Default::default()
            },
        ),
        WorkloadKind::CronJob => to_yaml(
            kind,
            &batchv1::CronJob {
                metadata: common.metadata.clone(),
                spec: Some(batchv1::CronJobSpec {
                    schedule: descriptor
                        .schedule
                        .as_deref()
                        .and_then(non_empty)
                        .unwrap_or_else(|| DEFAULT_CRON_SCHEDULE.to_string()),
                    suspend: descriptor.suspend,
                    concurrency_policy: descriptor.concurrency_policy.map(|policy| policy.to_string()),
                    successful_jobs_history_limit: descriptor.successful_jobs_history_limit,
                    failed_jobs_history_limit: descriptor.failed_jobs_history_limit,
                    job_template: batchv1::JobTemplateSpec {
                        metadata: None,
                        spec: Some(job_spec(descriptor, &common)),
                    },
                    ..Default::default()
                }),
                ..Default::default()
            },
        ),
        WorkloadKind::Rollout => {
            let mut rollout = Rollout::new(
                &common.name,
                RolloutSpec {
                    replicas,
                    selector: common.selector(),
                    template: common.pod_template(None),
                    strategy: rollout_strategy(descriptor),
                },
            );
            rollout.metadata = common.metadata.clone();
            to_yaml(kind, &rollout)
        }
    }
}
