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

//! Common Kubernetes enum types used by the workload descriptor

use serde::{Deserialize, Serialize};
use strum::Display;

/// Image pull policy for containers.
/// - Always: Always pull the image
/// - Never: Never pull the image
/// - IfNotPresent: Pull the image if not present locally (default)
///
/// https://kubernetes.io/docs/concepts/containers/images/#image-pull-policy
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ImagePullPolicy {
    #[strum(to_string = "Always")]
    Always,

    #[strum(to_string = "Never")]
    Never,

    #[strum(to_string = "IfNotPresent")]
    #[default]
    IfNotPresent,
}

/// Pod management policy for StatefulSets
/// - OrderedReady: Respect the ordering guarantees demonstrated
/// - Parallel: launch or terminate all Pods in parallel
///
/// https://kubernetes.io/docs/tutorials/stateful-application/basic-stateful-set/#pod-management-policy
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum PodManagementPolicy {
    #[strum(to_string = "OrderedReady")]
    #[default]
    OrderedReady,

    #[strum(to_string = "Parallel")]
    Parallel,
}

/// Network protocol of a container port. TCP is the Kubernetes default and is
/// never written out explicitly.
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

/// Scheme of an HTTP probe.
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ProbeScheme {
    #[default]
    Http,
    Https,
}

/// https://kubernetes.io/docs/concepts/services-networking/dns-pod-service/#pod-s-dns-policy
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum DnsPolicy {
    #[default]
    ClusterFirst,
    ClusterFirstWithHostNet,
    Default,
    #[serde(rename = "None")]
    #[strum(to_string = "None")]
    NoDns,
}

/// How a CronJob treats concurrent executions of its job.
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    #[default]
    Allow,
    Forbid,
    Replace,
}

/// Replacement strategy for the pods of a Deployment or Rollout.
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum UpdateStrategyType {
    #[default]
    RollingUpdate,
    Recreate,
}

#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum TolerationOperator {
    #[default]
    Equal,
    Exists,
}

/// Operator of a node selector or label selector requirement. `Gt` and `Lt`
/// are only meaningful for node selectors.
#[derive(Default, Deserialize, Serialize, Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum SelectorOperator {
    #[default]
    In,
    NotIn,
    Exists,
    DoesNotExist,
    Gt,
    Lt,
}
