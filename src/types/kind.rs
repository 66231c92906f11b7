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

//! Workload kinds the converter knows how to assemble.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Kubernetes workload kinds, each with its own manifest spec shape.
#[derive(
    Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    /// Argo Rollouts
    Rollout,
}

impl WorkloadKind {
    pub fn all() -> Vec<WorkloadKind> {
        WorkloadKind::iter().collect()
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment | WorkloadKind::StatefulSet | WorkloadKind::DaemonSet => {
                "apps/v1"
            }
            WorkloadKind::Job | WorkloadKind::CronJob => "batch/v1",
            WorkloadKind::Rollout => "argoproj.io/v1alpha1",
        }
    }

    /// Whether `spec.replicas` is part of this kind's manifest.
    pub fn has_replicas(&self) -> bool {
        matches!(
            self,
            WorkloadKind::Deployment | WorkloadKind::StatefulSet | WorkloadKind::Rollout
        )
    }

    /// Job-based kinds run pods to completion and never restart them.
    pub fn is_batch(&self) -> bool {
        matches!(self, WorkloadKind::Job | WorkloadKind::CronJob)
    }

    /// Path from the manifest root to the embedded pod spec.
    pub fn pod_spec_path(&self) -> &'static [&'static str] {
        match self {
            WorkloadKind::CronJob => &["spec", "jobTemplate", "spec", "template", "spec"],
            _ => &["spec", "template", "spec"],
        }
    }

    /// Path from the manifest root to the job spec, for Job-based kinds.
    pub fn job_spec_path(&self) -> Option<&'static [&'static str]> {
        match self {
            WorkloadKind::Job => Some(&["spec"]),
            WorkloadKind::CronJob => Some(&["spec", "jobTemplate", "spec"]),
            _ => None,
        }
    }
}
