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

//! Affinity rules in the editable row format: one condition per row, values
//! as comma-joined text.

use serde::{Deserialize, Serialize};

use super::joined_text;
use crate::types::k8s::SelectorOperator;

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulingForm {
    /// All rows must hold for a node to be eligible.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_affinity_required: Vec<NodeConditionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_affinity_preferred: Vec<WeightedNodeConditionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pod_affinity_required: Vec<PodConditionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pod_affinity_preferred: Vec<WeightedPodConditionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pod_anti_affinity_required: Vec<PodConditionRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pod_anti_affinity_preferred: Vec<WeightedPodConditionRow>,
}

impl SchedulingForm {
    pub fn is_empty(&self) -> bool {
        self.node_affinity_required.is_empty()
            && self.node_affinity_preferred.is_empty()
            && self.pod_affinity_required.is_empty()
            && self.pod_affinity_preferred.is_empty()
            && self.pod_anti_affinity_required.is_empty()
            && self.pod_anti_affinity_preferred.is_empty()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NodeConditionRow {
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(deserialize_with = "joined_text")]
    pub values: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct WeightedNodeConditionRow {
    pub weight: i32,
    pub key: String,
    pub operator: SelectorOperator,
    #[serde(deserialize_with = "joined_text")]
    pub values: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PodConditionRow {
    pub topology_key: String,
    pub label_key: String,
    pub operator: SelectorOperator,
    #[serde(deserialize_with = "joined_text")]
    pub label_values: String,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct WeightedPodConditionRow {
    pub weight: i32,
    pub topology_key: String,
    pub label_key: String,
    pub operator: SelectorOperator,
    #[serde(deserialize_with = "joined_text")]
    pub label_values: String,
}
