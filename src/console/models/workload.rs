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

use serde::{Deserialize, Serialize};

use crate::types::descriptor::WorkloadDescriptor;
use crate::types::kind::WorkloadKind;

/// 工作负载类型信息
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindInfo {
    pub kind: WorkloadKind,
    pub api_version: String,
    pub has_replicas: bool,
}

/// 工作负载类型列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct KindListResponse {
    pub kinds: Vec<KindInfo>,
}

/// Page-load template: the starter descriptor and its rendered manifest.
#[derive(Debug, Serialize, Deserialize)]
pub struct TemplateResponse {
    pub kind: WorkloadKind,
    pub descriptor: WorkloadDescriptor,
    pub yaml: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderResponse {
    pub kind: WorkloadKind,
    pub yaml: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseRequest {
    pub yaml: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResponse {
    /// Absent when the manifest is not one of the supported workload kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<WorkloadKind>,
    pub descriptor: WorkloadDescriptor,
}
