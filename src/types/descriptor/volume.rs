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

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum VolumeType {
    #[default]
    EmptyDir,
    HostPath,
    ConfigMap,
    Secret,
    PersistentVolumeClaim,
}

/// A pod volume as held by the form. Only the sub-object named by
/// `volume_type` is meaningful.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeForm {
    pub name: String,
    #[serde(rename = "type")]
    pub volume_type: VolumeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<HostPathForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapVolumeForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretVolumeForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_volume_claim: Option<PersistentVolumeClaimForm>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct EmptyDirForm {
    /// `Memory` for a tmpfs, empty for node storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_limit: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HostPathForm {
    pub path: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub path_type: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigMapVolumeForm {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPathForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SecretVolumeForm {
    pub secret_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<KeyToPathForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_mode: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistentVolumeClaimForm {
    pub claim_name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct KeyToPathForm {
    pub key: String,
    pub path: String,
}

/// The storage behind a volume, resolved from the form's `type` tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VolumeSource {
    EmptyDir(EmptyDirForm),
    HostPath(HostPathForm),
    ConfigMap(ConfigMapVolumeForm),
    Secret(SecretVolumeForm),
    PersistentVolumeClaim(PersistentVolumeClaimForm),
}

impl VolumeForm {
    /// Picks the sub-object selected by `volume_type`, ignoring the rest.
    pub fn source(&self) -> VolumeSource {
        match self.volume_type {
            VolumeType::EmptyDir => {
                VolumeSource::EmptyDir(self.empty_dir.clone().unwrap_or_default())
            }
            VolumeType::HostPath => {
                VolumeSource::HostPath(self.host_path.clone().unwrap_or_default())
            }
            VolumeType::ConfigMap => {
                VolumeSource::ConfigMap(self.config_map.clone().unwrap_or_default())
            }
            VolumeType::Secret => VolumeSource::Secret(self.secret.clone().unwrap_or_default()),
            VolumeType::PersistentVolumeClaim => VolumeSource::PersistentVolumeClaim(
                self.persistent_volume_claim.clone().unwrap_or_default(),
            ),
        }
    }
}
