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

use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use super::container::{non_empty, non_empty_vec};
use crate::types::descriptor::{KeyToPathForm, VolumeForm, VolumeSource};

/// Builds a pod volume carrying only the source selected by the form's type.
pub(super) fn build_volume(form: &VolumeForm) -> corev1::Volume {
    let mut volume = corev1::Volume {
        name: form.name.clone(),
        ..Default::default()
    };

    match form.source() {
        VolumeSource::EmptyDir(empty_dir) => {
            volume.empty_dir = Some(corev1::EmptyDirVolumeSource {
                medium: empty_dir.medium.as_deref().and_then(non_empty),
                size_limit: empty_dir
                    .size_limit
                    .as_deref()
                    .and_then(non_empty)
                    .map(Quantity),
            });
        }
        VolumeSource::HostPath(host_path) => {
            volume.host_path = Some(corev1::HostPathVolumeSource {
                path: host_path.path,
                type_: host_path.path_type.as_deref().and_then(non_empty),
            });
        }
        VolumeSource::ConfigMap(config_map) => {
            volume.config_map = Some(corev1::ConfigMapVolumeSource {
                name: config_map.name,
                items: key_to_paths(&config_map.items),
                default_mode: config_map.default_mode,
                ..Default::default()
            });
        }
        VolumeSource::Secret(secret) => {
            volume.secret = Some(corev1::SecretVolumeSource {
                secret_name: Some(secret.secret_name),
                items: key_to_paths(&secret.items),
                default_mode: secret.default_mode,
                ..Default::default()
            });
        }
        VolumeSource::PersistentVolumeClaim(claim) => {
            volume.persistent_volume_claim = Some(corev1::PersistentVolumeClaimVolumeSource {
                claim_name: claim.claim_name,
                read_only: claim.read_only.then_some(true),
            });
        }
    }

    volume
}

fn key_to_paths(items: &[KeyToPathForm]) -> Option<Vec<corev1::KeyToPath>> {
    non_empty_vec(
        items
            .iter()
            .map(|item| corev1::KeyToPath {
                key: item.key.clone(),
                path: item.path.clone(),
                mode: None,
            })
            .collect(),
    )
}
