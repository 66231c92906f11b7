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

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use snafu::ResultExt;
use strum::IntoEnumIterator;
use tracing::info;

use crate::console::{
    error::{self, Error, Result},
    models::workload::*,
    state::AppState,
};
use crate::converter::{form_data_to_yaml, parse_manifest};
use crate::types::descriptor::WorkloadDescriptor;
use crate::types::kind::WorkloadKind;

/// 列出支持的工作负载类型
pub async fn list_kinds() -> Json<KindListResponse> {
    let kinds = WorkloadKind::iter()
        .map(|kind| KindInfo {
            kind,
            api_version: kind.api_version().to_string(),
            has_replicas: kind.has_replicas(),
        })
        .collect();

    Json(KindListResponse { kinds })
}

/// 获取页面加载模板
pub async fn template(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<TemplateResponse>> {
    let kind = parse_kind(&kind)?;
    let descriptor = WorkloadDescriptor::template(kind, &state.config.default_namespace);
    let yaml = form_data_to_yaml(kind, &descriptor).context(error::ManifestSnafu)?;

    Ok(Json(TemplateResponse {
        kind,
        descriptor,
        yaml,
    }))
}

/// 表单生成 YAML
pub async fn render(
    Path(kind): Path<String>,
    body: std::result::Result<Json<WorkloadDescriptor>, JsonRejection>,
) -> Result<Json<RenderResponse>> {
    let kind = parse_kind(&kind)?;
    let Json(descriptor) = body.map_err(|rejection| Error::BadRequest {
        message: rejection.body_text(),
    })?;

    let yaml = form_data_to_yaml(kind, &descriptor).context(error::ManifestSnafu)?;
    info!(%kind, name = %descriptor.name, "rendered workload manifest");

    Ok(Json(RenderResponse { kind, yaml }))
}

/// YAML 解析为表单
pub async fn parse(
    body: std::result::Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>> {
    let Json(request) = body.map_err(|rejection| Error::BadRequest {
        message: rejection.body_text(),
    })?;

    let parsed = parse_manifest(&request.yaml).context(error::ManifestSnafu)?;

    Ok(Json(ParseResponse {
        kind: parsed.kind,
        descriptor: parsed.descriptor,
    }))
}

fn parse_kind(kind: &str) -> Result<WorkloadKind> {
    kind.parse().map_err(|_| Error::UnsupportedKind {
        kind: kind.to_string(),
    })
}
