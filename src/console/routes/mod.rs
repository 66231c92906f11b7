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
    Router,
    routing::{get, post},
};

use crate::console::{handlers, state::AppState};

/// 工作负载转换路由
pub fn workload_routes() -> Router<AppState> {
    Router::new()
        .route("/workloads/kinds", get(handlers::workloads::list_kinds))
        .route("/workloads/form", post(handlers::workloads::parse))
        .route(
            "/workloads/{kind}/template",
            get(handlers::workloads::template),
        )
        .route("/workloads/{kind}/yaml", post(handlers::workloads::render))
}
