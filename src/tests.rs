//  Copyright 2025 RustFS Team
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http:www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use crate::types::descriptor::{ContainerForm, KeyValue, PortForm, WorkloadDescriptor};

// Helper function to create a test container (available to submodule tests via crate::tests)
pub fn create_test_container(name: &str, image: &str) -> ContainerForm {
    ContainerForm {
        name: name.to_string(),
        image: image.to_string(),
        ports: vec![PortForm {
            name: Some("http".to_string()),
            container_port: 8080,
            protocol: None,
        }],
        ..Default::default()
    }
}

// Helper function to create a test descriptor with one container and explicit labels
pub fn create_test_descriptor() -> WorkloadDescriptor {
    WorkloadDescriptor {
        name: "test-workload".to_string(),
        namespace: "test-ns".to_string(),
        replicas: Some(3),
        labels: vec![KeyValue::new("app", "test-workload")],
        containers: vec![create_test_container("web", "nginx:1.27")],
        ..Default::default()
    }
}
