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

//! Conversion between [`WorkloadDescriptor`] and workload manifests.

use tracing::{debug, warn};

use crate::types::descriptor::WorkloadDescriptor;
use crate::types::error::Error;
use crate::types::kind::WorkloadKind;

mod container;
mod parse;
mod scheduling;
mod volume;
mod workload;

/// A manifest read back into a descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedManifest {
    /// `None` when the manifest's `kind` is missing or not a supported workload.
    pub kind: Option<WorkloadKind>,
    pub descriptor: WorkloadDescriptor,
}

/// Renders the descriptor as a single YAML document for `kind`.
pub fn form_data_to_yaml(kind: WorkloadKind, descriptor: &WorkloadDescriptor) -> Result<String, Error> {
    debug!(%kind, name = %descriptor.name, "rendering workload manifest");
    workload::render(kind, descriptor)
}

/// Reads a manifest back into a descriptor, reporting why the text was rejected.
pub fn parse_manifest(text: &str) -> Result<ParsedManifest, Error> {
    let parsed = parse::parse(text)?;
    debug!(kind = ?parsed.kind, name = %parsed.descriptor.name, "parsed workload manifest");
    Ok(parsed)
}

/// Reads a manifest back into a descriptor; rejected text yields `None`.
pub fn yaml_to_form_data(text: &str) -> Option<WorkloadDescriptor> {
    match parse_manifest(text) {
        Ok(parsed) => Some(parsed.descriptor),
        Err(error) => {
            warn!(%error, "failed to parse workload manifest");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_container, create_test_descriptor};
    use crate::types::descriptor::{
        EmptyDirForm, ExecForm, KeyValue, ProbeForm, ProbeType, VolumeForm, VolumeType,
    };
    use serde_yaml_ng::Value;
    use strum::IntoEnumIterator;

    fn render_value(kind: WorkloadKind, descriptor: &WorkloadDescriptor) -> Value {
        let yaml = form_data_to_yaml(kind, descriptor).expect("render should succeed");
        serde_yaml_ng::from_str(&yaml).expect("rendered YAML should parse")
    }

    fn pod_spec(kind: WorkloadKind, manifest: &Value) -> &Value {
        kind.pod_spec_path()
            .iter()
            .try_fold(manifest, |node, key| node.get(*key))
            .expect("pod spec should exist")
    }

    #[test]
    fn test_round_trip_preserves_identity_for_every_kind() {
        for kind in WorkloadKind::iter() {
            let descriptor = create_test_descriptor();
            let yaml = form_data_to_yaml(kind, &descriptor).expect("render");
            let parsed = parse_manifest(&yaml).expect("parse");

            assert_eq!(parsed.kind, Some(kind));
            let back = parsed.descriptor;
            assert_eq!(back.name, descriptor.name, "{kind}");
            assert_eq!(back.namespace, descriptor.namespace, "{kind}");
            assert_eq!(back.containers[0].name, descriptor.containers[0].name, "{kind}");
            assert_eq!(back.containers[0].image, descriptor.containers[0].image, "{kind}");
            if kind.has_replicas() {
                assert_eq!(back.replicas, descriptor.replicas, "{kind}");
            }
        }
    }

    #[test]
    fn test_selector_matches_labels_without_aliases() {
        let descriptor = create_test_descriptor();
        for kind in WorkloadKind::iter().filter(|kind| !kind.is_batch()) {
            let yaml = form_data_to_yaml(kind, &descriptor).expect("render");
            assert!(!yaml.contains('&') && !yaml.contains('*'), "{kind} uses aliases");

            let manifest: Value = serde_yaml_ng::from_str(&yaml).expect("parse");
            let labels = &manifest["metadata"]["labels"];
            assert_eq!(&manifest["spec"]["selector"]["matchLabels"], labels);
            assert_eq!(&manifest["spec"]["template"]["metadata"]["labels"], labels);
        }
    }

    #[test]
    fn test_default_labels_use_name() {
        let descriptor = WorkloadDescriptor {
            name: "foo".to_string(),
            labels: vec![],
            ..create_test_descriptor()
        };
        let manifest = render_value(WorkloadKind::Deployment, &descriptor);

        let expected: Value = serde_yaml_ng::from_str("app: foo").expect("parse");
        assert_eq!(manifest["metadata"]["labels"], expected);
        assert_eq!(manifest["spec"]["selector"]["matchLabels"], expected);
    }

    #[test]
    fn test_disabled_probe_is_absent() {
        let mut descriptor = create_test_descriptor();
        descriptor.containers[0].liveness_probe = Some(ProbeForm {
            enabled: false,
            probe_type: ProbeType::Exec,
            exec: Some(ExecForm {
                command: "true".to_string(),
            }),
            period_seconds: Some(5),
            ..Default::default()
        });

        let manifest = render_value(WorkloadKind::Deployment, &descriptor);
        let container = &pod_spec(WorkloadKind::Deployment, &manifest)["containers"][0];
        assert!(container.get("livenessProbe").is_none());
    }

    #[test]
    fn test_empty_dir_volume_has_no_other_source() {
        let mut descriptor = create_test_descriptor();
        descriptor.volumes = vec![VolumeForm {
            name: "scratch".to_string(),
            volume_type: VolumeType::EmptyDir,
            empty_dir: Some(EmptyDirForm::default()),
            ..Default::default()
        }];

        let manifest = render_value(WorkloadKind::StatefulSet, &descriptor);
        let volume = pod_spec(WorkloadKind::StatefulSet, &manifest)["volumes"][0]
            .as_mapping()
            .expect("volume mapping");
        let mut keys: Vec<_> = volume.keys().filter_map(Value::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["emptyDir", "name"]);
    }

    #[test]
    fn test_command_lines_become_list() {
        let mut descriptor = create_test_descriptor();
        descriptor.containers[0].command = "/bin/sh\n-c\necho hi".to_string();

        let manifest = render_value(WorkloadKind::Job, &descriptor);
        let command: Vec<String> = serde_yaml_ng::from_value(
            pod_spec(WorkloadKind::Job, &manifest)["containers"][0]["command"].clone(),
        )
        .expect("command list");
        assert_eq!(command, vec!["/bin/sh", "-c", "echo hi"]);
    }

    #[test]
    fn test_batch_pods_never_restart() {
        for kind in [WorkloadKind::Job, WorkloadKind::CronJob] {
            let manifest = render_value(kind, &create_test_descriptor());
            assert_eq!(pod_spec(kind, &manifest)["restartPolicy"].as_str(), Some("Never"));
        }
    }

    #[test]
    fn test_cronjob_schedule_round_trips() {
        let descriptor = WorkloadDescriptor {
            schedule: Some("*/15 * * * *".to_string()),
            completions: Some(3),
            ..create_test_descriptor()
        };
        let yaml = form_data_to_yaml(WorkloadKind::CronJob, &descriptor).expect("render");
        let back = yaml_to_form_data(&yaml).expect("parse");

        assert_eq!(back.schedule.as_deref(), Some("*/15 * * * *"));
        assert_eq!(back.completions, Some(3));
    }

    #[test]
    fn test_labels_round_trip() {
        let descriptor = WorkloadDescriptor {
            labels: vec![KeyValue::new("app", "api"), KeyValue::new("tier", "backend")],
            description: Some("public api".to_string()),
            ..create_test_descriptor()
        };
        let yaml = form_data_to_yaml(WorkloadKind::Deployment, &descriptor).expect("render");
        let back = yaml_to_form_data(&yaml).expect("parse");

        assert_eq!(back.labels, descriptor.labels);
        assert_eq!(back.description, descriptor.description);
        assert!(back.annotations.is_empty());
    }

    #[test]
    fn test_long_values_are_not_wrapped() {
        let long_arg = "x".repeat(300);
        let mut descriptor = create_test_descriptor();
        descriptor.containers = vec![create_test_container("worker", "busybox:1.36")];
        descriptor.containers[0].args = long_arg.clone();

        let yaml = form_data_to_yaml(WorkloadKind::DaemonSet, &descriptor).expect("render");
        assert!(yaml.lines().any(|line| line.contains(&long_arg)));
    }

    #[test]
    fn test_malformed_yaml_yields_none() {
        assert!(yaml_to_form_data("spec: [unterminated").is_none());
        assert!(yaml_to_form_data("").is_none());
        assert!(yaml_to_form_data("just a string").is_none());
    }

    #[test]
    fn test_portless_http_probe_renders_default_port() {
        let manifest = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  template:
    spec:
      containers:
        - name: web
          image: nginx
          livenessProbe:
            httpGet:
              path: /x
            periodSeconds: 3
"#;
        let descriptor = yaml_to_form_data(manifest).expect("parse");
        let rendered = render_value(WorkloadKind::Deployment, &descriptor);

        let http = &pod_spec(WorkloadKind::Deployment, &rendered)["containers"][0]["livenessProbe"]["httpGet"];
        assert_eq!(http["path"].as_str(), Some("/x"));
        assert_eq!(http["port"].as_i64(), Some(80));
    }

    #[test]
    fn test_rerendering_a_parsed_manifest_is_stable() {
        let manifests = [
            (
                WorkloadKind::Deployment,
                r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: api
  namespace: shop
  labels:
    tier: backend
    app: api
  annotations:
    description: storefront api
    owner: team-a
spec:
  replicas: 2
  selector:
    matchLabels:
      app: api
  strategy:
    type: RollingUpdate
    rollingUpdate:
      maxSurge: 25%
  template:
    spec:
      containers:
        - name: api
          image: shop/api:2.1
          command: ["/bin/sh", "-c", "exec api"]
          env:
            - name: PORT
              value: "8080"
          readinessProbe:
            httpGet:
              path: /ready
              port: 8080
"#,
            ),
            (
                WorkloadKind::CronJob,
                r#"
apiVersion: batch/v1
kind: CronJob
metadata:
  name: cleanup
spec:
  schedule: "*/5 * * * *"
  jobTemplate:
    spec:
      backoffLimit: 1
      template:
        spec:
          restartPolicy: OnFailure
          containers:
            - name: cleanup
              image: busybox
              args: ["rm", "-rf", "/tmp/cache"]
"#,
            ),
            (
                WorkloadKind::Rollout,
                r#"
apiVersion: argoproj.io/v1alpha1
kind: Rollout
metadata:
  name: canary
spec:
  replicas: 4
  strategy:
    canary:
      maxUnavailable: 1
  template:
    spec:
      containers:
        - name: app
          image: app:1
"#,
            ),
        ];

        for (kind, manifest) in manifests {
            let parsed = parse_manifest(manifest).expect("parse");
            assert_eq!(parsed.kind, Some(kind));

            let first = form_data_to_yaml(kind, &parsed.descriptor).expect("first render");
            let reparsed = yaml_to_form_data(&first).expect("reparse");
            let second = form_data_to_yaml(kind, &reparsed).expect("second render");
            assert_eq!(first, second, "{kind} render is not stable");

            let rendered: Value = serde_yaml_ng::from_str(&second).expect("parse render");
            let template_labels = match kind {
                WorkloadKind::CronJob => &rendered["spec"]["jobTemplate"]["spec"]["template"]["metadata"]["labels"],
                _ => &rendered["spec"]["template"]["metadata"]["labels"],
            };
            assert_eq!(template_labels, &rendered["metadata"]["labels"], "{kind}");
            if !kind.is_batch() {
                assert!(!second.contains('&') && !second.contains('*'), "{kind} uses aliases");
                assert_eq!(
                    &rendered["spec"]["selector"]["matchLabels"],
                    &rendered["metadata"]["labels"],
                    "{kind}"
                );
            }
        }
    }
}
