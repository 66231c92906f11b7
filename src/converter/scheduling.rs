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

//! Folding of single-condition affinity rows into Kubernetes affinity terms,
//! and back.

use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;

use super::container::non_empty_vec;
use super::parse::parse_enum;
use crate::types::descriptor::{
    NodeConditionRow, PodConditionRow, SchedulingForm, WeightedNodeConditionRow,
    WeightedPodConditionRow, split_commas,
};
use crate::types::k8s::SelectorOperator;

pub(super) fn fold_affinity(form: &SchedulingForm) -> Option<corev1::Affinity> {
    let node_affinity = {
        // Required rows are ANDed inside a single term.
        let required = (!form.node_affinity_required.is_empty()).then(|| corev1::NodeSelector {
            node_selector_terms: vec![corev1::NodeSelectorTerm {
                match_expressions: Some(
                    form.node_affinity_required
                        .iter()
                        .map(|row| node_requirement(&row.key, row.operator, &row.values))
                        .collect(),
                ),
                ..Default::default()
            }],
        });
        let preferred = non_empty_vec(
            form.node_affinity_preferred
                .iter()
                .map(|row| corev1::PreferredSchedulingTerm {
                    weight: row.weight,
                    preference: corev1::NodeSelectorTerm {
                        match_expressions: Some(vec![node_requirement(
                            &row.key,
                            row.operator,
                            &row.values,
                        )]),
                        ..Default::default()
                    },
                })
                .collect(),
        );

        (required.is_some() || preferred.is_some()).then_some(corev1::NodeAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        })
    };

    let pod_affinity = {
        let required = pod_terms(&form.pod_affinity_required);
        let preferred = weighted_pod_terms(&form.pod_affinity_preferred);
        (required.is_some() || preferred.is_some()).then_some(corev1::PodAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        })
    };

    let pod_anti_affinity = {
        let required = pod_terms(&form.pod_anti_affinity_required);
        let preferred = weighted_pod_terms(&form.pod_anti_affinity_preferred);
        (required.is_some() || preferred.is_some()).then_some(corev1::PodAntiAffinity {
            required_during_scheduling_ignored_during_execution: required,
            preferred_during_scheduling_ignored_during_execution: preferred,
        })
    };

    if node_affinity.is_none() && pod_affinity.is_none() && pod_anti_affinity.is_none() {
        return None;
    }

    Some(corev1::Affinity {
        node_affinity,
        pod_affinity,
        pod_anti_affinity,
    })
}

fn node_requirement(
    key: &str,
    operator: SelectorOperator,
    values: &str,
) -> corev1::NodeSelectorRequirement {
    corev1::NodeSelectorRequirement {
        key: key.to_string(),
        operator: operator.to_string(),
        values: non_empty_vec(split_commas(values)),
    }
}

fn pod_term(
    topology_key: &str,
    label_key: &str,
    operator: SelectorOperator,
    label_values: &str,
) -> corev1::PodAffinityTerm {
    corev1::PodAffinityTerm {
        topology_key: topology_key.to_string(),
        label_selector: Some(metav1::LabelSelector {
            match_expressions: Some(vec![metav1::LabelSelectorRequirement {
                key: label_key.to_string(),
                operator: operator.to_string(),
                values: non_empty_vec(split_commas(label_values)),
            }]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn pod_terms(rows: &[PodConditionRow]) -> Option<Vec<corev1::PodAffinityTerm>> {
    non_empty_vec(
        rows.iter()
            .map(|row| {
                pod_term(
                    &row.topology_key,
                    &row.label_key,
                    row.operator,
                    &row.label_values,
                )
            })
            .collect(),
    )
}

fn weighted_pod_terms(
    rows: &[WeightedPodConditionRow],
) -> Option<Vec<corev1::WeightedPodAffinityTerm>> {
    non_empty_vec(
        rows.iter()
            .map(|row| corev1::WeightedPodAffinityTerm {
                weight: row.weight,
                pod_affinity_term: pod_term(
                    &row.topology_key,
                    &row.label_key,
                    row.operator,
                    &row.label_values,
                ),
            })
            .collect(),
    )
}

/// Inverse of [`fold_affinity`] for the shapes the row format can express:
/// the expressions of the first required node term, and the first expression
/// of every other term. Anything else is dropped.
pub(super) fn unfold_affinity(affinity: &corev1::Affinity) -> Option<SchedulingForm> {
    let mut form = SchedulingForm::default();

    if let Some(node) = &affinity.node_affinity {
        if let Some(first_term) = node
            .required_during_scheduling_ignored_during_execution
            .as_ref()
            .and_then(|selector| selector.node_selector_terms.first())
        {
            form.node_affinity_required = first_term
                .match_expressions
                .iter()
                .flatten()
                .filter_map(|requirement| {
                    Some(NodeConditionRow {
                        key: requirement.key.clone(),
                        operator: parse_enum::<SelectorOperator>(&requirement.operator)?,
                        values: join_values(&requirement.values),
                    })
                })
                .collect();
        }

        form.node_affinity_preferred = node
            .preferred_during_scheduling_ignored_during_execution
            .iter()
            .flatten()
            .filter_map(|term| {
                let requirement = term.preference.match_expressions.as_ref()?.first()?;
                Some(WeightedNodeConditionRow {
                    weight: term.weight,
                    key: requirement.key.clone(),
                    operator: parse_enum::<SelectorOperator>(&requirement.operator)?,
                    values: join_values(&requirement.values),
                })
            })
            .collect();
    }

    if let Some(pod) = &affinity.pod_affinity {
        form.pod_affinity_required =
            unfold_pod_terms(&pod.required_during_scheduling_ignored_during_execution);
        form.pod_affinity_preferred =
            unfold_weighted_pod_terms(&pod.preferred_during_scheduling_ignored_during_execution);
    }

    if let Some(anti) = &affinity.pod_anti_affinity {
        form.pod_anti_affinity_required =
            unfold_pod_terms(&anti.required_during_scheduling_ignored_during_execution);
        form.pod_anti_affinity_preferred =
            unfold_weighted_pod_terms(&anti.preferred_during_scheduling_ignored_during_execution);
    }

    (!form.is_empty()).then_some(form)
}

fn unfold_pod_terms(terms: &Option<Vec<corev1::PodAffinityTerm>>) -> Vec<PodConditionRow> {
    terms
        .iter()
        .flatten()
        .filter_map(|term| {
            let (label_key, operator, label_values) = first_label_condition(term)?;
            Some(PodConditionRow {
                topology_key: term.topology_key.clone(),
                label_key,
                operator,
                label_values,
            })
        })
        .collect()
}

fn unfold_weighted_pod_terms(
    terms: &Option<Vec<corev1::WeightedPodAffinityTerm>>,
) -> Vec<WeightedPodConditionRow> {
    terms
        .iter()
        .flatten()
        .filter_map(|weighted| {
            let term = &weighted.pod_affinity_term;
            let (label_key, operator, label_values) = first_label_condition(term)?;
            Some(WeightedPodConditionRow {
                weight: weighted.weight,
                topology_key: term.topology_key.clone(),
                label_key,
                operator,
                label_values,
            })
        })
        .collect()
}

fn first_label_condition(term: &corev1::PodAffinityTerm) -> Option<(String, SelectorOperator, String)> {
    let requirement = term
        .label_selector
        .as_ref()?
        .match_expressions
        .as_ref()?
        .first()?;

    Some((
        requirement.key.clone(),
        parse_enum::<SelectorOperator>(&requirement.operator)?,
        join_values(&requirement.values),
    ))
}

fn join_values(values: &Option<Vec<String>>) -> String {
    values.as_deref().unwrap_or_default().join(",")
}
