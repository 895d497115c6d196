use k8s_openapi::{
    api::core::v1::{PodAffinityTerm, PodAntiAffinity, WeightedPodAffinityTerm},
    apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement},
};
use strum::Display;

pub const TOPOLOGY_KEY_HOSTNAME: &str = "kubernetes.io/hostname";

/// Operators usable in a [`LabelSelectorRequirement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum LabelSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Creates a `WeightedPodAffinityTerm` with a single match expression `key <operator> values`.
pub fn weighted_pod_affinity_term(
    key: &str,
    operator: LabelSelectorOperator,
    values: &[&str],
    topology_key: &str,
    weight: i32,
) -> WeightedPodAffinityTerm {
    WeightedPodAffinityTerm {
        pod_affinity_term: PodAffinityTerm {
            label_selector: Some(LabelSelector {
                match_expressions: Some(vec![LabelSelectorRequirement {
                    key: key.to_owned(),
                    operator: operator.to_string(),
                    values: Some(values.iter().map(ToString::to_string).collect()),
                }]),
                match_labels: None,
            }),
            topology_key: topology_key.to_owned(),
            ..PodAffinityTerm::default()
        },
        weight,
    }
}

/// Creates a [`PodAntiAffinity`] which prefers (weight 1) not to schedule two Pods whose `key`
/// label matches `values` onto the same node.
///
/// All control plane components use this to spread their replicas across nodes without blocking
/// scheduling on single node clusters.
pub fn preferred_pod_anti_affinity(
    key: &str,
    operator: LabelSelectorOperator,
    values: &[&str],
) -> PodAntiAffinity {
    PodAntiAffinity {
        preferred_during_scheduling_ignored_during_execution: Some(vec![
            weighted_pod_affinity_term(key, operator, values, TOPOLOGY_KEY_HOSTNAME, 1),
        ]),
        required_during_scheduling_ignored_during_execution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anti_affinity_towards_own_pods() {
        let anti_affinity =
            preferred_pod_anti_affinity("kubevirt.io", LabelSelectorOperator::In, &["virt-api"]);

        assert_eq!(anti_affinity, PodAntiAffinity {
            preferred_during_scheduling_ignored_during_execution: Some(vec![
                WeightedPodAffinityTerm {
                    pod_affinity_term: PodAffinityTerm {
                        label_selector: Some(LabelSelector {
                            match_expressions: Some(vec![LabelSelectorRequirement {
                                key: "kubevirt.io".to_owned(),
                                operator: "In".to_owned(),
                                values: Some(vec!["virt-api".to_owned()]),
                            }]),
                            match_labels: None,
                        }),
                        topology_key: "kubernetes.io/hostname".to_owned(),
                        ..Default::default()
                    },
                    weight: 1,
                }
            ]),
            required_during_scheduling_ignored_during_execution: None,
        });
    }

    #[test]
    fn operator_display() {
        assert_eq!(LabelSelectorOperator::NotIn.to_string(), "NotIn");
        assert_eq!(LabelSelectorOperator::DoesNotExist.to_string(), "DoesNotExist");
    }
}
