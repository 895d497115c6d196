use k8s_openapi::api::{apps::v1::Deployment, policy::v1::PodDisruptionBudget};
use kube::ResourceExt;
use snafu::OptionExt;
use tracing::instrument;

use super::{MissingDeploymentSpecSnafu, Result};
use crate::{
    builder::{meta::ObjectMetaBuilder, pdb::PodDisruptionBudgetBuilder},
    constants::APP_LABEL_KEY,
};

/// Keeps at least one Pod of the given Deployment running during voluntary disruptions, such as
/// node drains. The PodDisruptionBudget is named `<deployment>-pdb` and selects the same Pods as
/// the Deployment.
#[instrument(skip_all, fields(deployment = %deployment.name_any()))]
pub fn new_pod_disruption_budget_for_deployment(
    deployment: &Deployment,
) -> Result<PodDisruptionBudget> {
    let spec = deployment.spec.as_ref().context(MissingDeploymentSpecSnafu {
        deployment: deployment.name_any(),
    })?;

    let pdb_name = format!("{deployment}-pdb", deployment = deployment.name_any());
    let metadata = ObjectMetaBuilder::new()
        .name(&pdb_name)
        .namespace_opt(deployment.namespace())
        .with_label(APP_LABEL_KEY, &pdb_name)
        .build();

    Ok(PodDisruptionBudgetBuilder::new()
        .new_with_metadata(metadata)
        .with_selector(spec.selector.clone())
        .with_min_available(1)
        .build())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

    use super::*;
    use crate::components::{
        Error, component_selector, new_controller_deployment, tests::config,
    };

    #[test]
    fn pdb_for_controller() {
        let deployment = new_controller_deployment(&config(), "v0.26.0").unwrap();
        let pdb = new_pod_disruption_budget_for_deployment(&deployment).unwrap();

        assert_eq!(pdb.metadata.name.as_deref(), Some("virt-controller-pdb"));
        assert_eq!(pdb.metadata.namespace.as_deref(), Some("kubevirt"));
        assert_eq!(
            pdb.metadata.labels,
            Some(BTreeMap::from([(
                "kubevirt.io".to_owned(),
                "virt-controller-pdb".to_owned()
            )]))
        );

        let spec = pdb.spec.unwrap();
        assert_eq!(spec.min_available, Some(IntOrString::Int(1)));
        assert_eq!(spec.max_unavailable, None);
        assert_eq!(spec.selector, Some(component_selector("virt-controller")));
    }

    #[test]
    fn deployment_without_spec() {
        let deployment = Deployment {
            metadata: ObjectMetaBuilder::new().name("virt-api").build(),
            ..Deployment::default()
        };

        assert_eq!(
            new_pod_disruption_budget_for_deployment(&deployment),
            Err(Error::MissingDeploymentSpec {
                deployment: "virt-api".to_owned()
            })
        );
    }
}
