use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use rstest::{fixture, rstest};
use strum::IntoEnumIterator;
use virt_components::{
    commons::image::PullPolicy,
    components::{ComponentConfig, ComponentKind, ComponentResource, OperatorShasums},
    yaml::{SerializeOptions, to_multi_document_string},
};

#[fixture]
fn config() -> ComponentConfig {
    ComponentConfig {
        namespace: "kubevirt".to_owned(),
        repository: "registry.example.com/kubevirt".to_owned(),
        image_prefix: String::new(),
        version: "v0.26.0".to_owned(),
        product_name: Some("kubevirt".to_owned()),
        product_version: Some("0.26.0".to_owned()),
        pull_policy: PullPolicy::IfNotPresent,
        verbosity: "2".to_owned(),
        extra_env: BTreeMap::new(),
    }
}

fn deployments(resources: &[ComponentResource]) -> Vec<&Deployment> {
    resources
        .iter()
        .filter_map(|resource| match resource {
            ComponentResource::Deployment(deployment) => Some(deployment.as_ref()),
            _ => None,
        })
        .collect()
}

#[rstest]
fn all_kinds_serialize(config: ComponentConfig) {
    let resources: Vec<ComponentResource> = ComponentKind::iter()
        .map(|kind| kind.resources(&config, &config.version, None))
        .collect::<Result<Vec<_>, _>>()
        .expect("all components are generated")
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(resources.len(), 9);

    let yaml = to_multi_document_string(&resources, SerializeOptions::default())
        .expect("resources serialize to YAML");
    assert_eq!(yaml.matches("---\n").count(), 9);

    // Every document is a bare object, the enum wrapper must not show up
    assert!(!yaml.contains("Deployment:\n"));
    for kind in [
        "kind: Deployment",
        "kind: Service",
        "kind: PodDisruptionBudget",
        "kind: ValidatingWebhookConfiguration",
    ] {
        assert!(yaml.contains(kind), "{kind} is missing");
    }
    assert!(yaml.contains("apiVersion: policy/v1\n"));
    assert!(yaml.contains("apiVersion: admissionregistration.k8s.io/v1\n"));
}

#[rstest]
fn documents_parse_back(config: ComponentConfig) {
    let resources = ComponentKind::VirtApi
        .resources(&config, &config.version, None)
        .expect("virt-api is generated");
    let yaml = to_multi_document_string(&resources, SerializeOptions::default())
        .expect("resources serialize to YAML");

    let documents: Vec<serde_yaml::Value> = serde_yaml::Deserializer::from_str(&yaml)
        .map(|document| {
            serde::Deserialize::deserialize(document).expect("every document is valid YAML")
        })
        .collect();
    let kinds: Vec<_> = documents
        .iter()
        .map(|document| document["kind"].as_str().expect("kind is set"))
        .collect();
    assert_eq!(kinds, vec!["Service", "Deployment", "PodDisruptionBudget"]);

    let deployment: Deployment =
        serde_yaml::from_value(documents[1].clone()).expect("the Deployment parses back");
    assert_eq!(
        &deployment,
        deployments(&resources)[0],
        "the manifest must describe the generated object"
    );
}

#[rstest]
fn operator_with_shasums(config: ComponentConfig) {
    let shasums = OperatorShasums {
        kubevirt_version: "v0.26.0".to_owned(),
        virt_api: "sha256:a".to_owned(),
        virt_controller: "sha256:c".to_owned(),
        virt_handler: "sha256:h".to_owned(),
        virt_launcher: "sha256:l".to_owned(),
        gs: "sha256:g".to_owned(),
    };

    let resources = ComponentKind::VirtOperator
        .resources(&config, &config.version, Some(&shasums))
        .expect("virt-operator is generated");
    let yaml = to_multi_document_string(&resources, SerializeOptions::default())
        .expect("resources serialize to YAML");

    assert!(yaml.contains("- name: GS_SHASUM\n          value: sha256:g\n"));
    assert!(yaml.contains("image: registry.example.com/kubevirt/virt-operator:v0.26.0\n"));
    // The operator doesn't carry the product labels
    assert!(!yaml.contains("app.kubernetes.io/part-of"));
}

#[rstest]
fn templated_install_strategy(config: ComponentConfig) {
    let config = ComponentConfig {
        namespace: "{{.Namespace}}".to_owned(),
        version: "{{.DockerTag}}".to_owned(),
        product_name: None,
        product_version: None,
        ..config
    };

    let resources = ComponentKind::VirtController
        .resources(&config, "{{.LauncherTag}}", None)
        .expect("templates are not validated");
    let deployment = deployments(&resources)[0];

    assert_eq!(
        deployment.metadata.namespace.as_deref(),
        Some("{{.Namespace}}")
    );
    let command = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .and_then(|spec| spec.containers[0].command.clone())
        .expect("virt-controller has a command");
    assert_eq!(
        command[2],
        "registry.example.com/kubevirt/virt-launcher:{{.LauncherTag}}"
    );
}
