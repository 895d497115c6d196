use std::time::Duration;

use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec, DeploymentStrategy},
        core::v1::{EnvVar, PodTemplateSpec},
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use snafu::ResultExt;
use tracing::{debug, instrument};

use super::{BuildProbeSnafu, ComponentConfig, ComponentPod, Result, component_selector};
use crate::{
    builder::{
        meta::ObjectMetaBuilder,
        pod::{
            env::{env_var_from_field_ref, env_vars_from_map},
            probe::{ProbeBuilder, UriScheme},
            resources::ResourceRequirementsBuilder,
        },
    },
    constants::{
        API_SERVICE_ACCOUNT_NAME, APP_LABEL_KEY, CONSOLE_SERVER_PORT,
        CONTROLLER_SERVICE_ACCOUNT_NAME, HTTPS_PORT, K8S_APP_NAME_KEY, K8S_APP_PART_OF_KEY,
        K8S_APP_VERSION_KEY, METRICS_PORT_NAME, OPERATOR_SERVICE_ACCOUNT_NAME,
        SUBRESOURCE_API_VERSION, VIRT_API_NAME, VIRT_CONTROLLER_NAME, VIRT_LAUNCHER_NAME,
        VIRT_OPERATOR_NAME, WEBHOOKS_PORT, WEBHOOKS_PORT_NAME,
        env::{
            GS_SHASUM_ENV_NAME, KUBEVIRT_VERSION_ENV_NAME, OPERATOR_IMAGE_ENV_NAME,
            VIRT_API_SHASUM_ENV_NAME, VIRT_CONTROLLER_SHASUM_ENV_NAME,
            VIRT_HANDLER_SHASUM_ENV_NAME, VIRT_LAUNCHER_SHASUM_ENV_NAME, WATCH_NAMESPACE_ENV_NAME,
            WATCH_NAMESPACE_FIELD_PATH,
        },
        secret::{
            VIRT_API_CERT_SECRET_NAME, VIRT_CONTROLLER_CERT_SECRET_NAME,
            VIRT_HANDLER_CERT_SECRET_NAME, VIRT_OPERATOR_CERT_SECRET_NAME,
        },
    },
};

const DEPLOYMENT_REPLICAS: i32 = 2;
const ROLLING_UPDATE_STRATEGY: &str = "RollingUpdate";

/// The image digests the operator pins the components it deploys to.
///
/// They are only handed to the operator if the KubeVirt version and the digests of `virt-api`,
/// `virt-controller`, `virt-handler` and `virt-launcher` are all known. The `gs` digest is
/// optional on top of that.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperatorShasums {
    pub kubevirt_version: String,
    pub virt_api: String,
    pub virt_controller: String,
    pub virt_handler: String,
    pub virt_launcher: String,
    pub gs: String,
}

impl OperatorShasums {
    pub fn is_complete(&self) -> bool {
        [
            &self.kubevirt_version,
            &self.virt_api,
            &self.virt_controller,
            &self.virt_handler,
            &self.virt_launcher,
        ]
        .iter()
        .all(|value| !value.is_empty())
    }

    /// Returns `None` unless [`Self::is_complete`].
    pub fn env_vars(&self) -> Option<Vec<EnvVar>> {
        if !self.is_complete() {
            return None;
        }

        let mut env_vars: Vec<_> = [
            (KUBEVIRT_VERSION_ENV_NAME, &self.kubevirt_version),
            (VIRT_API_SHASUM_ENV_NAME, &self.virt_api),
            (VIRT_CONTROLLER_SHASUM_ENV_NAME, &self.virt_controller),
            (VIRT_HANDLER_SHASUM_ENV_NAME, &self.virt_handler),
            (VIRT_LAUNCHER_SHASUM_ENV_NAME, &self.virt_launcher),
        ]
        .into_iter()
        .map(|(name, value)| env_var(name, value))
        .collect();

        if !self.gs.is_empty() {
            env_vars.push(env_var(GS_SHASUM_ENV_NAME, &self.gs));
        }

        Some(env_vars)
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_owned(),
        value: Some(value.to_owned()),
        ..EnvVar::default()
    }
}

/// The `virt-api` Deployment, serving the subresource API on port 8443.
#[instrument(skip_all, fields(namespace = %config.namespace))]
pub fn new_api_server_deployment(config: &ComponentConfig) -> Result<Deployment> {
    config.validate()?;

    let mut pod = new_component_pod(config, VIRT_API_NAME)?;
    pod.attach_certificate_secret(VIRT_API_CERT_SECRET_NAME, "/etc/virt-api/certificates")?
        .attach_certificate_secret(
            VIRT_HANDLER_CERT_SECRET_NAME,
            "/etc/virt-handler/clientcertificates",
        )?
        .attach_profile_volume()?;
    pod.pod().service_account_name(API_SERVICE_ACCOUNT_NAME);

    let readiness_probe = ProbeBuilder::new()
        .with_http_get_action_helper(
            UriScheme::Https,
            HTTPS_PORT,
            format!("/apis/subresources.kubevirt.io/{SUBRESOURCE_API_VERSION}/healthz"),
        )
        .with_initial_delay(Duration::from_secs(15))
        .with_period(Duration::from_secs(10))
        .build()
        .context(BuildProbeSnafu { probe: "readiness" })?;

    pod.container()
        .command(vec![
            VIRT_API_NAME.to_owned(),
            "--port".to_owned(),
            HTTPS_PORT.to_string(),
            "--console-server-port".to_owned(),
            CONSOLE_SERVER_PORT.to_string(),
            "--subresources-only".to_owned(),
            "-v".to_owned(),
            config.verbosity.clone(),
        ])
        .add_container_port(VIRT_API_NAME, HTTPS_PORT)
        .add_container_port(METRICS_PORT_NAME, HTTPS_PORT)
        .readiness_probe(readiness_probe)
        .resources(
            ResourceRequirementsBuilder::new()
                .with_cpu_request("5m")
                .with_memory_request("150Mi")
                .build(),
        );

    Ok(new_base_deployment(config, VIRT_API_NAME, pod.build_template()))
}

/// The `virt-controller` Deployment. `launcher_version` is the version of the `virt-launcher`
/// image the controller starts for every virtual machine.
#[instrument(skip_all, fields(namespace = %config.namespace))]
pub fn new_controller_deployment(
    config: &ComponentConfig,
    launcher_version: &str,
) -> Result<Deployment> {
    config.validate()?;

    let launcher_image = config.image(VIRT_LAUNCHER_NAME, launcher_version)?;
    debug!(%launcher_image, "Using virt-launcher image");

    let mut pod = new_component_pod(config, VIRT_CONTROLLER_NAME)?;
    pod.pod().service_account_name(CONTROLLER_SERVICE_ACCOUNT_NAME);

    let liveness_probe = ProbeBuilder::new()
        .with_http_get_action_helper(UriScheme::Https, HTTPS_PORT, "/healthz")
        .with_failure_threshold(8)
        .with_initial_delay(Duration::from_secs(15))
        .with_timeout(Duration::from_secs(10))
        .build()
        .context(BuildProbeSnafu { probe: "liveness" })?;
    let readiness_probe = ProbeBuilder::new()
        .with_http_get_action_helper(UriScheme::Https, HTTPS_PORT, "/leader")
        .with_initial_delay(Duration::from_secs(15))
        .with_timeout(Duration::from_secs(10))
        .build()
        .context(BuildProbeSnafu { probe: "readiness" })?;

    pod.container()
        .command(vec![
            VIRT_CONTROLLER_NAME.to_owned(),
            "--launcher-image".to_owned(),
            launcher_image,
            "--port".to_owned(),
            HTTPS_PORT.to_string(),
            "-v".to_owned(),
            config.verbosity.clone(),
        ])
        .add_container_port(METRICS_PORT_NAME, HTTPS_PORT)
        .liveness_probe(liveness_probe)
        .readiness_probe(readiness_probe);

    pod.attach_certificate_secret(
        VIRT_CONTROLLER_CERT_SECRET_NAME,
        "/etc/virt-controller/certificates",
    )?
    .attach_profile_volume()?;

    pod.container().resources(
        ResourceRequirementsBuilder::new()
            .with_cpu_request("10m")
            .with_memory_request("150Mi")
            .build(),
    );

    Ok(new_base_deployment(
        config,
        VIRT_CONTROLLER_NAME,
        pod.build_template(),
    ))
}

/// The `virt-operator` Deployment. Only used to generate the install manifests, the operator
/// never deploys itself.
///
/// Unlike the other components, the operator carries neither the product labels nor the extra env
/// vars of the [`ComponentConfig`].
#[instrument(skip_all, fields(namespace = %config.namespace))]
pub fn new_operator_deployment(
    config: &ComponentConfig,
    shasums: Option<&OperatorShasums>,
) -> Result<Deployment> {
    config.validate_namespace()?;

    let image = config.image(VIRT_OPERATOR_NAME, &config.version)?;

    let mut pod = ComponentPod::new(
        VIRT_OPERATOR_NAME,
        image.clone(),
        config.pull_policy,
        None,
        None,
    )?;
    pod.pod().service_account_name(OPERATOR_SERVICE_ACCOUNT_NAME);

    let readiness_probe = ProbeBuilder::new()
        .with_http_get_action_helper(UriScheme::Https, HTTPS_PORT, "/metrics")
        .with_initial_delay(Duration::from_secs(5))
        .with_timeout(Duration::from_secs(10))
        .build()
        .context(BuildProbeSnafu { probe: "readiness" })?;

    pod.container()
        .command(vec![
            VIRT_OPERATOR_NAME.to_owned(),
            "--port".to_owned(),
            HTTPS_PORT.to_string(),
            "-v".to_owned(),
            config.verbosity.clone(),
        ])
        .add_container_port(METRICS_PORT_NAME, HTTPS_PORT)
        .add_container_port(WEBHOOKS_PORT_NAME, WEBHOOKS_PORT)
        .readiness_probe(readiness_probe)
        .add_env_var(OPERATOR_IMAGE_ENV_NAME, image)
        .add_env_vars(vec![env_var_from_field_ref(
            WATCH_NAMESPACE_ENV_NAME,
            WATCH_NAMESPACE_FIELD_PATH,
        )])
        .resources(
            ResourceRequirementsBuilder::new()
                .with_cpu_request("10m")
                .with_memory_request("150Mi")
                .build(),
        );

    match shasums.and_then(OperatorShasums::env_vars) {
        Some(env_vars) => {
            debug!("Pinning component images to their shasums");
            pod.container().add_env_vars(env_vars);
        }
        None => debug!("Shasums are incomplete, not pinning component images"),
    }

    pod.attach_certificate_secret(
        VIRT_OPERATOR_CERT_SECRET_NAME,
        "/etc/virt-operator/certificates",
    )?
    .attach_profile_volume()?;

    let metadata = ObjectMetaBuilder::new()
        .name(VIRT_OPERATOR_NAME)
        .namespace(&config.namespace)
        .with_label(APP_LABEL_KEY, VIRT_OPERATOR_NAME)
        .build();

    Ok(new_deployment(
        metadata,
        VIRT_OPERATOR_NAME,
        pod.build_template(),
        Some(DeploymentStrategy {
            type_: Some(ROLLING_UPDATE_STRATEGY.to_owned()),
            rolling_update: None,
        }),
    ))
}

/// The Pod of `virt-api` and `virt-controller`: the shared template with the product labels and
/// the extra env vars of the [`ComponentConfig`].
fn new_component_pod(config: &ComponentConfig, name: &str) -> Result<ComponentPod> {
    let mut pod = ComponentPod::new(
        name,
        config.image(name, &config.version)?,
        config.pull_policy,
        config.product_name(),
        config.product_version(),
    )?;
    pod.container()
        .add_env_vars(env_vars_from_map(&config.extra_env));

    Ok(pod)
}

fn new_base_deployment(
    config: &ComponentConfig,
    name: &str,
    template: PodTemplateSpec,
) -> Deployment {
    let metadata = ObjectMetaBuilder::new()
        .name(name)
        .namespace(&config.namespace)
        .with_label(APP_LABEL_KEY, name)
        .with_label(K8S_APP_NAME_KEY, name)
        .with_label_opt(K8S_APP_VERSION_KEY, config.product_version())
        .with_label_opt(K8S_APP_PART_OF_KEY, config.product_name())
        .build();

    new_deployment(metadata, name, template, None)
}

fn new_deployment(
    metadata: ObjectMeta,
    name: &str,
    template: PodTemplateSpec,
    strategy: Option<DeploymentStrategy>,
) -> Deployment {
    Deployment {
        metadata,
        spec: Some(DeploymentSpec {
            replicas: Some(DEPLOYMENT_REPLICAS),
            selector: component_selector(name),
            strategy,
            template,
            ..DeploymentSpec::default()
        }),
        status: None,
    }
}
