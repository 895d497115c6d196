//! Fixed templates for the objects that make up the control plane.
//!
//! Every constructor takes the install-specific parameters (namespace, image repository,
//! versions, verbosity) and returns the object as it should be applied to the cluster. The
//! templates themselves are not configurable beyond these parameters.
use std::collections::BTreeMap;

use k8s_openapi::{
    api::{
        admissionregistration::v1::ValidatingWebhookConfiguration,
        apps::v1::Deployment,
        core::v1::{PodTemplateSpec, Service},
        policy::v1::PodDisruptionBudget,
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use strum::{Display, EnumIter, EnumString};

use crate::{
    builder::{
        meta::ObjectMetaBuilder,
        pod::{
            self, PodBuilder,
            container::{self, ContainerBuilder},
            probe,
            security::PodSecurityContextBuilder,
            volume::{VolumeBuilder, VolumeMountBuilder},
        },
    },
    commons::{
        affinity::{LabelSelectorOperator, preferred_pod_anti_affinity},
        image::{self, ImageVersion, PullPolicy, image_reference, is_template},
        tolerations::critical_addons_toleration,
    },
    constants::{
        APP_LABEL_KEY, CLUSTER_CRITICAL_PRIORITY_CLASS, CRITICAL_POD_ANNOTATION_KEY,
        K8S_APP_PART_OF_KEY, K8S_APP_VERSION_KEY, PROFILE_DATA_MOUNT_PATH,
        PROFILE_DATA_VOLUME_NAME, PROMETHEUS_LABEL_KEY,
    },
    validation,
};

mod deployments;
mod pdb;
mod services;
mod webhooks;

pub use deployments::*;
pub use pdb::*;
pub use services::*;
pub use webhooks::*;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("namespace {namespace:?} is invalid"))]
    InvalidNamespace {
        source: validation::Errors,
        namespace: String,
    },

    #[snafu(display("value {value:?} for label {key:?} is invalid"))]
    InvalidLabelValue {
        source: validation::Errors,
        key: &'static str,
        value: String,
    },

    #[snafu(display("failed to parse image version of {component}"))]
    ParseImageVersion {
        source: image::Error,
        component: String,
    },

    #[snafu(display("failed to create container {container_name:?}"))]
    CreateContainer {
        source: container::Error,
        container_name: String,
    },

    #[snafu(display("failed to add volume {volume_name:?} to the pod"))]
    AddVolume {
        source: pod::Error,
        volume_name: String,
    },

    #[snafu(display("failed to mount volume {volume_name:?} into the container"))]
    AddVolumeMount {
        source: container::Error,
        volume_name: String,
    },

    #[snafu(display("failed to build {probe} probe"))]
    BuildProbe {
        source: probe::Error,
        probe: &'static str,
    },

    #[snafu(display("deployment {deployment:?} has no spec to derive a PodDisruptionBudget from"))]
    MissingDeploymentSpec { deployment: String },
}

/// The install-specific parameters of a control plane component.
///
/// Any of the string parameters may be a template placeholder (e.g. `{{.Namespace}}`), which is
/// rendered by whoever consumes the generated manifests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentConfig {
    pub namespace: String,

    /// The image repository, e.g. `quay.io/kubevirt`.
    pub repository: String,

    /// Prepended to every image name, e.g. `ocp-` for `ocp-virt-api`.
    pub image_prefix: String,

    /// A tag, a `sha256:` digest or a template (starting with `{{if`).
    pub version: String,

    /// Added as `app.kubernetes.io/part-of` label if set and not empty.
    pub product_name: Option<String>,

    /// Added as `app.kubernetes.io/version` label if set and not empty.
    pub product_version: Option<String>,

    pub pull_policy: PullPolicy,

    /// Passed to the components as `-v <verbosity>`.
    pub verbosity: String,

    /// Additional env vars for the `virt-api` and `virt-controller` containers.
    pub extra_env: BTreeMap<String, String>,
}

impl ComponentConfig {
    pub fn product_name(&self) -> Option<&str> {
        self.product_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn product_version(&self) -> Option<&str> {
        self.product_version
            .as_deref()
            .filter(|version| !version.is_empty())
    }

    /// Validates the parameters which end up as names or label values.
    pub fn validate(&self) -> Result<()> {
        self.validate_namespace()?;
        self.validate_product_labels()
    }

    pub fn validate_namespace(&self) -> Result<()> {
        validation::validate_namespace_name(&self.namespace).context(InvalidNamespaceSnafu {
            namespace: &self.namespace,
        })
    }

    /// Template placeholders are skipped, they are only known once rendered.
    pub fn validate_product_labels(&self) -> Result<()> {
        for (key, value) in [
            (K8S_APP_PART_OF_KEY, self.product_name()),
            (K8S_APP_VERSION_KEY, self.product_version()),
        ] {
            if let Some(value) = value.filter(|value| !is_template(value)) {
                validation::is_label_value(value)
                    .context(InvalidLabelValueSnafu { key, value })?;
            }
        }

        Ok(())
    }

    /// Returns the image reference `<repository>/<prefix><name><version>`.
    pub fn image(&self, name: &str, version: &str) -> Result<String> {
        let version: ImageVersion = version
            .parse()
            .context(ParseImageVersionSnafu { component: name })?;

        Ok(image_reference(
            &self.repository,
            &format!("{prefix}{name}", prefix = self.image_prefix),
            &version,
        ))
    }
}

/// Any of the objects this crate generates. Serializes as the bare object.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComponentResource {
    Deployment(Box<Deployment>),
    Service(Box<Service>),
    PodDisruptionBudget(Box<PodDisruptionBudget>),
    ValidatingWebhookConfiguration(Box<ValidatingWebhookConfiguration>),
}

impl From<Deployment> for ComponentResource {
    fn from(deployment: Deployment) -> Self {
        Self::Deployment(Box::new(deployment))
    }
}

impl From<Service> for ComponentResource {
    fn from(service: Service) -> Self {
        Self::Service(Box::new(service))
    }
}

impl From<PodDisruptionBudget> for ComponentResource {
    fn from(pdb: PodDisruptionBudget) -> Self {
        Self::PodDisruptionBudget(Box::new(pdb))
    }
}

impl From<ValidatingWebhookConfiguration> for ComponentResource {
    fn from(config: ValidatingWebhookConfiguration) -> Self {
        Self::ValidatingWebhookConfiguration(Box::new(config))
    }
}

/// The groups of objects which can be generated together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ComponentKind {
    /// The Service exposing the metrics of all components.
    Prometheus,

    /// The API server Service, Deployment and PodDisruptionBudget.
    VirtApi,

    /// The controller Deployment and PodDisruptionBudget.
    VirtController,

    /// The operator Deployment.
    VirtOperator,

    /// The operator's webhook Service and ValidatingWebhookConfiguration.
    OperatorWebhook,
}

impl ComponentKind {
    /// Builds all objects of this kind.
    ///
    /// `launcher_version` is only used by [`ComponentKind::VirtController`], `shasums` only by
    /// [`ComponentKind::VirtOperator`].
    pub fn resources(
        self,
        config: &ComponentConfig,
        launcher_version: &str,
        shasums: Option<&OperatorShasums>,
    ) -> Result<Vec<ComponentResource>> {
        let resources = match self {
            Self::Prometheus => vec![new_prometheus_service(&config.namespace)?.into()],
            Self::VirtApi => {
                let deployment = new_api_server_deployment(config)?;
                let pdb = new_pod_disruption_budget_for_deployment(&deployment)?;
                vec![
                    new_api_server_service(&config.namespace)?.into(),
                    deployment.into(),
                    pdb.into(),
                ]
            }
            Self::VirtController => {
                let deployment = new_controller_deployment(config, launcher_version)?;
                let pdb = new_pod_disruption_budget_for_deployment(&deployment)?;
                vec![deployment.into(), pdb.into()]
            }
            Self::VirtOperator => vec![new_operator_deployment(config, shasums)?.into()],
            Self::OperatorWebhook => vec![
                new_operator_webhook_service(&config.namespace)?.into(),
                new_operator_validating_webhook_configuration(&config.namespace)?.into(),
            ],
        };

        Ok(resources)
    }
}

/// The label selector every control plane Deployment uses for its Pods.
pub(crate) fn component_selector(name: &str) -> LabelSelector {
    LabelSelector {
        match_expressions: None,
        match_labels: Some(BTreeMap::from([(
            APP_LABEL_KEY.to_owned(),
            name.to_owned(),
        )])),
    }
}

/// The parts shared by the Pods of all control plane Deployments: a single container named after
/// the component, critical scheduling, spreading across nodes and running as non-root.
pub(crate) struct ComponentPod {
    pod: PodBuilder,
    container: ContainerBuilder,
}

impl ComponentPod {
    /// `product` labels are only set for the Pods managed by the operator, the operator's own Pod
    /// doesn't carry them.
    pub(crate) fn new(
        name: &str,
        image: String,
        pull_policy: PullPolicy,
        product_name: Option<&str>,
        product_version: Option<&str>,
    ) -> Result<Self> {
        let mut container = ContainerBuilder::new(name).context(CreateContainerSnafu {
            container_name: name,
        })?;
        container.image(image).image_pull_policy(pull_policy);

        let mut pod = PodBuilder::new();
        pod.metadata(
            ObjectMetaBuilder::new()
                .name(name)
                .with_label(APP_LABEL_KEY, name)
                .with_label(PROMETHEUS_LABEL_KEY, "")
                .with_label_opt(K8S_APP_VERSION_KEY, product_version)
                .with_label_opt(K8S_APP_PART_OF_KEY, product_name)
                .with_annotation(CRITICAL_POD_ANNOTATION_KEY, "")
                .build(),
        )
        .priority_class_name(CLUSTER_CRITICAL_PRIORITY_CLASS)
        .add_tolerations(critical_addons_toleration())
        .pod_anti_affinity(preferred_pod_anti_affinity(
            APP_LABEL_KEY,
            LabelSelectorOperator::In,
            &[name],
        ))
        .security_context(PodSecurityContextBuilder::new().run_as_non_root().build());

        Ok(Self { pod, container })
    }

    pub(crate) fn pod(&mut self) -> &mut PodBuilder {
        &mut self.pod
    }

    pub(crate) fn container(&mut self) -> &mut ContainerBuilder {
        &mut self.container
    }

    /// Mounts the (optional) secret `secret_name` read-only at `mount_path`. The volume is named
    /// after the secret.
    pub(crate) fn attach_certificate_secret(
        &mut self,
        secret_name: &str,
        mount_path: &str,
    ) -> Result<&mut Self> {
        self.pod
            .add_volume(VolumeBuilder::new(secret_name).with_secret(secret_name, true).build())
            .context(AddVolumeSnafu {
                volume_name: secret_name,
            })?;
        self.container
            .add_volume_mount_struct(
                VolumeMountBuilder::new(secret_name, mount_path)
                    .read_only(true)
                    .build(),
            )
            .context(AddVolumeMountSnafu {
                volume_name: secret_name,
            })?;

        Ok(self)
    }

    /// Adds the emptyDir the components write profiling data to.
    pub(crate) fn attach_profile_volume(&mut self) -> Result<&mut Self> {
        self.pod
            .add_volume(VolumeBuilder::new(PROFILE_DATA_VOLUME_NAME).build())
            .context(AddVolumeSnafu {
                volume_name: PROFILE_DATA_VOLUME_NAME,
            })?;
        self.container
            .add_volume_mount_struct(
                VolumeMountBuilder::new(PROFILE_DATA_VOLUME_NAME, PROFILE_DATA_MOUNT_PATH).build(),
            )
            .context(AddVolumeMountSnafu {
                volume_name: PROFILE_DATA_VOLUME_NAME,
            })?;

        Ok(self)
    }

    pub(crate) fn build_template(mut self) -> PodTemplateSpec {
        self.pod
            .add_container(self.container.build())
            .build_template()
    }
}
