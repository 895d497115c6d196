use k8s_openapi::{
    api::{admissionregistration::v1::ValidatingWebhookConfiguration, core::v1::Service},
    apimachinery::pkg::util::intstr::IntOrString,
};
use snafu::ResultExt;
use tracing::instrument;

use super::{InvalidNamespaceSnafu, Result};
use crate::{
    builder::{
        meta::ObjectMetaBuilder,
        service::{ServiceBuilder, ServiceType},
        webhook::{FailurePolicy, Operation, SideEffects, ValidatingWebhookBuilder, WebhookConfiguration},
    },
    constants::{
        APP_LABEL_KEY, OPERATOR_WEBHOOK_SERVICE_NAME, SERVICE_PORT, SUBRESOURCE_API_VERSION,
        VIRT_OPERATOR_NAME, WEBHOOKS_PORT_NAME,
        secret::{CERTIFICATE_SECRET_ANNOTATION_KEY, VIRT_OPERATOR_CERT_SECRET_NAME},
    },
    validation,
};

pub const OPERATOR_VALIDATOR_NAME: &str = "virt-operator-validator";
pub const KUBEVIRT_DELETE_VALIDATE_PATH: &str = "/kubevirt-validate-delete";

const KUBEVIRT_API_GROUP: &str = "kubevirt.io";
const KUBEVIRT_RESOURCE: &str = "kubevirts";

/// Rejects deleting a KubeVirt installation while it is still in use. The decision itself is made
/// by the operator behind [`new_operator_webhook_service`].
#[instrument]
pub fn new_operator_validating_webhook_configuration(
    namespace: &str,
) -> Result<ValidatingWebhookConfiguration> {
    validation::validate_namespace_name(namespace).context(InvalidNamespaceSnafu { namespace })?;

    let metadata = ObjectMetaBuilder::new()
        .name(OPERATOR_VALIDATOR_NAME)
        .with_label(APP_LABEL_KEY, VIRT_OPERATOR_NAME)
        .with_annotation(
            CERTIFICATE_SECRET_ANNOTATION_KEY,
            VIRT_OPERATOR_CERT_SECRET_NAME,
        )
        .build();

    let webhook = ValidatingWebhookBuilder::new(
        format!("{OPERATOR_VALIDATOR_NAME}.{KUBEVIRT_API_GROUP}"),
        namespace,
        OPERATOR_WEBHOOK_SERVICE_NAME,
    )
    .service_path(KUBEVIRT_DELETE_VALIDATE_PATH)
    .service_port(SERVICE_PORT)
    .add_rule(
        &[Operation::Delete],
        KUBEVIRT_API_GROUP,
        SUBRESOURCE_API_VERSION,
        &[KUBEVIRT_RESOURCE],
    )
    .failure_policy(FailurePolicy::Fail)
    .side_effects(SideEffects::None)
    .build();

    let mut builder = WebhookConfiguration::validating(metadata);
    builder.add_webhook(webhook);

    Ok(builder.build())
}

/// The Service the API server reaches the operator's webhooks through.
#[instrument]
pub fn new_operator_webhook_service(namespace: &str) -> Result<Service> {
    validation::validate_namespace_name(namespace).context(InvalidNamespaceSnafu { namespace })?;

    let metadata = ObjectMetaBuilder::new()
        .name(OPERATOR_WEBHOOK_SERVICE_NAME)
        .namespace(namespace)
        .with_label(APP_LABEL_KEY, VIRT_OPERATOR_NAME)
        .build();

    Ok(ServiceBuilder::new(metadata)
        .with_selector_label(APP_LABEL_KEY, VIRT_OPERATOR_NAME)
        .add_tcp_port(
            Some(WEBHOOKS_PORT_NAME),
            SERVICE_PORT,
            IntOrString::String(WEBHOOKS_PORT_NAME.to_owned()),
        )
        .service_type(ServiceType::ClusterIP)
        .build())
}
