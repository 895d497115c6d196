use std::marker::PhantomData;

use k8s_openapi::{
    Resource,
    api::admissionregistration::v1::{
        RuleWithOperations, ServiceReference, ValidatingWebhook, ValidatingWebhookConfiguration,
        WebhookClientConfig,
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use strum::Display;

/// We decide how the AdmissionReview is de-serialized, so only `v1` is offered.
pub const ADMISSION_REVIEW_VERSION: &str = "v1";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum SideEffects {
    #[default]
    None,
    NoneOnDryRun,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum FailurePolicy {
    #[default]
    Fail,
    Ignore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

pub struct WebhookConfiguration;

impl WebhookConfiguration {
    /// Create a validating webhook configuration
    pub fn validating(
        metadata: impl Into<ObjectMeta>,
    ) -> WebhookConfigurationBuilder<ValidatingWebhook, ValidatingWebhookConfiguration> {
        let config = ValidatingWebhookConfiguration {
            metadata: metadata.into(),
            ..Default::default()
        };

        WebhookConfigurationBuilder {
            hooks: PhantomData,
            config,
        }
    }
}

pub trait WebhookConfigurationExt<H> {
    fn webhooks_mut(&mut self) -> &mut Vec<H>;
}

impl WebhookConfigurationExt<ValidatingWebhook> for ValidatingWebhookConfiguration {
    fn webhooks_mut(&mut self) -> &mut Vec<ValidatingWebhook> {
        self.webhooks.get_or_insert_with(Vec::new)
    }
}

/// The [`WebhookConfigurationBuilder`] helps to create valid [validating][k8s-val] admission
/// webhook configurations.
///
/// [k8s-val]: https://kubernetes.io/docs/reference/access-authn-authz/admission-controllers/#validatingadmissionwebhook
#[derive(Debug, Default)]
pub struct WebhookConfigurationBuilder<H, C>
where
    C: Resource + WebhookConfigurationExt<H>,
{
    hooks: PhantomData<H>,
    config: C,
}

impl<H, C> WebhookConfigurationBuilder<H, C>
where
    C: Resource + WebhookConfigurationExt<H>,
{
    pub fn add_webhook(&mut self, webhook: H) -> &mut Self {
        self.config.webhooks_mut().push(webhook);
        self
    }

    pub fn build(self) -> C {
        self.config
    }
}

/// Builds a single [`ValidatingWebhook`] which is called through a Service.
pub struct ValidatingWebhookBuilder {
    name: String,
    side_effects: SideEffects,
    failure_policy: FailurePolicy,
    service: ServiceReference,
    rules: Vec<RuleWithOperations>,
}

impl ValidatingWebhookBuilder {
    /// `name` must be fully qualified, e.g. `my-validator.example.com`.
    pub fn new(
        name: impl Into<String>,
        service_namespace: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            side_effects: SideEffects::default(),
            failure_policy: FailurePolicy::default(),
            service: ServiceReference {
                namespace: service_namespace.into(),
                name: service_name.into(),
                path: None,
                port: None,
            },
            rules: Vec::new(),
        }
    }

    pub fn side_effects(mut self, side_effects: SideEffects) -> Self {
        self.side_effects = side_effects;
        self
    }

    pub fn failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn service_path(mut self, path: impl Into<String>) -> Self {
        self.service.path = Some(path.into());
        self
    }

    pub fn service_port(mut self, port: i32) -> Self {
        self.service.port = Some(port);
        self
    }

    /// Intercepts `operations` on `resources` of the given API group and version.
    pub fn add_rule(
        mut self,
        operations: &[Operation],
        api_group: &str,
        api_version: &str,
        resources: &[&str],
    ) -> Self {
        self.rules.push(RuleWithOperations {
            api_groups: Some(vec![api_group.to_owned()]),
            api_versions: Some(vec![api_version.to_owned()]),
            operations: Some(operations.iter().map(ToString::to_string).collect()),
            resources: Some(resources.iter().map(ToString::to_string).collect()),
            scope: None,
        });
        self
    }

    pub fn build(self) -> ValidatingWebhook {
        ValidatingWebhook {
            name: self.name,
            admission_review_versions: vec![ADMISSION_REVIEW_VERSION.to_owned()],
            side_effects: self.side_effects.to_string(),
            failure_policy: Some(self.failure_policy.to_string()),
            client_config: WebhookClientConfig {
                service: Some(self.service),
                ..WebhookClientConfig::default()
            },
            rules: (!self.rules.is_empty()).then_some(self.rules),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::meta::ObjectMetaBuilder;

    #[test]
    fn build_validating_configuration() {
        let mut builder =
            WebhookConfiguration::validating(ObjectMetaBuilder::new().name("validator").build());
        builder.add_webhook(
            ValidatingWebhookBuilder::new("validator.example.com", "default", "webhook")
                .service_path("/validate")
                .add_rule(&[Operation::Create, Operation::Update], "example.com", "v1", &[
                    "foos",
                ])
                .build(),
        );

        let config = builder.build();
        assert_eq!(config.metadata.name.as_deref(), Some("validator"));

        let webhooks = config.webhooks.unwrap();
        assert_eq!(webhooks.len(), 1);

        let webhook = &webhooks[0];
        assert_eq!(webhook.side_effects, "None");
        assert_eq!(webhook.failure_policy.as_deref(), Some("Fail"));
        assert_eq!(webhook.admission_review_versions, vec!["v1"]);
        assert_eq!(
            webhook.rules.as_ref().unwrap()[0].operations,
            Some(vec!["CREATE".to_owned(), "UPDATE".to_owned()])
        );
        assert_eq!(
            webhook.client_config.service.as_ref().unwrap().path.as_deref(),
            Some("/validate")
        );
    }

    #[test]
    fn configuration_without_webhooks() {
        let config =
            WebhookConfiguration::validating(ObjectMetaBuilder::new().name("empty").build())
                .build();
        assert_eq!(config.webhooks, None);
    }
}
