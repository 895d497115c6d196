use k8s_openapi::{api::core::v1::Service, apimachinery::pkg::util::intstr::IntOrString};
use snafu::ResultExt;
use tracing::instrument;

use super::{InvalidNamespaceSnafu, Result};
use crate::{
    builder::{
        meta::ObjectMetaBuilder,
        service::{ServiceBuilder, ServiceType},
    },
    constants::{
        APP_LABEL_KEY, HTTPS_PORT, METRICS_PORT_NAME, PROMETHEUS_LABEL_KEY,
        PROMETHEUS_SERVICE_NAME, SERVICE_PORT, VIRT_API_NAME,
    },
    validation,
};

/// The Service which Prometheus scrapes. It selects every Pod carrying the prometheus label,
/// regardless of the component.
#[instrument]
pub fn new_prometheus_service(namespace: &str) -> Result<Service> {
    validation::validate_namespace_name(namespace).context(InvalidNamespaceSnafu { namespace })?;

    let metadata = ObjectMetaBuilder::new()
        .name(PROMETHEUS_SERVICE_NAME)
        .namespace(namespace)
        .with_label(APP_LABEL_KEY, "")
        .with_label(PROMETHEUS_LABEL_KEY, "")
        .build();

    Ok(ServiceBuilder::new(metadata)
        .with_selector_label(PROMETHEUS_LABEL_KEY, "")
        .add_tcp_port(
            Some(METRICS_PORT_NAME),
            SERVICE_PORT,
            IntOrString::String(METRICS_PORT_NAME.to_owned()),
        )
        .service_type(ServiceType::ClusterIP)
        .build())
}

/// The Service in front of `virt-api`.
#[instrument]
pub fn new_api_server_service(namespace: &str) -> Result<Service> {
    validation::validate_namespace_name(namespace).context(InvalidNamespaceSnafu { namespace })?;

    let metadata = ObjectMetaBuilder::new()
        .name(VIRT_API_NAME)
        .namespace(namespace)
        .with_label(APP_LABEL_KEY, VIRT_API_NAME)
        .build();

    Ok(ServiceBuilder::new(metadata)
        .with_selector_label(APP_LABEL_KEY, VIRT_API_NAME)
        .add_tcp_port(None, SERVICE_PORT, IntOrString::Int(HTTPS_PORT.into()))
        .service_type(ServiceType::ClusterIP)
        .build())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::ServicePort;

    use super::*;
    use crate::components::Error;

    #[test]
    fn prometheus_service() {
        let service = new_prometheus_service("kubevirt").unwrap();

        assert_eq!(
            service.metadata.name.as_deref(),
            Some("kubevirt-prometheus-metrics")
        );
        assert_eq!(service.metadata.namespace.as_deref(), Some("kubevirt"));
        assert_eq!(
            service.metadata.labels,
            Some(BTreeMap::from([
                ("kubevirt.io".to_owned(), String::new()),
                ("prometheus.kubevirt.io".to_owned(), String::new()),
            ]))
        );

        let spec = service.spec.unwrap();
        assert_eq!(
            spec.selector,
            Some(BTreeMap::from([(
                "prometheus.kubevirt.io".to_owned(),
                String::new()
            )]))
        );
        assert_eq!(spec.ports, Some(vec![ServicePort {
            name: Some("metrics".to_owned()),
            port: 443,
            protocol: Some("TCP".to_owned()),
            target_port: Some(IntOrString::String("metrics".to_owned())),
            ..ServicePort::default()
        }]));
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
    }

    #[test]
    fn api_server_service() {
        let service = new_api_server_service("kubevirt").unwrap();

        assert_eq!(service.metadata.name.as_deref(), Some("virt-api"));
        let spec = service.spec.unwrap();
        assert_eq!(
            spec.selector,
            Some(BTreeMap::from([(
                "kubevirt.io".to_owned(),
                "virt-api".to_owned()
            )]))
        );
        assert_eq!(spec.ports, Some(vec![ServicePort {
            name: None,
            port: 443,
            protocol: Some("TCP".to_owned()),
            target_port: Some(IntOrString::Int(8443)),
            ..ServicePort::default()
        }]));
    }

    #[test]
    fn template_namespace() {
        let service = new_api_server_service("{{.Namespace}}").unwrap();
        assert_eq!(
            service.metadata.namespace.as_deref(),
            Some("{{.Namespace}}")
        );
    }

    #[test]
    fn invalid_namespace() {
        assert!(matches!(
            new_prometheus_service("-kubevirt"),
            Err(Error::InvalidNamespace { namespace, .. }) if namespace == "-kubevirt"
        ));
    }
}
