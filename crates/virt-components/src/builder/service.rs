use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{Service, ServicePort, ServiceSpec},
    apimachinery::pkg::{apis::meta::v1::ObjectMeta, util::intstr::IntOrString},
};
use strum::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    NodePort,
    LoadBalancer,
}

/// A builder to build [`Service`] objects.
#[derive(Clone, Debug, Default)]
pub struct ServiceBuilder {
    metadata: ObjectMeta,
    selector: BTreeMap<String, String>,
    ports: Vec<ServicePort>,
    service_type: ServiceType,
}

impl ServiceBuilder {
    pub fn new(metadata: impl Into<ObjectMeta>) -> ServiceBuilder {
        ServiceBuilder {
            metadata: metadata.into(),
            ..ServiceBuilder::default()
        }
    }

    pub fn with_selector_label(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.selector.insert(key.into(), value.into());
        self
    }

    /// Adds a TCP port which forwards `port` to `target_port` of the selected Pods. The target
    /// port can be a number or the name of a container port.
    pub fn add_tcp_port(
        &mut self,
        name: Option<&str>,
        port: i32,
        target_port: IntOrString,
    ) -> &mut Self {
        self.ports.push(ServicePort {
            name: name.map(ToOwned::to_owned),
            port,
            protocol: Some("TCP".to_owned()),
            target_port: Some(target_port),
            ..ServicePort::default()
        });
        self
    }

    pub fn service_type(&mut self, service_type: ServiceType) -> &mut Self {
        self.service_type = service_type;
        self
    }

    pub fn build(&self) -> Service {
        Service {
            metadata: self.metadata.clone(),
            spec: Some(ServiceSpec {
                selector: (!self.selector.is_empty()).then(|| self.selector.clone()),
                ports: (!self.ports.is_empty()).then(|| self.ports.clone()),
                type_: Some(self.service_type.to_string()),
                ..ServiceSpec::default()
            }),
            status: None,
        }
    }
}
