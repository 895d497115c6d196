use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::ResourceRequirements, apimachinery::pkg::api::resource::Quantity,
};

const RESOURCE_CPU: &str = "cpu";
const RESOURCE_MEMORY: &str = "memory";

/// A builder for [`ResourceRequirements`]. Quantities are passed through as they are, e.g. `5m`
/// or `150Mi`.
#[derive(Clone, Debug, Default)]
pub struct ResourceRequirementsBuilder {
    requests: BTreeMap<String, Quantity>,
    limits: BTreeMap<String, Quantity>,
}

impl ResourceRequirementsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cpu_request(mut self, request: impl Into<String>) -> Self {
        self.requests
            .insert(RESOURCE_CPU.to_owned(), Quantity(request.into()));
        self
    }

    pub fn with_cpu_limit(mut self, limit: impl Into<String>) -> Self {
        self.limits
            .insert(RESOURCE_CPU.to_owned(), Quantity(limit.into()));
        self
    }

    pub fn with_memory_request(mut self, request: impl Into<String>) -> Self {
        self.requests
            .insert(RESOURCE_MEMORY.to_owned(), Quantity(request.into()));
        self
    }

    pub fn with_memory_limit(mut self, limit: impl Into<String>) -> Self {
        self.limits
            .insert(RESOURCE_MEMORY.to_owned(), Quantity(limit.into()));
        self
    }

    pub fn build(self) -> ResourceRequirements {
        ResourceRequirements {
            requests: (!self.requests.is_empty()).then_some(self.requests),
            limits: (!self.limits.is_empty()).then_some(self.limits),
            ..ResourceRequirements::default()
        }
    }
}
