//! Environment variable names understood by `virt-operator`.

pub const OPERATOR_IMAGE_ENV_NAME: &str = "OPERATOR_IMAGE";
pub const WATCH_NAMESPACE_ENV_NAME: &str = "WATCH_NAMESPACE";

/// Filled by OLM.
pub const WATCH_NAMESPACE_FIELD_PATH: &str = "metadata.annotations['olm.targetNamespaces']";

pub const KUBEVIRT_VERSION_ENV_NAME: &str = "KUBEVIRT_VERSION";
pub const VIRT_API_SHASUM_ENV_NAME: &str = "VIRT_API_SHASUM";
pub const VIRT_CONTROLLER_SHASUM_ENV_NAME: &str = "VIRT_CONTROLLER_SHASUM";
pub const VIRT_HANDLER_SHASUM_ENV_NAME: &str = "VIRT_HANDLER_SHASUM";
pub const VIRT_LAUNCHER_SHASUM_ENV_NAME: &str = "VIRT_LAUNCHER_SHASUM";
pub const GS_SHASUM_ENV_NAME: &str = "GS_SHASUM";
