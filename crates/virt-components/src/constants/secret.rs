pub const VIRT_API_CERT_SECRET_NAME: &str = "kubevirt-virt-api-certs";
pub const VIRT_HANDLER_CERT_SECRET_NAME: &str = "kubevirt-virt-handler-certs";
pub const VIRT_CONTROLLER_CERT_SECRET_NAME: &str = "kubevirt-controller-certs";
pub const VIRT_OPERATOR_CERT_SECRET_NAME: &str = "kubevirt-operator-certs";

/// Annotation telling the operator which secret holds the CA bundle to inject into a webhook
/// configuration.
pub const CERTIFICATE_SECRET_ANNOTATION_KEY: &str = "certificates.kubevirt.io/secret";
