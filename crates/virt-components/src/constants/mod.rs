//! Well-known names, label keys and values shared by the component templates.
use const_format::concatcp;

pub mod env;
pub mod secret;

/// The app label key `kubevirt.io`. The same key is used as the selector key of every
/// Deployment and as the anti-affinity key of every pod.
pub const APP_LABEL_KEY: &str = "kubevirt.io";

/// Pods carrying this label (with an empty value) are scraped by the metrics Service.
pub const PROMETHEUS_LABEL_KEY: &str = concatcp!("prometheus.", APP_LABEL_KEY);

/// The well-known Kubernetes app key prefix.
const K8S_APP_KEY_PREFIX: &str = "app.kubernetes.io/";

/// The well-known Kubernetes app name key `app.kubernetes.io/name`.
pub const K8S_APP_NAME_KEY: &str = concatcp!(K8S_APP_KEY_PREFIX, "name");

/// The well-known Kubernetes app version key `app.kubernetes.io/version`. It carries the
/// product version, if one was configured.
pub const K8S_APP_VERSION_KEY: &str = concatcp!(K8S_APP_KEY_PREFIX, "version");

/// The well-known Kubernetes app part-of key `app.kubernetes.io/part-of`. It carries the
/// product name, if one was configured.
pub const K8S_APP_PART_OF_KEY: &str = concatcp!(K8S_APP_KEY_PREFIX, "part-of");

pub const VIRT_API_NAME: &str = "virt-api";
pub const VIRT_CONTROLLER_NAME: &str = "virt-controller";
pub const VIRT_OPERATOR_NAME: &str = "virt-operator";
pub const VIRT_LAUNCHER_NAME: &str = "virt-launcher";

pub const API_SERVICE_ACCOUNT_NAME: &str = "kubevirt-apiserver";
pub const CONTROLLER_SERVICE_ACCOUNT_NAME: &str = "kubevirt-controller";
pub const OPERATOR_SERVICE_ACCOUNT_NAME: &str = "kubevirt-operator";

pub const PROMETHEUS_SERVICE_NAME: &str = "kubevirt-prometheus-metrics";
pub const OPERATOR_WEBHOOK_SERVICE_NAME: &str = "kubevirt-operator-webhook";

pub const CLUSTER_CRITICAL_PRIORITY_CLASS: &str = "kubevirt-cluster-critical";
pub const CRITICAL_POD_ANNOTATION_KEY: &str = "scheduler.alpha.kubernetes.io/critical-pod";
pub const CRITICAL_ADDONS_ONLY_TOLERATION_KEY: &str = "CriticalAddonsOnly";

/// The API version under which `virt-api` serves its subresources.
pub const SUBRESOURCE_API_VERSION: &str = "v1alpha3";

pub const PROFILE_DATA_VOLUME_NAME: &str = "profile-data";
pub const PROFILE_DATA_MOUNT_PATH: &str = "/profile-data";

pub const HTTPS_PORT: u16 = 8443;
pub const WEBHOOKS_PORT: u16 = 8444;
pub const CONSOLE_SERVER_PORT: u16 = 8186;
pub const SERVICE_PORT: i32 = 443;

pub const METRICS_PORT_NAME: &str = "metrics";
pub const WEBHOOKS_PORT_NAME: &str = "webhooks";
