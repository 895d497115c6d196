//! Builders and fixed templates for the Kubernetes objects that make up the control plane of the
//! virtualization operator: the `virt-api`, `virt-controller` and `virt-operator` Deployments,
//! their Services and PodDisruptionBudgets, and the operator's validating webhook configuration.
//!
//! ## Crate Features
//!
//! - `default` enables `clap`.
//! - `clap` derives [`clap::ValueEnum`] for enums which are exposed as CLI options, such as
//!   [`commons::image::PullPolicy`].

pub mod builder;
pub mod commons;
pub mod components;
pub mod constants;
pub mod logging;
pub mod validation;
pub mod yaml;

// External re-exports
pub use k8s_openapi;
pub use kube;
