use indexmap::IndexMap;
use k8s_openapi::{
    api::core::v1::{
        Affinity, Container, PodAntiAffinity, PodSecurityContext, PodSpec, PodTemplateSpec,
        Toleration, Volume,
    },
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
};
use snafu::Snafu;
use tracing::instrument;

use crate::builder::meta::ObjectMetaBuilder;

pub mod container;
pub mod env;
pub mod probe;
pub mod resources;
pub mod security;
pub mod volume;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display(
        "Colliding volume name {colliding_volume_name:?} in volumes with different content"
    ))]
    VolumeNameCollision { colliding_volume_name: String },
}

/// A builder to build [`PodTemplateSpec`] objects, usable for building a
/// [`Deployment`](`k8s_openapi::api::apps::v1::Deployment`).
///
/// Volumes are kept in an [`IndexMap`] to have consistent ordering. We are choosing it over a
/// [`BTreeMap`](std::collections::BTreeMap), because the volumes then show up in the order the
/// component templates add them, e.g. certificates before the profiling volume.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PodBuilder {
    containers: Vec<Container>,
    metadata: Option<ObjectMeta>,
    pod_anti_affinity: Option<PodAntiAffinity>,
    priority_class_name: Option<String>,
    security_context: Option<PodSecurityContext>,
    tolerations: Option<Vec<Toleration>>,

    /// The key is the volume name.
    volumes: IndexMap<String, Volume>,
    service_account_name: Option<String>,
}

impl PodBuilder {
    pub fn new() -> PodBuilder {
        PodBuilder::default()
    }

    pub fn service_account_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.service_account_name = Some(value.into());
        self
    }

    pub fn priority_class_name(&mut self, value: impl Into<String>) -> &mut Self {
        self.priority_class_name = Some(value.into());
        self
    }

    pub fn metadata_builder<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut ObjectMetaBuilder) -> &mut ObjectMetaBuilder,
    {
        let mut builder = ObjectMetaBuilder::new();
        let builder = f(&mut builder);
        self.metadata = Some(builder.build());
        self
    }

    pub fn metadata(&mut self, metadata: impl Into<ObjectMeta>) -> &mut Self {
        self.metadata = Some(metadata.into());
        self
    }

    pub fn pod_anti_affinity(&mut self, anti_affinity: PodAntiAffinity) -> &mut Self {
        self.pod_anti_affinity = Some(anti_affinity);
        self
    }

    pub fn add_container(&mut self, container: Container) -> &mut Self {
        self.containers.push(container);
        self
    }

    pub fn add_tolerations(&mut self, tolerations: Vec<Toleration>) -> &mut Self {
        self.tolerations
            .get_or_insert_with(Vec::new)
            .extend(tolerations);
        self
    }

    pub fn security_context(
        &mut self,
        security_context: impl Into<PodSecurityContext>,
    ) -> &mut Self {
        self.security_context = Some(security_context.into());
        self
    }

    /// Adds a new [`Volume`] to the Pod while ensuring that no colliding [`Volume`] exists.
    ///
    /// A colliding [`Volume`] would have the same name but a different content than another
    /// [`Volume`]. An appropriate error is returned when such a colliding volume name is
    /// encountered. Adding the exact same [`Volume`] twice is a no-op.
    #[instrument(skip(self))]
    pub fn add_volume(&mut self, volume: Volume) -> Result<&mut Self> {
        if let Some(existing_volume) = self.volumes.get(&volume.name) {
            if existing_volume != &volume {
                let colliding_volume_name = &volume.name;
                // We don't want to include the details in the error message, but instead trace them
                tracing::error!(
                    colliding_volume_name,
                    ?existing_volume,
                    "Colliding volume name in volumes with different content"
                );

                VolumeNameCollisionSnafu {
                    colliding_volume_name,
                }
                .fail()?;
            }
        } else {
            self.volumes.insert(volume.name.clone(), volume);
        }

        Ok(self)
    }

    /// See [`Self::add_volume`] for details
    pub fn add_volumes(&mut self, volumes: Vec<Volume>) -> Result<&mut Self> {
        for volume in volumes {
            self.add_volume(volume)?;
        }

        Ok(self)
    }

    /// Returns a [`PodTemplateSpec`], usable for building a
    /// [`Deployment`](`k8s_openapi::api::apps::v1::Deployment`)
    pub fn build_template(&self) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: self.metadata.clone(),
            spec: Some(self.build_spec()),
        }
    }

    fn build_spec(&self) -> PodSpec {
        let volumes = if self.volumes.is_empty() {
            None
        } else {
            Some(self.volumes.values().cloned().collect())
        };

        let affinity = self.pod_anti_affinity.clone().map(|pod_anti_affinity| Affinity {
            pod_anti_affinity: Some(pod_anti_affinity),
            ..Affinity::default()
        });

        PodSpec {
            affinity,
            containers: self.containers.clone(),
            priority_class_name: self.priority_class_name.clone(),
            security_context: self.security_context.clone(),
            service_account_name: self.service_account_name.clone(),
            tolerations: self.tolerations.clone(),
            volumes,
            ..PodSpec::default()
        }
    }
}
