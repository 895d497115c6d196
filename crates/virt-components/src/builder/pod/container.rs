use indexmap::IndexMap;
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, Probe, ResourceRequirements, VolumeMount,
};
use snafu::{ResultExt, Snafu};

use crate::{commons::image::PullPolicy, validation};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("container name {container_name:?} is invalid"))]
    InvalidContainerName {
        source: validation::Errors,
        container_name: String,
    },

    #[snafu(display(
        "colliding mountPath {colliding_mount_path:?} in volumeMounts with different content"
    ))]
    MountPathCollision { colliding_mount_path: String },
}

/// A builder to build [`Container`] objects.
///
/// Volume mounts are kept in an [`IndexMap`] keyed by their mount path, so they keep the order
/// they were added in and the same path can't be mounted twice.
#[derive(Clone, Debug, Default)]
pub struct ContainerBuilder {
    name: String,
    image: Option<String>,
    image_pull_policy: Option<String>,
    command: Option<Vec<String>>,
    container_ports: Option<Vec<ContainerPort>>,
    env: Option<Vec<EnvVar>>,
    volume_mounts: IndexMap<String, VolumeMount>,
    readiness_probe: Option<Probe>,
    liveness_probe: Option<Probe>,
    resources: Option<ResourceRequirements>,
}

impl ContainerBuilder {
    /// Container names must be lowercase RFC 1123 labels.
    pub fn new(name: &str) -> Result<Self> {
        validation::is_rfc_1123_label(name).context(InvalidContainerNameSnafu {
            container_name: name,
        })?;

        Ok(ContainerBuilder {
            name: name.to_owned(),
            ..ContainerBuilder::default()
        })
    }

    pub fn image(&mut self, image: impl Into<String>) -> &mut Self {
        self.image = Some(image.into());
        self
    }

    pub fn image_pull_policy(&mut self, pull_policy: PullPolicy) -> &mut Self {
        self.image_pull_policy = Some(pull_policy.to_string());
        self
    }

    pub fn command(&mut self, command: Vec<String>) -> &mut Self {
        self.command = Some(command);
        self
    }

    pub fn add_env_var(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.env.get_or_insert_with(Vec::new).push(EnvVar {
            name: name.into(),
            value: Some(value.into()),
            ..EnvVar::default()
        });
        self
    }

    /// Appends the given env vars. Nothing is set on the container if the list is empty.
    pub fn add_env_vars(&mut self, env_vars: Vec<EnvVar>) -> &mut Self {
        if !env_vars.is_empty() {
            self.env.get_or_insert_with(Vec::new).extend(env_vars);
        }
        self
    }

    pub fn add_container_port(&mut self, name: impl Into<String>, container_port: u16) -> &mut Self {
        self.container_ports
            .get_or_insert_with(Vec::new)
            .push(ContainerPort {
                container_port: i32::from(container_port),
                name: Some(name.into()),
                protocol: Some("TCP".to_owned()),
                ..ContainerPort::default()
            });
        self
    }

    /// Adds a [`VolumeMount`], failing if a different mount for the same path already exists.
    /// Adding the identical mount twice is a no-op.
    pub fn add_volume_mount_struct(&mut self, volume_mount: VolumeMount) -> Result<&mut Self> {
        if let Some(existing_volume_mount) = self.volume_mounts.get(&volume_mount.mount_path) {
            if existing_volume_mount != &volume_mount {
                let colliding_mount_path = &volume_mount.mount_path;
                // We don't want to include the details in the error message, but instead trace them
                tracing::error!(
                    container.name = %self.name,
                    colliding_mount_path,
                    ?existing_volume_mount,
                    "Colliding mountPath in volumeMounts with different content"
                );

                MountPathCollisionSnafu {
                    colliding_mount_path,
                }
                .fail()?;
            }
        } else {
            self.volume_mounts
                .insert(volume_mount.mount_path.clone(), volume_mount);
        }

        Ok(self)
    }

    pub fn readiness_probe(&mut self, probe: Probe) -> &mut Self {
        self.readiness_probe = Some(probe);
        self
    }

    pub fn liveness_probe(&mut self, probe: Probe) -> &mut Self {
        self.liveness_probe = Some(probe);
        self
    }

    pub fn resources(&mut self, resources: ResourceRequirements) -> &mut Self {
        self.resources = Some(resources);
        self
    }

    pub fn build(&self) -> Container {
        Container {
            name: self.name.clone(),
            image: self.image.clone(),
            image_pull_policy: self.image_pull_policy.clone(),
            command: self.command.clone(),
            ports: self.container_ports.clone(),
            env: self.env.clone(),
            volume_mounts: (!self.volume_mounts.is_empty())
                .then(|| self.volume_mounts.values().cloned().collect()),
            readiness_probe: self.readiness_probe.clone(),
            liveness_probe: self.liveness_probe.clone(),
            resources: self.resources.clone(),
            ..Container::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::builder::pod::volume::VolumeMountBuilder;

    #[test]
    fn test_container_builder() {
        let container = ContainerBuilder::new("virt-api")
            .unwrap()
            .image("quay.io/kubevirt/virt-api:v0.26.0")
            .image_pull_policy(PullPolicy::Always)
            .command(vec!["virt-api".to_owned(), "--port".to_owned()])
            .add_container_port("metrics", 8443)
            .add_env_var("FOO", "bar")
            .add_env_vars(vec![])
            .build();

        assert_eq!(container.name, "virt-api");
        assert_eq!(
            container.image.as_deref(),
            Some("quay.io/kubevirt/virt-api:v0.26.0")
        );
        assert_eq!(container.image_pull_policy.as_deref(), Some("Always"));
        assert_eq!(container.ports, Some(vec![ContainerPort {
            container_port: 8443,
            name: Some("metrics".to_owned()),
            protocol: Some("TCP".to_owned()),
            ..ContainerPort::default()
        }]));
        assert_eq!(container.env.map(|env| env.len()), Some(1));
        assert_eq!(container.volume_mounts, None);
    }

    #[test]
    fn empty_env_is_not_set() {
        let container = ContainerBuilder::new("foo")
            .unwrap()
            .add_env_vars(Vec::new())
            .build();
        assert_eq!(container.env, None);
    }

    #[rstest]
    #[case("Virt-API")]
    #[case("virt_api")]
    #[case("")]
    fn invalid_container_name(#[case] name: &str) {
        let result = ContainerBuilder::new(name);
        assert!(matches!(
            result,
            Err(Error::InvalidContainerName { container_name, .. }) if container_name == name
        ));
    }

    #[test]
    fn volume_mount_collision() {
        let mut container_builder = ContainerBuilder::new("foo").unwrap();
        container_builder
            .add_volume_mount_struct(VolumeMountBuilder::new("certs", "/etc/certs").build())
            .unwrap()
            // Same content is fine
            .add_volume_mount_struct(VolumeMountBuilder::new("certs", "/etc/certs").build())
            .unwrap();

        let result = container_builder.add_volume_mount_struct(
            VolumeMountBuilder::new("other-certs", "/etc/certs").build(),
        );
        assert_eq!(result.err(), Some(Error::MountPathCollision {
            colliding_mount_path: "/etc/certs".to_owned()
        }));

        assert_eq!(container_builder.build().volume_mounts.unwrap().len(), 1);
    }
}
