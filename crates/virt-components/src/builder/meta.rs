use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// A builder to build [`ObjectMeta`] objects.
///
/// Labels and annotations are kept in [`BTreeMap`]s, so the resulting objects always serialize
/// identically.
#[derive(Clone, Debug, Default)]
pub struct ObjectMetaBuilder {
    name: Option<String>,
    namespace: Option<String>,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
}

impl ObjectMetaBuilder {
    pub fn new() -> ObjectMetaBuilder {
        ObjectMetaBuilder::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn name_opt(&mut self, name: impl Into<Option<String>>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn namespace_opt(&mut self, namespace: impl Into<Option<String>>) -> &mut Self {
        self.namespace = namespace.into();
        self
    }

    /// Adds a single label, overwriting any existing label with the same key.
    pub fn with_label(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Adds the label only if a value is present.
    pub fn with_label_opt(
        &mut self,
        key: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.with_label(key, value);
        }
        self
    }

    pub fn with_labels(&mut self, labels: BTreeMap<String, String>) -> &mut Self {
        self.labels.extend(labels);
        self
    }

    pub fn with_annotation(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn build(&self) -> ObjectMeta {
        ObjectMeta {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            labels: (!self.labels.is_empty()).then(|| self.labels.clone()),
            annotations: (!self.annotations.is_empty()).then(|| self.annotations.clone()),
            ..ObjectMeta::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_meta() {
        let meta = ObjectMetaBuilder::new()
            .name("virt-api")
            .namespace("kubevirt")
            .with_label("kubevirt.io", "virt-api")
            .with_label_opt("app.kubernetes.io/version", None::<String>)
            .with_label_opt("app.kubernetes.io/part-of", Some("kubevirt"))
            .with_annotation("scheduler.alpha.kubernetes.io/critical-pod", "")
            .build();

        assert_eq!(meta, ObjectMeta {
            name: Some("virt-api".to_owned()),
            namespace: Some("kubevirt".to_owned()),
            labels: Some(BTreeMap::from([
                ("app.kubernetes.io/part-of".to_owned(), "kubevirt".to_owned()),
                ("kubevirt.io".to_owned(), "virt-api".to_owned()),
            ])),
            annotations: Some(BTreeMap::from([(
                "scheduler.alpha.kubernetes.io/critical-pod".to_owned(),
                String::new()
            )])),
            ..ObjectMeta::default()
        });
    }

    #[test]
    fn empty_maps_are_omitted() {
        let meta = ObjectMetaBuilder::new().name("foo").build();

        assert_eq!(meta.labels, None);
        assert_eq!(meta.annotations, None);
    }
}
