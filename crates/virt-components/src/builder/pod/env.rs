use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, ObjectFieldSelector};

/// Turns a map of names to values into a list of plain [`EnvVar`]s, ordered by name.
pub fn env_vars_from_map(env: &BTreeMap<String, String>) -> Vec<EnvVar> {
    env.iter()
        .map(|(name, value)| EnvVar {
            name: name.clone(),
            value: Some(value.clone()),
            ..Default::default()
        })
        .collect()
}

/// An [`EnvVar`] whose value is projected from a field of the Pod via the downward API.
pub fn env_var_from_field_ref(
    env_var_name: impl Into<String>,
    field_path: impl Into<String>,
) -> EnvVar {
    EnvVar {
        name: env_var_name.into(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.into(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_is_sorted_by_name() {
        let env = BTreeMap::from([
            ("ZZZ".to_owned(), "last".to_owned()),
            ("AAA".to_owned(), "first".to_owned()),
        ]);

        let names: Vec<_> = env_vars_from_map(&env)
            .into_iter()
            .map(|env_var| (env_var.name, env_var.value))
            .collect();
        assert_eq!(names, vec![
            ("AAA".to_owned(), Some("first".to_owned())),
            ("ZZZ".to_owned(), Some("last".to_owned())),
        ]);
    }

    #[test]
    fn empty_map() {
        assert!(env_vars_from_map(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn field_ref() {
        let env_var = env_var_from_field_ref("WATCH_NAMESPACE", "metadata.namespace");

        assert_eq!(env_var.value, None);
        assert_eq!(
            env_var
                .value_from
                .and_then(|source| source.field_ref)
                .map(|field_ref| field_ref.field_path),
            Some("metadata.namespace".to_owned())
        );
    }
}
