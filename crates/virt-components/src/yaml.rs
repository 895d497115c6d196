//! Utility functions for writing the generated objects as YAML manifests
use std::{io::Write, path::Path};

use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to write YAML to file {path:?}"))]
    WriteToFile {
        source: std::io::Error,
        path: std::path::PathBuf,
    },

    #[snafu(display("failed to write YAML to stdout"))]
    WriteToStdout { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// For most people the default implementation [`SerializeOptions::default()`] is sufficient as it
/// enables explicit document and singleton map serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to every document.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: true,
            singleton_map: true,
        }
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: serde::Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Serializes every value as its own YAML document. The documents are always separated by `---`,
/// [`SerializeOptions::explicit_document`] only controls the separator in front of the first one.
pub fn serialize_all<'a, T, W>(
    values: impl IntoIterator<Item = &'a T>,
    mut writer: W,
    options: SerializeOptions,
) -> Result<()>
where
    T: serde::Serialize + 'a,
    W: Write,
{
    for (index, value) in values.into_iter().enumerate() {
        let options = SerializeOptions {
            explicit_document: options.explicit_document || index > 0,
            ..options
        };
        serialize(value, &mut writer, options)?;
    }

    Ok(())
}

/// Serializes all values into a single multi-document YAML string.
pub fn to_multi_document_string<'a, T>(
    values: impl IntoIterator<Item = &'a T>,
    options: SerializeOptions,
) -> Result<String>
where
    T: serde::Serialize + 'a,
{
    let mut buffer = Vec::new();
    serialize_all(values, &mut buffer, options)?;

    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Writes all values as multi-document YAML to the file at `path`, replacing its content.
pub fn write_to_file<'a, T, P>(values: impl IntoIterator<Item = &'a T>, path: P) -> Result<()>
where
    T: serde::Serialize + 'a,
    P: AsRef<Path>,
{
    let yaml = to_multi_document_string(values, SerializeOptions::default())?;
    std::fs::write(path.as_ref(), yaml).context(WriteToFileSnafu {
        path: path.as_ref(),
    })
}

/// Prints all values as multi-document YAML to [stdout](std::io::stdout).
pub fn print_to_stdout<'a, T>(values: impl IntoIterator<Item = &'a T>) -> Result<()>
where
    T: serde::Serialize + 'a,
{
    let yaml = to_multi_document_string(values, SerializeOptions::default())?;

    std::io::stdout()
        .lock()
        .write_all(yaml.as_bytes())
        .context(WriteToStdoutSnafu)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::components::{
        ComponentResource, new_api_server_service, new_prometheus_service,
    };

    #[test]
    fn prometheus_service_manifest() {
        let service = new_prometheus_service("kubevirt").unwrap();

        let mut buffer = Vec::new();
        serialize(&service, &mut buffer, SerializeOptions::default()).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            indoc! {r#"
                ---
                apiVersion: v1
                kind: Service
                metadata:
                  labels:
                    kubevirt.io: ''
                    prometheus.kubevirt.io: ''
                  name: kubevirt-prometheus-metrics
                  namespace: kubevirt
                spec:
                  ports:
                  - name: metrics
                    port: 443
                    protocol: TCP
                    targetPort: metrics
                  selector:
                    prometheus.kubevirt.io: ''
                  type: ClusterIP
            "#}
        );
    }

    #[test]
    fn multiple_documents() {
        let resources: Vec<ComponentResource> = vec![
            new_prometheus_service("kubevirt").unwrap().into(),
            new_api_server_service("kubevirt").unwrap().into(),
        ];

        let yaml = to_multi_document_string(&resources, SerializeOptions::default()).unwrap();
        assert!(yaml.starts_with("---\napiVersion: v1\nkind: Service\n"));
        assert_eq!(yaml.matches("---\n").count(), 2);
        assert!(yaml.contains("\n---\napiVersion: v1\nkind: Service\nmetadata:\n  labels:\n    kubevirt.io: virt-api\n"));

        let options = SerializeOptions {
            explicit_document: false,
            ..SerializeOptions::default()
        };
        let yaml = to_multi_document_string(&resources, options).unwrap();
        assert!(yaml.starts_with("apiVersion: v1\n"));
        assert_eq!(yaml.matches("---\n").count(), 1);
    }

    #[test]
    fn no_documents() {
        let resources: Vec<ComponentResource> = Vec::new();
        assert_eq!(
            to_multi_document_string(&resources, SerializeOptions::default()).unwrap(),
            ""
        );
    }
}
