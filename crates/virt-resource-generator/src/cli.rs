use std::{collections::BTreeMap, path::PathBuf};

use clap::{Args, Parser};
use virt_components::{
    commons::image::PullPolicy,
    components::{ComponentConfig, ComponentKind, OperatorShasums},
};

/// Generates the manifests of the virtualization control plane and prints them as multi-document
/// YAML.
///
/// Every string option may be a template placeholder (e.g. `{{.Namespace}}`), which is passed
/// through without validation.
#[derive(Debug, PartialEq, Eq, Parser)]
#[command(name = "resource-generator", long_about = None)]
pub struct Opts {
    /// The kind of resources to generate.
    #[arg(long = "type", env = "RESOURCE_TYPE", value_enum)]
    pub resource_type: ComponentKind,

    /// The namespace the components are installed into.
    #[arg(long, env, default_value = "kubevirt")]
    pub namespace: String,

    /// The image repository, e.g. `quay.io/kubevirt`.
    #[arg(long, env, default_value = "kubevirt")]
    pub repository: String,

    /// Prepended to every image name.
    #[arg(long, env, default_value = "")]
    pub image_prefix: String,

    /// The image tag or `sha256:` digest of the components.
    #[arg(long, env, default_value = "latest")]
    pub version: String,

    /// The image tag or digest of `virt-launcher`, defaults to `--version`.
    #[arg(long, env)]
    pub launcher_version: Option<String>,

    /// Added as `app.kubernetes.io/part-of` label.
    #[arg(long, env)]
    pub product_name: Option<String>,

    /// Added as `app.kubernetes.io/version` label.
    #[arg(long, env)]
    pub product_version: Option<String>,

    #[arg(long, env, value_enum, default_value_t)]
    pub pull_policy: PullPolicy,

    /// The log verbosity of the components.
    #[arg(long, env, default_value = "2")]
    pub verbosity: String,

    /// Additional env vars for `virt-api` and `virt-controller`, can be given multiple times.
    #[arg(long, env, value_name = "KEY=VALUE", value_parser = parse_env_var)]
    pub extra_env: Vec<(String, String)>,

    /// Writes the manifests to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE", env)]
    pub output: Option<PathBuf>,

    // IMPORTANT: All (flattened) sub structs should be placed at the end to ensure the help
    // headings are correct.
    #[command(flatten)]
    pub shasums: ShasumOptions,
}

/// The versions handed to `virt-operator`. They are only used if all of them (except the `gs`
/// digest) are set.
#[derive(Debug, Default, PartialEq, Eq, Args)]
#[command(next_help_heading = "Operator Options")]
pub struct ShasumOptions {
    #[arg(long, env, default_value = "")]
    pub kubevirt_version: String,

    #[arg(long, env, default_value = "")]
    pub virt_api_shasum: String,

    #[arg(long, env, default_value = "")]
    pub virt_controller_shasum: String,

    #[arg(long, env, default_value = "")]
    pub virt_handler_shasum: String,

    #[arg(long, env, default_value = "")]
    pub virt_launcher_shasum: String,

    #[arg(long, env, default_value = "")]
    pub gs_shasum: String,
}

impl Opts {
    pub fn component_config(&self) -> ComponentConfig {
        ComponentConfig {
            namespace: self.namespace.clone(),
            repository: self.repository.clone(),
            image_prefix: self.image_prefix.clone(),
            version: self.version.clone(),
            product_name: self.product_name.clone(),
            product_version: self.product_version.clone(),
            pull_policy: self.pull_policy,
            verbosity: self.verbosity.clone(),
            extra_env: self.extra_env.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }

    pub fn launcher_version(&self) -> &str {
        self.launcher_version.as_deref().unwrap_or(&self.version)
    }
}

impl From<&ShasumOptions> for OperatorShasums {
    fn from(options: &ShasumOptions) -> Self {
        Self {
            kubevirt_version: options.kubevirt_version.clone(),
            virt_api: options.virt_api_shasum.clone(),
            virt_controller: options.virt_controller_shasum.clone(),
            virt_handler: options.virt_handler_shasum.clone(),
            virt_launcher: options.virt_launcher_shasum.clone(),
            gs: options.gs_shasum.clone(),
        }
    }
}

fn parse_env_var(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected KEY=VALUE, got {input:?}")),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use rstest::rstest;

    use super::*;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let opts = Opts::try_parse_from(["resource-generator", "--type", "virt-api"]).unwrap();

        assert_eq!(opts.resource_type, ComponentKind::VirtApi);
        assert_eq!(opts.pull_policy, PullPolicy::IfNotPresent);
        assert_eq!(opts.launcher_version(), opts.version);
        assert_eq!(opts.output, None);
        assert!(!OperatorShasums::from(&opts.shasums).is_complete());
    }

    #[test]
    fn all_options() {
        let opts = Opts::try_parse_from([
            "resource-generator",
            "--type",
            "virt-controller",
            "--namespace",
            "{{.Namespace}}",
            "--repository",
            "quay.io/kubevirt",
            "--version",
            "v0.26.0",
            "--launcher-version",
            "sha256:launcher",
            "--pull-policy",
            "Always",
            "--extra-env",
            "FOO=bar",
            "--extra-env",
            "EMPTY=",
            "--extra-env",
            "JAVA_OPTS=-Xa,-Xb",
            "--product-name",
            "kubevirt",
            "-o",
            "manifests.yaml",
        ])
        .unwrap();

        let config = opts.component_config();
        assert_eq!(config.namespace, "{{.Namespace}}");
        assert_eq!(config.pull_policy, PullPolicy::Always);
        assert_eq!(config.product_name(), Some("kubevirt"));
        assert_eq!(
            config.extra_env,
            BTreeMap::from([
                ("EMPTY".to_owned(), String::new()),
                ("FOO".to_owned(), "bar".to_owned()),
                ("JAVA_OPTS".to_owned(), "-Xa,-Xb".to_owned()),
            ])
        );
        assert_eq!(opts.launcher_version(), "sha256:launcher");
        assert_eq!(opts.output, Some(PathBuf::from("manifests.yaml")));
    }

    #[rstest]
    #[case("FOO=bar", Ok(("FOO".to_owned(), "bar".to_owned())))]
    #[case("FOO=a=b", Ok(("FOO".to_owned(), "a=b".to_owned())))]
    #[case("FOO=a,b", Ok(("FOO".to_owned(), "a,b".to_owned())))]
    #[case("FOO", Err("expected KEY=VALUE, got \"FOO\"".to_owned()))]
    #[case("=bar", Err("expected KEY=VALUE, got \"=bar\"".to_owned()))]
    fn env_var_parsing(#[case] input: &str, #[case] expected: Result<(String, String), String>) {
        assert_eq!(parse_env_var(input), expected);
    }

    #[test]
    fn invalid_type() {
        assert!(Opts::try_parse_from(["resource-generator", "--type", "virt-handler"]).is_err());
    }
}
