use std::{fmt::Display, str::FromStr};

use snafu::{Snafu, ensure};
use strum::{Display as StrumDisplay, EnumString};

const DIGEST_PREFIX: &str = "sha256:";
const TEMPLATE_PREFIX: &str = "{{if";
const TEMPLATE_MARKER: &str = "{{";

#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum Error {
    #[snafu(display("image version must not be empty"))]
    EmptyVersion,
}

/// The version part of an image reference.
///
/// A version can be a tag, a digest or a (Go) template which is rendered later on by whoever
/// consumes the generated manifests. Tags are separated from the image name by `:`, digests by
/// `@`. Templates have to take care of the correct separator themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageVersion {
    Tag(String),
    Digest(String),
    Template(String),
}

impl FromStr for ImageVersion {
    type Err = Error;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        ensure!(!version.is_empty(), EmptyVersionSnafu);
        Ok(Self::classify(version))
    }
}

impl ImageVersion {
    fn classify(version: &str) -> Self {
        if version.starts_with(DIGEST_PREFIX) {
            Self::Digest(version.to_owned())
        } else if version.starts_with(TEMPLATE_PREFIX) {
            Self::Template(version.to_owned())
        } else {
            Self::Tag(version.to_owned())
        }
    }
}

impl Display for ImageVersion {
    /// Writes the version including its separator, ready to be appended to an image name.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, ":{tag}"),
            Self::Digest(digest) => write!(f, "@{digest}"),
            Self::Template(template) => f.write_str(template),
        }
    }
}

/// Prefixes tags with `:` and digests with `@`, templates are returned as they are.
///
/// Unlike parsing an [`ImageVersion`], an empty version is accepted and yields a lone `:`.
pub fn add_version_separator_prefix(version: &str) -> String {
    ImageVersion::classify(version).to_string()
}

/// Returns the full image reference `<repository>/<name><version>`, where the version is
/// prefixed with the matching separator.
pub fn image_reference(repository: &str, name: &str, version: &ImageVersion) -> String {
    format!("{repository}/{name}{version}")
}

/// Whether `value` contains a template placeholder which is rendered later on.
pub fn is_template(value: &str) -> bool {
    value.contains(TEMPLATE_MARKER)
}

/// The image pull policy of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, StrumDisplay, EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[cfg_attr(feature = "clap", value(rename_all = "PascalCase"))]
pub enum PullPolicy {
    Always,
    #[default]
    IfNotPresent,
    Never,
}
