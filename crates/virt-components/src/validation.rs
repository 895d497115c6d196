// This is adapted from Kubernetes.
// See apimachinery/pkg/util/validation/validation.go in the Kubernetes source

use std::{fmt::Display, sync::LazyLock};

use const_format::concatcp;
use regex::Regex;
use snafu::Snafu;

use crate::commons::image::is_template;

/// Minimal length required by RFC 1123 is 63. Up to 255 allowed, unsupported by k8s.
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;
const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_ERROR_MSG: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character";

/// Label values may be empty, otherwise they follow the qualified name rules.
const LABEL_VALUE_MAX_LENGTH: usize = 63;
const LABEL_VALUE_FMT: &str = concatcp!("(", "[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?", ")?");
const LABEL_VALUE_ERROR_MSG: &str = "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character";

// Lazily initialized regular expressions
static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_LABEL_FMT}$")).expect("failed to compile RFC 1123 label regex")
});

static LABEL_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{LABEL_VALUE_FMT}$")).expect("failed to compile label value regex")
});

type Result<T = (), E = Errors> = std::result::Result<T, E>;

/// A collection of errors discovered during validation.
#[derive(Debug, PartialEq)]
pub struct Errors(Vec<Error>);

impl Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{error}")?;
        }
        Ok(())
    }
}
impl std::error::Error for Errors {}

/// A single validation error.
#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Regex { source: RegexError },

    #[snafu(display("input is {length} bytes long but must be no more than {max_length}"))]
    TooLong { length: usize, max_length: usize },
}

#[derive(Debug, PartialEq)]
pub struct RegexError {
    /// The primary error message.
    msg: &'static str,

    /// The regex that the input must match.
    regex: &'static str,

    /// Examples of valid inputs (if non-empty).
    examples: &'static [&'static str],
}

impl Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            msg,
            regex,
            examples,
        } = self;
        write!(f, "{msg} (")?;
        for (i, example) in examples.iter().enumerate() {
            let prefix = match i {
                0 => "e.g.",
                _ => "or",
            };
            write!(f, "{prefix} {example:?}, ")?;
        }
        write!(f, "regex used for validation is {regex:?})")
    }
}

impl std::error::Error for RegexError {}

/// Returns [`Ok`] if `value`'s length fits within `max_length`.
fn validate_str_length(value: &str, max_length: usize) -> Result<(), Error> {
    if value.len() > max_length {
        TooLongSnafu {
            length: value.len(),
            max_length,
        }
        .fail()
    } else {
        Ok(())
    }
}

/// Returns [`Ok`] if `value` matches `regex`.
fn validate_str_regex(
    value: &str,
    regex: &'static Regex,
    error_msg: &'static str,
    examples: &'static [&'static str],
) -> Result<(), Error> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(RegexError {
            msg: error_msg,
            regex: regex
                .as_str()
                // Clean up start/end-of-line markers
                .trim_start_matches('^')
                .trim_end_matches('$'),
            examples,
        }
        .into())
    }
}

/// Returns [`Ok`] if *all* validations are [`Ok`], otherwise returns all errors.
fn validate_all(validations: impl IntoIterator<Item = Result<(), Error>>) -> Result {
    let errors = validations
        .into_iter()
        .filter_map(|res| res.err())
        .collect::<Vec<_>>();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Errors(errors))
    }
}

/// Tests for a string that conforms to the definition of a lowercase label in DNS (RFC 1123).
/// This is what Kubernetes requires for namespaces and container names.
pub fn is_rfc_1123_label(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1123_LABEL_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1123_LABEL_REGEX,
            RFC_1123_LABEL_ERROR_MSG,
            &["kubevirt", "virt-api"],
        ),
    ])
}

/// Tests whether `value` can be used as the value of a label.
pub fn is_label_value(value: &str) -> Result {
    validate_all([
        validate_str_length(value, LABEL_VALUE_MAX_LENGTH),
        validate_str_regex(
            value,
            &LABEL_VALUE_REGEX,
            LABEL_VALUE_ERROR_MSG,
            &["v0.26.0", "KubeVirt"],
        ),
    ])
}

/// Validates a namespace name.
///
/// Template placeholders (e.g. `{{.Namespace}}`) are rendered by whoever consumes the generated
/// manifests, so they are accepted as they are.
pub fn validate_namespace_name(name: &str) -> Result {
    if is_template(name) {
        return Ok(());
    }

    is_rfc_1123_label(name)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("kubevirt")]
    #[case("kubevirt-system")]
    #[case("1-namespace-1")]
    #[case("{{.Namespace}}")]
    fn valid_namespace(#[case] value: &str) {
        assert_eq!(validate_namespace_name(value), Ok(()));
    }

    #[rstest]
    #[case("")]
    #[case("KubeVirt")]
    #[case("-kubevirt")]
    #[case("kubevirt-")]
    #[case("kube.virt")]
    #[case(&"a".repeat(64))]
    fn invalid_namespace(#[case] value: &str) {
        assert!(validate_namespace_name(value).is_err());
    }

    #[test]
    fn too_long_namespace_reports_length() {
        let errors = is_rfc_1123_label(&"a".repeat(64)).unwrap_err();
        assert_eq!(errors, Errors(vec![Error::TooLong {
            length: 64,
            max_length: 63
        }]));
        assert_eq!(
            errors.to_string(),
            "input is 64 bytes long but must be no more than 63"
        );
    }

    #[test]
    fn regex_error_lists_examples() {
        let errors = is_rfc_1123_label("Kube_Virt").unwrap_err();
        assert!(errors.to_string().starts_with(RFC_1123_LABEL_ERROR_MSG));
        assert!(errors.to_string().contains("e.g. \"kubevirt\", or \"virt-api\""));
    }

    #[rstest]
    #[case("")]
    #[case("v0.26.0")]
    #[case("KubeVirt")]
    #[case("my_product")]
    fn valid_label_value(#[case] value: &str) {
        assert_eq!(is_label_value(value), Ok(()));
    }

    #[rstest]
    #[case("-v1")]
    #[case("v1 beta")]
    #[case("sha256:abc")]
    fn invalid_label_value(#[case] value: &str) {
        assert!(is_label_value(value).is_err());
    }
}
