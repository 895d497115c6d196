use std::{num::TryFromIntError, time::Duration};

use k8s_openapi::{
    api::core::v1::{ExecAction, HTTPGetAction, Probe},
    apimachinery::pkg::util::intstr::IntOrString,
};
use snafu::{ResultExt, Snafu};
use strum::Display;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("probe {field} of {duration:?} does not fit into an i32 amount of seconds"))]
    DurationTooLong {
        source: TryFromIntError,
        field: &'static str,
        duration: Duration,
    },
}

/// Builds a [`Probe`]. An action has to be chosen before the probe can be built.
///
/// Unlike the Kubernetes API defaults, only the settings which were explicitly set end up in the
/// resulting [`Probe`], so the generated manifests stay minimal.
#[derive(Debug)]
pub struct ProbeBuilder<Action> {
    action: Action,

    success_threshold: Option<i32>,
    failure_threshold: Option<i32>,
    period: Option<Duration>,
    timeout: Option<Duration>,
    initial_delay: Option<Duration>,
}

impl Default for ProbeBuilder<()> {
    fn default() -> Self {
        Self {
            action: (),
            success_threshold: None,
            failure_threshold: None,
            period: None,
            timeout: None,
            initial_delay: None,
        }
    }
}

pub enum ProbeAction {
    Exec(ExecAction),
    HttpGet(HTTPGetAction),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum UriScheme {
    #[default]
    Http,
    Https,
}

impl ProbeBuilder<()> {
    pub fn new() -> Self {
        Self::default()
    }

    /// This probe action executes the specified command
    pub fn with_exec_action_helper(
        self,
        command: impl IntoIterator<Item = impl Into<String>>,
    ) -> ProbeBuilder<ProbeAction> {
        self.with_exec_action(ExecAction {
            command: Some(command.into_iter().map(Into::into).collect()),
        })
    }

    /// There is a convenience helper: [`Self::with_exec_action_helper`].
    pub fn with_exec_action(self, exec_action: ExecAction) -> ProbeBuilder<ProbeAction> {
        self.with_action(ProbeAction::Exec(exec_action))
    }

    /// This probe action does an HTTP(S) GET request to the specified port and path.
    pub fn with_http_get_action_helper(
        self,
        scheme: UriScheme,
        port: u16,
        path: impl Into<String>,
    ) -> ProbeBuilder<ProbeAction> {
        self.with_http_get_action(HTTPGetAction {
            path: Some(path.into()),
            port: IntOrString::Int(port.into()),
            scheme: Some(scheme.to_string()),
            ..Default::default()
        })
    }

    /// There is a convenience helper: [`Self::with_http_get_action_helper`].
    pub fn with_http_get_action(self, http_get_action: HTTPGetAction) -> ProbeBuilder<ProbeAction> {
        self.with_action(ProbeAction::HttpGet(http_get_action))
    }

    /// Action-specific functions (e.g. [`Self::with_exec_action`] or [`Self::with_http_get_action`])
    /// are recommended instead.
    pub fn with_action(self, action: ProbeAction) -> ProbeBuilder<ProbeAction> {
        let Self {
            action: (),
            success_threshold,
            failure_threshold,
            period,
            timeout,
            initial_delay,
        } = self;

        ProbeBuilder {
            action,
            success_threshold,
            failure_threshold,
            period,
            timeout,
            initial_delay,
        }
    }
}

impl<Action> ProbeBuilder<Action> {
    /// The period/interval in which the probe should be executed.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    /// How long a single probe may take before it counts as failed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// How long to wait after the container started before the first probe.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = Some(initial_delay);
        self
    }

    /// How often the probe must succeed before being considered successful.
    pub fn with_success_threshold(mut self, success_threshold: i32) -> Self {
        self.success_threshold = Some(success_threshold);
        self
    }

    /// How often the probe must fail before being considered failed.
    pub fn with_failure_threshold(mut self, failure_threshold: i32) -> Self {
        self.failure_threshold = Some(failure_threshold);
        self
    }
}

impl ProbeBuilder<ProbeAction> {
    pub fn build(self) -> Result<Probe> {
        let mut probe = Probe {
            failure_threshold: self.failure_threshold,
            initial_delay_seconds: seconds("initialDelaySeconds", self.initial_delay)?,
            period_seconds: seconds("periodSeconds", self.period)?,
            success_threshold: self.success_threshold,
            timeout_seconds: seconds("timeoutSeconds", self.timeout)?,
            ..Probe::default()
        };

        match self.action {
            ProbeAction::Exec(exec_action) => probe.exec = Some(exec_action),
            ProbeAction::HttpGet(http_get_action) => probe.http_get = Some(http_get_action),
        }

        Ok(probe)
    }
}

fn seconds(field: &'static str, duration: Option<Duration>) -> Result<Option<i32>> {
    duration
        .map(|duration| {
            duration
                .as_secs()
                .try_into()
                .context(DurationTooLongSnafu { field, duration })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_builder() {
        let probe = ProbeBuilder::new()
            .with_exec_action_helper(["sleep", "1"])
            .with_period(Duration::from_secs(5))
            .with_failure_threshold(7)
            .build()
            .unwrap();

        assert_eq!(probe, Probe {
            exec: Some(ExecAction {
                command: Some(vec!["sleep".to_owned(), "1".to_owned()])
            }),
            failure_threshold: Some(7),
            period_seconds: Some(5),
            ..Probe::default()
        });
    }

    #[test]
    fn https_get_probe() {
        let probe = ProbeBuilder::new()
            .with_initial_delay(Duration::from_secs(15))
            .with_http_get_action_helper(UriScheme::Https, 8443, "/healthz")
            .with_timeout(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(probe, Probe {
            http_get: Some(HTTPGetAction {
                path: Some("/healthz".to_owned()),
                port: IntOrString::Int(8443),
                scheme: Some("HTTPS".to_owned()),
                ..Default::default()
            }),
            initial_delay_seconds: Some(15),
            timeout_seconds: Some(10),
            ..Probe::default()
        });
    }

    #[test]
    fn too_long_duration() {
        let result = ProbeBuilder::new()
            .with_exec_action_helper(["true"])
            .with_period(Duration::from_secs(i32::MAX as u64 + 1))
            .build();

        assert!(matches!(
            result,
            Err(Error::DurationTooLong {
                field: "periodSeconds",
                ..
            })
        ));
    }
}
