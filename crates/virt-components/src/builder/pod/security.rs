use k8s_openapi::api::core::v1::PodSecurityContext;

#[derive(Clone, Default)]
pub struct PodSecurityContextBuilder {
    pod_security_context: PodSecurityContext,
}

impl PodSecurityContextBuilder {
    pub fn new() -> PodSecurityContextBuilder {
        PodSecurityContextBuilder::default()
    }

    pub fn build(&self) -> PodSecurityContext {
        self.pod_security_context.clone()
    }

    pub fn fs_group(&mut self, group: i64) -> &mut Self {
        self.pod_security_context.fs_group = Some(group);
        self
    }

    pub fn run_as_group(&mut self, group: i64) -> &mut Self {
        self.pod_security_context.run_as_group = Some(group);
        self
    }

    pub fn run_as_non_root(&mut self) -> &mut Self {
        self.pod_security_context.run_as_non_root = Some(true);
        self
    }

    pub fn run_as_user(&mut self, user: i64) -> &mut Self {
        self.pod_security_context.run_as_user = Some(user);
        self
    }
}
