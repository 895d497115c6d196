use k8s_openapi::api::core::v1::Toleration;

use crate::constants::CRITICAL_ADDONS_ONLY_TOLERATION_KEY;

/// Lets the control plane Pods run on nodes tainted with `CriticalAddonsOnly`.
pub fn critical_addons_toleration() -> Vec<Toleration> {
    vec![Toleration {
        key: Some(CRITICAL_ADDONS_ONLY_TOLERATION_KEY.to_owned()),
        operator: Some("Exists".to_owned()),
        ..Toleration::default()
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerates_critical_addons_taint() {
        assert_eq!(critical_addons_toleration(), vec![Toleration {
            key: Some("CriticalAddonsOnly".to_owned()),
            operator: Some("Exists".to_owned()),
            ..Toleration::default()
        }]);
    }
}
