use k8s_openapi::{
    api::policy::v1::{PodDisruptionBudget, PodDisruptionBudgetSpec},
    apimachinery::pkg::{
        apis::meta::v1::{LabelSelector, ObjectMeta},
        util::intstr::IntOrString,
    },
};

/// This builder is used to construct [`PodDisruptionBudget`]s.
///
/// The following attributes on a [`PodDisruptionBudget`] are considered mandatory and must be specified
/// before being able to construct the [`PodDisruptionBudget`]:
///
/// 1. [`PodDisruptionBudget::metadata`]
/// 2. [`PodDisruptionBudgetSpec::selector`]
/// 3. Either [`PodDisruptionBudgetSpec::min_available`] or [`PodDisruptionBudgetSpec::max_unavailable`]
///
/// The type parameters track which of them have been set already, so calling
/// [`PodDisruptionBudgetBuilder::build`] too early is a compile error.
#[derive(Debug, Default)]
pub struct PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
    metadata: ObjectMeta,
    selector: LabelSelector,
    constraint: PodDisruptionBudgetConstraint,
}

/// We only support fixed numbers, no percentage.
/// We use u16, as [`IntOrString`] takes an i32 and we don't want to allow negative numbers. u16 will always fit in i32.
#[derive(Debug, PartialEq, Eq)]
pub enum PodDisruptionBudgetConstraint {
    MaxUnavailable(u16),
    MinAvailable(u16),
}

impl PodDisruptionBudgetBuilder<(), (), ()> {
    pub fn new() -> Self {
        PodDisruptionBudgetBuilder::default()
    }

    /// Sets the mandatory [`PodDisruptionBudget::metadata`].
    pub fn new_with_metadata(
        self,
        metadata: impl Into<ObjectMeta>,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, (), ()> {
        PodDisruptionBudgetBuilder {
            metadata: metadata.into(),
            selector: (),
            constraint: (),
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, (), ()> {
    /// Sets the mandatory [`PodDisruptionBudgetSpec::selector`].
    pub fn with_selector(
        self,
        selector: LabelSelector,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, ()> {
        PodDisruptionBudgetBuilder {
            metadata: self.metadata,
            selector,
            constraint: (),
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, ()> {
    /// Sets the mandatory [`PodDisruptionBudgetSpec::max_unavailable`].
    /// Mutually exclusive with [`PodDisruptionBudgetBuilder::with_min_available`].
    pub fn with_max_unavailable(
        self,
        max_unavailable: u16,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
        self.with_constraint(PodDisruptionBudgetConstraint::MaxUnavailable(
            max_unavailable,
        ))
    }

    /// Sets the mandatory [`PodDisruptionBudgetSpec::min_available`].
    /// Mutually exclusive with [`PodDisruptionBudgetBuilder::with_max_unavailable`].
    pub fn with_min_available(
        self,
        min_available: u16,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
        self.with_constraint(PodDisruptionBudgetConstraint::MinAvailable(min_available))
    }

    fn with_constraint(
        self,
        constraint: PodDisruptionBudgetConstraint,
    ) -> PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
        PodDisruptionBudgetBuilder {
            metadata: self.metadata,
            selector: self.selector,
            constraint,
        }
    }
}

impl PodDisruptionBudgetBuilder<ObjectMeta, LabelSelector, PodDisruptionBudgetConstraint> {
    /// This function can be called after [`PodDisruptionBudget::metadata`], [`PodDisruptionBudgetSpec::selector`]
    /// and either [`PodDisruptionBudgetSpec::min_available`] or [`PodDisruptionBudgetSpec::max_unavailable`] are set.
    pub fn build(self) -> PodDisruptionBudget {
        let (max_unavailable, min_available) = match self.constraint {
            PodDisruptionBudgetConstraint::MaxUnavailable(max_unavailable) => {
                (Some(max_unavailable), None)
            }
            PodDisruptionBudgetConstraint::MinAvailable(min_available) => {
                (None, Some(min_available))
            }
        };
        PodDisruptionBudget {
            metadata: self.metadata,
            spec: Some(PodDisruptionBudgetSpec {
                max_unavailable: max_unavailable.map(i32::from).map(IntOrString::Int),
                min_available: min_available.map(i32::from).map(IntOrString::Int),
                selector: Some(self.selector),
                unhealthy_pod_eviction_policy: None,
            }),
            ..Default::default()
        }
    }
}
