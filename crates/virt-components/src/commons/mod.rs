//! This module provides common datastructures or CRDs shared between all the component templates.

pub mod affinity;
pub mod image;
pub mod tolerations;
