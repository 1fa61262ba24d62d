//! `management.cattle.io/v3` resource definitions.

pub mod conditions;
pub mod logging_types;
pub mod resources;
pub mod setting_types;

pub use conditions::{LoggingCondition, LoggingConditionType};
pub use logging_types::*;
pub use setting_types::{Setting, SettingSource};

pub const GROUP_NAME: &str = "management.cattle.io";
pub const VERSION: &str = "v3";

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::CustomResourceExt;

/// Definitions of the derived custom resources, for installing into a cluster.
pub fn crds() -> Vec<CustomResourceDefinition> {
    vec![ClusterLogging::crd(), ProjectLogging::crd()]
}
