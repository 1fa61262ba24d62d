use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use kube::ResourceExt;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::apis::management::v3::conditions::set_condition;
use crate::apis::management::v3::{
    ClusterLogging, LoggingCondition, LoggingConditionType, LoggingTargetKind, ProjectLogging,
};
use crate::core::client::scope::{object_key, ManagedResource};
use crate::core::controller::lifecycle::Lifecycle;
use crate::errors::Result;

pub const INVALID_SPEC_REASON: &str = "InvalidSpec";

/// Logging kinds whose status records the outcome of their spec.
pub trait LoggingResource: ManagedResource {
    /// Validates the spec with defaults applied.
    fn check_spec(&self) -> std::result::Result<(), String>;

    /// Copies the defaulted spec into the status as applied or failed.
    fn record_spec(&mut self, valid: bool);

    fn conditions_mut(&mut self) -> &mut Vec<LoggingCondition>;

    fn target(&self) -> Option<LoggingTargetKind>;
}

impl LoggingResource for ClusterLogging {
    fn check_spec(&self) -> std::result::Result<(), String> {
        let mut spec = self.spec.clone();
        spec.apply_defaults();
        spec.validate().map_err(|e| e.to_string())
    }

    fn record_spec(&mut self, valid: bool) {
        let mut spec = self.spec.clone();
        spec.apply_defaults();
        let status = self.status.get_or_insert_with(Default::default);
        if valid {
            status.applied_spec = spec;
            status.failed_spec = None;
        } else {
            status.failed_spec = Some(spec);
        }
    }

    fn conditions_mut(&mut self) -> &mut Vec<LoggingCondition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }

    fn target(&self) -> Option<LoggingTargetKind> {
        self.spec.targets.current_target()
    }
}

impl LoggingResource for ProjectLogging {
    fn check_spec(&self) -> std::result::Result<(), String> {
        let mut spec = self.spec.clone();
        spec.apply_defaults();
        spec.validate().map_err(|e| e.to_string())
    }

    // Project status has no failed spec; the last valid one stays applied.
    fn record_spec(&mut self, valid: bool) {
        let mut spec = self.spec.clone();
        spec.apply_defaults();
        let status = self.status.get_or_insert_with(Default::default);
        if valid {
            status.applied_spec = spec;
        }
    }

    fn conditions_mut(&mut self) -> &mut Vec<LoggingCondition> {
        &mut self.status.get_or_insert_with(Default::default).conditions
    }

    fn target(&self) -> Option<LoggingTargetKind> {
        self.spec.targets.current_target()
    }
}

/// Writes `Provisioned` on create and `Updated` on every change, along with
/// the applied or failed spec.
pub struct LoggingStatusLifecycle<K> {
    _kind: PhantomData<fn() -> K>,
}

impl<K: LoggingResource> Default for LoggingStatusLifecycle<K> {
    fn default() -> Self {
        Self { _kind: PhantomData }
    }
}

impl<K: LoggingResource> LoggingStatusLifecycle<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn reconcile(&self, mut obj: K, condition: LoggingConditionType) -> Result<Option<K>> {
        let before = serde_json::to_value(&obj)?;
        let outcome = obj.check_spec();

        obj.record_spec(outcome.is_ok());
        let message = outcome.as_ref().err().map(String::as_str);
        let reason = message.map(|_| INVALID_SPEC_REASON);
        set_condition(
            obj.conditions_mut(),
            condition,
            outcome.is_ok(),
            reason,
            message,
            Utc::now(),
        );

        if serde_json::to_value(&obj)? == before {
            debug!("{} {} status unchanged", K::kind(&()), object_key(&obj));
            return Ok(None);
        }

        match &outcome {
            Ok(()) => info!(
                "{} {} {}: target {}",
                K::kind(&()),
                object_key(&obj),
                condition.as_code(),
                obj.target().map(|t| t.as_code()).unwrap_or("none")
            ),
            Err(msg) => warn!("{} {} has an invalid spec: {}", K::kind(&()), object_key(&obj), msg),
        }
        Ok(Some(obj))
    }
}

#[async_trait]
impl<K: LoggingResource> Lifecycle<K> for LoggingStatusLifecycle<K> {
    async fn create(&self, obj: K) -> Result<Option<K>> {
        self.reconcile(obj, LoggingConditionType::Provisioned)
    }

    async fn remove(&self, obj: K) -> Result<Option<K>> {
        info!("{} {} removed", K::kind(&()), obj.name_any());
        Ok(None)
    }

    async fn updated(&self, obj: K) -> Result<Option<K>> {
        self.reconcile(obj, LoggingConditionType::Updated)
    }
}
