use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub const CONDITION_TRUE: &str = "True";
pub const CONDITION_FALSE: &str = "False";

/// Condition types recorded on logging resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingConditionType {
    Provisioned,
    Updated,
}

impl LoggingConditionType {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Provisioned => "Provisioned",
            Self::Updated => "Updated",
        }
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub last_update_time: Option<String>,
    pub last_transition_time: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sets `cond` on the list. Returns whether anything changed.
///
/// Timestamps only move when status, reason or message change, so writing
/// the same outcome twice leaves the list untouched.
pub fn set_condition(
    conditions: &mut Vec<LoggingCondition>,
    cond: LoggingConditionType,
    ok: bool,
    reason: Option<&str>,
    message: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    let status = if ok { CONDITION_TRUE } else { CONDITION_FALSE };
    let reason = reason.filter(|r| !r.is_empty()).map(str::to_string);
    let message = message.filter(|m| !m.is_empty()).map(str::to_string);
    let ts = timestamp(now);

    match conditions.iter_mut().find(|c| c.type_ == cond.as_code()) {
        Some(existing) => {
            if existing.status == status && existing.reason == reason && existing.message == message {
                return false;
            }
            if existing.status != status {
                existing.last_transition_time = Some(ts.clone());
            }
            existing.status = status.to_string();
            existing.reason = reason;
            existing.message = message;
            existing.last_update_time = Some(ts);
            true
        }
        None => {
            conditions.push(LoggingCondition {
                type_: cond.as_code().to_string(),
                status: status.to_string(),
                last_update_time: Some(ts.clone()),
                last_transition_time: Some(ts),
                reason,
                message,
            });
            true
        }
    }
}

pub fn is_condition_true(conditions: &[LoggingCondition], cond: LoggingConditionType) -> bool {
    conditions
        .iter()
        .any(|c| c.type_ == cond.as_code() && c.status == CONDITION_TRUE)
}

pub fn find_condition<'a>(
    conditions: &'a [LoggingCondition],
    cond: LoggingConditionType,
) -> Option<&'a LoggingCondition> {
    conditions.iter().find(|c| c.type_ == cond.as_code())
}
