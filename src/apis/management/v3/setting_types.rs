use std::borrow::Cow;
use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ClusterResourceScope;
use kube::Resource;
use serde::{Deserialize, Serialize};

use super::{GROUP_NAME, VERSION};

const KIND: &str = "Setting";
const PLURAL: &str = "settings";

/// Where the effective value of a setting comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingSource {
    Db,
    Default,
    Env,
}

impl SettingSource {
    pub fn from_code<S: AsRef<str>>(code: S) -> Option<Self> {
        match code.as_ref() {
            "db" => Some(Self::Db),
            "default" => Some(Self::Default),
            "env" => Some(Self::Env),
            _ => None,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Db => "db",
            Self::Default => "default",
            Self::Env => "env",
        }
    }
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Cluster-scoped key/value setting.
///
/// Unlike the logging resources it has no `spec`: the fields sit at the top
/// level of the object, so the `Resource` impl is written by hand.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub default: String,
    #[serde(default)]
    pub customized: bool,
    #[serde(default)]
    pub source: String,
}

impl Setting {
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            api_version: Self::api_version(&()).into_owned(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..Default::default()
            },
            value: value.into(),
            ..Default::default()
        }
    }

    /// The explicit value when set, the shipped default otherwise.
    pub fn effective_value(&self) -> &str {
        if self.value.is_empty() {
            &self.default
        } else {
            &self.value
        }
    }

    pub fn source_kind(&self) -> Option<SettingSource> {
        SettingSource::from_code(&self.source)
    }
}

impl Resource for Setting {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(KIND)
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(GROUP_NAME)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(PLURAL)
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
