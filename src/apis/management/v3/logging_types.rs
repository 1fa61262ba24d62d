//! ClusterLogging and ProjectLogging custom resources.
//!
//! Optional fields map to `omitempty` on the wire: unset options and `false`
//! booleans are not serialized. Defaults are not applied while decoding;
//! call `apply_defaults` where the API layer would fill them in.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use kube::CustomResource;
use schemars::{json_schema, JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use validator::{Validate, ValidationError};

use super::conditions::LoggingCondition;

pub const DEFAULT_OUTPUT_FLUSH_INTERVAL: i64 = 60;
pub const DEFAULT_FLUENT_SERVER_WEIGHT: i64 = 100;

fn is_false(v: &bool) -> bool {
    !*v
}

/// String-coded option set. Codes outside the set decode to `Other` so one
/// bad object never breaks a list; `validate` rejects them.
pub trait CodeEnum {
    const NAME: &'static str;
    const CODES: &'static [&'static str];

    fn as_code(&self) -> &str;
    fn is_known(&self) -> bool;
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_code(&self) -> &str {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Other(code) => code,
                }
            }

            pub fn from_code(code: &str) -> Self {
                code.parse().unwrap_or_else(|_| Self::Other(code.to_string()))
            }
        }

        impl CodeEnum for $name {
            const NAME: &'static str = stringify!($name);
            const CODES: &'static [&'static str] = &[$($code),+];

            fn as_code(&self) -> &str {
                $name::as_code(self)
            }

            fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, String> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(format!("invalid {} {:?}", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_code())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_code())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let code = String::deserialize(deserializer)?;
                Ok(Self::from_code(&code))
            }
        }

        impl JsonSchema for $name {
            fn schema_name() -> Cow<'static, str> {
                stringify!($name).into()
            }

            fn json_schema(_: &mut SchemaGenerator) -> Schema {
                json_schema!({ "type": "string" })
            }
        }
    };
}

fn known_option<T: CodeEnum>(value: Option<&T>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_known() => Err(ValidationError::new("unknown_option").with_message(
            format!("invalid {} {:?}, expected one of {}", T::NAME, v.as_code(), T::CODES.join(", ")).into(),
        )),
        _ => Ok(()),
    }
}

string_enum! {
    /// Index date suffix for Elasticsearch.
    DateFormat {
        Day => "YYYY-MM-DD",
        Month => "YYYY-MM",
        Year => "YYYY",
    }
}

string_enum! {
    SslVersion {
        SslV23 => "SSLv23",
        TlsV1 => "TLSv1",
        TlsV11 => "TLSv1_1",
        TlsV12 => "TLSv1_2",
    }
}

string_enum! {
    SaslScramMechanism {
        Sha256 => "sha256",
        Sha512 => "sha512",
    }
}

string_enum! {
    SaslType {
        Plain => "plain",
        Scram => "scram",
    }
}

string_enum! {
    SyslogSeverity {
        Emerg => "emerg",
        Alert => "alert",
        Crit => "crit",
        Err => "err",
        Warning => "warning",
        Notice => "notice",
        Info => "info",
        Debug => "debug",
    }
}

string_enum! {
    SyslogProtocol {
        Udp => "udp",
        Tcp => "tcp",
    }
}

/// Which target a logging spec ships to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoggingTargetKind {
    Elasticsearch,
    Splunk,
    Kafka,
    Syslog,
    FluentForwarder,
    CustomTarget,
}

impl LoggingTargetKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Elasticsearch => "elasticsearch",
            Self::Splunk => "splunk",
            Self::Kafka => "kafka",
            Self::Syslog => "syslog",
            Self::FluentForwarder => "fluentforwarder",
            Self::CustomTarget => "customtarget",
        }
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_elasticsearch_options"))]
pub struct ElasticsearchConfig {
    #[validate(required, length(min = 1))]
    pub endpoint: Option<String>,
    #[validate(required, length(min = 1))]
    pub index_prefix: Option<String>,
    pub date_format: Option<DateFormat>,
    pub auth_username: Option<String>,
    pub auth_password: Option<String>,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub client_key_pass: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl_verify: bool,
    pub ssl_version: Option<SslVersion>,
}

fn validate_elasticsearch_options(config: &ElasticsearchConfig) -> Result<(), ValidationError> {
    known_option(config.date_format.as_ref())?;
    known_option(config.ssl_version.as_ref())
}

impl ElasticsearchConfig {
    pub fn apply_defaults(&mut self) {
        self.date_format.get_or_insert(DateFormat::Day);
        self.ssl_version.get_or_insert(SslVersion::TlsV12);
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplunkConfig {
    #[validate(required, length(min = 1))]
    pub endpoint: Option<String>,
    pub source: Option<String>,
    #[validate(required, length(min = 1))]
    pub token: Option<String>,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub client_key_pass: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl_verify: bool,
    pub index: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_kafka"))]
pub struct KafkaConfig {
    pub zookeeper_endpoint: Option<String>,
    pub broker_endpoints: Option<Vec<String>>,
    #[validate(required, length(min = 1))]
    pub topic: Option<String>,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub sasl_username: Option<String>,
    pub sasl_password: Option<String>,
    pub sasl_scram_mechanism: Option<SaslScramMechanism>,
    pub sasl_type: Option<SaslType>,
}

fn validate_kafka(config: &KafkaConfig) -> Result<(), ValidationError> {
    known_option(config.sasl_scram_mechanism.as_ref())?;
    known_option(config.sasl_type.as_ref())?;

    let has_zookeeper = config
        .zookeeper_endpoint
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty());
    let has_brokers = config
        .broker_endpoints
        .as_ref()
        .is_some_and(|b| b.iter().any(|e| !e.trim().is_empty()));
    if has_zookeeper || has_brokers {
        return Ok(());
    }
    Err(ValidationError::new("kafka_endpoints")
        .with_message("one of zookeeperEndpoint or brokerEndpoints is required".into()))
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_syslog_options"))]
pub struct SyslogConfig {
    #[validate(required, length(min = 1))]
    pub endpoint: Option<String>,
    pub severity: Option<SyslogSeverity>,
    pub program: Option<String>,
    pub protocol: Option<SyslogProtocol>,
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_tls: bool,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl_verify: bool,
}

fn validate_syslog_options(config: &SyslogConfig) -> Result<(), ValidationError> {
    known_option(config.severity.as_ref())?;
    known_option(config.protocol.as_ref())
}

impl SyslogConfig {
    pub fn apply_defaults(&mut self) {
        self.severity.get_or_insert(SyslogSeverity::Notice);
        self.protocol.get_or_insert(SyslogProtocol::Udp);
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FluentServer {
    #[validate(required, length(min = 1))]
    pub endpoint: Option<String>,
    pub hostname: Option<String>,
    #[validate(range(min = 0))]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub standby: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub shared_key: Option<String>,
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FluentForwarderConfig {
    #[serde(default, skip_serializing_if = "is_false")]
    pub enable_tls: bool,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
    pub client_key_pass: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ssl_verify: bool,
    pub compress: Option<bool>,
    #[validate(required, length(min = 1), nested)]
    pub fluent_servers: Option<Vec<FluentServer>>,
}

impl FluentForwarderConfig {
    pub fn apply_defaults(&mut self) {
        self.compress.get_or_insert(true);
        for server in self.fluent_servers.iter_mut().flatten() {
            server.weight.get_or_insert(DEFAULT_FLUENT_SERVER_WEIGHT);
        }
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomTargetConfig {
    pub content: Option<String>,
    pub certificate: Option<String>,
    pub client_cert: Option<String>,
    pub client_key: Option<String>,
}

/// The target configs; at most one may be set.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_single_target"))]
pub struct LoggingTargets {
    #[validate(nested)]
    pub elasticsearch_config: Option<ElasticsearchConfig>,
    #[validate(nested)]
    pub splunk_config: Option<SplunkConfig>,
    #[validate(nested)]
    pub kafka_config: Option<KafkaConfig>,
    #[validate(nested)]
    pub syslog_config: Option<SyslogConfig>,
    #[validate(nested)]
    pub fluent_forwarder_config: Option<FluentForwarderConfig>,
    #[validate(nested)]
    pub custom_target_config: Option<CustomTargetConfig>,
}

impl LoggingTargets {
    pub fn configured(&self) -> Vec<LoggingTargetKind> {
        let mut kinds = Vec::new();
        if self.elasticsearch_config.is_some() {
            kinds.push(LoggingTargetKind::Elasticsearch);
        }
        if self.splunk_config.is_some() {
            kinds.push(LoggingTargetKind::Splunk);
        }
        if self.kafka_config.is_some() {
            kinds.push(LoggingTargetKind::Kafka);
        }
        if self.syslog_config.is_some() {
            kinds.push(LoggingTargetKind::Syslog);
        }
        if self.fluent_forwarder_config.is_some() {
            kinds.push(LoggingTargetKind::FluentForwarder);
        }
        if self.custom_target_config.is_some() {
            kinds.push(LoggingTargetKind::CustomTarget);
        }
        kinds
    }

    /// The configured target, `None` when logging is disabled.
    pub fn current_target(&self) -> Option<LoggingTargetKind> {
        self.configured().into_iter().next()
    }

    pub fn apply_defaults(&mut self) {
        if let Some(es) = self.elasticsearch_config.as_mut() {
            es.apply_defaults();
        }
        if let Some(syslog) = self.syslog_config.as_mut() {
            syslog.apply_defaults();
        }
        if let Some(ff) = self.fluent_forwarder_config.as_mut() {
            ff.apply_defaults();
        }
    }
}

fn validate_single_target(targets: &LoggingTargets) -> Result<(), ValidationError> {
    let configured = targets.configured();
    if configured.len() <= 1 {
        return Ok(());
    }
    let names: Vec<&str> = configured.iter().map(|k| k.as_code()).collect();
    Err(ValidationError::new("single_target").with_message(
        format!("only one logging target may be configured, found {}", names.join(", ")).into(),
    ))
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggingCommonField {
    pub display_name: Option<String>,
    /// Seconds between buffer flushes.
    pub output_flush_interval: Option<i64>,
    pub output_tags: Option<BTreeMap<String, String>>,
    #[serde(rename = "enableJSONParsing", default, skip_serializing_if = "is_false")]
    pub enable_json_parsing: bool,
}

impl LoggingCommonField {
    pub fn apply_defaults(&mut self) {
        if self.output_flush_interval.unwrap_or(0) == 0 {
            self.output_flush_interval = Some(DEFAULT_OUTPUT_FLUSH_INTERVAL);
        }
    }

    pub fn flush_interval_seconds(&self) -> i64 {
        match self.output_flush_interval {
            Some(v) if v > 0 => v,
            _ => DEFAULT_OUTPUT_FLUSH_INTERVAL,
        }
    }
}

#[skip_serializing_none]
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[kube(
    group = "management.cattle.io",
    version = "v3",
    kind = "ClusterLogging",
    plural = "clusterloggings",
    namespaced,
    status = "ClusterLoggingStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLoggingSpec {
    #[serde(flatten)]
    #[validate(nested)]
    pub targets: LoggingTargets,
    #[serde(flatten)]
    pub common: LoggingCommonField,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub cluster_name: String,
    pub include_system_component: Option<bool>,
}

impl ClusterLoggingSpec {
    pub fn apply_defaults(&mut self) {
        self.targets.apply_defaults();
        self.common.apply_defaults();
        self.include_system_component.get_or_insert(true);
    }

    pub fn includes_system_components(&self) -> bool {
        self.include_system_component.unwrap_or(true)
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLoggingStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<LoggingCondition>,
    #[serde(default)]
    pub applied_spec: ClusterLoggingSpec,
    pub failed_spec: Option<ClusterLoggingSpec>,
}

#[skip_serializing_none]
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, Validate, PartialEq)]
#[kube(
    group = "management.cattle.io",
    version = "v3",
    kind = "ProjectLogging",
    plural = "projectloggings",
    namespaced,
    status = "ProjectLoggingStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLoggingSpec {
    #[serde(flatten)]
    #[validate(nested)]
    pub targets: LoggingTargets,
    #[serde(flatten)]
    pub common: LoggingCommonField,
    /// `<cluster>:<project>`
    #[serde(default)]
    #[validate(length(min = 1))]
    pub project_name: String,
}

impl ProjectLoggingSpec {
    pub fn apply_defaults(&mut self) {
        self.targets.apply_defaults();
        self.common.apply_defaults();
    }

    /// Cluster half of `projectName`, if it is qualified.
    pub fn cluster_name(&self) -> Option<&str> {
        self.project_name
            .split_once(':')
            .map(|(cluster, _)| cluster)
            .filter(|c| !c.is_empty())
    }
}

#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLoggingStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<LoggingCondition>,
    #[serde(default)]
    pub applied_spec: ProjectLoggingSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::{CustomResourceExt, Resource};
    use serde_json::json;

    fn es() -> ElasticsearchConfig {
        ElasticsearchConfig {
            endpoint: Some("https://es.example.com:9200".into()),
            index_prefix: Some("local".into()),
            ..Default::default()
        }
    }

    #[test]
    fn cluster_logging_wire_shape() {
        let spec = ClusterLoggingSpec {
            targets: LoggingTargets {
                elasticsearch_config: Some(es()),
                ..Default::default()
            },
            common: LoggingCommonField {
                output_flush_interval: Some(3),
                enable_json_parsing: true,
                ..Default::default()
            },
            cluster_name: "c-abc12".into(),
            include_system_component: None,
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "elasticsearchConfig": {
                    "endpoint": "https://es.example.com:9200",
                    "indexPrefix": "local"
                },
                "outputFlushInterval": 3,
                "enableJSONParsing": true,
                "clusterName": "c-abc12"
            })
        );
    }

    #[test]
    fn decodes_rancher_payload() {
        let spec: ProjectLoggingSpec = serde_json::from_value(json!({
            "projectName": "c-abc12:p-xyz",
            "syslogConfig": {
                "endpoint": "syslog.example.com:514",
                "severity": "warning",
                "protocol": "tcp",
                "enableTls": true
            },
            "outputTags": {"team": "infra"}
        }))
        .unwrap();

        let syslog = spec.targets.syslog_config.as_ref().unwrap();
        assert_eq!(syslog.severity, Some(SyslogSeverity::Warning));
        assert_eq!(syslog.protocol, Some(SyslogProtocol::Tcp));
        assert!(syslog.enable_tls);
        assert_eq!(spec.cluster_name(), Some("c-abc12"));
        assert_eq!(spec.targets.current_target(), Some(LoggingTargetKind::Syslog));
        assert_eq!(
            spec.common.output_tags.as_ref().and_then(|t| t.get("team")).map(String::as_str),
            Some("infra")
        );
    }

    #[test]
    fn unknown_option_codes_decode_and_fail_validation() {
        let syslog: SyslogConfig = serde_json::from_value(json!({
            "endpoint": "syslog:514",
            "protocol": "sctp",
            "severity": "err"
        }))
        .unwrap();
        assert_eq!(syslog.protocol, Some(SyslogProtocol::Other("sctp".into())));
        assert_eq!(syslog.severity, Some(SyslogSeverity::Err));
        assert_eq!(serde_json::to_value(&syslog).unwrap()["protocol"], "sctp");

        let err = syslog.validate().unwrap_err();
        assert!(err.to_string().contains("invalid SyslogProtocol \"sctp\", expected one of udp, tcp"));

        assert_eq!("TLSv1_1".parse::<SslVersion>(), Ok(SslVersion::TlsV11));
        assert!("TLSv9".parse::<SslVersion>().is_err());
        assert_eq!(SslVersion::from_code("TLSv9"), SslVersion::Other("TLSv9".into()));
    }

    #[test]
    fn one_bad_item_does_not_break_a_list() {
        let list: kube::core::ObjectList<ClusterLogging> = serde_json::from_value(json!({
            "apiVersion": "management.cattle.io/v3",
            "kind": "ClusterLoggingList",
            "metadata": {"resourceVersion": "12"},
            "items": [
                {
                    "apiVersion": "management.cattle.io/v3",
                    "kind": "ClusterLogging",
                    "metadata": {"name": "bad", "namespace": "c-a"},
                    "spec": {"clusterName": "c-a", "syslogConfig": {"endpoint": "s:514", "protocol": "sctp"}}
                },
                {
                    "apiVersion": "management.cattle.io/v3",
                    "kind": "ClusterLogging",
                    "metadata": {"name": "good", "namespace": "c-a"},
                    "spec": {"clusterName": "c-a", "syslogConfig": {"endpoint": "s:514", "protocol": "tcp"}}
                }
            ]
        }))
        .unwrap();

        assert_eq!(list.items.len(), 2);
        assert!(list.items[0].spec.validate().is_err());
        assert!(list.items[1].spec.validate().is_ok());
    }

    #[test]
    fn unknown_kafka_sasl_type_is_rejected() {
        let kafka = KafkaConfig {
            topic: Some("logs".into()),
            broker_endpoints: Some(vec!["kafka-0:9092".into()]),
            sasl_type: Some(SaslType::from_code("gssapi")),
            ..Default::default()
        };
        assert!(kafka.validate().unwrap_err().to_string().contains("SaslType"));
    }

    #[test]
    fn applies_defaults() {
        let mut spec = ClusterLoggingSpec {
            targets: LoggingTargets {
                elasticsearch_config: Some(es()),
                ..Default::default()
            },
            cluster_name: "local".into(),
            ..Default::default()
        };
        spec.apply_defaults();

        let es = spec.targets.elasticsearch_config.as_ref().unwrap();
        assert_eq!(es.date_format, Some(DateFormat::Day));
        assert_eq!(es.ssl_version, Some(SslVersion::TlsV12));
        assert_eq!(spec.common.output_flush_interval, Some(60));
        assert_eq!(spec.include_system_component, Some(true));

        let mut ff = FluentForwarderConfig {
            fluent_servers: Some(vec![FluentServer {
                endpoint: Some("fluentd:24224".into()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        ff.apply_defaults();
        assert_eq!(ff.compress, Some(true));
        assert_eq!(ff.fluent_servers.unwrap()[0].weight, Some(100));
    }

    #[test]
    fn explicit_values_survive_defaults() {
        let mut spec = ClusterLoggingSpec {
            include_system_component: Some(false),
            common: LoggingCommonField {
                output_flush_interval: Some(5),
                ..Default::default()
            },
            ..Default::default()
        };
        spec.apply_defaults();
        assert_eq!(spec.include_system_component, Some(false));
        assert!(!spec.includes_system_components());
        assert_eq!(spec.common.flush_interval_seconds(), 5);
    }

    #[test]
    fn validates_required_fields() {
        let spec = ClusterLoggingSpec {
            targets: LoggingTargets {
                splunk_config: Some(SplunkConfig {
                    endpoint: Some("https://splunk:8088".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            cluster_name: "local".into(),
            ..Default::default()
        };
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn validates_kafka_endpoints() {
        let mut kafka = KafkaConfig {
            topic: Some("logs".into()),
            ..Default::default()
        };
        assert!(kafka.validate().is_err());
        kafka.broker_endpoints = Some(vec!["kafka-0:9092".into()]);
        assert!(kafka.validate().is_ok());
    }

    #[test]
    fn validates_fluent_servers() {
        let ff = FluentForwarderConfig {
            fluent_servers: Some(vec![]),
            ..Default::default()
        };
        assert!(ff.validate().is_err());

        let ff = FluentForwarderConfig {
            fluent_servers: Some(vec![FluentServer::default()]),
            ..Default::default()
        };
        assert!(ff.validate().is_err());
    }

    #[test]
    fn rejects_more_than_one_target() {
        let spec = ProjectLoggingSpec {
            targets: LoggingTargets {
                elasticsearch_config: Some(es()),
                custom_target_config: Some(CustomTargetConfig::default()),
                ..Default::default()
            },
            project_name: "local:p-1".into(),
            ..Default::default()
        };
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("only one logging target"));
    }

    #[test]
    fn disabled_logging_is_valid() {
        let spec = ClusterLoggingSpec {
            cluster_name: "local".into(),
            ..Default::default()
        };
        assert!(spec.validate().is_ok());
        assert_eq!(spec.targets.current_target(), None);
    }

    #[test]
    fn resource_identity() {
        assert_eq!(ClusterLogging::group(&()), "management.cattle.io");
        assert_eq!(ClusterLogging::version(&()), "v3");
        assert_eq!(ClusterLogging::plural(&()), "clusterloggings");
        assert_eq!(ProjectLogging::kind(&()), "ProjectLogging");

        let crd = ProjectLogging::crd();
        assert_eq!(crd.spec.names.plural, "projectloggings");
        assert_eq!(crd.spec.scope, "Namespaced");
    }
}
