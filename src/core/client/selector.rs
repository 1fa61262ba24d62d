use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

const MAX_PREFIX_LEN: usize = 253;
const MAX_NAME_LEN: usize = 63;
/// `<prefix>/<name>`
const MAX_KEY_LEN: usize = MAX_PREFIX_LEN + 1 + MAX_NAME_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Equals(String, String),
    NotEquals(String, String),
    In(String, BTreeSet<String>),
    NotIn(String, BTreeSet<String>),
    Exists(String),
    DoesNotExist(String),
}

impl Requirement {
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Requirement::Equals(key, value) => labels.get(key) == Some(value),
            // A missing key satisfies `!=`.
            Requirement::NotEquals(key, value) => labels.get(key) != Some(value),
            Requirement::In(key, values) => labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::NotIn(key, values) => !labels.get(key).is_some_and(|v| values.contains(v)),
            Requirement::Exists(key) => labels.contains_key(key),
            Requirement::DoesNotExist(key) => !labels.contains_key(key),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &BTreeSet<String>| values.iter().cloned().collect::<Vec<_>>().join(",");
        match self {
            Requirement::Equals(k, v) => write!(f, "{k}={v}"),
            Requirement::NotEquals(k, v) => write!(f, "{k}!={v}"),
            Requirement::In(k, vs) => write!(f, "{k} in ({})", join(vs)),
            Requirement::NotIn(k, vs) => write!(f, "{k} notin ({})", join(vs)),
            Requirement::Exists(k) => write!(f, "{k}"),
            Requirement::DoesNotExist(k) => write!(f, "!{k}"),
        }
    }
}

/// Label selector in the API server's string syntax. The empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn from_labels(labels: &BTreeMap<String, String>) -> Self {
        Self {
            requirements: labels
                .iter()
                .map(|(k, v)| Requirement::Equals(k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        let empty = BTreeMap::new();
        let labels = labels.unwrap_or(&empty);
        self.requirements.iter().all(|r| r.matches(labels))
    }

    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut requirements = Vec::new();
        for term in split_terms(input).map_err(|r| invalid(r))? {
            let term = term.trim();
            if term.is_empty() {
                if input.trim().is_empty() {
                    continue;
                }
                return Err(invalid("empty requirement"));
            }
            requirements.push(parse_requirement(term).map_err(|r| invalid(&r))?);
        }
        Ok(Self { requirements })
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

/// Splits on commas that are not inside a `( ... )` value set.
fn split_terms(input: &str) -> std::result::Result<Vec<&str>, &'static str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or("unbalanced parenthesis")?,
            ',' if depth == 0 => {
                terms.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced parenthesis");
    }
    terms.push(&input[start..]);
    Ok(terms)
}

fn parse_requirement(term: &str) -> std::result::Result<Requirement, String> {
    if let Some(key) = term.strip_prefix('!') {
        return Ok(Requirement::DoesNotExist(valid_key(key.trim())?));
    }

    if let Some((key, value)) = term.split_once("!=") {
        return Ok(Requirement::NotEquals(valid_key(key.trim())?, valid_value(value.trim())?));
    }
    if let Some((key, value)) = term.split_once("==") {
        return Ok(Requirement::Equals(valid_key(key.trim())?, valid_value(value.trim())?));
    }
    if let Some((key, value)) = term.split_once('=') {
        return Ok(Requirement::Equals(valid_key(key.trim())?, valid_value(value.trim())?));
    }

    let mut words = term.splitn(2, char::is_whitespace);
    let key = words.next().unwrap_or_default().trim();
    let rest = words.next().unwrap_or_default().trim();
    if rest.is_empty() {
        return Ok(Requirement::Exists(valid_key(key)?));
    }

    let (op, set) = rest
        .split_once('(')
        .ok_or_else(|| format!("expected value set after {key:?}"))?;
    let set = set
        .trim_end()
        .strip_suffix(')')
        .ok_or_else(|| "value set must end with ')'".to_string())?;
    if set.trim().is_empty() {
        return Err(format!("value set for {key:?} can't be empty"));
    }
    let values = set
        .split(',')
        .map(|v| valid_value(v.trim()))
        .collect::<std::result::Result<BTreeSet<_>, _>>()?;

    match op.trim() {
        "in" => Ok(Requirement::In(valid_key(key)?, values)),
        "notin" => Ok(Requirement::NotIn(valid_key(key)?, values)),
        other => Err(format!("unknown operator {other:?}")),
    }
}

fn valid_key(key: &str) -> std::result::Result<String, String> {
    let ok = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if ok {
        Ok(key.to_string())
    } else {
        Err(format!("invalid label key {key:?}"))
    }
}

fn valid_value(value: &str) -> std::result::Result<String, String> {
    let ok = value.len() <= MAX_NAME_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(value.to_string())
    } else {
        Err(format!("invalid label value {value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn empty_selector_matches_everything() {
        let sel = Selector::parse("").unwrap();
        assert!(sel.is_empty());
        assert!(sel.matches(None));
        assert!(sel.matches(Some(&labels(&[("a", "b")]))));
    }

    #[test]
    fn equality_operators() {
        let sel: Selector = "app=fluentd,tier==logging,env!=prod".parse().unwrap();
        assert_eq!(sel.requirements().len(), 3);
        assert!(sel.matches(Some(&labels(&[("app", "fluentd"), ("tier", "logging")]))));
        assert!(!sel.matches(Some(&labels(&[
            ("app", "fluentd"),
            ("tier", "logging"),
            ("env", "prod")
        ]))));
        assert!(!sel.matches(None));
    }

    #[test]
    fn set_operators() {
        let sel = Selector::parse("env in (dev, qa),team notin (ops)").unwrap();
        assert!(sel.matches(Some(&labels(&[("env", "qa")]))));
        assert!(!sel.matches(Some(&labels(&[("env", "qa"), ("team", "ops")]))));
        assert!(!sel.matches(Some(&labels(&[("env", "prod")]))));
        assert_eq!(sel.to_string(), "env in (dev,qa),team notin (ops)");
    }

    #[test]
    fn existence_operators() {
        let sel = Selector::parse("owner,!deprecated").unwrap();
        assert!(sel.matches(Some(&labels(&[("owner", "")]))));
        assert!(!sel.matches(Some(&labels(&[("owner", "x"), ("deprecated", "true")]))));
        assert!(!sel.matches(Some(&labels(&[]))));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["a=b,", "env in (dev", "env within (dev)", "bad key=x", "a=b c", "env in ()", "env notin ( )"] {
            let err = Selector::parse(input).unwrap_err();
            assert!(
                matches!(err, Error::InvalidSelector { .. }),
                "{input}: {err}"
            );
        }
    }

    #[test]
    fn from_labels_round_trips_through_display() {
        let sel = Selector::from_labels(&labels(&[("a", "1"), ("b", "2")]));
        assert_eq!(sel.to_string(), "a=1,b=2");
        assert_eq!(Selector::parse(&sel.to_string()).unwrap(), sel);
    }
}
