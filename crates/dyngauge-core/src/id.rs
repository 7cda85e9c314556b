//! Monitor identities: a name plus an unordered set of tags.
//!
//! Tags are kept in a `BTreeMap`, so two tag lists built from the same pairs in
//! a different order compare and hash equal. A repeated key keeps the last
//! value written for it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DynGaugeError;

/// Helper to escape tag values for rendering.
fn escape_value(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// A single `key=value` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    key: String,
    value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Tag {
    type Err = DynGaugeError;

    /// Parse `key=value`. The key must be non-empty; the value may be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| DynGaugeError::Config(format!("tag must be key=value: {s:?}")))?;
        if k.is_empty() {
            return Err(DynGaugeError::Config(format!("tag key must not be empty: {s:?}")));
        }
        Ok(Tag::new(k, v))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.key, escape_value(&self.value))
    }
}

/// Unordered set of tags, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TagList {
    tags: BTreeMap<String, String>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<Tag> for TagList {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let tags = iter.into_iter().map(|t| (t.key, t.value)).collect();
        Self { tags }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let tags = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { tags }
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{}=\"{}\"", k, escape_value(v))?;
        }
        Ok(())
    }
}

/// Identity of a monitor: name + tags. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitorId {
    name: String,
    tags: TagList,
}

impl MonitorId {
    /// Identity with a name and no tags.
    pub fn of(name: impl Into<String>) -> Self {
        Self { name: name.into(), tags: TagList::new() }
    }

    pub fn builder(name: impl Into<String>) -> MonitorIdBuilder {
        MonitorIdBuilder { name: name.into(), tags: TagList::new() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &TagList {
        &self.tags
    }
}

impl fmt::Display for MonitorId {
    /// Renders as `name` or `name{k="v",...}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}{{{}}}", self.name, self.tags)
        }
    }
}

pub struct MonitorIdBuilder {
    name: String,
    tags: TagList,
}

impl MonitorIdBuilder {
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags = self.tags.with(key, value);
        self
    }

    /// Merge every tag of `tags` into the identity being built.
    pub fn with_tags(mut self, tags: &TagList) -> Self {
        for (k, v) in tags.iter() {
            self.tags = self.tags.with(k, v);
        }
        self
    }

    pub fn build(self) -> MonitorId {
        MonitorId { name: self.name, tags: self.tags }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn tag_parse_rejects_missing_separator_and_empty_key() {
        assert!("host".parse::<Tag>().is_err());
        assert!("=x".parse::<Tag>().is_err());
        let t: Tag = "host=".parse().unwrap();
        assert_eq!(t.key(), "host");
        assert_eq!(t.value(), "");
    }

    #[test]
    fn display_escapes_quotes() {
        let id = MonitorId::builder("requests").with_tag("path", "a\"b").build();
        assert_eq!(id.to_string(), r#"requests{path="a\"b"}"#);
        assert_eq!(MonitorId::of("requests").to_string(), "requests");
    }

    #[test]
    fn repeated_key_keeps_last_value() {
        let tags: TagList = [("k", "1"), ("k", "2")].into_iter().collect();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("k"), Some("2"));
    }
}
