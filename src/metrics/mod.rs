//! InfluxDB line protocol output for the probe's counters
//!
//! `measurement,tag=value,... field=value,...`
//!
//! Names and values are written as-is; they must not contain `,`, `=` or
//! spaces.

use crate::health::CounterRecord;

/// Default measurement name
pub const DEFAULT_MEASUREMENT: &str = "galera";

/// Ordered tag set, written in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag, or replace the value of an existing one in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}

/// Format one data line
pub fn format_line(measurement: &str, tags: &Tags, metrics: &CounterRecord) -> String {
    let mut line = String::from(measurement);

    for (name, value) in tags.iter() {
        line.push(',');
        line.push_str(name);
        line.push('=');
        line.push_str(value);
    }

    let fields: Vec<String> = metrics
        .iter()
        .map(|(counter, value)| format!("{}={}", counter.name(), value))
        .collect();

    line.push(' ');
    line.push_str(&fields.join(","));
    line
}
