//! Typed counter extraction from a raw status snapshot

use std::fmt;

use crate::status::RawStatus;

/// The counters captured on every run, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    Commit,
    Insert,
    Rollback,
    Select,
    Update,
    Delete,
    ClusterSize,
}

impl Counter {
    pub const COUNT: usize = 7;

    /// Declaration order, which is also the field order of the output line
    pub const ALL: [Counter; Counter::COUNT] = [
        Counter::Commit,
        Counter::Insert,
        Counter::Rollback,
        Counter::Select,
        Counter::Update,
        Counter::Delete,
        Counter::ClusterSize,
    ];

    /// Field name used in the output line
    pub fn name(self) -> &'static str {
        match self {
            Counter::Commit => "commit",
            Counter::Insert => "insert",
            Counter::Rollback => "rollback",
            Counter::Select => "select",
            Counter::Update => "update",
            Counter::Delete => "delete",
            Counter::ClusterSize => "cluster_size",
        }
    }

    /// Status variable the counter is read from on a Galera node
    pub fn status_variable(self) -> &'static str {
        match self {
            Counter::Commit => "Com_commit",
            Counter::Insert => "Com_insert",
            Counter::Rollback => "Com_rollback",
            Counter::Select => "Com_select",
            Counter::Update => "Com_update",
            Counter::Delete => "Com_delete",
            Counter::ClusterSize => "wsrep_cluster_size",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a counter could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("expected state key not found: {0}")]
    MissingKey(String),
    #[error("state key {key} is not an unsigned integer: '{value}'")]
    Parse { key: String, value: String },
}

/// Parse a single counter; MySQL status counters are unsigned 64-bit
fn parse_counter(raw: &RawStatus, key: &str) -> Result<u64, ExtractError> {
    let value = raw
        .get(key)
        .ok_or_else(|| ExtractError::MissingKey(key.to_string()))?;
    value.trim().parse().map_err(|_| ExtractError::Parse {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// All seven counters of one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterRecord {
    values: [u64; Counter::COUNT],
}

impl CounterRecord {
    /// Build a record from values given in `Counter::ALL` order
    pub fn from_values(values: [u64; Counter::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, counter: Counter) -> u64 {
        self.values[counter.index()]
    }

    /// Counters with their values, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (Counter, u64)> + '_ {
        Counter::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

/// Maps counters to status variables and parses them
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    keys: [String; Counter::COUNT],
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self::with_keys(Counter::ALL.map(|c| c.status_variable().to_string()))
    }
}

impl MetricExtractor {
    /// Use an alternative counter mapping, keys given in `Counter::ALL` order
    pub fn with_keys(keys: [String; Counter::COUNT]) -> Self {
        Self { keys }
    }

    /// Status variable backing `counter`
    pub fn key(&self, counter: Counter) -> &str {
        &self.keys[counter.index()]
    }

    /// Extract every counter, failing on the first missing or malformed one
    pub fn extract(&self, raw: &RawStatus) -> Result<CounterRecord, ExtractError> {
        let mut values = [0u64; Counter::COUNT];
        for counter in Counter::ALL {
            values[counter.index()] = parse_counter(raw, self.key(counter))?;
        }
        Ok(CounterRecord::from_values(values))
    }

    /// The group size held by `record`, named by the variable it was read from
    pub fn group_size<'a>(&'a self, record: &CounterRecord) -> GroupSizeReading<'a> {
        GroupSizeReading {
            key: self.key(Counter::ClusterSize),
            value: record.get(Counter::ClusterSize),
        }
    }
}

/// Observed replication group size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupSizeReading<'a> {
    pub key: &'a str,
    pub value: u64,
}
