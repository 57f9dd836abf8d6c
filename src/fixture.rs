//! JSON test fixtures
//!
//! A fixture is an array of entries, each naming a URL anchor and a list of
//! API calls with their expected responses:
//!
//! ```json
//! [{
//!   "anchor": "projects",
//!   "type-metadata": [{
//!     "RequestBody": {"metadata": {"name": "proj1"}},
//!     "ResponseCode": 201,
//!     "ResponseText": {"metadata": {"name": "proj1"}}
//!   }]
//! }]
//! ```
//!
//! Accessors are lenient: a missing or mistyped key yields `None` and a
//! logged diagnostic, never an error, so one bad entry cannot stop a suite.

use serde_json::{Map, Value};
use std::path::Path;

use crate::common::{Error, Result};

const ANCHOR: &str = "anchor";
const CALLS: &str = "type-metadata";
const REQUEST_BODY: &str = "RequestBody";
const REQUEST_BODY_FILE: &str = "RequestBodyFile";
const RESPONSE_CODE: &str = "ResponseCode";
const RESPONSE_TEXT: &str = "ResponseText";

/// A parsed fixture document
#[derive(Debug, Clone)]
pub struct Fixture {
    entries: Vec<Value>,
}

impl Fixture {
    /// Load a fixture file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
            .map_err(|e| Error::Fixture(format!("{}: {}", path.display(), e)))
    }

    /// Parse fixture JSON; the top level must be an array
    pub fn parse(content: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(content)? {
            Value::Array(entries) => Ok(Self { entries }),
            other => Err(Error::Fixture(format!(
                "expected an array of test entries, found {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if it exists and is an object
    pub fn entry(&self, index: usize) -> Option<FixtureEntry<'_>> {
        match self.entries.get(index) {
            Some(Value::Object(fields)) => Some(FixtureEntry { index, fields }),
            Some(other) => {
                tracing::warn!(
                    "Fixture entry {} is {}, not an object",
                    index,
                    kind_of(other)
                );
                None
            }
            None => {
                tracing::debug!("Fixture has no entry {}", index);
                None
            }
        }
    }

    /// All well-formed entries in order
    pub fn entries(&self) -> impl Iterator<Item = FixtureEntry<'_>> {
        (0..self.entries.len()).filter_map(|index| self.entry(index))
    }

    /// Counts of the well-formed entries and calls
    pub fn stats(&self) -> FixtureStats {
        let mut stats = FixtureStats::default();
        for entry in self.entries() {
            stats.entries += 1;
            for call in entry.calls() {
                stats.calls += 1;
                if call.request_body().is_some() {
                    stats.with_body += 1;
                }
                if call.request_body_file().is_some() {
                    stats.with_upload += 1;
                }
            }
        }
        stats
    }

    /// Human-readable structural problems, empty when the fixture is sound
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.is_empty() {
            problems.push("no test entries".to_string());
        }
        for (index, value) in self.entries.iter().enumerate() {
            let Value::Object(fields) = value else {
                problems.push(format!("entry {}: not an object", index));
                continue;
            };
            let entry = FixtureEntry { index, fields };
            if entry.anchor().is_none() {
                problems.push(format!("entry {}: missing '{}'", index, ANCHOR));
            }
            match fields.get(CALLS) {
                Some(Value::Array(calls)) => {
                    for (sub_index, call) in calls.iter().enumerate() {
                        match call {
                            Value::Object(call) if call.contains_key(RESPONSE_CODE) => {}
                            Value::Object(_) => problems.push(format!(
                                "entry {} call {}: missing '{}'",
                                index, sub_index, RESPONSE_CODE
                            )),
                            _ => problems.push(format!(
                                "entry {} call {}: not an object",
                                index, sub_index
                            )),
                        }
                    }
                }
                _ => problems.push(format!("entry {}: missing '{}' list", index, CALLS)),
            }
        }
        problems
    }
}

/// Shape summary printed by `check`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureStats {
    pub entries: usize,
    pub calls: usize,
    /// Calls carrying a request body
    pub with_body: usize,
    /// Calls uploading a file
    pub with_upload: usize,
}

/// One test entry of a fixture
#[derive(Debug, Clone, Copy)]
pub struct FixtureEntry<'a> {
    index: usize,
    fields: &'a Map<String, Value>,
}

impl<'a> FixtureEntry<'a> {
    /// URL suffix of the resource under test
    pub fn anchor(&self) -> Option<&'a str> {
        lookup(self.fields, ANCHOR, self.index)?.as_str().or_else(|| {
            tracing::warn!("Fixture entry {}: '{}' is not a string", self.index, ANCHOR);
            None
        })
    }

    /// Number of API calls in this entry
    pub fn call_count(&self) -> Option<usize> {
        self.call_list().map(|calls| calls.len())
    }

    /// API call at `sub_index`
    pub fn call(&self, sub_index: usize) -> Option<ApiCall<'a>> {
        match self.call_list()?.get(sub_index) {
            Some(Value::Object(fields)) => Some(ApiCall {
                entry: self.index,
                index: sub_index,
                fields,
            }),
            _ => {
                tracing::debug!(
                    "Fixture entry {}: no call object at {}",
                    self.index,
                    sub_index
                );
                None
            }
        }
    }

    /// All well-formed calls in order
    pub fn calls(&self) -> Vec<ApiCall<'a>> {
        let count = self.call_count().unwrap_or(0);
        (0..count).filter_map(|i| self.call(i)).collect()
    }

    fn call_list(&self) -> Option<&'a Vec<Value>> {
        lookup(self.fields, CALLS, self.index)?.as_array().or_else(|| {
            tracing::warn!("Fixture entry {}: '{}' is not a list", self.index, CALLS);
            None
        })
    }
}

/// Expected response text of a call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpectedText<'a> {
    /// Must appear somewhere in the body
    Literal(&'a str),
    /// Must equal the body parsed as JSON
    Structured(&'a Value),
}

impl ExpectedText<'_> {
    pub fn matches(&self, body: &str) -> bool {
        match self {
            ExpectedText::Literal(text) => body.contains(*text),
            ExpectedText::Structured(expected) => serde_json::from_str::<Value>(body)
                .map(|actual| &actual == *expected)
                .unwrap_or(false),
        }
    }
}

/// One API call of an entry with its expectations
#[derive(Debug, Clone, Copy)]
pub struct ApiCall<'a> {
    entry: usize,
    index: usize,
    fields: &'a Map<String, Value>,
}

impl<'a> ApiCall<'a> {
    pub fn request_body(&self) -> Option<&'a Value> {
        self.get(REQUEST_BODY)
    }

    /// File uploaded alongside the request body
    pub fn request_body_file(&self) -> Option<&'a str> {
        self.get(REQUEST_BODY_FILE)?.as_str().or_else(|| {
            tracing::warn!("{}: '{}' is not a string", self.location(), REQUEST_BODY_FILE);
            None
        })
    }

    pub fn response_code(&self) -> Option<u16> {
        let value = self.get(RESPONSE_CODE)?;
        value
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .or_else(|| {
                tracing::warn!(
                    "{}: '{}' is not a status code: {}",
                    self.location(),
                    RESPONSE_CODE,
                    value
                );
                None
            })
    }

    pub fn response_text(&self) -> Option<ExpectedText<'a>> {
        match self.get(RESPONSE_TEXT)? {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(ExpectedText::Literal(text)),
            structured => Some(ExpectedText::Structured(structured)),
        }
    }

    /// Compare an actual response against this call's expectations
    ///
    /// Returns one message per mismatch; empty means the response matched.
    pub fn verify(&self, status: u16, body: &str) -> Vec<String> {
        let mut mismatches = Vec::new();

        match self.response_code() {
            Some(expected) if expected == status => {}
            expected => mismatches.push(format!(
                "Response Code does not match, expected: {}, actual: {}",
                expected.map(|c| c.to_string()).unwrap_or_else(|| "None".to_string()),
                status
            )),
        }

        match self.response_text() {
            Some(expected @ ExpectedText::Literal(text)) if !expected.matches(body) => {
                mismatches.push(format!(
                    "Response Text does not contain expected string, expected: {}, actual: {}",
                    text, body
                ))
            }
            Some(expected @ ExpectedText::Structured(value)) if !expected.matches(body) => {
                mismatches.push(format!(
                    "Response Text does not match expected JSON, expected: {}, actual: {}",
                    value, body
                ))
            }
            _ => {}
        }

        mismatches
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        let value = self.fields.get(key);
        if value.is_none() {
            tracing::debug!("{}: could not find key '{}'", self.location(), key);
        }
        value
    }

    fn location(&self) -> String {
        format!("Fixture entry {} call {}", self.entry, self.index)
    }
}

fn lookup<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
    index: usize,
) -> Option<&'a Value> {
    let value = fields.get(key);
    if value.is_none() {
        tracing::debug!("Fixture entry {}: could not find key '{}'", index, key);
    }
    value
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
