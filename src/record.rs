use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Passed,
    Failed,
    Pending,
    Skipped,
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(status: &str) -> Result<Self> {
        match status {
            "passed" => Ok(Status::Passed),
            "failed" => Ok(Status::Failed),
            // Jest reports `it.todo` and disabled tests with their own statuses.
            "pending" | "todo" | "disabled" => Ok(Status::Pending),
            "skipped" => Ok(Status::Skipped),
            other => Err(anyhow!("Unknown test status {:?}", other)),
        }
    }
}

/// One executed test case, normalised from whatever the runner emitted.
#[derive(Clone, Debug, PartialEq)]
pub struct TestRecord {
    pub name: String,
    pub title: String,
    pub ancestors: Vec<String>,
    pub duration_ms: u64,
    pub status: Status,
    pub failure_messages: Vec<String>,
}

impl TestRecord {
    pub fn new(name: &str, status: Status, duration_ms: u64) -> Self {
        TestRecord {
            name: name.to_string(),
            title: name.to_string(),
            ancestors: vec![],
            duration_ms,
            status,
            failure_messages: vec![],
        }
    }

    #[cfg(test)]
    pub fn with_failure_messages(mut self, messages: &[&str]) -> Self {
        self.failure_messages = messages.iter().map(|m| m.to_string()).collect();
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestFile {
    pub path: String,
    pub cases: Vec<TestRecord>,
}

impl TestFile {
    pub fn new(path: &str, cases: Vec<TestRecord>) -> Self {
        TestFile {
            path: path.replace('\\', "/"),
            cases,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestRun {
    pub files: Vec<TestFile>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub pending: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.pending + self.skipped
    }
}

impl TestRun {
    pub fn new(files: Vec<TestFile>) -> Self {
        TestRun { files }
    }

    pub fn case_count(&self) -> usize {
        self.files.iter().map(|file| file.cases.len()).sum()
    }

    pub fn cases(&self) -> impl Iterator<Item = &TestRecord> {
        self.files.iter().flat_map(|file| file.cases.iter())
    }

    pub fn summary(&self) -> Summary {
        self.cases().fold(Summary::default(), |mut summary, case| {
            match case.status {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Pending => summary.pending += 1,
                Status::Skipped => summary.skipped += 1,
            }
            summary
        })
    }

    /**
    Read the aggregated results Jest hands to reporters, or the document written by `jest --json`.

    File groupings come from `testResults`; their cases from `testResults` (reporter API)
    or `assertionResults` (`--json`). Loosely typed fields are resolved here once: a name
    or message that is not a string becomes empty, a missing duration becomes zero.
    */
    pub fn from_jest_json(json: &str) -> Result<TestRun> {
        let raw: JestResults =
            serde_json::from_str(json).context("Failed to parse Jest results JSON")?;

        let files = raw
            .test_results
            .into_iter()
            .map(|file| {
                let path = file
                    .test_file_path
                    .or(file.name)
                    .ok_or_else(|| anyhow!("Test file result without a path"))?;
                let cases = file
                    .test_results
                    .or(file.assertion_results)
                    .unwrap_or_default()
                    .into_iter()
                    .map(JestCase::into_record)
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("Invalid test result in {}", path))?;
                Ok(TestFile::new(&path, cases))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TestRun { files })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JestResults {
    #[serde(default)]
    test_results: Vec<JestFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JestFile {
    test_file_path: Option<String>,
    name: Option<String>,
    test_results: Option<Vec<JestCase>>,
    assertion_results: Option<Vec<JestCase>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JestCase {
    #[serde(default)]
    full_name: Value,
    #[serde(default)]
    title: Value,
    #[serde(default)]
    ancestor_titles: Vec<Value>,
    #[serde(default)]
    duration: Value,
    status: String,
    #[serde(default)]
    failure_messages: Vec<Value>,
}

impl JestCase {
    fn into_record(self) -> Result<TestRecord> {
        let title = lenient_string(&self.title);
        let full_name = lenient_string(&self.full_name);
        let name = if full_name.is_empty() {
            title.clone()
        } else {
            full_name
        };

        Ok(TestRecord {
            name,
            title,
            ancestors: self.ancestor_titles.iter().map(lenient_string).collect(),
            duration_ms: lenient_duration(&self.duration),
            status: self.status.parse()?,
            failure_messages: self.failure_messages.iter().map(lenient_string).collect(),
        })
    }
}

fn lenient_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn lenient_duration(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|ms| ms.is_finite() && *ms > 0.0)
                .map(|ms| ms.round() as u64)
        })
        .unwrap_or(0)
}
