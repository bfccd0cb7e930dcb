use crate::model::*;
use crate::record::{Status, TestFile, TestRecord, TestRun};
use crate::sonar::replace_file;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "./junit.xml";
pub const DEFAULT_ANCESTOR_SEPARATOR: &str = " › ";
const REPORT_NAME: &str = "jest tests";

/// Options for the JUnit report, named after the jest-junit settings they mirror.
#[derive(Clone, Debug, PartialEq)]
pub struct JunitOptions {
    pub output: PathBuf,
    pub ancestor_separator: String,
    pub use_path_for_suite_name: bool,
}

impl Default for JunitOptions {
    fn default() -> Self {
        JunitOptions {
            output: PathBuf::from(DEFAULT_OUTPUT),
            ancestor_separator: String::from(DEFAULT_ANCESTOR_SEPARATOR),
            use_path_for_suite_name: true,
        }
    }
}

fn seconds(duration_ms: u64) -> f32 {
    duration_ms as f32 / 1000.0
}

fn to_testcase(case: &TestRecord, options: &JunitOptions) -> TestCase {
    let title = if case.title.is_empty() {
        &case.name
    } else {
        &case.title
    };
    let classname = case
        .ancestors
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(title.as_str()))
        .collect::<Vec<_>>()
        .join(options.ancestor_separator.as_str());

    let failure = match case.status {
        Status::Failed => Some(Failure {
            message: case.failure_messages.first().cloned().unwrap_or_default(),
            failure_type: String::new(),
            body: case.failure_messages.join("\n"),
        }),
        _ => None,
    };
    let skipped = match case.status {
        Status::Pending | Status::Skipped => Some(Skipped::default()),
        _ => None,
    };

    TestCase {
        classname,
        name: title.clone(),
        time: seconds(case.duration_ms),
        file: None,
        failure,
        error: None,
        skipped,
    }
}

fn to_testsuite(file: &TestFile, options: &JunitOptions) -> TestSuite {
    // Without the path, jest-junit names a suite after its first describe block.
    let name = if options.use_path_for_suite_name {
        file.path.clone()
    } else {
        file.cases
            .first()
            .and_then(|case| case.ancestors.first())
            .cloned()
            .unwrap_or_else(|| file.path.clone())
    };

    let count = |wanted: &[Status]| {
        file.cases
            .iter()
            .filter(|case| wanted.contains(&case.status))
            .count() as u32
    };

    TestSuite {
        name,
        errors: 0,
        failures: count(&[Status::Failed]),
        skipped: count(&[Status::Pending, Status::Skipped]),
        tests: file.cases.len() as u32,
        time: seconds(file.cases.iter().map(|case| case.duration_ms).sum()),
        testcases: file
            .cases
            .iter()
            .map(|case| to_testcase(case, options))
            .collect(),
    }
}

pub fn to_junit(run: &TestRun, options: &JunitOptions) -> TestSuites {
    let testsuites: Vec<TestSuite> = run
        .files
        .iter()
        .map(|file| to_testsuite(file, options))
        .collect();

    TestSuites {
        name: String::from(REPORT_NAME),
        errors: 0,
        failures: testsuites.iter().map(|suite| suite.failures).sum(),
        tests: testsuites.iter().map(|suite| suite.tests).sum(),
        time: testsuites.iter().map(|suite| suite.time).sum(),
        testsuites,
    }
}

pub fn render(run: &TestRun, options: &JunitOptions) -> Result<String> {
    let yaserde_cfg = yaserde::ser::Config {
        perform_indent: true,
        ..Default::default()
    };

    yaserde::ser::to_string_with_config(&to_junit(run, options), &yaserde_cfg)
        .map_err(|msg| anyhow!("Failed to serialize JUnit report: {}", msg))
}

pub fn write_junit(run: &TestRun, options: &JunitOptions) -> Result<PathBuf> {
    let xml = render(run, options)?;

    if let Some(parent) = options.output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory {}", parent.display()))?;
    }

    replace_file(&options.output, xml.as_bytes())?;
    Ok(options.output.clone())
}

fn from_testcase(testcase: TestCase) -> TestRecord {
    let duration_ms = if testcase.time.is_finite() && testcase.time > 0.0 {
        (testcase.time * 1000.0).round() as u64
    } else {
        0
    };

    let problem = testcase.failure.or(testcase.error);
    let status = if problem.is_some() {
        Status::Failed
    } else if testcase.skipped.is_some() {
        Status::Skipped
    } else {
        Status::Passed
    };

    let mut record = TestRecord::new(&testcase.name, status, duration_ms);
    if let Some(problem) = problem {
        let message = if problem.body.trim().is_empty() {
            problem.message
        } else {
            problem.body
        };
        if !message.is_empty() {
            record.failure_messages.push(message);
        }
    }
    record
}

fn from_testsuite(suite: TestSuite) -> TestFile {
    let path = suite
        .testcases
        .iter()
        .find_map(|testcase| testcase.file.clone())
        .unwrap_or(suite.name);
    let cases = suite.testcases.into_iter().map(from_testcase).collect();
    TestFile::new(&path, cases)
}

impl TestRun {
    /**
    Read an existing JUnit report, with either `<testsuites>` or a single `<testsuite>` as root.

    Each suite becomes a file grouping named after the `file` attribute of its test cases when
    present, otherwise after the suite. `<failure>` and `<error>` both mark a case as failed.
    */
    pub fn from_junit_xml(xml: &str) -> Result<TestRun> {
        let suites = if xml.contains("<testsuites") {
            yaserde::de::from_str::<TestSuites>(xml)
                .map_err(|msg| anyhow!("Failed to parse JUnit report: {}", msg))?
                .testsuites
        } else {
            vec![yaserde::de::from_str::<TestSuite>(xml)
                .map_err(|msg| anyhow!("Failed to parse JUnit report: {}", msg))?]
        };

        Ok(TestRun::new(
            suites.into_iter().map(from_testsuite).collect(),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn footer_run() -> TestRun {
        let mut renders = TestRecord::new(
            "Footer Component renders without crashing",
            Status::Passed,
            12,
        );
        renders.title = String::from("renders without crashing");
        renders.ancestors = vec![String::from("Footer Component")];

        let mut year = TestRecord::new("Footer Component displays the current year", Status::Failed, 1500)
            .with_failure_messages(&["expected 2024", "received 1999"]);
        year.title = String::from("displays the current year");
        year.ancestors = vec![String::from("Footer Component")];

        let mut todo = TestRecord::new("Footer Component todo", Status::Pending, 0);
        todo.title = String::from("todo");
        todo.ancestors = vec![String::from("Footer Component"), String::from("later")];

        TestRun::new(vec![TestFile::new(
            "src/components/Footer.test.js",
            vec![renders, year, todo],
        )])
    }

    #[test]
    fn test_to_junit_counts_and_names() {
        let suites = to_junit(&footer_run(), &JunitOptions::default());
        assert_eq!(suites.name, "jest tests");
        assert_eq!(suites.tests, 3);
        assert_eq!(suites.failures, 1);

        let suite = &suites.testsuites[0];
        assert_eq!(suite.name, "src/components/Footer.test.js");
        assert_eq!(suite.skipped, 1);
        assert!((suite.time - 1.512).abs() < 1e-6);

        let cases = &suite.testcases;
        assert_eq!(cases[0].classname, "Footer Component › renders without crashing");
        assert_eq!(cases[0].name, "renders without crashing");
        assert_eq!(cases[0].failure, None);
        assert_eq!(cases[2].classname, "Footer Component › later › todo");
        assert!(cases[2].skipped.is_some());

        let failure = cases[1].failure.as_ref().unwrap();
        assert_eq!(failure.message, "expected 2024");
        assert_eq!(failure.body, "expected 2024\nreceived 1999");
    }

    #[test]
    fn test_suite_named_after_describe_block() {
        let options = JunitOptions {
            use_path_for_suite_name: false,
            ancestor_separator: String::from(" / "),
            ..Default::default()
        };
        let suites = to_junit(&footer_run(), &options);
        assert_eq!(suites.testsuites[0].name, "Footer Component");
        assert_eq!(
            suites.testsuites[0].testcases[0].classname,
            "Footer Component / renders without crashing"
        );
    }

    #[test]
    fn test_written_report_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let options = JunitOptions {
            output: dir.path().join("reports").join("junit.xml"),
            ..Default::default()
        };

        let path = write_junit(&footer_run(), &options).unwrap();
        let xml = fs::read_to_string(path).unwrap();
        assert!(xml.contains("<testsuites"));

        let run = TestRun::from_junit_xml(&xml).unwrap();
        assert_eq!(run.files[0].path, "src/components/Footer.test.js");
        let statuses: Vec<Status> = run.cases().map(|case| case.status).collect();
        assert_eq!(statuses, vec![Status::Passed, Status::Failed, Status::Skipped]);
        assert_eq!(run.files[0].cases[1].duration_ms, 1500);
    }

    #[test]
    fn test_from_single_testsuite() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuite name="portal" tests="2" failures="0" errors="1" time="0.5">
  <testcase classname="Header" name="contains logo element" time="0.25" file="src\components\Header.test.js"/>
  <testcase classname="Header" name="blows up" time="0.25">
    <error message="TypeError: boom">at Header.test.js:3</error>
  </testcase>
</testsuite>"#;
        let run = TestRun::from_junit_xml(xml).unwrap();
        assert_eq!(run.files.len(), 1);
        assert_eq!(run.files[0].path, "src/components/Header.test.js");

        let broken = &run.files[0].cases[1];
        assert_eq!(broken.status, Status::Failed);
        assert_eq!(broken.duration_ms, 250);
        assert_eq!(broken.failure_messages, vec!["at Header.test.js:3"]);
    }
}
