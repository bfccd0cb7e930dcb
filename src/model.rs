#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
pub struct Failure {
    #[yaserde(attribute)]
    pub message: String,
    #[yaserde(attribute, rename = "type")]
    pub failure_type: String,
    #[yaserde(text)]
    pub body: String,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
pub struct Skipped {
    #[yaserde(attribute)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
pub struct TestCase {
    #[yaserde(attribute)]
    pub classname: String,
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub time: f32,
    #[yaserde(attribute)]
    pub file: Option<String>,
    #[yaserde(child)]
    pub failure: Option<Failure>,
    #[yaserde(child)]
    pub error: Option<Failure>,
    #[yaserde(child)]
    pub skipped: Option<Skipped>,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "testsuite")]
pub struct TestSuite {
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub errors: u32,
    #[yaserde(attribute)]
    pub failures: u32,
    #[yaserde(attribute)]
    pub skipped: u32,
    #[yaserde(attribute)]
    pub tests: u32,
    #[yaserde(attribute)]
    pub time: f32,
    #[yaserde(rename = "testcase")]
    pub testcases: Vec<TestCase>,
}

#[derive(Clone, Debug, Default, PartialEq, YaDeserialize, YaSerialize)]
#[yaserde(rename = "testsuites")]
pub struct TestSuites {
    #[yaserde(attribute)]
    pub name: String,
    #[yaserde(attribute)]
    pub errors: u32,
    #[yaserde(attribute)]
    pub failures: u32,
    #[yaserde(attribute)]
    pub tests: u32,
    #[yaserde(attribute)]
    pub time: f32,
    #[yaserde(rename = "testsuite")]
    pub testsuites: Vec<TestSuite>,
}
