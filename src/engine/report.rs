/// The outcome of checking one change line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    /// True only when the main assertion for the change type holds.
    pub result: bool,
    pub message: String,
    /// Supporting detail, in the order it was found.
    pub secondary: Vec<String>,
    /// Anomalies that don't fail the test, mostly reverse DNS.
    pub warnings: Vec<String>,
}

/// Collects detail lines while a check runs. A [`TestResult`] only comes out
/// of `pass`, `fail` or `finish`, so every result has a message.
#[derive(Debug, Default)]
pub(crate) struct Report {
    secondary: Vec<String>,
    warnings: Vec<String>,
}

impl Report {
    pub(crate) fn secondary(&mut self, line: impl Into<String>) {
        self.secondary.push(line.into());
    }

    pub(crate) fn warning(&mut self, line: impl Into<String>) {
        self.warnings.push(line.into());
    }

    pub(crate) fn pass(self, message: impl Into<String>) -> TestResult {
        self.finish(true, message)
    }

    pub(crate) fn fail(self, message: impl Into<String>) -> TestResult {
        self.finish(false, message)
    }

    pub(crate) fn finish(self, result: bool, message: impl Into<String>) -> TestResult {
        TestResult {
            result,
            message: message.into(),
            secondary: self.secondary,
            warnings: self.warnings,
        }
    }
}
