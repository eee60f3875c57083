use super::{report::Report, Checker, Role, TestResult};
use crate::resolver::{Lookup, Resolve};

impl<R: Resolve> Checker<'_, R> {
    /// Same value, new name. On test the old name must be gone and the new
    /// one must resolve exactly like the old one does on prod.
    pub(super) fn check_rename(&self, hostname: &str, newname: &str, value: &str) -> TestResult {
        let old = self.name(hostname);
        let new = self.name(newname);
        let target = self.name(value);
        let mut report = Report::default();

        if let Lookup::Answer(answer) = self.resolve(&old, Role::Test) {
            return report.fail(format!(
                "{old} got answer from TEST ({}), old name is still active (TEST)",
                answer.data
            ));
        }
        let test = self.resolve(&new, Role::Test);
        let prod = match self.resolve(&old, Role::Prod) {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!(
                    "{old} got status {status} from PROD - cannot rename a name that doesn't exist (PROD)"
                ))
            }
        };
        let test = match test {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!("{new} got status {status} (TEST)"))
            }
        };
        if test.data != prod.data {
            return report.fail(format!(
                "{old} => {new} rename is bad, resolves to {} in TEST and {} in PROD",
                test.data, prod.data
            ));
        }
        if !target.matches(&test.data) {
            return report.fail(format!(
                "{old} => {new} rename is bad, resolves to {} in TEST (expected value was {target}) (TEST)",
                test.data
            ));
        }
        if test.is_address() {
            self.reverse_check(&test.data, &[&new, &old], Role::Test, &mut report);
        }
        report.pass(format!("rename {old} => {new} (TEST)"))
    }

    /// After promotion, prod must have dropped the old name and serve the
    /// value under the new one.
    pub(super) fn verify_rename(&self, hostname: &str, newname: &str, value: &str) -> TestResult {
        let old = self.name(hostname);
        let new = self.name(newname);
        let target = self.name(value);
        let mut report = Report::default();

        let test = self.resolve(&new, Role::Test);
        let prod = self.resolve(&new, Role::Prod);
        if let Lookup::Answer(answer) = self.resolve(&old, Role::Prod) {
            return report.fail(format!(
                "{old} got answer from PROD ({}), old name is still active (PROD)",
                answer.data
            ));
        }
        let prod = match prod {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!("{new} got status {status} (PROD)"))
            }
        };
        if let Lookup::Status(status) = test {
            report.warning(format!("{new} got status {status} (TEST)"));
        }
        if !target.matches(&prod.data) {
            return report.fail(format!(
                "{old} => {new} rename is bad, resolves to {} in PROD (expected value was {target}) (PROD)",
                prod.data
            ));
        }
        if prod.is_address() {
            self.reverse_check(&prod.data, &[&new, &old], Role::Prod, &mut report);
        }
        report.pass(format!("rename {old} => {new} (PROD)"))
    }
}
