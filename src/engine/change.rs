use super::{report::Report, Checker, Role, TestResult};
use crate::resolver::{Lookup, Resolve};

impl<R: Resolve> Checker<'_, R> {
    /// Same name, new value. Test must differ from prod, and must hold the
    /// requested value.
    pub(super) fn check_change(&self, hostname: &str, value: &str) -> TestResult {
        let host = self.name(hostname);
        let target = self.name(value);
        let mut report = Report::default();

        let test = self.resolve(&host, Role::Test);
        let prod = match self.resolve(&host, Role::Prod) {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!(
                    "{host} got status {status} from PROD - cannot change a name that doesn't exist (PROD)"
                ))
            }
        };
        let test = match test {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!("{host} got status {status} (TEST)"))
            }
        };
        // A change has to be observable, even if prod already holds the new value.
        if test.data == prod.data {
            return report.fail(format!(
                "{host} is not changed, resolves to same value ({}) in TEST and PROD",
                test.data
            ));
        }
        if !target.matches(&test.data) {
            return report.fail(format!(
                "{host} resolves to {} instead of {target} (TEST)",
                test.data
            ));
        }
        if test.is_address() {
            self.reverse_check(&test.data, &[&host], Role::Test, &mut report);
        }
        report.pass(format!(
            "change {host} from '{}' to '{}' (TEST)",
            prod.data, test.data
        ))
    }

    /// After promotion, prod must hold the requested value.
    pub(super) fn verify_change(&self, hostname: &str, value: &str) -> TestResult {
        let host = self.name(hostname);
        let target = self.name(value);
        let mut report = Report::default();
        match self.resolve(&host, Role::Prod) {
            Lookup::Status(status) => report.fail(format!("{host} got status {status} (PROD)")),
            Lookup::Answer(answer) if target.matches(&answer.data) => {
                if answer.is_address() {
                    self.reverse_check(&answer.data, &[&host], Role::Prod, &mut report);
                }
                report.pass(format!("change {host} value to '{}' (PROD)", answer.data))
            }
            Lookup::Answer(answer) => report.fail(format!(
                "{host} resolves to {} instead of {target} (PROD)",
                answer.data
            )),
        }
    }
}
