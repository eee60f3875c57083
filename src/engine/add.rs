use super::{report::Report, Checker, Name, Role, TestResult};
use crate::resolver::{Answer, Lookup, Resolve};

impl<R: Resolve> Checker<'_, R> {
    /// A new name must be missing from prod and present on test with the
    /// requested value.
    pub(super) fn check_add(&self, hostname: &str, value: &str) -> TestResult {
        let host = self.name(hostname);
        let target = self.name(value);
        let mut report = Report::default();

        let prod = self.resolve(&host, Role::Prod);
        let test = self.resolve(&host, Role::Test);
        match prod {
            Lookup::Status(status) if status.is_nxdomain() => {}
            Lookup::Status(status) => {
                return report.fail(format!(
                    "prod server returned status {status} for name {host} (PROD)"
                ))
            }
            Lookup::Answer(_) => {
                return report.fail(format!(
                    "new name {host} returned valid result from prod server (PROD)"
                ))
            }
        }
        match test {
            Lookup::Answer(answer) => {
                report.secondary(format!("PROD server returns NXDOMAIN for {host} (PROD)"));
                self.added_answer(&host, &target, answer, Role::Test, report)
            }
            Lookup::Status(status) => {
                report.fail(format!("status {status} for name {host} (TEST)"))
            }
        }
    }

    /// After promotion, prod alone must serve the requested value.
    pub(super) fn verify_add(&self, hostname: &str, value: &str) -> TestResult {
        let host = self.name(hostname);
        let target = self.name(value);
        let report = Report::default();
        match self.resolve(&host, Role::Prod) {
            Lookup::Answer(answer) => self.added_answer(&host, &target, answer, Role::Prod, report),
            Lookup::Status(status) => {
                report.fail(format!("status {status} for name {host} (PROD)"))
            }
        }
    }

    /// Compares the answer with the requested value. Address records get a
    /// reverse check on the value even when it doesn't match.
    fn added_answer(
        &self,
        host: &Name,
        target: &Name,
        answer: Answer,
        role: Role,
        mut report: Report,
    ) -> TestResult {
        let ok = target.matches(&answer.data);
        if answer.is_address() {
            self.reverse_check(&target.raw, &[host], role, &mut report);
        }
        if ok {
            report.pass(format!("{host} => {target} ({role})"))
        } else {
            report.fail(format!(
                "{host} resolves to {} instead of {target} ({role})",
                answer.data
            ))
        }
    }
}
