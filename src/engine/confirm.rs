use super::{report::Report, Checker, Role, TestResult};
use crate::resolver::{render_fields, Answer, Fields, Lookup, Resolve};

impl<R: Resolve> Checker<'_, R> {
    /// Test and prod must currently give the same response.
    pub(super) fn confirm(&self, hostname: &str) -> TestResult {
        let host = self.name(hostname);
        let mut report = Report::default();
        let test = self.resolve(&host, Role::Test);
        let prod = self.resolve(&host, Role::Prod);
        match (test, prod) {
            (Lookup::Status(t), Lookup::Status(p)) if t == p => {
                report.pass(format!("both test and prod returned status {t} for name {host}"))
            }
            (Lookup::Status(t), Lookup::Status(p)) => report.fail(format!(
                "test server returned status {t} for name {host}, but prod returned status {p}"
            )),
            (Lookup::Status(t), Lookup::Answer(p)) => report.fail(format!(
                "test server returned status {t} for name {host}, but prod returned valid answer of {}",
                p.data
            )),
            (Lookup::Answer(t), Lookup::Status(p)) => report.fail(format!(
                "prod server returned status {p} for name {host}, but test returned valid answer of {}",
                t.data
            )),
            (Lookup::Answer(t), Lookup::Answer(p)) => {
                let prod_fields = self.comparable_fields(&p);
                let differences = diff_fields(&self.comparable_fields(&t), &prod_fields);
                if differences.is_empty() {
                    report.secondary(format!("response: {}", render_fields(&prod_fields)));
                    return report.pass(format!(
                        "prod and test servers return same response for '{host}'"
                    ));
                }
                for difference in differences {
                    report.warning(difference);
                }
                report.fail(format!(
                    "prod and test servers return different responses for '{host}'"
                ))
            }
        }
    }

    fn comparable_fields(&self, answer: &Answer) -> Fields {
        let mut fields = answer.fields();
        if self.config.ignore_ttl {
            fields.remove("ttl");
        }
        fields
    }
}

/// Describes every field that differs between two responses, sorted.
pub fn diff_fields(test: &Fields, prod: &Fields) -> Vec<String> {
    let mut differences = Vec::new();
    for (key, value) in test {
        match prod.get(key) {
            None => differences.push(format!(
                "NG: test response has {key} of '{value}'; prod response does not include {key}"
            )),
            Some(other) if other != value => differences.push(format!(
                "NG: test response has {key} of '{value}' but prod response has '{other}'"
            )),
            Some(_) => {}
        }
    }
    for (key, value) in prod {
        if !test.contains_key(key) {
            differences.push(format!(
                "NG: prod response has {key} of '{value}'; test response does not include {key}"
            ));
        }
    }
    differences.sort();
    differences
}
