use super::{report::Report, Checker, Name, Role, TestResult};
use crate::resolver::{Lookup, Resolve};
use std::net::Ipv4Addr;

impl<R: Resolve> Checker<'_, R> {
    /// The name must exist on prod and be gone from test.
    pub(super) fn check_remove(&self, hostname: &str) -> TestResult {
        let host = self.name(hostname);
        let mut report = Report::default();

        let test = self.lookup_removed(&host, Role::Test);
        let prod = match self.lookup_removed(&host, Role::Prod) {
            Lookup::Answer(answer) => answer,
            Lookup::Status(status) => {
                return report.fail(format!(
                    "{host} got status {status} from PROD - cannot remove a name that doesn't exist (PROD)"
                ))
            }
        };
        match test {
            Lookup::Status(status) if status.is_nxdomain() => {
                report.secondary(format!("PROD value was {} (PROD)", prod.data));
                if host.ip().is_none() && prod.is_address() {
                    self.leftover_reverse_check(&host, &prod.data, &mut report);
                }
                report.pass(format!("{host} removed, got status NXDOMAIN (TEST)"))
            }
            Lookup::Status(status) => report.fail(format!("{host} returned status {status} (TEST)")),
            Lookup::Answer(answer) => report.fail(format!(
                "{host} returned valid answer of '{}', not removed (TEST)",
                answer.data
            )),
        }
    }

    /// Prod must answer NXDOMAIN. Test still answering is only noted.
    pub(super) fn verify_remove(&self, hostname: &str) -> TestResult {
        let host = self.name(hostname);
        let mut report = Report::default();
        match self.lookup_removed(&host, Role::Prod) {
            Lookup::Status(status) if status.is_nxdomain() => {
                if let Lookup::Answer(answer) = self.lookup_removed(&host, Role::Test) {
                    report.secondary(format!("{host} returned answer {} (TEST)", answer.data));
                }
                report.pass(format!("{host} removed, got status NXDOMAIN (PROD)"))
            }
            Lookup::Status(status) => report.fail(format!("{host} returned status {status} (PROD)")),
            Lookup::Answer(answer) => report.fail(format!(
                "{host} returned valid answer of '{}', not removed (PROD)",
                answer.data
            )),
        }
    }

    /// Removing an IP means removing its PTR record.
    fn lookup_removed(&self, host: &Name, role: Role) -> Lookup {
        match host.ip() {
            Some(ip) => self.reverse(ip, role),
            None => self.resolve(host, role),
        }
    }

    /// Warns if the old address still has a PTR record on test.
    fn leftover_reverse_check(&self, host: &Name, old_ip: &str, report: &mut Report) {
        if !self.config.check_reverse_dns {
            return;
        }
        let Ok(addr) = old_ip.parse::<Ipv4Addr>() else {
            return;
        };
        if let Lookup::Answer(ptr) = self.reverse(addr, Role::Test) {
            if host.matches(&ptr.data) {
                report.warning(format!(
                    "REVERSE NG: {old_ip} still has reverse DNS set to {} (TEST)",
                    ptr.data
                ));
            } else {
                report.warning(format!(
                    "REVERSE UNKNOWN: {old_ip} still has reverse DNS set, but to {} (TEST)",
                    ptr.data
                ));
            }
        }
    }
}
