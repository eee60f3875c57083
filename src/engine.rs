//! Decides whether a change looks right on the nameservers.
//!
//! Each change type has two procedures. [`Mode::Check`] runs before a change
//! is promoted and compares the test server's new state with prod's current
//! state. [`Mode::Verify`] runs afterwards and looks mostly at prod.
mod add;
mod change;
mod confirm;
mod remove;
mod rename;
mod report;
#[cfg(test)]
pub(crate) mod stub;

pub use confirm::diff_fields;
pub use report::TestResult;

use crate::{
    command::ChangeIntent,
    config::Config,
    resolver::{Lookup, Resolve},
    util::normalize,
};
use log::debug;
use report::Report;
use std::{fmt, net::Ipv4Addr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Before the change reaches prod.
    Check,
    /// After the change reached prod.
    Verify,
}

/// Which of the two configured nameservers a query goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Test,
    Prod,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => "TEST".fmt(f),
            Self::Prod => "PROD".fmt(f),
        }
    }
}

/// A name as the user wrote it, plus its qualified form.
///
/// Answers are matched against both, since servers differ in which one they
/// hand back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Name {
    raw: String,
    fqdn: String,
}

impl Name {
    pub(crate) fn new(raw: &str, default_domain: &str) -> Self {
        Self {
            raw: raw.to_owned(),
            fqdn: normalize(raw, default_domain),
        }
    }

    /// Whether `data` is either spelling of this name (ASCII case-insensitive).
    pub(crate) fn matches(&self, data: &str) -> bool {
        data.eq_ignore_ascii_case(&self.raw) || data.eq_ignore_ascii_case(&self.fqdn)
    }

    /// The name as an IPv4 literal, if it is one.
    pub(crate) fn ip(&self) -> Option<Ipv4Addr> {
        self.raw.parse().ok()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.raw.fmt(f)
    }
}

/// Runs the checks for parsed change lines.
pub struct Checker<'c, R> {
    config: &'c Config,
    resolver: R,
}

impl<'c, R: Resolve> Checker<'c, R> {
    pub fn new(config: &'c Config, resolver: R) -> Self {
        Self { config, resolver }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    pub fn run(&self, intent: &ChangeIntent, mode: Mode) -> TestResult {
        debug!(
            "Running {} ({mode:?}) for {}",
            intent.operation(),
            intent.hostname()
        );
        match (intent, mode) {
            (ChangeIntent::Add { hostname, value }, Mode::Check) => self.check_add(hostname, value),
            (ChangeIntent::Add { hostname, value }, Mode::Verify) => {
                self.verify_add(hostname, value)
            }
            (ChangeIntent::Remove { hostname }, Mode::Check) => self.check_remove(hostname),
            (ChangeIntent::Remove { hostname }, Mode::Verify) => self.verify_remove(hostname),
            (ChangeIntent::Change { hostname, value }, Mode::Check) => {
                self.check_change(hostname, value)
            }
            (ChangeIntent::Change { hostname, value }, Mode::Verify) => {
                self.verify_change(hostname, value)
            }
            (
                ChangeIntent::Rename {
                    hostname,
                    value,
                    newname,
                },
                Mode::Check,
            ) => self.check_rename(hostname, newname, value),
            (
                ChangeIntent::Rename {
                    hostname,
                    value,
                    newname,
                },
                Mode::Verify,
            ) => self.verify_rename(hostname, newname, value),
            // Confirm only compares what the two servers say right now.
            (ChangeIntent::Confirm { hostname }, _) => self.confirm(hostname),
        }
    }

    fn name(&self, raw: &str) -> Name {
        Name::new(raw, &self.config.default_domain)
    }

    fn resolve(&self, name: &Name, role: Role) -> Lookup {
        self.resolver.resolve(&name.fqdn, self.config.server(role))
    }

    fn reverse(&self, ip: Ipv4Addr, role: Role) -> Lookup {
        self.resolver.reverse_lookup(ip, self.config.server(role))
    }

    /// Checks that `ip` points back at one of `names`. Never fails a test,
    /// only adds warnings or secondary lines.
    fn reverse_check(&self, ip: &str, names: &[&Name], role: Role, report: &mut Report) {
        if !self.config.check_reverse_dns {
            return;
        }
        let Ok(addr) = ip.parse::<Ipv4Addr>() else {
            report.warning(format!(
                "REVERSE UNKNOWN: {ip} is not an IPv4 address, cannot check reverse DNS ({role})"
            ));
            return;
        };
        match self.reverse(addr, role) {
            Lookup::Status(status) => report.warning(format!(
                "REVERSE NG: no reverse DNS for {ip}, got status {status} ({role})"
            )),
            Lookup::Answer(ptr) if names.iter().any(|name| name.matches(&ptr.data)) => {
                report.secondary(format!("REVERSE OK: {ip} => {} ({role})", ptr.data))
            }
            Lookup::Answer(ptr) => report.warning(format!(
                "REVERSE NG: {ip} has reverse DNS set to {} ({role})",
                ptr.data
            )),
        }
    }
}
