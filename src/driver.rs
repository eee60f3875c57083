//! Runs every line of an input through the parser and the checks, and
//! prints the report.
use crate::{
    command::parse_line,
    engine::{Checker, Mode, TestResult},
    resolver::Resolve,
};
use anyhow::{Context, Result as AResult};
use log::{debug, info};
use std::{
    io::{BufRead, Write},
    thread,
    time::Duration,
};

/// Pass/fail counts for a run. Unparseable lines count as neither.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
}

impl Tally {
    pub fn summary(&self) -> String {
        let version = concat!("(dnstest ", env!("CARGO_PKG_VERSION"), ")");
        if self.failed == 0 {
            format!("++++ All {} tests passed. {version}", self.passed)
        } else {
            format!(
                "++++ {} passed / {} FAILED. {version}",
                self.passed, self.failed
            )
        }
    }
}

pub struct Driver<'c, R> {
    checker: Checker<'c, R>,
    mode: Mode,
    sleep: Duration,
}

impl<'c, R: Resolve> Driver<'c, R> {
    pub fn new(checker: Checker<'c, R>, mode: Mode) -> Self {
        let sleep = checker.config().sleep;
        Self {
            checker,
            mode,
            sleep,
        }
    }

    /// Checks each line of `input`, writing results and a final summary to `out`.
    pub fn run<I: BufRead, W: Write>(&self, input: I, out: &mut W) -> AResult<Tally> {
        let mut tally = Tally::default();
        for (idx, line) in input.split(b'\n').enumerate() {
            let line = line.with_context(|| format!("couldn't read input line {}", idx + 1))?;
            // Bad bytes only spoil their own line.
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let intent = match parse_line(line) {
                Ok(intent) => intent,
                Err(e) => {
                    debug!("{e}");
                    writeln!(out, "ERROR: could not parse input line, SKIPPING: {line}")?;
                    continue;
                }
            };
            let result = self.checker.run(&intent, self.mode);
            if result.result {
                tally.passed += 1;
            } else {
                tally.failed += 1;
            }
            write_result(out, &result)?;
            if !self.sleep.is_zero() {
                info!("Sleeping {:?}", self.sleep);
                thread::sleep(self.sleep);
            }
        }
        writeln!(out, "{}", tally.summary())?;
        Ok(tally)
    }
}

pub fn write_result<W: Write>(out: &mut W, result: &TestResult) -> std::io::Result<()> {
    let prefix = if result.result { "OK" } else { "**NG" };
    writeln!(out, "{prefix}: {}", result.message)?;
    for line in result.secondary.iter().chain(&result.warnings) {
        writeln!(out, "\t{line}")?;
    }
    Ok(())
}
