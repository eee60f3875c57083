//! Which nameservers to compare, and how strictly.
mod ini;

use crate::{engine::Role, resolver::server_addr};
use ini::Ini;
use std::{
    env,
    fmt::Write as _,
    io::{self, BufRead, Write},
    net::AddrParseError,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "dnstest.ini";
pub const HOME_CONFIG_FILE_NAME: &str = ".dnstest.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("syntax error on line {line_no} of config file: {line:?}")]
    Syntax { line_no: usize, line: String },
    #[error("line {line_no} of config file is not inside a [section]")]
    EntryOutsideSection { line_no: usize },
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("invalid {role} server {server:?}: {source}")]
    InvalidServer {
        role: Role,
        server: String,
        #[source]
        source: AddrParseError,
    },
}

/// Everything the checks need to know. Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Where this config was read from, if anywhere.
    pub conf_file: Option<PathBuf>,
    pub prod_server: String,
    pub test_server: String,
    /// Appended to names without a dot, e.g. `.example.com`.
    pub default_domain: String,
    pub check_reverse_dns: bool,
    pub ignore_ttl: bool,
    /// Pause between input lines.
    pub sleep: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conf_file: None,
            prod_server: String::new(),
            test_server: String::new(),
            default_domain: String::new(),
            check_reverse_dns: true,
            ignore_ttl: false,
            sleep: Duration::ZERO,
        }
    }
}

impl Config {
    /// A config suitable for `--example-config`.
    pub fn example() -> Self {
        Self {
            prod_server: "1.2.3.4".to_owned(),
            test_server: "1.2.3.5".to_owned(),
            default_domain: ".example.com".to_owned(),
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let mut config = Self::from_ini_str(&text)?;
        config.conf_file = Some(path.to_owned());
        Ok(config)
    }

    /// Missing sections and keys keep their defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::parse(text)?;
        let mut config = Self::default();
        if let Some(prod) = ini.get("servers", "prod") {
            config.prod_server = prod.to_owned();
        }
        if let Some(test) = ini.get("servers", "test") {
            config.test_server = test.to_owned();
        }
        if let Some(domain) = ini.get("defaults", "domain") {
            config.default_domain = domain.to_owned();
        }
        if let Some(raw) = ini.get("defaults", "have_reverse_dns") {
            config.check_reverse_dns = parse_bool(raw).map_err(|e| invalid("have_reverse_dns", raw, e))?;
        }
        if let Some(raw) = ini.get("defaults", "ignore_ttl") {
            config.ignore_ttl = parse_bool(raw).map_err(|e| invalid("ignore_ttl", raw, e))?;
        }
        if let Some(raw) = ini.get("defaults", "sleep") {
            config.sleep = parse_sleep(raw).map_err(|e| invalid("sleep", raw, e))?;
        }
        Ok(config)
    }

    /// Renders the config as a commented INI file that `load` reads back.
    pub fn to_ini_string(&self) -> String {
        let mut out = String::new();
        // Writing to a String can't fail.
        let _ = write!(
            out,
            "\
[servers]
# nameserver with the current, live records
prod: {prod}
# staging nameserver with the pending changes
test: {test}

[defaults]
# appended to any name without a dot in it
domain: {domain}
# whether to check PTR records for A records
have_reverse_dns: {reverse}
# whether to ignore TTL differences when confirming
ignore_ttl: {ignore_ttl}
# seconds to sleep between input lines
sleep: {sleep}
",
            prod = self.prod_server,
            test = self.test_server,
            domain = self.default_domain,
            reverse = self.check_reverse_dns,
            ignore_ttl = self.ignore_ttl,
            sleep = self.sleep.as_secs_f64(),
        );
        out
    }

    pub fn server(&self, role: Role) -> &str {
        match role {
            Role::Test => &self.test_server,
            Role::Prod => &self.prod_server,
        }
    }

    /// Checks the config is complete enough to run checks with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for role in [Role::Prod, Role::Test] {
            let server = self.server(role);
            server_addr(server).map_err(|source| ConfigError::InvalidServer {
                role,
                server: server.to_owned(),
                source,
            })?;
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
        reason,
    }
}

pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "1" | "yes" | "y" | "true" | "on" => Ok(true),
        "0" | "no" | "n" | "false" | "off" => Ok(false),
        _ => Err("expected yes/no, true/false, on/off or 1/0".to_owned()),
    }
}

/// Parses a non-negative number of seconds. Fractions are allowed.
pub fn parse_sleep(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("not a number of seconds: {e}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err("must be zero or a positive number of seconds".to_owned());
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}

/// Looks for `./dnstest.ini`, then `~/.dnstest.ini`.
pub fn find_config_file() -> Option<PathBuf> {
    let home = env::var_os("HOME").map(PathBuf::from);
    find_config_file_in(Path::new("."), home.as_deref())
}

fn find_config_file_in(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let home = home?.join(HOME_CONFIG_FILE_NAME);
    home.is_file().then_some(home)
}

/// Interactively builds a config, offering the values in `current` as
/// defaults. Invalid answers are asked again.
pub fn prompt_config<R: BufRead, W: Write>(
    current: &Config,
    input: &mut R,
    output: &mut W,
) -> io::Result<Config> {
    let mut prompt = Prompt { input, output };
    let prod_server = prompt.ask("Production DNS server IP", &current.prod_server, |s| {
        server_addr(s).map(|_| s.to_owned()).map_err(|e| e.to_string())
    })?;
    let test_server = prompt.ask("Test DNS server IP", &current.test_server, |s| {
        server_addr(s).map(|_| s.to_owned()).map_err(|e| e.to_string())
    })?;
    let default_domain = prompt.ask(
        "Default domain to append to bare hostnames",
        &current.default_domain,
        |s| Ok(s.to_owned()),
    )?;
    let check_reverse_dns = prompt.ask(
        "Check reverse DNS? (y/n)",
        yes_no(current.check_reverse_dns),
        parse_bool,
    )?;
    let ignore_ttl = prompt.ask(
        "Ignore TTL differences when confirming? (y/n)",
        yes_no(current.ignore_ttl),
        parse_bool,
    )?;
    let sleep = prompt.ask(
        "Seconds to sleep between lines",
        &current.sleep.as_secs_f64().to_string(),
        parse_sleep,
    )?;
    Ok(Config {
        conf_file: current.conf_file.clone(),
        prod_server,
        test_server,
        default_domain,
        check_reverse_dns,
        ignore_ttl,
        sleep,
    })
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "y"
    } else {
        "n"
    }
}

struct Prompt<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompt<'_, R, W> {
    fn ask<T>(
        &mut self,
        question: &str,
        default: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> io::Result<T> {
        loop {
            write!(self.output, "{question} [{default}]: ")?;
            self.output.flush()?;
            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input ended before the config was complete",
                ));
            }
            let answer = match answer.trim() {
                "" => default,
                s => s,
            };
            match parse(answer) {
                Ok(v) => return Ok(v),
                Err(e) => writeln!(self.output, "Invalid answer {answer:?}: {e}")?,
            }
        }
    }
}
