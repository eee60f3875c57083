use crate::{command::GRAMMAR, config::parse_sleep};
use log::warn;
use std::{path::PathBuf, time::Duration};

const HELP: &str = "\
dnstest -- check DNS changes on a test server, then verify them in production
USAGE:
  dnstest [OPTIONS]
FLAGS:
  -h, --help                    Prints help information
      --version                 Prints the version
  -V, --verify                  Verify changes against prod instead of checking test
  -t, --ignore-ttl              Ignore TTL differences when confirming
      --example-config          Print an example config file and exit
      --configprint             Print the active config and exit
      --promptconfig            Build a config file interactively and exit
OPTIONS:
  -c, --config PATH             Config file (default ./dnstest.ini, then ~/.dnstest.ini)
  -f, --file PATH               Read changes from PATH instead of stdin
  -s, --sleep SECONDS           Sleep between input lines
LINES:
";

/// Values derived from the CLI arguments.
#[derive(Debug, Default, PartialEq)]
pub struct AppArgs {
    pub config_file: Option<PathBuf>,
    pub test_file: Option<PathBuf>,
    pub verify: bool,
    pub sleep: Option<Duration>,
    pub ignore_ttl: bool,
    pub example_config: bool,
    pub config_print: bool,
    pub prompt_config: bool,
}

impl AppArgs {
    pub fn parse() -> Result<Self, pico_args::Error> {
        let mut pargs = pico_args::Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            print!("{}", help());
            std::process::exit(0);
        }
        if pargs.contains("--version") {
            println!("dnstest {}", env!("CARGO_PKG_VERSION"));
            std::process::exit(0);
        }
        Self::from_arguments(pargs)
    }

    pub fn from_arguments(mut pargs: pico_args::Arguments) -> Result<Self, pico_args::Error> {
        let args = AppArgs {
            verify: pargs.contains(["-V", "--verify"]),
            ignore_ttl: pargs.contains(["-t", "--ignore-ttl"]),
            example_config: pargs.contains("--example-config"),
            config_print: pargs.contains("--configprint"),
            prompt_config: pargs.contains("--promptconfig"),
            config_file: pargs.opt_value_from_str(["-c", "--config"])?,
            test_file: pargs.opt_value_from_str(["-f", "--file"])?,
            sleep: pargs.opt_value_from_fn(["-s", "--sleep"], parse_sleep)?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!("unused arguments left: {remaining:?}");
        }

        Ok(args)
    }
}

/// Usage text followed by the accepted line formats.
pub fn help() -> String {
    let mut help = HELP.to_owned();
    for line in GRAMMAR {
        help.push_str("  ");
        help.push_str(line);
        help.push('\n');
    }
    help
}
