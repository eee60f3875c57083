//! Checks that planned DNS changes look right on a test nameserver, and
//! verifies them on the production nameserver once they are live.
//!
//! Input is one change per line, e.g. `add foo with address 10.0.0.1` or
//! `rename foo with value 10.0.0.1 to bar`. See [`command::GRAMMAR`].
pub mod cli;
pub mod command;
pub mod config;
pub mod dns_types;
pub mod driver;
pub mod engine;
mod io;
pub mod message;
mod parse;
pub mod resolver;
pub mod util;
