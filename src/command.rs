//! Parsing change descriptions like `add record foo with address 1.2.3.4`.
pub mod token;

use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::multispace1,
    combinator::{all_consuming, opt, verify},
    sequence::{preceded, tuple},
    IResult,
};
use std::fmt;
use thiserror::Error;
use token::{classify, TokenKind};

/// Every accepted line shape, for help text.
pub const GRAMMAR: [&str; 5] = [
    "add (record|name|entry)? <hostname_or_fqdn> (with ?)(value|address|target)? <hostname_fqdn_or_ip>",
    "remove (record|name|entry)? <hostname_fqdn_or_ip>",
    "rename (record|name|entry)? <hostname_or_fqdn> (with ?)(value|address|target)? <value> to <hostname_or_fqdn>",
    "change (record|name|entry)? <hostname_or_fqdn> to <hostname_fqdn_or_ip>",
    "confirm (record|name|entry)? <hostname_or_fqdn>",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
    Change,
    Rename,
    Confirm,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Change => "change",
            Self::Rename => "rename",
            Self::Confirm => "confirm",
        };
        s.fmt(f)
    }
}

/// One parsed line. Names and values are kept exactly as written; the engine
/// qualifies them with the default domain when it needs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeIntent {
    Add { hostname: String, value: String },
    Remove { hostname: String },
    Change { hostname: String, value: String },
    Rename {
        hostname: String,
        value: String,
        newname: String,
    },
    Confirm { hostname: String },
}

impl ChangeIntent {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Add { .. } => Operation::Add,
            Self::Remove { .. } => Operation::Remove,
            Self::Change { .. } => Operation::Change,
            Self::Rename { .. } => Operation::Rename,
            Self::Confirm { .. } => Operation::Confirm,
        }
    }

    pub fn hostname(&self) -> &str {
        match self {
            Self::Add { hostname, .. }
            | Self::Remove { hostname }
            | Self::Change { hostname, .. }
            | Self::Rename { hostname, .. }
            | Self::Confirm { hostname } => hostname,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Add { value, .. } | Self::Change { value, .. } | Self::Rename { value, .. } => {
                Some(value)
            }
            Self::Remove { .. } | Self::Confirm { .. } => None,
        }
    }

    pub fn newname(&self) -> Option<&str> {
        match self {
            Self::Rename { newname, .. } => Some(newname),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not parse input line: {line}")]
pub struct ParseError {
    pub line: String,
}

/// Parses one whole line. Leading and trailing whitespace is ignored, but
/// every other token must be consumed by the grammar.
pub fn parse_line(line: &str) -> Result<ChangeIntent, ParseError> {
    match all_consuming(alt((add, remove, rename, change, confirm)))(line.trim()) {
        Ok((_, intent)) => Ok(intent),
        Err(_) => Err(ParseError {
            line: line.to_owned(),
        }),
    }
}

fn add(i: &str) -> IResult<&str, ChangeIntent> {
    let (i, _) = keyword("add")(i)?;
    let (i, _) = opt(spaced(record_word))(i)?;
    let (i, hostname) = spaced(host_or_fqdn)(i)?;
    let (i, _) = opt(spaced(value_word))(i)?;
    let (i, value) = spaced(host_fqdn_or_ip)(i)?;
    let intent = ChangeIntent::Add {
        hostname: hostname.to_owned(),
        value: value.to_owned(),
    };
    Ok((i, intent))
}

fn remove(i: &str) -> IResult<&str, ChangeIntent> {
    let (i, _) = keyword("remove")(i)?;
    let (i, _) = opt(spaced(record_word))(i)?;
    let (i, hostname) = spaced(host_fqdn_or_ip)(i)?;
    let intent = ChangeIntent::Remove {
        hostname: hostname.to_owned(),
    };
    Ok((i, intent))
}

fn rename(i: &str) -> IResult<&str, ChangeIntent> {
    let (i, _) = keyword("rename")(i)?;
    let (i, _) = opt(spaced(record_word))(i)?;
    let (i, hostname) = spaced(host_or_fqdn)(i)?;
    let (i, _) = opt(spaced(value_word))(i)?;
    let (i, value) = spaced(host_fqdn_or_ip)(i)?;
    let (i, _) = spaced(keyword("to"))(i)?;
    let (i, newname) = spaced(host_or_fqdn)(i)?;
    let intent = ChangeIntent::Rename {
        hostname: hostname.to_owned(),
        value: value.to_owned(),
        newname: newname.to_owned(),
    };
    Ok((i, intent))
}

fn change(i: &str) -> IResult<&str, ChangeIntent> {
    let (i, _) = keyword("change")(i)?;
    let (i, _) = opt(spaced(record_word))(i)?;
    let (i, hostname) = spaced(host_or_fqdn)(i)?;
    let (i, _) = spaced(keyword("to"))(i)?;
    let (i, value) = spaced(host_fqdn_or_ip)(i)?;
    let intent = ChangeIntent::Change {
        hostname: hostname.to_owned(),
        value: value.to_owned(),
    };
    Ok((i, intent))
}

fn confirm(i: &str) -> IResult<&str, ChangeIntent> {
    let (i, _) = keyword("confirm")(i)?;
    let (i, _) = opt(spaced(record_word))(i)?;
    let (i, hostname) = spaced(host_or_fqdn)(i)?;
    let intent = ChangeIntent::Confirm {
        hostname: hostname.to_owned(),
    };
    Ok((i, intent))
}

/// Runs `inner` after at least one whitespace character.
fn spaced<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    preceded(multispace1, inner)
}

fn word(i: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(i)
}

/// A whole word equal to `kw`, so `added` never matches `add`.
fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    verify(word, move |w: &str| w == kw)
}

fn record_word(i: &str) -> IResult<&str, &str> {
    alt((keyword("record"), keyword("entry"), keyword("name")))(i)
}

/// `value`, `address` or `target`, optionally preceded by `with`.
fn value_word(i: &str) -> IResult<&str, &str> {
    let (i, _) = opt(tuple((keyword("with"), multispace1)))(i)?;
    alt((keyword("value"), keyword("address"), keyword("target")))(i)
}

/// A hostname or FQDN, never an IP literal.
fn host_or_fqdn(i: &str) -> IResult<&str, &str> {
    verify(word, |w: &str| classify(w).is_some_and(TokenKind::is_name))(i)
}

fn host_fqdn_or_ip(i: &str) -> IResult<&str, &str> {
    verify(word, |w: &str| classify(w).is_some())(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(hostname: &str, value: &str) -> ChangeIntent {
        ChangeIntent::Add {
            hostname: hostname.to_owned(),
            value: value.to_owned(),
        }
    }

    fn remove(hostname: &str) -> ChangeIntent {
        ChangeIntent::Remove {
            hostname: hostname.to_owned(),
        }
    }

    fn rename(hostname: &str, value: &str, newname: &str) -> ChangeIntent {
        ChangeIntent::Rename {
            hostname: hostname.to_owned(),
            value: value.to_owned(),
            newname: newname.to_owned(),
        }
    }

    fn change(hostname: &str, value: &str) -> ChangeIntent {
        ChangeIntent::Change {
            hostname: hostname.to_owned(),
            value: value.to_owned(),
        }
    }

    fn confirm(hostname: &str) -> ChangeIntent {
        ChangeIntent::Confirm {
            hostname: hostname.to_owned(),
        }
    }

    fn assert_parses(line: &str, expected: ChangeIntent) {
        assert_eq!(parse_line(line), Ok(expected), "{line:?}");
    }

    fn assert_rejected(line: &str) {
        assert_eq!(
            parse_line(line),
            Err(ParseError {
                line: line.to_owned()
            }),
            "{line:?}"
        );
    }

    #[test]
    fn test_add() {
        assert_parses("add fooHostOne value fooHostTwo", add("fooHostOne", "fooHostTwo"));
        assert_parses("add foobar value 10.104.92.243", add("foobar", "10.104.92.243"));
        assert_parses("add entry foobar with value baz", add("foobar", "baz"));
        assert_parses(
            "add record foobar.example.com target blam",
            add("foobar.example.com", "blam"),
        );
        assert_parses(
            "add name foobar address 192.168.0.139",
            add("foobar", "192.168.0.139"),
        );
        assert_parses(
            "add foobar.example.com with target 172.16.132.10",
            add("foobar.example.com", "172.16.132.10"),
        );
        assert_parses("add newhost 1.2.3.1", add("newhost", "1.2.3.1"));
        assert_parses(
            "add record _foobar.example.com address 1.2.3.4",
            add("_foobar.example.com", "1.2.3.4"),
        );
        assert_parses(
            "add record foobar._discover.example.com target blam",
            add("foobar._discover.example.com", "blam"),
        );
    }

    #[test]
    fn test_remove() {
        assert_parses("remove fooHostOne", remove("fooHostOne"));
        assert_parses("remove record fooHostOne", remove("fooHostOne"));
        assert_parses("remove name fooHostOne", remove("fooHostOne"));
        assert_parses("remove entry foo.example.com", remove("foo.example.com"));
        assert_parses(
            "remove entry foo.bar.baz.example.com",
            remove("foo.bar.baz.example.com"),
        );
        assert_parses("remove 10.1.2.3", remove("10.1.2.3"));
    }

    #[test]
    fn test_rename() {
        assert_parses(
            "rename fooHostOne with target targ to fooHostTwo",
            rename("fooHostOne", "targ", "fooHostTwo"),
        );
        assert_parses(
            "rename entry foobar foo.bar.net to baz",
            rename("foobar", "foo.bar.net", "baz"),
        );
        assert_parses(
            "rename record foobar.example.com with address 1.2.3.4 to blam",
            rename("foobar.example.com", "1.2.3.4", "blam"),
        );
        assert_parses(
            "rename name foobar 1.2.3.5 to baz.example.com",
            rename("foobar", "1.2.3.5", "baz.example.com"),
        );
        assert_parses(
            "rename foo.subdomain.example.com with value 10.188.8.76 to bar.subdomain.example.com",
            rename(
                "foo.subdomain.example.com",
                "10.188.8.76",
                "bar.subdomain.example.com",
            ),
        );
    }

    #[test]
    fn test_change() {
        assert_parses("change fooHostOne to fooHostTwo", change("fooHostOne", "fooHostTwo"));
        assert_parses("change foobar to 10.104.92.243", change("foobar", "10.104.92.243"));
        assert_parses("change entry foobar to baz", change("foobar", "baz"));
        assert_parses(
            "change record foobar.example.com to blam",
            change("foobar.example.com", "blam"),
        );
        assert_parses(
            "change name foobar to foobar.hosts.example.com",
            change("foobar", "foobar.hosts.example.com"),
        );
    }

    #[test]
    fn test_confirm() {
        for line in [
            "confirm foo.example.com",
            "confirm record foo.example.com",
            "confirm entry foo.example.com",
            "confirm name foo.example.com",
        ] {
            assert_parses(line, confirm("foo.example.com"));
        }
        assert_parses("confirm foo", confirm("foo"));
        assert_parses("confirm m", confirm("m"));
        assert_parses("confirm foo.m.example.com", confirm("foo.m.example.com"));
        assert_parses("confirm m._foo.example.com", confirm("m._foo.example.com"));
        assert_parses("confirm _bar.example.com", confirm("_bar.example.com"));
    }

    #[test]
    fn test_ip_is_never_a_hostname() {
        assert_rejected("confirm 1.2.3.4");
        assert_rejected("confirm record 1.2.3.4");
        assert_rejected("confirm entry 1.2.3.4");
        assert_rejected("confirm name 1.2.3.4");
        assert_rejected("add 1.2.3.4 value foo");
        assert_rejected("change 1.2.3.4 to foo");
        assert_rejected("rename foo value 1.2.3.4 to 1.2.3.5");
    }

    #[test]
    fn test_whole_line_must_match() {
        assert_rejected("add extraword record foobar.example.com target blam");
        assert_rejected("confirm foo bar");
        assert_rejected("change foobar to");
        assert_rejected("change foobar baz");
        assert_rejected("remove");
        assert_rejected("delete foo");
        assert_rejected("added foo value bar");
        assert_rejected("add foo.example.com. value 1.2.3.4");
        assert_rejected("change foo to bar.example.com.");
        assert_rejected("");
    }

    #[test]
    fn test_surrounding_whitespace() {
        assert_parses("  confirm   foo\t", confirm("foo"));
        assert_parses("remove foo\r\n", remove("foo"));
    }

    #[test]
    fn test_accessors() {
        let intent = rename("foo", "1.2.3.4", "bar");
        assert_eq!(intent.operation(), Operation::Rename);
        assert_eq!(intent.operation().to_string(), "rename");
        assert_eq!(intent.hostname(), "foo");
        assert_eq!(intent.value(), Some("1.2.3.4"));
        assert_eq!(intent.newname(), Some("bar"));
        assert_eq!(confirm("foo").value(), None);
    }
}
