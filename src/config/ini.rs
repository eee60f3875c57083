//! A small INI reader: `[section]` headers, `key: value` or `key = value`
//! entries, and full-line `#` or `;` comments. Section and key names are
//! case-insensitive.
use super::ConfigError;
use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{char, one_of},
    combinator::{all_consuming, eof, map, rest, value, verify},
    sequence::{delimited, pair, separated_pair},
    IResult,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Section(&'a str),
    Entry(&'a str, &'a str),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Ini {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Ini {
    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut ini = Self::default();
        let mut current: Option<String> = None;
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let (_, parsed) = all_consuming(line)(raw.trim()).map_err(|_| ConfigError::Syntax {
                line_no,
                line: raw.to_owned(),
            })?;
            match parsed {
                Line::Blank => {}
                Line::Section(name) => {
                    let name = name.trim().to_lowercase();
                    ini.sections.entry(name.clone()).or_default();
                    current = Some(name);
                }
                Line::Entry(key, val) => {
                    let section = current
                        .as_ref()
                        .ok_or(ConfigError::EntryOutsideSection { line_no })?;
                    ini.sections
                        .entry(section.clone())
                        .or_default()
                        .insert(key.trim().to_lowercase(), val.trim().to_owned());
                }
            }
        }
        Ok(ini)
    }

    pub(crate) fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }
}

fn line(i: &str) -> IResult<&str, Line> {
    alt((blank, section, entry))(i)
}

fn blank(i: &str) -> IResult<&str, Line> {
    alt((
        value(Line::Blank, eof),
        value(Line::Blank, pair(one_of("#;"), rest)),
    ))(i)
}

fn section(i: &str) -> IResult<&str, Line> {
    map(
        delimited(
            char('['),
            verify(take_till1(|c: char| c == ']'), |s: &str| !s.trim().is_empty()),
            char(']'),
        ),
        Line::Section,
    )(i)
}

fn entry(i: &str) -> IResult<&str, Line> {
    map(
        separated_pair(
            verify(take_till1(|c: char| c == ':' || c == '='), |k: &str| {
                !k.trim().is_empty()
            }),
            one_of(":="),
            rest,
        ),
        |(key, val)| Line::Entry(key, val),
    )(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_and_entries() {
        let text = "\
# leading comment
[Servers]
prod: 10.0.0.1
Test = 10.0.0.2

; another comment
[defaults]
domain: .example.com
sleep:
";
        let ini = Ini::parse(text).unwrap();
        assert_eq!(ini.get("servers", "prod"), Some("10.0.0.1"));
        assert_eq!(ini.get("servers", "test"), Some("10.0.0.2"));
        assert_eq!(ini.get("defaults", "domain"), Some(".example.com"));
        assert_eq!(ini.get("defaults", "sleep"), Some(""));
        assert_eq!(ini.get("defaults", "ignore_ttl"), None);
        assert_eq!(ini.get("missing", "prod"), None);
    }

    #[test]
    fn test_only_first_separator_splits() {
        let ini = Ini::parse("[servers]\nprod: [::1]:5353\n").unwrap();
        assert_eq!(ini.get("servers", "prod"), Some("[::1]:5353"));
    }

    #[test]
    fn test_entry_outside_section() {
        let err = Ini::parse("\nprod: 1.2.3.4\n").unwrap_err();
        assert!(matches!(err, ConfigError::EntryOutsideSection { line_no: 2 }));
    }

    #[test]
    fn test_syntax_errors() {
        for text in ["[servers\n", "[]\n", "[servers]\njust some words\n", "[servers]\n: 1.2.3.4\n"] {
            let err = Ini::parse(text).unwrap_err();
            assert!(matches!(err, ConfigError::Syntax { .. }), "{text:?}: {err}");
        }
    }
}
