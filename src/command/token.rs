//! Classifying a single whitespace-free token.
//!
//! Classes are tried in a fixed order (IPv4, then FQDN, then bare hostname),
//! so a dotted quad is never taken for a name.
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, recognize, verify},
    multi::many1_count,
    sequence::{pair, preceded, tuple},
    IResult,
};
use std::net::Ipv4Addr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ipv4,
    Fqdn,
    Hostname,
}

impl TokenKind {
    pub fn is_name(self) -> bool {
        matches!(self, Self::Fqdn | Self::Hostname)
    }
}

/// Returns the first class the whole token belongs to, if any.
pub fn classify(token: &str) -> Option<TokenKind> {
    if all_consuming(ipv4)(token).is_ok() {
        Some(TokenKind::Ipv4)
    } else if all_consuming(fqdn)(token).is_ok() {
        Some(TokenKind::Fqdn)
    } else if all_consuming(label)(token).is_ok() {
        Some(TokenKind::Hostname)
    } else {
        None
    }
}

/// Decimal 0-255 without leading zeroes.
fn octet(i: &str) -> IResult<&str, u8> {
    map_res(
        verify(digit1, |d: &str| d.len() == 1 || (d.len() <= 3 && !d.starts_with('0'))),
        |d: &str| d.parse::<u8>(),
    )(i)
}

fn ipv4(i: &str) -> IResult<&str, Ipv4Addr> {
    let (i, (a, _, b, _, c, _, d)) = tuple((
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
        char('.'),
        octet,
    ))(i)?;
    Ok((i, Ipv4Addr::new(a, b, c, d)))
}

/// 1-63 of `[A-Za-z0-9_-]`, not starting or ending with a hyphen.
/// Underscores are allowed for SRV/TXT-style owners like `_discover`.
fn label(i: &str) -> IResult<&str, &str> {
    verify(
        take_while_m_n(1, 63, |c: char| {
            c.is_ascii_alphanumeric() || c == '_' || c == '-'
        }),
        |l: &str| !l.starts_with('-') && !l.ends_with('-'),
    )(i)
}

/// Two or more labels joined by dots. No trailing root dot.
fn fqdn(i: &str) -> IResult<&str, &str> {
    recognize(pair(label, many1_count(preceded(char('.'), label))))(i)
}
