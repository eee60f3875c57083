//! Forward and reverse lookups against one specific nameserver.
//!
//! The verification engine only ever talks to [`Resolve`]; [`UdpResolver`]
//! is the real implementation, sending single UDP queries with the codec in
//! [`crate::message`].

use crate::{
    dns_types::RecordType,
    io,
    message::{header::ResponseCode, record::Record, Message},
};
use anyhow::{anyhow, Result as AResult};
use log::{debug, warn};
use std::{
    collections::BTreeMap,
    fmt,
    net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

pub const DNS_PORT: u16 = 53;

/// Matches the per-query read timeout dingo-style tools have always used.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves names against an explicitly chosen nameserver.
pub trait Resolve {
    /// Looks up an A record, falling back to CNAME. Returns the first answer,
    /// or the response status when there is none.
    fn resolve(&self, name: &str, server: &str) -> Lookup;

    /// Looks up the PTR record for `ip`.
    fn reverse_lookup(&self, ip: Ipv4Addr, server: &str) -> Lookup;
}

/// What a single lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Answer(Answer),
    Status(Status),
}

impl Lookup {
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer(_))
    }
}

impl From<Message> for Lookup {
    fn from(msg: Message) -> Self {
        match msg.answer.first() {
            Some(record) => Self::Answer(Answer::from(record)),
            None => Self::Status(Status::from(msg.header.resp_code)),
        }
    }
}

/// The first record of an answer section, flattened the way it gets compared
/// and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub name: String,
    pub data: String,
    pub typename: String,
    pub classstr: String,
    pub ttl: u32,
    pub rtype: u16,
    pub class: u16,
    pub rdlength: u16,
}

impl Answer {
    /// Whether this is an address record, i.e. one that should have reverse DNS.
    pub fn is_address(&self) -> bool {
        self.typename == "A"
    }

    /// Every attribute keyed by name, in sorted key order.
    pub fn fields(&self) -> Fields {
        BTreeMap::from([
            ("class", FieldValue::Number(self.class.into())),
            ("classstr", FieldValue::Text(self.classstr.clone())),
            ("data", FieldValue::Text(self.data.clone())),
            ("name", FieldValue::Text(self.name.clone())),
            ("rdlength", FieldValue::Number(self.rdlength.into())),
            ("ttl", FieldValue::Number(self.ttl.into())),
            ("type", FieldValue::Number(self.rtype.into())),
            ("typename", FieldValue::Text(self.typename.clone())),
        ])
    }
}

impl From<&Record> for Answer {
    fn from(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            data: record.data.to_string(),
            typename: record.record_type.to_string(),
            classstr: record.class.to_string(),
            ttl: record.ttl,
            rtype: record.record_type.into(),
            class: record.class.into(),
            rdlength: record.rdlength,
        }
    }
}

pub type Fields = BTreeMap<&'static str, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Number(u64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => s.fmt(f),
        }
    }
}

/// Renders fields as `{key: value, ...}` in key order, so output is stable.
pub fn render_fields(fields: &Fields) -> String {
    let pairs: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
    format!("{{{}}}", pairs.join(", "))
}

/// A response status, spelled the way dig prints it.
///
/// This is deliberately open: servers and transports can surface codes we
/// don't name, and those are carried in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    Other(String),
}

impl Status {
    pub fn is_nxdomain(&self) -> bool {
        matches!(self, Self::NxDomain)
    }

    /// The status reported when no usable response came back at all.
    fn from_error(err: &anyhow::Error) -> Self {
        let timed_out = err.chain().any(|cause| {
            cause.downcast_ref::<std::io::Error>().is_some_and(|e| {
                matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                )
            })
        });
        if timed_out {
            Self::Other("TIMEOUT".to_owned())
        } else {
            Self::Other("ERROR".to_owned())
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => "NOERROR".fmt(f),
            Self::FormErr => "FORMERR".fmt(f),
            Self::ServFail => "SERVFAIL".fmt(f),
            Self::NxDomain => "NXDOMAIN".fmt(f),
            Self::NotImp => "NOTIMP".fmt(f),
            Self::Refused => "REFUSED".fmt(f),
            Self::Other(s) => s.fmt(f),
        }
    }
}

impl FromStr for Status {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.to_uppercase().as_str() {
            "NOERROR" => Self::NoError,
            "FORMERR" => Self::FormErr,
            "SERVFAIL" => Self::ServFail,
            "NXDOMAIN" => Self::NxDomain,
            "NOTIMP" => Self::NotImp,
            "REFUSED" => Self::Refused,
            other => Self::Other(other.to_owned()),
        };
        Ok(status)
    }
}

impl From<ResponseCode> for Status {
    fn from(code: ResponseCode) -> Self {
        match code {
            ResponseCode::NoError => Self::NoError,
            ResponseCode::FormatError => Self::FormErr,
            ResponseCode::ServerFailure => Self::ServFail,
            ResponseCode::NameError => Self::NxDomain,
            ResponseCode::NotImplemented => Self::NotImp,
            ResponseCode::Refused => Self::Refused,
            other @ ResponseCode::Other(_) => Self::Other(other.mnemonic()),
        }
    }
}

/// Parses a nameserver given as `ip`, `ip:port` or `[v6]:port`.
pub fn server_addr(server: &str) -> Result<SocketAddr, AddrParseError> {
    let server = server.trim();
    match server.parse::<SocketAddr>() {
        Ok(addr) => Ok(addr),
        Err(_) => server
            .parse::<IpAddr>()
            .map(|ip| SocketAddr::new(ip, DNS_PORT)),
    }
}

/// The name a PTR query for `ip` asks about, e.g. `4.3.2.1.in-addr.arpa`.
pub fn ptr_name(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{d}.{c}.{b}.{a}.in-addr.arpa")
}

/// Sends real UDP queries. Holds no state between lookups.
#[derive(Debug, Clone)]
pub struct UdpResolver {
    timeout: Duration,
}

impl Default for UdpResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl UdpResolver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn query(&self, name: &str, record_type: RecordType, server: &str) -> AResult<Lookup> {
        let addr = server_addr(server).map_err(|e| anyhow!("bad nameserver {server:?}: {e}"))?;
        let id: u16 = rand::random();
        let msg = Message::new_query(id, name, record_type)?;
        debug!("Resolving {record_type} records for {name} against {addr} (id {id})");
        let response = io::send_req(&msg, addr, self.timeout)?;
        let (_, response_msg) = Message::deserialize(&response)
            .map_err(|e| anyhow!("Error parsing response from {addr}: {e}"))?;

        let header = &response_msg.header;
        if !header.is_response {
            anyhow::bail!("{addr} sent a query instead of a response");
        }
        if header.id != id {
            anyhow::bail!(
                "Mismatch between query IDs. Client sent {id} and received {}",
                header.id
            );
        }
        if header.truncation {
            warn!("Response from {addr} for {name} was truncated");
        }
        debug!(
            "{addr} answered {}: {} answers, authoritative={}, recursion available={}",
            header.resp_code,
            response_msg.answer.len(),
            header.authoritative_answer,
            header.recursion_available,
        );
        Ok(Lookup::from(response_msg))
    }

    /// Like `query`, but a failed exchange becomes a status instead of an error.
    fn lookup(&self, name: &str, record_type: RecordType, server: &str) -> Lookup {
        self.query(name, record_type, server)
            .unwrap_or_else(|err| {
                warn!("{record_type} query for {name} against {server} failed: {err:#}");
                Lookup::Status(Status::from_error(&err))
            })
    }
}

impl Resolve for UdpResolver {
    fn resolve(&self, name: &str, server: &str) -> Lookup {
        let lookup = self.lookup(name, RecordType::A, server);
        if lookup.is_answer() {
            return lookup;
        }
        self.lookup(name, RecordType::Cname, server)
    }

    fn reverse_lookup(&self, ip: Ipv4Addr, server: &str) -> Lookup {
        self.lookup(&ptr_name(ip), RecordType::Ptr, server)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dns_types::Class,
        message::record::{Record, RecordData},
    };
    use std::{
        net::UdpSocket,
        sync::{Arc, Mutex},
        thread,
    };

    /// Serves `reply` on a loopback socket until it sits idle for a few
    /// seconds. Returns the server address.
    fn mock_server<F>(reply: F) -> String
    where
        F: Fn(&[u8]) -> Option<Vec<u8>> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let addr = socket.local_addr().unwrap();
        thread::spawn(move || {
            let mut buf = [0; 512];
            while let Ok((len, peer)) = socket.recv_from(&mut buf) {
                if let Some(response) = reply(&buf[..len]) {
                    let _ = socket.send_to(&response, peer);
                }
            }
        });
        addr.to_string()
    }

    fn wire_name(name: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        for label in name.split('.') {
            bytes.push(label.len() as u8);
            bytes.extend_from_slice(label.as_bytes());
        }
        bytes.push(0);
        bytes
    }

    /// QTYPE of a single-question query.
    fn qtype(query: &[u8]) -> u16 {
        let at = 12 + query[12..].iter().position(|b| *b == 0).unwrap() + 1;
        u16::from_be_bytes([query[at], query[at + 1]])
    }

    /// Echoes the query's id and question with `rcode`, plus one IN record
    /// (TTL 360) per `(type, rdata)`, all owned by the question name.
    fn response(query: &[u8], rcode: u8, answers: &[(u16, Vec<u8>)]) -> Vec<u8> {
        let mut msg = query[..2].to_vec();
        msg.extend_from_slice(&[0x81, 0x80 | rcode, 0, 1, 0, answers.len() as u8, 0, 0, 0, 0]);
        msg.extend_from_slice(&query[12..]);
        for (rtype, rdata) in answers {
            msg.extend_from_slice(&[0xc0, 0x0c]);
            msg.extend_from_slice(&rtype.to_be_bytes());
            msg.extend_from_slice(&[0, 1, 0, 0, 0x01, 0x68]);
            msg.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
            msg.extend_from_slice(rdata);
        }
        msg
    }

    fn resolver() -> UdpResolver {
        UdpResolver::new(Duration::from_secs(2))
    }

    fn a_record() -> Record {
        Record {
            name: "foo.example.com".to_owned(),
            record_type: RecordType::A,
            class: Class::IN,
            ttl: 360,
            rdlength: 4,
            data: RecordData::A(Ipv4Addr::new(1, 2, 8, 1)),
        }
    }

    #[test]
    fn test_answer_from_record() {
        let answer = Answer::from(&a_record());
        assert_eq!(answer.data, "1.2.8.1");
        assert_eq!(answer.typename, "A");
        assert_eq!(answer.classstr, "IN");
        assert_eq!(answer.rtype, 1);
        assert_eq!(answer.class, 1);
        assert!(answer.is_address());
    }

    #[test]
    fn test_fields_render_in_sorted_order() {
        let answer = Answer::from(&a_record());
        assert_eq!(
            render_fields(&answer.fields()),
            "{class: 1, classstr: IN, data: 1.2.8.1, name: foo.example.com, rdlength: 4, ttl: 360, type: 1, typename: A}"
        );
    }

    #[test]
    fn test_status_strings() {
        assert_eq!("nxdomain".parse::<Status>().unwrap(), Status::NxDomain);
        assert_eq!(
            "BADVERS".parse::<Status>().unwrap(),
            Status::Other("BADVERS".to_owned())
        );
        assert_eq!(Status::ServFail.to_string(), "SERVFAIL");
        assert_eq!(
            Status::from(ResponseCode::from(6)).to_string(),
            "YXDOMAIN"
        );
    }

    #[test]
    fn test_lookup_from_message_without_answers_is_its_status() {
        let mut msg = Message::new_query(1, "nx.example.com", RecordType::A).unwrap();
        msg.header.resp_code = ResponseCode::NameError;
        assert_eq!(Lookup::from(msg), Lookup::Status(Status::NxDomain));
    }

    #[test]
    fn test_lookup_from_message_takes_first_answer() {
        let mut msg = Message::new_query(1, "foo.example.com", RecordType::A).unwrap();
        msg.answer.push(a_record());
        match Lookup::from(msg) {
            Lookup::Answer(answer) => assert_eq!(answer.name, "foo.example.com"),
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(
            server_addr("10.0.0.1").unwrap(),
            "10.0.0.1:53".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            server_addr("127.0.0.1:5353").unwrap(),
            "127.0.0.1:5353".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(server_addr("::1").unwrap().port(), 53);
        assert!(server_addr("").is_err());
        assert!(server_addr("ns1.example.com").is_err());
    }

    #[test]
    fn test_ptr_name() {
        assert_eq!(ptr_name(Ipv4Addr::new(1, 2, 3, 10)), "10.3.2.1.in-addr.arpa");
    }

    #[test]
    fn test_timeouts_become_a_status() {
        let err = anyhow::Error::new(std::io::Error::from(std::io::ErrorKind::WouldBlock))
            .context("no response from 192.0.2.1:53");
        assert_eq!(Status::from_error(&err), Status::Other("TIMEOUT".to_owned()));
        let err = anyhow!("Error parsing response");
        assert_eq!(Status::from_error(&err), Status::Other("ERROR".to_owned()));
    }

    #[test]
    fn test_udp_resolve_a_record() {
        let server = mock_server(|query| match qtype(query) {
            1 => Some(response(query, 0, &[(1, vec![1, 2, 8, 1])])),
            _ => Some(response(query, 3, &[])),
        });
        match resolver().resolve("foo.example.com", &server) {
            Lookup::Answer(answer) => {
                assert_eq!(answer.name, "foo.example.com");
                assert_eq!(answer.data, "1.2.8.1");
                assert_eq!(answer.typename, "A");
                assert_eq!(answer.ttl, 360);
                assert_eq!(answer.rdlength, 4);
            }
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[test]
    fn test_udp_resolve_falls_back_to_cname() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&asked);
        let server = mock_server(move |query| {
            let rtype = qtype(query);
            seen.lock().unwrap().push(rtype);
            match rtype {
                5 => Some(response(query, 0, &[(5, wire_name("target.example.com"))])),
                _ => Some(response(query, 0, &[])),
            }
        });
        match resolver().resolve("alias.example.com", &server) {
            Lookup::Answer(answer) => {
                assert_eq!(answer.typename, "CNAME");
                assert_eq!(answer.data, "target.example.com");
            }
            other => panic!("expected an answer, got {other:?}"),
        }
        assert_eq!(*asked.lock().unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_udp_resolve_without_answers_is_the_rcode() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&asked);
        let server = mock_server(move |query| {
            seen.lock().unwrap().push(qtype(query));
            Some(response(query, 3, &[]))
        });
        assert_eq!(
            resolver().resolve("nx.example.com", &server),
            Lookup::Status(Status::NxDomain)
        );
        assert_eq!(*asked.lock().unwrap(), vec![1, 5]);
    }

    #[test]
    fn test_udp_reverse_lookup() {
        let server = mock_server(|query| {
            let asks_for_ptr =
                qtype(query) == 12 && query[12..].starts_with(&wire_name("1.8.2.1.in-addr.arpa"));
            if asks_for_ptr {
                Some(response(query, 0, &[(12, wire_name("foo.example.com"))]))
            } else {
                Some(response(query, 3, &[]))
            }
        });
        match resolver().reverse_lookup(Ipv4Addr::new(1, 2, 8, 1), &server) {
            Lookup::Answer(answer) => {
                assert_eq!(answer.typename, "PTR");
                assert_eq!(answer.name, "1.8.2.1.in-addr.arpa");
                assert_eq!(answer.data, "foo.example.com");
            }
            other => panic!("expected an answer, got {other:?}"),
        }
    }

    #[test]
    fn test_udp_reply_with_wrong_id_is_an_error() {
        let server = mock_server(|query| {
            let mut reply = response(query, 0, &[(1, vec![1, 2, 8, 1])]);
            reply[0] ^= 0xff;
            Some(reply)
        });
        assert_eq!(
            resolver().resolve("foo.example.com", &server),
            Lookup::Status(Status::Other("ERROR".to_owned()))
        );
    }

    #[test]
    fn test_udp_silent_server_times_out() {
        let server = mock_server(|_| None);
        let resolver = UdpResolver::new(Duration::from_millis(100));
        assert_eq!(
            resolver.reverse_lookup(Ipv4Addr::new(1, 2, 8, 1), &server),
            Lookup::Status(Status::Other("TIMEOUT".to_owned()))
        );
    }

    #[test]
    fn test_udp_bad_server_is_an_error() {
        assert_eq!(
            resolver().resolve("foo.example.com", "ns1.example.com"),
            Lookup::Status(Status::Other("ERROR".to_owned()))
        );
    }
}
