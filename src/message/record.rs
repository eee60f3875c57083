use crate::dns_types::{Class, RecordType};
use std::{fmt, net::Ipv4Addr};

/// TTL             positive values of a signed 32 bit number.
pub(crate) const MAX_TTL: u32 = i32::MAX as u32;

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct Record {
    /// Owner name, without the trailing root dot.
    pub name: String,
    pub record_type: RecordType,
    pub class: Class,
    pub ttl: u32,
    /// Length of the RDATA section as it appeared on the wire.
    pub rdlength: u16,
    pub data: RecordData,
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub enum RecordData {
    A(Ipv4Addr),
    Cname(String),
    Ptr(String),
    Soa(Soa),
    /// RDATA of a type we don't decode.
    Other(Vec<u8>),
}

#[derive(Debug, Clone)]
#[cfg_attr(test, derive(Eq, PartialEq))]
pub struct Soa {
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(ipv4) => ipv4.fmt(f),
            Self::Cname(name) | Self::Ptr(name) => name.fmt(f),
            Self::Soa(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.mname, soa.rname, soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum
            ),
            // RFC 3597 generic presentation.
            Self::Other(bytes) => {
                write!(f, "\\# {}", bytes.len())?;
                if !bytes.is_empty() {
                    f.write_str(" ")?;
                    for byte in bytes {
                        write!(f, "{byte:02x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}
