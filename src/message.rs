pub mod header;
mod parser_utils;
pub mod question;
pub mod record;

use crate::{
    dns_types::{Class, RecordType},
    parse::parse_label,
    util::presentation_name,
};
use anyhow::{anyhow, Result as AResult};
use ascii::AsciiString;
use bitvec::prelude::*;
use header::Header;
use nom::{
    bytes::complete::take,
    combinator::{all_consuming, map, peek},
    error::{Error, ErrorKind},
    multi::count,
    number::complete::{be_u16, be_u32, be_u8},
    sequence::tuple,
    IResult,
};
use question::Entry;
use record::{Record, RecordData, Soa, MAX_TTL};
use std::net::Ipv4Addr;

/// Defined by RFC 1035
/// UDP messages    512 octets or less
pub(crate) const MAX_UDP_BYTES: usize = 512;

/// Defined by RFC 1035
/// labels          63 octets or less
const MAX_LABEL_BYTES: usize = 63;

/// Defined by RFC 1035
/// names           255 octets or less
const MAX_NAME_BYTES: usize = 255;

/// The top two bits of a length octet mark a compression pointer (RFC 1035 4.1.4).
const POINTER_TAG: u8 = 0b1100_0000;
const POINTER_OFFSET_MASK: u16 = 0b0011_1111_1111_1111;

/// Guards against pointer loops in hostile responses.
const MAX_POINTER_JUMPS: usize = 64;

#[derive(Debug)]
pub struct Message {
    /// The header section is always present.  The header includes fields that
    /// specify which of the remaining sections are present, and also specify
    /// whether the message is a query or a response, a standard query or some
    /// other opcode, etc.
    pub header: Header,
    // The question section contains fields that describe a
    // question to a name server.  These fields are a query type (QTYPE), a
    // query class (QCLASS), and a query domain name (QNAME).
    pub question: Vec<Entry>,
    /// The answer section contains RRs that answer the question
    pub answer: Vec<Record>,
    /// the authority section contains RRs that point toward an
    /// authoritative name server;
    pub authority: Vec<Record>,
    /// the additional records section contains RRs
    /// which relate to the query, but are not strictly answers for the
    /// question.
    pub additional: Vec<Record>,
}

impl Message {
    pub fn new_query(id: u16, domain_name: &str, record_type: RecordType) -> AResult<Self> {
        let mut domain_name = domain_name.to_owned();
        if !domain_name.ends_with('.') {
            domain_name.push('.');
        }
        let name_len = domain_name.len();
        if name_len > MAX_NAME_BYTES {
            anyhow::bail!(
                "Domain name is {name_len} bytes, which is over the max of {MAX_NAME_BYTES}"
            );
        }
        let dn = AsciiString::from_ascii(domain_name.as_str())
            .map_err(|_| anyhow!("Domain name {domain_name} must be ASCII"))?;
        let labels: Vec<_> = dn
            .split(ascii::AsciiChar::Dot)
            .map(|a| a.to_owned())
            .collect();
        if labels.iter().any(|label| label.len() > MAX_LABEL_BYTES) {
            anyhow::bail!(
                "One of the labels in {domain_name} is over the max of {MAX_LABEL_BYTES} bytes"
            );
        }
        // Only the final (root) label may be empty.
        if labels[..labels.len() - 1].iter().any(|label| label.is_empty()) {
            anyhow::bail!("Domain name {domain_name} has an empty label");
        }
        let msg = Message {
            header: Header::new_query(id),
            question: vec![Entry::new(labels, record_type)],
            answer: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        };
        Ok(msg)
    }

    fn serialize_bits<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) -> AResult<()> {
        self.header.serialize(bv);
        for q in &self.question {
            q.serialize(bv)?;
        }
        Ok(())
    }

    pub fn serialize_bytes(&self) -> AResult<Vec<u8>> {
        let mut bv = BitVec::<u8, Msb0>::with_capacity(8 * MAX_UDP_BYTES);
        self.serialize_bits(&mut bv)?;
        // Every field is a whole number of bytes, so the backing store is the message.
        Ok(bv.into_vec())
    }

    pub fn deserialize(i: &[u8]) -> IResult<&[u8], Self> {
        let rp = RecordParser { message: i };
        let (i, header) = Header::from_bytes(i)?;
        let (i, question) = count(|i| rp.parse_question(i), header.question_count.into())(i)?;
        let (i, answer) = count(|i| rp.parse_record(i), header.answer_count.into())(i)?;
        let (i, authority) = count(|i| rp.parse_record(i), header.name_server_count.into())(i)?;
        let (i, additional) =
            count(|i| rp.parse_record(i), header.additional_records_count.into())(i)?;
        Ok((
            i,
            Message {
                header,
                question,
                answer,
                authority,
                additional,
            },
        ))
    }
}

/// Parses names and records out of one message. Compression pointers are
/// offsets from the start of the message, so the parser keeps all of it.
#[derive(Debug)]
struct RecordParser<'a> {
    message: &'a [u8],
}

impl<'a> RecordParser<'a> {
    /// Returns the labels of a name, ending with the empty root label.
    fn parse_name(&self, input: &'a [u8]) -> IResult<&'a [u8], Vec<AsciiString>> {
        let message: &'a [u8] = self.message;
        let mut labels = Vec::new();
        let mut cursor = input;
        let mut resume_at = None;
        let mut jumps = 0;
        loop {
            let (_, first_byte) = peek(be_u8)(cursor)?;
            if first_byte & POINTER_TAG == POINTER_TAG {
                // The remaining 14 bits are the offset that the pointer points at.
                let (i, pointer) = be_u16(cursor)?;
                let offset = usize::from(pointer & POINTER_OFFSET_MASK);
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS || offset >= message.len() {
                    return Err(nom::Err::Failure(Error::new(cursor, ErrorKind::Verify)));
                }
                // Parsing continues after the first pointer, not after the name it points to.
                if resume_at.is_none() {
                    resume_at = Some(i);
                }
                cursor = &message[offset..];
            } else {
                let (i, label) = parse_label(cursor)?;
                cursor = i;
                let is_root = label.is_empty();
                labels.push(label);
                if is_root {
                    break;
                }
            }
        }
        Ok((resume_at.unwrap_or(cursor), labels))
    }

    fn parse_question(&self, input: &'a [u8]) -> IResult<&'a [u8], Entry> {
        let (i, labels) = self.parse_name(input)?;
        let (i, record_type) = map(be_u16, RecordType::from)(i)?;
        let (i, class) = map(be_u16, Class::from)(i)?;
        Ok((i, Entry::with_class(labels, record_type, class)))
    }

    fn parse_record(&self, input: &'a [u8]) -> IResult<&'a [u8], Record> {
        let (input, labels) = self.parse_name(input)?;
        let (input, record_type) = map(be_u16, RecordType::from)(input)?;
        let (input, class) = map(be_u16, Class::from)(input)?;
        // RFC 2181 section 8: a TTL with the top bit set is read as zero.
        let (input, ttl) = map(be_u32, |ttl| if ttl > MAX_TTL { 0 } else { ttl })(input)?;
        let (input, rdlength) = be_u16(input)?;
        let (input, rdata) = take(rdlength)(input)?;
        let (_, data) = self.parse_rdata(record_type, rdata)?;
        Ok((
            input,
            Record {
                name: presentation_name(&labels),
                record_type,
                class,
                ttl,
                rdlength,
                data,
            },
        ))
    }

    fn parse_rdata(&self, record_type: RecordType, rdata: &'a [u8]) -> IResult<&'a [u8], RecordData> {
        match record_type {
            RecordType::A => map(
                all_consuming(tuple((be_u8, be_u8, be_u8, be_u8))),
                |(a, b, c, d)| RecordData::A(Ipv4Addr::new(a, b, c, d)),
            )(rdata),
            RecordType::Cname => {
                let (i, labels) = self.parse_name(rdata)?;
                Ok((i, RecordData::Cname(presentation_name(&labels))))
            }
            RecordType::Ptr => {
                let (i, labels) = self.parse_name(rdata)?;
                Ok((i, RecordData::Ptr(presentation_name(&labels))))
            }
            RecordType::Soa => {
                let (i, mname) = self.parse_name(rdata)?;
                let (i, rname) = self.parse_name(i)?;
                let (i, (serial, refresh, retry, expire, minimum)) =
                    tuple((be_u32, be_u32, be_u32, be_u32, be_u32))(i)?;
                let soa = Soa {
                    mname: presentation_name(&mname),
                    rname: presentation_name(&rname),
                    serial,
                    refresh,
                    retry,
                    expire,
                    minimum,
                };
                Ok((i, RecordData::Soa(soa)))
            }
            RecordType::Unknown(_) => Ok((&rdata[rdata.len()..], RecordData::Other(rdata.to_vec()))),
        }
    }
}
