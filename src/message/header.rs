use crate::message::parser_utils::*;
use bitvec::prelude::*;
use nom::IResult;
use std::fmt;

/// RFC 1035 defines DNS headers as 12 bytes long.
pub(crate) const EXPECTED_SIZE_BYTES: usize = 12;

/// The fixed 12-byte section at the front of every query and response,
/// laid out as in RFC 1035 section 4.1.1.
#[derive(Debug)]
pub struct Header {
    /// Chosen by the querier and echoed back, used to pair up replies.
    pub id: u16,
    /// QR bit.
    pub is_response: bool,
    pub opcode: Opcode,
    /// AA bit: the answering server is authoritative for the question name.
    pub authoritative_answer: bool,
    /// TC bit: the reply didn't fit in the transport and was cut short.
    pub truncation: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub resp_code: ResponseCode,
    pub question_count: u16,
    pub answer_count: u16,
    pub name_server_count: u16,
    pub additional_records_count: u16,
}

impl Header {
    /// Generate the header for a query with one question.
    pub fn new_query(id: u16) -> Self {
        Self {
            id,
            is_response: false,
            opcode: Opcode::Query,
            authoritative_answer: false,
            truncation: false,
            recursion_desired: true,
            recursion_available: false,
            resp_code: ResponseCode::NoError,
            question_count: 1,
            answer_count: 0,
            name_server_count: 0,
            additional_records_count: 0,
        }
    }

    /// Serialize the Header and write it into the stream of bits.
    pub fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) {
        let initial_length_bits = bv.len();
        bv.extend_from_bitslice(self.id.view_bits::<Msb0>());
        bv.push(self.is_response);
        self.opcode.serialize(bv);
        bv.push(self.authoritative_answer);
        bv.push(self.truncation);
        bv.push(self.recursion_desired);
        bv.push(self.recursion_available);
        // Z
        bv.extend_from_bitslice(bits![u8, Msb0; 0; 3]);
        self.resp_code.serialize(bv);
        bv.extend_from_bitslice(self.question_count.view_bits::<Msb0>());
        bv.extend_from_bitslice(self.answer_count.view_bits::<Msb0>());
        bv.extend_from_bitslice(self.name_server_count.view_bits::<Msb0>());
        bv.extend_from_bitslice(self.additional_records_count.view_bits::<Msb0>());
        let bits_written = bv.len() - initial_length_bits;
        debug_assert_eq!(bits_written, 8 * EXPECTED_SIZE_BYTES);
    }

    /// Parse a header off the front of a byte slice.
    pub fn from_bytes(i: &[u8]) -> IResult<&[u8], Self> {
        nom::bits::bits(Self::deserialize)(i)
    }

    pub fn deserialize(i: BitInput) -> IResult<BitInput, Self> {
        use nom::combinator::map_res;

        // ID, then QR|Opcode|AA|TC|RD|RA|Z|RCODE, then the four section counts.
        let (i, id) = take_u16(i)?;
        let (i, qr) = take_bit(i)?;
        let (i, opcode) = map_res(take_nibble, Opcode::try_from)(i)?;
        let (i, aa) = take_bit(i)?;
        let (i, tc) = take_bit(i)?;
        let (i, rd) = take_bit(i)?;
        let (i, ra) = take_bit(i)?;
        // Z is ignored; some servers reuse these bits (AD/CD from DNSSEC).
        let (i, _z) = take_bits(i, 3)?;
        let (i, rcode) = take_nibble(i)?;
        let (i, qdcount) = take_u16(i)?;
        let (i, ancount) = take_u16(i)?;
        let (i, nscount) = take_u16(i)?;
        let (i, arcount) = take_u16(i)?;
        let header = Header {
            id,
            is_response: qr,
            opcode,
            authoritative_answer: aa,
            truncation: tc,
            recursion_desired: rd,
            recursion_available: ra,
            resp_code: ResponseCode::from(rcode),
            question_count: qdcount,
            answer_count: ancount,
            name_server_count: nscount,
            additional_records_count: arcount,
        };
        Ok((i, header))
    }
}

/// Kind of query. Only `Query` is ever sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 0: a standard query (QUERY)
    Query,
    /// 1: an inverse query (IQUERY)
    InverseQuery,
    /// 2: a server status request (STATUS)
    Status,
}

impl TryFrom<u8> for Opcode {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0 => Self::Query,
            1 => Self::InverseQuery,
            2 => Self::Status,
            other => anyhow::bail!("Unknown opcode {other}"),
        };
        Ok(op)
    }
}

impl Opcode {
    fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) {
        match self {
            Self::Query => bv.extend_from_bitslice(bits![u8, Msb0; 0; 4]),
            Self::InverseQuery => bv.extend_from_bitslice(bits![u8, Msb0; 0, 0, 0, 1]),
            Self::Status => bv.extend_from_bitslice(bits![u8, Msb0; 0, 0, 1, 0]),
        }
    }
}

/// RCODE of a response. These are what end up in a [`crate::resolver::Status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    NoError,
    FormatError,
    ServerFailure,
    /// NXDOMAIN: the name doesn't exist.
    NameError,
    NotImplemented,
    Refused,
    /// RCODEs 6 through 15, from the dynamic update and later RFCs.
    Other(u8),
}

impl ResponseCode {
    fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) {
        let code = u8::from(*self);
        bv.extend_from_bitslice(&code.view_bits::<Msb0>()[4..]);
    }

    /// The conventional upper-case name for the code, as dig prints it.
    pub fn mnemonic(&self) -> String {
        let s = match self {
            Self::NoError => "NOERROR",
            Self::FormatError => "FORMERR",
            Self::ServerFailure => "SERVFAIL",
            Self::NameError => "NXDOMAIN",
            Self::NotImplemented => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::Other(6) => "YXDOMAIN",
            Self::Other(7) => "YXRRSET",
            Self::Other(8) => "NXRRSET",
            Self::Other(9) => "NOTAUTH",
            Self::Other(10) => "NOTZONE",
            Self::Other(n) => return format!("RCODE{n}"),
        };
        s.to_owned()
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.mnemonic().fmt(f)
    }
}

impl From<u8> for ResponseCode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::FormatError,
            2 => Self::ServerFailure,
            3 => Self::NameError,
            4 => Self::NotImplemented,
            5 => Self::Refused,
            other => Self::Other(other),
        }
    }
}

impl From<ResponseCode> for u8 {
    fn from(code: ResponseCode) -> Self {
        match code {
            ResponseCode::NoError => 0,
            ResponseCode::FormatError => 1,
            ResponseCode::ServerFailure => 2,
            ResponseCode::NameError => 3,
            ResponseCode::NotImplemented => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Other(n) => n & 0x0f,
        }
    }
}
