use crate::{dns_types::Class, dns_types::RecordType, util::join_asciis};
use anyhow::{anyhow, Result as AResult};
use ascii::AsciiString;
use bitvec::prelude::*;
use std::fmt;

const LABEL_TOO_LONG: &str = "is too long (must be <64 chars)";

#[derive(Debug)]
pub struct Entry {
    labels: Vec<AsciiString>,
    pub record_type: RecordType,
    pub record_qclass: Class,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.record_type, join_asciis(&self.labels))
    }
}

impl Entry {
    /// `labels` must end with the empty root label.
    pub(crate) fn new(labels: Vec<AsciiString>, record_type: RecordType) -> Self {
        Self::with_class(labels, record_type, Class::IN)
    }

    pub(crate) fn with_class(
        labels: Vec<AsciiString>,
        record_type: RecordType,
        record_qclass: Class,
    ) -> Self {
        Self {
            labels,
            record_type,
            record_qclass,
        }
    }

    pub fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) -> AResult<()> {
        self.serialize_qname(bv)?;
        self.record_type.serialize(bv);
        self.record_qclass.serialize(bv);
        Ok(())
    }

    /// Length-prefixed labels, RFC 1035 section 3.1.
    fn serialize_qname<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) -> AResult<()> {
        for label in &self.labels {
            let len = u8::try_from(label.len())
                .ok()
                .filter(|len| *len < 64)
                .ok_or_else(|| anyhow!("Label {label} {LABEL_TOO_LONG}"))?;
            bv.extend_from_bitslice(len.view_bits::<Msb0>());
            for byte in label.as_bytes() {
                bv.extend_from_bitslice(byte.view_bits::<Msb0>());
            }
        }
        Ok(())
    }
}
