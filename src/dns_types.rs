use bitvec::prelude::*;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Cname,
    Soa,
    Ptr,
    /// Anything else a server may put in a response. Kept so parsing doesn't fail.
    Unknown(u16),
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => "A".fmt(f),
            Self::Cname => "CNAME".fmt(f),
            Self::Soa => "SOA".fmt(f),
            Self::Ptr => "PTR".fmt(f),
            Self::Unknown(n) => write!(f, "TYPE{n}"),
        }
    }
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => Self::A,
            5 => Self::Cname,
            6 => Self::Soa,
            12 => Self::Ptr,
            other => Self::Unknown(other),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(rt: RecordType) -> Self {
        match rt {
            RecordType::A => 1,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Unknown(n) => n,
        }
    }
}

impl RecordType {
    pub fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) {
        let type_num = u16::from(*self);
        bv.extend_from_bitslice(type_num.view_bits::<Msb0>())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    IN,
    Other(u16),
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IN => "IN".fmt(f),
            Self::Other(n) => write!(f, "CLASS{n}"),
        }
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        match value {
            1 => Self::IN,
            other => Self::Other(other),
        }
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        match class {
            Class::IN => 1,
            Class::Other(n) => n,
        }
    }
}

impl Class {
    pub fn serialize<T: BitStore>(&self, bv: &mut BitVec<T, Msb0>) {
        let class_num = u16::from(*self);
        bv.extend_from_bitslice(class_num.view_bits::<Msb0>())
    }
}
