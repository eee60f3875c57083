use nom::{bits::complete::take, IResult};

/// Nom's input type for bit-level parsing: the remaining bytes, plus the
/// offset of the next unread bit within the first byte.
///
/// Parsing three bits out of `([0b11110000, 0b11001100], 0)` leaves
/// `([0b11110000, 0b11001100], 3)`. Once the offset walks past a byte
/// boundary nom drops the exhausted byte, so after nine bits you get
/// `([0b11001100], 1)`.
pub type BitInput<'a> = (&'a [u8], usize);

/// Take 4 bits from the BitInput.
/// Parse into a uint with most significant bit first.
pub fn take_nibble(i: BitInput) -> IResult<BitInput, u8> {
    take(4u8)(i)
}

/// Take 16 bits from the BitInput, parse into a uint with most significant bit first.
pub fn take_u16(i: BitInput) -> IResult<BitInput, u16> {
    take_bits(i, 16)
}

/// Takes n bits from the BitInput, n <= 16
/// Returns the remaining BitInput and a number parsed the first n bits.
pub fn take_bits(i: BitInput, n: u8) -> IResult<BitInput, u16> {
    take(n)(i)
}

/// Takes one bit from the BitInput.
pub fn take_bit(i: BitInput) -> IResult<BitInput, bool> {
    let (i, bit): (BitInput, u8) = take(1u8)(i)?;
    Ok((i, bit != 0))
}
