/// Implements sign extension as described at [Sign extension](https://en.wikipedia.org/wiki/Sign_extension).
///
/// Bit `valid_bits - 1` of `bits` is replicated into all higher bits of the result,
/// bits above `valid_bits` in the input are ignored.
#[must_use]
pub const fn sign_extend(bits: u16, valid_bits: u8) -> u16 {
    debug_assert!(valid_bits > 0 && valid_bits <= 16);
    if valid_bits == 16 {
        return bits;
    }
    let bits = bits & ((1 << valid_bits) - 1);
    let most_significant_bit = bits >> (valid_bits - 1);
    if most_significant_bit == 1 {
        // negative: 1-extend
        bits | (0xFFFF << valid_bits)
    } else {
        // positive, already 0-extended
        bits
    }
}

/// Two's complement interpretation of a word.
#[must_use]
pub const fn twos_complement_to_decimal(bin_rep: u16) -> i16 {
    bin_rep.cast_signed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;
    use yare::parameterized;

    #[gtest]
    pub fn test_sign_extend_all_5_bit_values() {
        for v in 0u16..32 {
            let expected = if v < 16 { i32::from(v) } else { i32::from(v) - 32 };
            expect_that!(
                i32::from(twos_complement_to_decimal(sign_extend(v, 5))),
                eq(expected),
                "input {v:#07b}"
            );
        }
    }

    #[parameterized(
        imm5_max = { 0b0_1111, 5, 0x000F },
        imm5_min = { 0b1_0000, 5, 0xFFF0 },
        offset6_minus_one = { 0b11_1111, 6, 0xFFFF },
        offset9_minus_two = { 0b1_1111_1110, 9, 0xFFFE },
        offset11_positive = { 0b001_1010_0001, 11, 0x01A1 },
        upper_bits_ignored = { 0b1110_0000_0000_0011, 5, 0x0003 },
        full_width = { 0x8000, 16, 0x8000 },
    )]
    fn test_sign_extend(bits: u16, width: u8, expected: u16) {
        assert_that!(sign_extend(bits, width), eq(expected));
    }

    #[gtest]
    pub fn test_twos_complement() {
        expect_that!(twos_complement_to_decimal(0x7FFF), eq(i16::MAX));
        expect_that!(twos_complement_to_decimal(0x8000), eq(i16::MIN));
        expect_that!(twos_complement_to_decimal(0xFFF6), eq(-10));
    }
}
