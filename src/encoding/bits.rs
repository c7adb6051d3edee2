//! # Bit-Array Packing
//!
//! Bit columns store `n` logical values per row packed most-significant-bit
//! first: bit 0 of the row lives in bit 7 of the first storage byte. A row
//! occupies `ceil(n/8)` bytes; trailing pad bits in the last byte are always
//! written as zero and ignored on unpack.
//!
//! ```text
//! row bits:     b0 b1 b2 b3 b4 b5 b6 b7 | b8 b9 ...
//! storage:      byte0 = b0<<7 | b1<<6 | ... | b7
//!               byte1 = b8<<7 | b9<<6 | ...  (padded with 0)
//! ```
//!
//! Pack and unpack are exact inverses for every shape, which the record
//! codec relies on when regenerating raw storage.

/// Unpacks the first `n` bits of `packed` (MSB-first) into booleans,
/// appending them to `out`.
pub fn unpack_row(packed: &[u8], n: usize, out: &mut Vec<bool>) {
    debug_assert!(packed.len() >= n.div_ceil(8));
    for bit in 0..n {
        let byte = packed[bit / 8];
        out.push(byte & (0x80 >> (bit % 8)) != 0);
    }
}

/// Packs `bits` MSB-first into `out`, zeroing pad bits. `out` must hold
/// exactly `ceil(bits.len()/8)` bytes.
pub fn pack_row(bits: &[bool], out: &mut [u8]) {
    debug_assert_eq!(out.len(), bits.len().div_ceil(8));
    out.fill(0);
    for (bit, &set) in bits.iter().enumerate() {
        if set {
            out[bit / 8] |= 0x80 >> (bit % 8);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(bits: &[bool]) {
        let mut packed = vec![0u8; bits.len().div_ceil(8)];
        pack_row(bits, &mut packed);
        let mut unpacked = Vec::new();
        unpack_row(&packed, bits.len(), &mut unpacked);
        assert_eq!(unpacked, bits);
    }

    #[test]
    fn first_bit_lands_in_high_bit() {
        let mut packed = vec![0u8; 1];
        pack_row(&[true, false, false, false, false, false, false, false], &mut packed);
        assert_eq!(packed, [0x80]);
    }

    #[test]
    fn packs_msb_first_across_bytes() {
        let bits = [
            true, false, true, false, true, false, true, false, // 0xAA
            true, true, false,
        ];
        let mut packed = vec![0u8; 2];
        pack_row(&bits, &mut packed);
        assert_eq!(packed, [0xAA, 0xC0]);
    }

    #[test]
    fn pad_bits_are_zeroed() {
        let mut packed = vec![0xFFu8; 1];
        pack_row(&[true, true, true], &mut packed);
        assert_eq!(packed, [0xE0]);
    }

    #[test]
    fn roundtrips_assorted_widths() {
        roundtrip(&[]);
        roundtrip(&[true]);
        roundtrip(&[false, true, true, false, true, false, false, true]);
        let wide: Vec<bool> = (0..29).map(|i| i % 3 == 0).collect();
        roundtrip(&wide);
    }

    #[test]
    fn unpack_ignores_pad_bits() {
        let mut out = Vec::new();
        unpack_row(&[0b1010_0111], 3, &mut out);
        assert_eq!(out, [true, false, true]);
    }
}
