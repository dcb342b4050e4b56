//! Big-endian write helpers.
//!
//! The read side lives in [`crate::utils::bitstream_io`]. Records derive
//! [`WriteBytesBe`] with `#[derive(ToBytes)]`, which writes each field in
//! declaration order.

pub trait WriteBytesBe {
    fn write_be(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_be {
    ($($t:ty),+) => { $(
        impl WriteBytesBe for $t { #[inline] fn write_be(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_be_bytes()); }}
    )+ }
}

impl_num_be!(u8, i8, u16, i16, u32, i32, u64, i64);

impl<T: WriteBytesBe> WriteBytesBe for Vec<T> {
    #[inline]
    fn write_be(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_be(dst));
    }
}

impl<T: WriteBytesBe, const N: usize> WriteBytesBe for [T; N] {
    #[inline]
    fn write_be(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_be(dst));
    }
}

#[cfg(test)]
mod tests {
    use crate::byteorder::WriteBytesBe;
    use gapcm_macros::ToBytes;

    #[derive(ToBytes)]
    struct Mini {
        a: u16,
        b: u32,
        tag: [u8; 4],
    }

    #[test]
    fn to_bytes_big_endian() {
        let s = Mini {
            a: 0x1234,
            b: 0xABCDEF01,
            tag: *b"TEST",
        };

        let mut vec_be = Vec::new();
        s.write_be(&mut vec_be);

        let expected_be = [0x12, 0x34, 0xAB, 0xCD, 0xEF, 0x01, b'T', b'E', b'S', b'T'];
        assert_eq!(&vec_be[..], &expected_be);
    }
}
