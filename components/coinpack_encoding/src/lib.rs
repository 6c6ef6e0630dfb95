//! *Binary encodings shared by the coinpack crates.*
//!
//! `coinpack_encoding` is a library that provides common encoding and decoding operations
//! for the binary formats handled by the codec: the Bitcoin `CompactSize` variable-length
//! integer, and length-prefixed vectors built on top of it.

#![deny(rustdoc::broken_intra_doc_links)]

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

/// The maximum allowed value representable as a `[CompactSize]`
pub const MAX_COMPACT_SIZE: u32 = 0x02000000;

/// Upper bound on the number of elements preallocated when reading a vector whose length
/// prefix has not yet been validated against the available input.
const MAX_PREALLOCATION: usize = 1024;

/// Namespace for functions for compact encoding of integers.
///
/// This codec requires integers to be in the range `0x0..=0x02000000`, for compatibility
/// with Bitcoin's `MAX_SIZE` limit.
pub struct CompactSize;

impl CompactSize {
    /// Reads an integer encoded in compact form.
    pub fn read<R: Read>(mut reader: R) -> io::Result<u64> {
        let flag = reader.read_u8()?;
        let result = match flag {
            0xfd => match reader.read_u16::<LittleEndian>()? {
                n if n < 253 => Err(non_canonical()),
                n => Ok(u64::from(n)),
            },
            0xfe => match reader.read_u32::<LittleEndian>()? {
                n if n < 0x10000 => Err(non_canonical()),
                n => Ok(u64::from(n)),
            },
            0xff => match reader.read_u64::<LittleEndian>()? {
                n if n < 0x100000000 => Err(non_canonical()),
                n => Ok(n),
            },
            n => Ok(u64::from(n)),
        }?;

        match result {
            s if s > u64::from(MAX_COMPACT_SIZE) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "CompactSize too large",
            )),
            s => Ok(s),
        }
    }

    /// Reads an integer encoded in compact form and performs checked conversion
    /// to the target type.
    pub fn read_t<R: Read, T: TryFrom<u64>>(mut reader: R) -> io::Result<T> {
        let n = Self::read(&mut reader)?;
        T::try_from(n).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "CompactSize value exceeds range of target type.",
            )
        })
    }

    /// Writes the provided `usize` value to the provided Writer in compact form.
    pub fn write<W: Write>(mut writer: W, size: usize) -> io::Result<()> {
        match size {
            s if s < 253 => writer.write_u8(s as u8),
            s if s <= 0xFFFF => {
                writer.write_u8(253)?;
                writer.write_u16::<LittleEndian>(s as u16)
            }
            s if s <= 0xFFFFFFFF => {
                writer.write_u8(254)?;
                writer.write_u32::<LittleEndian>(s as u32)
            }
            s => {
                writer.write_u8(255)?;
                writer.write_u64::<LittleEndian>(s as u64)
            }
        }
    }

    /// Returns the number of bytes needed to encode the given size in compact form.
    pub fn serialized_size(size: usize) -> usize {
        match size {
            s if s < 253 => 1,
            s if s <= 0xFFFF => 3,
            s if s <= 0xFFFFFFFF => 5,
            _ => 9,
        }
    }
}

fn non_canonical() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "non-canonical CompactSize")
}

/// Namespace for functions that perform encoding of vectors.
///
/// The length of a vector is restricted to at most [`MAX_COMPACT_SIZE`], for compatibility
/// with Bitcoin's `MAX_SIZE` limit.
pub struct Vector;

impl Vector {
    /// Reads a vector, assuming the encoding written by [`Vector::write`], using the provided
    /// function to decode each element of the vector.
    pub fn read<R: Read, E, F>(reader: R, func: F) -> io::Result<Vec<E>>
    where
        F: Fn(&mut R) -> io::Result<E>,
    {
        Self::read_collected(reader, func)
    }

    /// Reads a CompactSize-prefixed series of elements into a collection, assuming the encoding
    /// written by [`Vector::write`], using the provided function to decode each element.
    pub fn read_collected<R: Read, E, F, O: FromIterator<E>>(
        mut reader: R,
        func: F,
    ) -> io::Result<O>
    where
        F: Fn(&mut R) -> io::Result<E>,
    {
        let count: usize = CompactSize::read_t(&mut reader)?;
        Array::read_collected(reader, count, func)
    }

    /// Reads a CompactSize-prefixed byte string.
    ///
    /// The declared length is not trusted for allocation; a length prefix that runs past
    /// the end of the input fails with [`io::ErrorKind::UnexpectedEof`].
    pub fn read_bytes<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
        let len: usize = CompactSize::read_t(&mut reader)?;
        let mut bytes = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        reader.take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() == len {
            Ok(bytes)
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "byte string shorter than its length prefix",
            ))
        }
    }

    /// Writes a slice of values by writing a [`CompactSize`]-encoded integer specifying the
    /// length of the slice to the stream, followed by the encoding of each element of the
    /// slice as performed by the provided function.
    pub fn write<W: Write, E, F>(mut writer: W, vec: &[E], func: F) -> io::Result<()>
    where
        F: Fn(&mut W, &E) -> io::Result<()>,
    {
        CompactSize::write(&mut writer, vec.len())?;
        vec.iter().try_for_each(|e| func(&mut writer, e))
    }

    /// Writes a byte slice preceded by its [`CompactSize`]-encoded length.
    pub fn write_bytes<W: Write>(mut writer: W, bytes: &[u8]) -> io::Result<()> {
        CompactSize::write(&mut writer, bytes.len())?;
        writer.write_all(bytes)
    }

    /// Returns the serialized size of a vector of `u8` as written by [`Vector::write_bytes`].
    pub fn serialized_size_of_u8_vec(vec: &[u8]) -> usize {
        let length = vec.len();
        CompactSize::serialized_size(length) + length
    }
}

/// Namespace for functions that perform encoding of array contents.
///
/// This is similar to the [`Vector`] encoding except that no length information is
/// written as part of the encoding, so length must be statically known or obtained from
/// other parts of the input stream.
pub struct Array;

impl Array {
    /// Reads `count` consecutive elements from a stream, using the provided function to
    /// decode each one.
    pub fn read<R: Read, E, F>(reader: R, count: usize, func: F) -> io::Result<Vec<E>>
    where
        F: Fn(&mut R) -> io::Result<E>,
    {
        Self::read_collected(reader, count, func)
    }

    /// Reads `count` consecutive elements into a collection.
    pub fn read_collected<R: Read, E, F, O: FromIterator<E>>(
        mut reader: R,
        count: usize,
        func: F,
    ) -> io::Result<O>
    where
        F: Fn(&mut R) -> io::Result<E>,
    {
        (0..count).map(|_| func(&mut reader)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use std::fmt::Debug;

    #[test]
    fn compact_size() {
        fn check_for<T: TryFrom<u64> + Copy + Debug + PartialEq>(value: u64, expected: &[u8]) {
            let mut data = vec![];
            CompactSize::write(&mut data, value as usize).unwrap();
            assert_eq!(&data[..], expected);
            let serialized_size = CompactSize::serialized_size(value as usize);
            assert_eq!(serialized_size, expected.len());
            let result: io::Result<T> = CompactSize::read_t(&data[..]);
            match result {
                Ok(n) => assert_eq!(T::try_from(value).ok(), Some(n)),
                Err(e) => panic!("Unexpected error: {:?}", e),
            }
        }

        check_for::<u8>(0, &[0]);
        check_for::<u8>(1, &[1]);
        check_for::<u8>(252, &[252]);
        check_for::<u16>(253, &[253, 253, 0]);
        check_for::<u16>(254, &[253, 254, 0]);
        check_for::<u16>(255, &[253, 255, 0]);
        check_for::<u16>(256, &[253, 0, 1]);
        check_for::<u32>(0xFFFF, &[253, 255, 255]);
        check_for::<u32>(0x010000, &[254, 0, 0, 1, 0]);
        check_for::<u32>(0x02000000, &[254, 0, 0, 0, 2]);
    }

    #[test]
    fn compact_size_rejects_non_canonical_and_oversized() {
        fn check_err(encoded: &[u8]) {
            let result = CompactSize::read(encoded);
            assert_matches!(result, Err(e) if e.kind() == io::ErrorKind::InvalidInput);
        }

        check_err(&[253, 252, 0]);
        check_err(&[254, 0xff, 0xff, 0, 0]);
        check_err(&[255, 0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]);
        // 0x02000001 exceeds MAX_COMPACT_SIZE
        check_err(&[254, 1, 0, 0, 2]);
    }

    #[test]
    fn compact_size_truncated() {
        for encoded in [&[][..], &[253, 0][..], &[254, 0, 0, 1][..], &[255, 0][..]] {
            assert_matches!(
                CompactSize::read(encoded),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
            );
        }
    }

    #[test]
    fn vector() {
        macro_rules! eval {
            ($value:expr, $expected:expr) => {
                let mut data = vec![];
                Vector::write(&mut data, &$value, |w, e| w.write_u8(*e)).unwrap();
                assert_eq!(&data[..], &$expected[..]);
                let serialized_size = Vector::serialized_size_of_u8_vec(&$value);
                assert_eq!(serialized_size, $expected.len());
                match Vector::read(&data[..], |r| r.read_u8()) {
                    Ok(v) => assert_eq!(v, $value),
                    Err(e) => panic!("Unexpected error: {:?}", e),
                }
            };
        }

        eval!(vec![], [0]);
        eval!(vec![0], [1, 0]);
        eval!(vec![1], [1, 1]);
        eval!(vec![5; 8], [8, 5, 5, 5, 5, 5, 5, 5, 5]);

        {
            // expected = [253, 4, 1, 7, 7, 7, ...]
            let mut expected = vec![7; 263];
            expected[0] = 253;
            expected[1] = 4;
            expected[2] = 1;

            eval!(vec![7; 260], expected);
        }
    }

    #[test]
    fn bytes_shorter_than_prefix() {
        // Declares 200 bytes but provides 3.
        let data = [200u8, 1, 2, 3];
        assert_matches!(
            Vector::read_bytes(&data[..]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        );
    }

    proptest! {
        #[test]
        fn bytes_roundtrip(bytes in proptest::collection::vec(any::<u8>(), 0..600)) {
            let mut data = vec![];
            Vector::write_bytes(&mut data, &bytes).unwrap();
            prop_assert_eq!(data.len(), Vector::serialized_size_of_u8_vec(&bytes));
            let mut reader = &data[..];
            prop_assert_eq!(Vector::read_bytes(&mut reader).unwrap(), bytes);
            prop_assert!(reader.is_empty());
        }
    }
}
