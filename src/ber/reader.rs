//! Parsing BER encoded data.

use core::fmt;
use bytes::Bytes;
use octseq::parse::{Parser, ShortInput};
use super::{TAG_BOOLEAN, TAG_ENUMERATED, TAG_INTEGER, TAG_SEQUENCE};

//------------ Reader --------------------------------------------------------

/// A reader that walks a BER encoded byte buffer.
///
/// The reader keeps a cursor into the buffer plus a stack of the end
/// positions of all currently entered sequences. Every read is bounded by
/// the innermost sequence’s declared length: an element that claims to
/// extend past that boundary is malformed and results in an [`Error`].
///
/// A failed read leaves the cursor position undefined; the reader should
/// not be used further.
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    parser: Parser<'a, [u8]>,

    /// End positions of entered sequences, innermost last.
    ends: Vec<usize>,
}

impl<'a> Reader<'a> {
    /// Creates a reader for the given data.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Reader {
            parser: Parser::from_ref(data),
            ends: Vec::new(),
        }
    }

    /// Returns the position past which the current sequence must not read.
    fn limit(&self) -> usize {
        self.ends
            .last()
            .copied()
            .unwrap_or_else(|| self.parser.pos() + self.parser.remaining())
    }

    /// Returns whether the current sequence has more elements.
    ///
    /// Outside of any sequence, returns whether any input is left.
    #[must_use]
    pub fn has_next_element(&self) -> bool {
        self.parser.pos() < self.limit()
    }

    /// Returns the number of unread octets in the current sequence.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit() - self.parser.pos()
    }

    /// Returns the type octet of the next element without consuming it.
    pub fn peek_type(&self) -> Result<u8, Error> {
        if !self.has_next_element() {
            return Err(Error::ShortInput);
        }
        Ok(self.parser.peek(1)?[0])
    }

    /// Reads a type octet and a definite length.
    ///
    /// Checks that the announced content fits into the current sequence.
    fn read_header(&mut self) -> Result<(u8, usize), Error> {
        if !self.has_next_element() {
            return Err(Error::ShortInput);
        }
        let tag = self.parser.parse_u8()?;
        let first = self.parser.parse_u8()?;
        let len = if first < 0x80 {
            usize::from(first)
        }
        else if first == 0x80 {
            return Err(Error::IndefiniteLength);
        }
        else {
            let count = usize::from(first & 0x7F);
            if count > 8 {
                return Err(Error::BadLength);
            }
            let mut len = 0u64;
            for _ in 0..count {
                len = (len << 8) | u64::from(self.parser.parse_u8()?);
            }
            usize::try_from(len).map_err(|_| Error::BadLength)?
        };
        let end = self.parser.pos().checked_add(len)
            .ok_or(Error::BadLength)?;
        if end > self.limit() {
            return Err(Error::BadLength);
        }
        Ok((tag, len))
    }

    /// Enters a universal SEQUENCE.
    pub fn read_start_sequence(&mut self) -> Result<(), Error> {
        self.read_start_sequence_tagged(TAG_SEQUENCE)
    }

    /// Enters a constructed element with the given type octet.
    pub fn read_start_sequence_tagged(
        &mut self, tag: u8
    ) -> Result<(), Error> {
        let (found, len) = self.read_header()?;
        if found != tag {
            return Err(Error::BadTag { expected: tag, found });
        }
        self.ends.push(self.parser.pos() + len);
        Ok(())
    }

    /// Leaves the innermost entered sequence.
    ///
    /// Any unread elements of the sequence are skipped.
    pub fn read_end_sequence(&mut self) -> Result<(), Error> {
        let end = self.ends.pop().ok_or(Error::NestingMismatch)?;
        if self.parser.pos() < end {
            self.parser.seek(end)?;
        }
        Ok(())
    }

    /// Reads the next element as an octet string.
    ///
    /// The element’s type octet is not checked so that implicitly tagged
    /// string values can be read, too.
    pub fn read_octet_string(&mut self) -> Result<Bytes, Error> {
        let (_, len) = self.read_header()?;
        let octets = Bytes::copy_from_slice(self.parser.peek(len)?);
        self.parser.advance(len)?;
        Ok(octets)
    }

    /// Reads the next element as a UTF-8 string.
    pub fn read_octet_string_as_string(&mut self) -> Result<String, Error> {
        String::from_utf8(self.read_octet_string()?.into())
            .map_err(|_| Error::BadUtf8)
    }

    /// Reads an INTEGER element.
    pub fn read_integer(&mut self) -> Result<i64, Error> {
        self.read_integer_tagged(TAG_INTEGER)
    }

    /// Reads an ENUMERATED element.
    pub fn read_enumerated(&mut self) -> Result<i64, Error> {
        self.read_integer_tagged(TAG_ENUMERATED)
    }

    /// Reads an integer element with the given type octet.
    pub fn read_integer_tagged(&mut self, tag: u8) -> Result<i64, Error> {
        let (found, len) = self.read_header()?;
        if found != tag {
            return Err(Error::BadTag { expected: tag, found });
        }
        if len == 0 || len > 8 {
            return Err(Error::BadLength);
        }
        let mut value = 0i64;
        for i in 0..len {
            let octet = self.parser.parse_u8()?;
            if i == 0 && octet & 0x80 != 0 {
                value = -1;
            }
            value = (value << 8) | i64::from(octet);
        }
        Ok(value)
    }

    /// Reads a BOOLEAN element.
    pub fn read_boolean(&mut self) -> Result<bool, Error> {
        let (found, len) = self.read_header()?;
        if found != TAG_BOOLEAN {
            return Err(Error::BadTag { expected: TAG_BOOLEAN, found });
        }
        if len != 1 {
            return Err(Error::BadLength);
        }
        Ok(self.parser.parse_u8()? != 0)
    }

    /// Skips over the next element, whatever its type.
    pub fn skip_element(&mut self) -> Result<(), Error> {
        let (_, len) = self.read_header()?;
        self.parser.advance(len)?;
        Ok(())
    }
}

//------------ Error ---------------------------------------------------------

/// An error happened while reading BER data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Error {
    /// An attempt was made to read beyond the end of the input or the
    /// current sequence.
    ShortInput,

    /// An element used the indefinite length form.
    IndefiniteLength,

    /// An element’s length was unrepresentable or overran its enclosing
    /// sequence.
    BadLength,

    /// An element did not have the expected type octet.
    BadTag {
        expected: u8,
        found: u8,
    },

    /// A sequence was left that was never entered.
    NestingMismatch,

    /// A string value was not valid UTF-8.
    BadUtf8,

    /// The data did not have the expected form.
    Form(&'static str),
}

//--- From

impl From<ShortInput> for Error {
    fn from(_: ShortInput) -> Self {
        Error::ShortInput
    }
}

//--- Display and Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ShortInput => f.write_str("unexpected end of input"),
            Error::IndefiniteLength => {
                f.write_str("indefinite length encoding not supported")
            }
            Error::BadLength => f.write_str("invalid element length"),
            Error::BadTag { expected, found } => {
                write!(
                    f, "expected element type {:#04X}, found {:#04X}",
                    expected, found
                )
            }
            Error::NestingMismatch => {
                f.write_str("sequence end without matching start")
            }
            Error::BadUtf8 => f.write_str("string value is not valid UTF-8"),
            Error::Form(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ber::Writer;

    #[test]
    fn sequence_walk() {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        writer.write_octet_string(b"cn");
        writer.write_octet_string(b"sn");
        writer.write_end_sequence();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        reader.read_start_sequence().unwrap();
        let mut attrs = Vec::new();
        while reader.has_next_element() {
            attrs.push(reader.read_octet_string_as_string().unwrap());
        }
        reader.read_end_sequence().unwrap();
        assert_eq!(attrs, ["cn", "sn"]);
        assert!(!reader.has_next_element());
    }

    #[test]
    fn integer_round_trip() {
        for value in [0, 1, 127, 128, 255, 256, -1, -129, i64::MAX, i64::MIN]
        {
            let mut writer = Writer::new();
            writer.write_integer(value);
            let bytes = writer.into_bytes();
            assert_eq!(
                Reader::new(&bytes).read_integer().unwrap(),
                value,
                "value {value}"
            );
        }
    }

    #[test]
    fn boolean_round_trip() {
        let mut writer = Writer::new();
        writer.write_boolean(true);
        writer.write_boolean(false);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        assert!(reader.read_boolean().unwrap());
        assert!(!reader.read_boolean().unwrap());
    }

    #[test]
    fn truncated_length() {
        // Sequence announcing four octets of content with only two left.
        let mut reader = Reader::new(b"\x30\x04\x04\x00");
        assert_eq!(
            reader.read_start_sequence(),
            Err(Error::BadLength)
        );
    }

    #[test]
    fn element_overruns_sequence() {
        // Inner octet string claims more content than the sequence holds.
        let mut reader = Reader::new(b"\x30\x04\x04\x05Smith");
        reader.read_start_sequence().unwrap();
        assert_eq!(reader.read_octet_string(), Err(Error::BadLength));
    }

    #[test]
    fn wrong_tag() {
        let mut reader = Reader::new(b"\x04\x01a");
        assert_eq!(
            reader.read_start_sequence(),
            Err(Error::BadTag { expected: 0x30, found: 0x04 })
        );
    }

    #[test]
    fn indefinite_length_rejected() {
        let mut reader = Reader::new(b"\x30\x80\x00\x00");
        assert_eq!(
            reader.read_start_sequence(),
            Err(Error::IndefiniteLength)
        );
    }

    #[test]
    fn huge_length_rejected() {
        // A long form length of 2^64 - 1 must not wrap the bounds check.
        let mut reader = Reader::new(
            b"\x04\x88\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        );
        assert_eq!(reader.read_octet_string(), Err(Error::BadLength));
    }

    #[test]
    fn skip_unknown_element() {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        writer.write_octet_string(b"cn");
        writer.write_integer(17);
        writer.write_boolean(true);
        writer.write_end_sequence();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        reader.read_start_sequence().unwrap();
        assert_eq!(reader.remaining(), 10);
        assert_eq!(reader.read_octet_string_as_string().unwrap(), "cn");
        reader.skip_element().unwrap();
        assert_eq!(reader.remaining(), 3);
        assert!(reader.read_boolean().unwrap());
        assert_eq!(reader.remaining(), 0);
        reader.read_end_sequence().unwrap();
    }

    #[test]
    fn end_skips_residue() {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        writer.write_octet_string(b"skipped");
        writer.write_end_sequence();
        writer.write_boolean(true);
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        reader.read_start_sequence().unwrap();
        reader.read_end_sequence().unwrap();
        assert!(reader.read_boolean().unwrap());
    }

    #[test]
    fn long_form_round_trip() {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        writer.write_octet_string(&[0xAB; 300]);
        writer.write_end_sequence();
        let bytes = writer.into_bytes();

        let mut reader = Reader::new(&bytes);
        reader.read_start_sequence().unwrap();
        let value = reader.read_octet_string().unwrap();
        reader.read_end_sequence().unwrap();
        assert_eq!(value.as_ref(), &[0xAB; 300][..]);
    }
}
