//! Composing BER encoded data.

use bytes::Bytes;
use super::{
    TAG_BOOLEAN, TAG_ENUMERATED, TAG_INTEGER, TAG_OCTET_STRING,
    TAG_SEQUENCE, TAG_SET,
};

//------------ Writer --------------------------------------------------------

/// A writer that appends BER elements to a growable byte buffer.
///
/// All lengths are encoded in definite form, using the short form where the
/// content is shorter than 128 octets and the minimal long form otherwise.
/// Constructed elements are written via [`write_start_sequence`] and
/// [`write_end_sequence`]; the length octets are patched in when the
/// sequence is closed.
///
/// Writing cannot fail short of memory exhaustion, so none of the methods
/// return a result.
///
/// [`write_start_sequence`]: Self::write_start_sequence
/// [`write_end_sequence`]: Self::write_end_sequence
#[derive(Clone, Debug, Default)]
pub struct Writer {
    /// The encoded data so far.
    buf: Vec<u8>,

    /// Offsets of the length placeholder of each open sequence.
    stack: Vec<usize>,
}

impl Writer {
    /// Creates a new, empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the data written so far.
    ///
    /// # Panics
    ///
    /// The method panics if a sequence is still open.
    pub fn as_slice(&self) -> &[u8] {
        assert!(self.stack.is_empty(), "unbalanced BER sequence");
        &self.buf
    }

    /// Freezes the writer into an immutable byte sequence.
    ///
    /// # Panics
    ///
    /// The method panics if a sequence is still open.
    pub fn into_bytes(self) -> Bytes {
        assert!(self.stack.is_empty(), "unbalanced BER sequence");
        Bytes::from(self.buf)
    }

    /// Appends a BOOLEAN element.
    pub fn write_boolean(&mut self, value: bool) {
        self.buf.push(TAG_BOOLEAN);
        self.buf.push(1);
        self.buf.push(if value { 0xFF } else { 0x00 });
    }

    /// Appends an INTEGER element.
    pub fn write_integer(&mut self, value: i64) {
        self.write_integer_tagged(TAG_INTEGER, value)
    }

    /// Appends an ENUMERATED element.
    pub fn write_enumerated(&mut self, value: i64) {
        self.write_integer_tagged(TAG_ENUMERATED, value)
    }

    /// Appends an integer element with the given type octet.
    ///
    /// The content is the minimal two’s-complement big-endian encoding of
    /// `value`.
    pub fn write_integer_tagged(&mut self, tag: u8, value: i64) {
        let bytes = value.to_be_bytes();
        let mut start = 0;
        while start < 7 {
            match (bytes[start], bytes[start + 1] & 0x80) {
                (0x00, 0x00) | (0xFF, 0x80) => start += 1,
                _ => break,
            }
        }
        self.buf.push(tag);
        self.write_length(8 - start);
        self.buf.extend_from_slice(&bytes[start..]);
    }

    /// Appends an OCTET STRING element.
    pub fn write_octet_string(&mut self, value: &[u8]) {
        self.write_octet_string_tagged(TAG_OCTET_STRING, value)
    }

    /// Appends a string-valued element with the given type octet.
    pub fn write_octet_string_tagged(&mut self, tag: u8, value: &[u8]) {
        self.buf.push(tag);
        self.write_length(value.len());
        self.buf.extend_from_slice(value);
    }

    /// Opens a universal SEQUENCE.
    pub fn write_start_sequence(&mut self) {
        self.write_start_sequence_tagged(TAG_SEQUENCE)
    }

    /// Opens a universal SET.
    pub fn write_start_set(&mut self) {
        self.write_start_sequence_tagged(TAG_SET)
    }

    /// Opens a constructed element with the given type octet.
    pub fn write_start_sequence_tagged(&mut self, tag: u8) {
        self.buf.push(tag);
        self.stack.push(self.buf.len());
        self.buf.push(0);
    }

    /// Closes the innermost open constructed element.
    ///
    /// Patches the element’s length octets which may shift later content to
    /// the right if the long form is required.
    ///
    /// # Panics
    ///
    /// The method panics if no sequence is currently open. That is a
    /// contract violation by the caller, not a data error.
    pub fn write_end_sequence(&mut self) {
        let pos = self.stack.pop().expect("unbalanced BER sequence");
        let len = self.buf.len() - pos - 1;
        if len < 0x80 {
            self.buf[pos] = len as u8;
        }
        else {
            let bytes = (len as u64).to_be_bytes();
            let skip = bytes.iter().take_while(|&&b| b == 0).count();
            self.buf[pos] = 0x80 | (8 - skip) as u8;
            self.buf.splice(pos + 1..pos + 1, bytes[skip..].iter().copied());
        }
    }

    /// Encodes a definite length in short or minimal long form.
    fn write_length(&mut self, len: usize) {
        if len < 0x80 {
            self.buf.push(len as u8);
        }
        else {
            let bytes = (len as u64).to_be_bytes();
            let skip = bytes.iter().take_while(|&&b| b == 0).count();
            self.buf.push(0x80 | (8 - skip) as u8);
            self.buf.extend_from_slice(&bytes[skip..]);
        }
    }
}

//============ Testing =======================================================
