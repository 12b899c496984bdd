//! The wire format of directory entries.
//!
//! A handful of protocol elements, most prominently the post-read response
//! control, carry a full directory entry inside their value. The entry uses
//! the RFC 4511 SearchResultEntry shape: an application-tagged sequence of
//! the entry’s name followed by a partial attribute list.

use core::fmt;
use bytes::Bytes;
use crate::ber::{Error, Reader, Writer};

/// The application type octet of a SearchResultEntry.
pub const TAG_SEARCH_RESULT_ENTRY: u8 = 0x64;

//------------ Entry ---------------------------------------------------------

/// A directory entry: a name and its attributes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entry {
    name: String,
    attributes: Vec<Attribute>,
}

impl Entry {
    /// Creates an entry from a name and its attributes.
    pub fn new(
        name: impl Into<String>,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        Entry {
            name: name.into(),
            attributes: attributes.into_iter().collect(),
        }
    }

    /// Returns the distinguished name of the entry.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attributes of the entry.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }
}

//--- Display

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entry(name={}, attributes=[", self.name)?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            attr.fmt(f)?;
        }
        f.write_str("])")
    }
}

//------------ Attribute -----------------------------------------------------

/// An attribute of an entry: a description and a set of values.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Attribute {
    description: String,
    values: Vec<Bytes>,
}

impl Attribute {
    /// Creates an attribute from its description and values.
    pub fn new(
        description: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Self {
        Attribute {
            description: description.into(),
            values: values
                .into_iter()
                .map(|value| Bytes::from(value.into()))
                .collect(),
        }
    }

    /// Returns the attribute description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the values of the attribute.
    #[must_use]
    pub fn values(&self) -> &[Bytes] {
        &self.values
    }
}

//--- Display

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=[", self.description)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&String::from_utf8_lossy(value))?;
        }
        f.write_str("]")
    }
}

//------------ Encoding and decoding -----------------------------------------

/// Appends the wire encoding of an entry.
pub fn encode_entry(writer: &mut Writer, entry: &Entry) {
    writer.write_start_sequence_tagged(TAG_SEARCH_RESULT_ENTRY);
    writer.write_octet_string(entry.name().as_bytes());
    writer.write_start_sequence();
    for attr in entry.attributes() {
        writer.write_start_sequence();
        writer.write_octet_string(attr.description().as_bytes());
        writer.write_start_set();
        for value in attr.values() {
            writer.write_octet_string(value);
        }
        writer.write_end_sequence();
        writer.write_end_sequence();
    }
    writer.write_end_sequence();
    writer.write_end_sequence();
}

/// Reads the wire encoding of an entry.
pub fn decode_entry(reader: &mut Reader) -> Result<Entry, Error> {
    reader.read_start_sequence_tagged(TAG_SEARCH_RESULT_ENTRY)?;
    let name = reader.read_octet_string_as_string()?;
    let mut attributes = Vec::new();
    reader.read_start_sequence()?;
    while reader.has_next_element() {
        reader.read_start_sequence()?;
        let description = reader.read_octet_string_as_string()?;
        let mut values = Vec::new();
        reader.read_start_sequence_tagged(crate::ber::TAG_SET)?;
        while reader.has_next_element() {
            values.push(reader.read_octet_string()?);
        }
        reader.read_end_sequence()?;
        reader.read_end_sequence()?;
        attributes.push(Attribute { description, values });
    }
    reader.read_end_sequence()?;
    reader.read_end_sequence()?;
    Ok(Entry { name, attributes })
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> Entry {
        Entry::new("uid=kvaughan,ou=People,dc=example,dc=com", [
            Attribute::new("cn", ["Kirsten Vaughan"]),
            Attribute::new("mail", ["kvaughan@example.com"]),
            Attribute::new("objectClass", ["top", "person"]),
        ])
    }

    #[test]
    fn round_trip() {
        let entry = sample();
        let mut writer = Writer::new();
        encode_entry(&mut writer, &entry);
        let bytes = writer.into_bytes();
        let decoded = decode_entry(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn empty_attribute_list() {
        let entry = Entry::new("dc=example,dc=com", []);
        let mut writer = Writer::new();
        encode_entry(&mut writer, &entry);
        let bytes = writer.into_bytes();
        let decoded = decode_entry(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded.name(), "dc=example,dc=com");
        assert!(decoded.attributes().is_empty());
    }

    #[test]
    fn wrong_application_tag() {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        writer.write_octet_string(b"dc=example");
        writer.write_end_sequence();
        let bytes = writer.into_bytes();
        assert!(decode_entry(&mut Reader::new(&bytes)).is_err());
    }

    #[test]
    fn display() {
        let entry = Entry::new("dc=example", [
            Attribute::new("dc", ["example"]),
        ]);
        assert_eq!(
            entry.to_string(),
            "Entry(name=dc=example, attributes=[dc=[example]])"
        );
    }
}
