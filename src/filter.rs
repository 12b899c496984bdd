//! LDAP search filters.
//!
//! A filter is a predicate over directory entries, transmitted in search
//! requests as a BER CHOICE. The set of filter kinds is fixed by RFC 4511,
//! so unlike controls and extended operations they are modelled as a closed
//! enum with an exhaustive codec rather than an OID registry.
//!
//! Constructing a filter never fails; whether an attribute description
//! actually exists is a matter for schema checking elsewhere.

use core::fmt;
use bytes::Bytes;
use crate::ber::{Error, Reader, Writer};

//------------ Choice tags ---------------------------------------------------
//
// The single place where filter kinds map to their BER choice tags. A new
// filter kind registers its tag here and in the two match statements below.

const TAG_AND: u8 = 0xA0;
const TAG_OR: u8 = 0xA1;
const TAG_NOT: u8 = 0xA2;
const TAG_EQUALITY: u8 = 0xA3;
const TAG_SUBSTRINGS: u8 = 0xA4;
const TAG_GREATER_OR_EQUAL: u8 = 0xA5;
const TAG_LESS_OR_EQUAL: u8 = 0xA6;
const TAG_PRESENT: u8 = 0x87;
const TAG_APPROXIMATE: u8 = 0xA8;
const TAG_EXTENSIBLE: u8 = 0xA9;

const TAG_SUBSTRING_INITIAL: u8 = 0x80;
const TAG_SUBSTRING_ANY: u8 = 0x81;
const TAG_SUBSTRING_FINAL: u8 = 0x82;

const TAG_MATCHING_RULE: u8 = 0x81;
const TAG_MATCHING_TYPE: u8 = 0x82;
const TAG_MATCHING_VALUE: u8 = 0x83;
const TAG_DN_ATTRIBUTES: u8 = 0x84;

//------------ Filter --------------------------------------------------------

/// A search filter.
///
/// The operator of a filter is fixed at construction and never changes.
/// Composite filters hold their child filters by value; the leaves are
/// assertions over a single attribute.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter {
    /// All component filters match.
    And(Vec<Filter>),

    /// At least one component filter matches.
    Or(Vec<Filter>),

    /// The component filter does not match.
    Not(Box<Filter>),

    /// The attribute has exactly the assertion value.
    Equality(Assertion),

    /// The attribute orders at or above the assertion value.
    GreaterOrEqual(Assertion),

    /// The attribute orders at or below the assertion value.
    LessOrEqual(Assertion),

    /// The attribute approximately matches the assertion value.
    Approximate(Assertion),

    /// The attribute is present, whatever its value.
    Present(String),

    /// The attribute matches an initial/any/final substring pattern.
    Substrings(Substrings),

    /// An extensible match per RFC 4511 section 4.5.1.7.3.
    Extensible(MatchingRuleAssertion),
}

impl Filter {
    /// Creates an equality filter.
    pub fn equality(
        attribute: impl Into<String>, value: impl Into<Vec<u8>>,
    ) -> Self {
        Filter::Equality(Assertion::new(attribute, value))
    }

    /// Creates a greater-or-equal filter.
    pub fn greater_or_equal(
        attribute: impl Into<String>, value: impl Into<Vec<u8>>,
    ) -> Self {
        Filter::GreaterOrEqual(Assertion::new(attribute, value))
    }

    /// Creates a less-or-equal filter.
    pub fn less_or_equal(
        attribute: impl Into<String>, value: impl Into<Vec<u8>>,
    ) -> Self {
        Filter::LessOrEqual(Assertion::new(attribute, value))
    }

    /// Creates an approximate-match filter.
    pub fn approximate(
        attribute: impl Into<String>, value: impl Into<Vec<u8>>,
    ) -> Self {
        Filter::Approximate(Assertion::new(attribute, value))
    }

    /// Creates a presence filter.
    pub fn present(attribute: impl Into<String>) -> Self {
        Filter::Present(attribute.into())
    }

    /// Appends the wire encoding of the filter.
    pub fn encode(&self, writer: &mut Writer) {
        match *self {
            Filter::And(ref components) => {
                writer.write_start_sequence_tagged(TAG_AND);
                for filter in components {
                    filter.encode(writer);
                }
                writer.write_end_sequence();
            }
            Filter::Or(ref components) => {
                writer.write_start_sequence_tagged(TAG_OR);
                for filter in components {
                    filter.encode(writer);
                }
                writer.write_end_sequence();
            }
            Filter::Not(ref component) => {
                writer.write_start_sequence_tagged(TAG_NOT);
                component.encode(writer);
                writer.write_end_sequence();
            }
            Filter::Equality(ref assertion) => {
                assertion.encode(writer, TAG_EQUALITY)
            }
            Filter::GreaterOrEqual(ref assertion) => {
                assertion.encode(writer, TAG_GREATER_OR_EQUAL)
            }
            Filter::LessOrEqual(ref assertion) => {
                assertion.encode(writer, TAG_LESS_OR_EQUAL)
            }
            Filter::Approximate(ref assertion) => {
                assertion.encode(writer, TAG_APPROXIMATE)
            }
            Filter::Present(ref attribute) => {
                writer.write_octet_string_tagged(
                    TAG_PRESENT, attribute.as_bytes(),
                );
            }
            Filter::Substrings(ref substrings) => substrings.encode(writer),
            Filter::Extensible(ref assertion) => assertion.encode(writer),
        }
    }

    /// Reads a filter from its wire encoding.
    pub fn decode(reader: &mut Reader) -> Result<Self, Error> {
        match reader.peek_type()? {
            TAG_AND => {
                Ok(Filter::And(Self::decode_components(reader, TAG_AND)?))
            }
            TAG_OR => {
                Ok(Filter::Or(Self::decode_components(reader, TAG_OR)?))
            }
            TAG_NOT => {
                reader.read_start_sequence_tagged(TAG_NOT)?;
                let component = Self::decode(reader)?;
                reader.read_end_sequence()?;
                Ok(Filter::Not(Box::new(component)))
            }
            TAG_EQUALITY => {
                Assertion::decode(reader, TAG_EQUALITY)
                    .map(Filter::Equality)
            }
            TAG_GREATER_OR_EQUAL => {
                Assertion::decode(reader, TAG_GREATER_OR_EQUAL)
                    .map(Filter::GreaterOrEqual)
            }
            TAG_LESS_OR_EQUAL => {
                Assertion::decode(reader, TAG_LESS_OR_EQUAL)
                    .map(Filter::LessOrEqual)
            }
            TAG_APPROXIMATE => {
                Assertion::decode(reader, TAG_APPROXIMATE)
                    .map(Filter::Approximate)
            }
            TAG_PRESENT => {
                reader.read_octet_string_as_string().map(Filter::Present)
            }
            TAG_SUBSTRINGS => Substrings::decode(reader).map(
                Filter::Substrings,
            ),
            TAG_EXTENSIBLE => MatchingRuleAssertion::decode(reader).map(
                Filter::Extensible,
            ),
            _ => Err(Error::Form("unknown filter choice tag")),
        }
    }

    fn decode_components(
        reader: &mut Reader, tag: u8,
    ) -> Result<Vec<Filter>, Error> {
        reader.read_start_sequence_tagged(tag)?;
        let mut components = Vec::new();
        while reader.has_next_element() {
            components.push(Self::decode(reader)?);
        }
        reader.read_end_sequence()?;
        Ok(components)
    }
}

//--- Display

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Filter::And(ref components) => {
                write_components(f, "AndFilter", components)
            }
            Filter::Or(ref components) => {
                write_components(f, "OrFilter", components)
            }
            Filter::Not(ref component) => {
                write!(f, "NotFilter(component={})", component)
            }
            Filter::Equality(ref a) => a.write(f, "EqualityFilter"),
            Filter::GreaterOrEqual(ref a) => {
                a.write(f, "GreaterOrEqualFilter")
            }
            Filter::LessOrEqual(ref a) => a.write(f, "LessOrEqualFilter"),
            Filter::Approximate(ref a) => a.write(f, "ApproximateFilter"),
            Filter::Present(ref attribute) => {
                write!(f, "PresentFilter(attributeDescription={})", attribute)
            }
            Filter::Substrings(ref substrings) => substrings.write(f),
            Filter::Extensible(ref assertion) => assertion.write(f),
        }
    }
}

fn write_components(
    f: &mut fmt::Formatter, kind: &str, components: &[Filter],
) -> fmt::Result {
    write!(f, "{}(components=[", kind)?;
    for (i, component) in components.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", component)?;
    }
    f.write_str("])")
}

//------------ Assertion -----------------------------------------------------

/// An attribute description paired with an assertion value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assertion {
    attribute_description: String,
    assertion_value: Bytes,
}

impl Assertion {
    /// Creates an assertion. Never fails.
    pub fn new(
        attribute: impl Into<String>, value: impl Into<Vec<u8>>,
    ) -> Self {
        Assertion {
            attribute_description: attribute.into(),
            assertion_value: Bytes::from(value.into()),
        }
    }

    /// Returns the attribute description.
    #[must_use]
    pub fn attribute_description(&self) -> &str {
        &self.attribute_description
    }

    /// Returns the assertion value.
    #[must_use]
    pub fn assertion_value(&self) -> &Bytes {
        &self.assertion_value
    }

    fn encode(&self, writer: &mut Writer, tag: u8) {
        writer.write_start_sequence_tagged(tag);
        writer.write_octet_string(self.attribute_description.as_bytes());
        writer.write_octet_string(&self.assertion_value);
        writer.write_end_sequence();
    }

    fn decode(reader: &mut Reader, tag: u8) -> Result<Self, Error> {
        reader.read_start_sequence_tagged(tag)?;
        let attribute_description = reader.read_octet_string_as_string()?;
        let assertion_value = reader.read_octet_string()?;
        reader.read_end_sequence()?;
        Ok(Assertion { attribute_description, assertion_value })
    }

    fn write(&self, f: &mut fmt::Formatter, kind: &str) -> fmt::Result {
        write!(
            f, "{}(attributeDescription={}, assertionValue={})",
            kind, self.attribute_description,
            String::from_utf8_lossy(&self.assertion_value)
        )
    }
}

//------------ Substrings ----------------------------------------------------

/// The pattern of a substrings filter.
///
/// At least one of the pieces should be present for the filter to be
/// meaningful, but that is not enforced here.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Substrings {
    attribute_description: String,
    initial: Option<Bytes>,
    any: Vec<Bytes>,
    final_: Option<Bytes>,
}

impl Substrings {
    /// Creates an empty pattern for the given attribute.
    pub fn new(attribute: impl Into<String>) -> Self {
        Substrings {
            attribute_description: attribute.into(),
            ..Default::default()
        }
    }

    /// Sets the initial piece, builder-style.
    #[must_use]
    pub fn with_initial(mut self, initial: impl Into<Vec<u8>>) -> Self {
        self.initial = Some(Bytes::from(initial.into()));
        self
    }

    /// Appends an any piece, builder-style.
    #[must_use]
    pub fn with_any(mut self, any: impl Into<Vec<u8>>) -> Self {
        self.any.push(Bytes::from(any.into()));
        self
    }

    /// Sets the final piece, builder-style.
    #[must_use]
    pub fn with_final(mut self, final_: impl Into<Vec<u8>>) -> Self {
        self.final_ = Some(Bytes::from(final_.into()));
        self
    }

    /// Returns the attribute description.
    #[must_use]
    pub fn attribute_description(&self) -> &str {
        &self.attribute_description
    }

    fn encode(&self, writer: &mut Writer) {
        writer.write_start_sequence_tagged(TAG_SUBSTRINGS);
        writer.write_octet_string(self.attribute_description.as_bytes());
        writer.write_start_sequence();
        if let Some(ref initial) = self.initial {
            writer.write_octet_string_tagged(TAG_SUBSTRING_INITIAL, initial);
        }
        for any in &self.any {
            writer.write_octet_string_tagged(TAG_SUBSTRING_ANY, any);
        }
        if let Some(ref final_) = self.final_ {
            writer.write_octet_string_tagged(TAG_SUBSTRING_FINAL, final_);
        }
        writer.write_end_sequence();
        writer.write_end_sequence();
    }

    fn decode(reader: &mut Reader) -> Result<Self, Error> {
        reader.read_start_sequence_tagged(TAG_SUBSTRINGS)?;
        let attribute_description = reader.read_octet_string_as_string()?;
        let mut substrings = Substrings {
            attribute_description,
            ..Default::default()
        };
        reader.read_start_sequence()?;
        while reader.has_next_element() {
            match reader.peek_type()? {
                TAG_SUBSTRING_INITIAL => {
                    // At most one initial piece, and only at the front.
                    if substrings.initial.is_some()
                        || !substrings.any.is_empty()
                        || substrings.final_.is_some()
                    {
                        return Err(Error::Form(
                            "misplaced initial substring piece",
                        ));
                    }
                    substrings.initial = Some(reader.read_octet_string()?);
                }
                TAG_SUBSTRING_ANY => {
                    if substrings.final_.is_some() {
                        return Err(Error::Form(
                            "misplaced any substring piece",
                        ));
                    }
                    substrings.any.push(reader.read_octet_string()?);
                }
                TAG_SUBSTRING_FINAL => {
                    if substrings.final_.is_some() {
                        return Err(Error::Form(
                            "duplicate final substring piece",
                        ));
                    }
                    substrings.final_ = Some(reader.read_octet_string()?);
                }
                _ => return Err(Error::Form("unknown substring piece tag")),
            }
        }
        reader.read_end_sequence()?;
        reader.read_end_sequence()?;
        Ok(substrings)
    }

    fn write(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "SubstringFilter(attributeDescription={}",
            self.attribute_description
        )?;
        if let Some(ref initial) = self.initial {
            write!(f, ", initial={}", String::from_utf8_lossy(initial))?;
        }
        for any in &self.any {
            write!(f, ", any={}", String::from_utf8_lossy(any))?;
        }
        if let Some(ref final_) = self.final_ {
            write!(f, ", final={}", String::from_utf8_lossy(final_))?;
        }
        f.write_str(")")
    }
}

//------------ MatchingRuleAssertion -----------------------------------------

/// The assertion of an extensible-match filter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MatchingRuleAssertion {
    matching_rule: Option<String>,
    attribute_description: Option<String>,
    match_value: Bytes,
    dn_attributes: bool,
}

impl MatchingRuleAssertion {
    /// Creates an assertion matching the given value.
    pub fn new(match_value: impl Into<Vec<u8>>) -> Self {
        MatchingRuleAssertion {
            match_value: Bytes::from(match_value.into()),
            ..Default::default()
        }
    }

    /// Sets the matching rule ID, builder-style.
    #[must_use]
    pub fn with_matching_rule(mut self, rule: impl Into<String>) -> Self {
        self.matching_rule = Some(rule.into());
        self
    }

    /// Sets the attribute description, builder-style.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute_description = Some(attribute.into());
        self
    }

    /// Requests matching against DN attributes, builder-style.
    #[must_use]
    pub fn with_dn_attributes(mut self) -> Self {
        self.dn_attributes = true;
        self
    }

    fn encode(&self, writer: &mut Writer) {
        writer.write_start_sequence_tagged(TAG_EXTENSIBLE);
        if let Some(ref rule) = self.matching_rule {
            writer.write_octet_string_tagged(
                TAG_MATCHING_RULE, rule.as_bytes(),
            );
        }
        if let Some(ref attribute) = self.attribute_description {
            writer.write_octet_string_tagged(
                TAG_MATCHING_TYPE, attribute.as_bytes(),
            );
        }
        writer.write_octet_string_tagged(
            TAG_MATCHING_VALUE, &self.match_value,
        );
        if self.dn_attributes {
            // DEFAULT FALSE, only encoded when set.
            writer.write_octet_string_tagged(TAG_DN_ATTRIBUTES, &[0xFF]);
        }
        writer.write_end_sequence();
    }

    fn decode(reader: &mut Reader) -> Result<Self, Error> {
        reader.read_start_sequence_tagged(TAG_EXTENSIBLE)?;
        let mut assertion = MatchingRuleAssertion::default();
        if reader.peek_type()? == TAG_MATCHING_RULE {
            assertion.matching_rule =
                Some(reader.read_octet_string_as_string()?);
        }
        if reader.peek_type()? == TAG_MATCHING_TYPE {
            assertion.attribute_description =
                Some(reader.read_octet_string_as_string()?);
        }
        if reader.peek_type()? != TAG_MATCHING_VALUE {
            return Err(Error::Form("extensible match without a value"));
        }
        assertion.match_value = reader.read_octet_string()?;
        if reader.has_next_element() {
            if reader.peek_type()? != TAG_DN_ATTRIBUTES {
                return Err(Error::Form(
                    "unknown extensible match component",
                ));
            }
            let flag = reader.read_octet_string()?;
            assertion.dn_attributes =
                flag.first().copied().unwrap_or(0) != 0;
        }
        reader.read_end_sequence()?;
        Ok(assertion)
    }

    fn write(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ExtensibleFilter(")?;
        if let Some(ref rule) = self.matching_rule {
            write!(f, "matchingRule={}, ", rule)?;
        }
        if let Some(ref attribute) = self.attribute_description {
            write!(f, "attributeDescription={}, ", attribute)?;
        }
        write!(
            f, "matchValue={}, dnAttributes={})",
            String::from_utf8_lossy(&self.match_value), self.dn_attributes
        )
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use rstest::rstest;
    use super::*;

    fn round_trip(filter: &Filter) -> Filter {
        let mut writer = Writer::new();
        filter.encode(&mut writer);
        let bytes = writer.into_bytes();
        let mut reader = Reader::new(&bytes);
        let decoded = Filter::decode(&mut reader).unwrap();
        assert!(!reader.has_next_element());
        decoded
    }

    #[rstest]
    #[case(Filter::equality("cn", "Smith"), 0xA3)]
    #[case(Filter::greater_or_equal("uidNumber", "1000"), 0xA5)]
    #[case(Filter::less_or_equal("cn", "Smith"), 0xA6)]
    #[case(Filter::approximate("sn", "Smyth"), 0xA8)]
    #[case(Filter::present("objectClass"), 0x87)]
    fn choice_tag_and_round_trip(#[case] filter: Filter, #[case] tag: u8) {
        let mut writer = Writer::new();
        filter.encode(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes[0], tag);
        assert_eq!(round_trip(&filter), filter);
    }

    #[test]
    fn less_or_equal_via_generic_decoder() {
        let filter = Filter::less_or_equal("cn", "Smith");
        match round_trip(&filter) {
            Filter::LessOrEqual(assertion) => {
                assert_eq!(assertion.attribute_description(), "cn");
                assert_eq!(assertion.assertion_value().as_ref(), b"Smith");
            }
            other => panic!("decoded as {other}"),
        }
    }

    #[test]
    fn composite_round_trip() {
        let filter = Filter::And(vec![
            Filter::present("objectClass"),
            Filter::Or(vec![
                Filter::equality("cn", "Smith"),
                Filter::Not(Box::new(Filter::less_or_equal("sn", "A"))),
            ]),
        ]);
        assert_eq!(round_trip(&filter), filter);
    }

    #[test]
    fn substrings_round_trip() {
        let filter = Filter::Substrings(
            Substrings::new("cn")
                .with_initial("Jo")
                .with_any("hn")
                .with_final("son"),
        );
        assert_eq!(round_trip(&filter), filter);
    }

    #[test]
    fn repeated_substring_pieces_rejected() {
        fn encode_pieces(pieces: &[(u8, &[u8])]) -> bytes::Bytes {
            let mut writer = Writer::new();
            writer.write_start_sequence_tagged(TAG_SUBSTRINGS);
            writer.write_octet_string(b"cn");
            writer.write_start_sequence();
            for &(tag, piece) in pieces {
                writer.write_octet_string_tagged(tag, piece);
            }
            writer.write_end_sequence();
            writer.write_end_sequence();
            writer.into_bytes()
        }

        // Two initial pieces.
        let bytes = encode_pieces(&[
            (TAG_SUBSTRING_INITIAL, b"Jo"),
            (TAG_SUBSTRING_INITIAL, b"Ja"),
        ]);
        assert_eq!(
            Filter::decode(&mut Reader::new(&bytes)),
            Err(Error::Form("misplaced initial substring piece"))
        );

        // An any piece after the final piece.
        let bytes = encode_pieces(&[
            (TAG_SUBSTRING_FINAL, b"son"),
            (TAG_SUBSTRING_ANY, b"hn"),
        ]);
        assert_eq!(
            Filter::decode(&mut Reader::new(&bytes)),
            Err(Error::Form("misplaced any substring piece"))
        );

        // Two final pieces.
        let bytes = encode_pieces(&[
            (TAG_SUBSTRING_FINAL, b"son"),
            (TAG_SUBSTRING_FINAL, b"sen"),
        ]);
        assert_eq!(
            Filter::decode(&mut Reader::new(&bytes)),
            Err(Error::Form("duplicate final substring piece"))
        );
    }

    #[test]
    fn extensible_round_trip() {
        let filter = Filter::Extensible(
            MatchingRuleAssertion::new("Smith")
                .with_matching_rule("caseIgnoreMatch")
                .with_attribute("sn")
                .with_dn_attributes(),
        );
        assert_eq!(round_trip(&filter), filter);
    }

    #[test]
    fn unknown_choice_tag() {
        let mut reader = Reader::new(b"\x8F\x01x");
        assert_eq!(
            Filter::decode(&mut reader),
            Err(Error::Form("unknown filter choice tag"))
        );
    }

    #[test]
    fn rendering_is_stable() {
        assert_eq!(
            Filter::less_or_equal("cn", "Smith").to_string(),
            "LessOrEqualFilter(attributeDescription=cn, \
             assertionValue=Smith)"
        );
        assert_eq!(
            Filter::present("objectClass").to_string(),
            "PresentFilter(attributeDescription=objectClass)"
        );
        assert_eq!(
            Filter::And(vec![
                Filter::equality("cn", "Smith"),
                Filter::present("sn"),
            ])
            .to_string(),
            "AndFilter(components=[EqualityFilter(attributeDescription=cn, \
             assertionValue=Smith), \
             PresentFilter(attributeDescription=sn)])"
        );
    }
}
