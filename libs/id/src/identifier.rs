//! The binary identifier value type.
//!
//! An [`Identifier`] is a fixed 16-byte payload plus an [`IdKind`] tag. The
//! trailing one or two bytes carry a type discriminator (see
//! [`DiscriminatorWidth`]); every other byte is random.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::IdError;

/// Length in bytes of every identifier payload.
pub const ID_LEN: usize = 16;

/// Length of the canonical string form (lowercase hex, no separators).
pub const ID_HEX_LEN: usize = ID_LEN * 2;

/// Tag distinguishing an identifier from an arbitrary binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum IdKind {
    /// A UUID-layout identifier. Everything this crate mints is of this kind.
    #[default]
    Uuid,
    /// Generic binary data that happens to be 16 bytes long.
    Generic,
}

impl IdKind {
    /// The BSON binary subtype code for this kind.
    #[must_use]
    pub const fn subtype(self) -> u8 {
        match self {
            IdKind::Uuid => 0x04,
            IdKind::Generic => 0x00,
        }
    }
}

/// How many trailing bytes hold the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscriminatorWidth {
    /// One trailing byte, discriminators `0..=255`.
    #[default]
    OneByte,
    /// Two trailing bytes (big-endian), discriminators `0..=65535`.
    TwoBytes,
}

impl DiscriminatorWidth {
    /// Number of trailing bytes used.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            DiscriminatorWidth::OneByte => 1,
            DiscriminatorWidth::TwoBytes => 2,
        }
    }

    /// Largest discriminator this width can carry.
    #[must_use]
    pub const fn max(self) -> u16 {
        match self {
            DiscriminatorWidth::OneByte => u8::MAX as u16,
            DiscriminatorWidth::TwoBytes => u16::MAX,
        }
    }
}

/// A self-describing record identifier.
///
/// Equality, ordering and hashing are by value: two identifiers built from
/// the same bytes and kind compare equal no matter how each was produced.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    bytes: [u8; ID_LEN],
    kind: IdKind,
}

impl Identifier {
    /// Creates a UUID-kind identifier from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self {
            bytes,
            kind: IdKind::Uuid,
        }
    }

    /// Creates a generic-kind identifier from raw bytes.
    #[must_use]
    pub const fn generic(bytes: [u8; ID_LEN]) -> Self {
        Self {
            bytes,
            kind: IdKind::Generic,
        }
    }

    /// Returns the raw payload.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.bytes
    }

    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> IdKind {
        self.kind
    }

    /// Returns true for UUID-kind identifiers.
    #[must_use]
    pub const fn is_uuid(&self) -> bool {
        matches!(self.kind, IdKind::Uuid)
    }

    /// Views the payload as a [`Uuid`].
    #[must_use]
    pub const fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.bytes)
    }

    /// Reads the discriminator from the trailing byte(s).
    #[must_use]
    pub fn discriminator(&self, width: DiscriminatorWidth) -> u16 {
        match width {
            DiscriminatorWidth::OneByte => u16::from(self.bytes[ID_LEN - 1]),
            DiscriminatorWidth::TwoBytes => {
                u16::from_be_bytes([self.bytes[ID_LEN - 2], self.bytes[ID_LEN - 1]])
            }
        }
    }

    /// Returns a copy with the trailing byte(s) overwritten by `value`.
    ///
    /// Fails with [`IdError::DiscriminatorOutOfRange`] when `value` does not
    /// fit in `width`.
    pub fn with_discriminator(
        self,
        value: u16,
        width: DiscriminatorWidth,
    ) -> Result<Self, IdError> {
        if value > width.max() {
            return Err(IdError::DiscriminatorOutOfRange {
                value: u32::from(value),
                max: width.max(),
            });
        }
        Ok(self.stamp(value, width))
    }

    /// Stamps a discriminator already checked against `width`.
    pub(crate) fn stamp(mut self, value: u16, width: DiscriminatorWidth) -> Self {
        let be = value.to_be_bytes();
        match width {
            DiscriminatorWidth::OneByte => self.bytes[ID_LEN - 1] = be[1],
            DiscriminatorWidth::TwoBytes => self.bytes[ID_LEN - 2..].copy_from_slice(&be),
        }
        self
    }

    /// Parses an identifier from a string, raw bytes, or an identifier.
    ///
    /// Parsing an identifier returns it unchanged.
    pub fn parse(input: impl Into<IdentifierInput>) -> Result<Self, IdError> {
        input.into().parse()
    }

    /// Parses the canonical hex form.
    ///
    /// `-` separators are ignored and either hex case is accepted, so the
    /// hyphenated UUID rendering parses too.
    pub fn parse_str(s: &str) -> Result<Self, IdError> {
        let compact: String = s.chars().filter(|c| *c != '-').collect();
        if compact.len() != ID_HEX_LEN {
            return Err(IdError::format(format!(
                "expected {ID_HEX_LEN} hex characters, got {} in '{s}'",
                compact.chars().count()
            )));
        }

        let mut bytes = [0u8; ID_LEN];
        hex::decode_to_slice(&compact, &mut bytes)
            .map_err(|e| IdError::format(format!("'{s}': {e}")))?;

        Ok(Self::from_bytes(bytes))
    }

    /// Parses a raw 16-byte payload.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, IdError> {
        let bytes: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            IdError::format(format!("expected {ID_LEN} bytes, got {}", bytes.len()))
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.bytes))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IdKind::Uuid => write!(f, "Identifier('{self}')"),
            IdKind::Generic => write!(f, "Binary('{self}')"),
        }
    }
}

impl FromStr for Identifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Self::from_bytes(uuid.into_bytes())
    }
}

impl AsRef<[u8]> for Identifier {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Anything a caller may hand over as an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierInput {
    /// An already-decoded identifier.
    Id(Identifier),
    /// Canonical (or hyphenated) hex text.
    Text(String),
    /// A raw binary payload.
    Bytes(Vec<u8>),
}

impl IdentifierInput {
    /// Normalizes the input into an [`Identifier`].
    pub fn parse(self) -> Result<Identifier, IdError> {
        match self {
            IdentifierInput::Id(id) => Ok(id),
            IdentifierInput::Text(s) => Identifier::parse_str(&s),
            IdentifierInput::Bytes(b) => Identifier::parse_bytes(&b),
        }
    }
}

impl From<Identifier> for IdentifierInput {
    fn from(id: Identifier) -> Self {
        IdentifierInput::Id(id)
    }
}

impl From<&Identifier> for IdentifierInput {
    fn from(id: &Identifier) -> Self {
        IdentifierInput::Id(*id)
    }
}

impl From<Uuid> for IdentifierInput {
    fn from(uuid: Uuid) -> Self {
        IdentifierInput::Id(uuid.into())
    }
}

impl From<&str> for IdentifierInput {
    fn from(s: &str) -> Self {
        IdentifierInput::Text(s.to_string())
    }
}

impl From<String> for IdentifierInput {
    fn from(s: String) -> Self {
        IdentifierInput::Text(s)
    }
}

impl From<&String> for IdentifierInput {
    fn from(s: &String) -> Self {
        IdentifierInput::Text(s.clone())
    }
}

impl From<&[u8]> for IdentifierInput {
    fn from(b: &[u8]) -> Self {
        IdentifierInput::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for IdentifierInput {
    fn from(b: Vec<u8>) -> Self {
        IdentifierInput::Bytes(b)
    }
}

impl From<[u8; ID_LEN]> for IdentifierInput {
    fn from(b: [u8; ID_LEN]) -> Self {
        IdentifierInput::Bytes(b.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE: &str = "3333333333334333a33333333333330f";

    #[test]
    fn test_parse_canonical() {
        let id = Identifier::parse(SAMPLE).unwrap();
        assert_eq!(id.to_string(), SAMPLE);
        assert_eq!(id.kind(), IdKind::Uuid);
    }

    #[test]
    fn test_parse_hyphenated_and_uppercase() {
        let id = Identifier::parse("33333333-3333-4333-A333-33333333330F").unwrap();
        assert_eq!(id.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = Identifier::parse("abcd").unwrap_err();
        assert!(err.is_format_error());

        let err = Identifier::parse(format!("{SAMPLE}00")).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_parse_empty() {
        let err = Identifier::parse("").unwrap_err();
        assert!(matches!(err, IdError::InvalidIdentifierFormat { .. }));
    }

    #[test]
    fn test_parse_non_hex() {
        let err = Identifier::parse("3333333333334333y33333333333330f").unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_parse_bytes() {
        let bytes = [7u8; ID_LEN];
        let id = Identifier::parse(&bytes[..]).unwrap();
        assert_eq!(id.as_bytes(), &bytes);

        let err = Identifier::parse(vec![1u8, 2, 3]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_parse_identifier_is_idempotent() {
        let id = Identifier::generic([9u8; ID_LEN]);
        let again = Identifier::parse(id).unwrap();
        assert_eq!(id, again);
        assert_eq!(again.kind(), IdKind::Generic);
    }

    #[test]
    fn test_equality_is_by_value() {
        let a = Identifier::parse(SAMPLE).unwrap();
        let b = Identifier::parse_bytes(a.as_bytes()).unwrap();
        assert_eq!(a, b);

        let set: std::collections::HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_kind_participates_in_equality() {
        let bytes = [5u8; ID_LEN];
        assert_ne!(Identifier::from_bytes(bytes), Identifier::generic(bytes));
        assert_eq!(IdKind::Uuid.subtype(), 0x04);
        assert_eq!(IdKind::Generic.subtype(), 0x00);
    }

    #[test]
    fn test_debug_shows_hex() {
        let id = Identifier::parse(SAMPLE).unwrap();
        assert_eq!(format!("{id:?}"), format!("Identifier('{SAMPLE}')"));

        let raw = Identifier::generic(*id.as_bytes());
        assert_eq!(format!("{raw:?}"), format!("Binary('{SAMPLE}')"));
    }

    #[test]
    fn test_one_byte_discriminator() {
        let id = Identifier::from_bytes([0xaa; ID_LEN])
            .with_discriminator(0x0f, DiscriminatorWidth::OneByte)
            .unwrap();
        assert_eq!(id.discriminator(DiscriminatorWidth::OneByte), 0x0f);
        assert!(id.to_string().ends_with("0f"));
        assert_eq!(id.as_bytes()[ID_LEN - 2], 0xaa);
    }

    #[test]
    fn test_two_byte_discriminator() {
        let id = Identifier::from_bytes([0xaa; ID_LEN])
            .with_discriminator(0x1234, DiscriminatorWidth::TwoBytes)
            .unwrap();
        assert_eq!(id.discriminator(DiscriminatorWidth::TwoBytes), 0x1234);
        assert!(id.to_string().ends_with("1234"));
        assert_eq!(id.as_bytes()[ID_LEN - 3], 0xaa);
    }

    #[test]
    fn test_discriminator_wider_than_width_is_rejected() {
        let base = Identifier::from_bytes([0xaa; ID_LEN]);
        let err = base
            .with_discriminator(0x1234, DiscriminatorWidth::OneByte)
            .unwrap_err();
        assert_eq!(
            err,
            IdError::DiscriminatorOutOfRange {
                value: 0x1234,
                max: 0xff,
            }
        );

        let id = base
            .with_discriminator(0xff, DiscriminatorWidth::OneByte)
            .unwrap();
        assert_eq!(id.discriminator(DiscriminatorWidth::OneByte), 0xff);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let id = Identifier::from(uuid);
        assert_eq!(id.to_uuid(), uuid);
        assert_eq!(Identifier::parse(uuid.to_string()).unwrap(), id);
    }

    #[test]
    fn test_json_roundtrip() {
        let id = Identifier::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{SAMPLE}\""));
        let parsed: Identifier = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_json_rejects_malformed() {
        let result: Result<Identifier, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn prop_parse_inverts_render(bytes in any::<[u8; ID_LEN]>()) {
            let id = Identifier::from_bytes(bytes);
            let rendered = id.to_string();
            prop_assert_eq!(rendered.len(), ID_HEX_LEN);
            prop_assert_eq!(Identifier::parse(rendered).unwrap(), id);
        }

        #[test]
        fn prop_discriminator_roundtrip(bytes in any::<[u8; ID_LEN]>(), value in any::<u16>()) {
            let id = Identifier::from_bytes(bytes)
                .with_discriminator(value, DiscriminatorWidth::TwoBytes)
                .unwrap();
            prop_assert_eq!(id.discriminator(DiscriminatorWidth::TwoBytes), value);
            prop_assert_eq!(&id.as_bytes()[..ID_LEN - 2], &bytes[..ID_LEN - 2]);
        }
    }
}
