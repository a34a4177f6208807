//! Minting and decoding typed identifiers.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;
use uuid::Uuid;

use crate::identifier::{Identifier, IdentifierInput, ID_LEN};
use crate::registry::TypeRegistry;
use crate::IdError;

/// Supplies the random payload for new identifiers.
pub trait CandidateSource: Send + Sync {
    /// Returns a fresh candidate payload.
    fn next_candidate(&self) -> [u8; ID_LEN];
}

/// Random version 4 UUID bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSource;

impl CandidateSource for RandomSource {
    fn next_candidate(&self) -> [u8; ID_LEN] {
        Uuid::new_v4().into_bytes()
    }
}

/// Replays a fixed list of payloads, then keeps returning the last one.
///
/// Falls back to [`RandomSource`] when constructed empty. Meant for tests
/// that need to provoke collisions.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    queue: Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    pending: VecDeque<[u8; ID_LEN]>,
    last: Option<[u8; ID_LEN]>,
    drawn: usize,
}

impl ScriptedSource {
    pub fn new(candidates: impl IntoIterator<Item = [u8; ID_LEN]>) -> Self {
        Self {
            queue: Mutex::new(ScriptState {
                pending: candidates.into_iter().collect(),
                last: None,
                drawn: 0,
            }),
        }
    }

    /// Builds a script from canonical hex strings.
    pub fn from_hex<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Result<Self, IdError> {
        let payloads = candidates
            .into_iter()
            .map(|s| Identifier::parse_str(s).map(|id| *id.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(payloads))
    }

    /// Number of candidates handed out so far.
    pub fn drawn(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).drawn
    }
}

impl CandidateSource for ScriptedSource {
    fn next_candidate(&self) -> [u8; ID_LEN] {
        let mut state = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        state.drawn += 1;
        if let Some(next) = state.pending.pop_front() {
            state.last = Some(next);
            return next;
        }
        match state.last {
            Some(last) => last,
            None => RandomSource.next_candidate(),
        }
    }
}

/// Mints identifiers stamped with a type discriminator and reads them back.
#[derive(Clone)]
pub struct IdentifierCodec {
    registry: Arc<TypeRegistry>,
    source: Arc<dyn CandidateSource>,
}

impl IdentifierCodec {
    /// Creates a codec drawing from [`RandomSource`].
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_source(registry, Arc::new(RandomSource))
    }

    pub fn with_source(registry: Arc<TypeRegistry>, source: Arc<dyn CandidateSource>) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Mints a new identifier for `type_name`.
    ///
    /// Unregistered types get the registry's default discriminator. All
    /// other bytes keep the source's randomness.
    pub fn encode_new(&self, type_name: &str) -> Identifier {
        let discriminator = match self.registry.discriminator_for(type_name) {
            Some(discriminator) => discriminator,
            None => {
                let fallback = self.registry.default_discriminator();
                debug!(
                    type_name = %type_name,
                    discriminator = fallback,
                    "Type not registered, using default discriminator"
                );
                fallback
            }
        };

        Identifier::from_bytes(self.source.next_candidate())
            .stamp(discriminator, self.registry.width())
    }

    /// Reads the discriminator carried by `id`.
    pub fn discriminator_of(&self, id: &Identifier) -> u16 {
        id.discriminator(self.registry.width())
    }

    /// Looks up the type owning `id`.
    ///
    /// An unmapped discriminator yields `Ok(None)`, or
    /// [`IdError::UnknownDiscriminator`] when `strict` is set.
    pub fn decode_type(&self, id: &Identifier, strict: bool) -> Result<Option<&str>, IdError> {
        let discriminator = self.discriminator_of(id);
        match self.registry.type_name_for(discriminator) {
            Some(name) => Ok(Some(name)),
            None if strict => Err(IdError::UnknownDiscriminator {
                discriminator,
                identifier: id.to_string(),
            }),
            None => Ok(None),
        }
    }

    /// Same as [`Identifier::parse`].
    pub fn parse(&self, input: impl Into<IdentifierInput>) -> Result<Identifier, IdError> {
        Identifier::parse(input)
    }
}

impl fmt::Debug for IdentifierCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifierCodec")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::DiscriminatorWidth;
    use crate::registry::RegistryBuilder;
    use proptest::prelude::*;

    fn alpha_beta() -> Arc<TypeRegistry> {
        Arc::new(
            TypeRegistry::builder()
                .register(0, "Alpha")
                .unwrap()
                .register(0xf, "Beta")
                .unwrap()
                .build(),
        )
    }

    #[test]
    fn test_encode_stamps_discriminator() {
        let codec = IdentifierCodec::new(alpha_beta());

        let alpha = codec.encode_new("Alpha");
        let beta = codec.encode_new("Beta");

        assert!(alpha.to_string().ends_with('0'));
        assert!(beta.to_string().ends_with('f'));
        assert_eq!(codec.decode_type(&alpha, true).unwrap(), Some("Alpha"));
        assert_eq!(codec.decode_type(&beta, true).unwrap(), Some("Beta"));
    }

    #[test]
    fn test_encode_keeps_random_prefix() {
        let payload = [0x5a; ID_LEN];
        let source = Arc::new(ScriptedSource::new([payload]));
        let codec = IdentifierCodec::with_source(alpha_beta(), source);

        let id = codec.encode_new("Beta");
        assert_eq!(&id.as_bytes()[..ID_LEN - 1], &payload[..ID_LEN - 1]);
        assert_eq!(id.as_bytes()[ID_LEN - 1], 0x0f);
    }

    #[test]
    fn test_unregistered_type_uses_default() {
        let mut builder = TypeRegistry::builder();
        builder.register(1, "Alpha").unwrap();
        builder.default_discriminator(0x42).unwrap();
        let codec = IdentifierCodec::new(Arc::new(builder.build()));

        let id = codec.encode_new("Gamma");
        assert_eq!(codec.discriminator_of(&id), 0x42);
        assert_eq!(codec.decode_type(&id, false).unwrap(), None);
    }

    #[test]
    fn test_strict_decode_of_unknown_discriminator() {
        let codec = IdentifierCodec::new(alpha_beta());
        let id = Identifier::from_bytes([0u8; ID_LEN])
            .with_discriminator(0x33, DiscriminatorWidth::OneByte)
            .unwrap();

        assert_eq!(codec.decode_type(&id, false).unwrap(), None);
        let err = codec.decode_type(&id, true).unwrap_err();
        assert_eq!(
            err,
            IdError::UnknownDiscriminator {
                discriminator: 0x33,
                identifier: id.to_string(),
            }
        );
    }

    #[test]
    fn test_two_byte_registry() {
        let mut builder = RegistryBuilder::new(DiscriminatorWidth::TwoBytes);
        builder.register(0xbeef, "Wide").unwrap();
        let codec = IdentifierCodec::new(Arc::new(builder.build()));

        let id = codec.encode_new("Wide");
        assert!(id.to_string().ends_with("beef"));
        assert_eq!(codec.decode_type(&id, true).unwrap(), Some("Wide"));
    }

    #[test]
    fn test_minted_and_parsed_compare_equal() {
        let codec = IdentifierCodec::new(alpha_beta());
        let minted = codec.encode_new("Alpha");
        let parsed = codec.parse(minted.to_string()).unwrap();
        assert_eq!(minted, parsed);
    }

    #[test]
    fn test_scripted_source_repeats_last() {
        let source = ScriptedSource::new([[1u8; ID_LEN], [2u8; ID_LEN]]);
        assert_eq!(source.next_candidate(), [1u8; ID_LEN]);
        assert_eq!(source.next_candidate(), [2u8; ID_LEN]);
        assert_eq!(source.next_candidate(), [2u8; ID_LEN]);
        assert_eq!(source.drawn(), 3);
    }

    proptest! {
        #[test]
        fn prop_registered_types_decode(
            pairs in proptest::collection::btree_map(0u32..=255, "[A-Z][a-z]{1,8}", 1..16)
        ) {
            let mut builder = TypeRegistry::builder();
            let mut expected = Vec::new();
            for (discriminator, name) in &pairs {
                let type_name = format!("{name}{discriminator}");
                builder.register(*discriminator, type_name.clone()).unwrap();
                expected.push(type_name);
            }
            let codec = IdentifierCodec::new(Arc::new(builder.build()));

            for type_name in &expected {
                let id = codec.encode_new(type_name);
                prop_assert_eq!(codec.decode_type(&id, true).unwrap(), Some(type_name.as_str()));
            }
        }
    }
}
