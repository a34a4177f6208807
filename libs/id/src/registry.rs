//! Discriminator registry.
//!
//! Registration happens once, during setup, through a [`RegistryBuilder`].
//! The builder keeps a single `discriminator -> type name` table; [`build`]
//! derives both lookup directions from it and returns an immutable
//! [`TypeRegistry`] that can be shared (usually behind an `Arc`) and read
//! from any thread without locking.
//!
//! Discriminators are keyed by the concrete type name. Types that share a
//! backing collection still register separately.
//!
//! [`build`]: RegistryBuilder::build

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::identifier::DiscriminatorWidth;
use crate::IdError;

/// A record type that can be registered by its Rust type.
///
/// Usually implemented through [`record_type!`](crate::record_type).
pub trait RecordType {
    /// Name the registry and the resolver know this type by.
    const TYPE_NAME: &'static str;

    /// Discriminator stamped into this type's identifiers, if any.
    const DISCRIMINATOR: Option<u32>;
}

/// One registered `(discriminator, type name)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub discriminator: u16,
    pub type_name: String,
}

/// Collects registrations before the registry is frozen.
///
/// `register` takes `&mut self`, so registrations are serialized by
/// ownership. Share a builder across setup threads through a `Mutex`.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    width: DiscriminatorWidth,
    default_discriminator: u16,
    entries: BTreeMap<u16, String>,
}

impl RegistryBuilder {
    /// Creates an empty builder for the given discriminator width.
    pub fn new(width: DiscriminatorWidth) -> Self {
        Self {
            width,
            default_discriminator: 0,
            entries: BTreeMap::new(),
        }
    }

    /// Sets the discriminator used for types that never registered.
    pub fn default_discriminator(&mut self, value: u32) -> Result<&mut Self, IdError> {
        self.default_discriminator = self.check_range(value)?;
        Ok(self)
    }

    /// Binds `discriminator` to `type_name`.
    ///
    /// Registering the same pair twice is a no-op. Binding a used
    /// discriminator to another type, or a registered type to another
    /// discriminator, fails.
    pub fn register(
        &mut self,
        discriminator: u32,
        type_name: impl Into<String>,
    ) -> Result<&mut Self, IdError> {
        let discriminator = self.check_range(discriminator)?;
        let type_name = type_name.into();

        if let Some(existing) = self.entries.get(&discriminator) {
            if *existing == type_name {
                debug!(discriminator, type_name = %type_name, "Type already registered");
                return Ok(self);
            }
            return Err(IdError::DuplicateDiscriminator {
                discriminator,
                existing: existing.clone(),
                attempted: type_name,
            });
        }

        if let Some((&existing, _)) = self.entries.iter().find(|(_, name)| **name == type_name) {
            return Err(IdError::TypeAlreadyRegistered {
                type_name,
                existing,
                attempted: discriminator,
            });
        }

        debug!(discriminator, type_name = %type_name, "Registered type");
        self.entries.insert(discriminator, type_name);
        Ok(self)
    }

    /// Registers a [`RecordType`]. Types without a discriminator are skipped
    /// and will mint identifiers with the default discriminator.
    pub fn register_type<T: RecordType>(&mut self) -> Result<&mut Self, IdError> {
        match T::DISCRIMINATOR {
            Some(discriminator) => self.register(discriminator, T::TYPE_NAME),
            None => Ok(self),
        }
    }

    /// Freezes the registrations.
    pub fn build(&self) -> TypeRegistry {
        let by_type = self
            .entries
            .iter()
            .map(|(&discriminator, name)| (name.clone(), discriminator))
            .collect();

        TypeRegistry {
            width: self.width,
            default_discriminator: self.default_discriminator,
            by_discriminator: self.entries.clone(),
            by_type,
        }
    }

    fn check_range(&self, value: u32) -> Result<u16, IdError> {
        let max = self.width.max();
        if value > u32::from(max) {
            return Err(IdError::DiscriminatorOutOfRange { value, max });
        }
        Ok(value as u16)
    }
}

/// Immutable bidirectional `discriminator <-> type name` map.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    width: DiscriminatorWidth,
    default_discriminator: u16,
    by_discriminator: BTreeMap<u16, String>,
    by_type: HashMap<String, u16>,
}

impl TypeRegistry {
    /// Starts a one-byte registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Type bound to `discriminator`, if any.
    pub fn type_name_for(&self, discriminator: u16) -> Option<&str> {
        self.by_discriminator.get(&discriminator).map(String::as_str)
    }

    /// Discriminator bound to `type_name`, if any.
    pub fn discriminator_for(&self, type_name: &str) -> Option<u16> {
        self.by_type.get(type_name).copied()
    }

    pub fn width(&self) -> DiscriminatorWidth {
        self.width
    }

    pub fn default_discriminator(&self) -> u16 {
        self.default_discriminator
    }

    pub fn len(&self) -> usize {
        self.by_discriminator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_discriminator.is_empty()
    }

    /// All registrations, ordered by discriminator.
    pub fn registrations(&self) -> impl Iterator<Item = Registration> + '_ {
        self.by_discriminator
            .iter()
            .map(|(&discriminator, type_name)| Registration {
                discriminator,
                type_name: type_name.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Group;
    struct Person;
    struct Note;

    crate::record_type!(Group, 0x0);
    crate::record_type!(Person, "people.Person", 0xf);
    crate::record_type!(Note);

    #[test]
    fn test_lookup_both_directions() {
        let registry = TypeRegistry::builder()
            .register(0, "Alpha")
            .unwrap()
            .register(15, "Beta")
            .unwrap()
            .build();

        assert_eq!(registry.type_name_for(0), Some("Alpha"));
        assert_eq!(registry.type_name_for(15), Some("Beta"));
        assert_eq!(registry.type_name_for(1), None);
        assert_eq!(registry.discriminator_for("Beta"), Some(15));
        assert_eq!(registry.discriminator_for("Gamma"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_discriminator_rejected() {
        let mut builder = TypeRegistry::builder();
        builder.register(3, "Alpha").unwrap();

        let err = builder.register(3, "Beta").unwrap_err();
        assert_eq!(
            err,
            IdError::DuplicateDiscriminator {
                discriminator: 3,
                existing: "Alpha".to_string(),
                attempted: "Beta".to_string(),
            }
        );
        assert_eq!(builder.build().type_name_for(3), Some("Alpha"));
    }

    #[test]
    fn test_same_pair_is_idempotent() {
        let mut builder = TypeRegistry::builder();
        builder.register(3, "Alpha").unwrap();
        builder.register(3, "Alpha").unwrap();
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn test_type_rebind_rejected() {
        let mut builder = TypeRegistry::builder();
        builder.register(3, "Alpha").unwrap();

        let err = builder.register(4, "Alpha").unwrap_err();
        assert!(matches!(
            err,
            IdError::TypeAlreadyRegistered { existing: 3, attempted: 4, .. }
        ));
        assert!(err.is_registration_error());
    }

    #[test]
    fn test_out_of_range() {
        let err = TypeRegistry::builder().register(256, "Alpha").unwrap_err();
        assert_eq!(err, IdError::DiscriminatorOutOfRange { value: 256, max: 255 });

        let mut wide = RegistryBuilder::new(DiscriminatorWidth::TwoBytes);
        wide.register(0xffff, "Alpha").unwrap();
        let err = wide.register(0x1_0000, "Beta").unwrap_err();
        assert_eq!(err.reason_code(), "discriminator_out_of_range");
    }

    #[test]
    fn test_default_discriminator_range() {
        let mut builder = TypeRegistry::builder();
        assert!(builder.default_discriminator(300).is_err());
        builder.default_discriminator(0xee).unwrap();
        assert_eq!(builder.build().default_discriminator(), 0xee);
    }

    #[test]
    fn test_register_record_types() {
        let registry = TypeRegistry::builder()
            .register_type::<Group>()
            .unwrap()
            .register_type::<Person>()
            .unwrap()
            .register_type::<Note>()
            .unwrap()
            .build();

        assert_eq!(registry.discriminator_for("Group"), Some(0));
        assert_eq!(registry.discriminator_for("people.Person"), Some(0xf));
        assert_eq!(registry.discriminator_for("Note"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_registrations_ordered() {
        let registry = TypeRegistry::builder()
            .register(9, "Late")
            .unwrap()
            .register(1, "Early")
            .unwrap()
            .build();

        let names: Vec<_> = registry.registrations().map(|r| r.type_name).collect();
        assert_eq!(names, vec!["Early", "Late"]);
    }
}
