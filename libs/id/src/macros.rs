//! Macros for declaring registrable record types.

/// Implements [`RecordType`](crate::RecordType) for a record type.
///
/// The type name defaults to the Rust identifier; pass a string literal to
/// override it. Omitting the discriminator leaves the type unregistered, so
/// its identifiers carry the registry's default discriminator.
///
/// # Example
///
/// ```ignore
/// record_type!(Group, 0x0);
/// record_type!(Person, "people.Person", 0xf);
/// record_type!(AuditEntry);
///
/// let registry = TypeRegistry::builder()
///     .register_type::<Group>()?
///     .register_type::<Person>()?
///     .build();
/// ```
#[macro_export]
macro_rules! record_type {
    ($ty:ty, $name:literal, $discriminator:expr) => {
        impl $crate::RecordType for $ty {
            const TYPE_NAME: &'static str = $name;
            const DISCRIMINATOR: Option<u32> = Some($discriminator);
        }
    };
    ($ty:ident, $discriminator:expr) => {
        impl $crate::RecordType for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const DISCRIMINATOR: Option<u32> = Some($discriminator);
        }
    };
    ($ty:ident) => {
        impl $crate::RecordType for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);
            const DISCRIMINATOR: Option<u32> = None;
        }
    };
}
