//! Shared fixtures for resolver integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tagid_id::{IdGenerator, Identifier, IdentifierCodec, TypeRegistry};
use tagid_resolver::{BatchResolver, MemoryCollection, Projection, Record, ResolverConfig};
use tracing_subscriber::EnvFilter;

pub const GROUP: &str = "Group";
pub const PERSON: &str = "Person";

/// A stored document with an optional field for projection tests.
#[derive(Debug, Clone, PartialEq)]
pub struct Doc {
    pub id: Identifier,
    pub name: String,
    pub age: Option<u32>,
}

impl Record for Doc {
    fn id(&self) -> Identifier {
        self.id
    }

    fn project(&self, projection: &Projection) -> Self {
        Doc {
            id: self.id,
            name: if projection.contains("name") {
                self.name.clone()
            } else {
                String::new()
            },
            age: if projection.contains("age") {
                self.age
            } else {
                None
            },
        }
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `Group` at discriminator 0, `Person` at 0xf, one collection each.
pub struct Fixture {
    pub registry: Arc<TypeRegistry>,
    pub codec: IdentifierCodec,
    pub groups: Arc<MemoryCollection<Doc>>,
    pub people: Arc<MemoryCollection<Doc>>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();

        let registry = Arc::new(
            TypeRegistry::builder()
                .register(0x0, GROUP)
                .unwrap()
                .register(0xf, PERSON)
                .unwrap()
                .build(),
        );

        Self {
            codec: IdentifierCodec::new(Arc::clone(&registry)),
            registry,
            groups: Arc::new(MemoryCollection::new("groups")),
            people: Arc::new(MemoryCollection::new("people")),
        }
    }

    pub fn resolver(&self, config: ResolverConfig) -> BatchResolver<Doc> {
        BatchResolver::<Doc>::builder(Arc::clone(&self.registry))
            .collection(GROUP, self.groups.clone())
            .collection(PERSON, self.people.clone())
            .config(config)
            .build()
    }

    pub fn generator(&self, codec: IdentifierCodec) -> IdGenerator {
        IdGenerator::new(codec, Default::default())
    }

    pub fn add_group(&self, name: &str) -> Doc {
        let doc = Doc {
            id: self.codec.encode_new(GROUP),
            name: name.to_string(),
            age: None,
        };
        self.groups.insert(doc.clone());
        doc
    }

    pub fn add_person(&self, name: &str, age: u32) -> Doc {
        let doc = Doc {
            id: self.codec.encode_new(PERSON),
            name: name.to_string(),
            age: Some(age),
        };
        self.people.insert(doc.clone());
        doc
    }

    /// A person identifier with no stored record.
    pub fn missing_person(&self) -> Identifier {
        self.codec.encode_new(PERSON)
    }
}
