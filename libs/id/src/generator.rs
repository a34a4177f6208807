//! Identifier generation with optional uniqueness checks.

use tracing::{debug, warn};

use crate::codec::IdentifierCodec;
use crate::identifier::Identifier;
use crate::IdError;

/// Environment variable holding the retry cap for unique generation.
pub const MAX_UNIQUE_ATTEMPTS_ENV: &str = "TAGID_MAX_UNIQUE_ATTEMPTS";

/// Generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Upper bound on candidates tried by unique generation. `None` retries
    /// until a free identifier is found.
    pub max_attempts: Option<u32>,
}

impl GeneratorConfig {
    /// Caps unique generation at `max_attempts` candidates.
    ///
    /// A cap of zero means unbounded, the same as `from_env`.
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: (max_attempts > 0).then_some(max_attempts),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Missing, unparsable or zero values leave generation unbounded.
    pub fn from_env() -> Self {
        let max_attempts = std::env::var(MAX_UNIQUE_ATTEMPTS_ENV)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|n| *n > 0);

        Self { max_attempts }
    }
}

/// Produces identifiers, optionally verified against a backing store.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    codec: IdentifierCodec,
    config: GeneratorConfig,
}

impl IdGenerator {
    pub fn new(codec: IdentifierCodec, config: GeneratorConfig) -> Self {
        Self { codec, config }
    }

    pub fn codec(&self) -> &IdentifierCodec {
        &self.codec
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Mints one identifier without any uniqueness check.
    pub fn generate(&self, type_name: &str) -> Identifier {
        self.codec.encode_new(type_name)
    }

    /// Mints candidates until `exists` reports one as unused.
    ///
    /// Candidates are checked one at a time. With a configured cap, fails
    /// with [`IdError::UniqueIdentifierExhausted`] once the cap is spent.
    pub fn generate_unique<F>(&self, type_name: &str, mut exists: F) -> Result<Identifier, IdError>
    where
        F: FnMut(&Identifier) -> bool,
    {
        for (attempt, candidate) in self.candidates(type_name).enumerate() {
            if !exists(&candidate) {
                return Ok(candidate);
            }
            debug!(
                type_name = %type_name,
                identifier = %candidate,
                attempt = attempt + 1,
                "Identifier already in use, retrying"
            );
        }

        Err(self.exhausted(type_name))
    }

    /// Candidate stream honouring the retry cap.
    ///
    /// Unbounded when no cap is configured. Async callers drive their own
    /// existence probe over this and report [`exhausted`](Self::exhausted)
    /// when it ends.
    pub fn candidates<'a>(&'a self, type_name: &'a str) -> Candidates<'a> {
        Candidates {
            codec: &self.codec,
            type_name,
            remaining: self.config.max_attempts,
        }
    }

    /// The error reported when the candidate stream runs dry.
    pub fn exhausted(&self, type_name: &str) -> IdError {
        let attempts = self.config.max_attempts.unwrap_or(0);
        warn!(type_name = %type_name, attempts, "Unique identifier generation exhausted");
        IdError::UniqueIdentifierExhausted {
            type_name: type_name.to_string(),
            attempts,
        }
    }

    /// Keeps a supplied UUID-kind identifier, otherwise mints a new one.
    pub fn adopt_or_generate(&self, type_name: &str, supplied: Option<Identifier>) -> Identifier {
        match supplied {
            Some(id) if id.is_uuid() => id,
            _ => self.generate(type_name),
        }
    }
}

/// Iterator over fresh candidates for one type.
#[derive(Debug)]
pub struct Candidates<'a> {
    codec: &'a IdentifierCodec,
    type_name: &'a str,
    remaining: Option<u32>,
}

impl Iterator for Candidates<'_> {
    type Item = Identifier;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        Some(self.codec.encode_new(self.type_name))
    }
}
