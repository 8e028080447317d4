//! Content kinds: what a request asks for and what a valid answer looks like.
//!
//! A [`ContentKind`] binds a name to its output [`Schema`] and to the
//! [`Synthesizer`] used when every provider fails. Request handlers pick a
//! kind; the orchestrator never branches on kind names itself.
//!
//! Built-in kinds:
//! - [`practice_question`]: one multiple-choice question
//! - [`key_points`]: a title, exactly three key points and a summary
//! - [`career_paths`]: at least three careers matched to interests

mod career_paths;
mod key_points;
mod practice_question;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::fallback::Synthesizer;
use crate::schema::Schema;
use crate::types::Parameters;

pub use career_paths::career_paths;
pub use key_points::key_points;
pub use practice_question::practice_question;

/// A named output contract plus its fallback synthesizer.
pub struct ContentKind {
    name: String,
    schema: Schema,
    synthesizer: Arc<dyn Synthesizer>,
}

impl ContentKind {
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        synthesizer: impl Synthesizer + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            synthesizer: Arc::new(synthesizer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Placeholder content for `parameters`.
    pub fn synthesize(&self, parameters: &Parameters) -> serde_json::Value {
        self.synthesizer.synthesize(parameters)
    }
}

impl fmt::Debug for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentKind")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Lookup of content kinds by name.
#[derive(Debug, Clone, Default)]
pub struct KindCatalog {
    kinds: HashMap<String, Arc<ContentKind>>,
}

impl KindCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in kind.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(practice_question());
        catalog.register(key_points());
        catalog.register(career_paths());
        catalog
    }

    /// Add or replace a kind.
    pub fn register(&mut self, kind: Arc<ContentKind>) {
        self.kinds.insert(kind.name().to_string(), kind);
    }

    pub fn get(&self, name: &str) -> Option<Arc<ContentKind>> {
        self.kinds.get(name).cloned()
    }

    /// Registered kind names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
