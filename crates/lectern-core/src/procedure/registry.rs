use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::procedure::spec::ProcedureSpec;

/// In-memory map of procedure name to its declared contract.
///
/// Specs are shared behind `Arc` so lookups hand out cheap handles.
#[derive(Debug, Clone, Default)]
pub struct ProcedureRegistry {
    specs: BTreeMap<String, Arc<ProcedureSpec>>,
}

impl ProcedureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec. An existing spec with the same name is never replaced.
    pub fn register(&mut self, spec: ProcedureSpec) -> Result<()> {
        if self.specs.contains_key(spec.name()) {
            return Err(Error::AlreadyRegistered {
                procedure: spec.name().to_string(),
            });
        }
        log::debug!("Registered procedure {} ({} params)", spec.name(), spec.arity());
        self.specs.insert(spec.name().to_string(), Arc::new(spec));
        Ok(())
    }

    /// Look up a spec by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<ProcedureSpec>> {
        self.specs
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| Error::NotFound {
                procedure: name.to_string(),
            })
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Registered specs, sorted by name.
    pub fn specs(&self) -> impl Iterator<Item = &ProcedureSpec> {
        self.specs.values().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::spec::SemanticType;

    fn spec(name: &str) -> ProcedureSpec {
        ProcedureSpec::builder(name)
            .column("value", SemanticType::Text)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ProcedureRegistry::new();
        registry.register(spec("b")).unwrap();
        registry.register(spec("a")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("a").unwrap().name(), "a");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ProcedureRegistry::new();
        registry.register(spec("a")).unwrap();

        let replacement = ProcedureSpec::builder("a")
            .column("other", SemanticType::WideInteger)
            .build()
            .unwrap();
        let err = registry.register(replacement).unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered { ref procedure } if procedure == "a"));

        // Original contract is untouched
        assert_eq!(registry.lookup("a").unwrap().columns()[0].name, "value");
    }

    #[test]
    fn test_lookup_missing() {
        let registry = ProcedureRegistry::new();
        assert!(registry.is_empty());
        let err = registry.lookup("missing").unwrap_err();
        assert!(matches!(err, Error::NotFound { ref procedure } if procedure == "missing"));
    }
}
