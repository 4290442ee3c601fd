//! Procedure contracts declared in a TOML manifest.
//!
//! Deployments that add their own database-side procedures describe them in
//! a manifest instead of code:
//!
//! ```toml
//! [[procedure]]
//! name = "posts_per_month"
//! params = ["year"]
//! columns = [
//!     { name = "month", type = "text" },
//!     { name = "total_posts", type = "wide_integer" },
//! ]
//! ```
//!
//! Column order in the manifest is the declared output order.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::procedure::registry::ProcedureRegistry;
use crate::procedure::spec::{ColumnSpec, ProcedureSpec};

/// A parsed manifest file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcedureManifest {
    #[serde(default, rename = "procedure")]
    pub procedures: Vec<ManifestEntry>,
}

/// One `[[procedure]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,

    #[serde(default)]
    pub params: Vec<String>,

    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

impl ProcedureManifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&content)
    }

    /// Parse manifest text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build every declared spec, failing on the first invalid one.
    pub fn specs(&self) -> Result<Vec<ProcedureSpec>> {
        self.procedures.iter().map(ManifestEntry::to_spec).collect()
    }

    /// Build and register every declared spec.
    ///
    /// Specs are all built before any is registered, so an invalid entry
    /// leaves the registry untouched. A name clash is still reported by
    /// [`ProcedureRegistry::register`] and stops registration there.
    pub fn register_into(&self, registry: &mut ProcedureRegistry) -> Result<usize> {
        let specs = self.specs()?;
        let count = specs.len();
        for spec in specs {
            registry.register(spec)?;
        }
        Ok(count)
    }
}

impl ManifestEntry {
    fn to_spec(&self) -> Result<ProcedureSpec> {
        let builder = self
            .params
            .iter()
            .fold(ProcedureSpec::builder(self.name.clone()), |b, p| {
                b.param(p.clone())
            });
        self.columns
            .iter()
            .fold(builder, |b, c| b.column(c.name.clone(), c.semantic_type))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedure::spec::SemanticType;

    const MANIFEST: &str = r#"
[[procedure]]
name = "posts_per_month"
params = ["year"]
columns = [
    { name = "month", type = "text" },
    { name = "total_posts", type = "wide_integer" },
    { name = "first_post_at", type = "optional_timestamp" },
]

[[procedure]]
name = "total_views"
columns = [{ name = "views", type = "arbitrary_precision_number" }]
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = ProcedureManifest::parse(MANIFEST).unwrap();
        let specs = manifest.specs().unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name(), "posts_per_month");
        assert_eq!(specs[0].params(), ["year"]);
        assert_eq!(specs[0].columns()[2].semantic_type, SemanticType::OptionalTimestamp);
        assert_eq!(specs[1].arity(), 0);
    }

    #[test]
    fn test_load_and_register() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("procedures.toml");
        std::fs::write(&path, MANIFEST).unwrap();

        let mut registry = ProcedureRegistry::new();
        let count = ProcedureManifest::load(&path)
            .unwrap()
            .register_into(&mut registry)
            .unwrap();

        assert_eq!(count, 2);
        assert!(registry.contains("total_views"));
    }

    #[test]
    fn test_unknown_type_is_manifest_error() {
        let err = ProcedureManifest::parse(
            r#"
[[procedure]]
name = "p"
columns = [{ name = "x", type = "float" }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }

    #[test]
    fn test_invalid_entry_leaves_registry_untouched() {
        let manifest = ProcedureManifest::parse(
            r#"
[[procedure]]
name = "good"

[[procedure]]
name = "bad name"
"#,
        )
        .unwrap();

        let mut registry = ProcedureRegistry::new();
        let err = manifest.register_into(&mut registry).unwrap_err();
        assert!(matches!(err, Error::InvalidSpec { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = ProcedureManifest::load(Path::new("/nonexistent/procedures.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
