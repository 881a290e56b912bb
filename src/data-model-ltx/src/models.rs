use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::SqlType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

// SQL type definition for the custom enum
// Note: snake_case to match the PostgreSQL type name
#[allow(non_camel_case_types)]
#[derive(SqlType, diesel::query_builder::QueryId, Debug, Clone, Copy)]
#[diesel(postgres_type(name = "artifact_name"))]
pub struct Artifact_name;

/// Which of the two generated documents an artifact is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Artifact_name)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactName {
    /// `llms.txt`
    Index,
    /// `llms-full.txt`
    Full,
}

impl ArtifactName {
    pub const ALL: [ArtifactName; 2] = [ArtifactName::Index, ArtifactName::Full];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactName::Index => "index",
            ArtifactName::Full => "full",
        }
    }

    /// Name the artifact is served under.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactName::Index => "llms.txt",
            ArtifactName::Full => "llms-full.txt",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        ArtifactName::ALL
            .into_iter()
            .find(|a| a.file_name() == name.trim_start_matches('/'))
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql<Artifact_name, Pg> for ArtifactName {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Artifact_name, Pg> for ArtifactName {
    fn from_sql(bytes: PgValue) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"index" => Ok(ArtifactName::Index),
            b"full" => Ok(ArtifactName::Full),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

// artifact_hash table model (database representation)
/// Pointer from (artifact, site, dimension) to the hash of the content last stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::artifact_hash)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArtifactHash {
    pub artifact_name: ArtifactName,
    pub site_id: String,
    pub dimension_hash: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dimension value combination an artifact was generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimensionKey {
    /// Every language folded into one document.
    All,
    /// One value per dimension, e.g. `language=de`.
    Values(BTreeMap<String, String>),
}

/// Dimension hash of consolidated artifacts.
pub const ALL_DIMENSIONS: &str = "all";

/// Name of the language dimension.
pub const LANGUAGE_DIMENSION: &str = "language";

impl DimensionKey {
    pub fn language(language: &str) -> Self {
        DimensionKey::Values(BTreeMap::from([(LANGUAGE_DIMENSION.to_string(), language.to_string())]))
    }

    /// `all`, or the hex SHA-256 of the `name=value` pairs in name order joined by `&`.
    pub fn hash(&self) -> String {
        match self {
            DimensionKey::All => ALL_DIMENSIONS.to_string(),
            DimensionKey::Values(values) => {
                let joined = values
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join("&");
                content_hash(&joined)
            }
        }
    }

    /// Composite artifact key `{site}-{dimensionHash}-{artifactName}`, used in logs and reports.
    /// Blobs themselves are addressed by content hash.
    pub fn artifact_key(&self, artifact: ArtifactName, site: &str) -> String {
        format!("{}-{}-{}", site, self.hash(), artifact)
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKey::All => f.write_str(ALL_DIMENSIONS),
            DimensionKey::Values(values) => {
                let pairs: Vec<String> = values.iter().map(|(k, v)| format!("{k}={v}")).collect();
                f.write_str(&pairs.join("&"))
            }
        }
    }
}

/// `"all"`, or the name/value map.
impl Serialize for DimensionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DimensionKey::All => serializer.serialize_str(ALL_DIMENSIONS),
            DimensionKey::Values(values) => values.serialize(serializer),
        }
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes.
pub fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Outcome of storing one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredArtifact {
    pub artifact_name: ArtifactName,
    pub site_id: String,
    pub dimension: DimensionKey,
    pub dimension_hash: String,
    pub content_hash: String,
    /// `{site}-{dimensionHash}-{artifactName}`
    pub key: String,
    /// False when the stored hash was already current.
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_sha256_hex() {
        assert_eq!(
            content_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            content_hash("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_dimension_hash() {
        assert_eq!(DimensionKey::All.hash(), "all");
        assert_eq!(DimensionKey::language("de").hash(), content_hash("language=de"));
        assert_ne!(DimensionKey::language("de").hash(), DimensionKey::language("en").hash());

        let mixed = DimensionKey::Values(BTreeMap::from([
            ("region".to_string(), "eu".to_string()),
            ("language".to_string(), "de".to_string()),
        ]));
        assert_eq!(mixed.hash(), content_hash("language=de&region=eu"));
        assert_eq!(mixed.to_string(), "language=de&region=eu");
    }

    #[test]
    fn test_artifact_key() {
        assert_eq!(
            DimensionKey::All.artifact_key(ArtifactName::Full, "acme"),
            "acme-all-full"
        );
    }

    #[test]
    fn test_artifact_file_names() {
        assert_eq!(ArtifactName::from_file_name("/llms.txt"), Some(ArtifactName::Index));
        assert_eq!(ArtifactName::from_file_name("llms-full.txt"), Some(ArtifactName::Full));
        assert_eq!(ArtifactName::from_file_name("robots.txt"), None);
        assert_eq!(serde_json::to_string(&ArtifactName::Full).unwrap(), "\"full\"");
    }

    #[test]
    fn test_dimension_key_serde() {
        assert_eq!(serde_json::to_string(&DimensionKey::All).unwrap(), "\"all\"");
        assert_eq!(
            serde_json::to_string(&DimensionKey::language("en")).unwrap(),
            r#"{"language":"en"}"#
        );
    }
}
