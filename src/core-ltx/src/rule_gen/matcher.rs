//! Declarative page predicates used by categories, groups and exclusions.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::errors::{LlmsGenError, Result};
use crate::content::{PageContext, PageId};

/// One predicate over a page. Rules never change the page they look at.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatchRule {
    /// Any pattern matches the root-relative page path.
    Path {
        #[serde(default)]
        patterns: Vec<String>,
    },
    /// The page type is, or inherits from, any listed type.
    Type {
        #[serde(default)]
        types: Vec<String>,
    },
    Property {
        #[serde(default)]
        property: String,
        #[serde(default)]
        operator: PropertyOperator,
        #[serde(default)]
        values: Vec<Value>,
    },
    ParentRelation {
        #[serde(default)]
        relation: Relation,
        /// Ancestor types for `hasParent`.
        #[serde(default)]
        types: Vec<String>,
        /// Comparison for `depth`.
        #[serde(default)]
        operator: DepthComparison,
        #[serde(default)]
        depth: usize,
    },
    Always,
    Never,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyOperator {
    Exists,
    Equals,
    Contains,
    #[default]
    In,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Relation {
    DirectChild,
    HasParent,
    Depth,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepthComparison {
    #[default]
    Equals,
    GreaterThan,
    LessThan,
    #[serde(other)]
    Unknown,
}

/// Evaluates `rule` against a page. Any failure is logged and counts as "no match".
pub fn matches(ctx: &PageContext<'_>, id: PageId, rule: &MatchRule) -> bool {
    match try_matches(ctx, id, rule) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(
                "[page: {}, language: {}] rule {:?} does not match: {}",
                ctx.page(id).identifier,
                ctx.language.id,
                rule,
                e
            );
            false
        }
    }
}

/// OR over `rules`. An empty rule list matches nothing.
pub fn matches_any(ctx: &PageContext<'_>, id: PageId, rules: &[MatchRule]) -> bool {
    rules.iter().any(|rule| matches(ctx, id, rule))
}

pub fn try_matches(ctx: &PageContext<'_>, id: PageId, rule: &MatchRule) -> Result<bool> {
    match rule {
        MatchRule::Path { patterns } => {
            let path = ctx.path(id);
            for pattern in patterns {
                if path_matches(pattern, &path)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        MatchRule::Type { types } => Ok(ctx.types.is_any(&ctx.page(id).node_type, types)),
        MatchRule::Property {
            property,
            operator,
            values,
        } => {
            if property.trim().is_empty() {
                return Err(LlmsGenError::MissingPropertyName);
            }
            property_matches(ctx.properties(id).get(property), *operator, values)
        }
        MatchRule::ParentRelation {
            relation,
            types,
            operator,
            depth,
        } => match relation {
            Relation::DirectChild => Ok(ctx
                .tree
                .parent(id)
                .is_some_and(|parent| ctx.is_root_or_homepage(parent))),
            Relation::HasParent => {
                let root = ctx.tree.root();
                Ok(ctx
                    .tree
                    .ancestors(id)
                    .take_while(|a| *a != root)
                    .any(|a| ctx.types.is_any(&ctx.page(a).node_type, types)))
            }
            Relation::Depth => {
                let actual = ctx.depth(id);
                match operator {
                    DepthComparison::Equals => Ok(actual == *depth),
                    DepthComparison::GreaterThan => Ok(actual > *depth),
                    DepthComparison::LessThan => Ok(actual < *depth),
                    DepthComparison::Unknown => Err(LlmsGenError::UnknownRuleParameter("depth comparison")),
                }
            }
            Relation::Unknown => Err(LlmsGenError::UnknownRuleParameter("parent relation")),
        },
        MatchRule::Always => Ok(true),
        MatchRule::Never => Ok(false),
        MatchRule::Unknown => Err(LlmsGenError::UnknownRule),
    }
}

/// `*` patterns are case-insensitive anchored wildcards; anything else is a case-insensitive substring.
pub fn path_matches(pattern: &str, path: &str) -> Result<bool> {
    if pattern.is_empty() {
        return Ok(false);
    }
    if pattern.contains('*') {
        let body: Vec<String> = pattern.split('*').map(regex::escape).collect();
        let re = Regex::new(&format!("(?i)^{}$", body.join(".*")))?;
        Ok(re.is_match(path))
    } else {
        Ok(path.to_lowercase().contains(&pattern.to_lowercase()))
    }
}

fn property_matches(actual: Option<&Value>, operator: PropertyOperator, expected: &[Value]) -> Result<bool> {
    let Some(actual) = actual else {
        return match operator {
            PropertyOperator::Unknown => Err(LlmsGenError::UnknownRuleParameter("property operator")),
            _ => Ok(false),
        };
    };
    match operator {
        PropertyOperator::Exists => Ok(match actual {
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(fields) => !fields.is_empty(),
            _ => true,
        }),
        PropertyOperator::Equals => Ok(any_element(actual, |v| expected.contains(v))),
        PropertyOperator::Contains => Ok(any_element(actual, |v| {
            let Some(haystack) = v.as_str() else {
                return false;
            };
            let haystack = haystack.to_lowercase();
            expected
                .iter()
                .filter_map(Value::as_str)
                .any(|needle| haystack.contains(&needle.to_lowercase()))
        })),
        PropertyOperator::In => Ok(any_element(actual, |v| {
            let Some(key) = loose_key(v) else {
                return false;
            };
            expected.iter().filter_map(loose_key).any(|k| k == key)
        })),
        PropertyOperator::Unknown => Err(LlmsGenError::UnknownRuleParameter("property operator")),
    }
}

/// Array-valued properties match when any element does.
fn any_element(value: &Value, pred: impl Fn(&Value) -> bool) -> bool {
    match value {
        Value::Array(items) => items.iter().any(&pred),
        other => pred(other),
    }
}

/// Comparison key for loose membership: booleans, numbers and numeric strings compare by value.
fn loose_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => n.as_f64().map(|f| f.to_string()),
        Value::String(s) => Some(
            s.trim()
                .parse::<f64>()
                .map(|f| f.to_string())
                .unwrap_or_else(|_| s.clone()),
        ),
        other => Some(other.to_string()),
    }
}
