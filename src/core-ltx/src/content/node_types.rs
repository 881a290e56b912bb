use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Deserialize;

/// The open node type system: which types inherit from which, and which types play special roles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeTypes {
    /// `type -> [direct supertypes]`.
    #[serde(default)]
    pub supertypes: BTreeMap<String, Vec<String>>,

    /// Types that mark a home page. Home pages add no URL segment and count as the top of the hierarchy.
    #[serde(default = "default_homepage_types")]
    pub homepage_types: Vec<String>,

    /// Type of link pages pointing at another page or an external URL.
    #[serde(default = "default_shortcut_type")]
    pub shortcut_type: String,
}

impl Default for NodeTypes {
    fn default() -> Self {
        Self {
            supertypes: BTreeMap::new(),
            homepage_types: default_homepage_types(),
            shortcut_type: default_shortcut_type(),
        }
    }
}

fn default_homepage_types() -> Vec<String> {
    vec!["Homepage".to_string()]
}

fn default_shortcut_type() -> String {
    "Shortcut".to_string()
}

impl NodeTypes {
    /// True when `node_type` is `target` or (transitively) inherits from it.
    pub fn is_a(&self, node_type: &str, target: &str) -> bool {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([node_type]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                queue.extend(parents.iter().map(String::as_str));
            }
        }
        false
    }

    pub fn is_any<S: AsRef<str>>(&self, node_type: &str, targets: &[S]) -> bool {
        targets.iter().any(|t| self.is_a(node_type, t.as_ref()))
    }

    pub fn is_homepage_type(&self, node_type: &str) -> bool {
        self.is_any(node_type, &self.homepage_types)
    }

    pub fn is_shortcut_type(&self, node_type: &str) -> bool {
        self.is_a(node_type, &self.shortcut_type)
    }
}
