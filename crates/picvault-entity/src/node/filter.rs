//! Listing filters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::Node;

/// Which children a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFilter {
    /// Every non-trashed node.
    #[default]
    Active,
    /// Starred, non-trashed nodes.
    Starred,
    /// Trashed nodes only.
    Trashed,
}

impl ListFilter {
    /// Whether `node` passes this filter.
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Active => !node.is_trashed,
            Self::Starred => node.is_starred && !node.is_trashed,
            Self::Trashed => node.is_trashed,
        }
    }

    /// Lowercase name as used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Starred => "starred",
            Self::Trashed => "trashed",
        }
    }
}

impl fmt::Display for ListFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" | "all" => Ok(Self::Active),
            "starred" => Ok(Self::Starred),
            "trashed" | "trash" => Ok(Self::Trashed),
            other => Err(format!("Unknown list filter: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::model::NewNode;

    #[test]
    fn test_filter_matrix() {
        let mut node = NewNode::folder("o", None, "a".into()).into_node("/a".into());
        assert!(ListFilter::Active.matches(&node));
        assert!(!ListFilter::Starred.matches(&node));

        node.is_starred = true;
        assert!(ListFilter::Starred.matches(&node));

        node.is_trashed = true;
        assert!(!ListFilter::Active.matches(&node));
        assert!(!ListFilter::Starred.matches(&node));
        assert!(ListFilter::Trashed.matches(&node));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("trash".parse::<ListFilter>(), Ok(ListFilter::Trashed));
        assert_eq!("ALL".parse::<ListFilter>(), Ok(ListFilter::Active));
        assert!("recent".parse::<ListFilter>().is_err());
    }
}
