use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pagination::PagingMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Documents,
    Projects,
    Books,
    Categories,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Documents,
        ResourceKind::Projects,
        ResourceKind::Books,
        ResourceKind::Categories,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Projects => "projects",
            Self::Books => "books",
            Self::Categories => "categories",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Documents => "documents",
            Self::Projects => "projects/my-projects",
            Self::Books => "books",
            Self::Categories => "categories",
        }
    }

    pub fn filter_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Documents => &["category", "project", "author"],
            Self::Projects => &["status", "priority", "team"],
            Self::Books => &["category", "author", "overdue"],
            Self::Categories => &[],
        }
    }

    // most specific first
    pub fn collection_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Documents => &["documents", "docs", "items", "data", "results"],
            Self::Projects => &["projects", "items", "data", "results"],
            Self::Books => &["books", "items", "data", "results"],
            Self::Categories => &["categories", "items", "data", "results"],
        }
    }

    pub fn default_paging(&self) -> PagingMode {
        match self {
            Self::Documents | Self::Books => PagingMode::Delegated,
            Self::Projects | Self::Categories => PagingMode::Local,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "documents" | "docs" => Ok(Self::Documents),
            "projects" | "my-projects" => Ok(Self::Projects),
            "books" => Ok(Self::Books),
            "categories" => Ok(Self::Categories),
            other => Err(format!(
                "unknown resource '{other}', expected documents, projects, books or categories"
            )),
        }
    }
}
