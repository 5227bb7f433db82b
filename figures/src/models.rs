use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Result;

/// Source of an input table for one of the figure pipelines.
pub trait Dataset {
    type Output;

    fn load(&self) -> Result<Self::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    #[serde(rename = "Upregulated")]
    Upregulated,
    #[serde(rename = "Down-regulated")]
    DownRegulated,
    #[serde(rename = "Unchanged")]
    Unchanged,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Upregulated,
        Category::DownRegulated,
        Category::Unchanged,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Upregulated => "Upregulated",
            Category::DownRegulated => "Down-regulated",
            Category::Unchanged => "Unchanged",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upregulated" => Ok(Category::Upregulated),
            "down-regulated" | "downregulated" => Ok(Category::DownRegulated),
            "unchanged" => Ok(Category::Unchanged),
            _ => Err(s.to_string()),
        }
    }
}

/// One point of the rank plot: position after the descending sort plus the
/// index it had in the input vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedPoint {
    pub rank: usize,
    pub value: f64,
    pub category: Category,
    pub source_index: usize,
}
