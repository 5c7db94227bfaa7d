use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// The kind of artifact repository a target points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Model,
    Dataset,
    Code,
}

impl Category {
    /// The wire name of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "MODEL",
            Self::Dataset => "DATASET",
            Self::Code => "CODE",
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MODEL" => Ok(Self::Model),
            "DATASET" => Ok(Self::Dataset),
            "CODE" => Ok(Self::Code),
            other => Err(format!("unknown category '{other}', expected MODEL, DATASET, or CODE")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Category::Model).unwrap(), "\"MODEL\"");
        assert_eq!(serde_json::to_string(&Category::Dataset).unwrap(), "\"DATASET\"");
        assert_eq!(serde_json::to_string(&Category::Code).unwrap(), "\"CODE\"");
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("model".parse::<Category>().unwrap(), Category::Model);
        assert_eq!("Dataset".parse::<Category>().unwrap(), Category::Dataset);
        assert!("weights".parse::<Category>().is_err());
    }

    #[test]
    fn test_round_trip() {
        for category in [Category::Model, Category::Dataset, Category::Code] {
            let json = serde_json::to_string(&category).unwrap();
            let parsed: Category = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, category);
        }
    }
}
