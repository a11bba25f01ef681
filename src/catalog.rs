use std::fmt::{Display, Formatter};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const SUGGESTED_OWNERS: [&str; 7] = [
    "Alejandro",
    "Isabella",
    "Juan Pablo",
    "Kerelin",
    "Marcos",
    "Naced",
    "Natalia",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Mail,
    CulturalGroups,
    Event,
    Report,
    Meeting,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Mail,
        Category::CulturalGroups,
        Category::Event,
        Category::Report,
        Category::Meeting,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Mail => "mail",
            Category::CulturalGroups => "cultural-groups",
            Category::Event => "event",
            Category::Report => "report",
            Category::Meeting => "meeting",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Mail => "Mail",
            Category::CulturalGroups => "Cultural groups",
            Category::Event => "Event",
            Category::Report => "Report",
            Category::Meeting => "Meeting",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == key)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Owner names offered by the entry form; owners are free text, so this is a
/// suggestion list and never used to reject an entry.
pub fn suggested_owners() -> Vec<String> {
    SUGGESTED_OWNERS
        .iter()
        .map(|owner| owner.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Category, suggested_owners};

    #[test]
    fn keys_round_trip_through_from_key() {
        for category in Category::ALL {
            assert_eq!(Category::from_key(category.key()), Some(category));
        }
        assert_eq!(Category::from_key("reunion"), None);
    }

    #[test]
    fn serializes_with_kebab_case_keys() {
        let encoded = serde_json::to_string(&Category::CulturalGroups).expect("encode");
        assert_eq!(encoded, "\"cultural-groups\"");
        let decoded: Category = serde_json::from_str("\"meeting\"").expect("decode");
        assert_eq!(decoded, Category::Meeting);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(Category::Mail.label(), "Mail");
        assert_eq!(Category::CulturalGroups.to_string(), "Cultural groups");
    }

    #[test]
    fn suggests_the_team_owners() {
        let owners = suggested_owners();
        assert_eq!(owners.len(), 7);
        assert_eq!(owners[2], "Juan Pablo");
    }
}
