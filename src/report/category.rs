//! The fixed contribution taxonomy.

use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Contribution categories, in report order.
///
/// Serializes to lowercase keys (e.g. `"bugfixes"`). Parsing accepts the
/// common aliases models use for section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Features,
    Bugfixes,
    Docs,
    Refactor,
    Infra,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 5] = [
        Category::Features,
        Category::Bugfixes,
        Category::Docs,
        Category::Refactor,
        Category::Infra,
    ];

    /// Stable machine key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Features => "features",
            Self::Bugfixes => "bugfixes",
            Self::Docs => "docs",
            Self::Refactor => "refactor",
            Self::Infra => "infra",
        }
    }

    /// Human-readable section label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Features => "Features",
            Self::Bugfixes => "Bug Fixes",
            Self::Docs => "Documentation",
            Self::Refactor => "Refactoring",
            Self::Infra => "Infrastructure",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Features => "✨",
            Self::Bugfixes => "🐛",
            Self::Docs => "📚",
            Self::Refactor => "♻️",
            Self::Infra => "🔧",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();

        match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "features" | "feature" | "new features" | "feat" | "feats" => Ok(Self::Features),
            "bugfixes" | "bugfix" | "bug fixes" | "bug fix" | "bugs" | "fixes" | "fix" => {
                Ok(Self::Bugfixes)
            }
            "docs" | "doc" | "documentation" => Ok(Self::Docs),
            "refactor" | "refactors" | "refactoring" | "refactorings" => Ok(Self::Refactor),
            "infra" | "infrastructure" | "ci" | "build" | "tooling" | "ci/cd" => Ok(Self::Infra),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Ordered bullets for each of the five categories.
///
/// Every category is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    buckets: [Vec<String>; 5],
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, bullet: impl Into<String>) {
        self.buckets[category.index()].push(bullet.into());
    }

    pub fn get(&self, category: Category) -> &[String] {
        &self.buckets[category.index()]
    }

    /// Append `other`'s bullets after this map's, category by category.
    pub fn extend_from(&mut self, other: &CategoryMap) {
        for category in Category::ALL {
            self.buckets[category.index()].extend_from_slice(other.get(category));
        }
    }

    /// Iterate categories in report order with their bullets.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Serialize for CategoryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (category, bullets) in self.iter() {
            map.serialize_entry(category.as_str(), bullets)?;
        }
        map.end()
    }
}

/// Lenient: keys that are not categories are skipped, as are values that
/// are not lists and list items that are not strings.
impl<'de> Deserialize<'de> for CategoryMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        #[allow(dead_code)]
        enum Item {
            Text(String),
            Other(IgnoredAny),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        #[allow(dead_code)]
        enum Entry {
            List(Vec<Item>),
            Other(IgnoredAny),
        }

        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategoryMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category names to bullet lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategoryMap, A::Error> {
                let mut map = CategoryMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    let Ok(category) = key.parse::<Category>() else {
                        access.next_value::<IgnoredAny>()?;
                        continue;
                    };
                    if let Entry::List(items) = access.next_value::<Entry>()? {
                        for item in items {
                            if let Item::Text(bullet) = item {
                                map.push(category, bullet);
                            }
                        }
                    }
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}
