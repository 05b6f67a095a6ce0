use serde::{Deserialize, Serialize};

/// Entity categories the pipeline ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Location,
    Date,
}

impl EntityType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Location => "location",
            Self::Date => "date",
        }
    }

    /// Recognizer labels that feed this category. `GPE` and `LOC` are treated
    /// identically for locations.
    #[must_use]
    pub fn labels(&self) -> &'static [EntityLabel] {
        match self {
            Self::Person => &[EntityLabel::Per],
            Self::Location => &[EntityLabel::Gpe, EntityLabel::Loc],
            Self::Date => &[EntityLabel::Date],
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "person" => Ok(Self::Person),
            "location" => Ok(Self::Location),
            "date" => Ok(Self::Date),
            _ => Err(crate::Error::InvalidEntityLabel(s.to_string())),
        }
    }
}

/// Tag attached to a span by a named-entity recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Per,
    Loc,
    Gpe,
    Org,
    Date,
}

impl EntityLabel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Per => "PER",
            Self::Loc => "LOC",
            Self::Gpe => "GPE",
            Self::Org => "ORG",
            Self::Date => "DATE",
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PER" | "PERSON" => Ok(Self::Per),
            "LOC" => Ok(Self::Loc),
            "GPE" => Ok(Self::Gpe),
            "ORG" => Ok(Self::Org),
            "DATE" => Ok(Self::Date),
            _ => Err(crate::Error::InvalidEntityLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntity {
    pub name: String,
    pub count: usize,
}

impl RankedEntity {
    #[must_use]
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Entities ordered by mention count, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedEntityList(Vec<RankedEntity>);

impl RankedEntityList {
    /// Sorts by count descending. The sort is stable, so equal counts keep the
    /// order they arrive in.
    #[must_use]
    pub fn from_counts(entries: Vec<(String, usize)>) -> Self {
        let mut ranked: Vec<RankedEntity> = entries
            .into_iter()
            .map(|(name, count)| RankedEntity::new(name, count))
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        Self(ranked)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedEntity> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RankedEntity] {
        &self.0
    }

    /// The first `n` entries, as callers use when building prompts.
    #[must_use]
    pub fn top(&self, n: usize) -> &[RankedEntity] {
        &self.0[..n.min(self.0.len())]
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.name.as_str()).collect()
    }

    #[must_use]
    pub fn total_mentions(&self) -> usize {
        self.0.iter().map(|e| e.count).sum()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RankedEntity> {
        self.0.iter().find(|e| e.name == name)
    }
}

impl<'a> IntoIterator for &'a RankedEntityList {
    type Item = &'a RankedEntity;
    type IntoIter = std::slice::Iter<'a, RankedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
