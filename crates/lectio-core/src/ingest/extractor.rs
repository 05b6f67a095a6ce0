use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::resolver::{merge_aliases, EntityCounts};
use crate::entity::{EntityLabel, EntityType, RankedEntityList};
use crate::language::{AnalyzedText, LanguageResult, SharedPipeline};

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

static ERA_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,4}\s*(?:a\.C\.|d\.C\.)").expect("valid regex"));

/// Validate a recognizer span as an entity name.
///
/// Strips everything that is neither a word character nor whitespace, trims,
/// and rejects the result unless it starts with an uppercase letter and is
/// longer than one character.
#[must_use]
pub fn clean_name(raw: &str) -> Option<String> {
    let stripped = NON_WORD_RE.replace_all(raw, "");
    let name = stripped.trim();
    let first = name.chars().next()?;

    (first.is_uppercase() && name.chars().count() > 1).then(|| name.to_string())
}

/// Era dates in first-seen order: recognizer `DATE` spans, then regex matches
/// over the raw text.
#[must_use]
pub fn extract_era_dates(doc: &AnalyzedText, text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    doc.entities_labelled(EntityType::Date.labels())
        .map(|span| span.text.as_str())
        .chain(ERA_DATE_RE.find_iter(text).map(|m| m.as_str()))
        .filter(|date| seen.insert(*date))
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub persons: RankedEntityList,
    pub locations: RankedEntityList,
    pub dates: Vec<String>,
}

pub struct EntityExtractor {
    pipeline: SharedPipeline,
    person_labels: Vec<EntityLabel>,
    location_labels: Vec<EntityLabel>,
}

impl EntityExtractor {
    #[must_use]
    pub fn new(pipeline: SharedPipeline) -> Self {
        Self {
            pipeline,
            person_labels: EntityType::Person.labels().to_vec(),
            location_labels: EntityType::Location.labels().to_vec(),
        }
    }

    #[must_use]
    pub fn with_person_labels(mut self, labels: Vec<EntityLabel>) -> Self {
        self.person_labels = labels;
        self
    }

    #[must_use]
    pub fn with_location_labels(mut self, labels: Vec<EntityLabel>) -> Self {
        self.location_labels = labels;
        self
    }

    pub fn extract_persons(&self, text: &str) -> LanguageResult<RankedEntityList> {
        let doc = self.pipeline.analyze(text)?;
        Ok(self.rank(&doc, &self.person_labels))
    }

    pub fn extract_locations(&self, text: &str) -> LanguageResult<RankedEntityList> {
        let doc = self.pipeline.analyze(text)?;
        Ok(self.rank(&doc, &self.location_labels))
    }

    pub fn extract_dates(&self, text: &str) -> LanguageResult<Vec<String>> {
        let doc = self.pipeline.analyze(text)?;
        Ok(extract_era_dates(&doc, text))
    }

    /// Persons, locations and dates from a single analysis pass.
    pub fn extract_all(&self, text: &str) -> LanguageResult<ExtractedEntities> {
        let doc = self.pipeline.analyze(text)?;
        Ok(self.extract_analyzed(&doc, text))
    }

    /// Same as [`extract_all`](Self::extract_all) for a text the caller has
    /// already analyzed. `text` must be the text `doc` was produced from.
    #[must_use]
    pub fn extract_analyzed(&self, doc: &AnalyzedText, text: &str) -> ExtractedEntities {
        let extracted = ExtractedEntities {
            persons: self.rank(doc, &self.person_labels),
            locations: self.rank(doc, &self.location_labels),
            dates: extract_era_dates(doc, text),
        };

        debug!(
            pipeline = self.pipeline.name(),
            spans = doc.entities.len(),
            persons = extracted.persons.len(),
            locations = extracted.locations.len(),
            dates = extracted.dates.len(),
            "Extracted entities"
        );

        extracted
    }

    #[must_use]
    pub fn pipeline(&self) -> &SharedPipeline {
        &self.pipeline
    }

    /// Clean, count, merge and rank the spans carrying one of `labels`.
    #[must_use]
    pub fn rank(&self, doc: &AnalyzedText, labels: &[EntityLabel]) -> RankedEntityList {
        let counts: EntityCounts = doc
            .entities_labelled(labels)
            .filter_map(|span| clean_name(&span.text))
            .collect();

        RankedEntityList::from_counts(merge_aliases(&counts))
    }
}
