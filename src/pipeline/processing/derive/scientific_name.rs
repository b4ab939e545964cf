use std::collections::HashMap;
use tracing::{debug, warn};

use crate::app::ports::{NameMatch, NameMatcher};
use crate::config::SourceColumns;
use crate::constants;
use crate::error::NameServiceError;
use crate::types::Record;

/// Name parts plus both catalog numbers for diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScientificNameInput {
    pub genus: Option<String>,
    pub specific_epithet: Option<String>,
    pub subspecies: Option<String>,
    pub variety: Option<String>,
    pub legacy_catalog_number: Option<String>,
    pub target_catalog_number: Option<String>,
}

impl ScientificNameInput {
    pub fn from_record(record: &Record, columns: &SourceColumns) -> Self {
        Self {
            genus: record.text_owned(constants::GENUS),
            specific_epithet: record.text_owned(constants::SPECIFIC_EPITHET),
            subspecies: record.text_owned(&columns.subspecies),
            variety: record.text_owned(&columns.variety),
            legacy_catalog_number: record.text_owned(constants::OTHER_CATALOG_NUMBER),
            target_catalog_number: record.text_owned(constants::CATALOG_NUMBER),
        }
    }

    /// Non-empty name parts joined by single spaces, or `None` if there are none.
    pub fn candidate(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.genus, &self.specific_epithet, &self.subspecies, &self.variety]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedName {
    pub accepted_name: String,
    pub accepted_author: String,
    pub score: f64,
    pub low_confidence: bool,
}

/// Resolves candidate names through a [`NameMatcher`], remembering answers so a
/// name shared by many specimens costs one request per run.
pub struct NameResolver<M: NameMatcher> {
    matcher: M,
    min_confidence: f64,
    cache: HashMap<String, NameMatch>,
    requests: usize,
}

impl<M: NameMatcher> NameResolver<M> {
    pub fn new(matcher: M, min_confidence: f64) -> Self {
        Self { matcher, min_confidence, cache: HashMap::new(), requests: 0 }
    }

    /// Number of calls made to the underlying matcher
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// `Ok(None)` when the record has no name parts to resolve.
    pub fn resolve(&mut self, input: &ScientificNameInput) -> Result<Option<ResolvedName>, NameServiceError> {
        let Some(candidate) = input.candidate() else {
            return Ok(None);
        };

        let found = match self.cache.get(&candidate).cloned() {
            Some(hit) => hit,
            None => {
                self.requests += 1;
                let found = self.matcher.best_match(&candidate)?;
                debug!(%candidate, accepted = %found.accepted_name, score = found.score, "Resolved name");
                self.cache.insert(candidate.clone(), found.clone());
                found
            }
        };

        let low_confidence = found.score < self.min_confidence;
        if low_confidence {
            warn!(
                legacy_catalog_number = input.legacy_catalog_number.as_deref().unwrap_or(""),
                target_catalog_number = input.target_catalog_number.as_deref().unwrap_or(""),
                score = found.score,
                accepted = %found.accepted_name,
                "Low-confidence scientific name match, flag for review"
            );
        }

        Ok(Some(ResolvedName {
            accepted_name: found.accepted_name,
            accepted_author: found.accepted_author,
            score: found.score,
            low_confidence,
        }))
    }
}
