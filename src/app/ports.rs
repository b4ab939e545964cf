use serde::{Deserialize, Serialize};

use crate::error::NameServiceError;

/// Best match returned by a taxonomic name-matching service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub accepted_name: String,
    pub accepted_author: String,
    /// Confidence in `[0, 1]`
    pub score: f64,
}

/// Resolves a candidate scientific name to its accepted form.
///
/// Implementations block until the service answers or gives up.
pub trait NameMatcher {
    fn best_match(&self, candidate: &str) -> Result<NameMatch, NameServiceError>;
}

impl<T: NameMatcher + ?Sized> NameMatcher for &T {
    fn best_match(&self, candidate: &str) -> Result<NameMatch, NameServiceError> {
        (**self).best_match(candidate)
    }
}

impl<T: NameMatcher + ?Sized> NameMatcher for Box<T> {
    fn best_match(&self, candidate: &str) -> Result<NameMatch, NameServiceError> {
        (**self).best_match(candidate)
    }
}
