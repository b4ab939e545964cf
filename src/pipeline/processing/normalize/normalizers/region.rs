use std::collections::{BTreeMap, HashMap};

/// Immutable region-code lookup (two-letter code → full name).
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    names: HashMap<String, String>,
}

impl StateTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let names = entries
            .into_iter()
            .map(|(code, name)| (code.as_ref().trim().to_uppercase(), name.into()))
            .collect();
        Self { names }
    }

    pub fn from_config(states: &BTreeMap<String, String>) -> Self {
        Self::new(states.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    /// Expand a region code, case-insensitively. Unknown codes yield `None`.
    pub fn expand(&self, code: &str) -> Option<&str> {
        self.names
            .get(&code.trim().to_uppercase())
            .map(String::as_str)
    }
}

/// Title-case each whitespace-separated word (`"SEVIER county"` → `"Sevier County"`).
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
