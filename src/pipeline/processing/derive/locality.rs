use crate::config::SourceColumns;
use crate::constants;
use crate::types::Record;

/// Fields the locality narrative is built from. State and county are read after
/// normalization, so the state is already expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalityInput {
    pub network: Option<String>,
    pub state_province: Option<String>,
    pub county: Option<String>,
    pub locality: Option<String>,
}

impl LocalityInput {
    pub fn from_record(record: &Record, columns: &SourceColumns) -> Self {
        Self {
            network: record.text_owned(&columns.network),
            state_province: record.text_owned(constants::STATE_PROVINCE),
            county: record.text_owned(constants::COUNTY),
            locality: record.text_owned(constants::LOCALITY),
        }
    }
}

/// Network, state and county comma-joined, followed by the original locality text
/// unless it just repeats one of them.
pub fn derive_locality(input: &LocalityInput) -> Option<String> {
    let mut parts: Vec<String> = [&input.network, &input.state_province, &input.county]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    if let Some(locality) = &input.locality {
        if !parts.iter().any(|p| p == locality) {
            parts.push(locality.clone());
        }
    }

    let joined = parts.join(", ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}
