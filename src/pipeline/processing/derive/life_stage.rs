use crate::config::SourceColumns;
use crate::constants;
use crate::types::Record;

/// Fields the life-stage narrative is built from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifeStageInput {
    pub age_stage: Option<String>,
    pub sex: Option<String>,
    pub age: Option<String>,
}

impl LifeStageInput {
    pub fn from_record(record: &Record, columns: &SourceColumns) -> Self {
        Self {
            age_stage: record.text_owned(&columns.age_stage),
            sex: record.text_owned(constants::SEX),
            age: record.text_owned(&columns.age),
        }
    }
}

/// `"age: 3., adult, female"`: age/stage and sex comma-joined, with the separate
/// age prepended only when the age/stage text does not already mention it.
pub fn derive_life_stage(input: &LifeStageInput) -> Option<String> {
    let mut parts: Vec<String> = [&input.age_stage, &input.sex]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

    if let Some(age) = &input.age {
        let already_stated = input
            .age_stage
            .as_deref()
            .map_or(false, |stage| stage.contains(age.as_str()));
        if !already_stated {
            parts.insert(0, format!("age: {}.", age));
        }
    }

    let joined = parts.join(", ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(age_stage: Option<&str>, sex: Option<&str>, age: Option<&str>) -> LifeStageInput {
        LifeStageInput {
            age_stage: age_stage.map(str::to_string),
            sex: sex.map(str::to_string),
            age: age.map(str::to_string),
        }
    }

    #[test]
    fn test_stage_and_sex() {
        assert_eq!(
            derive_life_stage(&input(Some("adult"), Some("female"), None)).as_deref(),
            Some("adult, female")
        );
    }

    #[test]
    fn test_distinct_age_is_prepended() {
        assert_eq!(
            derive_life_stage(&input(Some("juvenile"), Some("male"), Some("2"))).as_deref(),
            Some("age: 2., juvenile, male")
        );
    }

    #[test]
    fn test_age_already_in_stage_not_repeated() {
        assert_eq!(
            derive_life_stage(&input(Some("2 yr old"), None, Some("2"))).as_deref(),
            Some("2 yr old")
        );
    }

    #[test]
    fn test_all_missing() {
        assert_eq!(derive_life_stage(&LifeStageInput::default()), None);
        assert_eq!(
            derive_life_stage(&input(None, None, Some("3"))).as_deref(),
            Some("age: 3.")
        );
    }

    #[test]
    fn test_from_record_uses_configured_columns() {
        let record = Record::from_cells(vec![("Age/Stage", "adult"), ("sex", "male"), ("Age", "")]);
        let parsed = LifeStageInput::from_record(&record, &SourceColumns::default());
        assert_eq!(parsed, input(Some("adult"), Some("male"), None));
    }
}
