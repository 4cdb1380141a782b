use crate::domain::flow::Intent;
use crate::domain::payer::PayerEdit;
use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::io::Read;

/// A parsed script row.
#[derive(Debug, PartialEq, Clone)]
pub enum ScriptStep {
    Intent(Intent),
    /// `lookup_address, <postcode>, <house number>`: resolved through the
    /// address lookup into an address edit.
    LookupAddress {
        postcode: String,
        house_number: String,
    },
}

/// One row of an intent script: `intent, field, value`.
#[derive(Debug, Deserialize)]
struct IntentRow {
    intent: String,
    field: Option<String>,
    value: Option<String>,
}

impl TryFrom<IntentRow> for ScriptStep {
    type Error = FlowError;

    fn try_from(row: IntentRow) -> Result<Self> {
        let value = row.value.unwrap_or_default();
        let intent = match row.intent.trim().to_ascii_lowercase().as_str() {
            "select_payer_mode" => Intent::SelectPayerMode(value.parse()?),
            "change_entity_type" => Intent::ChangeEntityType(value.parse()?),
            "edit_field" => {
                let field = row.field.ok_or_else(|| {
                    FlowError::ValidationError("edit_field needs a field name".to_string())
                })?;
                Intent::EditField(PayerEdit::single(field.parse()?, value))
            }
            "submit_details" => Intent::SubmitDetails,
            "go_back_to_details" => Intent::GoBackToDetails,
            "change_details" => Intent::ChangeDetails,
            "confirm_and_submit" => Intent::ConfirmAndSubmit,
            "lookup_address" => {
                let postcode = row.field.unwrap_or_default();
                if postcode.trim().is_empty() {
                    return Err(FlowError::ValidationError(
                        "lookup_address needs a postcode".to_string(),
                    ));
                }
                return Ok(ScriptStep::LookupAddress {
                    postcode,
                    house_number: value,
                });
            }
            other => {
                return Err(FlowError::ValidationError(format!(
                    "Unknown intent: {}",
                    other
                )));
            }
        };
        Ok(ScriptStep::Intent(intent))
    }
}

/// Reads a scripted sequence of steps from a CSV source.
///
/// Whitespace is trimmed and short rows are accepted, so `submit_details`
/// needs no trailing commas.
pub struct IntentReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> IntentReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily parses each row. A bad row yields an error without stopping
    /// the iterator.
    pub fn steps(self) -> impl Iterator<Item = Result<ScriptStep>> {
        self.reader.into_deserialize::<IntentRow>().map(|row| {
            let row = row.map_err(FlowError::from)?;
            ScriptStep::try_from(row)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payer::{EntityType, PayerField, PayerMode};

    #[test]
    fn test_reader_valid_script() {
        let data = "intent, field, value\n\
                    select_payer_mode,, third_party\n\
                    change_entity_type,, company\n\
                    edit_field, firstName, Alice\n\
                    submit_details\n\
                    confirm_and_submit";
        let steps: Vec<ScriptStep> = IntentReader::new(data.as_bytes())
            .steps()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            steps,
            vec![
                ScriptStep::Intent(Intent::SelectPayerMode(PayerMode::ThirdParty)),
                ScriptStep::Intent(Intent::ChangeEntityType(EntityType::Company)),
                ScriptStep::Intent(Intent::EditField(PayerEdit::single(
                    PayerField::FirstName,
                    "Alice"
                ))),
                ScriptStep::Intent(Intent::SubmitDetails),
                ScriptStep::Intent(Intent::ConfirmAndSubmit),
            ]
        );
    }

    #[test]
    fn test_empty_value_clears_field() {
        let data = "intent,field,value\nedit_field,address_line_2,";
        let steps: Vec<Result<ScriptStep>> = IntentReader::new(data.as_bytes()).steps().collect();
        assert_eq!(
            steps[0].as_ref().unwrap(),
            &ScriptStep::Intent(Intent::EditField(PayerEdit::single(
                PayerField::AddressLine2,
                ""
            )))
        );
    }

    #[test]
    fn test_reader_bad_rows_do_not_stop_iteration() {
        let data = "intent,field,value\n\
                    dance,,\n\
                    edit_field,shoe_size,42\n\
                    edit_field,,x\n\
                    submit_details,,";
        let results: Vec<Result<ScriptStep>> = IntentReader::new(data.as_bytes()).steps().collect();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_err());
        assert!(results[1].is_err());
        assert!(results[2].is_err());
        assert_eq!(
            results[3].as_ref().unwrap(),
            &ScriptStep::Intent(Intent::SubmitDetails)
        );
    }

    #[test]
    fn test_lookup_address_rows() {
        let data = "intent,field,value
                    lookup_address, LS1 1UR, 42
                    lookup_address,,42";
        let results: Vec<Result<ScriptStep>> = IntentReader::new(data.as_bytes()).steps().collect();

        assert_eq!(
            results[0].as_ref().unwrap(),
            &ScriptStep::LookupAddress {
                postcode: "LS1 1UR".to_string(),
                house_number: "42".to_string(),
            }
        );
        assert!(matches!(results[1], Err(FlowError::ValidationError(_))));
    }
}
