//! ValidatingSink - schema validation instead of delivery

use jsonschema::Draft;
use tracing::{info, instrument};

use contracts::{Batch, BatchSink, ContractError, Message};

use crate::numeric::float_to_decimal;

/// Sink that validates each record against the stream's schema.
///
/// Structural draft-4 validation plus format checks (e.g. date-time strings),
/// and a presence check for every declared key property. Floating-point
/// leaves in both the schema and the records are converted to exact decimal
/// form first. The first failure aborts the batch.
pub struct ValidatingSink {
    name: String,
}

impl ValidatingSink {
    /// Create a new ValidatingSink
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl BatchSink for ValidatingSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "validating_sink_handle_batch",
        skip(self, batch),
        fields(sink = %self.name, table = batch.stream, messages = batch.messages.len())
    )]
    async fn handle_batch(&mut self, batch: Batch<'_>) -> Result<(), ContractError> {
        let schema = float_to_decimal(batch.schema.clone());
        let validator = jsonschema::options()
            .with_draft(Draft::Draft4)
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| ContractError::schema_validation(batch.stream, e.to_string()))?;

        for (i, message) in batch.messages.iter().enumerate() {
            let Message::Record { record, .. } = message else {
                continue;
            };

            let data = float_to_decimal(record.clone());
            if let Err(err) = validator.validate(&data) {
                return Err(ContractError::schema_validation(
                    batch.stream,
                    err.to_string(),
                ));
            }

            for key in batch.key_names {
                if data.get(key).is_none() {
                    return Err(ContractError::MissingKeyProperty {
                        index: i,
                        property: key.clone(),
                    });
                }
            }
        }

        info!(sink = %self.name, messages = batch.messages.len(), "Batch is valid");
        Ok(())
    }
}
