//! JSON schema validation for persisted todo records.
//!
//! The schema is generated from [`TodoRecord`] with schemars, so a storage
//! line (a record plus its `op`) validates against it as well.

use jsonschema::JSONSchema;
use lint_todo_types::TodoRecord;

#[derive(Debug)]
pub struct SchemaValidationError {
    pub errors: Vec<String>,
}

impl std::fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Schema validation failed: {}", self.errors.join("; "))
    }
}

impl std::error::Error for SchemaValidationError {}

pub fn record_schema_json() -> serde_json::Value {
    let schema = schemars::schema_for!(TodoRecord);
    serde_json::to_value(schema).expect("record schema should serialize")
}

pub fn load_record_schema() -> JSONSchema {
    JSONSchema::compile(&record_schema_json()).expect("record schema should compile")
}

/// Validates one persisted record (or storage line).
pub fn validate_record_json(json: &serde_json::Value) -> Result<(), SchemaValidationError> {
    let schema = load_record_schema();
    match schema.validate(json) {
        Ok(()) => Ok(()),
        Err(errors) => Err(SchemaValidationError {
            errors: errors.map(|e| e.to_string()).collect(),
        }),
    }
}
