//! Process id to type name mappings (`processidmodel`).

use flowdex_core::{DataType, Value};
use flowdex_query::executor::{FieldTable, Record};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Maps a process id to the fully qualified name of its generated model type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessIdMapping {
    pub process_id: String,
    pub full_type_name: String,
}

impl ProcessIdMapping {
    pub fn new(process_id: impl Into<String>, full_type_name: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            full_type_name: full_type_name.into(),
        }
    }
}

impl Record for ProcessIdMapping {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<ProcessIdMapping>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<ProcessIdMapping>::builder("processidmodel")
                .scalar("processId", DataType::String, |m| Value::from(&m.process_id))
                .scalar("fullTypeName", DataType::String, |m| {
                    Value::from(&m.full_type_name)
                })
                .build()
        })
    }
}
