//! Process instance records (`processinstances`).

use super::{string_set, text, timestamp};
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use flowdex_core::{DataType, Value};
use flowdex_query::executor::{FieldTable, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// A running or finished process instance.
///
/// Node instances are embedded as an array of sub-documents when stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: String,
    pub process_id: Option<String>,
    pub process_name: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
    /// Process variables as an arbitrary JSON tree.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::json_tree")]
    pub variables: Option<serde_json::Value>,
    pub endpoint: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeInstance>,
    pub state: Option<i32>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub start: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub end: Option<DateTime<Utc>>,
    pub root_process_instance_id: Option<String>,
    pub root_process_id: Option<String>,
    pub parent_process_instance_id: Option<String>,
    pub error: Option<ProcessInstanceError>,
    #[serde(default)]
    pub addons: BTreeSet<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_update: Option<DateTime<Utc>>,
    pub business_key: Option<String>,
}

/// One visited node of a process instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInstance {
    pub id: String,
    pub name: Option<String>,
    pub node_id: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub enter: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub exit: Option<DateTime<Utc>>,
    pub definition_id: Option<String>,
}

/// The failure that put a process instance in error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstanceError {
    pub node_definition_id: Option<String>,
    pub message: Option<String>,
}

impl ProcessInstance {
    fn error_attr(&self, read: fn(&ProcessInstanceError) -> &Option<String>) -> Value {
        self.error.as_ref().map_or(Value::Null, |e| text(read(e)))
    }
}

impl Record for ProcessInstance {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<ProcessInstance>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<ProcessInstance>::builder("processinstances")
                .scalar("id", DataType::String, |p| Value::from(&p.id))
                .scalar("processId", DataType::String, |p| text(&p.process_id))
                .scalar("processName", DataType::String, |p| text(&p.process_name))
                .collection("roles", DataType::String, |p| string_set(&p.roles))
                .scalar("endpoint", DataType::String, |p| text(&p.endpoint))
                .scalar("state", DataType::Int32, |p| Value::from(p.state))
                .scalar("start", DataType::DateTime, |p| timestamp(&p.start))
                .scalar("end", DataType::DateTime, |p| timestamp(&p.end))
                .scalar("rootProcessInstanceId", DataType::String, |p| {
                    text(&p.root_process_instance_id)
                })
                .scalar("rootProcessId", DataType::String, |p| text(&p.root_process_id))
                .scalar("parentProcessInstanceId", DataType::String, |p| {
                    text(&p.parent_process_instance_id)
                })
                .scalar("error.message", DataType::String, |p| {
                    p.error_attr(|e| &e.message)
                })
                .scalar("error.nodeDefinitionId", DataType::String, |p| {
                    p.error_attr(|e| &e.node_definition_id)
                })
                .collection("addons", DataType::String, |p| string_set(&p.addons))
                .scalar("lastUpdate", DataType::DateTime, |p| timestamp(&p.last_update))
                .scalar("businessKey", DataType::String, |p| text(&p.business_key))
                .build()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use flowdex_document::DocumentCodec;

    fn instance() -> ProcessInstance {
        ProcessInstance {
            id: "pi1".into(),
            process_id: Some("travels".into()),
            roles: ["admin".to_string()].into_iter().collect(),
            variables: Some(serde_json::json!({ "traveller": { "name": "Ana", "tags": [1, 2] } })),
            nodes: vec![NodeInstance {
                id: "n1".into(),
                node_type: Some("StartNode".into()),
                enter: Utc.timestamp_millis_opt(10).single(),
                ..NodeInstance::default()
            }],
            state: Some(1),
            error: Some(ProcessInstanceError {
                node_definition_id: Some("_3".into()),
                message: Some("boom".into()),
            }),
            ..ProcessInstance::default()
        }
    }

    #[test]
    fn test_nested_error_fields() {
        let table = ProcessInstance::field_table();
        let pi = instance();
        assert_eq!(table.extract_by_name("error.message", &pi), Some(Value::from("boom")));
        let clean = ProcessInstance::default();
        assert_eq!(table.extract_by_name("error.message", &clean), Some(Value::Null));
        assert!(table.schema().resolve("roles").unwrap().is_collection());
    }

    #[test]
    fn test_nodes_embed_as_sub_documents() {
        let pi = instance();
        let document = pi.encode("pi1").unwrap();
        let nodes = document.get_array("nodes").unwrap();
        let node = nodes[0].as_document().unwrap();
        assert_eq!(node.get_str("type").unwrap(), "StartNode");
        assert_eq!(node.get_i64("enter").unwrap(), 10);
        assert_eq!(ProcessInstance::decode(document).unwrap(), pi);
    }
}
