//! User task records (`usertaskinstances`).

use super::{string_set, text, timestamp};
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use flowdex_core::{DataType, Value};
use flowdex_query::executor::{FieldTable, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// A human task created by a process instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTaskInstance {
    pub id: String,
    pub description: Option<String>,
    pub name: Option<String>,
    pub priority: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_id: Option<String>,
    pub root_process_instance_id: Option<String>,
    pub root_process_id: Option<String>,
    pub state: Option<String>,
    pub actual_owner: Option<String>,
    #[serde(default)]
    pub admin_groups: BTreeSet<String>,
    #[serde(default)]
    pub admin_users: BTreeSet<String>,
    #[serde(default)]
    pub excluded_users: BTreeSet<String>,
    #[serde(default)]
    pub potential_groups: BTreeSet<String>,
    #[serde(default)]
    pub potential_users: BTreeSet<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub started: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub completed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::json_tree")]
    pub inputs: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "super::json_tree")]
    pub outputs: Option<serde_json::Value>,
    pub reference_name: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_update: Option<DateTime<Utc>>,
    pub endpoint: Option<String>,
}

impl Record for UserTaskInstance {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<UserTaskInstance>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<UserTaskInstance>::builder("usertaskinstances")
                .scalar("id", DataType::String, |t| Value::from(&t.id))
                .scalar("description", DataType::String, |t| text(&t.description))
                .scalar("name", DataType::String, |t| text(&t.name))
                .scalar("priority", DataType::String, |t| text(&t.priority))
                .scalar("processInstanceId", DataType::String, |t| {
                    text(&t.process_instance_id)
                })
                .scalar("processId", DataType::String, |t| text(&t.process_id))
                .scalar("rootProcessInstanceId", DataType::String, |t| {
                    text(&t.root_process_instance_id)
                })
                .scalar("rootProcessId", DataType::String, |t| text(&t.root_process_id))
                .scalar("state", DataType::String, |t| text(&t.state))
                .scalar("actualOwner", DataType::String, |t| text(&t.actual_owner))
                .collection("adminGroups", DataType::String, |t| string_set(&t.admin_groups))
                .collection("adminUsers", DataType::String, |t| string_set(&t.admin_users))
                .collection("excludedUsers", DataType::String, |t| {
                    string_set(&t.excluded_users)
                })
                .collection("potentialGroups", DataType::String, |t| {
                    string_set(&t.potential_groups)
                })
                .collection("potentialUsers", DataType::String, |t| {
                    string_set(&t.potential_users)
                })
                .scalar("started", DataType::DateTime, |t| timestamp(&t.started))
                .scalar("completed", DataType::DateTime, |t| timestamp(&t.completed))
                .scalar("referenceName", DataType::String, |t| text(&t.reference_name))
                .scalar("lastUpdate", DataType::DateTime, |t| timestamp(&t.last_update))
                .scalar("endpoint", DataType::String, |t| text(&t.endpoint))
                .build()
        })
    }
}
