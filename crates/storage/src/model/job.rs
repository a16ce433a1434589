//! Scheduled job records (`jobs`).

use super::{text, timestamp};
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use flowdex_core::{DataType, Value};
use flowdex_query::executor::{FieldTable, Record};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A scheduled job of a process instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub process_id: Option<String>,
    pub process_instance_id: Option<String>,
    pub root_process_instance_id: Option<String>,
    pub root_process_id: Option<String>,
    pub node_instance_id: Option<String>,
    pub status: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub expiration_time: Option<DateTime<Utc>>,
    pub priority: Option<i32>,
    pub callback_endpoint: Option<String>,
    pub repeat_interval: Option<i64>,
    pub repeat_limit: Option<i32>,
    pub scheduled_id: Option<String>,
    pub retries: Option<i32>,
    pub execution_counter: Option<i32>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_update: Option<DateTime<Utc>>,
    pub endpoint: Option<String>,
}

impl Record for Job {
    fn field_table() -> &'static FieldTable<Self> {
        static TABLE: OnceLock<FieldTable<Job>> = OnceLock::new();
        TABLE.get_or_init(|| {
            FieldTable::<Job>::builder("jobs")
                .scalar("id", DataType::String, |j| Value::from(&j.id))
                .scalar("processId", DataType::String, |j| text(&j.process_id))
                .scalar("processInstanceId", DataType::String, |j| {
                    text(&j.process_instance_id)
                })
                .scalar("rootProcessInstanceId", DataType::String, |j| {
                    text(&j.root_process_instance_id)
                })
                .scalar("rootProcessId", DataType::String, |j| text(&j.root_process_id))
                .scalar("nodeInstanceId", DataType::String, |j| text(&j.node_instance_id))
                .scalar("status", DataType::String, |j| text(&j.status))
                .scalar("expirationTime", DataType::DateTime, |j| {
                    timestamp(&j.expiration_time)
                })
                .scalar("priority", DataType::Int32, |j| Value::from(j.priority))
                .scalar("callbackEndpoint", DataType::String, |j| {
                    text(&j.callback_endpoint)
                })
                .scalar("repeatInterval", DataType::Int64, |j| Value::from(j.repeat_interval))
                .scalar("repeatLimit", DataType::Int32, |j| Value::from(j.repeat_limit))
                .scalar("scheduledId", DataType::String, |j| text(&j.scheduled_id))
                .scalar("retries", DataType::Int32, |j| Value::from(j.retries))
                .scalar("executionCounter", DataType::Int32, |j| {
                    Value::from(j.execution_counter)
                })
                .scalar("lastUpdate", DataType::DateTime, |j| timestamp(&j.last_update))
                .scalar("endpoint", DataType::String, |j| text(&j.endpoint))
                .build()
        })
    }
}
