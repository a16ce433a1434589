//! Both backends return the same ordered results for the same data and request.

use chrono::{TimeZone, Utc};
use flowdex_query::ast::builder::*;
use flowdex_query::ast::{FilterExpression, QueryRequest, SortCriterion, SortDirection};
use flowdex_storage::model::{
    Job, ProcessIdMapping, ProcessInstance, ProcessInstanceError, UserTaskInstance,
};
use flowdex_storage::{Cache, CacheService, QueryEngine, ServiceConfig};
use proptest::prelude::*;
use proptest::sample::select;
use std::fmt::Debug;

static STATUSES: [&str; 3] = ["SCHEDULED", "EXECUTED", "ERROR"];
static ROOTS: [&str; 3] = ["root1", "root2", "root_1"];
static STATES: [&str; 3] = ["Ready", "InProgress", "Completed"];
static USERS: [&str; 4] = ["jdoe", "admin", "manager", "jdoe_admin"];
static PROCESSES: [&str; 3] = ["travels", "hotel", "travels.v2"];
static ROLES: [&str; 3] = ["admin", "user", "ops"];
static NODES: [&str; 3] = ["_1", "_2", "_3"];

/// Characters that are special to regular expressions or to `like`.
static TRICKY: [char; 9] = ['a', 'b', '.', '(', '$', '\n', '*', '_', '1'];

fn tricky_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(select(&TRICKY[..]), 0..max).prop_map(|c| c.into_iter().collect())
}

fn at(seconds: i64) -> Option<chrono::DateTime<Utc>> {
    Utc.timestamp_millis_opt(seconds * 1000).single()
}

fn backends() -> (CacheService, CacheService) {
    (
        CacheService::in_memory(),
        CacheService::new(&ServiceConfig::document(None)).unwrap(),
    )
}

/// Applies the same writes to both caches.
fn load<V: Clone>(
    caches: [&dyn Cache<V>; 2],
    writes: &[(u8, Option<V>)],
    key: impl Fn(u8) -> String,
) {
    for cache in caches {
        for (k, value) in writes {
            match value {
                Some(value) => cache.put(&key(*k), value.clone()).unwrap(),
                None => cache.remove(&key(*k)).unwrap(),
            }
        }
    }
}

fn assert_agree<V: Debug + PartialEq>(
    memory: &dyn Cache<V>,
    document: &dyn Cache<V>,
    request: &QueryRequest,
) -> Result<(), TestCaseError> {
    let expected = memory.query(request);
    let actual = document.query(request);
    match (expected, actual) {
        (Ok(expected), Ok(actual)) => {
            prop_assert_eq!(expected, actual, "{:?}", request);
        }
        (Err(_), Err(_)) => {}
        (expected, actual) => {
            prop_assert!(false, "{:?}: {:?} vs {:?}", request, expected, actual);
        }
    }
    Ok(())
}

fn sorts(fields: &'static [&'static str]) -> impl Strategy<Value = Vec<SortCriterion>> {
    prop::collection::vec(
        (select(fields), any::<bool>()).prop_map(|(field, desc)| {
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            order_by(field, direction)
        }),
        0..3,
    )
}

fn composite(leaf: BoxedStrategy<FilterExpression>) -> BoxedStrategy<FilterExpression> {
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(|c| and(c).unwrap()),
            prop::collection::vec(inner, 1..3).prop_map(|c| or(c).unwrap()),
        ]
    })
    .boxed()
}

fn request(
    filter: BoxedStrategy<FilterExpression>,
    sort_fields: &'static [&'static str],
) -> impl Strategy<Value = QueryRequest> {
    (
        prop::collection::vec(filter, 0..3),
        sorts(sort_fields),
        prop::option::of(0u64..5),
        prop::option::of(0u64..5),
    )
        .prop_map(|(filters, sorts, offset, limit)| QueryRequest {
            filters,
            sorts,
            offset,
            limit,
        })
}

fn job() -> impl Strategy<Value = Job> {
    (
        prop::option::of(select(&STATUSES[..])),
        prop::option::of(0i32..4),
        prop::option::of(0i32..3),
        prop::option::of(select(&ROOTS[..])),
        prop::option::of(0i64..5),
    )
        .prop_map(|(status, priority, retries, root, expires)| Job {
            status: status.map(String::from),
            priority,
            retries,
            root_process_instance_id: root.map(String::from),
            expiration_time: expires.and_then(at),
            ..Job::default()
        })
}

fn job_writes() -> impl Strategy<Value = Vec<(u8, Option<Job>)>> {
    let entry = (0u8..8, prop::option::weighted(0.85, (job(), tricky_text(3))));
    prop::collection::vec(entry, 0..16).prop_map(
        |writes| {
            writes
                .into_iter()
                .map(|(k, job)| {
                    let job = job.map(|(j, suffix)| Job {
                        id: format!("job{}{}", k, suffix),
                        ..j
                    });
                    (k, job)
                })
                .collect()
        },
    )
}

fn job_leaf() -> BoxedStrategy<FilterExpression> {
    let values = prop_oneof![
        select(&STATUSES[..]).prop_map(|s| equal_to("status", s)),
        (0i32..4).prop_map(|p| greater_than("priority", p)),
        (0i32..4).prop_map(|p| less_than_equal("priority", p)),
        (0i32..3, 0i32..3).prop_map(|(lo, hi)| between("retries", lo, hi)),
        prop::collection::vec(select(&STATUSES[..]), 1..3)
            .prop_map(|v| is_in("status", v).unwrap()),
        (0i64..5).prop_map(|s| greater_than_equal("expirationTime", s * 1000)),
    ];
    let presence = prop_oneof![
        Just(is_null("rootProcessInstanceId")),
        Just(not_null("priority")),
        select(vec!["job1", "ob", "b2"]).prop_map(|s| contains("id", s)),
        select(vec!["*1", "job*", "*o*2", "job3", "root_*"]).prop_map(|p| like("id", p)),
        tricky_text(4).prop_map(|s| contains("id", s)),
        tricky_text(5).prop_map(|p| like("id", format!("job*{}", p))),
        prop::collection::vec(select(&ROOTS[..]), 1..3)
            .prop_map(|v| contains_any("rootProcessInstanceId", v).unwrap()),
        prop::collection::vec(select(&ROOTS[..]), 1..3)
            .prop_map(|v| contains_all("rootProcessInstanceId", v).unwrap()),
    ];
    prop_oneof![values, presence].boxed()
}

const JOB_SORTS: &[&str] = &[
    "status",
    "priority",
    "retries",
    "rootProcessInstanceId",
    "expirationTime",
    "id",
];

fn task() -> impl Strategy<Value = UserTaskInstance> {
    (
        prop::option::of(select(&STATES[..])),
        prop::option::of(prop_oneof![
            select(&USERS[..]).prop_map(String::from),
            tricky_text(5),
        ]),
        prop::collection::btree_set(select(&USERS[..]).prop_map(String::from), 0..3),
        prop::collection::btree_set(select(&USERS[..]).prop_map(String::from), 0..2),
        prop::option::of(0i64..5),
    )
        .prop_map(|(state, owner, potential_users, admin_users, started)| UserTaskInstance {
            state: state.map(String::from),
            actual_owner: owner,
            potential_users,
            admin_users,
            started: started.and_then(at),
            ..UserTaskInstance::default()
        })
}

fn task_writes() -> impl Strategy<Value = Vec<(u8, Option<UserTaskInstance>)>> {
    prop::collection::vec((0u8..8, prop::option::weighted(0.85, task())), 0..16).prop_map(
        |writes| {
            writes
                .into_iter()
                .map(|(k, task)| {
                    let task = task.map(|t| UserTaskInstance {
                        id: format!("task{}", k),
                        ..t
                    });
                    (k, task)
                })
                .collect()
        },
    )
}

fn task_leaf() -> BoxedStrategy<FilterExpression> {
    let scalars = prop_oneof![
        select(&STATES[..]).prop_map(|s| equal_to("state", s)),
        select(&STATES[..]).prop_map(|s| greater_than("state", s)),
        select(vec!["jdoe*", "*admin", "*", "jdoe"]).prop_map(|p| like("actualOwner", p)),
        select(vec!["doe", "admin", "j"]).prop_map(|s| contains("actualOwner", s)),
        tricky_text(3).prop_map(|s| contains("actualOwner", s)),
        tricky_text(4).prop_map(|p| like("actualOwner", p)),
        (0i64..5).prop_map(|s| less_than("started", s * 1000)),
        Just(is_null("started")),
    ];
    let collections = prop_oneof![
        select(&USERS[..]).prop_map(|u| contains("potentialUsers", u)),
        prop::collection::vec(select(&USERS[..]), 1..3)
            .prop_map(|v| contains_any("potentialUsers", v).unwrap()),
        prop::collection::vec(select(&USERS[..]), 1..3)
            .prop_map(|v| contains_all("potentialUsers", v).unwrap()),
        Just(is_null("adminUsers")),
        Just(not_null("potentialUsers")),
    ];
    prop_oneof![scalars, collections].boxed()
}

const TASK_SORTS: &[&str] = &["state", "actualOwner", "started", "id"];

fn process_instance() -> impl Strategy<Value = ProcessInstance> {
    let error = prop::option::of(
        (prop::option::of(tricky_text(6)), prop::option::of(select(&NODES[..]))).prop_map(
            |(message, node)| ProcessInstanceError {
                message,
                node_definition_id: node.map(String::from),
            },
        ),
    );
    (
        prop::option::of(select(&PROCESSES[..])),
        prop::option::of(0i32..4),
        prop::collection::btree_set(select(&ROLES[..]).prop_map(String::from), 0..3),
        prop::collection::btree_set(select(&ROLES[..]).prop_map(String::from), 0..2),
        error,
        prop::option::of(tricky_text(4)),
        prop::option::of(0i64..5),
    )
        .prop_map(|(process, state, roles, addons, error, business_key, start)| {
            ProcessInstance {
                process_id: process.map(String::from),
                state,
                roles,
                addons,
                error,
                business_key,
                start: start.and_then(at),
                ..ProcessInstance::default()
            }
        })
}

fn process_instance_writes() -> impl Strategy<Value = Vec<(u8, Option<ProcessInstance>)>> {
    let entry = (0u8..8, prop::option::weighted(0.85, process_instance()));
    prop::collection::vec(entry, 0..16).prop_map(|writes| {
        writes
            .into_iter()
            .map(|(k, pi)| (k, pi.map(|p| ProcessInstance { id: format!("pi{}", k), ..p })))
            .collect()
    })
}

fn process_instance_leaf() -> BoxedStrategy<FilterExpression> {
    let scalars = prop_oneof![
        (0i32..4).prop_map(|s| equal_to("state", s)),
        prop::collection::vec(select(&PROCESSES[..]), 1..3)
            .prop_map(|v| is_in("processId", v).unwrap()),
        select(&PROCESSES[..]).prop_map(|p| less_than("processId", p)),
        (0i64..5).prop_map(|s| greater_than_equal("start", s * 1000)),
        tricky_text(3).prop_map(|p| like("businessKey", p)),
    ];
    let nested = prop_oneof![
        Just(is_null("error.message")),
        Just(not_null("error.nodeDefinitionId")),
        select(&NODES[..]).prop_map(|n| equal_to("error.nodeDefinitionId", n)),
        select(&NODES[..]).prop_map(|n| greater_than("error.nodeDefinitionId", n)),
        tricky_text(3).prop_map(|s| contains("error.message", s)),
        tricky_text(4).prop_map(|p| like("error.message", p)),
    ];
    let collections = prop_oneof![
        select(&ROLES[..]).prop_map(|r| contains("roles", r)),
        prop::collection::vec(select(&ROLES[..]), 1..3)
            .prop_map(|v| contains_all("roles", v).unwrap()),
        prop::collection::vec(select(&ROLES[..]), 1..3)
            .prop_map(|v| contains_any("addons", v).unwrap()),
        Just(is_null("addons")),
        Just(not_null("roles")),
    ];
    prop_oneof![scalars, nested, collections].boxed()
}

const PROCESS_INSTANCE_SORTS: &[&str] = &[
    "state",
    "processId",
    "error.message",
    "error.nodeDefinitionId",
    "start",
    "businessKey",
    "id",
];

fn mapping_writes() -> impl Strategy<Value = Vec<(u8, Option<ProcessIdMapping>)>> {
    let mapping = (select(&PROCESSES[..]), tricky_text(5))
        .prop_map(|(process, type_name)| ProcessIdMapping::new(process, type_name));
    prop::collection::vec((0u8..8, prop::option::weighted(0.85, mapping)), 0..16)
}

fn mapping_leaf() -> BoxedStrategy<FilterExpression> {
    prop_oneof![
        select(&PROCESSES[..]).prop_map(|p| equal_to("processId", p)),
        select(&PROCESSES[..]).prop_map(|p| greater_than_equal("processId", p)),
        tricky_text(3).prop_map(|s| contains("fullTypeName", s)),
        tricky_text(4).prop_map(|p| like("fullTypeName", p)),
        Just(not_null("fullTypeName")),
    ]
    .boxed()
}

const MAPPING_SORTS: &[&str] = &["processId", "fullTypeName"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_job_backends_agree(
        writes in job_writes(),
        requests in prop::collection::vec(request(composite(job_leaf()), JOB_SORTS), 1..6),
    ) {
        let (memory, document) = backends();
        load([memory.jobs(), document.jobs()], &writes, |k| format!("job{}", k));
        prop_assert_eq!(memory.jobs().len().unwrap(), document.jobs().len().unwrap());
        for request in &requests {
            assert_agree(memory.jobs(), document.jobs(), request)?;
        }
    }

    #[test]
    fn prop_user_task_backends_agree(
        writes in task_writes(),
        requests in prop::collection::vec(request(composite(task_leaf()), TASK_SORTS), 1..6),
    ) {
        let (memory, document) = backends();
        load(
            [memory.user_task_instances(), document.user_task_instances()],
            &writes,
            |k| format!("task{}", k),
        );
        for request in &requests {
            assert_agree(memory.user_task_instances(), document.user_task_instances(), request)?;
        }
    }

    #[test]
    fn prop_process_instance_backends_agree(
        writes in process_instance_writes(),
        requests in prop::collection::vec(
            request(composite(process_instance_leaf()), PROCESS_INSTANCE_SORTS),
            1..6,
        ),
    ) {
        let (memory, document) = backends();
        load(
            [memory.process_instances(), document.process_instances()],
            &writes,
            |k| format!("pi{}", k),
        );
        for request in &requests {
            assert_agree(memory.process_instances(), document.process_instances(), request)?;
        }
    }

    #[test]
    fn prop_process_id_backends_agree(
        writes in mapping_writes(),
        requests in prop::collection::vec(request(composite(mapping_leaf()), MAPPING_SORTS), 1..6),
    ) {
        let (memory, document) = backends();
        load(
            [memory.process_id_model(), document.process_id_model()],
            &writes,
            |k| format!("map{}", k),
        );
        for request in &requests {
            assert_agree(memory.process_id_model(), document.process_id_model(), request)?;
        }
    }
}
