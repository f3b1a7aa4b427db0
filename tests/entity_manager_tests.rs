use memorm::persistence::{EntityData, EntityKey};
use memorm::{Entity, EntityManager, EntityStatus, InMemoryDB, MergeOutcome, OrmError, Value};

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(table = "users")]
struct Person {
    #[id]
    id: Option<i64>,
    #[column(name = "nick_name")]
    name: String,
    #[column(name = "old")]
    age: i32,
    #[column(nullable = false)]
    email: String,
}

impl Person {
    fn new(id: Option<i64>, name: &str, age: i32, email: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            email: email.to_string(),
        }
    }

    fn sangki() -> Self {
        Self::new(Some(1), "sangki", 29, "test@test.com")
    }
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(table = "members")]
struct Member {
    #[id(generated)]
    id: Option<i64>,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Entity)]
#[entity(table = "gauges")]
struct Gauge {
    #[id]
    id: i64,
    reading: f64,
    enabled: bool,
    label: Option<String>,
}

impl Gauge {
    fn boiler() -> Self {
        Self {
            id: 1,
            reading: 1e-20,
            enabled: true,
            label: Some("boiler".to_string()),
        }
    }
}

fn session() -> EntityManager<InMemoryDB> {
    let mut em = EntityManager::new(InMemoryDB::new());
    em.create_table::<Person>().unwrap();
    em.create_table::<Member>().unwrap();
    em.create_table::<Gauge>().unwrap();
    em.template_mut().executor_mut().clear_statement_log();
    em
}

fn statements(em: &EntityManager<InMemoryDB>) -> Vec<String> {
    em.template().executor().executed_statements().to_vec()
}

fn clear_log(em: &mut EntityManager<InMemoryDB>) {
    em.template_mut().executor_mut().clear_statement_log();
}

#[test]
fn test_persist_issues_insert_and_manages_entity() {
    let mut em = session();
    let mut person = Person::sangki();

    em.persist(&mut person).unwrap();

    assert_eq!(
        statements(&em),
        vec!["INSERT INTO users (id, nick_name, old, email) VALUES (1, 'sangki', 29, 'test@test.com');"]
    );
    assert_eq!(em.status::<Person>(1), Some(EntityStatus::Managed));
    assert!(em.contains::<Person>(1));
}

#[test]
fn test_persist_then_find_reads_nothing() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    clear_log(&mut em);

    let found: Person = em.find(1).unwrap();

    assert_eq!(found, Person::new(Some(1), "sangki", 29, "test@test.com"));
    assert!(statements(&em).is_empty());
}

#[test]
fn test_find_twice_reads_storage_once() {
    let mut em = session();
    em.template_mut()
        .execute("INSERT INTO users (id, nick_name, old, email) VALUES (7, 'kim', 40, 'kim@test.com');")
        .unwrap();
    clear_log(&mut em);

    let first: Person = em.find(7).unwrap();
    let second: Person = em.find(7).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        statements(&em),
        vec!["SELECT id, nick_name, old, email FROM users WHERE id = 7;"]
    );
}

#[test]
fn test_find_missing_row_is_not_found() {
    let mut em = session();

    let err = em.find::<Person>(99).unwrap_err();

    assert!(matches!(err, OrmError::NotFound { ref id, .. } if *id == Value::Integer(99)));
    assert!(em.status::<Person>(99).is_none());
    assert!(em.context().is_empty());
}

#[test]
fn test_find_duplicate_rows_is_ambiguous() {
    let mut em = EntityManager::new(InMemoryDB::new());
    // no key constraint, so two rows can share an id
    em.template_mut()
        .execute("CREATE TABLE users (id BIGINT, nick_name VARCHAR(255), old INTEGER, email VARCHAR(255));")
        .unwrap();
    em.template_mut()
        .execute("INSERT INTO users VALUES (1, 'a', 1, 'a@x'), (1, 'b', 2, 'b@x');")
        .unwrap();

    let err = em.find::<Person>(1).unwrap_err();

    assert!(matches!(err, OrmError::Ambiguous { rows: 2, .. }));
    assert!(em.context().is_empty());
}

#[test]
fn test_merge_without_changes_issues_nothing() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    clear_log(&mut em);

    let outcome = em.merge(&person).unwrap();

    assert_eq!(outcome, MergeOutcome::Unchanged);
    assert!(statements(&em).is_empty());
}

#[test]
fn test_merge_updates_changed_columns_only() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    clear_log(&mut em);

    person.name = "kim".to_string();
    person.email = "kim@test.com".to_string();
    let outcome = em.merge(&person).unwrap();

    assert_eq!(
        outcome,
        MergeOutcome::Updated(vec!["nick_name".to_string(), "email".to_string()])
    );
    assert_eq!(
        statements(&em),
        vec!["UPDATE users SET nick_name='kim', email='kim@test.com' WHERE id = 1;"]
    );

    // The synchronized state moved forward, so the same merge is now a no-op
    assert_eq!(em.merge(&person).unwrap(), MergeOutcome::Unchanged);
    assert_eq!(statements(&em).len(), 1);

    // And the identity map serves the merged state
    let found: Person = em.find(1).unwrap();
    assert_eq!(found.name, "kim");
}

#[test]
fn test_merge_unmanaged_entity_is_noop() {
    let mut em = session();
    let person = Person::sangki();

    let outcome = em.merge(&person).unwrap();

    assert_eq!(outcome, MergeOutcome::Unmanaged);
    assert!(statements(&em).is_empty());
    assert!(em.context().is_empty());
}

#[test]
fn test_remove_leaves_tombstone() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    clear_log(&mut em);

    em.remove(&person).unwrap();

    let key = EntityKey::of::<Person>(1);
    assert!(em.context().find_entity(&key).is_none());
    assert_eq!(
        em.context().entity_entry(&key).map(|e| e.status()),
        Some(EntityStatus::Deleted)
    );
    assert_eq!(statements(&em), vec!["DELETE FROM users WHERE id = 1;"]);
}

#[test]
fn test_find_after_remove_fails_without_reading() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    em.remove(&person).unwrap();
    clear_log(&mut em);

    let err = em.find::<Person>(1).unwrap_err();

    assert!(err.is_not_found());
    assert!(statements(&em).is_empty());
}

#[test]
fn test_merge_after_remove_is_noop() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    em.remove(&person).unwrap();

    person.age = 30;
    assert_eq!(em.merge(&person).unwrap(), MergeOutcome::Unmanaged);
}

#[test]
fn test_persist_managed_key_is_usage_error() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    clear_log(&mut em);

    let mut again = Person::sangki();
    let err = em.persist(&mut again).unwrap_err();

    assert!(matches!(err, OrmError::UsageError(_)));
    assert!(statements(&em).is_empty());
}

#[test]
fn test_persist_after_remove_reinserts() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    em.remove(&person).unwrap();

    em.persist(&mut person).unwrap();

    assert_eq!(em.status::<Person>(1), Some(EntityStatus::Managed));
    assert_eq!(em.template().executor().row_count("users").unwrap(), 1);
}

#[test]
fn test_persist_assigns_generated_ids() {
    let mut em = session();
    let mut first = Member {
        id: None,
        name: "first".to_string(),
    };
    let mut second = Member {
        id: None,
        name: "second".to_string(),
    };

    em.persist(&mut first).unwrap();
    em.persist(&mut second).unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(second.id, Some(2));
    assert_eq!(
        statements(&em)[0],
        "INSERT INTO members (name) VALUES ('first');"
    );

    clear_log(&mut em);
    let found: Member = em.find(2).unwrap();
    assert_eq!(found, second);
    assert!(statements(&em).is_empty());
}

#[test]
fn test_persist_without_identifier_is_usage_error() {
    let mut em = session();
    let mut person = Person::new(None, "anon", 1, "anon@test.com");

    let err = em.persist(&mut person).unwrap_err();

    assert!(matches!(err, OrmError::UsageError(_)));
    assert!(statements(&em).is_empty());
}

#[test]
fn test_failed_persist_leaves_context_untouched() {
    let mut em = session();
    let mut person = Person::new(Some(1), "nobody", 1, "nobody@x");
    em.template_mut()
        .execute("INSERT INTO users (id, nick_name, old, email) VALUES (1, 'taken', 1, 'taken@x');")
        .unwrap();

    let err = em.persist(&mut person).unwrap_err();

    assert!(matches!(err, OrmError::ConstraintViolation(_)));
    assert!(em.context().is_empty());
}

#[test]
fn test_find_all_merges_with_identity_map() {
    let mut em = session();
    let mut person = Person::sangki();
    em.persist(&mut person).unwrap();
    em.template_mut()
        .execute("INSERT INTO users (id, nick_name, old, email) VALUES (2, 'kim', 40, 'kim@x'), (3, 'lee', 33, 'lee@x');")
        .unwrap();
    let doomed: Person = em.find(3).unwrap();
    em.remove(&doomed).unwrap();

    let people = em.find_all::<Person>().unwrap();

    let ids: Vec<Option<i64>> = people.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2)]);
    assert!(em.contains::<Person>(2));
    assert_eq!(em.context().managed_count(), 2);
}

#[test]
fn test_insert_and_select_reference_same_columns() {
    let person = Person::sangki();
    let metadata = Person::metadata();
    let data = EntityData::from_entity(&person).unwrap();

    let insert = memorm::sql::InsertQueryBuilder::new(metadata)
        .build(data.columns())
        .unwrap();
    let select = memorm::sql::SelectByIdQueryBuilder::new(metadata).build(data.id()).unwrap();

    let columns = metadata.column_names().join(", ");
    assert!(insert.starts_with(&format!("INSERT INTO {} ({})", metadata.table_name(), columns)));
    assert!(select.starts_with(&format!("SELECT {} FROM {} ", columns, metadata.table_name())));
}

#[test]
fn test_snapshot_diff() {
    let a = EntityData::from_entity(&Person::new(Some(1), "a", 1, "same@x")).unwrap();
    let b = EntityData::from_entity(&Person::new(Some(1), "b", 1, "same@x")).unwrap();

    let diff = a.diff(&b).unwrap();

    assert_eq!(diff.column_names(), vec!["nick_name"]);
    assert_eq!(diff.value("nick_name"), Some(&Value::from("a")));
    assert_eq!(diff.id(), &Value::Integer(1));
}

#[test]
fn test_snapshot_diff_across_types_is_schema_mismatch() {
    let person = EntityData::from_entity(&Person::sangki()).unwrap();
    let member = EntityData::from_entity(&Member {
        id: Some(1),
        name: "m".to_string(),
    })
    .unwrap();

    let err = member.diff(&person).unwrap_err();

    assert!(matches!(err, OrmError::SchemaMismatch { ref entity, .. } if entity == "Member"));
}

#[test]
fn test_keys_distinguish_entity_types() {
    let mut em = session();
    let mut person = Person::sangki();
    let mut member = Member {
        id: Some(1),
        name: "m".to_string(),
    };
    em.persist(&mut person).unwrap();
    em.persist(&mut member).unwrap();

    assert_ne!(EntityKey::of::<Person>(1), EntityKey::of::<Member>(1));
    assert_eq!(em.context().managed_count(), 2);

    em.remove(&member).unwrap();
    assert_eq!(em.status::<Person>(1), Some(EntityStatus::Managed));
    assert_eq!(em.status::<Member>(1), Some(EntityStatus::Deleted));
}

fn persisted_boiler(em: &mut EntityManager<InMemoryDB>) -> Gauge {
    let mut gauge = Gauge::boiler();
    em.persist(&mut gauge).unwrap();
    clear_log(em);
    gauge
}

#[test]
fn test_merge_detects_small_float_change() {
    let mut em = session();
    let mut gauge = persisted_boiler(&mut em);

    gauge.reading = 5e-20;
    let outcome = em.merge(&gauge).unwrap();

    assert_eq!(outcome, MergeOutcome::Updated(vec!["reading".to_string()]));
    assert_eq!(
        statements(&em),
        vec!["UPDATE gauges SET reading=5e-20 WHERE id = 1;"]
    );

    em.clear();
    let stored: Gauge = em.find(1).unwrap();
    assert_eq!(stored.reading, 5e-20);
}

#[test]
fn test_merge_detects_bool_toggle() {
    let mut em = session();
    let mut gauge = persisted_boiler(&mut em);

    gauge.enabled = false;
    let outcome = em.merge(&gauge).unwrap();

    assert_eq!(outcome, MergeOutcome::Updated(vec!["enabled".to_string()]));
    assert_eq!(
        statements(&em),
        vec!["UPDATE gauges SET enabled=FALSE WHERE id = 1;"]
    );
}

#[test]
fn test_merge_writes_null_and_back() {
    let mut em = session();
    let mut gauge = persisted_boiler(&mut em);

    gauge.label = None;
    assert_eq!(
        em.merge(&gauge).unwrap(),
        MergeOutcome::Updated(vec!["label".to_string()])
    );

    gauge.label = Some("kettle".to_string());
    assert_eq!(
        em.merge(&gauge).unwrap(),
        MergeOutcome::Updated(vec!["label".to_string()])
    );

    assert_eq!(
        statements(&em),
        vec![
            "UPDATE gauges SET label=NULL WHERE id = 1;",
            "UPDATE gauges SET label='kettle' WHERE id = 1;",
        ]
    );
}

#[test]
fn test_merge_of_non_finite_float_writes_nothing() {
    let mut em = session();
    let mut gauge = persisted_boiler(&mut em);

    gauge.reading = f64::INFINITY;
    let err = em.merge(&gauge).unwrap_err();

    assert!(matches!(err, OrmError::MappingError(_)));
    assert!(statements(&em).is_empty());

    // The synchronized state is unchanged, so restoring the field is a no-op
    gauge.reading = 1e-20;
    assert_eq!(em.merge(&gauge).unwrap(), MergeOutcome::Unchanged);
}
