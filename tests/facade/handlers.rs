//! Handler-shaped flows: JSON in, JSON out

use collstore::{Database, Error, Fields, Query, Record, SortOrder, Value};
use serde_json::{json, Value as Json};
use std::time::Duration;

/// Create a user unless the email is taken; invalidates cached lists
fn create_user(db: &Database, body: Json) -> Result<Json, Error> {
    let fields = Fields::from_json(body)?;
    let email = fields.get("email").cloned().unwrap_or(Value::Null);

    let created = db.store().transaction("users", |txn| {
        if !txn.find_by_field("email", &email).is_empty() {
            return Err(Error::invalid_argument("Email already registered"));
        }
        txn.create(fields)
    })?;

    db.cache().invalidate_prefix("users:list:");
    Ok(created.to_json())
}

/// Paginated, role-filtered listing cached for 60 seconds
fn list_users(db: &Database, page: usize, page_size: usize, role: Option<&str>) -> Result<Json, Error> {
    let key = format!("users:list:{}:{}:{:?}", page, page_size, role);
    db.cache().get_or_insert_with(&key, Some(Duration::from_secs(60)), || {
        let mut query = Query::new().sort_by("name", SortOrder::Ascending);
        if let Some(role) = role {
            query = query.where_eq("role", role);
        }
        let matching = db.store().query("users", &query)?;
        let total = matching.len();
        let users: Vec<Json> = matching
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .map(Record::to_json)
            .collect();
        Ok::<_, Error>(json!({"users": users, "total": total, "page": page, "page_size": page_size}))
    })
}

#[test]
fn users_scenario_round_trip() {
    let db = Database::ephemeral();
    let store = db.store();

    store.create("users", Fields::from_json(json!({"name": "A"})).unwrap()).unwrap();
    store.create("users", Fields::from_json(json!({"name": "B"})).unwrap()).unwrap();
    store
        .update("users", 1, Fields::from_json(json!({"name": "A2"})).unwrap())
        .unwrap();
    assert!(store.delete("users", 2).unwrap());

    let all: Vec<Json> = store.read_all("users").unwrap().iter().map(Record::to_json).collect();
    assert_eq!(all, vec![json!({"id": 1, "name": "A2"})]);
}

#[test]
fn duplicate_email_rejected_and_id_not_reused() {
    let db = Database::ephemeral();

    let first = create_user(&db, json!({"name": "Ann", "email": "ann@example.com"})).unwrap();
    assert_eq!(first["id"], json!(1));

    let err = create_user(&db, json!({"name": "Imposter", "email": "ann@example.com"})).unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(db.store().count("users").unwrap(), 1);

    let second = create_user(&db, json!({"name": "Bob", "email": "bob@example.com"})).unwrap();
    assert_eq!(second["id"], json!(2));
}

#[test]
fn non_object_body_rejected() {
    let db = Database::ephemeral();
    let err = create_user(&db, json!(["not", "an", "object"])).unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(db.store().collections().is_empty());
}

#[test]
fn client_supplied_id_rejected() {
    let db = Database::ephemeral();
    let err = create_user(&db, json!({"id": 99, "name": "Sneaky"})).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn list_is_cached_until_a_create_invalidates_it() {
    let db = Database::ephemeral();
    for (name, role) in [("Cy", "admin"), ("Al", "user"), ("Bo", "admin")] {
        create_user(&db, json!({"name": name, "email": format!("{name}@x.io"), "role": role})).unwrap();
    }

    let admins = list_users(&db, 1, 10, Some("admin")).unwrap();
    assert_eq!(admins["total"], json!(2));
    let names: Vec<&str> = admins["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bo", "Cy"]);

    // Served from the cache
    list_users(&db, 1, 10, Some("admin")).unwrap();
    assert_eq!(db.cache().stats().hits, 1);

    create_user(&db, json!({"name": "Di", "email": "di@x.io", "role": "admin"})).unwrap();
    assert!(db.cache().keys_with_prefix("users:list:").is_empty());
    assert_eq!(list_users(&db, 1, 10, Some("admin")).unwrap()["total"], json!(3));
}

#[test]
fn pagination_pages_do_not_overlap() {
    let db = Database::ephemeral();
    for i in 0..5 {
        create_user(&db, json!({"name": format!("u{i}"), "email": format!("u{i}@x.io")})).unwrap();
    }

    let page1 = list_users(&db, 1, 2, None).unwrap();
    let page3 = list_users(&db, 3, 2, None).unwrap();
    assert_eq!(page1["users"].as_array().unwrap().len(), 2);
    assert_eq!(page3["users"].as_array().unwrap().len(), 1);
    assert_eq!(page3["users"][0]["name"], json!("u4"));
    assert_eq!(page1["total"], json!(5));
}

#[test]
fn put_replaces_patch_merges() {
    let db = Database::ephemeral();
    let store = db.store();
    store
        .create("users", Fields::new().with("name", "Ann").with("role", "user"))
        .unwrap();

    let patched = store
        .update("users", 1, Fields::new().with("role", "admin"))
        .unwrap()
        .unwrap();
    assert_eq!(patched.get("name"), Some(Value::from("Ann")));

    let replaced = store
        .replace("users", 1, Fields::new().with("name", "Anna"))
        .unwrap()
        .unwrap();
    assert_eq!(replaced.get("role"), None);
    assert_eq!(replaced.to_json(), json!({"id": 1, "name": "Anna"}));
}
