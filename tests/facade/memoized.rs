//! Memoized service lookups backed by the store

use std::sync::Arc;

use collstore::{cache_key, Database, Error, Fields, Memoized, Value};
use serde_json::{json, Value as Json};

fn user_by_email(db: &Database, memo: &Memoized<Json>, email: &str) -> Result<Json, Error> {
    memo.call("user_by_email", email, || {
        let found = db.store().find_by_field("users", "email", &Value::from(email))?;
        Ok::<_, Error>(found.first().map(|r| r.to_json()).unwrap_or(Json::Null))
    })
}

#[test]
fn memoized_lookup_hits_cache_after_first_call() {
    let db = Database::ephemeral();
    db.store()
        .create("users", Fields::new().with("email", "ann@x.io"))
        .unwrap();
    let memo = Memoized::new(Arc::clone(db.cache()), "svc");

    let first = user_by_email(&db, &memo, "ann@x.io").unwrap();
    assert_eq!(first, json!({"id": 1, "email": "ann@x.io"}));

    // A store change is invisible until the entry is invalidated
    db.store()
        .update("users", 1, Fields::new().with("name", "Ann"))
        .unwrap();
    assert_eq!(user_by_email(&db, &memo, "ann@x.io").unwrap(), first);

    assert!(memo.invalidate("user_by_email", "ann@x.io").unwrap());
    let fresh = user_by_email(&db, &memo, "ann@x.io").unwrap();
    assert_eq!(fresh["name"], json!("Ann"));
}

#[test]
fn memoized_key_matches_cache_key_helper() {
    let db = Database::ephemeral();
    let memo: Memoized<Json> = Memoized::new(Arc::clone(db.cache()), "svc");
    memo.call("f", &(1, "a"), || Ok::<_, Error>(json!(true))).unwrap();

    let key = cache_key("svc", "f", &(1, "a")).unwrap();
    assert!(db.cache().exists(&key));
    assert_eq!(db.cache().keys_with_prefix("svc:f:"), vec![key]);
}
