//! The contract every connector honors, checked through the facade against each backend.

mod common;

use anyhow::Result;
use common::{connectors, schema};
use larder::{record, Conditions, Fetched, Query, Storage, StorageError, Value};

#[tokio::test]
async fn test_end_to_end() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![], true).await?;

        let created = storage.create("T", record! { "a" => "x" }).await?;
        let id = created.id().cloned().expect("assigned id");
        assert_eq!(created.get("a"), Some(&Value::from("x")), "{name}");

        let found = storage.get("T", Query::eq("a", "x")).await?.into_many();
        assert_eq!(found.len(), 1, "{name}");
        assert_eq!(found[0].id(), Some(&id), "{name}");

        let updated = storage.update("T", id.clone(), record! { "a" => "y" }).await?;
        assert_eq!(updated.get("a"), Some(&Value::from("y")), "{name}");
        assert_eq!(storage.get("T", Query::Id(id.clone())).await?.into_one().as_ref().and_then(|r| r.get("a")), Some(&Value::from("y")), "{name}");

        assert_eq!(storage.remove("T", Query::Id(id.clone())).await?, 1, "{name}");
        assert_eq!(storage.get("T", Query::Id(id)).await?, Fetched::One(None), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_get_result_shapes() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![record! { "a" => "x" }, record! { "a" => "y" }], false).await?;

        assert!(matches!(storage.get("T", Query::id(1)).await?, Fetched::One(Some(_))), "{name}");
        assert!(matches!(storage.get("T", Query::id(99)).await?, Fetched::One(None)), "{name}");
        assert!(matches!(storage.get("T", Query::All).await?, Fetched::Many(ref rows) if rows.len() == 2), "{name}");
        assert!(matches!(storage.get("T", Query::eq("a", "nope")).await?, Fetched::Many(ref rows) if rows.is_empty()), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_ensure_table_is_idempotent() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![], false).await?;
        storage.create("T", record! { "a" => "x" }).await?;
        storage.ensure_table("T", &schema(), vec![], false).await?;
        storage.ensure_table("T", &schema(), vec![], false).await?;
        assert_eq!(storage.get("T", Query::All).await?.len(), 1, "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_remove_nothing_is_not_an_error() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![record! { "a" => "x" }], false).await?;

        assert_eq!(storage.remove("T", Query::id(42)).await?, 0, "{name}");
        assert_eq!(storage.remove("T", Query::eq("a", "nope")).await?, 0, "{name}");
        assert_eq!(storage.get("T", Query::All).await?.len(), 1, "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_remove_by_compiled_conditions() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        let seed = ["bar", "qux", "fred", "zed"].into_iter().map(|foo| record! { "foo" => foo, "baz" => "bal" }).collect();
        storage.ensure_table("testSQLTable", &schema(), seed, false).await?;

        let query = Conditions::new().any_of("foo", ["bar", "qux", "fred"]).eq("baz", "bal");
        assert_eq!(storage.remove("testSQLTable", query).await?, 3, "{name}");

        let left = storage.get("testSQLTable", Query::All).await?.into_many();
        assert_eq!(left.len(), 1, "{name}");
        assert_eq!(left[0].id(), Some(&Value::Integer(4)), "{name}");
        assert_eq!(left[0].get("foo"), Some(&Value::from("zed")), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_ids_match_across_backends() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![record! { "a" => "x" }, record! { "a" => "y" }], false).await?;
        storage.remove("T", Query::id(2)).await?;
        storage.clear_table("T").await?;

        // never reused, not even after a clear
        assert_eq!(storage.create("T", record! { "a" => "z" }).await?.id(), Some(&Value::Integer(3)), "{name}");
        assert_eq!(storage.create("T", record! { "id" => 10, "a" => "w" }).await?.id(), Some(&Value::Integer(10)), "{name}");
        assert_eq!(storage.create("T", record! { "a" => "v" }).await?.id(), Some(&Value::Integer(11)), "{name}");

        let err = storage.create("T", record! { "id" => 10, "a" => "u" }).await.unwrap_err();
        assert!(matches!(err, StorageError::RecordExists { .. }), "{name}: {err}");
    }
    Ok(())
}

#[tokio::test]
async fn test_failure_surface() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);

        assert!(storage.get("ghost", Query::All).await.unwrap_err().is_table_not_exist(), "{name}");
        assert!(storage.create("ghost", record! { "a" => "x" }).await.unwrap_err().is_table_not_exist(), "{name}");
        assert!(storage.update("ghost", 1, record! { "a" => "x" }).await.unwrap_err().is_table_not_exist(), "{name}");
        assert!(storage.remove("ghost", Query::All).await.unwrap_err().is_table_not_exist(), "{name}");
        assert!(storage.clear_table("ghost").await.unwrap_err().is_table_not_exist(), "{name}");

        storage.ensure_table("T", &schema(), vec![], false).await?;
        assert!(storage.update("T", 7, record! { "a" => "x" }).await.unwrap_err().is_record_not_exist(), "{name}");

        let err = storage.ensure_table("drop table", &schema(), vec![], false).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_update_merges_and_keeps_id() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![record! { "a" => "x", "foo" => "f" }], false).await?;

        let merged = storage.update("T", 1, record! { "id" => 99, "a" => "y" }).await?;
        assert_eq!(merged.id(), Some(&Value::Integer(1)), "{name}");
        assert_eq!(merged.get("a"), Some(&Value::from("y")), "{name}");
        assert_eq!(merged.get("foo"), Some(&Value::from("f")), "{name}");
        assert_eq!(storage.get("T", Query::id(99)).await?.into_one(), None, "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_failed_seed_leaves_table_untouched() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        storage.ensure_table("T", &schema(), vec![record! { "a" => "keep" }], false).await?;

        let seed = vec![record! { "id" => 50, "a" => "s1" }, record! { "id" => 50, "a" => "s2" }];
        let err = storage.ensure_table("T", &schema(), seed, true).await.unwrap_err();
        assert!(matches!(err, StorageError::RecordExists { .. }), "{name}: {err}");

        let rows = storage.get("T", Query::All).await?.into_many();
        assert_eq!(rows.len(), 1, "{name}");
        assert_eq!(rows[0].id(), Some(&Value::from(1)), "{name}");
        assert_eq!(rows[0].get("a"), Some(&Value::from("keep")), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn test_null_matching() -> Result<()> {
    for (name, connector) in connectors().await? {
        let storage = Storage::new(connector);
        let seed = vec![record! { "foo" => "x" }, record! { "a" => "x", "foo" => "y" }, record! { "a" => "z", "foo" => "y" }];
        storage.ensure_table("T", &schema(), seed, false).await?;

        let ids = |rows: Vec<larder::Record>| rows.into_iter().filter_map(|r| r.id().cloned()).collect::<Vec<_>>();

        // a field that was never written compares as null
        assert_eq!(ids(storage.get("T", Query::eq("a", Value::Null)).await?.into_many()), vec![Value::from(1)], "{name}");
        assert_eq!(ids(storage.get("T", Query::any_of("a", [Value::Null, Value::from("x")])).await?.into_many()), vec![Value::from(1), Value::from(2)], "{name}");
        assert!(storage.get("T", Query::any_of("a", ["x", "z"])).await?.into_many().iter().all(|r| r.id() != Some(&Value::from(1))), "{name}");

        // null clauses combine with the rest of the conjunction
        let query = Query::from(Conditions::new().any_of("a", [Value::Null, Value::from("z")]).eq("foo", "y"));
        assert_eq!(ids(storage.get("T", query.clone()).await?.into_many()), vec![Value::from(3)], "{name}");

        assert_eq!(storage.remove("T", query).await?, 1, "{name}");
        assert_eq!(storage.remove("T", Query::eq("a", Value::Null)).await?, 1, "{name}");
        assert_eq!(ids(storage.get("T", Query::All).await?.into_many()), vec![Value::from(2)], "{name}");
    }
    Ok(())
}
