mod common;

use std::sync::Arc;

use anyhow::Result;
use common::schema;
use larder::{record, MemoryConnector, Query, SledConnector, SqliteConnector, Storage};

#[tokio::test]
async fn test_swap_starts_from_the_new_namespace() -> Result<()> {
    let storage = Storage::default();
    storage.ensure_table("T", &schema(), vec![record! { "a" => "x" }], false).await?;

    let memory = storage.set_connector(Arc::new(SqliteConnector::open_in_memory().await?));
    assert!(storage.get("T", Query::All).await.unwrap_err().is_table_not_exist());
    storage.ensure_table("T", &schema(), vec![], false).await?;
    assert!(storage.get("T", Query::All).await?.is_empty());

    storage.set_connector(Arc::new(SledConnector::new_test()?));
    assert!(storage.get("T", Query::All).await.unwrap_err().is_table_not_exist());

    // the first connector kept its table
    storage.set_connector(memory);
    assert_eq!(storage.get("T", Query::eq("a", "x")).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_memory_connectors_do_not_share_tables() -> Result<()> {
    let first = Storage::new(Arc::new(MemoryConnector::new()));
    let second = Storage::new(Arc::new(MemoryConnector::new()));
    first.ensure_table("T", &schema(), vec![], false).await?;
    assert!(second.get("T", Query::All).await.unwrap_err().is_table_not_exist());
    Ok(())
}

#[tokio::test]
async fn test_json_queries() -> Result<()> {
    let storage = Storage::default();
    let seed = ["bar", "qux", "fred", "zed"].into_iter().map(|foo| record! { "foo" => foo, "baz" => "bal" }).collect();
    storage.ensure_table("T", &schema(), seed, false).await?;

    let query = Query::try_from(serde_json::json!({ "foo": ["bar", "qux", "fred"], "baz": "bal" }))?;
    assert_eq!(storage.get("T", query).await?.len(), 3);

    let by_id = Query::try_from(serde_json::json!(4))?;
    assert_eq!(storage.get("T", by_id).await?.into_one().and_then(|r| r.get("foo").cloned()), Some("zed".into()));

    assert_eq!(storage.get("T", Query::try_from(serde_json::Value::Null)?).await?.len(), 4);
    Ok(())
}
