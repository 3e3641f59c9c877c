use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use async_trait::async_trait;
use larder_core::{error::check_table_name, Fetched, StorageConnector, StorageError};
use larder_proto::{sane_identifier, Record, Schema, TableName, Value, ID_FIELD};
use larder_query::selection::filter::{evaluate_clause, evaluate_clauses};
use larder_query::{Clause, Query};
use rusqlite::{params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use crate::connection::{SqliteConfig, SqliteConnectionManager};
use crate::error::SqliteError;
use crate::sql_builder::{build_create_table, build_delete, build_insert, build_select, build_update, Statement};
use crate::value::{from_sql, to_sql};

/// Connector that keeps each table as a real SQLite table with one column per declared field.
///
/// Fields outside a table's declared schema are dropped when a record is written.
pub struct SqliteConnector {
    pool: bb8::Pool<SqliteConnectionManager>,
    // declared columns per table, filled by ensure_table or read back from the database
    schemas: RwLock<HashMap<TableName, Schema>>,
}

impl SqliteConnector {
    pub fn new(pool: bb8::Pool<SqliteConnectionManager>) -> Self { Self { pool, schemas: RwLock::new(HashMap::new()) } }

    pub async fn connect(config: SqliteConfig) -> anyhow::Result<Self> {
        let manager = SqliteConnectionManager::new(config)?;
        let pool = manager.pool_builder().build(manager).await?;
        Ok(Self::new(pool))
    }

    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> { Self::connect(SqliteConfig::File(path.as_ref().to_path_buf())).await }

    pub async fn open_read_only(path: impl AsRef<Path>) -> anyhow::Result<Self> { Self::connect(SqliteConfig::ReadOnly(path.as_ref().to_path_buf())).await }

    pub async fn open_in_memory() -> anyhow::Result<Self> { Self::connect(SqliteConfig::Memory).await }

    pub fn pool(&self) -> &bb8::Pool<SqliteConnectionManager> { &self.pool }

    /// Runs `f` inside one transaction on a pooled connection. Commits if `f` returns `Ok`,
    /// rolls back otherwise.
    pub async fn execute_within_transaction<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.pool.get().await.map_err(|e| SqliteError::Pool(e.to_string()))?;
        conn.run(move |c| {
            let tx = c.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;
            Ok(result)
        })
        .await
    }

    pub async fn list_tables(&self) -> Result<Vec<TableName>, StorageError> {
        let tables = self.execute_within_transaction(|c| Ok(user_tables(c)?)).await?;
        Ok(tables.into_iter().map(TableName::from).collect())
    }

    pub async fn delete_all_tables(&self) -> Result<bool, StorageError> {
        let any_deleted = self
            .execute_within_transaction(|c| {
                let tables = user_tables(c)?;
                for table in &tables {
                    c.execute(&format!(r#"DROP TABLE IF EXISTS "{table}""#), [])?;
                }
                Ok(!tables.is_empty())
            })
            .await?;
        self.schemas.write().expect("RwLock poisoned").clear();
        Ok(any_deleted)
    }

    /// Declared columns of `table`, from the cache or from the database
    async fn schema(&self, table: &TableName) -> Result<Schema, StorageError> {
        let cached = self.schemas.read().expect("RwLock poisoned").get(table).cloned();
        if let Some(schema) = cached {
            return Ok(schema);
        }
        check_table_name(table)?;

        let schema = self.transaction(table, |c, table| read_schema(c, table)).await?;
        let schema = schema.ok_or_else(|| StorageError::TableNotExist(table.clone()))?;

        debug!("sqlite: loaded schema of {table}: {:?}", schema);
        self.schemas.write().expect("RwLock poisoned").insert(table.clone(), schema.clone());
        Ok(schema)
    }

    async fn transaction<F, T>(&self, table: &TableName, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection, &TableName) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let name = table.clone();
        self.execute_within_transaction(move |c| f(c, &name)).await.map_err(|e| e.into_storage_error(table))
    }
}

#[async_trait]
impl StorageConnector for SqliteConnector {
    async fn ensure_table(&self, table: &TableName, schema: &Schema, seed: Vec<Record>, reset: bool) -> Result<(), StorageError> {
        check_table_name(table)?;
        check_schema(schema)?;

        let create = build_create_table(table, schema);
        let effective = self
            .transaction(table, move |c, table| {
                exec(c, &Statement { sql: create, params: vec![] })?;
                if reset {
                    exec(c, &build_delete(table, &[]))?;
                }
                // an existing table keeps the columns it was created with
                let effective = read_schema(c, table)?.unwrap_or_default();
                for record in &seed {
                    insert_record(c, table, &effective, record)?;
                }
                Ok(effective)
            })
            .await?;

        self.schemas.write().expect("RwLock poisoned").insert(table.clone(), effective);
        Ok(())
    }

    async fn create(&self, table: &TableName, record: Record) -> Result<Record, StorageError> {
        let schema = self.schema(table).await?;
        self.transaction(table, move |c, table| insert_record(c, table, &schema, &record)).await
    }

    async fn get(&self, table: &TableName, query: &Query) -> Result<Fetched, StorageError> {
        let schema = self.schema(table).await?;
        match query {
            Query::Id(id) => {
                let stmt = build_select(table, &[Clause::id(id.clone())]);
                let rows = self.transaction(table, move |c, _| select(c, &stmt, &schema)).await?;
                Ok(Fetched::One(rows.into_iter().next()))
            }
            query => {
                let Some(plan) = plan_clauses(table, &schema, query.clauses()) else { return Ok(Fetched::Many(vec![])) };
                let stmt = build_select(table, &plan.pushdown);
                let rows = self.transaction(table, move |c, _| select(c, &stmt, &schema)).await?;
                Ok(Fetched::Many(plan.keep(rows)))
            }
        }
    }

    async fn update(&self, table: &TableName, id: &Value, partial: Record) -> Result<Record, StorageError> {
        let schema = self.schema(table).await?;
        let id = id.clone();
        self.transaction(table, move |c, table| {
            let by_id = build_select(table, &[Clause::id(id.clone())]);
            if select(c, &by_id, &schema)?.is_empty() {
                return Err(StorageError::RecordNotExist { table: table.clone(), id }.into());
            }
            if let Some(stmt) = build_update(table, &id, &declared_fields(table, &schema, &partial)) {
                exec(c, &stmt)?;
            }
            let merged = select(c, &by_id, &schema)?.into_iter().next();
            merged.ok_or_else(|| StorageError::RecordNotExist { table: table.clone(), id }.into())
        })
        .await
    }

    async fn remove(&self, table: &TableName, query: &Query) -> Result<usize, StorageError> {
        let schema = self.schema(table).await?;
        let plan = match query {
            Query::Id(id) => Plan { pushdown: vec![Clause::id(id.clone())], residual: vec![] },
            query => match plan_clauses(table, &schema, query.clauses()) {
                Some(plan) => plan,
                None => return Ok(0),
            },
        };
        self.transaction(table, move |c, table| {
            if plan.residual.is_empty() {
                return exec(c, &build_delete(table, &plan.pushdown));
            }
            // the rows are picked here and deleted by id
            let rows = plan.keep(select(c, &build_select(table, &plan.pushdown), &schema)?);
            let ids: Vec<Value> = rows.into_iter().filter_map(|r| r.id().cloned()).collect();
            if ids.is_empty() {
                return Ok(0);
            }
            exec(c, &build_delete(table, &[Clause::In { field: ID_FIELD.to_string(), values: ids }]))
        })
        .await
    }

    async fn clear_table(&self, table: &TableName) -> Result<(), StorageError> {
        self.schema(table).await?;
        let stmt = build_delete(table, &[]);
        self.transaction(table, move |c, _| exec(c, &stmt)).await?;
        Ok(())
    }
}

fn check_schema(schema: &Schema) -> Result<(), StorageError> {
    for column in schema.columns() {
        if !sane_identifier(&column.name) {
            return Err(StorageError::InvalidName(column.name.clone()));
        }
        // types like `VARCHAR(20)` or `UNSIGNED BIG INT` are fine, anything else is not interpolated
        if !column.sql_type.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '(' | ')' | ',')) {
            return Err(StorageError::InvalidName(column.sql_type.clone()));
        }
    }
    Ok(())
}

fn user_tables(c: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut stmt = c.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")?;
    let tables = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<String>, _>>()?;
    Ok(tables)
}

/// `None` if the table does not exist
fn read_schema(c: &Connection, table: &TableName) -> Result<Option<Schema>, SqliteError> {
    let mut stmt = c.prepare("SELECT name, type FROM pragma_table_info(?)")?;
    let columns = stmt.query_map([table.as_str()], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?.collect::<Result<Vec<_>, _>>()?;
    if columns.is_empty() {
        return Ok(None);
    }
    Ok(Some(columns.into_iter().collect()))
}

fn exec(c: &Connection, stmt: &Statement) -> Result<usize, SqliteError> {
    debug!("sqlite: {} with {} params", stmt.sql, stmt.params.len());
    Ok(c.execute(&stmt.sql, params_from_iter(stmt.params.iter().map(to_sql)))?)
}

fn select(c: &Connection, stmt: &Statement, schema: &Schema) -> Result<Vec<Record>, SqliteError> {
    debug!("sqlite: {} with {} params", stmt.sql, stmt.params.len());
    let mut prepared = c.prepare(&stmt.sql)?;
    let names: Vec<String> = prepared.column_names().into_iter().map(String::from).collect();
    let mut rows = prepared.query(params_from_iter(stmt.params.iter().map(to_sql)))?;

    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            record.insert(name.as_str(), from_sql(row.get_ref(i)?, schema.sql_type(name)));
        }
        records.push(record);
    }
    Ok(records)
}

/// The fields of `record` that `schema` declares, plus `id`. The rest are dropped.
fn declared_fields(table: &TableName, schema: &Schema, record: &Record) -> Record {
    let (kept, dropped): (Vec<_>, Vec<_>) = record.iter().partition(|(field, _)| *field == ID_FIELD || schema.has_column(field));
    if !dropped.is_empty() {
        let names: Vec<&str> = dropped.iter().map(|(field, _)| *field).collect();
        debug!("sqlite: {table} does not declare {:?}, dropping them", names);
    }
    kept.into_iter().map(|(field, value)| (field, value.clone())).collect()
}

fn insert_record(c: &Connection, table: &TableName, schema: &Schema, record: &Record) -> Result<Record, SqliteError> {
    if let Some(id) = record.id() {
        let exists = c
            .query_row(&format!("SELECT 1 FROM {table} WHERE id=?"), [to_sql(id)], |_| Ok(()))
            .optional()?
            .is_some();
        if exists {
            return Err(StorageError::RecordExists { table: table.clone(), id: id.clone() }.into());
        }
    }

    exec(c, &build_insert(table, &declared_fields(table, schema, record)))?;
    let id = c.last_insert_rowid();
    debug!("{table}: stored record {id}");

    let stored = select(c, &build_select(table, &[Clause::id(Value::Integer(id))]), schema)?.into_iter().next();
    stored.ok_or_else(|| StorageError::RecordNotExist { table: table.clone(), id: Value::Integer(id) }.into())
}

/// Compiled clauses split by where they are evaluated
#[derive(Debug, Default, PartialEq)]
struct Plan {
    /// rendered into the statement's WHERE clause
    pushdown: Vec<Clause>,
    /// clauses naming `Null`, which SQL `=` and `IN` never match; checked against the fetched rows
    residual: Vec<Clause>,
}

impl Plan {
    fn keep(&self, rows: Vec<Record>) -> Vec<Record> { rows.into_iter().filter(|r| evaluate_clauses(r, &self.residual)).collect() }
}

/// Clauses on columns the table does not declare are decided up front, treating the column as
/// NULL: a clause that holds for NULL is dropped, one that does not makes the query match
/// nothing (`None`).
fn plan_clauses(table: &TableName, schema: &Schema, clauses: Vec<Clause>) -> Option<Plan> {
    let mut plan = Plan::default();
    for clause in clauses {
        if clause.field() != ID_FIELD && !schema.has_column(clause.field()) {
            if !evaluate_clause(&Record::new(), &clause) {
                debug!("sqlite: {table} has no column {}, nothing can match", clause.field());
                return None;
            }
            debug!("sqlite: {table} has no column {}, treating it as NULL", clause.field());
        } else if clause.values().iter().any(Value::is_null) {
            plan.residual.push(clause);
        } else {
            plan.pushdown.push(clause);
        }
    }
    Some(plan)
}
