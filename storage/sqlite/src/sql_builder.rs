//! SQL statement text for the SQLite connector.
//!
//! The generated text is compared verbatim by consumers that log or replay statements, so column
//! order follows the record's insertion order and WHERE clauses follow the compiled clause order
//! (equality before membership). Identifiers are emitted unquoted; callers only pass names that
//! passed the `[A-Za-z_][A-Za-z0-9_]*` check.

use larder_proto::{Record, Schema, TableName, Value, ID_FIELD};
use larder_query::Clause;

/// Statement text plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Default)]
pub struct SqlBuilder {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn push_sql(&mut self, s: &str) -> &mut Self {
        self.sql.push_str(s);
        self
    }

    pub fn push_param(&mut self, value: Value) -> &mut Self {
        self.sql.push('?');
        self.params.push(value);
        self
    }

    /// Comma separated placeholders, one per value
    fn push_params(&mut self, values: impl IntoIterator<Item = Value>) -> &mut Self {
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.push_sql(", ");
            }
            self.push_param(value);
        }
        self
    }

    pub fn clause(&mut self, clause: &Clause) -> &mut Self {
        match clause {
            Clause::Eq { field, value } => self.push_sql(field).push_sql("=").push_param(value.clone()),
            Clause::In { field, values } => self.push_sql(field).push_sql(" IN (").push_params(values.iter().cloned()).push_sql(")"),
        }
    }

    /// Appends ` WHERE a AND b ...`, or nothing for an empty clause list
    pub fn where_clauses(&mut self, clauses: &[Clause]) -> &mut Self {
        for (i, clause) in clauses.iter().enumerate() {
            self.push_sql(if i == 0 { " WHERE " } else { " AND " });
            self.clause(clause);
        }
        self
    }

    pub fn build(self) -> Statement { Statement { sql: self.sql, params: self.params } }
}

pub fn build_create_table(table: &TableName, schema: &Schema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (id INTEGER PRIMARY KEY AUTOINCREMENT");
    for column in schema.columns() {
        sql.push_str(&format!(", {} {}", column.name, column.sql_type));
    }
    sql.push(')');
    sql
}

/// Every field of `record` in insertion order. `id` is only present if the caller set it.
pub fn build_insert(table: &TableName, record: &Record) -> Statement {
    let mut builder = SqlBuilder::new();
    builder.push_sql(&format!("INSERT INTO {table}"));
    if record.is_empty() {
        builder.push_sql(" DEFAULT VALUES");
    } else {
        let fields: Vec<&str> = record.fields().collect();
        builder.push_sql(&format!(" ({}) VALUES (", fields.join(", ")));
        builder.push_params(record.iter().map(|(_, v)| v.clone())).push_sql(")");
    }
    builder.build()
}

/// `None` when `record` has nothing to set besides its id
pub fn build_update(table: &TableName, id: &Value, record: &Record) -> Option<Statement> {
    let mut fields = record.iter().filter(|(field, _)| *field != ID_FIELD).peekable();
    fields.peek()?;

    let mut builder = SqlBuilder::new();
    builder.push_sql(&format!("UPDATE {table} SET "));
    for (i, (field, value)) in fields.enumerate() {
        if i > 0 {
            builder.push_sql(", ");
        }
        builder.push_sql(field).push_sql("=").push_param(value.clone());
    }
    builder.push_sql(" WHERE id=").push_param(id.clone());
    Some(builder.build())
}

pub fn build_select(table: &TableName, clauses: &[Clause]) -> Statement {
    let mut builder = SqlBuilder::new();
    builder.push_sql(&format!("SELECT * FROM {table}")).where_clauses(clauses);
    builder.build()
}

/// Without clauses this truncates the table
pub fn build_delete(table: &TableName, clauses: &[Clause]) -> Statement {
    let mut builder = SqlBuilder::new();
    builder.push_sql(&format!("DELETE FROM {table}")).where_clauses(clauses);
    builder.build()
}
