use serde::{Deserialize, Serialize};

use crate::record::ID_FIELD;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str { &self.0 }

    /// Table and column names are interpolated into SQL unquoted, so every backend accepts only
    /// `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn is_sane(&self) -> bool { sane_identifier(&self.0) }
}

pub fn sane_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl From<&str> for TableName {
    fn from(val: &str) -> Self { TableName(val.to_string()) }
}
impl From<String> for TableName {
    fn from(val: String) -> Self { TableName(val) }
}
impl From<&TableName> for TableName {
    fn from(val: &TableName) -> Self { val.clone() }
}
impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool { self.0 == other }
}
impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str { &self.0 }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

/// A declared column. `sql_type` is passed through verbatim to `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: String,
}

/// Ordered column declarations for a table. Only the SQL connector acts on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new() -> Self { Self::default() }

    /// Appends a column. A column named `id` is skipped since the primary key is implicit.
    pub fn column(mut self, name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        let name = name.into();
        if name != ID_FIELD && !self.has_column(&name) {
            self.columns.push(Column { name, sql_type: sql_type.into() });
        }
        self
    }

    pub fn columns(&self) -> &[Column] { &self.columns }

    pub fn has_column(&self, name: &str) -> bool { self.columns.iter().any(|c| c.name == name) }

    pub fn sql_type(&self, name: &str) -> Option<&str> { self.columns.iter().find(|c| c.name == name).map(|c| c.sql_type.as_str()) }

    pub fn is_empty(&self) -> bool { self.columns.is_empty() }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Schema {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self { iter.into_iter().fold(Schema::new(), |schema, (k, v)| schema.column(k, v)) }
}
