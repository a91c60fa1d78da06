// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Declarative description of one attached database.
//!
//! A [`DatabaseDef`] is the single source for both the DDL issued when a
//! library is created and the introspection records the validator expects.

use std::fmt::Write;

/// One of the two attached databases of a library session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Database {
    /// `m.db`: tracks, metadata, lists and crates.
    Music,
    /// `p.db`: analysis blobs.
    Perfdata,
}

impl Database {
    /// Schema name the file is attached under.
    pub fn schema_name(self) -> &'static str {
        match self {
            Database::Music => "music",
            Database::Perfdata => "perfdata",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Database::Music => "m.db",
            Database::Perfdata => "p.db",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnDef {
    pub name: &'static str,
    pub ty: &'static str,
    pub not_null: bool,
    pub default: Option<&'static str>,
    /// 1-based position in the primary key, 0 if not part of it.
    pub pk: u32,
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnDef {
    pub fn new(name: &'static str, ty: &'static str) -> Self {
        Self {
            name,
            ty,
            not_null: false,
            default: None,
            pk: 0,
            foreign_key: None,
        }
    }

    pub fn primary_key(mut self, rank: u32) -> Self {
        self.pk = rank;
        self
    }

    pub fn references(
        mut self,
        table: &'static str,
        column: &'static str,
        on_delete: &'static str,
    ) -> Self {
        self.foreign_key = Some(ForeignKey {
            table,
            column,
            on_delete,
        });
        self
    }
}

/// Shorthand for a column with no constraints.
pub(crate) fn col(name: &'static str, ty: &'static str) -> ColumnDef {
    ColumnDef::new(name, ty)
}

/// Shorthand for the `[id] INTEGER` primary key carried by most tables.
pub(crate) fn id() -> ColumnDef {
    ColumnDef::new("id", "INTEGER").primary_key(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableDef {
    pub name: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: &'static str, columns: Vec<ColumnDef>) -> Self {
        Self { name, columns }
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    fn primary_key(&self) -> Vec<&'static str> {
        let mut pk: Vec<_> = self.columns.iter().filter(|c| c.pk > 0).collect();
        pk.sort_by_key(|c| c.pk);
        pk.into_iter().map(|c| c.name).collect()
    }

    /// The index SQLite creates implicitly for a primary key that is not a
    /// rowid alias.
    pub fn auto_index(&self) -> Option<IndexDef> {
        let pk = self.primary_key();
        let rowid_alias = pk.len() == 1
            && self
                .columns
                .iter()
                .any(|c| c.name == pk[0] && c.ty.eq_ignore_ascii_case("INTEGER"));
        if pk.is_empty() || rowid_alias {
            return None;
        }
        Some(IndexDef {
            name: format!("sqlite_autoindex_{}_1", self.name),
            table: self.name,
            unique: true,
            origin: IndexOrigin::PrimaryKey,
            columns: pk,
        })
    }

    pub fn create_sql(&self, schema: &str) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut s = format!("[{}] {}", c.name, c.ty);
                if c.not_null {
                    s.push_str(" NOT NULL");
                }
                if let Some(default) = c.default {
                    let _ = write!(s, " DEFAULT {default}");
                }
                if let Some(fk) = &c.foreign_key {
                    let _ = write!(
                        s,
                        " REFERENCES {} ( [{}] ) ON DELETE {}",
                        fk.table, fk.column, fk.on_delete
                    );
                }
                s
            })
            .collect();
        let pk = self.primary_key();
        if !pk.is_empty() {
            let cols: Vec<String> = pk.iter().map(|c| format!("[{c}]")).collect();
            parts.push(format!("PRIMARY KEY ( {} )", cols.join(", ")));
        }
        format!(
            "CREATE TABLE {schema}.{} ( {} )",
            self.name,
            parts.join(", ")
        )
    }
}

/// How an index came to exist, as reported by `PRAGMA index_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexOrigin {
    Created,
    PrimaryKey,
}

impl IndexOrigin {
    pub fn code(self) -> &'static str {
        match self {
            IndexOrigin::Created => "c",
            IndexOrigin::PrimaryKey => "pk",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexDef {
    pub name: String,
    pub table: &'static str,
    pub unique: bool,
    pub origin: IndexOrigin,
    pub columns: Vec<&'static str>,
}

impl IndexDef {
    pub fn create_sql(&self, schema: &str) -> String {
        format!(
            "CREATE {}INDEX {schema}.{} ON {} ( {} )",
            if self.unique { "UNIQUE " } else { "" },
            self.name,
            self.table,
            self.columns.join(", ")
        )
    }
}

/// A plain (non-unique) explicit index.
pub(crate) fn index(name: &str, table: &'static str, columns: &[&'static str]) -> IndexDef {
    IndexDef {
        name: name.to_owned(),
        table,
        unique: false,
        origin: IndexOrigin::Created,
        columns: columns.to_vec(),
    }
}

/// `index_<table>_<column>` on a single column.
pub(crate) fn column_index(table: &'static str, column: &'static str) -> IndexDef {
    index(&format!("index_{table}_{column}"), table, &[column])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TriggerDef {
    pub name: &'static str,
    pub table: &'static str,
    /// Timing and event, e.g. `AFTER DELETE`.
    pub event: &'static str,
    /// Statements between `BEGIN` and `END`, each terminated by `;`.
    pub body: &'static str,
}

impl TriggerDef {
    pub fn create_sql(&self, schema: &str) -> String {
        format!(
            "CREATE TRIGGER {schema}.{} {} ON {} FOR EACH ROW BEGIN {} END",
            self.name, self.event, self.table, self.body
        )
    }
}

/// The complete expected structure of one attached database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DatabaseDef {
    pub database: Database,
    pub tables: Vec<TableDef>,
    pub indices: Vec<IndexDef>,
    pub triggers: Vec<TriggerDef>,
}

impl DatabaseDef {
    pub fn new(database: Database) -> Self {
        Self {
            database,
            tables: Vec::new(),
            indices: Vec::new(),
            triggers: Vec::new(),
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Apply `f` to a table this definition already contains.
    pub fn alter(&mut self, table: &str, f: impl FnOnce(&mut TableDef)) {
        match self.tables.iter_mut().find(|t| t.name == table) {
            Some(t) => f(t),
            None => debug_assert!(false, "no table {table} to alter"),
        }
    }

    pub fn add_column(&mut self, table: &str, column: ColumnDef) {
        self.alter(table, |t| t.columns.push(column));
    }

    pub fn set_column_type(&mut self, table: &str, column: &str, ty: &'static str) {
        self.alter(table, |t| match t.column_mut(column) {
            Some(c) => c.ty = ty,
            None => debug_assert!(false, "no column {table}.{column}"),
        });
    }

    /// Explicit indices plus primary-key autoindexes of `table`.
    pub fn expected_indices(&self, table: &TableDef) -> Vec<IndexDef> {
        let mut out: Vec<IndexDef> = self
            .indices
            .iter()
            .filter(|i| i.table == table.name)
            .cloned()
            .collect();
        out.extend(table.auto_index());
        out
    }

    /// Every DDL statement needed to build this database from scratch.
    pub fn ddl(&self) -> Vec<String> {
        let schema = self.database.schema_name();
        self.tables
            .iter()
            .map(|t| t.create_sql(schema))
            .chain(self.indices.iter().map(|i| i.create_sql(schema)))
            .chain(self.triggers.iter().map(|t| t.create_sql(schema)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> TableDef {
        TableDef::new(
            "MetaData",
            vec![
                col("id", "INTEGER")
                    .references("Track", "id", "CASCADE")
                    .primary_key(1),
                col("type", "INTEGER").primary_key(2),
                col("text", "TEXT"),
            ],
        )
    }

    #[test]
    fn test_table_sql() {
        assert_eq!(
            metadata().create_sql("music"),
            "CREATE TABLE music.MetaData ( [id] INTEGER REFERENCES Track ( [id] ) ON DELETE CASCADE, \
             [type] INTEGER, [text] TEXT, PRIMARY KEY ( [id], [type] ) )"
        );
    }

    #[test]
    fn test_composite_key_has_autoindex() {
        let auto = metadata().auto_index().unwrap();
        assert_eq!(auto.name, "sqlite_autoindex_MetaData_1");
        assert_eq!(auto.columns, vec!["id", "type"]);
        assert_eq!(auto.origin, IndexOrigin::PrimaryKey);
    }

    #[test]
    fn test_integer_key_is_rowid_alias() {
        let table = TableDef::new("Crate", vec![id(), col("title", "TEXT")]);
        assert!(table.auto_index().is_none());
    }

    #[test]
    fn test_index_sql() {
        assert_eq!(
            column_index("Track", "path").create_sql("music"),
            "CREATE INDEX music.index_Track_path ON Track ( path )"
        );
    }
}
