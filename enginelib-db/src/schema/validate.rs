// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Structural comparison of an attached database against its manifest.
//!
//! The catalogue is read through the master table and the `pragma_*`
//! table-valued functions, then walked in name order alongside the manifest.
//! The first difference found is reported as [`Error::SchemaMismatch`].

use std::cmp::Ordering;

use rusqlite::Connection;
use tracing::trace;

use crate::error::{Error, Result};

use super::model::{ColumnDef, DatabaseDef, IndexDef, TableDef, TriggerDef};

struct ColumnInfo {
    name: String,
    ty: String,
    not_null: bool,
    default: Option<String>,
    pk: u32,
}

struct IndexInfo {
    name: String,
    unique: bool,
    origin: String,
    partial: bool,
}

/// Names of user objects of one kind (`table` or `trigger`), sorted.
fn master_list(conn: &Connection, schema: &str, kind: &str) -> Result<Vec<String>> {
    let sql = format!("SELECT name FROM {schema}.sqlite_master WHERE type = ?1");
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut names = stmt
        .query_map([kind], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    names.retain(|n| !n.starts_with("sqlite_"));
    names.sort();
    Ok(names)
}

fn table_info(conn: &Connection, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare_cached(
        r#"SELECT name, type, "notnull", dflt_value, pk FROM pragma_table_info(?1, ?2)"#,
    )?;
    let mut columns = stmt
        .query_map([table, schema], |row| {
            Ok(ColumnInfo {
                name: row.get(0)?,
                ty: row.get(1)?,
                not_null: row.get::<_, i64>(2)? != 0,
                default: row.get(3)?,
                pk: row.get(4)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    columns.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(columns)
}

fn index_list(conn: &Connection, schema: &str, table: &str) -> Result<Vec<IndexInfo>> {
    let mut stmt = conn.prepare_cached(
        r#"SELECT name, "unique", origin, partial FROM pragma_index_list(?1, ?2)"#,
    )?;
    let mut indices = stmt
        .query_map([table, schema], |row| {
            Ok(IndexInfo {
                name: row.get(0)?,
                unique: row.get::<_, i64>(1)? != 0,
                origin: row.get(2)?,
                partial: row.get::<_, i64>(3)? != 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    indices.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(indices)
}

/// Column names of an index in key order. Expression columns have no name.
fn index_info(conn: &Connection, schema: &str, index: &str) -> Result<Vec<Option<String>>> {
    let mut stmt =
        conn.prepare_cached("SELECT name FROM pragma_index_info(?1, ?2) ORDER BY seqno")?;
    let columns = stmt
        .query_map([index, schema], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Walk two name-sorted sequences in lock-step.
///
/// Names present on only one side are reported as `missing` or `unexpected`
/// through `object`; matching pairs are handed to `compare`.
fn merge<E, A>(
    database: &str,
    expected: &[E],
    actual: &[A],
    expected_name: impl Fn(&E) -> &str,
    actual_name: impl Fn(&A) -> &str,
    object: impl Fn(&str) -> String,
    mut compare: impl FnMut(&E, &A) -> Result<()>,
) -> Result<()> {
    let (mut e, mut a) = (expected.iter().peekable(), actual.iter().peekable());
    loop {
        let order = match (e.peek(), a.peek()) {
            (None, None) => return Ok(()),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(x), Some(y)) => expected_name(*x).cmp(actual_name(*y)),
        };
        match order {
            Ordering::Equal => {
                if let (Some(x), Some(y)) = (e.next(), a.next()) {
                    compare(x, y)?;
                }
            }
            Ordering::Less => {
                let name = e.peek().map(|x| expected_name(*x)).unwrap_or_default();
                return Err(Error::schema_mismatch(database, object(name), "missing"));
            }
            Ordering::Greater => {
                let name = a.peek().map(|y| actual_name(*y)).unwrap_or_default();
                return Err(Error::schema_mismatch(database, object(name), "unexpected"));
            }
        }
    }
}

fn compare_column(database: &str, table: &str, expected: &ColumnDef, actual: &ColumnInfo) -> Result<()> {
    let mismatch = |detail: String| {
        Err(Error::schema_mismatch(
            database,
            format!("{table}.{}", expected.name),
            detail,
        ))
    };
    if actual.ty != expected.ty {
        return mismatch(format!("wrong type: {}, expected {}", actual.ty, expected.ty));
    }
    if actual.not_null != expected.not_null {
        return mismatch("wrong nullability".into());
    }
    if actual.default.as_deref() != expected.default {
        return mismatch(format!(
            "wrong default: {}, expected {}",
            actual.default.as_deref().unwrap_or("NULL"),
            expected.default.unwrap_or("NULL")
        ));
    }
    if actual.pk != expected.pk {
        return mismatch("wrong primary key membership".into());
    }
    Ok(())
}

fn compare_index(
    conn: &Connection,
    database: &str,
    expected: &IndexDef,
    actual: &IndexInfo,
) -> Result<()> {
    let mismatch = |detail: &str| Err(Error::schema_mismatch(database, expected.name.as_str(), detail));
    if actual.unique != expected.unique {
        return mismatch("wrong uniqueness");
    }
    if actual.origin != expected.origin.code() {
        return mismatch("wrong creation method");
    }
    if actual.partial {
        return mismatch("wrong partiality");
    }

    let columns = index_info(conn, database, &expected.name)?;
    for (pos, &column) in expected.columns.iter().enumerate() {
        let object = format!("{}.{column}", expected.name);
        if columns.get(pos).and_then(|c| c.as_deref()) == Some(column) {
            continue;
        }
        let detail = if columns.iter().any(|c| c.as_deref() == Some(column)) {
            "wrong order"
        } else {
            "missing"
        };
        return Err(Error::schema_mismatch(database, object, detail));
    }
    if let Some(extra) = columns.get(expected.columns.len()) {
        let name = extra.as_deref().unwrap_or("<expression>");
        return Err(Error::schema_mismatch(
            database,
            format!("{}.{name}", expected.name),
            "unexpected",
        ));
    }
    Ok(())
}

fn validate_table(conn: &Connection, def: &DatabaseDef, table: &TableDef) -> Result<()> {
    let database = def.database.schema_name();
    trace!(database, table = table.name, "validating table");

    let mut columns: Vec<&ColumnDef> = table.columns.iter().collect();
    columns.sort_by_key(|c| c.name);
    let actual = table_info(conn, database, table.name)?;
    merge(
        database,
        &columns,
        &actual,
        |c| c.name,
        |c| c.name.as_str(),
        |name| format!("{}.{name}", table.name),
        |e, a| compare_column(database, table.name, e, a),
    )?;

    let mut indices = def.expected_indices(table);
    indices.sort_by(|a, b| a.name.cmp(&b.name));
    let actual = index_list(conn, database, table.name)?;
    merge(
        database,
        &indices,
        &actual,
        |i| i.name.as_str(),
        |i| i.name.as_str(),
        str::to_owned,
        |e, a| compare_index(conn, database, e, a),
    )
}

/// Check that the attached database matches `def` exactly.
pub(crate) fn validate_database(conn: &Connection, def: &DatabaseDef) -> Result<()> {
    let database = def.database.schema_name();

    let mut tables: Vec<&TableDef> = def.tables.iter().collect();
    tables.sort_by_key(|t| t.name);
    let actual = master_list(conn, database, "table")?;
    merge(
        database,
        &tables,
        &actual,
        |t| t.name,
        |n| n.as_str(),
        str::to_owned,
        |t, _| validate_table(conn, def, t),
    )?;

    let mut triggers: Vec<&TriggerDef> = def.triggers.iter().collect();
    triggers.sort_by_key(|t| t.name);
    let actual = trigger_list(conn, database)?;
    merge(
        database,
        &triggers,
        &actual,
        |t| t.name,
        |(n, _)| n.as_str(),
        str::to_owned,
        |e, (name, sql)| compare_trigger(database, e, name, sql),
    )
}

/// Triggers as `(name, sql)`, sorted by name.
fn trigger_list(conn: &Connection, schema: &str) -> Result<Vec<(String, String)>> {
    let sql = format!(
        "SELECT name, sql FROM {schema}.sqlite_master WHERE type = 'trigger' ORDER BY name"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let triggers = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(triggers)
}

/// Collapse whitespace and case so formatting differences are ignored.
fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// SQLite keeps the statement text after the trigger name, so everything from
/// the event onwards must match.
fn compare_trigger(database: &str, expected: &TriggerDef, name: &str, sql: &str) -> Result<()> {
    let definition = normalize_sql(&format!(
        "{} ON {} FOR EACH ROW BEGIN {} END",
        expected.event, expected.table, expected.body
    ));
    trace!(database, trigger = name, "comparing trigger");
    if normalize_sql(sql).ends_with(&definition) {
        Ok(())
    } else {
        Err(Error::schema_mismatch(database, name.to_owned(), "wrong definition"))
    }
}
