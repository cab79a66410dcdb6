///
/// Prepared statements.
///
/// A `Statement` is only ever constructed by `Connection::prepare`, and
/// only around a successfully compiled handle; there is no exposed
/// empty-but-uncompiled state. Ownership of the compiled handle belongs
/// to the Statement from that point on. `finalize` releases the handle
/// and nulls it unconditionally; every later operation reports
/// `INVALID_STATEMENT` (codes) or the type's zero/absent value (getters)
/// instead of touching freed memory. Dropping a still-live Statement
/// finalizes it.
///
/// Driving pattern: bind parameters, `step` until `DONE`, `reset` before
/// re-stepping. There is no implicit reset after completion or error.
///

use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::ptr;

use indexmap::IndexMap;
use libsqlite3_sys as ffi;
use tracing::trace;

use crate::status::StatusCode;
use crate::value::{ColumnKey, ColumnType, ParamKey, Value};

pub struct Statement {
    stmt: *mut ffi::sqlite3_stmt,
}

impl Statement {
    /// Wrap a compiled handle. Callers guarantee `stmt` is non-null.
    pub(crate) fn from_handle(stmt: *mut ffi::sqlite3_stmt) -> Self {
        debug_assert!(!stmt.is_null());
        Statement { stmt }
    }

    /// Advance execution by one row.
    ///
    /// Returns `ROW` when a result row is available, `DONE` when the
    /// statement has run to completion, or an engine error code, all
    /// verbatim.
    pub fn step(&mut self) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        StatusCode::from_raw(unsafe { ffi::sqlite3_step(self.stmt) })
    }

    /// Rewind to the start without recompiling. Bindings are kept.
    pub fn reset(&mut self) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        StatusCode::from_raw(unsafe { ffi::sqlite3_reset(self.stmt) })
    }

    /// Clear all bound parameter values without moving the step position.
    pub fn clear_bindings(&mut self) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        StatusCode::from_raw(unsafe { ffi::sqlite3_clear_bindings(self.stmt) })
    }

    /// Release the compiled handle.
    ///
    /// The handle is nulled unconditionally, mirroring `Connection::close`:
    /// a non-success status is surfaced but never leaves the handle
    /// looking live.
    pub fn finalize(&mut self) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let rc = unsafe { ffi::sqlite3_finalize(self.stmt) };
        self.stmt = ptr::null_mut();
        trace!(code = rc, "finalize");
        StatusCode::from_raw(rc)
    }

    /// The original SQL text, owned by the engine. `None` once finalized.
    pub fn sql(&self) -> Option<&str> {
        if self.stmt.is_null() {
            return None;
        }
        let ptr = unsafe { ffi::sqlite3_sql(self.stmt) };
        if ptr.is_null() {
            return None;
        }
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }

    // ---- parameter binding -------------------------------------------------

    /// Resolve an index-or-name key to a 1-based parameter index.
    ///
    /// An unresolved name yields index 0, which the engine rejects with
    /// `RANGE`; that error passes through as-is rather than being turned
    /// into a distinct "unknown name" failure.
    fn resolve_param(&self, key: ParamKey<'_>) -> c_int {
        match key {
            ParamKey::Index(i) => i,
            ParamKey::Name(name) => match CString::new(name) {
                Ok(c_name) => unsafe {
                    ffi::sqlite3_bind_parameter_index(self.stmt, c_name.as_ptr())
                },
                Err(_) => 0,
            },
        }
    }

    pub fn bind_null<'k>(&mut self, key: impl Into<ParamKey<'k>>) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        StatusCode::from_raw(unsafe { ffi::sqlite3_bind_null(self.stmt, idx) })
    }

    pub fn bind_integer<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: i32) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        StatusCode::from_raw(unsafe { ffi::sqlite3_bind_int(self.stmt, idx, value) })
    }

    pub fn bind_int64<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: i64) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        StatusCode::from_raw(unsafe { ffi::sqlite3_bind_int64(self.stmt, idx, value) })
    }

    /// Bind a single-precision float. The value is stored as a double,
    /// but only after the f32 narrowing the legacy boundary type implies.
    pub fn bind_float<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: f32) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        StatusCode::from_raw(unsafe { ffi::sqlite3_bind_double(self.stmt, idx, f64::from(value)) })
    }

    pub fn bind_double<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: f64) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        StatusCode::from_raw(unsafe { ffi::sqlite3_bind_double(self.stmt, idx, value) })
    }

    /// Bind text. The engine copies the bytes (transient binding); it
    /// never retains a reference to caller-owned memory past the call.
    pub fn bind_text<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: &str) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        let rc = unsafe {
            ffi::sqlite3_bind_text(
                self.stmt,
                idx,
                value.as_ptr().cast::<c_char>(),
                value.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            )
        };
        StatusCode::from_raw(rc)
    }

    /// Bind a blob, copied by the engine (transient binding).
    pub fn bind_blob<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: &[u8]) -> StatusCode {
        if self.stmt.is_null() {
            return StatusCode::INVALID_STATEMENT;
        }
        let idx = self.resolve_param(key.into());
        let rc = unsafe {
            ffi::sqlite3_bind_blob(
                self.stmt,
                idx,
                value.as_ptr().cast(),
                value.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            )
        };
        StatusCode::from_raw(rc)
    }

    /// Single dispatch point for dynamically-typed callers: bind a tagged
    /// value under an index-or-name key.
    pub fn bind_value<'k>(&mut self, key: impl Into<ParamKey<'k>>, value: &Value) -> StatusCode {
        let key = key.into();
        match value {
            Value::Null => self.bind_null(key),
            Value::Integer(v) => self.bind_integer(key, *v),
            Value::Int64(v) => self.bind_int64(key, *v),
            Value::Float(v) => self.bind_float(key, *v),
            Value::Double(v) => self.bind_double(key, *v),
            Value::Text(v) => self.bind_text(key, v),
            Value::Blob(v) => self.bind_blob(key, v),
        }
    }

    /// Number of parameters in the compiled statement; 0 once finalized.
    pub fn parameter_count(&self) -> i32 {
        if self.stmt.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_bind_parameter_count(self.stmt) }
    }

    /// Name of the parameter at a 1-based index; `None` for nameless
    /// positional parameters, out-of-range indexes, or a finalized
    /// statement.
    pub fn parameter_name(&self, index: i32) -> Option<String> {
        if self.stmt.is_null() {
            return None;
        }
        let ptr = unsafe { ffi::sqlite3_bind_parameter_name(self.stmt, index) };
        if ptr.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }

    /// 1-based index of a named parameter; 0 when not found.
    pub fn parameter_index(&self, name: &str) -> i32 {
        if self.stmt.is_null() {
            return 0;
        }
        self.resolve_param(ParamKey::Name(name))
    }

    // ---- column introspection ----------------------------------------------

    /// Number of result columns; 0 for non-SELECT statements or once
    /// finalized.
    pub fn column_count(&self) -> i32 {
        if self.stmt.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_column_count(self.stmt) }
    }

    /// Name of the column at a 0-based index.
    pub fn column_name(&self, index: i32) -> Option<&str> {
        if self.stmt.is_null() || !self.column_in_range(index) {
            return None;
        }
        let ptr = unsafe { ffi::sqlite3_column_name(self.stmt, index) };
        if ptr.is_null() {
            return None;
        }
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }

    /// 0-based index of a named column, or -1 when not found.
    ///
    /// The engine has no reverse lookup, so this is a linear
    /// case-insensitive scan over the column names.
    pub fn column_index(&self, name: &str) -> i32 {
        let count = self.column_count();
        for i in 0..count {
            if let Some(col) = self.column_name(i) {
                if col.eq_ignore_ascii_case(name) {
                    return i;
                }
            }
        }
        -1
    }

    /// Storage class of the column at a 0-based index. Meaningful only
    /// after a `step` that returned `ROW`; at any other time the engine's
    /// default (`Null`) comes back rather than a fault.
    pub fn column_type(&self, index: i32) -> ColumnType {
        if self.stmt.is_null() || !self.column_in_range(index) {
            return ColumnType::Null;
        }
        ColumnType::from_raw(unsafe { ffi::sqlite3_column_type(self.stmt, index) })
    }

    fn column_in_range(&self, index: i32) -> bool {
        index >= 0 && index < self.column_count()
    }

    fn resolve_column(&self, key: ColumnKey<'_>) -> i32 {
        match key {
            ColumnKey::Index(i) => i,
            ColumnKey::Name(name) => self.column_index(name),
        }
    }

    // ---- typed getters -----------------------------------------------------
    //
    // Out-of-range or unresolved keys yield the type's zero/absent value.
    // The engine coerces between storage classes on its own (an integer
    // read of a text column is its best-effort numeric parse); that
    // behavior passes through unmodified.

    pub fn get_integer<'k>(&self, key: impl Into<ColumnKey<'k>>) -> i32 {
        let idx = self.resolve_column(key.into());
        if self.stmt.is_null() || !self.column_in_range(idx) {
            return 0;
        }
        unsafe { ffi::sqlite3_column_int(self.stmt, idx) }
    }

    pub fn get_int64<'k>(&self, key: impl Into<ColumnKey<'k>>) -> i64 {
        let idx = self.resolve_column(key.into());
        if self.stmt.is_null() || !self.column_in_range(idx) {
            return 0;
        }
        unsafe { ffi::sqlite3_column_int64(self.stmt, idx) }
    }

    pub fn get_float<'k>(&self, key: impl Into<ColumnKey<'k>>) -> f32 {
        self.get_double(key) as f32
    }

    pub fn get_double<'k>(&self, key: impl Into<ColumnKey<'k>>) -> f64 {
        let idx = self.resolve_column(key.into());
        if self.stmt.is_null() || !self.column_in_range(idx) {
            return 0.0;
        }
        unsafe { ffi::sqlite3_column_double(self.stmt, idx) }
    }

    /// Text value of a column. `None` for NULL columns, unresolved keys,
    /// or text the engine reports that is not valid UTF-8. The borrow is
    /// tied to `&self`, so it cannot outlive the row it came from.
    pub fn get_text<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Option<&str> {
        let idx = self.resolve_column(key.into());
        if self.stmt.is_null() || !self.column_in_range(idx) {
            return None;
        }
        let ptr = unsafe { ffi::sqlite3_column_text(self.stmt, idx) };
        if ptr.is_null() {
            return None;
        }
        let len = unsafe { ffi::sqlite3_column_bytes(self.stmt, idx) } as usize;
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        std::str::from_utf8(bytes).ok()
    }

    /// Blob value of a column; the slice length is the blob's byte
    /// length. Empty for NULL columns or unresolved keys.
    pub fn get_blob<'k>(&self, key: impl Into<ColumnKey<'k>>) -> &[u8] {
        let idx = self.resolve_column(key.into());
        if self.stmt.is_null() || !self.column_in_range(idx) {
            return &[];
        }
        let ptr = unsafe { ffi::sqlite3_column_blob(self.stmt, idx) };
        if ptr.is_null() {
            return &[];
        }
        let len = unsafe { ffi::sqlite3_column_bytes(self.stmt, idx) } as usize;
        unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }
    }

    /// Single dispatch point for dynamically-typed callers: read a column
    /// as a tagged value according to its actual storage class.
    pub fn get_value<'k>(&self, key: impl Into<ColumnKey<'k>>) -> Value {
        let idx = self.resolve_column(key.into());
        match self.column_type(idx) {
            ColumnType::Null => Value::Null,
            ColumnType::Integer => Value::Int64(self.get_int64(idx)),
            ColumnType::Float => Value::Double(self.get_double(idx)),
            ColumnType::Text => Value::Text(self.get_text(idx).unwrap_or_default().to_owned()),
            ColumnType::Blob => Value::Blob(self.get_blob(idx).to_vec()),
        }
    }

    // ---- row fetch ---------------------------------------------------------

    /// Step once and, on `ROW`, materialize the full row as an ordered
    /// column-name → value mapping (blobs as owned byte vectors, NULL
    /// columns present as [`Value::Null`]). On `DONE` or an error the row
    /// is absent. The raw step code is always returned alongside so
    /// callers can tell exhaustion from failure.
    pub fn fetch(&mut self) -> (Option<Row>, StatusCode) {
        let rc = self.step();
        if !rc.is_row() {
            return (None, rc);
        }

        let count = self.column_count();
        let mut columns = IndexMap::with_capacity(count as usize);
        for i in 0..count {
            let name = self.column_name(i).unwrap_or_default().to_owned();
            columns.insert(name, self.get_value(i));
        }
        (Some(Row { columns }), rc)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement").field("sql", &self.sql()).finish()
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            unsafe { ffi::sqlite3_finalize(self.stmt) };
            self.stmt = ptr::null_mut();
        }
    }
}

/// One fetched result row: an ordered column-name → value mapping,
/// rebuilt for every row. Not tied to the statement's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Value of a named column; `None` when the row has no such column.
    /// A NULL column is present, with [`Value::Null`].
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    /// Value of the column at a 0-based position.
    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.columns.get_index(index).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in result order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// (name, value) pairs in result order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::consts::OPEN_DEFAULT;

    fn conn_with(schema: &str) -> Connection {
        let mut conn = Connection::new();
        assert_eq!(conn.open(":memory:", OPEN_DEFAULT), StatusCode::OK);
        assert_eq!(conn.execute(schema), StatusCode::OK);
        conn
    }

    #[test]
    fn column_counts_reflect_projection() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER, b TEXT, c BLOB)");
        let stmt = conn.prepare("SELECT a, b FROM t").unwrap();
        assert_eq!(stmt.column_count(), 2);

        let stmt = conn.prepare("INSERT INTO t VALUES (1, 'x', NULL)").unwrap();
        assert_eq!(stmt.column_count(), 0);
    }

    #[test]
    fn sql_text_preserved() {
        let mut conn = conn_with("CREATE TABLE t(a)");
        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        assert_eq!(stmt.sql(), Some("SELECT a FROM t"));
        stmt.finalize();
        assert_eq!(stmt.sql(), None);
    }

    #[test]
    fn parameter_introspection() {
        let mut conn = conn_with("CREATE TABLE t(a, b, c)");
        let stmt = conn
            .prepare("SELECT * FROM t WHERE a = :x AND b = @y AND c = ?")
            .unwrap();
        assert_eq!(stmt.parameter_count(), 3);
        assert_eq!(stmt.parameter_name(1), Some(":x".to_owned()));
        assert_eq!(stmt.parameter_name(2), Some("@y".to_owned()));
        assert_eq!(stmt.parameter_name(3), None);
        assert_eq!(stmt.parameter_index(":x"), 1);
        assert_eq!(stmt.parameter_index("@y"), 2);
        assert_eq!(stmt.parameter_index(":missing"), 0);
    }

    #[test]
    fn bind_by_name_and_resolved_index_are_equivalent() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER)");
        let mut stmt = conn.prepare("INSERT INTO t VALUES (:x)").unwrap();

        assert_eq!(stmt.bind_integer(":x", 5), StatusCode::OK);
        let idx = stmt.parameter_index(":x");
        assert_eq!(idx, 1);
        // Rebinding through the resolved index overwrites the named bind.
        assert_eq!(stmt.bind_integer(idx, 7), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::DONE);
        drop(stmt);

        let mut query = conn.prepare("SELECT a FROM t").unwrap();
        assert_eq!(query.step(), StatusCode::ROW);
        assert_eq!(query.get_integer(0), 7);
    }

    #[test]
    fn unresolved_bind_name_passes_range_through() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER)");
        let mut stmt = conn.prepare("INSERT INTO t VALUES (:x)").unwrap();
        // Unknown name resolves to index 0, which the engine rejects.
        assert_eq!(stmt.bind_integer(":nope", 1), StatusCode::RANGE);
        assert_eq!(stmt.bind_integer(99, 1), StatusCode::RANGE);
    }

    #[test]
    fn step_yields_each_row_then_done() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER)");
        conn.execute("INSERT INTO t VALUES (1), (2)");

        let mut stmt = conn.prepare("SELECT a FROM t ORDER BY a").unwrap();
        assert_eq!(stmt.step(), StatusCode::ROW);
        assert_eq!(stmt.get_integer(0), 1);
        assert_eq!(stmt.step(), StatusCode::ROW);
        assert_eq!(stmt.get_integer(0), 2);
        assert_eq!(stmt.step(), StatusCode::DONE);

        // Reset rewinds without recompiling; the rows replay.
        assert_eq!(stmt.reset(), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::ROW);
        assert_eq!(stmt.get_integer(0), 1);
    }

    #[test]
    fn step_past_done_without_reset_stays_in_engine_space() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER)");
        conn.execute("INSERT INTO t VALUES (1)");

        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        assert_eq!(stmt.step(), StatusCode::ROW);
        assert_eq!(stmt.step(), StatusCode::DONE);
        // No intervening reset: the engine restarts the statement on its
        // own and reports an engine code, never a sentinel or a fault.
        let rc = stmt.step();
        assert!(!rc.is_sentinel());
        assert_eq!(rc, StatusCode::ROW);
        assert_eq!(stmt.get_integer(0), 1);
    }

    #[test]
    fn debug_output_reflects_handle_state() {
        let mut conn = conn_with("CREATE TABLE t(a)");
        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        assert!(format!("{stmt:?}").contains("SELECT a FROM t"));
        stmt.finalize();
        assert!(format!("{stmt:?}").contains("None"));
    }

    #[test]
    fn clear_bindings_reverts_to_null() {
        let mut conn = conn_with("CREATE TABLE t(a)");
        let mut stmt = conn.prepare("INSERT INTO t VALUES (?)").unwrap();
        assert_eq!(stmt.bind_integer(1, 42), StatusCode::OK);
        assert_eq!(stmt.clear_bindings(), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::DONE);
        drop(stmt);

        let mut query = conn.prepare("SELECT a FROM t").unwrap();
        assert_eq!(query.step(), StatusCode::ROW);
        assert_eq!(query.column_type(0), ColumnType::Null);
    }

    #[test]
    fn typed_binds_round_trip_through_storage_classes() {
        let mut conn = conn_with("CREATE TABLE t(i, i64, f, d, s, b, n)");
        let mut stmt = conn
            .prepare("INSERT INTO t VALUES (?, ?, ?, ?, ?, ?, ?)")
            .unwrap();
        assert_eq!(stmt.bind_integer(1, -7), StatusCode::OK);
        assert_eq!(stmt.bind_int64(2, i64::MAX), StatusCode::OK);
        assert_eq!(stmt.bind_float(3, 2.5), StatusCode::OK);
        assert_eq!(stmt.bind_double(4, std::f64::consts::PI), StatusCode::OK);
        assert_eq!(stmt.bind_text(5, "héllo"), StatusCode::OK);
        assert_eq!(stmt.bind_blob(6, &[0, 159, 146, 150]), StatusCode::OK);
        assert_eq!(stmt.bind_null(7), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::DONE);
        drop(stmt);

        let mut query = conn.prepare("SELECT * FROM t").unwrap();
        assert_eq!(query.step(), StatusCode::ROW);
        assert_eq!(query.column_type(0), ColumnType::Integer);
        assert_eq!(query.get_integer(0), -7);
        assert_eq!(query.get_int64(1), i64::MAX);
        assert_eq!(query.get_float(2), 2.5);
        assert_eq!(query.get_double(3), std::f64::consts::PI);
        assert_eq!(query.get_text(4), Some("héllo"));
        assert_eq!(query.get_blob(5), &[0, 159, 146, 150]);
        assert_eq!(query.column_type(6), ColumnType::Null);
    }

    #[test]
    fn bind_value_dispatches_on_tag() {
        let mut conn = conn_with("CREATE TABLE t(a, b, c)");
        let mut stmt = conn.prepare("INSERT INTO t VALUES (?, ?, ?)").unwrap();
        assert_eq!(stmt.bind_value(1, &Value::Int64(9)), StatusCode::OK);
        assert_eq!(stmt.bind_value(2, &Value::Text("v".into())), StatusCode::OK);
        assert_eq!(stmt.bind_value(3, &Value::Null), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::DONE);
        drop(stmt);

        let mut query = conn.prepare("SELECT a, b, c FROM t").unwrap();
        assert_eq!(query.step(), StatusCode::ROW);
        assert_eq!(query.get_value(0), Value::Int64(9));
        assert_eq!(query.get_value(1), Value::Text("v".into()));
        assert_eq!(query.get_value(2), Value::Null);
    }

    #[test]
    fn getters_by_name_delegate_through_column_index() {
        let mut conn = conn_with("CREATE TABLE t(alpha INTEGER, beta TEXT)");
        conn.execute("INSERT INTO t VALUES (11, 'b')");

        let mut stmt = conn.prepare("SELECT alpha, beta FROM t").unwrap();
        assert_eq!(stmt.step(), StatusCode::ROW);
        // Case-insensitive scan.
        assert_eq!(stmt.column_index("ALPHA"), 0);
        assert_eq!(stmt.column_index("Beta"), 1);
        assert_eq!(stmt.column_index("gamma"), -1);
        assert_eq!(stmt.get_integer("alpha"), 11);
        assert_eq!(stmt.get_text("BETA"), Some("b"));
        // Unresolved names fall out as zero/absent values.
        assert_eq!(stmt.get_integer("gamma"), 0);
        assert_eq!(stmt.get_text("gamma"), None);
        assert_eq!(stmt.get_blob("gamma"), &[] as &[u8]);
    }

    #[test]
    fn engine_coercion_passes_through() {
        let mut conn = conn_with("CREATE TABLE t(s TEXT)");
        conn.execute("INSERT INTO t VALUES ('42')");

        let mut stmt = conn.prepare("SELECT s FROM t").unwrap();
        assert_eq!(stmt.step(), StatusCode::ROW);
        assert_eq!(stmt.column_type(0), ColumnType::Text);
        // Integer read of a text column is the engine's numeric parse.
        assert_eq!(stmt.get_integer(0), 42);
        assert_eq!(stmt.get_double(0), 42.0);
    }

    #[test]
    fn float_binding_narrows_to_single_precision() {
        let mut conn = conn_with("CREATE TABLE t(f)");
        let mut stmt = conn.prepare("INSERT INTO t VALUES (?)").unwrap();
        // 0.1 is not exactly representable; the stored double must carry
        // the f32-rounded value, not the f64 one.
        assert_eq!(stmt.bind_float(1, 0.1), StatusCode::OK);
        assert_eq!(stmt.step(), StatusCode::DONE);
        drop(stmt);

        let mut query = conn.prepare("SELECT f FROM t").unwrap();
        assert_eq!(query.step(), StatusCode::ROW);
        assert_eq!(query.get_double(0), f64::from(0.1f32));
        assert_ne!(query.get_double(0), 0.1f64);
    }

    #[test]
    fn finalize_is_terminal() {
        let mut conn = conn_with("CREATE TABLE t(a)");
        let mut stmt = conn.prepare("SELECT a FROM t").unwrap();
        assert_eq!(stmt.finalize(), StatusCode::OK);

        assert_eq!(stmt.step(), StatusCode::INVALID_STATEMENT);
        assert_eq!(stmt.reset(), StatusCode::INVALID_STATEMENT);
        assert_eq!(stmt.clear_bindings(), StatusCode::INVALID_STATEMENT);
        assert_eq!(stmt.finalize(), StatusCode::INVALID_STATEMENT);
        assert_eq!(stmt.bind_integer(1, 1), StatusCode::INVALID_STATEMENT);
        assert_eq!(stmt.parameter_count(), 0);
        assert_eq!(stmt.column_count(), 0);
        assert_eq!(stmt.get_integer(0), 0);
        let (row, rc) = stmt.fetch();
        assert!(row.is_none());
        assert_eq!(rc, StatusCode::INVALID_STATEMENT);
    }

    #[test]
    fn fetch_materializes_typed_rows() {
        let mut conn = conn_with("CREATE TABLE t(i INTEGER, f REAL, s TEXT, b BLOB, n TEXT)");
        conn.execute("INSERT INTO t VALUES (1, 1.5, 'one', X'0102', NULL)");

        let mut stmt = conn.prepare("SELECT * FROM t").unwrap();
        let (row, rc) = stmt.fetch();
        assert_eq!(rc, StatusCode::ROW);
        let row = row.unwrap();
        assert_eq!(row.len(), 5);
        assert_eq!(
            row.column_names().collect::<Vec<_>>(),
            ["i", "f", "s", "b", "n"]
        );
        assert_eq!(row.get("i"), Some(&Value::Int64(1)));
        assert_eq!(row.get("f"), Some(&Value::Double(1.5)));
        assert_eq!(row.get("s"), Some(&Value::Text("one".into())));
        assert_eq!(row.get("b"), Some(&Value::Blob(vec![1, 2])));
        // NULL column is present, as an absent value.
        assert_eq!(row.get("n"), Some(&Value::Null));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row.get_at(0), Some(&Value::Int64(1)));

        let (row, rc) = stmt.fetch();
        assert!(row.is_none());
        assert_eq!(rc, StatusCode::DONE);
    }

    #[test]
    fn column_type_before_step_does_not_fault() {
        let mut conn = conn_with("CREATE TABLE t(a INTEGER)");
        let stmt = conn.prepare("SELECT a FROM t").unwrap();
        // No step yet: engine default, no fault.
        assert_eq!(stmt.column_type(0), ColumnType::Null);
        assert_eq!(stmt.column_type(99), ColumnType::Null);
        assert_eq!(stmt.column_type(-1), ColumnType::Null);
    }
}
