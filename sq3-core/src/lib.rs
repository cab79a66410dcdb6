///
/// sq3-core - Embeddable SQLite client core
///
/// Provides the client core consumed by host scripting bridges:
/// - Connection: open/close lifecycle, ad-hoc SQL with a per-row text
///   callback, error and change-count introspection, statement factory
/// - Statement: bind/step/reset/finalize lifecycle, typed parameter
///   binding by index or name, typed column extraction by index or name,
///   row fetch as an ordered column-name -> value mapping
/// - StatusCode: the engine's result codes verbatim plus the synthetic
///   NOT_OPEN / ALREADY_OPEN / INVALID_STATEMENT sentinels
/// - consts: re-exported engine constants (codes, type tags, open flags)
///
/// Everything is single-threaded, synchronous and blocking; Connection
/// and Statement are !Send/!Sync and the embedding bridge supplies thread
/// confinement or external locking. Path sandboxing and any host security
/// policy for database names live in the bridge, not here.
///

pub mod consts;
pub mod connection;
pub mod error;
pub mod statement;
pub mod status;
pub mod value;

pub use connection::{Connection, RowAction};
pub use error::{Error, Result};
pub use statement::{Row, Statement};
pub use status::StatusCode;
pub use value::{ColumnKey, ColumnType, ParamKey, Value};

use std::ffi::{CStr, CString};

use libsqlite3_sys as ffi;

/// Engine library version string, e.g. `"3.45.0"`.
pub fn lib_version() -> &'static str {
    unsafe { CStr::from_ptr(ffi::sqlite3_libversion()) }
        .to_str()
        .unwrap_or("")
}

/// Engine library version as a number, e.g. `3045000`.
pub fn lib_version_number() -> i32 {
    unsafe { ffi::sqlite3_libversion_number() }
}

/// Engine source identifier (check-in date and hash).
pub fn source_id() -> &'static str {
    unsafe { CStr::from_ptr(ffi::sqlite3_sourceid()) }
        .to_str()
        .unwrap_or("")
}

/// Whether the given SQL text is one or more complete statements, i.e.
/// ends with a semicolon outside any string or comment. Text that cannot
/// be handed to the engine (interior NUL) is not complete.
pub fn is_complete(sql: &str) -> bool {
    let Ok(c_sql) = CString::new(sql) else {
        return false;
    };
    unsafe { ffi::sqlite3_complete(c_sql.as_ptr()) != 0 }
}
