///
/// Re-exported engine constants for bridge callers.
///
/// The core does not interpret these; open flags in particular are an
/// opaque bitmask handed through to the engine. Bridges that expose a
/// constant table to scripts can lift it from here without depending on
/// the sys crate directly.
///

// Result codes
pub use libsqlite3_sys::{
    SQLITE_ABORT, SQLITE_AUTH, SQLITE_BUSY, SQLITE_CANTOPEN, SQLITE_CONSTRAINT, SQLITE_CORRUPT,
    SQLITE_DONE, SQLITE_EMPTY, SQLITE_ERROR, SQLITE_FORMAT, SQLITE_FULL, SQLITE_INTERNAL,
    SQLITE_INTERRUPT, SQLITE_IOERR, SQLITE_LOCKED, SQLITE_MISMATCH, SQLITE_MISUSE, SQLITE_NOLFS,
    SQLITE_NOMEM, SQLITE_NOTADB, SQLITE_NOTFOUND, SQLITE_OK, SQLITE_PERM, SQLITE_PROTOCOL,
    SQLITE_RANGE, SQLITE_READONLY, SQLITE_ROW, SQLITE_SCHEMA, SQLITE_TOOBIG,
};

// Fundamental data type codes
pub use libsqlite3_sys::{
    SQLITE3_TEXT, SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT,
};

// Open flags
pub use libsqlite3_sys::{
    SQLITE_OPEN_CREATE, SQLITE_OPEN_EXCLUSIVE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_MEMORY,
    SQLITE_OPEN_NOMUTEX, SQLITE_OPEN_PRIVATECACHE, SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_SHAREDCACHE, SQLITE_OPEN_URI,
};

/// Default open flags: read/write, creating the database if absent.
pub const OPEN_DEFAULT: i32 = SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE;
