///
/// Status codes for every operation that talks to the engine.
///
/// Engine result codes are carried verbatim: a `StatusCode` compares equal
/// to whatever `sqlite3_step`, `sqlite3_open_v2` and friends returned. The
/// core adds exactly three synthetic sentinels for operations attempted
/// without a live handle; they are negative so they can never collide with
/// the engine's result-code space (primary or extended).
///

use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_int;

use libsqlite3_sys as ffi;

/// A result code from the engine, or one of the core's sentinels.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(c_int);

impl StatusCode {
    /// Operation attempted on a Connection with no open handle.
    pub const NOT_OPEN: StatusCode = StatusCode(-1);
    /// `open` attempted on a Connection that already holds a handle.
    pub const ALREADY_OPEN: StatusCode = StatusCode(-2);
    /// Operation attempted on a finalized Statement.
    pub const INVALID_STATEMENT: StatusCode = StatusCode(-3);

    pub const OK: StatusCode = StatusCode(ffi::SQLITE_OK);
    pub const ERROR: StatusCode = StatusCode(ffi::SQLITE_ERROR);
    pub const ABORT: StatusCode = StatusCode(ffi::SQLITE_ABORT);
    pub const BUSY: StatusCode = StatusCode(ffi::SQLITE_BUSY);
    pub const LOCKED: StatusCode = StatusCode(ffi::SQLITE_LOCKED);
    pub const NOMEM: StatusCode = StatusCode(ffi::SQLITE_NOMEM);
    pub const READONLY: StatusCode = StatusCode(ffi::SQLITE_READONLY);
    pub const INTERRUPT: StatusCode = StatusCode(ffi::SQLITE_INTERRUPT);
    pub const IOERR: StatusCode = StatusCode(ffi::SQLITE_IOERR);
    pub const CANTOPEN: StatusCode = StatusCode(ffi::SQLITE_CANTOPEN);
    pub const CONSTRAINT: StatusCode = StatusCode(ffi::SQLITE_CONSTRAINT);
    pub const MISMATCH: StatusCode = StatusCode(ffi::SQLITE_MISMATCH);
    pub const MISUSE: StatusCode = StatusCode(ffi::SQLITE_MISUSE);
    pub const RANGE: StatusCode = StatusCode(ffi::SQLITE_RANGE);
    pub const NOTADB: StatusCode = StatusCode(ffi::SQLITE_NOTADB);
    pub const ROW: StatusCode = StatusCode(ffi::SQLITE_ROW);
    pub const DONE: StatusCode = StatusCode(ffi::SQLITE_DONE);

    /// Wrap a raw engine result code.
    pub const fn from_raw(code: c_int) -> Self {
        StatusCode(code)
    }

    /// The raw code, exactly as the engine (or a sentinel) produced it.
    pub const fn raw(self) -> c_int {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == ffi::SQLITE_OK
    }

    /// Step produced a row.
    pub const fn is_row(self) -> bool {
        self.0 == ffi::SQLITE_ROW
    }

    /// Step finished with no more rows.
    pub const fn is_done(self) -> bool {
        self.0 == ffi::SQLITE_DONE
    }

    /// True for the core's own sentinels, false for anything the engine said.
    pub const fn is_sentinel(self) -> bool {
        self.0 < 0
    }

    /// Primary code with any extended-result bits stripped.
    pub const fn primary(self) -> StatusCode {
        if self.0 < 0 {
            self
        } else {
            StatusCode(self.0 & 0xff)
        }
    }
}

impl From<c_int> for StatusCode {
    fn from(code: c_int) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StatusCode::NOT_OPEN => f.write_str("database is not open"),
            StatusCode::ALREADY_OPEN => f.write_str("database is already open"),
            StatusCode::INVALID_STATEMENT => f.write_str("statement has been finalized"),
            _ => {
                let msg = unsafe { CStr::from_ptr(ffi::sqlite3_errstr(self.0)) };
                f.write_str(&msg.to_string_lossy())
            }
        }
    }
}

impl fmt::Debug for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatusCode({}: {})", self.0, self)
    }
}
