///
/// Error type for operations that hand back a value or fail.
///
/// Most of the core speaks in raw [`StatusCode`]s; `Error` is the shape
/// used where an operation produces an object on success (`prepare`). The
/// engine's code is never reinterpreted and stays reachable through
/// [`Error::status`].
///

use std::ffi::CStr;

use libsqlite3_sys as ffi;
use thiserror::Error;

use crate::status::StatusCode;

#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted on a Connection with no open handle.
    #[error("database is not open")]
    NotOpen,

    /// The engine rejected the operation; code and message are verbatim.
    #[error("{message}")]
    Engine { code: StatusCode, message: String },
}

impl Error {
    /// The status code this error corresponds to.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::NotOpen => StatusCode::NOT_OPEN,
            Error::Engine { code, .. } => *code,
        }
    }

    /// Build an engine error from the connection's current error state.
    ///
    /// # Safety
    ///
    /// `db` must be a live `sqlite3` handle.
    pub(crate) unsafe fn from_db(db: *mut ffi::sqlite3) -> Self {
        let code = unsafe { ffi::sqlite3_errcode(db) };
        let message = unsafe {
            CStr::from_ptr(ffi::sqlite3_errmsg(db))
                .to_string_lossy()
                .into_owned()
        };
        Error::Engine {
            code: StatusCode::from_raw(code),
            message,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
