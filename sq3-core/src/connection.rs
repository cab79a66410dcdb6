///
/// Database connections.
///
/// A `Connection` owns zero or one native `sqlite3` handle. It is created
/// unopened; `open` populates the handle, `close` releases it, and every
/// operation that needs a live handle reports `NOT_OPEN` instead of
/// faulting when there is none. Statements are produced by `prepare` and
/// own their compiled handle outright from that point on; the caller must
/// not close a Connection while a Statement it produced is still in use.
///
/// The type holds a raw pointer and is deliberately `!Send`/`!Sync`: the
/// engine runs in its default non-serialized threading mode and the
/// embedding bridge is responsible for thread confinement.
///

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use libsqlite3_sys as ffi;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::status::StatusCode;

/// Decision returned by an ad-hoc execute row callback.
///
/// `Abort` maps to the engine's non-zero callback return: remaining rows
/// are skipped and the overall call reports `ABORT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Continue,
    Abort,
}

/// Placeholder database name meaning "no name"; rejected before the
/// engine ever sees it. Name normalization beyond this check is a
/// bridge-layer concern.
const NO_NAME: &str = "?";

pub struct Connection {
    db: *mut ffi::sqlite3,
    extended_errors: bool,
}

impl Connection {
    /// Create an unopened connection.
    pub fn new() -> Self {
        Connection {
            db: ptr::null_mut(),
            extended_errors: false,
        }
    }

    /// Open the named database under the given engine flag bitmask.
    ///
    /// The flags are passed through uninterpreted (read/write, create,
    /// shared-cache, mutex mode, ...). Per the engine's contract a handle
    /// may come back even when the open fails; it is kept either way so
    /// the error state stays readable, and `close` releases it.
    pub fn open(&mut self, name: &str, flags: i32) -> StatusCode {
        if !self.db.is_null() {
            return StatusCode::ALREADY_OPEN;
        }
        if name.is_empty() || name == NO_NAME {
            return StatusCode::MISUSE;
        }
        let Ok(c_name) = CString::new(name) else {
            return StatusCode::MISUSE;
        };

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_open_v2(c_name.as_ptr(), &mut db, flags, ptr::null()) };
        self.db = db;
        debug!(name, flags, code = rc, "open");
        StatusCode::from_raw(rc)
    }

    /// Close the database.
    ///
    /// The handle is cleared unconditionally, even when the engine reports
    /// a non-success status (e.g. `BUSY` with unfinalized statements), so
    /// a failed close never leaves a handle that looks live.
    pub fn close(&mut self) -> StatusCode {
        if self.db.is_null() {
            return StatusCode::NOT_OPEN;
        }
        let rc = unsafe { ffi::sqlite3_close(self.db) };
        self.db = ptr::null_mut();
        debug!(code = rc, "close");
        StatusCode::from_raw(rc)
    }

    pub fn is_open(&self) -> bool {
        !self.db.is_null()
    }

    /// Toggle fine-grained (extended) result codes for subsequent errors.
    pub fn set_extended_errors(&mut self, enabled: bool) -> StatusCode {
        if self.db.is_null() {
            return StatusCode::NOT_OPEN;
        }
        let rc = unsafe { ffi::sqlite3_extended_result_codes(self.db, enabled as c_int) };
        if rc == ffi::SQLITE_OK {
            self.extended_errors = enabled;
        }
        StatusCode::from_raw(rc)
    }

    pub fn extended_errors(&self) -> bool {
        self.extended_errors
    }

    /// Most recent engine error code; `NOT_OPEN` when there is no handle.
    pub fn last_error_code(&self) -> StatusCode {
        if self.db.is_null() {
            return StatusCode::NOT_OPEN;
        }
        StatusCode::from_raw(unsafe { ffi::sqlite3_errcode(self.db) })
    }

    /// Most recent engine error message; `None` when there is no handle.
    pub fn last_error_message(&self) -> Option<String> {
        if self.db.is_null() {
            return None;
        }
        let msg = unsafe { CStr::from_ptr(ffi::sqlite3_errmsg(self.db)) };
        Some(msg.to_string_lossy().into_owned())
    }

    /// Rowid of the most recent successful insert; 0 when not open.
    pub fn last_insert_rowid(&self) -> i64 {
        if self.db.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_last_insert_rowid(self.db) }
    }

    /// Rows changed by the most recent statement; 0 when not open.
    pub fn changes(&self) -> i32 {
        if self.db.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_changes(self.db) }
    }

    /// Rows changed since the connection was opened; 0 when not open.
    pub fn total_changes(&self) -> i32 {
        if self.db.is_null() {
            return 0;
        }
        unsafe { ffi::sqlite3_total_changes(self.db) }
    }

    /// Run SQL text to completion, discarding any result rows.
    pub fn execute(&mut self, sql: &str) -> StatusCode {
        if self.db.is_null() {
            return StatusCode::NOT_OPEN;
        }
        let Ok(c_sql) = CString::new(sql) else {
            return StatusCode::MISUSE;
        };
        let rc = unsafe {
            ffi::sqlite3_exec(self.db, c_sql.as_ptr(), None, ptr::null_mut(), ptr::null_mut())
        };
        trace!(code = rc, "execute");
        StatusCode::from_raw(rc)
    }

    /// Run SQL text to completion, invoking `on_row` once per result row
    /// with the ordered column names and the column values as text,
    /// `None` for NULL columns. The ad-hoc path is text-oriented; the
    /// typed path is `prepare`/`Statement`.
    ///
    /// Returning [`RowAction::Abort`] stops the remaining rows and the
    /// call reports the engine's abort status. A panicking callback is
    /// converted to an abort at the C boundary; the panic resumes once
    /// the engine has returned.
    pub fn execute_rows<F>(&mut self, sql: &str, mut on_row: F) -> StatusCode
    where
        F: FnMut(&[&str], &[Option<&str>]) -> RowAction,
    {
        if self.db.is_null() {
            return StatusCode::NOT_OPEN;
        }
        let Ok(c_sql) = CString::new(sql) else {
            return StatusCode::MISUSE;
        };

        let mut state = ExecState {
            on_row: &mut on_row,
            panic: None,
        };
        let rc = unsafe {
            ffi::sqlite3_exec(
                self.db,
                c_sql.as_ptr(),
                Some(exec_trampoline),
                (&raw mut state).cast::<c_void>(),
                ptr::null_mut(),
            )
        };
        if let Some(payload) = state.panic.take() {
            std::panic::resume_unwind(payload);
        }
        trace!(code = rc, "execute_rows");
        StatusCode::from_raw(rc)
    }

    /// Compile SQL into a prepared [`Statement`].
    ///
    /// On success the returned Statement owns the compiled handle; the
    /// engine's failure code and message come back verbatim otherwise.
    pub fn prepare(&mut self, sql: &str) -> Result<Statement> {
        if self.db.is_null() {
            return Err(Error::NotOpen);
        }

        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                self.db,
                sql.as_ptr().cast::<c_char>(),
                sql.len() as c_int,
                &mut stmt,
                ptr::null_mut(),
            )
        };
        if rc != ffi::SQLITE_OK {
            debug!(code = rc, "prepare failed");
            return Err(unsafe { Error::from_db(self.db) });
        }
        if stmt.is_null() {
            // Whitespace or comment-only input compiles to no statement.
            return Err(Error::Engine {
                code: StatusCode::from_raw(ffi::SQLITE_EMPTY),
                message: "input contains no SQL statement".to_owned(),
            });
        }
        trace!("prepare ok");
        Ok(Statement::from_handle(stmt))
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.db.is_null() {
            // Deferred close: with statements still outstanding the engine
            // keeps the database alive until the last one is finalized,
            // instead of reporting BUSY and leaking it.
            let rc = unsafe { ffi::sqlite3_close_v2(self.db) };
            if rc != ffi::SQLITE_OK {
                debug!(code = rc, "close on drop reported an error");
            }
            self.db = ptr::null_mut();
        }
    }
}

struct ExecState<'a> {
    on_row: &'a mut dyn FnMut(&[&str], &[Option<&str>]) -> RowAction,
    panic: Option<Box<dyn std::any::Any + Send>>,
}

/// C callback handed to `sqlite3_exec`. Marshals the row into borrowed
/// string slices and feeds the callback's decision back to the engine as
/// its accept/abort signal. Rows whose text cannot be marshaled are
/// aborted without invoking the callback, and a callback panic is caught
/// here so it never unwinds through the engine's call stack.
unsafe extern "C" fn exec_trampoline(
    ctx: *mut c_void,
    num_columns: c_int,
    values: *mut *mut c_char,
    names: *mut *mut c_char,
) -> c_int {
    let state = unsafe { &mut *ctx.cast::<ExecState>() };

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let n = num_columns.max(0) as usize;
        let mut row_names: Vec<&str> = Vec::with_capacity(n);
        let mut row_values: Vec<Option<&str>> = Vec::with_capacity(n);
        for i in 0..n {
            let name_ptr = unsafe { *names.add(i) };
            if name_ptr.is_null() {
                return None;
            }
            let Ok(name) = unsafe { CStr::from_ptr(name_ptr) }.to_str() else {
                return None;
            };
            row_names.push(name);

            let value_ptr = unsafe { *values.add(i) };
            if value_ptr.is_null() {
                row_values.push(None);
            } else {
                let Ok(value) = unsafe { CStr::from_ptr(value_ptr) }.to_str() else {
                    return None;
                };
                row_values.push(Some(value));
            }
        }
        Some((state.on_row)(&row_names, &row_values))
    }));

    match outcome {
        Ok(Some(RowAction::Continue)) => 0,
        Ok(Some(RowAction::Abort)) => 1,
        // Marshaling fault: decline the row rather than fault the engine.
        Ok(None) => 1,
        Err(payload) => {
            state.panic = Some(payload);
            1
        }
    }
}
