// Termination intercepts
//
// Legacy solver runtimes end the whole program through exactly three calls:
// numeric EXIT, STOP with a message, STOP with a code. Inside a forked child
// these end only the child. All three use the flushing exit (libc `exit`):
// `atexit` handlers run, so C stdio and Fortran unit buffers holding solver
// output reach their files before the process disappears.
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once a process has become a disposable worker. Bookkeeping only.
static WORKER_PROCESS: AtomicBool = AtomicBool::new(false);

/// Record that this process is a disposable worker (called in the child)
pub fn mark_worker_process() {
    WORKER_PROCESS.store(true, Ordering::Relaxed);
}

/// True only inside a child created by the fork executor
pub fn is_worker_process() -> bool {
    WORKER_PROCESS.load(Ordering::Relaxed)
}

/// Numeric EXIT: flushing termination with `code`
pub fn numeric_exit(code: i32) -> ! {
    std::process::exit(code)
}

/// STOP with a message: always status 0, whatever the message or quietness
pub fn annotated_stop(_message: &[u8], _quiet: bool) -> ! {
    std::process::exit(0)
}

/// STOP with a numeric code: flushing termination with `code`, quiet ignored
pub fn numeric_stop(code: i32, _quiet: bool) -> ! {
    std::process::exit(code)
}

/// Non-flushing `_exit`: buffers are discarded, no `atexit` handlers run.
///
/// Used when the solver returns instead of terminating, so the child can
/// never fall through into the host's post-fork logic.
pub fn terminate_abruptly(code: i32) -> ! {
    // SAFETY: `_exit` only ends the calling process; no Rust state is touched
    // afterwards and no destructors or `atexit` handlers run.
    unsafe { libc::_exit(code) }
}

/// gfortran runtime overrides
///
/// Linked ahead of libgfortran, these replace the runtime's EXIT and STOP
/// entry points so a Fortran solver terminates through the intercepts above.
#[cfg(feature = "gfortran-abi")]
pub mod gfortran {
    use super::{annotated_stop, numeric_exit, numeric_stop};
    use libc::{c_char, c_int};

    /// `CALL EXIT(status)`; a missing argument means 0
    ///
    /// # Safety
    /// `status` must be null or point to a readable `c_int`.
    #[no_mangle]
    pub unsafe extern "C" fn _gfortran_exit_i4(status: *const c_int) -> ! {
        let code = if status.is_null() { 0 } else { *status };
        numeric_exit(code)
    }

    /// `STOP 'message'`
    ///
    /// # Safety
    /// `message` must be null or valid for `len` bytes.
    #[no_mangle]
    pub unsafe extern "C" fn _gfortran_stop_string(
        message: *const c_char,
        len: c_int,
        quiet: c_int,
    ) -> ! {
        let message = if message.is_null() || len <= 0 {
            &[][..]
        } else {
            std::slice::from_raw_parts(message.cast::<u8>(), len as usize)
        };
        annotated_stop(message, quiet != 0)
    }

    /// `STOP code`
    #[no_mangle]
    pub extern "C" fn _gfortran_stop_numeric(code: c_int, quiet: c_int) -> ! {
        numeric_stop(code, quiet != 0)
    }
}
