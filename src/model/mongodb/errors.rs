//! The mongodb crate doesn't provide error code constants, so the ones we
//! rely on live here.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error, i.e. a
/// unique index rejected the write.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    if let ErrorKind::Write(WriteFailure::WriteError(ref write_err)) = *err.kind {
        write_err.code == DUPLICATE_KEY
    } else {
        false
    }
}
