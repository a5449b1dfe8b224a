//! For some reason, the mongodb crate doesn't provide error code constants.
//! This module fills in the gaps.

use mongodb::error::{Error as DbError, ErrorKind, WriteFailure};

pub const DUPLICATE_KEY: i32 = 11000;

/// Return true if the given error is a duplicate key write error.
pub fn is_duplicate_key(err: &DbError) -> bool {
    if let ErrorKind::Write(WriteFailure::WriteError(ref e)) = *err.kind {
        return e.code == DUPLICATE_KEY;
    }
    false
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use mongodb::error::WriteError;

    use super::*;

    // `WriteError` is non-exhaustive, so build it the way the driver does:
    // by deserialising a server error document.
    fn write_error(code: i32) -> DbError {
        let err: WriteError = mongodb::bson::from_document(doc! {
            "code": code,
            "errmsg": "E11000 duplicate key error collection: univote.votes",
        })
        .unwrap();
        ErrorKind::Write(WriteFailure::WriteError(err)).into()
    }

    #[test]
    fn duplicate_key_write_errors_are_recognised() {
        // A second vote insert for the same (election, voter) pair surfaces
        // as this error and must be translated, never bubbled as a 500.
        assert!(is_duplicate_key(&write_error(DUPLICATE_KEY)));
    }

    #[test]
    fn other_write_errors_are_not_confused_for_duplicates() {
        // 121 is a document validation failure.
        assert!(!is_duplicate_key(&write_error(121)));
    }

    #[test]
    fn non_write_errors_are_ignored() {
        let err = DbError::custom("connection reset");
        assert!(!is_duplicate_key(&err));
    }
}
