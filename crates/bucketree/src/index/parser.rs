use thiserror::Error;
use time::OffsetDateTime;

use crate::domain::entry::Entry;
use crate::infra::storage::ObjectDescriptor;

/// Attribute key carrying packed filesystem timestamps, as written by
/// mirroring clients that preserve file attributes on upload.
pub const PACKED_ATTRS_KEY: &str = "mc-attrs";

/// A malformed object key. Entry-scoped: the indexing stage skips the
/// offending object and keeps going.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("object key is empty")]
    EmptyKey,
    #[error("object key {0:?} ends in a path separator")]
    TrailingSeparator(String),
}

/// Converts one object descriptor into a file entry with split path
/// segments and resolved timestamps.
///
/// All three timestamps default to the descriptor's last-modified time and
/// are overridden individually by a packed attribute string, when present.
///
/// # Errors
/// Returns a [`ParseError`] for empty keys and directory-marker keys that
/// end in `/`.
pub fn parse_object(object: &ObjectDescriptor) -> Result<Entry, ParseError> {
    if object.key.is_empty() {
        return Err(ParseError::EmptyKey);
    }

    let mut segments: Vec<String> = object.key.split('/').map(str::to_string).collect();
    let name = segments.pop().unwrap_or_default();
    if name.is_empty() {
        return Err(ParseError::TrailingSeparator(object.key.clone()));
    }

    let mut atime = object.last_modified;
    let mut ctime = object.last_modified;
    let mut mtime = object.last_modified;
    if let Some(packed) = object.attributes.get(PACKED_ATTRS_KEY) {
        apply_packed_attrs(packed, &mut atime, &mut ctime, &mut mtime);
    }

    Ok(Entry::file(segments, name, object.size, atime, ctime, mtime))
}

/// Applies `identifier:value` pairs from a `/`-separated attribute string.
///
/// Overrides are independent per field: a value that fails to parse leaves
/// that field alone, an unknown identifier is ignored, and a pair that is
/// not exactly two parts stops parsing of the remaining string.
fn apply_packed_attrs(
    packed: &str,
    atime: &mut OffsetDateTime,
    ctime: &mut OffsetDateTime,
    mtime: &mut OffsetDateTime,
) {
    for pair in packed.split('/') {
        let parts: Vec<&str> = pair.split(':').collect();
        if parts.len() != 2 {
            break;
        }
        let Some(stamp) = parse_epoch(parts[1]) else {
            continue;
        };
        match parts[0] {
            "atime" => *atime = stamp,
            "ctime" => *ctime = stamp,
            "mtime" => *mtime = stamp,
            _ => {}
        }
    }
}

fn parse_epoch(value: &str) -> Option<OffsetDateTime> {
    let seconds: i64 = value.parse().ok()?;
    OffsetDateTime::from_unix_timestamp(seconds).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn ts(seconds: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(seconds).expect("valid timestamp")
    }

    fn descriptor(key: &str) -> ObjectDescriptor {
        ObjectDescriptor {
            key: key.to_string(),
            size: 42,
            last_modified: ts(1000),
            attributes: HashMap::new(),
        }
    }

    fn descriptor_with_attrs(key: &str, packed: &str) -> ObjectDescriptor {
        let mut object = descriptor(key);
        object
            .attributes
            .insert(PACKED_ATTRS_KEY.to_string(), packed.to_string());
        object
    }

    #[test]
    fn test_parse_object_splits_path_and_name() {
        // Arrange
        let object = descriptor("a/b/c.txt");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert
        assert_eq!(entry.path, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(entry.name, "c.txt");
        assert_eq!(entry.size, 42);
    }

    #[test]
    fn test_parse_object_top_level_key_has_empty_path() {
        // Arrange
        let object = descriptor("readme.md");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert
        assert!(entry.path.is_empty());
        assert_eq!(entry.name, "readme.md");
    }

    #[test]
    fn test_parse_object_defaults_timestamps_to_last_modified() {
        // Arrange
        let object = descriptor("a/f.txt");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert
        assert_eq!(entry.atime, ts(1000));
        assert_eq!(entry.ctime, ts(1000));
        assert_eq!(entry.mtime, ts(1000));
    }

    #[test]
    fn test_parse_object_packed_attrs_override_all_fields() {
        // Arrange
        let object = descriptor_with_attrs("a/f.txt", "atime:10/ctime:20/mtime:30");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert
        assert_eq!(entry.atime, ts(10));
        assert_eq!(entry.ctime, ts(20));
        assert_eq!(entry.mtime, ts(30));
    }

    #[test]
    fn test_parse_object_unparsable_value_leaves_field_alone() {
        // Arrange
        let object = descriptor_with_attrs("a/f.txt", "atime:oops/mtime:30");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert — atime keeps the descriptor default, mtime still overrides
        assert_eq!(entry.atime, ts(1000));
        assert_eq!(entry.mtime, ts(30));
    }

    #[test]
    fn test_parse_object_malformed_pair_aborts_remaining_attrs() {
        // Arrange
        let object = descriptor_with_attrs("a/f.txt", "atime:10/bogus/mtime:30");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert — atime applied before the malformed pair, mtime never read
        assert_eq!(entry.atime, ts(10));
        assert_eq!(entry.mtime, ts(1000));
    }

    #[test]
    fn test_parse_object_unknown_identifier_ignored() {
        // Arrange
        let object = descriptor_with_attrs("a/f.txt", "uid:500/mtime:30");

        // Act
        let entry = parse_object(&object).expect("failed to parse object");

        // Assert
        assert_eq!(entry.mtime, ts(30));
    }

    #[test]
    fn test_parse_object_empty_key_fails() {
        // Arrange
        let object = descriptor("");

        // Act
        let result = parse_object(&object);

        // Assert
        assert_eq!(result, Err(ParseError::EmptyKey));
    }

    #[test]
    fn test_parse_object_directory_marker_key_fails() {
        // Arrange
        let object = descriptor("a/b/");

        // Act
        let result = parse_object(&object);

        // Assert
        assert!(matches!(result, Err(ParseError::TrailingSeparator(_))));
    }
}
