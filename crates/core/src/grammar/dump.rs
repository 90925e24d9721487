use super::term::SpfRecord;

/// Serialize a parsed record to a pretty-printed JSON string.
pub fn to_pretty_json(record: &SpfRecord) -> String {
    serde_json::to_string_pretty(record).expect("SpfRecord serialization cannot fail")
}
