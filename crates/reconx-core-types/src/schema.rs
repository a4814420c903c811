//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Document identifiers
pub const FIELD_DOCUMENT_KIND: &str = "document_kind";
pub const FIELD_PATH: &str = "path";
pub const FIELD_FACT: &str = "fact";
pub const FIELD_STAGE: &str = "stage";

// Outcome counts
pub const FIELD_APPLIED: &str = "applied";
pub const FIELD_ALREADY_PRESENT: &str = "already_present";
pub const FIELD_FAILED: &str = "failed";
pub const FIELD_FACT_COUNT: &str = "fact_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_DOCUMENT_KIND.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_count_fields_are_distinct() {
        assert_ne!(FIELD_APPLIED, FIELD_ALREADY_PRESENT);
        assert_ne!(FIELD_APPLIED, FIELD_FAILED);
    }
}
