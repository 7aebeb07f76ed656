use std::collections::HashMap;
use std::sync::LazyLock;

/// Reason phrase reported for status codes missing from the table.
pub const UNKNOWN_REASON: &str = "unknown";

/// Three-digit status code to reason phrase, built once on first use.
static HTTP_STATUSES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("100", "Continue"),
        ("101", "Switching Protocols"),
        ("102", "Processing"),
        ("103", "Early Hints"),
        ("200", "OK"),
        ("201", "Created"),
        ("202", "Accepted"),
        ("203", "Non-Authoritative Information"),
        ("204", "No Content"),
        ("205", "Reset Content"),
        ("206", "Partial Content"),
        ("207", "Multi-Status"),
        ("208", "Already Reported"),
        ("226", "IM Used"),
        ("300", "Multiple Choices"),
        ("301", "Moved Permanently"),
        ("302", "Found"),
        ("303", "See Other"),
        ("304", "Not Modified"),
        ("305", "Use Proxy"),
        ("307", "Temporary Redirect"),
        ("308", "Permanent Redirect"),
        ("400", "Bad Request"),
        ("401", "Unauthorized"),
        ("402", "Payment Required"),
        ("403", "Forbidden"),
        ("404", "Not Found"),
        ("405", "Method Not Allowed"),
        ("406", "Not Acceptable"),
        ("407", "Proxy Authentication Required"),
        ("408", "Request Timeout"),
        ("409", "Conflict"),
        ("410", "Gone"),
        ("411", "Length Required"),
        ("412", "Precondition Failed"),
        ("413", "Content Too Large"),
        ("414", "URI Too Long"),
        ("415", "Unsupported Media Type"),
        ("416", "Range Not Satisfiable"),
        ("417", "Expectation Failed"),
        ("418", "I'm a teapot"),
        ("421", "Misdirected Request"),
        ("422", "Unprocessable Content"),
        ("423", "Locked"),
        ("424", "Failed Dependency"),
        ("425", "Too Early"),
        ("426", "Upgrade Required"),
        ("428", "Precondition Required"),
        ("429", "Too Many Requests"),
        ("431", "Request Header Fields Too Large"),
        ("451", "Unavailable For Legal Reasons"),
        ("500", "Internal Server Error"),
        ("501", "Not Implemented"),
        ("502", "Bad Gateway"),
        ("503", "Service Unavailable"),
        ("504", "Gateway Timeout"),
        ("505", "HTTP Version Not Supported"),
        ("506", "Variant Also Negotiates"),
        ("507", "Insufficient Storage"),
        ("508", "Loop Detected"),
        ("510", "Not Extended"),
        ("511", "Network Authentication Required"),
    ])
});

/// Looks up the reason phrase for `code`.
///
/// Returns `None` for codes without an entry, including anything outside the
/// three-digit range.
#[must_use]
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    HTTP_STATUSES.get(code.to_string().as_str()).copied()
}

/// Reason phrase for `code`, or [`UNKNOWN_REASON`] when the table has no entry.
#[must_use]
pub fn describe(code: u16) -> &'static str {
    reason_phrase(code).unwrap_or(UNKNOWN_REASON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(reason_phrase(200), Some("OK"));
        assert_eq!(reason_phrase(301), Some("Moved Permanently"));
        assert_eq!(reason_phrase(404), Some("Not Found"));
        assert_eq!(reason_phrase(500), Some("Internal Server Error"));
    }

    #[test]
    fn test_unknown_codes_report_unknown() {
        assert_eq!(reason_phrase(299), None);
        assert_eq!(describe(299), UNKNOWN_REASON);
        assert_eq!(describe(0), UNKNOWN_REASON);
        assert_eq!(describe(1000), UNKNOWN_REASON);
    }

    #[test]
    fn test_every_key_is_three_digits() {
        for key in HTTP_STATUSES.keys() {
            assert_eq!(key.len(), 3, "status key {key} is not three digits");
            assert!(key.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
