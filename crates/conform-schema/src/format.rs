//! `format` keyword regex table (§4.3.3: "maps to a fixed regex table").

use crate::error::SchemaError;

/// Returns the regex pattern for a recognized `format` value, or
/// `UnsupportedFormat` (§7). `format: "regex"` is deliberately absent —
/// §9 leaves it unspecified and we reject it rather than guess.
pub fn format_pattern(format: &str) -> Result<&'static str, SchemaError> {
    Ok(match format {
        "date-time" => {
            r"[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})"
        }
        "date" => r"[0-9]{4}-[0-9]{2}-[0-9]{2}",
        "time" => r"[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?(Z|[+-][0-9]{2}:[0-9]{2})?",
        "duration" => r"P([0-9]+Y)?([0-9]+M)?([0-9]+D)?(T([0-9]+H)?([0-9]+M)?([0-9]+S)?)?",
        "email" => r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        "hostname" => r"[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*",
        "ipv4" => r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}",
        "ipv6" => r"[0-9a-fA-F:]+",
        "uuid" => r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        other => {
            return Err(SchemaError::UnsupportedFormat {
                format: other.to_string(),
            })
        }
    })
}

/// Formats whose regex is a deliberate over-approximation (doesn't reject
/// every invalid value of the underlying type, e.g. a `date` with day 99),
/// worth a compile-time warning (§7: "all warnings surface once per
/// compilation").
pub fn is_approximate(format: &str) -> bool {
    matches!(format, "date-time" | "date" | "time" | "duration" | "hostname" | "ipv6")
}

#[cfg(test)]
mod tests {
    use conform_ir::regex::compile_pattern;
    use conform_ir::regex::CompileOptions;

    use super::*;

    #[test]
    fn every_recognized_format_compiles() {
        for format in ["date-time", "date", "time", "duration", "email", "hostname", "ipv4", "ipv6", "uuid"] {
            let pattern = format_pattern(format).unwrap();
            compile_pattern(pattern, CompileOptions::default())
                .unwrap_or_else(|e| panic!("format {format} pattern should compile: {e}"));
        }
    }

    #[test]
    fn unrecognized_format_is_an_error() {
        assert!(format_pattern("not-a-real-format").is_err());
    }

    #[test]
    fn uuid_and_email_are_not_marked_approximate() {
        assert!(!is_approximate("uuid"));
        assert!(!is_approximate("email"));
        assert!(!is_approximate("ipv4"));
    }

    #[test]
    fn date_time_is_marked_approximate() {
        assert!(is_approximate("date-time"));
    }
}
