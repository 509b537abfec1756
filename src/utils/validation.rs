use crate::error::{RecError, RecResult};

/// Parses the `n` query parameter into a positive count.
///
/// Absent means `default`. Anything that is not a positive integer is a
/// client error.
pub fn parse_count(raw: Option<&str>, default: usize) -> RecResult<usize> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RecError::invalid_parameter("n", format!("'{}' is not an integer", raw)))?;

    if value <= 0 {
        return Err(RecError::invalid_parameter("n", "must be a positive integer"));
    }

    usize::try_from(value).map_err(|_| RecError::invalid_parameter("n", "value too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_uses_default() {
        assert_eq!(parse_count(None, 5).unwrap(), 5);
    }

    #[test]
    fn test_valid_counts() {
        assert_eq!(parse_count(Some("1"), 5).unwrap(), 1);
        assert_eq!(parse_count(Some(" 12 "), 5).unwrap(), 12);
    }

    #[test]
    fn test_rejects_non_numeric() {
        let err = parse_count(Some("ten"), 5).unwrap_err();
        assert!(matches!(err, RecError::InvalidRequestParameter { ref name, .. } if name == "n"));
        assert!(parse_count(Some("2.5"), 5).is_err());
        assert!(parse_count(Some(""), 5).is_err());
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        assert!(parse_count(Some("0"), 5).is_err());
        assert!(parse_count(Some("-3"), 5).is_err());
    }
}
