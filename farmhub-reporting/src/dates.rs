/// Date parsing for reporting query parameters
///
/// Dashboard clients send dates in either ISO (`YYYY-MM-DD`) or US
/// (`MM/DD/YYYY`) form; both are accepted, anything else is a client
/// error.

use chrono::NaiveDate;

use crate::error::ReportError;

/// Error message for unparseable dates
const FORMAT_ERROR: &str = "Invalid date format. Use YYYY-MM-DD or MM/DD/YYYY";

/// Parses a date string, trying ISO format first, then MM/DD/YYYY
///
/// # Errors
///
/// Returns a 400-mapped error when neither format matches.
pub fn parse_date(date_str: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%m/%d/%Y"))
        .map_err(|_| ReportError::BadRequest(FORMAT_ERROR.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_format() {
        let date = parse_date("2025-08-23").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 23).unwrap());
    }

    #[test]
    fn test_us_format() {
        let date = parse_date("08/23/2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 8, 23).unwrap());
    }

    #[test]
    fn test_mixed_formats_parse_to_same_day() {
        assert_eq!(parse_date("08/01/2025").unwrap(), parse_date("2025-08-01").unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        for input in ["yesterday", "2025/08/23", "23-08-2025", "2025-13-01", ""] {
            let err = parse_date(input).unwrap_err();
            assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD or MM/DD/YYYY");
        }
    }

}
