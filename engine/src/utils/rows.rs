//! Tolerant loading of record lists from historical data.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};

/// Serde helper for a list of records: a row that does not parse (a bad date,
/// a missing id) is logged and skipped, the rest of the list still loads.
pub fn skip_malformed_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(index, error = %err, "skipping malformed row");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{attendance::AttendanceRecord, holiday::CompanyHoliday};

    #[derive(Deserialize)]
    struct Rows {
        #[serde(deserialize_with = "skip_malformed_rows")]
        attendance: Vec<AttendanceRecord>,
        #[serde(deserialize_with = "skip_malformed_rows")]
        holidays: Vec<CompanyHoliday>,
    }

    #[test]
    fn rows_with_bad_dates_are_skipped() {
        let rows: Rows = serde_json::from_str(
            r#"{
                "attendance": [
                    {"id":"4f0c6a3e-8a55-4f31-9a52-0d4f5c2e7b11","user_id":"0b7e1c52-2f5d-4a8e-9c3a-6d1f2e4b5a77","date":"2024-13-45"},
                    {"id":"9d2b7c41-5e6f-4a3b-8c1d-2e3f4a5b6c7d","user_id":"0b7e1c52-2f5d-4a8e-9c3a-6d1f2e4b5a77","date":"2024-06-03",
                     "check_in":"2024-06-03T09:00:00","check_out":"2024-06-03T17:30:00",
                     "breaks":[{"start":"garbage","type":"standard"}]}
                ],
                "holidays": [
                    {"date":"not a date","description":"broken"},
                    {"date":"2024-06-17","description":"Eid"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(rows.attendance.len(), 1);
        assert_eq!(rows.attendance[0].date.to_string(), "2024-06-03");
        assert!(rows.attendance[0].breaks.is_empty());
        assert_eq!(rows.holidays.len(), 1);
        assert_eq!(rows.holidays[0].description, "Eid");
    }

    #[test]
    fn non_list_input_still_fails() {
        let result = serde_json::from_str::<Rows>(r#"{"attendance":"x","holidays":[]}"#);
        assert!(result.is_err());
    }
}
