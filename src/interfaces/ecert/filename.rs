use chrono::NaiveDate;

/// Name of an outbound e-Cert file: environment, date, run sequence.
/// Example: `PBC.EDU.ECERTS.D20260807.003`.
pub fn outbound_file_name(environment: &str, file_date: NaiveDate, sequence: u32) -> String {
    format!(
        "{environment}.EDU.ECERTS.D{}.{sequence:03}",
        file_date.format("%Y%m%d")
    )
}

/// Prefix under which the funding authority drops feedback files for one
/// environment.
pub fn feedback_prefix(environment: &str) -> String {
    format!("{environment}.EDU.ECERTSFB.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        assert_eq!(
            outbound_file_name("PBC", date, 3),
            "PBC.EDU.ECERTS.D20260807.003"
        );
    }

    #[test]
    fn test_feedback_prefix_is_environment_scoped() {
        assert_eq!(feedback_prefix("PTST"), "PTST.EDU.ECERTSFB.");
    }
}
