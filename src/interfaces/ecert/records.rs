//! Typed records for the certificate wire formats.
//!
//! Inbound records are a tagged variant selected by the record-type prefix in
//! the first three columns; each variant reads its fields from the layout
//! tables in [`super::layout`]. Decoded records keep their source line number
//! for error attribution.

use super::codec::{self, LineBuilder};
use super::layout::{self, feedback, outbound};
use crate::domain::money::Amount;
use crate::domain::schedule::OfferingIntensity;
use crate::error::{EngineError, Result};
use chrono::NaiveDate;

fn format_error(file: &str, line: usize, reason: impl Into<String>) -> EngineError {
    EngineError::FileFormat {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

// ---------------------------------------------------------------------------
// Outbound e-Cert request file
// ---------------------------------------------------------------------------

/// One detail record of the outbound e-Cert file.
#[derive(Debug, Clone, PartialEq)]
pub struct EcertDetail {
    pub sin: String,
    pub document_number: String,
    pub disbursement_date: NaiveDate,
    pub msfaa_number: Option<u64>,
    pub intensity: OfferingIntensity,
    pub surname: String,
    pub given_name: String,
    pub birth_date: NaiveDate,
    pub total_disbursed: Amount,
    pub tuition_remittance: Amount,
    pub enrolment_confirmed: bool,
}

impl EcertDetail {
    pub fn encode(&self) -> String {
        let mut line = LineBuilder::new(outbound::LINE_LEN);
        line.put_str(layout::RECORD_CODE, layout::OUTBOUND_DETAIL_CODE)
            .put_str(outbound::detail::SIN, &self.sin)
            .put_str(outbound::detail::DOCUMENT_NUMBER, &self.document_number)
            .put_date(outbound::detail::DISBURSEMENT_DATE, self.disbursement_date)
            .put_opt_num(outbound::detail::MSFAA_NUMBER, self.msfaa_number)
            .put_char(outbound::detail::OFFERING_INTENSITY, self.intensity.code())
            .put_str(outbound::detail::SURNAME, &self.surname)
            .put_str(outbound::detail::GIVEN_NAME, &self.given_name)
            .put_date(outbound::detail::BIRTH_DATE, self.birth_date)
            .put_num(
                outbound::detail::TOTAL_DISBURSED_CENTS,
                self.total_disbursed.to_cents(),
            )
            .put_num(
                outbound::detail::TUITION_REMITTANCE_CENTS,
                self.tuition_remittance.to_cents(),
            )
            .put_char(
                outbound::detail::ENROLMENT_CONFIRMED,
                if self.enrolment_confirmed { 'Y' } else { 'N' },
            );
        line.finish()
    }

    /// Decodes an outbound detail line, primarily to verify what was sent.
    pub fn decode(file: &str, line: &str, line_number: usize) -> Result<Self> {
        let intensity = match codec::raw_field(line, outbound::detail::OFFERING_INTENSITY) {
            "F" => OfferingIntensity::FullTime,
            "P" => OfferingIntensity::PartTime,
            other => {
                return Err(format_error(
                    file,
                    line_number,
                    format!("unknown offering intensity {other:?}"),
                ));
            }
        };
        let disbursement_date = codec::date_field(line, outbound::detail::DISBURSEMENT_DATE)
            .ok_or_else(|| format_error(file, line_number, "bad disbursement date"))?;
        let birth_date = codec::date_field(line, outbound::detail::BIRTH_DATE)
            .ok_or_else(|| format_error(file, line_number, "bad birth date"))?;

        Ok(Self {
            sin: codec::str_field(line, outbound::detail::SIN),
            document_number: codec::str_field(line, outbound::detail::DOCUMENT_NUMBER),
            disbursement_date,
            msfaa_number: codec::num_field(line, outbound::detail::MSFAA_NUMBER),
            intensity,
            surname: codec::str_field(line, outbound::detail::SURNAME),
            given_name: codec::str_field(line, outbound::detail::GIVEN_NAME),
            birth_date,
            total_disbursed: Amount::from_cents(
                codec::num_field(line, outbound::detail::TOTAL_DISBURSED_CENTS).unwrap_or(0),
            ),
            tuition_remittance: Amount::from_cents(
                codec::num_field(line, outbound::detail::TUITION_REMITTANCE_CENTS).unwrap_or(0),
            ),
            enrolment_confirmed: codec::raw_field(line, outbound::detail::ENROLMENT_CONFIRMED)
                == "Y",
        })
    }
}

/// A complete outbound file: header, details, trailer.
#[derive(Debug, Clone, PartialEq)]
pub struct EcertFile {
    pub environment: String,
    pub file_date: NaiveDate,
    pub sequence: u32,
    pub details: Vec<EcertDetail>,
}

impl EcertFile {
    pub fn encode(&self) -> String {
        let mut out = String::new();

        let mut header = LineBuilder::new(outbound::LINE_LEN);
        header
            .put_str(layout::RECORD_CODE, layout::HEADER_CODE)
            .put_str(outbound::header::ENVIRONMENT, &self.environment)
            .put_date(outbound::header::FILE_DATE, self.file_date)
            .put_num(outbound::header::FILE_SEQUENCE, self.sequence as u64);
        out.push_str(&header.finish());
        out.push('\n');

        let mut total = Amount::ZERO;
        for detail in &self.details {
            total += detail.total_disbursed;
            out.push_str(&detail.encode());
            out.push('\n');
        }

        let mut trailer = LineBuilder::new(outbound::LINE_LEN);
        trailer
            .put_str(layout::RECORD_CODE, layout::TRAILER_CODE)
            .put_num(outbound::trailer::DETAIL_COUNT, self.details.len() as u64)
            .put_num(outbound::trailer::TOTAL_CENTS, total.to_cents());
        out.push_str(&trailer.finish());
        out.push('\n');

        out
    }
}

// ---------------------------------------------------------------------------
// Inbound feedback/cancellation file
// ---------------------------------------------------------------------------

/// Disposition reported for one disbursement document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackStatus {
    Accepted,
    Cancelled,
    Rejected,
}

impl FeedbackStatus {
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(Self::Accepted),
            "C" => Some(Self::Cancelled),
            "R" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackHeader {
    pub line_number: usize,
    pub environment: String,
    pub file_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackDetail {
    pub line_number: usize,
    pub document_number: String,
    /// `None` when the status column holds an unknown code; the processor
    /// decides how severe that is.
    pub status: Option<FeedbackStatus>,
    pub error_codes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackFooter {
    pub line_number: usize,
    /// `None` is the invalid-number sentinel.
    pub detail_count: Option<u64>,
}

/// One decoded line of a feedback file, tagged by record-type prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedbackRecord {
    Header(FeedbackHeader),
    Detail(FeedbackDetail),
    Footer(FeedbackFooter),
}

impl FeedbackRecord {
    pub fn decode(file: &str, line: &str, line_number: usize) -> Result<Self> {
        if line.len() != feedback::LINE_LEN {
            return Err(format_error(
                file,
                line_number,
                format!(
                    "line is {} characters, expected {}",
                    line.len(),
                    feedback::LINE_LEN
                ),
            ));
        }

        match codec::raw_field(line, layout::RECORD_CODE) {
            layout::HEADER_CODE => Ok(Self::Header(FeedbackHeader {
                line_number,
                environment: codec::str_field(line, feedback::header::ENVIRONMENT),
                file_date: codec::date_field(line, feedback::header::FILE_DATE),
            })),
            layout::FEEDBACK_DETAIL_CODE => {
                let error_codes = [
                    feedback::detail::ERROR_CODE_1,
                    feedback::detail::ERROR_CODE_2,
                    feedback::detail::ERROR_CODE_3,
                ]
                .iter()
                .map(|f| codec::str_field(line, *f))
                .filter(|code| !code.is_empty())
                .collect();

                Ok(Self::Detail(FeedbackDetail {
                    line_number,
                    document_number: codec::str_field(line, feedback::detail::DOCUMENT_NUMBER),
                    status: FeedbackStatus::from_code(codec::raw_field(
                        line,
                        feedback::detail::DISBURSEMENT_STATUS,
                    )),
                    error_codes,
                }))
            }
            layout::TRAILER_CODE => Ok(Self::Footer(FeedbackFooter {
                line_number,
                detail_count: codec::num_field(line, feedback::footer::DETAIL_COUNT),
            })),
            other => Err(format_error(
                file,
                line_number,
                format!("unrecognized record type {other:?}"),
            )),
        }
    }
}

/// A fully decoded and completeness-checked feedback file.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackFile {
    pub header: FeedbackHeader,
    pub details: Vec<FeedbackDetail>,
    pub footer: FeedbackFooter,
}

impl FeedbackFile {
    /// Decodes a whole file and validates its structure: one header, one
    /// footer, and a footer count matching the number of detail records.
    pub fn decode(file: &str, contents: &str) -> Result<Self> {
        let mut header = None;
        let mut footer = None;
        let mut details = Vec::new();

        for (idx, line) in contents.lines().enumerate() {
            let line_number = idx + 1;
            match FeedbackRecord::decode(file, line, line_number)? {
                FeedbackRecord::Header(h) => {
                    if header.replace(h).is_some() {
                        return Err(format_error(file, line_number, "duplicate header record"));
                    }
                }
                FeedbackRecord::Detail(d) => details.push(d),
                FeedbackRecord::Footer(f) => {
                    if footer.replace(f).is_some() {
                        return Err(format_error(file, line_number, "duplicate footer record"));
                    }
                }
            }
        }

        let header = header.ok_or_else(|| format_error(file, 1, "missing header record"))?;
        let footer = footer.ok_or_else(|| format_error(file, 1, "missing footer record"))?;

        match footer.detail_count {
            Some(count) if count == details.len() as u64 => {}
            Some(count) => {
                return Err(format_error(
                    file,
                    footer.line_number,
                    format!(
                        "footer count {count} does not match {} detail records",
                        details.len()
                    ),
                ));
            }
            None => {
                return Err(format_error(
                    file,
                    footer.line_number,
                    "footer record count is not numeric",
                ));
            }
        }

        Ok(Self {
            header,
            details,
            footer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn detail() -> EcertDetail {
        EcertDetail {
            sin: "123456789".to_string(),
            document_number: "FT00000001".to_string(),
            disbursement_date: date(2026, 8, 10),
            msfaa_number: Some(920000001),
            intensity: OfferingIntensity::FullTime,
            surname: "Côté".to_string(),
            given_name: "Amélie".to_string(),
            birth_date: date(2001, 2, 28),
            total_disbursed: Amount::new(dec!(1234.56)).unwrap(),
            tuition_remittance: Amount::new(dec!(400)).unwrap(),
            enrolment_confirmed: true,
        }
    }

    #[test]
    fn test_detail_line_has_exact_length() {
        let line = detail().encode();
        assert_eq!(line.len(), outbound::LINE_LEN);
        assert!(line.is_ascii());
    }

    #[test]
    fn test_detail_fields_land_at_absolute_offsets() {
        let line = detail().encode();
        assert_eq!(&line[0..3], "200");
        assert_eq!(&line[3..12], "123456789");
        assert_eq!(&line[12..22], "FT00000001");
        assert_eq!(&line[22..30], "20260810");
        assert_eq!(&line[30..40], "0920000001");
        assert_eq!(&line[40..41], "F");
        assert_eq!(line[41..66].trim_end(), "Cote");
        assert_eq!(&line[89..98], "000123456");
        assert_eq!(&line[98..107], "000040000");
        assert_eq!(&line[107..108], "Y");
    }

    #[test]
    fn test_detail_round_trip_modulo_folding() {
        let original = detail();
        let line = original.encode();
        let decoded = EcertDetail::decode("test", &line, 1).unwrap();

        assert_eq!(decoded.document_number, original.document_number);
        assert_eq!(decoded.msfaa_number, original.msfaa_number);
        assert_eq!(decoded.total_disbursed, original.total_disbursed);
        assert_eq!(decoded.tuition_remittance, original.tuition_remittance);
        // Accented names come back folded.
        assert_eq!(decoded.surname, "Cote");
        assert_eq!(decoded.given_name, "Amelie");
    }

    #[test]
    fn test_absent_msfaa_renders_filler() {
        let mut d = detail();
        d.msfaa_number = None;
        let line = d.encode();
        assert_eq!(&line[30..40], "          ");
        assert_eq!(EcertDetail::decode("t", &line, 1).unwrap().msfaa_number, None);
    }

    #[test]
    fn test_file_encode_header_and_trailer() {
        let file = EcertFile {
            environment: "PBC".to_string(),
            file_date: date(2026, 8, 7),
            sequence: 12,
            details: vec![detail(), detail()],
        };
        let text = file.encode();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.len() == outbound::LINE_LEN));
        assert_eq!(&lines[0][0..3], "100");
        assert_eq!(&lines[0][3..7], "PBC ");
        assert_eq!(&lines[0][7..15], "20260807");
        assert_eq!(&lines[0][15..18], "012");
        assert_eq!(&lines[3][0..3], "999");
        assert_eq!(&lines[3][3..9], "000002");
        // 2 x 123456 cents.
        assert_eq!(&lines[3][9..21], "000000246912");
    }

    fn feedback_line(code: &str, body: &str) -> String {
        let mut line = format!("{code}{body}");
        while line.len() < feedback::LINE_LEN {
            line.push(' ');
        }
        line
    }

    #[test]
    fn test_feedback_detail_decodes_by_prefix() {
        let line = feedback_line("300", "FT00000001AEDU-00100            ");
        let record = FeedbackRecord::decode("f", &line, 3).unwrap();

        match record {
            FeedbackRecord::Detail(d) => {
                assert_eq!(d.line_number, 3);
                assert_eq!(d.document_number, "FT00000001");
                assert_eq!(d.status, Some(FeedbackStatus::Accepted));
                assert_eq!(d.error_codes, vec!["EDU-00100".to_string()]);
            }
            other => panic!("expected detail, got {other:?}"),
        }
    }

    #[test]
    fn test_feedback_unknown_prefix_is_file_error() {
        let line = feedback_line("555", "");
        assert!(matches!(
            FeedbackRecord::decode("f", &line, 1),
            Err(EngineError::FileFormat { line: 1, .. })
        ));
    }

    #[test]
    fn test_feedback_wrong_line_length_is_file_error() {
        assert!(matches!(
            FeedbackRecord::decode("f", "300 too short", 2),
            Err(EngineError::FileFormat { line: 2, .. })
        ));
    }

    #[test]
    fn test_feedback_file_count_mismatch_rejected() {
        let contents = [
            feedback_line("100", "PBC 20260807"),
            feedback_line("300", "FT00000001A"),
            feedback_line("999", "000005"),
        ]
        .join("\n");

        assert!(matches!(
            FeedbackFile::decode("f", &contents),
            Err(EngineError::FileFormat { .. })
        ));
    }

    #[test]
    fn test_feedback_file_decodes_when_complete() {
        let contents = [
            feedback_line("100", "PBC 20260807"),
            feedback_line("300", "FT00000001A"),
            feedback_line("300", "FT00000002C"),
            feedback_line("999", "000002"),
        ]
        .join("\n");

        let file = FeedbackFile::decode("f", &contents).unwrap();
        assert_eq!(file.details.len(), 2);
        assert_eq!(file.details[1].status, Some(FeedbackStatus::Cancelled));
        assert_eq!(file.header.environment, "PBC");
    }
}
