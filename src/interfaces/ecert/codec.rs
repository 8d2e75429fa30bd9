//! Fixed-width encode/decode primitives.
//!
//! Encoding always produces exactly the declared field width: numbers are
//! zero-padded on the left, strings space-padded on the right, and values
//! longer than the field are truncated, never an error. Decoding reads by
//! absolute offset; a numeric field that fails conversion yields `None` so
//! the caller decides how severe that is.

use super::layout::Field;
use chrono::NaiveDate;

pub const DATE_PATTERN: &str = "%Y%m%d";

/// A line buffer being assembled to a fixed total width.
pub struct LineBuilder {
    buf: Vec<u8>,
}

impl LineBuilder {
    pub fn new(line_len: usize) -> Self {
        Self {
            buf: vec![b' '; line_len],
        }
    }

    /// Writes a string field: ASCII-folded, space-padded right, truncated at
    /// the field width.
    pub fn put_str(&mut self, field: Field, value: &str) -> &mut Self {
        let folded = fold_to_ascii(value);
        for (i, b) in folded.bytes().take(field.len).enumerate() {
            self.buf[field.start + i] = b;
        }
        self
    }

    /// Writes an unsigned number zero-padded to the field width. A value too
    /// wide for the field keeps its least significant digits.
    pub fn put_num(&mut self, field: Field, value: u64) -> &mut Self {
        let digits = format!("{value:0width$}", width = field.len);
        let tail = &digits[digits.len() - field.len.min(digits.len())..];
        self.buf[field.start..field.start + tail.len()].copy_from_slice(tail.as_bytes());
        self
    }

    pub fn put_date(&mut self, field: Field, value: NaiveDate) -> &mut Self {
        let formatted = value.format(DATE_PATTERN).to_string();
        self.put_str(field, &formatted)
    }

    /// Renders an absent optional as a filler of the exact field width.
    pub fn put_opt_num(&mut self, field: Field, value: Option<u64>) -> &mut Self {
        match value {
            Some(v) => self.put_num(field, v),
            None => self,
        }
    }

    pub fn put_char(&mut self, field: Field, value: char) -> &mut Self {
        let mut tmp = [0u8; 4];
        self.put_str(field, value.encode_utf8(&mut tmp))
    }

    pub fn finish(self) -> String {
        // Every write path stores ASCII bytes only.
        self.buf.iter().map(|&b| b as char).collect()
    }
}

/// Raw field text at the absolute offsets. Characters beyond the line end,
/// or offsets landing inside a multi-byte character of a corrupt line, yield
/// an empty slice rather than a panic.
pub fn raw_field(line: &str, field: Field) -> &str {
    let end = field.end().min(line.len());
    if field.start >= end || !line.is_char_boundary(field.start) || !line.is_char_boundary(end) {
        return "";
    }
    &line[field.start..end]
}

/// A trimmed string field.
pub fn str_field(line: &str, field: Field) -> String {
    raw_field(line, field).trim().to_string()
}

/// A numeric field. `None` is the explicit invalid sentinel for text that is
/// not a number; blank counts as invalid too.
pub fn num_field(line: &str, field: Field) -> Option<u64> {
    raw_field(line, field).trim().parse::<u64>().ok()
}

/// A `YYYYMMDD` date field, `None` when malformed.
pub fn date_field(line: &str, field: Field) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw_field(line, field).trim(), DATE_PATTERN).ok()
}

/// Collapses accented Latin letters to their unaccented equivalents and
/// replaces any other non-ASCII character with `?`, as required by the
/// funding authority's character set.
pub fn fold_to_ascii(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii() {
                return c;
            }
            match c {
                'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
                'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
                'ç' => 'c',
                'Ç' => 'C',
                'è' | 'é' | 'ê' | 'ë' => 'e',
                'È' | 'É' | 'Ê' | 'Ë' => 'E',
                'ì' | 'í' | 'î' | 'ï' => 'i',
                'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
                'ñ' => 'n',
                'Ñ' => 'N',
                'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
                'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
                'ù' | 'ú' | 'û' | 'ü' => 'u',
                'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
                'ý' | 'ÿ' => 'y',
                'Ý' => 'Y',
                'æ' => 'a',
                'Æ' => 'A',
                'œ' => 'o',
                'Œ' => 'O',
                _ => '?',
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const F0_5: Field = Field::new(0, 5);
    const F5_8: Field = Field::new(5, 8);

    #[test]
    fn test_put_str_pads_and_truncates() {
        let mut b = LineBuilder::new(13);
        b.put_str(F0_5, "AB");
        assert_eq!(b.finish(), "AB           ");

        let mut b = LineBuilder::new(13);
        b.put_str(F0_5, "ABCDEFGH");
        assert_eq!(&b.finish()[0..5], "ABCDE");
    }

    #[test]
    fn test_put_num_zero_pads_left() {
        let mut b = LineBuilder::new(13);
        b.put_num(F0_5, 42);
        assert_eq!(&b.finish()[0..5], "00042");
    }

    #[test]
    fn test_put_num_overflow_keeps_low_digits() {
        let mut b = LineBuilder::new(13);
        b.put_num(F0_5, 1234567);
        assert_eq!(&b.finish()[0..5], "34567");
    }

    #[test]
    fn test_put_date_fixed_pattern() {
        let mut b = LineBuilder::new(13);
        b.put_date(F5_8, NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
        assert_eq!(&b.finish()[5..13], "20260807");
    }

    #[test]
    fn test_absent_optional_renders_filler() {
        let mut b = LineBuilder::new(13);
        b.put_opt_num(F0_5, None);
        assert_eq!(&b.finish()[0..5], "     ");
    }

    #[test]
    fn test_num_field_invalid_sentinel() {
        assert_eq!(num_field("00042ABC", F0_5), Some(42));
        assert_eq!(num_field("4x042ABC", F0_5), None);
        assert_eq!(num_field("     ABC", F0_5), None);
    }

    #[test]
    fn test_str_field_trims() {
        assert_eq!(str_field("AB   XYZ", F0_5), "AB");
    }

    #[test]
    fn test_date_field() {
        assert_eq!(
            date_field("     20260807", F5_8),
            NaiveDate::from_ymd_opt(2026, 8, 7)
        );
        assert_eq!(date_field("     20261407", F5_8), None);
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Côté"), "Cote");
        assert_eq!(fold_to_ascii("Ångström"), "Angstrom");
        assert_eq!(fold_to_ascii("Łukasz 北"), "?ukasz ?");
        assert_eq!(fold_to_ascii("plain"), "plain");
    }
}
