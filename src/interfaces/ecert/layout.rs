//! Column layouts for the certificate file formats.
//!
//! Offsets are absolute character positions within a line, not delimiter
//! positions, and are authoritative for their record type. They must match
//! the funding authority's interface specification exactly; a layout change
//! on their side is a new version of this module.

/// One fixed-width field: absolute start offset and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub start: usize,
    pub len: usize,
}

impl Field {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Record-type prefix common to every record of both file formats.
pub const RECORD_CODE: Field = Field::new(0, 3);

pub const HEADER_CODE: &str = "100";
pub const OUTBOUND_DETAIL_CODE: &str = "200";
pub const FEEDBACK_DETAIL_CODE: &str = "300";
pub const TRAILER_CODE: &str = "999";

/// Outbound e-Cert request file. Every line is exactly this long.
pub mod outbound {
    use super::Field;

    pub const LINE_LEN: usize = 130;

    pub mod header {
        use super::Field;

        pub const ENVIRONMENT: Field = Field::new(3, 4);
        pub const FILE_DATE: Field = Field::new(7, 8);
        pub const FILE_SEQUENCE: Field = Field::new(15, 3);
    }

    pub mod detail {
        use super::Field;

        pub const SIN: Field = Field::new(3, 9);
        pub const DOCUMENT_NUMBER: Field = Field::new(12, 10);
        pub const DISBURSEMENT_DATE: Field = Field::new(22, 8);
        pub const MSFAA_NUMBER: Field = Field::new(30, 10);
        pub const OFFERING_INTENSITY: Field = Field::new(40, 1);
        pub const SURNAME: Field = Field::new(41, 25);
        pub const GIVEN_NAME: Field = Field::new(66, 15);
        pub const BIRTH_DATE: Field = Field::new(81, 8);
        pub const TOTAL_DISBURSED_CENTS: Field = Field::new(89, 9);
        pub const TUITION_REMITTANCE_CENTS: Field = Field::new(98, 9);
        pub const ENROLMENT_CONFIRMED: Field = Field::new(107, 1);
    }

    pub mod trailer {
        use super::Field;

        pub const DETAIL_COUNT: Field = Field::new(3, 6);
        pub const TOTAL_CENTS: Field = Field::new(9, 12);
    }
}

/// Inbound feedback/cancellation file from the funding authority.
pub mod feedback {
    use super::Field;

    pub const LINE_LEN: usize = 70;

    pub mod header {
        use super::Field;

        pub const ENVIRONMENT: Field = Field::new(3, 4);
        pub const FILE_DATE: Field = Field::new(7, 8);
    }

    pub mod detail {
        use super::Field;

        pub const DOCUMENT_NUMBER: Field = Field::new(3, 10);
        pub const DISBURSEMENT_STATUS: Field = Field::new(13, 1);
        /// Three fixed-width error-code slots; unused slots are blank.
        pub const ERROR_CODE_1: Field = Field::new(14, 10);
        pub const ERROR_CODE_2: Field = Field::new(24, 10);
        pub const ERROR_CODE_3: Field = Field::new(34, 10);
    }

    pub mod footer {
        use super::Field;

        pub const DETAIL_COUNT: Field = Field::new(3, 6);
    }
}
