use super::money::Amount;
use serde::{Deserialize, Serialize};

/// Funding category of an award value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    CanadaLoan,
    CanadaGrant,
    ProvincialLoan,
    ProvincialGrant,
    /// Roll-up of all provincial grants for a study period. Reported on
    /// certificates but never counted toward tuition remittance.
    ProvincialTotalGrant,
}

/// Known award value codes.
///
/// The mapping to [`ValueType`] is exhaustive and defined here, once. A code
/// the engine does not know is rejected at intake; there is no default
/// fallback category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueCode {
    /// Canada Student Loan, full-time.
    CSLF,
    /// Canada Student Loan, part-time.
    CSLP,
    /// Canada Student Grant, part-time studies.
    CSGP,
    /// Canada Student Grant, students with disabilities.
    CSGD,
    /// Canada Student Grant, full-time.
    CSGF,
    /// Canada Student Grant, full-time with dependants.
    CSGT,
    /// Provincial student loan.
    BCSL,
    /// Provincial access grant.
    BCAG,
    /// Provincial supplemental bursary for students with disabilities.
    SBSD,
    /// Provincial total grants roll-up.
    BCSG,
}

impl ValueCode {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueCode::CSLF | ValueCode::CSLP => ValueType::CanadaLoan,
            ValueCode::CSGP | ValueCode::CSGD | ValueCode::CSGF | ValueCode::CSGT => {
                ValueType::CanadaGrant
            }
            ValueCode::BCSL => ValueType::ProvincialLoan,
            ValueCode::BCAG | ValueCode::SBSD => ValueType::ProvincialGrant,
            ValueCode::BCSG => ValueType::ProvincialTotalGrant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueCode::CSLF => "CSLF",
            ValueCode::CSLP => "CSLP",
            ValueCode::CSGP => "CSGP",
            ValueCode::CSGD => "CSGD",
            ValueCode::CSGF => "CSGF",
            ValueCode::CSGT => "CSGT",
            ValueCode::BCSL => "BCSL",
            ValueCode::BCAG => "BCAG",
            ValueCode::SBSD => "SBSD",
            ValueCode::BCSG => "BCSG",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "CSLF" => Some(ValueCode::CSLF),
            "CSLP" => Some(ValueCode::CSLP),
            "CSGP" => Some(ValueCode::CSGP),
            "CSGD" => Some(ValueCode::CSGD),
            "CSGF" => Some(ValueCode::CSGF),
            "CSGT" => Some(ValueCode::CSGT),
            "BCSL" => Some(ValueCode::BCSL),
            "BCAG" => Some(ValueCode::BCAG),
            "SBSD" => Some(ValueCode::SBSD),
            "BCSG" => Some(ValueCode::BCSG),
            _ => None,
        }
    }

    pub fn is_loan(&self) -> bool {
        matches!(
            self.value_type(),
            ValueType::CanadaLoan | ValueType::ProvincialLoan
        )
    }
}

/// One award/value item on a disbursement schedule.
///
/// `effective_amount` stays unset until certification time; once the
/// overaward deduction runs it holds `estimated_amount - amount_subtracted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardLine {
    pub value_code: ValueCode,
    pub estimated_amount: Amount,
    pub amount_subtracted: Amount,
    pub effective_amount: Option<Amount>,
}

impl AwardLine {
    pub fn new(value_code: ValueCode, estimated_amount: Amount) -> Self {
        Self {
            value_code,
            estimated_amount,
            amount_subtracted: Amount::ZERO,
            effective_amount: None,
        }
    }

    pub fn value_type(&self) -> ValueType {
        self.value_code.value_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_code_round_trip() {
        for code in [
            ValueCode::CSLF,
            ValueCode::CSLP,
            ValueCode::CSGP,
            ValueCode::CSGD,
            ValueCode::CSGF,
            ValueCode::CSGT,
            ValueCode::BCSL,
            ValueCode::BCAG,
            ValueCode::SBSD,
            ValueCode::BCSG,
        ] {
            assert_eq!(ValueCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ValueCode::parse("XXXX"), None);
    }

    #[test]
    fn test_loan_classification() {
        assert!(ValueCode::CSLF.is_loan());
        assert!(ValueCode::BCSL.is_loan());
        assert!(!ValueCode::CSGF.is_loan());
        assert_eq!(ValueCode::BCSG.value_type(), ValueType::ProvincialTotalGrant);
    }
}
