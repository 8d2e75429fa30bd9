use chrono::NaiveDate;
use ecert_engine::domain::award::{AwardLine, ValueCode};
use ecert_engine::domain::money::Amount;
use ecert_engine::domain::overaward::deduct_overawards;
use ecert_engine::domain::schedule::OfferingIntensity;
use ecert_engine::interfaces::ecert::records::EcertDetail;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;

prop_compose! {
    fn arb_date()(year in 1950i32..2050, month in 1u32..=12, day in 1u32..=28) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}

prop_compose! {
    fn arb_detail()(
        sin in "[0-9]{9}",
        document_number in "[A-Z]{2}[0-9]{8}",
        disbursement_date in arb_date(),
        msfaa_number in proptest::option::of(0u64..10_000_000_000),
        full_time in any::<bool>(),
        surname in "[A-Za-z]{1,25}",
        given_name in "[A-Za-z]{1,15}",
        birth_date in arb_date(),
        total_cents in 0u64..1_000_000_000,
        remittance_cents in 0u64..1_000_000_000,
        enrolment_confirmed in any::<bool>(),
    ) -> EcertDetail {
        EcertDetail {
            sin,
            document_number,
            disbursement_date,
            msfaa_number,
            intensity: if full_time { OfferingIntensity::FullTime } else { OfferingIntensity::PartTime },
            surname,
            given_name,
            birth_date,
            total_disbursed: Amount::from_cents(total_cents),
            tuition_remittance: Amount::from_cents(remittance_cents),
            enrolment_confirmed,
        }
    }
}

proptest! {
    #[test]
    fn prop_detail_round_trips(detail in arb_detail()) {
        let line = detail.encode();
        prop_assert_eq!(line.len(), 130);
        let decoded = EcertDetail::decode("prop", &line, 1).unwrap();
        prop_assert_eq!(decoded, detail);
    }

    #[test]
    fn prop_every_line_is_fixed_width(detail in arb_detail()) {
        let line = detail.encode();
        prop_assert_eq!(line.len(), 130);
        prop_assert!(line.is_ascii());
    }
}

fn cents(raw: u64) -> Decimal {
    Decimal::new(raw as i64, 2)
}

proptest! {
    #[test]
    fn prop_deduction_never_exceeds_estimate_or_goes_negative(
        estimates in proptest::collection::vec(0u64..100_000_00, 1..6),
        balance in 0u64..300_000_00,
    ) {
        let awards: Vec<AwardLine> = estimates
            .iter()
            .map(|&e| AwardLine::new(ValueCode::CSLF, Amount::new(cents(e)).unwrap()))
            .collect();
        let mut balances = HashMap::from([(ValueCode::CSLF, cents(balance))]);
        let as_of = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();

        let outcome = deduct_overawards(1, 10, &awards, &mut balances, as_of).unwrap();

        let mut total_subtracted = Decimal::ZERO;
        for line in &outcome.lines {
            let effective = line.effective_amount.unwrap();
            // amountSubtracted <= estimatedAmount, effectiveAmount >= 0.
            prop_assert!(line.amount_subtracted <= line.estimated_amount);
            prop_assert!(effective.value() >= Decimal::ZERO);
            prop_assert_eq!(
                effective.value() + line.amount_subtracted.value(),
                line.estimated_amount.value()
            );
            total_subtracted += line.amount_subtracted.value();
        }

        // The ledger credits exactly offset what was withheld.
        let credited: Decimal = outcome.ledger_credits.iter().map(|c| c.amount).sum();
        prop_assert_eq!(credited, -total_subtracted);
        prop_assert!(total_subtracted <= cents(balance));
        prop_assert_eq!(balances[&ValueCode::CSLF], cents(balance) - total_subtracted);
    }
}
