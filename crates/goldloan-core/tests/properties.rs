//! Property tests for the validation rules and the loan derivation, plus the
//! end-to-end intake scenario.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use goldloan_core::calculation::equivalent_weight;
use goldloan_core::report::{BorrowerField, OrnamentField};
use goldloan_core::validation::{validate_aadhar, validate_pan, validate_weight_ceiling};
use goldloan_core::{
    validate_application, ApplicationData, Borrower, Certificate, Edit, FieldPath, OrnamentRow,
    Violation,
};
use proptest::prelude::*;

/// A two-decimal weight as typed, with its value in hundredths.
fn weight() -> impl Strategy<Value = (String, u32)> {
    (0u32..1_000_000).prop_map(|hundredths| {
        (
            format!("{}.{:02}", hundredths / 100, hundredths % 100),
            hundredths,
        )
    })
}

fn ornament() -> impl Strategy<Value = OrnamentRow> {
    (
        prop_oneof![Just("chain"), Just("ring"), Just("coins"), Just("bangle")],
        weight(),
        weight(),
        prop_oneof![Just("18"), Just("22"), Just("24"), Just("91.6"), Just("")],
        "[0-9]{0,5}",
        "[A-Z0-9-]{0,8}",
    )
        .prop_map(|(item, (gross, _), (stone, _), purity, rate, hallmark)| {
            OrnamentRow::new()
                .with_gold_items(item)
                .with_gross_weight(gross)
                .with_stone_weight(stone)
                .with_purity(purity)
                .with_market_value(rate)
                .with_hallmark(hallmark)
        })
}

fn application() -> impl Strategy<Value = ApplicationData> {
    (
        "[A-Za-z ]{0,20}",
        "[a-zA-Z0-9]{0,10}",
        "[0-9]{0,12}",
        prop::collection::vec(ornament(), 0..5),
        prop_oneof![Just(""), Just("60"), Just("75"), Just("abc")],
    )
        .prop_map(|(name, pan, aadhar, ornaments, ltv)| {
            let app = ApplicationData::new()
                .with_borrower(
                    Borrower::default()
                        .with_full_name(name)
                        .with_pan(&pan)
                        .with_aadhar_number(aadhar),
                )
                .with_ornaments(ornaments);
            let summary = app.loan_calculation_summary.clone().with_ltv_ratio(ltv);
            app.with_loan_calculation_summary(summary)
        })
}

// =============================================================================
// Identity Rules
// =============================================================================

proptest! {
    #[test]
    fn aadhar_accepts_twelve_digits_starting_two_to_nine(value in "[2-9][0-9]{11}") {
        prop_assert!(validate_aadhar(&value).is_ok());
    }

    #[test]
    fn aadhar_rejects_leading_zero_or_one(value in "[01][0-9]{11}") {
        prop_assert_eq!(validate_aadhar(&value), Err(Violation::InvalidAadhar));
    }

    #[test]
    fn aadhar_rejects_wrong_length(value in "[2-9][0-9]{0,10}|[2-9][0-9]{12,15}") {
        prop_assert_eq!(validate_aadhar(&value), Err(Violation::InvalidAadhar));
    }

    #[test]
    fn pan_validity_ignores_case(value in "[a-zA-Z0-9]{1,12}") {
        prop_assert_eq!(
            validate_pan(&value.to_ascii_lowercase()),
            validate_pan(&value.to_ascii_uppercase())
        );
    }

    #[test]
    fn well_formed_pan_accepted_in_any_case(value in "[a-zA-Z]{5}[0-9]{4}[a-zA-Z]") {
        prop_assert!(validate_pan(&value).is_ok());
    }
}

// =============================================================================
// Derivation
// =============================================================================

proptest! {
    #[test]
    fn net_gold_is_exact_and_never_negative((gross, g) in weight(), (stone, s) in weight()) {
        let row = OrnamentRow::new()
            .with_gross_weight(gross)
            .with_stone_weight(stone);

        let expected = g.saturating_sub(s);
        prop_assert_eq!(row.net_gold, format!("{}.{:02}", expected / 100, expected % 100));
    }

    #[test]
    fn equivalent_weight_monotonic_in_purity(
        net in 0.0f64..10_000.0,
        a in 0.0f64..30.0,
        b in 0.0f64..30.0,
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(equivalent_weight(net, low) <= equivalent_weight(net, high));
    }

    #[test]
    fn document_round_trip_is_byte_identical(app in application()) {
        let first = app.to_document().unwrap();
        let hydrated = ApplicationData::from_document(&first).unwrap();
        let second = hydrated.to_document().unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn recalculation_is_idempotent(app in application()) {
        let once = app.clone().recalculated();
        let twice = once.clone().recalculated();
        prop_assert_eq!(once, twice);
    }
}

// =============================================================================
// Fixed Scenarios
// =============================================================================

#[test]
fn weight_ceiling_boundary() {
    let at_limit = vec![OrnamentRow::new().with_gross_weight("1000")];
    assert!(validate_weight_ceiling(&at_limit).is_ok());

    let over = vec![OrnamentRow::new().with_gross_weight("1000.01")];
    assert_eq!(
        validate_weight_ceiling(&over),
        Err(Violation::TotalNetExceeded)
    );
}

#[test]
fn intake_scenario() {
    let edits = vec![
        Edit::SetBorrower {
            field: BorrowerField::Pan,
            value: "abcde1234f".into(),
        },
        Edit::SetBorrower {
            field: BorrowerField::AadharNumber,
            value: "0123456789 01".into(),
        },
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::GrossWeight,
            value: "10".into(),
        },
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::StoneWeight,
            value: "2".into(),
        },
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::Purity,
            value: "22".into(),
        },
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::MarketValue,
            value: "5000".into(),
        },
        Edit::SetLtvRatio("75".into()),
    ];

    let app = edits
        .into_iter()
        .try_fold(ApplicationData::new(), ApplicationData::apply)
        .expect("edits address existing rows");

    assert_eq!(app.borrower.pan, "ABCDE1234F");
    assert_eq!(app.ornaments[0].net_gold, "8.00");
    assert_eq!(app.ornaments[0].equivalent_weight, "8.0000");

    let section = &app.calculation_section;
    assert_eq!(section.total_value, 40000.0);
    assert_eq!(section.eligible_loan, 30000.0);
    assert!(section.is_weight_valid);

    let report = validate_application(&app);
    assert_eq!(
        report.violation_at(FieldPath::Borrower(BorrowerField::Pan)),
        None
    );
    assert_eq!(
        report.violation_at(FieldPath::Borrower(BorrowerField::AadharNumber)),
        Some(&Violation::InvalidAadhar)
    );
    assert_eq!(
        report.violation_at(FieldPath::Ornament {
            index: 0,
            field: None
        }),
        None
    );
}

#[test]
fn certificate_sums_stored_gross_weight() {
    let app = ApplicationData::new()
        .with_ornaments(vec![
            OrnamentRow::new().with_gross_weight("5"),
            OrnamentRow::new().with_gross_weight("7"),
        ]);

    let certificate =
        Certificate::from_document(&app.to_document().unwrap()).expect("stored record");
    assert_eq!(certificate.total_gross_weight(), 12.0);
}

#[test]
fn overflowing_totals_survive_round_trip() {
    let huge = format!("1{}", "0".repeat(200));
    let app = ApplicationData::new().with_ornaments(vec![OrnamentRow::new()
        .with_gross_weight(huge.as_str())
        .with_purity("22")
        .with_market_value(huge.as_str())]);

    let section = &app.calculation_section;
    assert!(section.total_value.is_finite());
    assert!(section.eligible_loan.is_finite());

    let first = app.to_document().unwrap();
    let stored: serde_json::Value = serde_json::from_str(&first).unwrap();
    assert!(stored["calculationsection"]["totalValue"].is_number());
    assert!(stored["calculationsection"]["eligibleLoan"].is_number());

    let hydrated = ApplicationData::from_document(&first).expect("stored record hydrates");
    assert_eq!(hydrated.to_document().unwrap(), first);
}

#[test]
fn null_totals_hydrate_from_older_documents() {
    let doc = r#"{"calculationsection":{"totalWeight":8,"totalValue":null,"eligibleLoan":null}}"#;
    let app = ApplicationData::from_document(doc).expect("null totals read as zero");
    assert_eq!(app, ApplicationData::new());
}
