use chrono::NaiveDate;
use gstbill::core::*;
use rust_decimal_macros::dec;
use std::sync::Mutex;
use std::collections::HashMap;

/// Minimal counter store for exercising the sequencer without the
/// `invoice` feature.
#[derive(Default)]
struct Counters(Mutex<HashMap<SequenceKey, u32>>);

impl CounterRepository for Counters {
    fn current(&self, key: &SequenceKey) -> Result<u32, BillingError> {
        Ok(self.0.lock().unwrap().get(key).copied().unwrap_or(0))
    }

    fn compare_and_set(
        &self,
        key: &SequenceKey,
        expected: u32,
        new: u32,
    ) -> Result<bool, BillingError> {
        let mut map = self.0.lock().unwrap();
        let slot = map.entry(key.clone()).or_insert(0);
        if *slot != expected {
            return Ok(false);
        }
        *slot = new;
        Ok(true)
    }
}

// --- Amount in words ---

#[test]
fn words_for_common_amounts() {
    insta::assert_snapshot!(amount_to_words(dec!(0)).unwrap(), @"Zero Only");
    insta::assert_snapshot!(amount_to_words(dec!(118.00)).unwrap(), @"One Hundred Eighteen Only");
    insta::assert_snapshot!(
        amount_to_words(dec!(1234.50)).unwrap(),
        @"One Thousand Two Hundred Thirty Four and Fifty Paise Only"
    );
    insta::assert_snapshot!(amount_to_words(dec!(100000)).unwrap(), @"One Lakh Only");
    insta::assert_snapshot!(
        amount_to_words(dec!(12345678.09)).unwrap(),
        @"One Crore Twenty Three Lakh Forty Five Thousand Six Hundred Seventy Eight and Nine Paise Only"
    );
}

#[test]
fn words_reject_bad_amounts() {
    assert!(matches!(
        amount_to_words(dec!(-1)),
        Err(BillingError::MalformedAmount(_))
    ));
    assert!(matches!(
        amount_to_words(dec!(1.005)),
        Err(BillingError::MalformedAmount(_))
    ));
    // Trailing zeros beyond two places are harmless.
    assert_eq!(amount_to_words(dec!(5.1000)).unwrap(), "Five and Ten Paise Only");
}

// --- Jurisdictions ---

#[test]
fn resolves_names_codes_and_fallback() {
    let table = JurisdictionTable::india();
    assert_eq!(table.resolve_code("Rajasthan"), "08");
    assert_eq!(table.resolve_code("  maharashtra "), "27");
    assert_eq!(table.resolve_code("29"), "29");
    assert_eq!(table.resolve_code("Tamil   Nadu"), "33");
    assert_eq!(table.resolve_code(""), "97");
    assert_eq!(table.resolve_code("Atlantis"), "97");
    assert_eq!(table.resolve("Atlantis").kind, MatchKind::Fallback);
}

#[test]
fn jurisdiction_listing_is_complete() {
    let table = JurisdictionTable::india();
    assert_eq!(table.entries().len(), 37);
    assert_eq!(table.name_of("08"), Some("Rajasthan"));
    assert!(table.entries().iter().all(|j| j.code.len() == 2));
}

// --- Numbering ---

#[test]
fn scenario_c_sequential_numbers() {
    let counters = Counters::default();
    let seq = InvoiceSequencer::new(&counters);
    assert_eq!(seq.next("PC", "2025").unwrap(), "PC-2025-0001");
    assert_eq!(seq.next("PC", "2025").unwrap(), "PC-2025-0002");
}

#[test]
fn counters_are_scoped_by_prefix_and_period() {
    let counters = Counters::default();
    let seq = InvoiceSequencer::new(&counters);
    assert_eq!(seq.next("PC", "2025").unwrap(), "PC-2025-0001");
    assert_eq!(seq.next("PC", "2026").unwrap(), "PC-2026-0001");
    assert_eq!(seq.next("INV", "2025").unwrap(), "INV-2025-0001");
    assert_eq!(seq.peek("PC", "2025").unwrap(), "PC-2025-0002");
}

#[test]
fn counter_widens_past_four_digits() {
    let key = SequenceKey::new("PC", "2025");
    assert_eq!(format_invoice_number(&key, 9999), "PC-2025-9999");
    assert_eq!(format_invoice_number(&key, 10000), "PC-2025-10000");
}

#[test]
fn financial_year_numbering_period() {
    let fy = PeriodScheme::FinancialYear;
    let d = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
    assert_eq!(fy.period_for(d), "2025-26");
}

// --- Settings ---

#[test]
fn default_settings_are_valid() {
    let errors = validate_settings(&TaxSettings::default(), &JurisdictionTable::india());
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn settings_errors_are_all_reported() {
    let settings = TaxSettingsBuilder::new("Shop", "08")
        .default_rate(dec!(120))
        .invoice_prefix("P C")
        .gstin("27AAPFU0939F1ZV")
        .build();
    let errors = validate_settings(&settings, &JurisdictionTable::india());
    let rules: Vec<_> = errors.iter().filter_map(|e| e.rule.as_deref()).collect();
    assert_eq!(rules, vec!["CFG-02", "CFG-03", "CFG-04"]);
}

#[test]
fn seller_gstin_must_match_state() {
    let ok = TaxSettingsBuilder::new("Shop", "08")
        .gstin("08AABCU9603R1ZN")
        .build();
    assert!(validate_settings(&ok, &JurisdictionTable::india()).is_empty());
}

#[test]
fn gstin_checksum() {
    assert_eq!(validate_gstin("29aagcb7383j1z4").unwrap(), "29AAGCB7383J1Z4");
    assert!(validate_gstin("29AAGCB7383J1Z5").is_err());
    assert_eq!(gstin_state_code("07AAACR5055K1Z9"), Some("07"));
}

// --- Eligibility ---

#[test]
fn eligibility_rules() {
    let address =
        ShippingAddressBuilder::new("A", "1", "L", "Jaipur", "Rajasthan", "302001").build();
    let order = |status, payment| {
        OrderBuilder::new("o", address.clone())
            .add_item(OrderItemBuilder::new("p", "P", dec!(10), 1).build())
            .status(status)
            .payment_status(payment)
            .build()
            .unwrap()
    };
    assert!(order(OrderStatus::Pending, PaymentStatus::Pending).ineligibility_reason().is_some());
    assert!(order(OrderStatus::Pending, PaymentStatus::Paid).ineligibility_reason().is_none());
    assert!(order(OrderStatus::Shipped, PaymentStatus::Pending).ineligibility_reason().is_none());
    assert!(order(OrderStatus::Cancelled, PaymentStatus::Paid).ineligibility_reason().is_some());
    assert!(order(OrderStatus::Refunded, PaymentStatus::Refunded).ineligibility_reason().is_some());
}
