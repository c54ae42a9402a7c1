#![cfg(feature = "invoice")]

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use gstbill::core::*;
use gstbill::invoice::{InvoiceAssembler, MemoryStore};
use rust_decimal_macros::dec;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 6, 0, 0).unwrap()
}

fn settings() -> TaxSettings {
    TaxSettingsBuilder::new("Print Cafe", "08")
        .gstin("08AABCU9603R1ZN")
        .business_address("5 Tonk Road, Jaipur")
        .invoice_prefix("PC")
        .terms("Goods once sold will not be taken back.")
        .build()
}

fn address(state: &str) -> ShippingAddress {
    ShippingAddressBuilder::new(
        "Asha Verma",
        "9876543210",
        "12 MG Road",
        "Somecity",
        state,
        "302001",
    )
    .build()
}

fn paid_order(id: &str, state: &str) -> Order {
    OrderBuilder::new(id, address(state))
        .add_item(
            OrderItemBuilder::new("p1", "Poster", dec!(118), 1)
                .gst_rate(dec!(18))
                .hsn_code("4911")
                .build(),
        )
        .payment_status(PaymentStatus::Paid)
        .guest_email("asha@example.com")
        .build()
        .unwrap()
}

fn store() -> MemoryStore {
    let store = MemoryStore::new();
    store.save_settings(settings()).unwrap();
    store
}

// --- Issuance ---

#[test]
fn issues_intra_state_invoice() {
    let store = store();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();

    assert_eq!(inv.invoice_number, "PC-2025-0001");
    assert_eq!(inv.supply_type, SupplyType::IntraState);
    assert!(!inv.is_cross_jurisdiction());
    assert_eq!(inv.subtotal, dec!(118));
    assert_eq!(inv.taxable_amount, dec!(100.00));
    assert_eq!(inv.cgst, dec!(9.00));
    assert_eq!(inv.sgst, dec!(9.00));
    assert_eq!(inv.igst, dec!(0));
    assert_eq!(inv.grand_total, dec!(118.00));
    assert_eq!(inv.amount_in_words, "One Hundred Eighteen Only");
    assert_eq!(inv.seller.gstin.as_deref(), Some("08AABCU9603R1ZN"));
    assert_eq!(inv.buyer.email.as_deref(), Some("asha@example.com"));
    assert_eq!(inv.lines[0].hsn_code.as_deref(), Some("4911"));
    assert!(validate_invoice_arithmetic(&inv).is_empty());
}

#[test]
fn issues_inter_state_invoice() {
    let store = store();
    store.insert_order(paid_order("o1", "Maharashtra")).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    assert!(inv.is_cross_jurisdiction());
    assert_eq!(inv.buyer.state_code, "27");
    assert_eq!(inv.igst, dec!(18.00));
    assert_eq!(inv.cgst + inv.sgst, dec!(0));
}

#[test]
fn discount_reduces_grand_total() {
    let store = store();
    let order = OrderBuilder::new("o1", address("Rajasthan"))
        .add_item(OrderItemBuilder::new("p1", "Poster", dec!(118), 2).gst_rate(dec!(18)).build())
        .discount(dec!(36.50))
        .payment_status(PaymentStatus::Paid)
        .build()
        .unwrap();
    store.insert_order(order).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    assert_eq!(inv.taxable_amount + inv.total_tax, dec!(236.00));
    assert_eq!(inv.discount, dec!(36.50));
    assert_eq!(inv.grand_total, dec!(199.50));
    assert_eq!(inv.amount_in_words, "One Hundred Ninety Nine and Fifty Paise Only");
}

#[test]
fn hundred_percent_rate_issues_with_two_paise_drift() {
    // 1.01 / 2 = 0.505 -> 0.51; half of 0.51 = 0.255 -> 0.26 each.
    let store = store();
    let order = OrderBuilder::new("o1", address("Rajasthan"))
        .add_item(OrderItemBuilder::new("p1", "Cigar", dec!(1.01), 1).gst_rate(dec!(100)).build())
        .payment_status(PaymentStatus::Paid)
        .build()
        .unwrap();
    store.insert_order(order).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    assert!(inv.prices_include_gst);
    assert_eq!(inv.supply_type, SupplyType::IntraState);
    assert_eq!(inv.taxable_amount, dec!(0.51));
    assert_eq!(inv.cgst, dec!(0.26));
    assert_eq!(inv.sgst, dec!(0.26));
    assert_eq!(inv.grand_total, dec!(1.03));
    assert!(validate_invoice_arithmetic(&inv).is_empty());
}

#[test]
fn out_of_range_item_rate_falls_back_and_issues() {
    let store = store();
    let order = OrderBuilder::new("o1", address("Rajasthan"))
        .add_item(OrderItemBuilder::new("p1", "Poster", dec!(118), 1).gst_rate(dec!(180)).build())
        .payment_status(PaymentStatus::Paid)
        .build()
        .unwrap();
    store.insert_order(order).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    assert_eq!(inv.lines[0].rate, dec!(18));
    assert_eq!(inv.grand_total, dec!(118.00));
    assert!(matches!(
        inv.review_flags.as_slice(),
        [
            ReviewFlag::RateOutOfRangeIgnored { source: RateSource::Item, .. },
            ReviewFlag::DefaultRateApplied { .. },
        ]
    ));
}

#[test]
fn defaults_apply_when_no_settings_saved() {
    let store = MemoryStore::new();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 1, 2))
        .unwrap();
    assert_eq!(inv.invoice_number, "INV-2025-0001");
    assert_eq!(inv.seller.state_code, "08");
    assert!(inv.prices_include_gst);
}

// --- Idempotence and back-reference ---

#[test]
fn second_call_returns_stored_invoice() {
    let store = store();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let assembler = InvoiceAssembler::new(&store);

    let first = assembler.get_or_create_at("o1", at(2025, 5, 10)).unwrap();
    let second = assembler.get_or_create_at("o1", at(2025, 6, 1)).unwrap();
    assert_eq!(first, second);
    assert_eq!(store.invoice_count().unwrap(), 1);
    assert_eq!(
        store.current(&SequenceKey::new("PC", "2025")).unwrap(),
        1,
        "no number consumed by the second call"
    );
}

#[test]
fn order_points_back_to_its_invoice() {
    let store = store();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    let order = store.order("o1").unwrap().unwrap();
    assert_eq!(order.invoice_number, Some(inv.invoice_number.clone()));
    assert_eq!(
        store.invoice_by_number(&inv.invoice_number).unwrap().unwrap().order_id,
        "o1"
    );
}

#[test]
fn issued_invoice_ignores_later_settings_changes() {
    let store = store();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let assembler = InvoiceAssembler::new(&store);
    let first = assembler.get_or_create_at("o1", at(2025, 5, 10)).unwrap();

    store
        .save_settings(TaxSettingsBuilder::new("Renamed Cafe", "27").build())
        .unwrap();
    let again = assembler.get_or_create_at("o1", at(2025, 5, 11)).unwrap();
    assert_eq!(again.seller.name, "Print Cafe");
    assert_eq!(again, first);
}

// --- Eligibility ---

#[test]
fn scenario_d_pending_order_persists_nothing() {
    let store = store();
    let order = OrderBuilder::new("o1", address("Rajasthan"))
        .add_item(OrderItemBuilder::new("p1", "Poster", dec!(118), 1).build())
        .build()
        .unwrap();
    store.insert_order(order).unwrap();

    let res = InvoiceAssembler::new(&store).get_or_create_at("o1", at(2025, 5, 10));
    assert!(matches!(res, Err(BillingError::NotEligible { .. })));
    assert_eq!(store.invoice_count().unwrap(), 0);
    assert_eq!(store.current(&SequenceKey::new("PC", "2025")).unwrap(), 0);
    assert_eq!(store.order("o1").unwrap().unwrap().invoice_number, None);
}

#[test]
fn confirmed_unpaid_order_is_eligible() {
    let store = store();
    let order = OrderBuilder::new("o1", address("Rajasthan"))
        .add_item(OrderItemBuilder::new("p1", "Poster", dec!(118), 1).gst_rate(dec!(18)).build())
        .status(OrderStatus::Confirmed)
        .build()
        .unwrap();
    store.insert_order(order).unwrap();
    assert!(InvoiceAssembler::new(&store).get_or_create_at("o1", at(2025, 5, 10)).is_ok());
}

#[test]
fn missing_order() {
    let store = store();
    let res = InvoiceAssembler::new(&store).get_or_create("ghost");
    assert!(matches!(res, Err(BillingError::OrderNotFound(id)) if id == "ghost"));
}

#[test]
fn lookup_never_creates() {
    let store = store();
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();
    let assembler = InvoiceAssembler::new(&store);
    assert!(assembler.invoice_for_order("o1").unwrap().is_none());
    assert_eq!(store.invoice_count().unwrap(), 0);
}

// --- Numbering ---

#[test]
fn numbers_are_sequential_per_period() {
    let store = store();
    for id in ["a", "b", "c"] {
        store.insert_order(paid_order(id, "Rajasthan")).unwrap();
    }
    let assembler = InvoiceAssembler::new(&store);
    let a = assembler.get_or_create_at("a", at(2025, 12, 30)).unwrap();
    let b = assembler.get_or_create_at("b", at(2025, 12, 31)).unwrap();
    let c = assembler.get_or_create_at("c", at(2026, 1, 2)).unwrap();
    assert_eq!(a.invoice_number, "PC-2025-0001");
    assert_eq!(b.invoice_number, "PC-2025-0002");
    assert_eq!(c.invoice_number, "PC-2026-0001");
}

#[test]
fn financial_year_periods() {
    let store = store();
    store.insert_order(paid_order("a", "Rajasthan")).unwrap();
    store.insert_order(paid_order("b", "Rajasthan")).unwrap();
    let config = BillingConfigBuilder::new()
        .period(PeriodScheme::FinancialYear)
        .build()
        .unwrap();
    let assembler = InvoiceAssembler::with_config(&store, config).unwrap();
    let a = assembler.get_or_create_at("a", at(2025, 3, 31)).unwrap();
    let b = assembler.get_or_create_at("b", at(2025, 4, 1)).unwrap();
    assert_eq!(a.invoice_number, "PC-2024-25-0001");
    assert_eq!(b.invoice_number, "PC-2025-26-0001");
}

#[test]
fn rejected_order_does_not_consume_a_number() {
    let store = store();
    store.insert_order(paid_order("good", "Rajasthan")).unwrap();
    store.insert_order(paid_order("nowhere", "Gondor")).unwrap();
    let config = BillingConfigBuilder::new()
        .fallback(FallbackPolicy::strict())
        .build()
        .unwrap();
    let assembler = InvoiceAssembler::with_config(&store, config).unwrap();

    let res = assembler.get_or_create_at("nowhere", at(2025, 5, 1));
    assert!(matches!(res, Err(BillingError::UnresolvedJurisdiction(_))));
    let good = assembler.get_or_create_at("good", at(2025, 5, 1)).unwrap();
    assert_eq!(good.invoice_number, "PC-2025-0001");
}

#[test]
fn literal_config_is_checked() {
    let store = store();
    let zero_attempts = BillingConfig {
        sequence_max_attempts: 0,
        ..BillingConfig::default()
    };
    assert!(matches!(
        InvoiceAssembler::with_config(&store, zero_attempts),
        Err(BillingError::Configuration(_))
    ));

    for code in ["", "  ", "Other"] {
        let config = BillingConfig {
            fallback_jurisdiction_code: code.into(),
            ..BillingConfig::default()
        };
        assert!(
            matches!(
                InvoiceAssembler::with_config(&store, config),
                Err(BillingError::Configuration(_))
            ),
            "{code:?}"
        );
    }
}

#[test]
fn concurrent_issuance_is_gapless() {
    let store = Arc::new(store());
    for i in 0..16 {
        store.insert_order(paid_order(&format!("o{i}"), "Rajasthan")).unwrap();
    }

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let config = BillingConfigBuilder::new()
                    .sequence_max_attempts(1_000)
                    .build()
                    .unwrap();
                InvoiceAssembler::with_config(store.as_ref(), config)
                    .unwrap()
                    .get_or_create_at(&format!("o{i}"), at(2025, 7, 1))
                    .unwrap()
                    .invoice_number
            })
        })
        .collect();

    let mut numbers: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    numbers.sort();
    let expected: Vec<String> = (1..=16).map(|n| format!("PC-2025-{n:04}")).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn concurrent_requests_for_one_order_yield_one_invoice() {
    let store = Arc::new(store());
    store.insert_order(paid_order("o1", "Rajasthan")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                InvoiceAssembler::new(store.as_ref())
                    .get_or_create_at("o1", at(2025, 7, 1))
                    .unwrap()
            })
        })
        .collect();

    let invoices: Vec<Invoice> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(invoices.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store.invoice_count().unwrap(), 1);
}

#[test]
fn concurrent_sequencer_calls_form_a_contiguous_run() {
    let store = Arc::new(MemoryStore::new());
    store.set_counter(SequenceKey::new("PC", "2025"), 10).unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                InvoiceSequencer::new(store.as_ref())
                    .with_max_attempts(1_000)
                    .next("PC", "2025")
                    .unwrap()
            })
        })
        .collect();

    let mut numbers: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    numbers.sort();
    let expected: Vec<String> = (11..=42).map(|n| format!("PC-2025-{n:04}")).collect();
    assert_eq!(numbers, expected);
}

// --- Determinism ---

#[test]
fn identical_inputs_give_identical_invoices() {
    let issue = || {
        let store = store();
        store.insert_order(paid_order("o1", "Karnataka")).unwrap();
        InvoiceAssembler::new(&store)
            .get_or_create_at("o1", at(2025, 5, 10))
            .unwrap()
    };
    assert_eq!(issue(), issue());
}

// --- Listing ---

#[test]
fn list_is_newest_first_and_paginated() {
    let store = store();
    for id in ["a", "b", "c"] {
        store.insert_order(paid_order(id, "Rajasthan")).unwrap();
    }
    let assembler = InvoiceAssembler::new(&store);
    assembler.get_or_create_at("a", at(2025, 1, 1)).unwrap();
    assembler.get_or_create_at("b", at(2025, 1, 2)).unwrap();
    assembler.get_or_create_at("c", at(2025, 1, 3)).unwrap();

    let page: Vec<_> = assembler
        .list_invoices(0, 2)
        .unwrap()
        .into_iter()
        .map(|i| i.order_id)
        .collect();
    assert_eq!(page, vec!["c", "b"]);
    let rest = assembler.list_invoices(2, 2).unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].order_id, "a");
    assert!(assembler.list_invoices(5, 2).unwrap().is_empty());
}

// --- Review flags ---

#[test]
fn absorbed_fallbacks_are_flagged() {
    let store = store();
    let order = OrderBuilder::new("o1", address("Gondor"))
        .add_item(OrderItemBuilder::new("misc", "Misc", dec!(118), 1).build())
        .payment_status(PaymentStatus::Paid)
        .build()
        .unwrap();
    store.insert_order(order).unwrap();
    let inv = InvoiceAssembler::new(&store)
        .get_or_create_at("o1", at(2025, 5, 10))
        .unwrap();
    assert_eq!(inv.buyer.state_code, "97");
    assert_eq!(inv.igst, dec!(18.00));
    assert_eq!(inv.review_flags.len(), 2);
}

#[test]
fn preview_breakdown_issues_nothing() {
    let store = store();
    let order = paid_order("o1", "Karnataka");
    let b = InvoiceAssembler::new(&store).breakdown(&order).unwrap();
    assert_eq!(b.total_igst, dec!(18.00));
    assert_eq!(store.invoice_count().unwrap(), 0);
}
