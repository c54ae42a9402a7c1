use gstbill::core::*;
use gstbill::invoice::{InvoiceAssembler, MemoryStore};
use rust_decimal_macros::dec;

fn main() {
    let store = MemoryStore::new();
    store
        .save_settings(
            TaxSettingsBuilder::new("Print Cafe", "08")
                .gstin("08AABCU9603R1ZN")
                .business_address("5 Tonk Road, Jaipur 302015")
                .invoice_prefix("PC")
                .bank(BankDetails {
                    account_name: "Print Cafe".into(),
                    account_number: "001122334455".into(),
                    ifsc: "HDFC0000123".into(),
                    bank_name: "HDFC Bank".into(),
                    branch: Some("Jaipur".into()),
                    upi_id: Some("printcafe@hdfcbank".into()),
                })
                .terms("Goods once sold will not be taken back.")
                .build(),
        )
        .expect("settings should save");

    let order = OrderBuilder::new(
        "ord_1001",
        ShippingAddressBuilder::new(
            "Asha Verma",
            "9876543210",
            "12 MG Road",
            "Pune",
            "Maharashtra",
            "411001",
        )
        .gstin("27AAPFU0939F1ZV")
        .build(),
    )
    .add_item(
        OrderItemBuilder::new("poster", "A2 Poster", dec!(118), 3)
            .gst_rate(dec!(18))
            .hsn_code("4911")
            .build(),
    )
    .discount(dec!(50))
    .payment_status(PaymentStatus::Paid)
    .guest_email("asha@example.com")
    .build()
    .expect("order should be valid");
    store.insert_order(order).expect("order should save");

    let assembler = InvoiceAssembler::new(&store);
    let invoice = assembler
        .get_or_create("ord_1001")
        .expect("invoice should be issued");

    println!("Invoice:       {}", invoice.invoice_number);
    println!("Seller:        {} ({:?})", invoice.seller.name, invoice.seller.gstin);
    println!("Buyer:         {} ({:?})", invoice.buyer.name, invoice.buyer.gstin);
    println!("Supply:        {:?}", invoice.supply_type);
    println!("Taxable:       {}", invoice.taxable_amount);
    println!("IGST:          {}", invoice.igst);
    println!("Discount:      {}", invoice.discount);
    println!("Grand total:   {}", invoice.grand_total);
    println!("In words:      {}", invoice.amount_in_words);

    // A second request returns the stored invoice.
    let again = assembler.get_or_create("ord_1001").expect("lookup");
    assert_eq!(again.invoice_number, invoice.invoice_number);
}
