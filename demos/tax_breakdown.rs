use gstbill::core::*;
use gstbill::gst::GstCalculator;
use rust_decimal_macros::dec;

fn main() {
    let table = JurisdictionTable::india();
    let settings = TaxSettingsBuilder::new("Print Cafe", "08")
        .gstin("08AABCU9603R1ZN")
        .build();
    let items = [
        OrderItemBuilder::new("poster", "A2 Poster", dec!(118), 2)
            .gst_rate(dec!(18))
            .hsn_code("4911")
            .build(),
        OrderItemBuilder::new("frame", "Wooden Frame", dec!(560), 1)
            .gst_rate(dec!(12))
            .hsn_code("4414")
            .build(),
    ];

    for state in ["Rajasthan", "Maharashtra", "Atlantis"] {
        let b = GstCalculator::new(&table)
            .compute(&items, &settings.business_state_code, state, &settings, &EmptyCatalog)
            .expect("breakdown should compute");

        println!("Buyer state: {state} ({})", b.buyer_state_code);
        println!("  Supply:    {:?}", b.supply_type);
        for line in &b.lines {
            println!(
                "  {:<14} taxable {:>8} @ {:>2}%  CGST {:>6}  SGST {:>6}  IGST {:>6}",
                line.product_name, line.taxable_value, line.rate, line.cgst, line.sgst, line.igst
            );
        }
        println!("  Total tax: {}", b.total_tax);
        println!("  Total:     {}", b.total);
        for flag in &b.review_flags {
            println!("  Review:    {flag:?}");
        }
        println!();
    }
}
