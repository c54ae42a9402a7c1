use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

use crate::core::{
    BillingError, FallbackMode, FallbackPolicy, JurisdictionTable, LineTax, OrderItem,
    ReviewFlag, SupplyType, TaxBreakdown, TaxCatalog, TaxSettings, round_money,
};

use super::rules::{ResolvedRate, TaxRuleResolver};

/// Classify a supply from the two state codes.
///
/// Same state is intra-state (CGST + SGST); anything else is inter-state
/// (IGST). This is evaluated once per invoice and applied to every line.
pub fn determine_supply_type(seller_state_code: &str, buyer_state_code: &str) -> SupplyType {
    if seller_state_code.trim() == buyer_state_code.trim() {
        SupplyType::IntraState
    } else {
        SupplyType::InterState
    }
}

/// Compute the GST for a single line given its resolved rate.
///
/// Every figure is rounded half-up to 2 decimals as it is computed.
/// With inclusive prices the taxable value is backed out of the gross
/// amount; otherwise the gross amount is the taxable value and tax is
/// added on top.
pub fn compute_line(
    item: &OrderItem,
    resolved: &ResolvedRate,
    supply_type: SupplyType,
    prices_include_gst: bool,
) -> LineTax {
    let rate = resolved.rate;
    let gross_amount = round_money(item.unit_price * Decimal::from(item.quantity));

    let taxable_value = if prices_include_gst && !rate.is_zero() {
        round_money(gross_amount / (Decimal::ONE + rate / dec!(100)))
    } else {
        gross_amount
    };

    let (cgst, sgst, igst) = match supply_type {
        SupplyType::IntraState => {
            let half = round_money(taxable_value * (rate / dec!(2)) / dec!(100));
            (half, half, Decimal::ZERO)
        }
        SupplyType::InterState => {
            let full = round_money(taxable_value * rate / dec!(100));
            (Decimal::ZERO, Decimal::ZERO, full)
        }
    };

    LineTax {
        product_id: item.product_id.clone(),
        product_name: item.product_name.clone(),
        hsn_code: resolved.hsn_code.clone(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        gross_amount,
        taxable_value,
        rate,
        cgst,
        sgst,
        igst,
        line_total: taxable_value + cgst + sgst + igst,
        rate_source: resolved.source,
    }
}

/// Computes per-line and aggregate GST for an order.
///
/// ```
/// use gstbill::core::*;
/// use gstbill::gst::GstCalculator;
/// use rust_decimal_macros::dec;
///
/// let table = JurisdictionTable::india();
/// let settings = TaxSettingsBuilder::new("Shop", "08").default_rate(dec!(18)).build();
/// let items = [OrderItemBuilder::new("p1", "Lamp", dec!(118), 1).gst_rate(dec!(18)).build()];
///
/// let breakdown = GstCalculator::new(&table)
///     .compute(&items, "08", "Rajasthan", &settings, &EmptyCatalog)
///     .unwrap();
/// assert_eq!(breakdown.total_taxable, dec!(100.00));
/// assert_eq!(breakdown.total_cgst, dec!(9.00));
/// assert_eq!(breakdown.total, dec!(118.00));
/// ```
pub struct GstCalculator<'a> {
    table: &'a JurisdictionTable,
    resolver: TaxRuleResolver,
    on_unknown_jurisdiction: FallbackMode,
}

impl<'a> GstCalculator<'a> {
    pub fn new(table: &'a JurisdictionTable) -> Self {
        Self {
            table,
            resolver: TaxRuleResolver::default(),
            on_unknown_jurisdiction: FallbackMode::Absorb,
        }
    }

    pub fn with_resolver(mut self, resolver: TaxRuleResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Apply a fallback policy to both jurisdiction and rate resolution.
    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.on_unknown_jurisdiction = policy.jurisdiction;
        self.resolver = self.resolver.on_missing_rate(policy.tax_rate);
        self
    }

    /// Resolve the buyer state and classify the supply.
    pub fn classify(
        &self,
        seller_state_code: &str,
        buyer_state: &str,
    ) -> Result<(SupplyType, String, Option<ReviewFlag>), BillingError> {
        let resolution = self.table.resolve(buyer_state);
        let mut flag = None;
        if resolution.is_fallback() {
            if self.on_unknown_jurisdiction == FallbackMode::Reject {
                return Err(BillingError::UnresolvedJurisdiction(buyer_state.into()));
            }
            warn!(
                input = %buyer_state,
                code = %resolution.code,
                "unknown buyer state, using fallback code"
            );
            flag = Some(ReviewFlag::UnknownJurisdiction {
                input: buyer_state.into(),
                fallback_code: resolution.code.clone(),
            });
        }
        let supply_type = determine_supply_type(seller_state_code, &resolution.code);
        Ok((supply_type, resolution.code, flag))
    }

    /// Compute the breakdown for `items` shipped to `buyer_state`.
    pub fn compute<C: TaxCatalog + ?Sized>(
        &self,
        items: &[OrderItem],
        seller_state_code: &str,
        buyer_state: &str,
        settings: &TaxSettings,
        catalog: &C,
    ) -> Result<TaxBreakdown, BillingError> {
        let (supply_type, buyer_state_code, flag) = self.classify(seller_state_code, buyer_state)?;
        let mut review_flags: Vec<ReviewFlag> = flag.into_iter().collect();

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let resolved = self
                .resolver
                .resolve_from_catalog(item, catalog, settings)?;
            review_flags.extend(resolved.flags.iter().cloned());
            lines.push(compute_line(
                item,
                &resolved,
                supply_type,
                settings.prices_include_gst,
            ));
        }

        Ok(aggregate(supply_type, buyer_state_code, lines, review_flags))
    }
}

/// Sum rounded line figures into a breakdown. Totals are never re-derived
/// from unrounded intermediates.
fn aggregate(
    supply_type: SupplyType,
    buyer_state_code: String,
    lines: Vec<LineTax>,
    review_flags: Vec<ReviewFlag>,
) -> TaxBreakdown {
    let total_taxable: Decimal = lines.iter().map(|l| l.taxable_value).sum();
    let total_cgst: Decimal = lines.iter().map(|l| l.cgst).sum();
    let total_sgst: Decimal = lines.iter().map(|l| l.sgst).sum();
    let total_igst: Decimal = lines.iter().map(|l| l.igst).sum();
    let total: Decimal = lines.iter().map(|l| l.line_total).sum();

    TaxBreakdown {
        supply_type,
        buyer_state_code,
        lines,
        total_taxable,
        total_cgst,
        total_sgst,
        total_igst,
        total_tax: total_cgst + total_sgst + total_igst,
        total,
        review_flags,
    }
}
