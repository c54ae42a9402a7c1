use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::gstin::{gstin_state_code, validate_gstin};
use super::states::JurisdictionTable;
use super::types::*;

/// Round a money amount to 2 decimal places, half-up (commercial rounding).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Highest GST rate accepted anywhere, in percent.
pub const MAX_GST_RATE: Decimal = dec!(100);

/// Whether `rate` is a usable GST percentage (0 to [`MAX_GST_RATE`]).
pub fn is_valid_gst_rate(rate: Decimal) -> bool {
    (!rate.is_sign_negative() || rate.is_zero()) && rate <= MAX_GST_RATE
}

/// Largest amount by which an inclusive line total may differ from the
/// charged amount at `rate`.
///
/// Backing out the taxable value is off by at most half a paisa, which the
/// tax then scales by `1 + rate/100`. Each rounded tax component adds at
/// most another half paisa.
pub fn inclusive_line_tolerance(rate: Decimal, supply_type: SupplyType) -> Decimal {
    let components = match supply_type {
        SupplyType::IntraState => dec!(2),
        SupplyType::InterState => Decimal::ONE,
    };
    dec!(0.005) * (Decimal::ONE + rate.abs() / dec!(100)) + dec!(0.005) * components
}

/// Validate tax settings before they are used for an invoice.
/// Returns all validation errors found (not just the first).
pub fn validate_settings(
    settings: &TaxSettings,
    table: &JurisdictionTable,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !table.is_known_code(&settings.business_state_code) {
        errors.push(ValidationError::with_rule(
            "settings.business_state_code",
            format!(
                "'{}' is not a known state code",
                settings.business_state_code
            ),
            "CFG-01",
        ));
    }

    if let Some(rate) = settings.default_gst_rate {
        if !is_valid_gst_rate(rate) {
            errors.push(ValidationError::with_rule(
                "settings.default_gst_rate",
                format!("rate {rate} must be between 0 and {MAX_GST_RATE}"),
                "CFG-02",
            ));
        }
    }

    let prefix = &settings.invoice_prefix;
    if prefix.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "settings.invoice_prefix",
            "invoice prefix must not be empty",
            "CFG-03",
        ));
    } else if prefix.chars().any(char::is_whitespace)
        || prefix.starts_with('-')
        || prefix.ends_with('-')
    {
        errors.push(ValidationError::with_rule(
            "settings.invoice_prefix",
            format!("invoice prefix '{prefix}' must not contain whitespace or start/end with '-'"),
            "CFG-03",
        ));
    }

    if let Some(gstin) = &settings.gstin {
        match validate_gstin(gstin) {
            Ok(normalized) => {
                if gstin_state_code(&normalized) != Some(settings.business_state_code.as_str()) {
                    errors.push(ValidationError::with_rule(
                        "settings.gstin",
                        format!(
                            "GSTIN state code does not match business state '{}'",
                            settings.business_state_code
                        ),
                        "CFG-04",
                    ));
                }
            }
            Err(e) => errors.push(ValidationError::with_rule(
                "settings.gstin",
                e.to_string(),
                "CFG-04",
            )),
        }
    }

    if let Some(code) = &settings.default_hsn_code {
        if code.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                "settings.default_hsn_code",
                "default HSN code must not be blank when set",
                "CFG-05",
            ));
        }
    }

    errors
}

/// Validate the arithmetic identities of an issued invoice.
///
/// - SUM-01: Σ line totals = taxable amount + total tax
/// - SUM-02: taxable amount + total tax − discount = grand total
/// - SUM-03: component totals equal the sums of the line components
/// - SUM-04: the taxable base matches the charged amounts
/// - SPLIT-01: either CGST+SGST or IGST, never both
pub fn validate_invoice_arithmetic(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let line_total: Decimal = invoice.lines.iter().map(|l| l.line_total).sum();
    let taxable: Decimal = invoice.lines.iter().map(|l| l.taxable_value).sum();
    let cgst: Decimal = invoice.lines.iter().map(|l| l.cgst).sum();
    let sgst: Decimal = invoice.lines.iter().map(|l| l.sgst).sum();
    let igst: Decimal = invoice.lines.iter().map(|l| l.igst).sum();
    let gross: Decimal = invoice.lines.iter().map(|l| l.gross_amount).sum();

    for (i, line) in invoice.lines.iter().enumerate() {
        if line.line_total != line.taxable_value + line.tax() {
            errors.push(ValidationError::with_rule(
                format!("lines[{i}].line_total"),
                format!(
                    "{} != taxable {} + tax {}",
                    line.line_total,
                    line.taxable_value,
                    line.tax()
                ),
                "SUM-01",
            ));
        }
    }

    if line_total != invoice.taxable_amount + invoice.total_tax {
        errors.push(ValidationError::with_rule(
            "total_tax",
            format!(
                "sum of line totals {line_total} != taxable {} + tax {}",
                invoice.taxable_amount, invoice.total_tax
            ),
            "SUM-01",
        ));
    }

    if invoice.taxable_amount + invoice.total_tax - invoice.discount != invoice.grand_total {
        errors.push(ValidationError::with_rule(
            "grand_total",
            format!(
                "{} != taxable {} + tax {} - discount {}",
                invoice.grand_total, invoice.taxable_amount, invoice.total_tax, invoice.discount
            ),
            "SUM-02",
        ));
    }
    if invoice.grand_total.is_sign_negative() && !invoice.grand_total.is_zero() {
        errors.push(ValidationError::with_rule(
            "grand_total",
            "grand total must not be negative",
            "SUM-02",
        ));
    }

    if taxable != invoice.taxable_amount
        || cgst != invoice.cgst
        || sgst != invoice.sgst
        || igst != invoice.igst
        || invoice.total_tax != invoice.cgst + invoice.sgst + invoice.igst
    {
        errors.push(ValidationError::with_rule(
            "total_tax",
            "component totals do not match line components",
            "SUM-03",
        ));
    }

    if gross != invoice.subtotal {
        errors.push(ValidationError::with_rule(
            "subtotal",
            format!("subtotal {} != sum of line amounts {gross}", invoice.subtotal),
            "SUM-04",
        ));
    }
    if invoice.prices_include_gst {
        let tolerance: Decimal = invoice
            .lines
            .iter()
            .map(|l| inclusive_line_tolerance(l.rate, invoice.supply_type))
            .sum();
        let drift = (gross - line_total).abs();
        if drift > tolerance {
            errors.push(ValidationError::with_rule(
                "taxable_amount",
                format!("inclusive total drifts {drift} from charged amount {gross}"),
                "SUM-04",
            ));
        }
    } else if taxable != gross {
        errors.push(ValidationError::with_rule(
            "taxable_amount",
            format!("exclusive taxable amount {taxable} != charged amount {gross}"),
            "SUM-04",
        ));
    }

    let (split_used, single_used) = (
        !cgst.is_zero() || !sgst.is_zero(),
        !igst.is_zero(),
    );
    let wrong_component = match invoice.supply_type {
        SupplyType::IntraState => single_used,
        SupplyType::InterState => split_used,
    };
    if wrong_component || (split_used && single_used) {
        errors.push(ValidationError::with_rule(
            "supply_type",
            "CGST/SGST and IGST must not both be charged",
            "SPLIT-01",
        ));
    }

    errors
}
