//! Amount in words, Indian numbering (thousand, lakh, crore).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::BillingError;

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;
const HUNDRED: u64 = 100;

/// Render a rupee amount in words, e.g. `118.50` →
/// `"One Hundred Eighteen and Fifty Paise Only"`.
///
/// The amount must be non-negative with at most two decimal places;
/// anything else is a caller bug and fails with
/// [`BillingError::MalformedAmount`].
pub fn amount_to_words(amount: Decimal) -> Result<String, BillingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(BillingError::MalformedAmount(format!(
            "{amount} is negative"
        )));
    }
    let amount = amount.normalize();
    if amount.scale() > 2 {
        return Err(BillingError::MalformedAmount(format!(
            "{amount} has more than two decimal places"
        )));
    }

    let whole = amount.trunc();
    let rupees = whole
        .to_u64()
        .ok_or_else(|| BillingError::MalformedAmount(format!("{amount} is too large")))?;
    let paise = ((amount - whole) * Decimal::ONE_HUNDRED)
        .to_u64()
        .ok_or_else(|| BillingError::MalformedAmount(format!("{amount} has invalid paise")))?;

    let mut out = integer_to_words(rupees);
    if paise > 0 {
        out.push_str(" and ");
        out.push_str(&integer_to_words(paise));
        out.push_str(" Paise");
    }
    out.push_str(" Only");
    Ok(out)
}

/// Words for a whole number, `0` → `"Zero"`.
pub fn integer_to_words(n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    push_words(n, &mut parts);
    parts.join(" ")
}

fn push_words(n: u64, parts: &mut Vec<&'static str>) {
    let groups: [(u64, &'static str); 4] = [
        (CRORE, "Crore"),
        (LAKH, "Lakh"),
        (THOUSAND, "Thousand"),
        (HUNDRED, "Hundred"),
    ];
    for (size, word) in groups {
        if n >= size {
            push_words(n / size, parts);
            parts.push(word);
            let rest = n % size;
            if rest > 0 {
                push_words(rest, parts);
            }
            return;
        }
    }
    push_below_hundred(n, parts);
}

fn push_below_hundred(n: u64, parts: &mut Vec<&'static str>) {
    // n < 100 here
    let n = n as usize;
    if n < 20 {
        parts.push(ONES[n]);
    } else {
        parts.push(TENS[n / 10]);
        if n % 10 > 0 {
            parts.push(ONES[n % 10]);
        }
    }
}
