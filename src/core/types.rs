use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Orders (consumed from the storefront)
// ---------------------------------------------------------------------------

/// A placed order as handed over by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub items: Vec<OrderItem>,
    /// Amount charged to the buyer, as recorded at checkout.
    pub total_amount: Decimal,
    /// Order-level discount (coupon), applied after tax.
    pub discount_amount: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address: ShippingAddress,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Back-reference written once the invoice is issued.
    pub invoice_number: Option<String>,
}

impl Order {
    /// Why this order cannot be invoiced yet, or `None` if it can.
    ///
    /// An order qualifies once payment is captured or fulfilment is
    /// confirmed. Cancelled and refunded orders never qualify.
    pub fn ineligibility_reason(&self) -> Option<String> {
        match self.status {
            OrderStatus::Cancelled | OrderStatus::Refunded => {
                return Some(format!("order status is {}", self.status.as_str()));
            }
            _ => {}
        }
        if self.payment_status == PaymentStatus::Paid || self.status.is_fulfilment_confirmed() {
            None
        } else {
            Some(format!(
                "order status is {} and payment status is {}",
                self.status.as_str(),
                self.payment_status.as_str()
            ))
        }
    }
}

/// One line of an order. Immutable once the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    /// Product name at the time of purchase.
    pub product_name: String,
    pub category_id: Option<String>,
    pub unit_price: Decimal,
    pub quantity: u32,
    /// Per-item HSN/SAC classification code.
    pub hsn_code: Option<String>,
    /// Per-item GST rate override (percent).
    pub gst_rate: Option<Decimal>,
}

/// Buyer delivery address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    /// Free-text state name as entered by the buyer.
    pub state: String,
    pub pincode: String,
    /// Buyer GSTIN for business purchases.
    pub gstin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// True once the seller has committed to fulfilling the order.
    pub fn is_fulfilment_confirmed(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::Processing | Self::Shipped | Self::Delivered
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

// ---------------------------------------------------------------------------
// Settings and catalog data
// ---------------------------------------------------------------------------

/// Seller-wide tax settings, edited by an administrator.
///
/// Loaded once per invoice generation and passed explicitly; never held
/// in a process-wide global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSettings {
    /// Seller legal name.
    pub business_name: String,
    /// Seller GSTIN (15 characters).
    pub gstin: Option<String>,
    /// Seller address, printed on the invoice.
    pub business_address: Option<String>,
    /// Seller registered state code, a jurisdiction table key (e.g. "08").
    pub business_state_code: String,
    /// Global default GST rate in percent. `None` means unset.
    pub default_gst_rate: Option<Decimal>,
    /// Global default HSN/SAC code.
    pub default_hsn_code: Option<String>,
    /// Whether catalog prices already include GST.
    pub prices_include_gst: bool,
    /// Master switch; when off no tax is charged.
    pub gst_enabled: bool,
    /// Invoice number prefix (e.g. "INV").
    pub invoice_prefix: String,
    pub bank: Option<BankDetails>,
    /// Footer terms and conditions.
    pub terms: Option<String>,
}

/// Seller state used when no settings were ever saved.
pub const DEFAULT_SELLER_STATE_CODE: &str = "08";

/// Invoice prefix used when no settings were ever saved.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            business_name: String::new(),
            gstin: None,
            business_address: None,
            business_state_code: DEFAULT_SELLER_STATE_CODE.into(),
            default_gst_rate: Some(Decimal::new(18, 0)),
            default_hsn_code: None,
            prices_include_gst: true,
            gst_enabled: true,
            invoice_prefix: DEFAULT_INVOICE_PREFIX.into(),
            bank: None,
            terms: None,
        }
    }
}

/// Bank account shown on the invoice for transfers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    pub branch: Option<String>,
    pub upi_id: Option<String>,
}

/// Tax data attached to a product or category in the catalog.
/// Either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxClass {
    pub rate: Option<Decimal>,
    pub hsn_code: Option<String>,
}

// ---------------------------------------------------------------------------
// Computed tax breakdown
// ---------------------------------------------------------------------------

/// Whether buyer and seller are in the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyType {
    /// Same state: CGST + SGST at half the rate each.
    IntraState,
    /// Different states: IGST at the full rate.
    InterState,
}

impl SupplyType {
    pub fn is_cross_jurisdiction(&self) -> bool {
        matches!(self, Self::InterState)
    }
}

/// Where a line's GST rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Order line or product record.
    Item,
    /// Product category default.
    Category,
    /// Global default from the tax settings.
    Default,
    /// GST switched off in the settings.
    Disabled,
}

/// A data-quality fallback that was absorbed during computation and
/// should be looked at by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewFlag {
    /// Buyer state name did not match any known state.
    UnknownJurisdiction { input: String, fallback_code: String },
    /// Neither item nor category carried a rate; the global default was used.
    DefaultRateApplied { product_id: String },
    /// A rate outside 0 to 100 percent was found and skipped.
    RateOutOfRangeIgnored {
        product_id: String,
        source: RateSource,
        rate: Decimal,
    },
    /// Buyer GSTIN is malformed and was left off the invoice.
    InvalidBuyerGstin { value: String },
}

/// Tax computed for one order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTax {
    pub product_id: String,
    pub product_name: String,
    pub hsn_code: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// unit_price × quantity, as charged.
    pub gross_amount: Decimal,
    pub taxable_value: Decimal,
    /// GST rate in percent.
    pub rate: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    /// taxable_value + cgst + sgst + igst.
    pub line_total: Decimal,
    pub rate_source: RateSource,
}

impl LineTax {
    pub fn tax(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}

/// Per-line and aggregate tax for a set of order lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub supply_type: SupplyType,
    /// Resolved buyer state code.
    pub buyer_state_code: String,
    pub lines: Vec<LineTax>,
    pub total_taxable: Decimal,
    pub total_cgst: Decimal,
    pub total_sgst: Decimal,
    pub total_igst: Decimal,
    pub total_tax: Decimal,
    /// Sum of line totals.
    pub total: Decimal,
    pub review_flags: Vec<ReviewFlag>,
}

// ---------------------------------------------------------------------------
// Invoice
// ---------------------------------------------------------------------------

/// Seller identity copied onto the invoice at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerSnapshot {
    pub name: String,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub state_code: String,
    pub state_name: Option<String>,
}

/// Buyer identity copied onto the invoice at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerSnapshot {
    pub name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub state_code: String,
    pub pincode: String,
    pub phone: String,
    pub email: Option<String>,
    pub gstin: Option<String>,
}

/// An issued tax invoice. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// `<prefix>-<period>-<counter>`, unique and sortable within a prefix.
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    pub order_id: String,
    pub seller: SellerSnapshot,
    pub buyer: BuyerSnapshot,
    pub lines: Vec<LineTax>,
    pub supply_type: SupplyType,
    /// Whether line prices were treated as GST-inclusive.
    pub prices_include_gst: bool,
    /// Sum of line gross amounts before discount.
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
    /// taxable_amount + total_tax - discount.
    pub grand_total: Decimal,
    pub amount_in_words: String,
    pub bank: Option<BankDetails>,
    pub terms: Option<String>,
    pub review_flags: Vec<ReviewFlag>,
}

impl Invoice {
    pub fn is_cross_jurisdiction(&self) -> bool {
        self.supply_type.is_cross_jurisdiction()
    }
}
