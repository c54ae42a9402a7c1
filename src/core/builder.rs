use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::BillingError;
use super::types::*;

/// Builder for constructing orders handed to the invoicing core.
///
/// ```
/// use gstbill::core::*;
/// use rust_decimal_macros::dec;
///
/// let order = OrderBuilder::new(
///     "order_1",
///     ShippingAddressBuilder::new(
///         "Asha Verma", "9876543210", "12 MG Road", "Jaipur", "Rajasthan", "302001",
///     )
///     .build(),
/// )
/// .add_item(OrderItemBuilder::new("prod_1", "Brass Diya", dec!(118), 1).build())
/// .payment_status(PaymentStatus::Paid)
/// .build()
/// .unwrap();
///
/// assert_eq!(order.total_amount, dec!(118));
/// ```
pub struct OrderBuilder {
    order_id: String,
    items: Vec<OrderItem>,
    total_amount: Option<Decimal>,
    discount_amount: Decimal,
    status: OrderStatus,
    payment_status: PaymentStatus,
    shipping_address: ShippingAddress,
    guest_email: Option<String>,
    created_at: DateTime<Utc>,
}

impl OrderBuilder {
    pub fn new(order_id: impl Into<String>, shipping_address: ShippingAddress) -> Self {
        Self {
            order_id: order_id.into(),
            items: Vec::new(),
            total_amount: None,
            discount_amount: Decimal::ZERO,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address,
            guest_email: None,
            created_at: Utc::now(),
        }
    }

    pub fn add_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Override the recorded order total. Defaults to Σ price × qty − discount.
    pub fn total_amount(mut self, amount: Decimal) -> Self {
        self.total_amount = Some(amount);
        self
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount_amount = amount;
        self
    }

    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn guest_email(mut self, email: impl Into<String>) -> Self {
        self.guest_email = Some(email.into());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> Result<Order, BillingError> {
        if self.items.is_empty() {
            return Err(BillingError::Validation(
                "order must have at least one item".into(),
            ));
        }
        if self.items.len() > 10_000 {
            return Err(BillingError::Validation(
                "order cannot have more than 10,000 items".into(),
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(BillingError::Validation(format!(
                    "items[{i}].quantity must not be zero"
                )));
            }
            if item.unit_price.is_sign_negative() {
                return Err(BillingError::Validation(format!(
                    "items[{i}].unit_price must not be negative"
                )));
            }
        }
        if self.discount_amount.is_sign_negative() {
            return Err(BillingError::Validation(
                "discount must not be negative".into(),
            ));
        }

        let total_amount = self.total_amount.unwrap_or_else(|| {
            let gross: Decimal = self
                .items
                .iter()
                .map(|i| i.unit_price * Decimal::from(i.quantity))
                .sum();
            gross - self.discount_amount
        });

        Ok(Order {
            order_id: self.order_id,
            items: self.items,
            total_amount,
            discount_amount: self.discount_amount,
            status: self.status,
            payment_status: self.payment_status,
            shipping_address: self.shipping_address,
            guest_email: self.guest_email,
            created_at: self.created_at,
            invoice_number: None,
        })
    }
}

/// Builder for OrderItem.
pub struct OrderItemBuilder {
    product_id: String,
    product_name: String,
    category_id: Option<String>,
    unit_price: Decimal,
    quantity: u32,
    hsn_code: Option<String>,
    gst_rate: Option<Decimal>,
}

impl OrderItemBuilder {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            category_id: None,
            unit_price,
            quantity,
            hsn_code: None,
            gst_rate: None,
        }
    }

    pub fn category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn hsn_code(mut self, code: impl Into<String>) -> Self {
        self.hsn_code = Some(code.into());
        self
    }

    pub fn gst_rate(mut self, rate: Decimal) -> Self {
        self.gst_rate = Some(rate);
        self
    }

    pub fn build(self) -> OrderItem {
        OrderItem {
            product_id: self.product_id,
            product_name: self.product_name,
            category_id: self.category_id,
            unit_price: self.unit_price,
            quantity: self.quantity,
            hsn_code: self.hsn_code,
            gst_rate: self.gst_rate,
        }
    }
}

/// Builder for ShippingAddress.
pub struct ShippingAddressBuilder {
    address: ShippingAddress,
}

impl ShippingAddressBuilder {
    pub fn new(
        full_name: impl Into<String>,
        phone: impl Into<String>,
        address_line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pincode: impl Into<String>,
    ) -> Self {
        Self {
            address: ShippingAddress {
                full_name: full_name.into(),
                phone: phone.into(),
                address_line1: address_line1.into(),
                address_line2: None,
                city: city.into(),
                state: state.into(),
                pincode: pincode.into(),
                gstin: None,
            },
        }
    }

    pub fn address_line2(mut self, line: impl Into<String>) -> Self {
        self.address.address_line2 = Some(line.into());
        self
    }

    pub fn gstin(mut self, gstin: impl Into<String>) -> Self {
        self.address.gstin = Some(gstin.into());
        self
    }

    pub fn build(self) -> ShippingAddress {
        self.address
    }
}

/// Builder for [`TaxSettings`], starting from the documented defaults.
pub struct TaxSettingsBuilder {
    settings: TaxSettings,
}

impl TaxSettingsBuilder {
    pub fn new(business_name: impl Into<String>, business_state_code: impl Into<String>) -> Self {
        Self {
            settings: TaxSettings {
                business_name: business_name.into(),
                business_state_code: business_state_code.into(),
                ..Default::default()
            },
        }
    }

    pub fn gstin(mut self, gstin: impl Into<String>) -> Self {
        self.settings.gstin = Some(gstin.into());
        self
    }

    pub fn business_address(mut self, address: impl Into<String>) -> Self {
        self.settings.business_address = Some(address.into());
        self
    }

    pub fn default_rate(mut self, rate: Decimal) -> Self {
        self.settings.default_gst_rate = Some(rate);
        self
    }

    /// Clear the global default rate.
    pub fn no_default_rate(mut self) -> Self {
        self.settings.default_gst_rate = None;
        self
    }

    pub fn default_hsn_code(mut self, code: impl Into<String>) -> Self {
        self.settings.default_hsn_code = Some(code.into());
        self
    }

    pub fn prices_include_gst(mut self, inclusive: bool) -> Self {
        self.settings.prices_include_gst = inclusive;
        self
    }

    pub fn gst_enabled(mut self, enabled: bool) -> Self {
        self.settings.gst_enabled = enabled;
        self
    }

    pub fn invoice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.invoice_prefix = prefix.into();
        self
    }

    pub fn bank(mut self, bank: BankDetails) -> Self {
        self.settings.bank = Some(bank);
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.settings.terms = Some(terms.into());
        self
    }

    pub fn build(self) -> TaxSettings {
        self.settings
    }
}
