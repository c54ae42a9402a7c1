use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::core::{
    BillingConfig, BillingError, BillingStore, BuyerSnapshot, InsertOutcome, Invoice,
    InvoiceSequencer, JurisdictionTable, Order, ReviewFlag, SellerSnapshot, TaxBreakdown,
    TaxSettings, amount_to_words, round_money, validate_gstin, validate_invoice_arithmetic,
    validate_settings,
};
use crate::gst::GstCalculator;

/// Turns eligible orders into persisted, numbered invoices.
///
/// Generation is idempotent per order: the first successful call issues
/// and stores the invoice, every later call returns the stored one. The
/// invoice number is allocated only after the draft has passed all
/// checks, so a rejected order never consumes a number.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gstbill::core::*;
/// use gstbill::invoice::{InvoiceAssembler, MemoryStore};
/// use rust_decimal_macros::dec;
///
/// let store = MemoryStore::new();
/// store.save_settings(
///     TaxSettingsBuilder::new("Print Cafe", "08").invoice_prefix("PC").build(),
/// ).unwrap();
/// let address = ShippingAddressBuilder::new(
///     "Asha Verma", "9876543210", "12 MG Road", "Jaipur", "Rajasthan", "302001",
/// ).build();
/// let order = OrderBuilder::new("ord_1", address)
///     .add_item(OrderItemBuilder::new("p1", "Mug", dec!(118), 1).gst_rate(dec!(18)).build())
///     .payment_status(PaymentStatus::Paid)
///     .build()
///     .unwrap();
/// store.insert_order(order).unwrap();
///
/// let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
/// let invoice = InvoiceAssembler::new(&store).get_or_create_at("ord_1", at).unwrap();
/// assert_eq!(invoice.invoice_number, "PC-2025-0001");
/// assert_eq!(invoice.cgst, dec!(9.00));
/// assert_eq!(invoice.amount_in_words, "One Hundred Eighteen Only");
/// ```
pub struct InvoiceAssembler<'a, S: BillingStore + ?Sized> {
    store: &'a S,
    config: BillingConfig,
    table: JurisdictionTable,
}

impl<'a, S: BillingStore + ?Sized> InvoiceAssembler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::from_parts(store, BillingConfig::default())
    }

    /// Use `config` instead of the defaults. Fails if the configuration
    /// does not pass [`BillingConfig::check`].
    pub fn with_config(store: &'a S, config: BillingConfig) -> Result<Self, BillingError> {
        config.check()?;
        Ok(Self::from_parts(store, config))
    }

    fn from_parts(store: &'a S, config: BillingConfig) -> Self {
        let table =
            JurisdictionTable::india().with_fallback(config.fallback_jurisdiction_code.clone());
        Self {
            store,
            config,
            table,
        }
    }

    /// Replace the jurisdiction table. The configured fallback code is kept.
    pub fn with_table(mut self, table: JurisdictionTable) -> Self {
        self.table = table.with_fallback(self.config.fallback_jurisdiction_code.clone());
        self
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn table(&self) -> &JurisdictionTable {
        &self.table
    }

    /// Return the invoice for `order_id`, issuing it now if none exists.
    pub fn get_or_create(&self, order_id: &str) -> Result<Invoice, BillingError> {
        self.get_or_create_at(order_id, Utc::now())
    }

    /// Like [`get_or_create`](Self::get_or_create) with an explicit issue
    /// time, which also selects the numbering period.
    pub fn get_or_create_at(
        &self,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Invoice, BillingError> {
        if let Some(existing) = self.store.invoice_for_order(order_id)? {
            self.repair_back_reference(&existing)?;
            return Ok(existing);
        }

        let order = self
            .store
            .order(order_id)?
            .ok_or_else(|| BillingError::OrderNotFound(order_id.into()))?;
        if let Some(reason) = order.ineligibility_reason() {
            debug!(order_id, %reason, "order not eligible for invoicing");
            return Err(BillingError::NotEligible {
                order_id: order_id.into(),
                reason,
            });
        }

        let settings = self.load_settings()?;
        let mut invoice = self.draft(&order, &settings, now)?;

        let period = self.config.period_at(now)?;
        invoice.invoice_number = InvoiceSequencer::new(self.store)
            .with_max_attempts(self.config.sequence_max_attempts)
            .next(&settings.invoice_prefix, &period)?;

        match self.store.insert_invoice(invoice.clone())? {
            InsertOutcome::Inserted => {}
            InsertOutcome::AlreadyExists(existing) => {
                warn!(
                    order_id,
                    discarded = %invoice.invoice_number,
                    kept = %existing.invoice_number,
                    "invoice issued concurrently, discarding allocated number"
                );
                self.repair_back_reference(&existing)?;
                return Ok(*existing);
            }
        }

        self.store
            .set_invoice_number(order_id, &invoice.invoice_number)?;
        info!(
            order_id,
            invoice_number = %invoice.invoice_number,
            grand_total = %invoice.grand_total,
            supply_type = ?invoice.supply_type,
            review_flags = invoice.review_flags.len(),
            "invoice issued"
        );
        Ok(invoice)
    }

    /// Compute the tax breakdown of an order without issuing anything.
    pub fn breakdown(&self, order: &Order) -> Result<TaxBreakdown, BillingError> {
        let settings = self.load_settings()?;
        self.compute(order, &settings)
    }

    /// Existing invoice for an order. Never creates one.
    pub fn invoice_for_order(&self, order_id: &str) -> Result<Option<Invoice>, BillingError> {
        self.store.invoice_for_order(order_id)
    }

    pub fn invoice_by_number(&self, invoice_number: &str) -> Result<Option<Invoice>, BillingError> {
        self.store.invoice_by_number(invoice_number)
    }

    /// Invoices newest first.
    pub fn list_invoices(&self, offset: usize, limit: usize) -> Result<Vec<Invoice>, BillingError> {
        self.store.list_invoices(offset, limit)
    }

    fn load_settings(&self) -> Result<TaxSettings, BillingError> {
        let settings = match self.store.tax_settings()? {
            Some(s) => s,
            None => {
                debug!("no tax settings saved, using defaults");
                TaxSettings::default()
            }
        };
        let errors = validate_settings(&settings, &self.table);
        if !errors.is_empty() {
            let msg = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(BillingError::Configuration(msg));
        }
        Ok(settings)
    }

    fn compute(&self, order: &Order, settings: &TaxSettings) -> Result<TaxBreakdown, BillingError> {
        GstCalculator::new(&self.table)
            .with_policy(self.config.fallback)
            .compute(
                &order.items,
                &settings.business_state_code,
                &order.shipping_address.state,
                settings,
                self.store,
            )
    }

    /// Build and check a complete invoice with an empty number.
    fn draft(
        &self,
        order: &Order,
        settings: &TaxSettings,
        now: DateTime<Utc>,
    ) -> Result<Invoice, BillingError> {
        let breakdown = self.compute(order, settings)?;
        let mut review_flags = breakdown.review_flags;

        let discount = round_money(order.discount_amount);
        if discount > breakdown.total {
            return Err(BillingError::Validation(format!(
                "discount {discount} exceeds order total {}",
                breakdown.total
            )));
        }
        let grand_total = breakdown.total - discount;

        let address = &order.shipping_address;
        let buyer_gstin = match address.gstin.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match validate_gstin(raw) {
                Ok(normalized) => Some(normalized),
                Err(e) => {
                    warn!(order_id = %order.order_id, error = %e, "dropping invalid buyer GSTIN");
                    review_flags.push(ReviewFlag::InvalidBuyerGstin { value: raw.into() });
                    None
                }
            },
        };

        let seller = SellerSnapshot {
            name: settings.business_name.clone(),
            gstin: settings
                .gstin
                .as_deref()
                .map(|g| g.trim().to_ascii_uppercase()),
            address: settings.business_address.clone(),
            state_code: settings.business_state_code.clone(),
            state_name: self
                .table
                .name_of(&settings.business_state_code)
                .map(str::to_string),
        };
        let buyer = BuyerSnapshot {
            name: address.full_name.clone(),
            address_line1: address.address_line1.clone(),
            address_line2: address.address_line2.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            state_code: breakdown.buyer_state_code,
            pincode: address.pincode.clone(),
            phone: address.phone.clone(),
            email: order.guest_email.clone(),
            gstin: buyer_gstin,
        };

        let subtotal: Decimal = breakdown.lines.iter().map(|l| l.gross_amount).sum();
        let invoice = Invoice {
            invoice_number: String::new(),
            created_at: now,
            order_id: order.order_id.clone(),
            seller,
            buyer,
            lines: breakdown.lines,
            supply_type: breakdown.supply_type,
            prices_include_gst: settings.prices_include_gst,
            subtotal,
            discount,
            taxable_amount: breakdown.total_taxable,
            cgst: breakdown.total_cgst,
            sgst: breakdown.total_sgst,
            igst: breakdown.total_igst,
            total_tax: breakdown.total_tax,
            grand_total,
            amount_in_words: amount_to_words(grand_total)?,
            bank: settings.bank.clone(),
            terms: settings.terms.clone(),
            review_flags,
        };

        let errors = validate_invoice_arithmetic(&invoice);
        if !errors.is_empty() {
            return Err(BillingError::from_validation(&errors));
        }
        Ok(invoice)
    }

    /// Finish an earlier generation that stored the invoice but failed
    /// before writing the order's back-reference.
    fn repair_back_reference(&self, invoice: &Invoice) -> Result<(), BillingError> {
        let Some(order) = self.store.order(&invoice.order_id)? else {
            return Ok(());
        };
        if order.invoice_number.as_deref() != Some(invoice.invoice_number.as_str()) {
            debug!(
                order_id = %invoice.order_id,
                invoice_number = %invoice.invoice_number,
                "writing missing order back-reference"
            );
            self.store
                .set_invoice_number(&invoice.order_id, &invoice.invoice_number)?;
        }
        Ok(())
    }
}
