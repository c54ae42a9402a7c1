//! In-memory reference implementation of the storage traits.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use tracing::warn;

use crate::core::{
    BillingError, CounterRepository, InsertOutcome, Invoice, InvoiceRepository, Order,
    OrderRepository, SequenceKey, SettingsRepository, TaxCatalog, TaxClass, TaxSettings,
};

fn poisoned<T>(_: T) -> BillingError {
    BillingError::Storage("lock poisoned".into())
}

/// Thread-safe store backed by hash maps.
///
/// Counter updates and invoice inserts each happen under a single lock, so
/// they are atomic for every thread sharing this value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: RwLock<HashMap<String, Order>>,
    invoices: RwLock<Vec<Invoice>>,
    settings: RwLock<Option<TaxSettings>>,
    counters: Mutex<HashMap<SequenceKey, u32>>,
    products: RwLock<HashMap<String, TaxClass>>,
    categories: RwLock<HashMap<String, TaxClass>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_order(&self, order: Order) -> Result<(), BillingError> {
        self.orders
            .write()
            .map_err(poisoned)?
            .insert(order.order_id.clone(), order);
        Ok(())
    }

    pub fn save_settings(&self, settings: TaxSettings) -> Result<(), BillingError> {
        *self.settings.write().map_err(poisoned)? = Some(settings);
        Ok(())
    }

    pub fn set_product_tax(
        &self,
        product_id: impl Into<String>,
        class: TaxClass,
    ) -> Result<(), BillingError> {
        self.products
            .write()
            .map_err(poisoned)?
            .insert(product_id.into(), class);
        Ok(())
    }

    pub fn set_category_tax(
        &self,
        category_id: impl Into<String>,
        class: TaxClass,
    ) -> Result<(), BillingError> {
        self.categories
            .write()
            .map_err(poisoned)?
            .insert(category_id.into(), class);
        Ok(())
    }

    /// Seed a counter, e.g. when migrating from another system.
    pub fn set_counter(&self, key: SequenceKey, value: u32) -> Result<(), BillingError> {
        self.counters.lock().map_err(poisoned)?.insert(key, value);
        Ok(())
    }

    pub fn invoice_count(&self) -> Result<usize, BillingError> {
        Ok(self.invoices.read().map_err(poisoned)?.len())
    }
}

impl OrderRepository for MemoryStore {
    fn order(&self, order_id: &str) -> Result<Option<Order>, BillingError> {
        Ok(self.orders.read().map_err(poisoned)?.get(order_id).cloned())
    }

    fn set_invoice_number(
        &self,
        order_id: &str,
        invoice_number: &str,
    ) -> Result<(), BillingError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        let order = orders
            .get_mut(order_id)
            .ok_or_else(|| BillingError::OrderNotFound(order_id.into()))?;
        order.invoice_number = Some(invoice_number.into());
        Ok(())
    }
}

impl InvoiceRepository for MemoryStore {
    fn invoice_for_order(&self, order_id: &str) -> Result<Option<Invoice>, BillingError> {
        Ok(self
            .invoices
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|i| i.order_id == order_id)
            .cloned())
    }

    fn invoice_by_number(&self, invoice_number: &str) -> Result<Option<Invoice>, BillingError> {
        Ok(self
            .invoices
            .read()
            .map_err(poisoned)?
            .iter()
            .find(|i| i.invoice_number == invoice_number)
            .cloned())
    }

    fn insert_invoice(&self, invoice: Invoice) -> Result<InsertOutcome, BillingError> {
        let mut invoices = self.invoices.write().map_err(poisoned)?;
        if let Some(existing) = invoices.iter().find(|i| i.order_id == invoice.order_id) {
            return Ok(InsertOutcome::AlreadyExists(Box::new(existing.clone())));
        }
        if invoices
            .iter()
            .any(|i| i.invoice_number == invoice.invoice_number)
        {
            return Err(BillingError::Storage(format!(
                "invoice number {} already issued",
                invoice.invoice_number
            )));
        }
        invoices.push(invoice);
        Ok(InsertOutcome::Inserted)
    }

    fn list_invoices(&self, offset: usize, limit: usize) -> Result<Vec<Invoice>, BillingError> {
        let mut all: Vec<Invoice> = self.invoices.read().map_err(poisoned)?.clone();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.invoice_number.cmp(&a.invoice_number))
        });
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }
}

impl SettingsRepository for MemoryStore {
    fn tax_settings(&self) -> Result<Option<TaxSettings>, BillingError> {
        Ok(self.settings.read().map_err(poisoned)?.clone())
    }
}

impl CounterRepository for MemoryStore {
    fn current(&self, key: &SequenceKey) -> Result<u32, BillingError> {
        Ok(self
            .counters
            .lock()
            .map_err(poisoned)?
            .get(key)
            .copied()
            .unwrap_or(0))
    }

    fn compare_and_set(
        &self,
        key: &SequenceKey,
        expected: u32,
        new: u32,
    ) -> Result<bool, BillingError> {
        let mut counters = self.counters.lock().map_err(poisoned)?;
        let slot = counters.entry(key.clone()).or_insert(0);
        if *slot != expected {
            return Ok(false);
        }
        *slot = new;
        Ok(true)
    }
}

impl TaxCatalog for MemoryStore {
    fn product_tax(&self, product_id: &str) -> Option<TaxClass> {
        match self.products.read() {
            Ok(products) => products.get(product_id).cloned(),
            Err(_) => {
                warn!(product_id, "product catalog lock poisoned, treating as missing");
                None
            }
        }
    }

    fn category_tax(&self, category_id: &str) -> Option<TaxClass> {
        match self.categories.read() {
            Ok(categories) => categories.get(category_id).cloned(),
            Err(_) => {
                warn!(category_id, "category catalog lock poisoned, treating as missing");
                None
            }
        }
    }
}
