//! GST rate and HSN code resolution.
//!
//! A line's rate comes from the first rule in the chain that has one:
//! the item itself, then its category, then the global default in the
//! tax settings. Rate and HSN code are resolved independently, so an item
//! can carry its own HSN code while inheriting the category rate.

use rust_decimal::Decimal;
use tracing::warn;

use crate::core::{
    BillingError, FallbackMode, MAX_GST_RATE, OrderItem, RateSource, ReviewFlag, TaxCatalog,
    TaxClass, TaxSettings, is_valid_gst_rate,
};

/// One step of the precedence chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateRule {
    /// Rate and code on the order line or product record.
    ItemOverride,
    /// Defaults of the product's category.
    CategoryDefault,
    /// Defaults from [`TaxSettings`].
    GlobalDefault,
}

impl RateRule {
    fn source(&self) -> RateSource {
        match self {
            Self::ItemOverride => RateSource::Item,
            Self::CategoryDefault => RateSource::Category,
            Self::GlobalDefault => RateSource::Default,
        }
    }
}

/// Standard precedence: item, category, global default.
pub const DEFAULT_CHAIN: [RateRule; 3] = [
    RateRule::ItemOverride,
    RateRule::CategoryDefault,
    RateRule::GlobalDefault,
];

/// Rate and HSN code resolved for one line.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRate {
    /// GST rate in percent.
    pub rate: Decimal,
    pub hsn_code: Option<String>,
    pub source: RateSource,
    /// Fallbacks absorbed while resolving.
    pub flags: Vec<ReviewFlag>,
}

/// Tax inputs for a line, gathered before resolution.
#[derive(Debug, Clone, Default)]
pub struct RateInputs {
    pub product_id: String,
    pub item: TaxClass,
    pub category: Option<TaxClass>,
}

impl RateInputs {
    /// Inputs from an order line alone.
    pub fn from_item(item: &OrderItem, category: Option<&TaxClass>) -> Self {
        Self {
            product_id: item.product_id.clone(),
            item: TaxClass {
                rate: item.gst_rate,
                hsn_code: item.hsn_code.clone(),
            },
            category: category.cloned(),
        }
    }

    /// Inputs from an order line, filling gaps from the catalog. Values
    /// snapshotted on the order line win over the current catalog.
    pub fn from_catalog<C: TaxCatalog + ?Sized>(item: &OrderItem, catalog: &C) -> Self {
        let product = catalog.product_tax(&item.product_id).unwrap_or_default();
        let category = item
            .category_id
            .as_deref()
            .and_then(|id| catalog.category_tax(id));
        Self {
            product_id: item.product_id.clone(),
            item: TaxClass {
                rate: item.gst_rate.or(product.rate),
                hsn_code: item.hsn_code.clone().or(product.hsn_code),
            },
            category,
        }
    }
}

/// Ordered chain of rate rules.
#[derive(Debug, Clone)]
pub struct TaxRuleResolver {
    chain: Vec<RateRule>,
    on_missing_rate: FallbackMode,
}

impl Default for TaxRuleResolver {
    fn default() -> Self {
        Self {
            chain: DEFAULT_CHAIN.to_vec(),
            on_missing_rate: FallbackMode::Absorb,
        }
    }
}

impl TaxRuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom precedence chain.
    pub fn with_chain(mut self, chain: impl Into<Vec<RateRule>>) -> Self {
        self.chain = chain.into();
        self
    }

    /// What to do when a line has to fall back to the global default.
    pub fn on_missing_rate(mut self, mode: FallbackMode) -> Self {
        self.on_missing_rate = mode;
        self
    }

    pub fn chain(&self) -> &[RateRule] {
        &self.chain
    }

    /// Resolve `(rate, hsn_code)` for an order line and its category.
    pub fn resolve(
        &self,
        item: &OrderItem,
        category: Option<&TaxClass>,
        settings: &TaxSettings,
    ) -> Result<ResolvedRate, BillingError> {
        self.resolve_inputs(&RateInputs::from_item(item, category), settings)
    }

    /// Resolve an order line, looking up product and category in `catalog`.
    pub fn resolve_from_catalog<C: TaxCatalog + ?Sized>(
        &self,
        item: &OrderItem,
        catalog: &C,
        settings: &TaxSettings,
    ) -> Result<ResolvedRate, BillingError> {
        self.resolve_inputs(&RateInputs::from_catalog(item, catalog), settings)
    }

    pub fn resolve_inputs(
        &self,
        inputs: &RateInputs,
        settings: &TaxSettings,
    ) -> Result<ResolvedRate, BillingError> {
        let hsn_code = self.resolve_hsn(inputs, settings);

        if !settings.gst_enabled {
            return Ok(ResolvedRate {
                rate: Decimal::ZERO,
                hsn_code,
                source: RateSource::Disabled,
                flags: Vec::new(),
            });
        }

        let mut flags = Vec::new();
        for rule in &self.chain {
            let Some(rate) = self.class_for(*rule, inputs, settings).rate else {
                continue;
            };

            if !is_valid_gst_rate(rate) {
                if *rule == RateRule::GlobalDefault {
                    return Err(BillingError::Configuration(format!(
                        "default GST rate {rate} must be between 0 and {MAX_GST_RATE}"
                    )));
                }
                warn!(
                    product_id = %inputs.product_id,
                    rate = %rate,
                    source = ?rule.source(),
                    "ignoring out-of-range GST rate"
                );
                flags.push(ReviewFlag::RateOutOfRangeIgnored {
                    product_id: inputs.product_id.clone(),
                    source: rule.source(),
                    rate,
                });
                continue;
            }

            if *rule == RateRule::GlobalDefault && self.chain.len() > 1 {
                if self.on_missing_rate == FallbackMode::Reject {
                    return Err(BillingError::UnresolvedTaxRate(format!(
                        "product {} has no item or category GST rate",
                        inputs.product_id
                    )));
                }
                warn!(
                    product_id = %inputs.product_id,
                    rate = %rate,
                    "no item or category GST rate, applying default"
                );
                flags.push(ReviewFlag::DefaultRateApplied {
                    product_id: inputs.product_id.clone(),
                });
            }

            return Ok(ResolvedRate {
                rate,
                hsn_code,
                source: rule.source(),
                flags,
            });
        }

        Err(BillingError::UnresolvedTaxRate(format!(
            "no GST rate for product {} and no default rate configured",
            inputs.product_id
        )))
    }

    fn resolve_hsn(&self, inputs: &RateInputs, settings: &TaxSettings) -> Option<String> {
        self.chain.iter().find_map(|rule| {
            self.class_for(*rule, inputs, settings)
                .hsn_code
                .filter(|c| !c.trim().is_empty())
        })
    }

    fn class_for(&self, rule: RateRule, inputs: &RateInputs, settings: &TaxSettings) -> TaxClass {
        match rule {
            RateRule::ItemOverride => inputs.item.clone(),
            RateRule::CategoryDefault => inputs.category.clone().unwrap_or_default(),
            RateRule::GlobalDefault => TaxClass {
                rate: settings.default_gst_rate,
                hsn_code: settings.default_hsn_code.clone(),
            },
        }
    }
}
