//! Indian state and union territory codes for GST.
//!
//! The two-digit code is the one printed as the first two characters of a
//! GSTIN and used to decide between intra-state and inter-state supply.

use serde::Serialize;

/// Code used when a free-text state name matches nothing in the table:
/// "97", Other Territory. An unknown buyer state is therefore treated as
/// inter-state supply.
pub const FALLBACK_STATE_CODE: &str = "97";

/// GST state codes in code order.
static GST_STATES: &[(&str, &str)] = &[
    ("01", "Jammu and Kashmir"),
    ("02", "Himachal Pradesh"),
    ("03", "Punjab"),
    ("04", "Chandigarh"),
    ("05", "Uttarakhand"),
    ("06", "Haryana"),
    ("07", "Delhi"),
    ("08", "Rajasthan"),
    ("09", "Uttar Pradesh"),
    ("10", "Bihar"),
    ("11", "Sikkim"),
    ("12", "Arunachal Pradesh"),
    ("13", "Nagaland"),
    ("14", "Manipur"),
    ("15", "Mizoram"),
    ("16", "Tripura"),
    ("17", "Meghalaya"),
    ("18", "Assam"),
    ("19", "West Bengal"),
    ("20", "Jharkhand"),
    ("21", "Odisha"),
    ("22", "Chhattisgarh"),
    ("23", "Madhya Pradesh"),
    ("24", "Gujarat"),
    ("26", "Dadra and Nagar Haveli and Daman and Diu"),
    ("27", "Maharashtra"),
    ("29", "Karnataka"),
    ("30", "Goa"),
    ("31", "Lakshadweep"),
    ("32", "Kerala"),
    ("33", "Tamil Nadu"),
    ("34", "Puducherry"),
    ("35", "Andaman and Nicobar Islands"),
    ("36", "Telangana"),
    ("37", "Andhra Pradesh"),
    ("38", "Ladakh"),
    ("97", "Other Territory"),
];

/// One row of the jurisdiction table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Jurisdiction {
    pub code: String,
    pub name: String,
}

/// How a free-text name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Input equals a table code.
    Code,
    /// Input equals a name, ignoring case and extra whitespace.
    Exact,
    /// Input is contained in a name.
    Substring,
    /// Nothing matched; the fallback code was returned.
    Fallback,
}

/// Result of [`JurisdictionTable::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub code: String,
    pub kind: MatchKind,
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        self.kind == MatchKind::Fallback
    }
}

/// Static mapping of state codes to names, loaded once and read-only.
#[derive(Debug, Clone)]
pub struct JurisdictionTable {
    entries: Vec<Jurisdiction>,
    fallback_code: String,
}

impl Default for JurisdictionTable {
    fn default() -> Self {
        Self::india()
    }
}

impl JurisdictionTable {
    /// The GST state code table.
    pub fn india() -> Self {
        Self::from_pairs(GST_STATES.iter().copied(), FALLBACK_STATE_CODE)
    }

    /// Build a table from `(code, name)` pairs.
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
        fallback_code: impl Into<String>,
    ) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(code, name)| Jurisdiction {
                    code: code.into(),
                    name: name.into(),
                })
                .collect(),
            fallback_code: fallback_code.into(),
        }
    }

    /// Replace the fallback code.
    pub fn with_fallback(mut self, code: impl Into<String>) -> Self {
        self.fallback_code = code.into();
        self
    }

    pub fn entries(&self) -> &[Jurisdiction] {
        &self.entries
    }

    pub fn fallback_code(&self) -> &str {
        &self.fallback_code
    }

    pub fn is_known_code(&self, code: &str) -> bool {
        self.entries.iter().any(|j| j.code == code)
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|j| j.code == code)
            .map(|j| j.name.as_str())
    }

    /// Resolve a human-entered state name to its code.
    ///
    /// Order: exact code, exact name, first name containing the input,
    /// then the fallback code. Never fails.
    pub fn resolve(&self, input: &str) -> Resolution {
        let needle = normalize(input);
        if needle.is_empty() {
            return self.fallback();
        }

        if let Some(j) = self.entries.iter().find(|j| j.code == needle) {
            return Resolution {
                code: j.code.clone(),
                kind: MatchKind::Code,
            };
        }

        if let Some(j) = self.entries.iter().find(|j| normalize(&j.name) == needle) {
            return Resolution {
                code: j.code.clone(),
                kind: MatchKind::Exact,
            };
        }

        if let Some(j) = self
            .entries
            .iter()
            .find(|j| normalize(&j.name).contains(&needle))
        {
            return Resolution {
                code: j.code.clone(),
                kind: MatchKind::Substring,
            };
        }

        self.fallback()
    }

    /// Shorthand for `resolve(input).code`.
    pub fn resolve_code(&self, input: &str) -> String {
        self.resolve(input).code
    }

    fn fallback(&self) -> Resolution {
        Resolution {
            code: self.fallback_code.clone(),
            kind: MatchKind::Fallback,
        }
    }
}

/// Lower-case and collapse runs of whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
