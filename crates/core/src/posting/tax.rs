//! GST tax computation.
//!
//! Indian GST splits into CGST + SGST for intra-state supplies (company and
//! party registered in the same state) and a single IGST component for
//! inter-state supplies. The state is encoded in the first two characters of
//! a party's GSTIN.

use rust_decimal::Decimal;

/// Tax jurisdiction of a supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jurisdiction {
    /// Company and party are in the same state: tax splits into CGST + SGST.
    IntraState,
    /// Different or unknown states: the full tax is IGST.
    InterState,
}

impl Jurisdiction {
    /// Determines the jurisdiction from the company's state code and the
    /// party's state code (both optional).
    ///
    /// Intra-state requires both codes to be present and equal; anything else
    /// (missing company code, unregistered party, differing states) is
    /// inter-state.
    #[must_use]
    pub fn determine(company_state: Option<&str>, party_state: Option<&str>) -> Self {
        match (company_state, party_state) {
            (Some(company), Some(party)) if company == party => Self::IntraState,
            _ => Self::InterState,
        }
    }
}

/// Per-line GST components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxSplit {
    /// Central GST.
    pub cgst: Decimal,
    /// State GST.
    pub sgst: Decimal,
    /// Integrated GST.
    pub igst: Decimal,
}

impl TaxSplit {
    /// Splits a total tax amount according to the jurisdiction.
    #[must_use]
    pub fn split(total_tax: Decimal, jurisdiction: Jurisdiction) -> Self {
        match jurisdiction {
            Jurisdiction::IntraState => {
                let half = total_tax / Decimal::TWO;
                Self {
                    cgst: half,
                    sgst: half,
                    igst: Decimal::ZERO,
                }
            }
            Jurisdiction::InterState => Self {
                cgst: Decimal::ZERO,
                sgst: Decimal::ZERO,
                igst: total_tax,
            },
        }
    }

    /// Sum of all components.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}

/// Extracts the two-character state code from a GSTIN.
///
/// Returns `None` for absent or too-short identifiers.
#[must_use]
pub fn party_state_code(gstin: Option<&str>) -> Option<&str> {
    gstin.and_then(|g| g.get(0..2))
}

/// Taxable value of a line: `quantity x rate`.
#[must_use]
pub fn taxable_value(quantity: i64, rate: Decimal) -> Decimal {
    Decimal::from(quantity) * rate
}

/// Total tax on a taxable value at the given GST rate percentage.
#[must_use]
pub fn compute_total_tax(taxable: Decimal, gst_rate: Decimal) -> Decimal {
    taxable * gst_rate / Decimal::ONE_HUNDRED
}
