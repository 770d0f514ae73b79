//! Oracle checks against rendered values
//!
//! Only two fields have an oracle today: the financing total and the echoed
//! bank balance. The remaining fields are captured for the report but not
//! judged. New oracles are added to [`CHECKS`].

use crate::cases::ScenarioParams;
use crate::fields::{ExtractedFields, FieldId};
use crate::locale::parse_brl;

/// Largest accepted difference, in currency units.
pub const TOLERANCE: f64 = 0.5;

/// One expected-vs-rendered comparison.
pub struct Check {
    /// Name used in alert messages
    pub name: &'static str,
    pub field: FieldId,
    pub expected: fn(&ScenarioParams) -> Option<f64>,
}

pub const CHECKS: [Check; 2] = [
    Check {
        name: "valorTotalFinanciamento",
        field: FieldId::TotalFinancing,
        expected: expected_financing_total,
    },
    Check {
        name: "saldoBanco",
        field: FieldId::BankBalance,
        expected: expected_bank_balance,
    },
];

/// Installments times installment value, from the generated inputs.
pub fn expected_financing_total(params: &ScenarioParams) -> Option<f64> {
    let installments: u32 = params.total_installments.trim().parse().ok()?;
    let value: f64 = params.installment_value.trim().parse().ok()?;
    Some(f64::from(installments) * value).filter(|total| total.is_finite())
}

/// The bank balance the page is expected to echo unchanged.
pub fn expected_bank_balance(params: &ScenarioParams) -> Option<f64> {
    params
        .bank_balance
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|balance| balance.is_finite())
}

/// Compare every oracle with its rendered field.
///
/// Checks with a missing or unparseable side are skipped.
pub fn validate(params: &ScenarioParams, extracted: &ExtractedFields) -> Vec<String> {
    CHECKS
        .iter()
        .filter_map(|check| {
            let expected = (check.expected)(params)?;
            let actual = extracted.get(check.field).and_then(parse_brl)?;
            mismatch(check.name, expected, actual)
        })
        .collect()
}

fn mismatch(name: &str, expected: f64, actual: f64) -> Option<String> {
    if (actual - expected).abs() > TOLERANCE {
        Some(format!("{} mismatch: expected {:?} got {:?}", name, expected, actual))
    } else {
        None
    }
}
