//! Seeded scenario generation
//!
//! Every scenario is a full set of query parameters for the analysis page.
//! Values are drawn from small discrete sets so that a handful of cases
//! covers over- and under-collateralised contracts, arrears and down
//! payments. The same seed and count always produce the same sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const DEFAULT_CASE_COUNT: usize = 20;
pub const DEFAULT_SEED: u64 = 12345;

const ASSET_VALUES: [u32; 6] = [20_000, 35_000, 50_000, 75_000, 95_000, 120_000];
const TOTAL_INSTALLMENTS: [u32; 4] = [36, 48, 60, 72];
const INSTALLMENT_VALUES: [u32; 4] = [500, 650, 850, 1_200];
const OVERDUE_INSTALLMENTS: [u32; 5] = [0, 1, 3, 6, 12];
const DOWN_PAYMENTS: [u32; 3] = [0, 2_000, 5_000];

const CLIENT_NAME: &str = "Joao";
const CONSULTANT_NAME: &str = "Maria";
const VEHICLE_YEAR: &str = "2021";
const FINANCING_TYPE: &str = "veiculo";

/// Query parameters for one page load.
///
/// Values are kept as the strings sent to the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioParams {
    #[serde(rename = "nomeCliente")]
    pub client_name: String,
    #[serde(rename = "nomeConsultor")]
    pub consultant_name: String,
    #[serde(rename = "valorBem")]
    pub asset_value: String,
    #[serde(rename = "anoVeiculo")]
    pub vehicle_year: String,
    #[serde(rename = "saldoBanco")]
    pub bank_balance: String,
    #[serde(rename = "totalParcelas")]
    pub total_installments: String,
    #[serde(rename = "parcelasPagas")]
    pub installments_paid: String,
    #[serde(rename = "valorParcela")]
    pub installment_value: String,
    #[serde(rename = "parcelasAtraso")]
    pub installments_overdue: String,
    #[serde(rename = "valorEntrada")]
    pub down_payment: String,
    #[serde(rename = "teveEntrada")]
    pub had_down_payment: String,
    #[serde(rename = "tipoFinanciamento")]
    pub financing_type: String,
}

impl ScenarioParams {
    /// Parameter names and values in the order the page reads them.
    pub fn query_pairs(&self) -> [(&'static str, &str); 12] {
        [
            ("nomeCliente", self.client_name.as_str()),
            ("nomeConsultor", self.consultant_name.as_str()),
            ("valorBem", self.asset_value.as_str()),
            ("anoVeiculo", self.vehicle_year.as_str()),
            ("saldoBanco", self.bank_balance.as_str()),
            ("totalParcelas", self.total_installments.as_str()),
            ("parcelasPagas", self.installments_paid.as_str()),
            ("valorParcela", self.installment_value.as_str()),
            ("parcelasAtraso", self.installments_overdue.as_str()),
            ("valorEntrada", self.down_payment.as_str()),
            ("teveEntrada", self.had_down_payment.as_str()),
            ("tipoFinanciamento", self.financing_type.as_str()),
        ]
    }
}

/// Generate `count` scenarios from `seed`.
pub fn generate_cases(count: usize, seed: u64) -> Vec<ScenarioParams> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| generate_case(&mut rng)).collect()
}

fn generate_case<R: Rng>(rng: &mut R) -> ScenarioParams {
    let asset_value = pick(rng, &ASSET_VALUES);
    let bank_balance = pick(
        rng,
        &[
            asset_value + 20_000,
            asset_value + 30_000,
            asset_value - 10_000,
            120_000,
            60_000,
        ],
    );
    let total_installments = pick(rng, &TOTAL_INSTALLMENTS);
    let installment_value = pick(rng, &INSTALLMENT_VALUES);
    let installments_paid = rng.gen_range(0..=max_paid(total_installments));
    let installments_overdue = pick(rng, &OVERDUE_INSTALLMENTS);
    let down_payment = pick(rng, &DOWN_PAYMENTS);

    ScenarioParams {
        client_name: CLIENT_NAME.to_string(),
        consultant_name: CONSULTANT_NAME.to_string(),
        asset_value: asset_value.to_string(),
        vehicle_year: VEHICLE_YEAR.to_string(),
        bank_balance: bank_balance.to_string(),
        total_installments: total_installments.to_string(),
        installments_paid: installments_paid.to_string(),
        installment_value: installment_value.to_string(),
        installments_overdue: installments_overdue.to_string(),
        down_payment: down_payment.to_string(),
        had_down_payment: (down_payment > 0).to_string(),
        financing_type: FINANCING_TYPE.to_string(),
    }
}

/// Upper bound for installments already paid: floor(0.8 * total).
pub fn max_paid(total_installments: u32) -> u32 {
    total_installments * 4 / 5
}

fn pick<R: Rng, T: Copy>(rng: &mut R, options: &[T]) -> T {
    options[rng.gen_range(0..options.len())]
}
