//! Result fields rendered by the analysis page

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Identifier of one rendered result element (`<span id="...">`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    TotalPaid,
    RemainingDebt,
    PercentPaid,
    OverdueAmount,
    OverdueCharges,
    RemainingInstallments,
    TotalFinancing,
    BankBalance,
    AssetBaseValue,
    AssetCurrentValue,
    DepreciationPercent,
    BalanceAssetGap,
    ClientExposure,
    Scenario1Discount,
    Scenario2Discount,
}

impl FieldId {
    pub const COUNT: usize = 15;

    /// Every field, in extraction and report order.
    pub const ALL: [FieldId; FieldId::COUNT] = [
        FieldId::TotalPaid,
        FieldId::RemainingDebt,
        FieldId::PercentPaid,
        FieldId::OverdueAmount,
        FieldId::OverdueCharges,
        FieldId::RemainingInstallments,
        FieldId::TotalFinancing,
        FieldId::BankBalance,
        FieldId::AssetBaseValue,
        FieldId::AssetCurrentValue,
        FieldId::DepreciationPercent,
        FieldId::BalanceAssetGap,
        FieldId::ClientExposure,
        FieldId::Scenario1Discount,
        FieldId::Scenario2Discount,
    ];

    /// DOM id used by the page.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::TotalPaid => "valorTotalPago",
            FieldId::RemainingDebt => "valorDividaRestante",
            FieldId::PercentPaid => "percentualPago",
            FieldId::OverdueAmount => "valorAtraso",
            FieldId::OverdueCharges => "valorEncargosAtraso",
            FieldId::RemainingInstallments => "parcelasRestantes",
            FieldId::TotalFinancing => "valorTotalFinanciamento",
            FieldId::BankBalance => "saldoBancoResultado",
            FieldId::AssetBaseValue => "valorBemBase",
            FieldId::AssetCurrentValue => "valorBemAtual",
            FieldId::DepreciationPercent => "percentualDepreciacao",
            FieldId::BalanceAssetGap => "gapSaldoValorBem",
            FieldId::ClientExposure => "exposicaoCliente",
            FieldId::Scenario1Discount => "cenario1Desconto",
            FieldId::Scenario2Discount => "cenario2Desconto",
        }
    }

    pub fn selector(&self) -> String {
        format!("#{}", self.as_str())
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw text read for every field of one page load.
///
/// All fifteen keys are always present; a field that could not be read
/// holds `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    values: [Option<String>; FieldId::COUNT],
}

impl ExtractedFields {
    pub fn get(&self, field: FieldId) -> Option<&str> {
        self.values[field.index()].as_deref()
    }

    pub fn set(&mut self, field: FieldId, value: Option<String>) {
        self.values[field.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, Option<&str>)> + '_ {
        FieldId::ALL.into_iter().map(move |field| (field, self.get(field)))
    }

    /// Number of fields that came back with text.
    pub fn read_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl Serialize for ExtractedFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FieldId::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), &value)?;
        }
        map.end()
    }
}
