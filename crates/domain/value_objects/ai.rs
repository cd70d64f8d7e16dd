use serde::{Deserialize, Deserializer, Serialize, de::Error as _};

use super::enums::locales::Locale;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParseInvoiceTextModel {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReminderModel {
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub locale: Option<Locale>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocaleQuery {
    pub locale: Option<Locale>,
}

/// Invoice fields extracted from free text. Also the contract the model's
/// JSON must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedInvoiceDto {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub client_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
    pub items: Vec<ParsedLineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLineItem {
    pub name: String,
    #[serde(deserialize_with = "lenient_number")]
    pub quantity: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDto {
    pub reminder_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardInsightsDto {
    pub insights: Vec<String>,
}

/// Shape expected from the insights prompt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InsightsCompletion {
    pub insights: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

// Models sometimes quote numbers ("2" instead of 2).
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(raw) => raw
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected a number, got \"{raw}\""))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
