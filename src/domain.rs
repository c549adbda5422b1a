use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PUNCTUATED_CNPJ: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").unwrap());

pub const CNPJ_DIGITS: usize = 14;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cnpj(String);

impl Cnpj {
    pub fn normalize(value: &str) -> Self {
        Self(normalize_cnpj(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_canonical(&self) -> bool {
        PUNCTUATED_CNPJ.is_match(&self.0)
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input without exactly 14 digits comes back unchanged.
pub fn normalize_cnpj(value: &str) -> String {
    if PUNCTUATED_CNPJ.is_match(value) {
        return value.to_string();
    }

    let digits: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() != CNPJ_DIGITS {
        return value.to_string();
    }

    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

// Numeric columns are kept as the feed wrote them, period as decimal separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundRecord {
    #[serde(rename = "type")]
    pub fund_type: String,
    pub cnpj: String,
    pub date: String,
    pub total_volume: String,
    pub quota_value: String,
    pub net_asset_volume: String,
    pub daily_fundraising: String,
    pub daily_withdraw: String,
    pub number_of_shareholders: String,
}

impl FundRecord {
    pub fn fields(&self) -> [&str; 9] {
        [
            self.fund_type.as_str(),
            self.cnpj.as_str(),
            self.date.as_str(),
            self.total_volume.as_str(),
            self.quota_value.as_str(),
            self.net_asset_volume.as_str(),
            self.daily_fundraising.as_str(),
            self.daily_withdraw.as_str(),
            self.number_of_shareholders.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuates_bare_digits() {
        assert_eq!(normalize_cnpj("00017024000153"), "00.017.024/0001-53");
    }

    #[test]
    fn keeps_punctuated_value() {
        assert_eq!(normalize_cnpj("00.017.024/0001-53"), "00.017.024/0001-53");
    }

    #[test]
    fn repunctuates_mixed_separators() {
        assert_eq!(normalize_cnpj("00 017 024-0001/53"), "00.017.024/0001-53");
    }

    #[test]
    fn short_input_is_returned_verbatim() {
        assert_eq!(normalize_cnpj("1234"), "1234");
        assert_eq!(normalize_cnpj(" 0001 "), " 0001 ");
        assert_eq!(normalize_cnpj(""), "");
    }

    #[test]
    fn padded_punctuated_value_is_rebuilt() {
        assert_eq!(normalize_cnpj(" 00.017.024/0001-53 "), "00.017.024/0001-53");
    }
}
