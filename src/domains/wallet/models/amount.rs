use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::errors::WalletError;

// =====================================================
// Amount - 고정소수점 금액 값 타입
// =====================================================
// 역할: API 경계에서 한 번만 파싱/검증되는 양수 금액
//
// 규칙:
// 1. 0보다 커야 함
// 2. 소수점 이하 최대 2자리 (통화 최소 단위)
// 2-1. 최대 999999999999999999.99 (NUMERIC(20,2)에 들어가는 값), 잔고도 같은 상한
// 3. JSON에서는 문자열("100.00") 또는 정수만 허용, 부동소수점 숫자는 거부
// 4. 직렬화 시 항상 소수점 2자리 문자열
// =====================================================

/// 통화 최소 단위 자릿수 (cents)
/// Number of fractional digits carried by every monetary value
pub const MONEY_SCALE: u32 = 2;

/// 금액/잔고 상한 (NUMERIC(20,2) 최대값)
/// Largest amount or balance the ledger stores
pub fn max_money() -> Decimal {
    Decimal::from_i128_with_scale(99_999_999_999_999_999_999, MONEY_SCALE)
}

/// 0.00 (잔고 초기값)
/// Zero balance at money scale
pub fn zero() -> Decimal {
    Decimal::new(0, MONEY_SCALE)
}

/// 금액을 소수점 2자리로 맞춤
/// Rescale a monetary value to exactly two fractional digits
pub fn normalize(value: Decimal) -> Decimal {
    let mut value = value.round_dp(MONEY_SCALE);
    value.rescale(MONEY_SCALE);
    value
}

/// 양수 금액 (검증 완료)
/// Strictly positive fixed-point amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// Decimal에서 금액 생성
    /// Create an amount, rejecting zero, negatives, sub-cent precision and values above `max_money()`
    pub fn new(value: Decimal) -> Result<Self, WalletError> {
        if value <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount {
                reason: "amount must be greater than zero".to_string(),
            });
        }

        if value.normalize().scale() > MONEY_SCALE {
            return Err(WalletError::InvalidAmount {
                reason: format!("amount supports at most {} decimal places", MONEY_SCALE),
            });
        }

        if value > max_money() {
            return Err(WalletError::InvalidAmount {
                reason: format!("amount must not exceed {}", max_money()),
            });
        }

        Ok(Self(normalize(value)))
    }

    /// 문자열에서 금액 파싱
    /// Parse an amount from its decimal string form
    pub fn parse(raw: &str) -> Result<Self, WalletError> {
        let value = Decimal::from_str(raw.trim()).map_err(|_| WalletError::InvalidAmount {
            reason: format!("'{}' is not a valid decimal amount", raw.trim()),
        })?;
        Self::new(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&normalize(self.0).to_string())
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a positive decimal string such as \"100.00\" or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Amount::new(Decimal::from(v)).map_err(E::custom)
    }

    // 부동소수점은 반올림 오차 때문에 거부
    fn visit_f64<E: de::Error>(self, _v: f64) -> Result<Amount, E> {
        Err(E::custom(
            "Invalid amount: send monetary amounts as decimal strings, not floating point numbers",
        ))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// 잔고(Decimal) 필드를 소수점 2자리 문자열로 직렬화
/// serde helper for balance fields: `#[serde(with = "money")]`
pub mod money {
    use super::normalize;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&normalize(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Decimal::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_to_two_places() {
        let amount = Amount::parse("100").unwrap();
        assert_eq!(amount.to_string(), "100.00");

        let amount = Amount::parse(" 12.5 ").unwrap();
        assert_eq!(amount.value(), Decimal::new(1250, 2));
    }

    #[test]
    fn trailing_zeros_beyond_cents_are_accepted() {
        let amount = Amount::parse("3.1000").unwrap();
        assert_eq!(amount.to_string(), "3.10");
    }

    #[test]
    fn rejects_zero_negative_and_sub_cent_values() {
        for raw in ["0", "0.00", "-5", "0.001", "abc", ""] {
            let err = Amount::parse(raw).unwrap_err();
            assert!(
                matches!(err, WalletError::InvalidAmount { .. }),
                "expected InvalidAmount for {:?}, got {:?}",
                raw,
                err
            );
        }
    }

    /// 테스트: 상한값은 허용, 그보다 1센트라도 크면 InvalidAmount
    #[test]
    fn upper_bound_is_the_largest_numeric_20_2_value() {
        let max = Amount::parse("999999999999999999.99").unwrap();
        assert_eq!(max.value(), max_money());
        assert_eq!(max.to_string(), "999999999999999999.99");

        for raw in ["1000000000000000000", "1000000000000000000000", "79228162514264337593543950335"] {
            let err = Amount::parse(raw).unwrap_err();
            assert!(matches!(err, WalletError::InvalidAmount { .. }), "{} -> {:?}", raw, err);
        }

        // 정수 JSON도 같은 상한
        assert!(serde_json::from_str::<Amount>("18446744073709551615").is_err());
    }

    #[test]
    fn json_accepts_strings_and_integers_but_not_floats() {
        let from_str: Amount = serde_json::from_str("\"45.60\"").unwrap();
        assert_eq!(from_str.value(), Decimal::new(4560, 2));

        let from_int: Amount = serde_json::from_str("7").unwrap();
        assert_eq!(from_int.value(), Decimal::new(700, 2));

        assert!(serde_json::from_str::<Amount>("7.5").is_err());
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
    }

    #[test]
    fn serializes_as_fixed_point_string() {
        let amount = Amount::new(Decimal::new(5, 0)).unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"5.00\"");
    }
}
