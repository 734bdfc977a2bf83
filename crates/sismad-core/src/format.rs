//! # Display Formatting
//!
//! pt-BR rendering of money, volume and dates for screens and printouts.
//!
//! ```text
//! Money(123456)        ──► "R$ 1.234,56"
//! Money(-550)          ──► "-R$ 5,50"
//! Volume(563 dm³)      ──► "0.563 m³"      (format_volume)
//! Volume(1234567 dm³)  ──► "1.234,567 m³"  (format_volume_br)
//! 2024-03-05           ──► "05/03/2024"
//! ```

use chrono::NaiveDate;

use crate::money::Money;
use crate::volume::Volume;

/// Groups the digits of `n` in thousands with `.`.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Formats money as Brazilian currency.
///
/// ## Example
/// ```rust
/// use sismad_core::format::format_currency;
/// use sismad_core::money::Money;
///
/// assert_eq!(format_currency(Money::from_cents(0)), "R$ 0,00");
/// assert_eq!(format_currency(Money::from_cents(1_234_567_89)), "R$ 1.234.567,89");
/// assert_eq!(format_currency(Money::from_cents(-5)), "-R$ 0,05");
/// ```
pub fn format_currency(money: Money) -> String {
    let cents = money.cents().unsigned_abs();
    let sign = if money.is_negative() { "-" } else { "" };
    format!(
        "{sign}R$ {},{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

/// Formats a volume with a decimal point and 3 decimals, as stored.
///
/// ## Example
/// ```rust
/// use sismad_core::format::format_volume;
/// use sismad_core::volume::Volume;
///
/// assert_eq!(format_volume(Volume::from_dm3(563)), "0.563 m³");
/// assert_eq!(format_volume(Volume::from_dm3(12_050)), "12.050 m³");
/// ```
pub fn format_volume(volume: Volume) -> String {
    let dm3 = volume.dm3();
    let sign = if dm3 < 0 { "-" } else { "" };
    let abs = dm3.unsigned_abs();
    format!("{sign}{}.{:03} m³", abs / 1000, abs % 1000)
}

/// Formats a volume the way printed manifests show it: decimal comma and
/// thousands grouping.
///
/// ## Example
/// ```rust
/// use sismad_core::format::format_volume_br;
/// use sismad_core::volume::Volume;
///
/// assert_eq!(format_volume_br(Volume::from_dm3(1_234_567)), "1.234,567 m³");
/// ```
pub fn format_volume_br(volume: Volume) -> String {
    let dm3 = volume.dm3();
    let sign = if dm3 < 0 { "-" } else { "" };
    let abs = dm3.unsigned_abs();
    format!("{sign}{},{:03} m³", group_thousands(abs / 1000), abs % 1000)
}

/// `dd/mm/yyyy`.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Reads a masked currency field ("R$ 1.234,56", "123456") as centavos.
///
/// Every non-digit is dropped and the remaining digits are cents, which is
/// how the price inputs mask keystrokes. Overlong input saturates.
///
/// ## Example
/// ```rust
/// use sismad_core::format::money_from_digits;
///
/// assert_eq!(money_from_digits("R$ 1.234,56").cents(), 123_456);
/// assert_eq!(money_from_digits("7").cents(), 7);
/// assert_eq!(money_from_digits("").cents(), 0);
/// ```
pub fn money_from_digits(raw: &str) -> Money {
    let cents = raw
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0i64, |acc, d| acc.saturating_mul(10).saturating_add(d as i64));
    Money::from_cents(cents)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1.000");
        assert_eq!(group_thousands(1_000_000), "1.000.000");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Money::from_cents(1099)), "R$ 10,99");
        assert_eq!(format_currency(Money::from_cents(100_000)), "R$ 1.000,00");
        assert_eq!(format_currency(Money::from_cents(-550)), "-R$ 5,50");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(Volume::zero()), "0.000 m³");
        assert_eq!(format_volume(Volume::from_dm3(56)), "0.056 m³");
        assert_eq!(format_volume(Volume::from_dm3(1700)), "1.700 m³");
        assert_eq!(format_volume_br(Volume::from_dm3(196)), "0,196 m³");
    }

    #[test]
    fn test_format_date_br() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_date_br(date), "05/03/2024");
    }

    #[test]
    fn test_money_from_digits_saturates() {
        let money = money_from_digits("99999999999999999999999");
        assert_eq!(money.cents(), i64::MAX);
    }
}
