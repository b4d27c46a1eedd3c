//! Fixed-point formatting of token amounts.
//!
//! Amounts stay `U256` in the token's smallest unit until they are printed.
//! Printing goes through `alloy_primitives::utils::format_units` and is then
//! trimmed to the usual `formatUnits` shape: at least one fractional digit,
//! trailing zeros dropped (`2000000` at 6 decimals → `"2.0"`).

use alloy_primitives::utils;
use alloy_primitives::U256;
use rust_decimal::Decimal;

/// Render `amount` as a decimal string with `decimals` fractional digits.
///
/// Precisions alloy cannot represent (above 77) fall back to the raw integer.
pub fn format_units(amount: U256, decimals: u32) -> String {
    let full = u8::try_from(decimals)
        .map_err(|_| utils::UnitsError::InvalidUnit(decimals.to_string()))
        .and_then(|units| utils::format_units(amount, units));
    match full {
        Ok(full) => trim_fraction(&full, decimals == 0),
        Err(e) => {
            tracing::warn!(%amount, decimals, error = %e, "amount left unscaled");
            amount.to_string()
        }
    }
}

/// The fee on `amount` (at `decimals` precision) for `rate`, as a decimal
/// string.
pub fn fee_amount(amount: U256, decimals: u32, rate: Decimal) -> String {
    let formatted = format_units(amount, decimals);
    // A product that had to be rounded is not exact; take the integer path.
    let product = Decimal::from_str_exact(&formatted)
        .ok()
        .and_then(|value| {
            value
                .checked_mul(rate)
                .filter(|fee| fee.scale() == value.scale() + rate.scale())
        });
    match product {
        Some(fee) => {
            let text = fee.normalize().to_string();
            if text.contains('.') {
                text
            } else {
                format!("{text}.0")
            }
        }
        // Beyond 96-bit mantissas: scale the raw amount by the rate's digits.
        None => {
            let mantissa = U256::from(rate.mantissa().unsigned_abs());
            format_units(amount.saturating_mul(mantissa), decimals + rate.scale())
        }
    }
}

fn trim_fraction(full: &str, integer_only: bool) -> String {
    let Some((whole, frac)) = full.split_once('.') else {
        return full.to_string();
    };
    let frac = frac.trim_end_matches('0');
    if integer_only {
        whole.to_string()
    } else if frac.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{frac}")
    }
}
