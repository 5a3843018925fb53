//! Redondeo de métricas
//!
//! Los montos se redondean con `Decimal`; las magnitudes físicas y los
//! porcentajes de conteo son `f64`.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Redondeo monetario a 2 decimales
pub fn money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

/// Redondeo de un `f64` a `dp` decimales
pub fn round_f64(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Porcentaje `part / whole * 100` con 1 decimal, 0 si `whole` es 0
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_f64(part as f64 / whole as f64 * 100.0, 1)
}

/// Suma de montos que satura en `Decimal::MAX` en vez de desbordar
pub fn money_sum<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .fold(Decimal::ZERO, |total, value| total.saturating_add(value))
}

/// Monto por unidad física (`amount / units`) con 2 decimales, 0 sin unidades
///
/// Si `units` no es representable como `Decimal` el cociente se hace en `f64`.
pub fn per_unit(amount: Decimal, units: f64) -> Decimal {
    if !units.is_finite() || units <= 0.0 {
        return Decimal::ZERO;
    }
    let exact = Decimal::from_f64(units)
        .filter(|divisor| !divisor.is_zero())
        .and_then(|divisor| amount.checked_div(divisor));
    match exact {
        Some(value) => money(value),
        None => amount
            .to_f64()
            .map(|a| round_f64(a / units, 2))
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::MAX),
    }
}

/// Porcentaje `part / whole * 100` en `Decimal` con 2 decimales
///
/// 0 si `whole` es 0; satura en `Decimal::MAX`/`MIN` si no cabe.
pub fn decimal_percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    match part
        .checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(value) => money(value),
        None if part.is_sign_negative() != whole.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}
