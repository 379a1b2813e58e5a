//! Loan payment calculator
//!
//! Closed-form amortizing payment over a fixed per-currency rate table,
//! plus the clamped input state the calculator widget works with.

use serde::{Deserialize, Serialize};

use crate::models::Currency;

pub const MIN_AMOUNT: i64 = 1_000;
pub const MAX_AMOUNT: i64 = 100_000;
pub const AMOUNT_STEP: i64 = 500;
pub const MIN_DURATION_MONTHS: u32 = 6;
pub const MAX_DURATION_MONTHS: u32 = 60;

/// Nominal annual interest rate per currency
pub fn annual_rate(currency: Currency) -> f64 {
    match currency {
        Currency::Eur => 0.045,
        Currency::Usd => 0.052,
        Currency::Gbp => 0.048,
        Currency::Chf => 0.035,
        Currency::Jpy => 0.025,
    }
}

/// Result of a payment calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQuote {
    pub monthly_payment: f64,
    pub total_payback: f64,
}

/// Monthly payment for `principal` over `term_months` in `currency`.
///
/// Range is not re-checked here; callers clamp their inputs.
pub fn compute_monthly_payment(principal: f64, term_months: u32, currency: Currency) -> PaymentQuote {
    compute_with_rate(principal, term_months, annual_rate(currency))
}

/// Same formula for an arbitrary nominal annual rate
pub fn compute_with_rate(principal: f64, term_months: u32, annual_rate: f64) -> PaymentQuote {
    let n = term_months as f64;
    let i = annual_rate / 12.0;

    let monthly_payment = if i == 0.0 {
        principal / n
    } else {
        // P·i / (1 - (1+i)^-n), equal to P·i·(1+i)^n / ((1+i)^n - 1) without overflow
        principal * i / (1.0 - (1.0 + i).powf(-n))
    };

    PaymentQuote {
        monthly_payment,
        total_payback: monthly_payment * n,
    }
}

/// Calculator input state. Values handed to the application wizard come
/// from here, so they are always within the slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorSelection {
    amount: i64,
    duration: u32,
    currency: Currency,
}

impl Default for CalculatorSelection {
    fn default() -> Self {
        Self {
            amount: 10_000,
            duration: 24,
            currency: Currency::Eur,
        }
    }
}

impl CalculatorSelection {
    pub fn new(amount: i64, duration: u32, currency: Currency) -> Self {
        let mut selection = Self {
            amount: MIN_AMOUNT,
            duration: MIN_DURATION_MONTHS,
            currency,
        };
        selection.set_amount(amount);
        selection.set_duration(duration);
        selection
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Clamp to the slider range and snap to the nearest step
    pub fn set_amount(&mut self, amount: i64) {
        let clamped = amount.clamp(MIN_AMOUNT, MAX_AMOUNT);
        let steps = (clamped - MIN_AMOUNT + AMOUNT_STEP / 2) / AMOUNT_STEP;
        self.amount = (MIN_AMOUNT + steps * AMOUNT_STEP).min(MAX_AMOUNT);
    }

    pub fn set_duration(&mut self, months: u32) {
        self.duration = months.clamp(MIN_DURATION_MONTHS, MAX_DURATION_MONTHS);
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    pub fn quote(&self) -> PaymentQuote {
        compute_monthly_payment(self.amount as f64, self.duration, self.currency)
    }
}

/// Display an amount the way the calculator shows it: whole units,
/// thousands separators, currency symbol in front.
pub fn format_money(value: f64, currency: Currency) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let symbol = match currency {
        Currency::Eur => "€",
        Currency::Usd => "$",
        Currency::Gbp => "£",
        Currency::Chf => "CHF ",
        Currency::Jpy => "¥",
    };

    if negative {
        format!("-{}{}", symbol, grouped)
    } else {
        format!("{}{}", symbol, grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_known_eur_payment() {
        // 10k over 24 months at 4.5%
        let quote = compute_monthly_payment(10_000.0, 24, Currency::Eur);
        assert!((quote.monthly_payment - 436.48).abs() < 0.01);
        assert!(close(quote.total_payback, quote.monthly_payment * 24.0));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let quote = compute_with_rate(12_000.0, 24, 0.0);
        assert_eq!(quote.monthly_payment, 500.0);
        assert_eq!(quote.total_payback, 12_000.0);
    }

    #[test]
    fn test_payback_exceeds_principal_with_interest() {
        for currency in Currency::ALL {
            let quote = compute_monthly_payment(50_000.0, 36, currency);
            assert!(quote.total_payback > 50_000.0);
        }
    }

    #[test]
    fn test_selection_clamps_and_snaps() {
        let selection = CalculatorSelection::new(250, 2, Currency::Usd);
        assert_eq!(selection.amount(), MIN_AMOUNT);
        assert_eq!(selection.duration(), MIN_DURATION_MONTHS);

        let selection = CalculatorSelection::new(1_000_000, 120, Currency::Usd);
        assert_eq!(selection.amount(), MAX_AMOUNT);
        assert_eq!(selection.duration(), MAX_DURATION_MONTHS);

        let mut selection = CalculatorSelection::default();
        selection.set_amount(10_260);
        assert_eq!(selection.amount(), 10_500);
        selection.set_amount(10_240);
        assert_eq!(selection.amount(), 10_000);
    }

    #[test]
    fn test_selection_defaults() {
        let selection = CalculatorSelection::default();
        assert_eq!(selection.amount(), 10_000);
        assert_eq!(selection.duration(), 24);
        assert_eq!(selection.currency(), Currency::Eur);
        assert_eq!(
            selection.quote(),
            compute_monthly_payment(10_000.0, 24, Currency::Eur)
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(10_000.0, Currency::Eur), "€10,000");
        assert_eq!(format_money(436.48, Currency::Usd), "$436");
        assert_eq!(format_money(999.5, Currency::Gbp), "£1,000");
        assert_eq!(format_money(1_234_567.0, Currency::Chf), "CHF 1,234,567");
        assert_eq!(format_money(100.0, Currency::Jpy), "¥100");
        assert_eq!(format_money(0.0, Currency::Eur), "€0");
    }

    #[test]
    fn test_very_long_term_stays_positive() {
        let quote = compute_monthly_payment(10_000.0, u32::MAX, Currency::Eur);
        assert!(quote.monthly_payment.is_finite());
        assert!(quote.monthly_payment > 0.0);
        assert!(close(quote.monthly_payment, 10_000.0 * 0.045 / 12.0));
    }
}
