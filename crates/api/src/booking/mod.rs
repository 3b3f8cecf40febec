//! Booking core: the reservation engine, the booking lifecycle and slot
//! schedule planning. Everything here takes a pool and runs its own
//! transaction; authorization beyond booking ownership is the caller's job.

pub mod lifecycle;
pub mod reservation;
pub mod schedule;

pub use lifecycle::{cancel, complete, confirm, Actor};
pub use reservation::{reserve, ReserveParams};

/// Convert a stored cent amount into currency units.
pub fn cents_to_amount(cents: i32) -> f64 {
    f64::from(cents) / 100.0
}

/// Convert currency units into cents, rounding to the nearest cent.
pub fn amount_to_cents(amount: f64) -> Option<i32> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let cents = (amount * 100.0).round();
    if cents > f64::from(i32::MAX) {
        return None;
    }
    Some(cents as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_conversions() {
        assert_eq!(cents_to_amount(4500), 45.0);
        assert_eq!(amount_to_cents(45.0), Some(4500));
        assert_eq!(amount_to_cents(19.999), Some(2000));
        assert_eq!(amount_to_cents(-1.0), None);
        assert_eq!(amount_to_cents(f64::NAN), None);
    }
}
