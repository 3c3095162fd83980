use std::ops::Mul;

use crate::quantity::{cost::Cost, rate::KilowattHourRate};

quantity!(KilowattHours, "kWh");

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn test_mul_rate() {
        let cost = KilowattHours::from(10.0) * KilowattHourRate::from(0.25);
        assert_abs_diff_eq!(cost.0, 2.5);
    }
}
