use std::fmt::{self, Display};

pub const KG_PER_LB: f64 = 2.204_62;

/// Converts kilograms to pounds, rounded to two decimal places.
#[must_use]
pub fn kg_to_lb(kg: f64) -> f64 {
    round_to_hundredths(kg * KG_PER_LB)
}

/// Converts pounds to kilograms, rounded to two decimal places.
#[must_use]
pub fn lb_to_kg(lb: f64) -> f64 {
    round_to_hundredths(lb / KG_PER_LB)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                WeightUnit::Kg => "kg",
                WeightUnit::Lb => "lb",
            }
        )
    }
}
