use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Sub},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------        Won          ---------------------------------------------------------
/// An amount of money in the smallest currency unit. Freight costs are always whole numbers.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Won(i64);

op!(binary Won, Add, add);
op!(binary Won, Sub, sub);
op!(inplace Won, AddAssign, add_assign);

impl Mul<i64> for Won {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Won {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in won: {0}")]
pub struct WonConversionError(String);

impl From<i64> for Won {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<u64> for Won {
    type Error = WonConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map(Self)
            .map_err(|_| WonConversionError(format!("Value {value} is too large to convert to Won")))
    }
}

impl Display for Won {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Thousands separators, e.g. 1,250,000₩
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(c);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{sign}{grouped}₩")
    }
}

impl Won {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds `rhs`, returning `None` if the sum cannot be represented.
    pub fn checked_add(self, rhs: Won) -> Option<Won> {
        self.0.checked_add(rhs.0).map(Self)
    }
}
