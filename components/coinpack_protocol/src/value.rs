use std::error;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use num_bigint::BigUint;

/// A non-negative output value in the minor units of a chain.
///
/// Values are arbitrary-precision: some chains have minor-unit totals that exceed the range
/// of a 64-bit integer, so `Amount` never truncates. Negative values cannot be represented.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigUint);

impl Amount {
    /// Returns a zero-valued Amount.
    pub fn zero() -> Self {
        Amount(BigUint::default())
    }

    /// Creates an Amount from a u64.
    pub fn from_u64(amount: u64) -> Self {
        Amount(BigUint::from(amount))
    }

    /// Creates an Amount from a u128.
    pub fn from_u128(amount: u128) -> Self {
        Amount(BigUint::from(amount))
    }

    /// Creates an Amount from an i64.
    ///
    /// Returns an error if the amount is negative.
    pub fn from_nonnegative_i64(amount: i64) -> Result<Self, ValueError> {
        u64::try_from(amount)
            .map(Amount::from_u64)
            .map_err(|_| ValueError::Negative)
    }

    /// Reads an Amount from a signed 64-bit little-endian integer, as used by the
    /// transaction wire format.
    ///
    /// Returns an error if the amount is negative.
    pub fn from_nonnegative_i64_le_bytes(bytes: [u8; 8]) -> Result<Self, ValueError> {
        Amount::from_nonnegative_i64(i64::from_le_bytes(bytes))
    }

    /// Parses the minimal big-endian magnitude produced by [`Amount::to_be_bytes`].
    ///
    /// Returns an error if the encoding has a leading zero byte; zero itself is encoded as
    /// the empty byte string.
    pub fn from_be_bytes(bytes: &[u8]) -> Result<Self, ValueError> {
        match bytes.first() {
            Some(0) => Err(ValueError::NonCanonical),
            _ => Ok(Amount(BigUint::from_bytes_be(bytes))),
        }
    }

    /// Returns the minimal big-endian magnitude of this Amount.
    ///
    /// Zero is encoded as the empty byte string.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        if self.is_zero() {
            vec![]
        } else {
            self.0.to_bytes_be()
        }
    }

    /// Returns `true` if `self` is zero.
    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    /// Returns the value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        u64::try_from(&self.0).ok()
    }

    /// Returns a reference to the underlying arbitrary-precision integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<u64> for Amount {
    fn from(amount: u64) -> Self {
        Amount::from_u64(amount)
    }
}

impl From<BigUint> for Amount {
    fn from(amount: BigUint) -> Self {
        Amount(amount)
    }
}

impl From<Amount> for BigUint {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = ValueError;

    fn try_from(value: i64) -> Result<Self, ValueError> {
        Amount::from_nonnegative_i64(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for Amount {
    type Err = ValueError;

    /// Parses a decimal string of minor units.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('-') {
            return Err(ValueError::Negative);
        }
        BigUint::from_str(s)
            .map(Amount)
            .map_err(|_| ValueError::InvalidDecimal)
    }
}

impl Add<&Amount> for Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(self.0 + &rhs.0)
    }
}

impl Add<Amount> for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

impl Sum<Amount> for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::zero(), |acc, a| acc + a)
    }
}

/// A type for value-related errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// The value was negative.
    Negative,
    /// The big-endian encoding of the value was not minimal.
    NonCanonical,
    /// The string was not a decimal integer.
    InvalidDecimal,
}

impl error::Error for ValueError {}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            ValueError::Negative => write!(f, "Output value is negative"),
            ValueError::NonCanonical => {
                write!(f, "Output value encoding has a leading zero byte")
            }
            ValueError::InvalidDecimal => write!(f, "Output value is not a decimal integer"),
        }
    }
}

#[cfg(any(test, feature = "test-dependencies"))]
pub mod testing {
    use proptest::prelude::*;

    use super::Amount;

    prop_compose! {
        /// Values within the range of the 64-bit wire encoding.
        pub fn arb_wire_amount()(amt in 0u64..=(i64::MAX as u64)) -> Amount {
            Amount::from_u64(amt)
        }
    }

    prop_compose! {
        /// Values across the full 128-bit range, including values no 64-bit integer holds.
        pub fn arb_amount()(amt in any::<u128>()) -> Amount {
            Amount::from_u128(amt)
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    use super::{testing::arb_amount, Amount, ValueError};

    #[test]
    fn amount_in_range() {
        let zero = b"\x00\x00\x00\x00\x00\x00\x00\x00";
        assert_eq!(
            Amount::from_nonnegative_i64_le_bytes(*zero).unwrap(),
            Amount::zero()
        );

        let max = b"\xff\xff\xff\xff\xff\xff\xff\x7f";
        assert_eq!(
            Amount::from_nonnegative_i64_le_bytes(*max).unwrap(),
            Amount::from_u64(i64::MAX as u64)
        );

        let neg_one = b"\xff\xff\xff\xff\xff\xff\xff\xff";
        assert_eq!(
            Amount::from_nonnegative_i64_le_bytes(*neg_one),
            Err(ValueError::Negative)
        );
        assert_eq!(Amount::try_from(-1i64), Err(ValueError::Negative));
    }

    #[test]
    fn be_bytes() {
        assert_eq!(Amount::zero().to_be_bytes(), Vec::<u8>::new());
        assert_eq!(Amount::from_be_bytes(&[]), Ok(Amount::zero()));
        assert_eq!(
            Amount::from_u64(2000000000).to_be_bytes(),
            vec![0x77, 0x35, 0x94, 0x00]
        );
        assert_eq!(Amount::from_u64(2146993).to_be_bytes(), vec![0x20, 0xc2, 0xb1]);
        assert_matches!(
            Amount::from_be_bytes(&[0x00, 0x20, 0xc2, 0xb1]),
            Err(ValueError::NonCanonical)
        );
    }

    #[test]
    fn beyond_64_bits() {
        let big = Amount::from_u128(u128::from(u64::MAX) + 1);
        assert_eq!(big.to_u64(), None);
        assert_eq!(big.to_be_bytes(), vec![1, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(big.to_string(), "18446744073709551616");
        assert_eq!("18446744073709551616".parse::<Amount>(), Ok(big));
    }

    #[test]
    fn parse_decimal() {
        assert_eq!("0".parse::<Amount>(), Ok(Amount::zero()));
        assert_eq!("-5".parse::<Amount>(), Err(ValueError::Negative));
        assert_eq!("12ab".parse::<Amount>(), Err(ValueError::InvalidDecimal));
    }

    #[test]
    fn sum() {
        let values = [Amount::from_u64(2000000000), Amount::from_u64(2146993)];
        assert_eq!(values.iter().sum::<Amount>(), Amount::from_u64(2002146993));
    }

    proptest! {
        #[test]
        fn be_bytes_are_minimal(amount in arb_amount()) {
            let encoded = amount.to_be_bytes();
            prop_assert!(encoded.first() != Some(&0));
            prop_assert_eq!(Amount::from_be_bytes(&encoded), Ok(amount));
        }
    }
}
