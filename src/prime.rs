#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primality {
    NeitherPrimeNorComposite,
    Prime,
    Composite,
}

impl Primality {
    pub(crate) fn from_divisor_count(n: i64, count: u32) -> Self {
        if n == 1 {
            Primality::NeitherPrimeNorComposite
        } else if count == 0 {
            Primality::Prime
        } else {
            Primality::Composite
        }
    }
}

/// Counts the divisors of `n` strictly between 1 and `n`. The scan covers
/// the whole range; the caller only ever asks whether the count is zero, so
/// stopping at the square root would work too, but this mirrors the divisor
/// scan the VM demo runs.
pub(crate) fn divisor_count(n: i64) -> u32 {
    (2..n).filter(|i| n % i == 0).count() as u32
}

pub(crate) fn classify(n: i64) -> Primality {
    Primality::from_divisor_count(n, divisor_count(n))
}

pub(crate) fn sentence(n: i64, primality: Primality) -> String {
    match primality {
        Primality::NeitherPrimeNorComposite => format!("{n} is neither prime nor composite."),
        Primality::Prime => format!("{n} is a prime number."),
        Primality::Composite => format!("{n} is not a prime number."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(n: i64) -> String {
        sentence(n, classify(n))
    }

    #[test]
    fn the_original_value() {
        // divisors 2, 3, 5, 6, 10, 15
        assert_eq!(divisor_count(30), 6);
        assert_eq!(report(30), "30 is not a prime number.");
    }

    #[test]
    fn one_is_special() {
        assert_eq!(report(1), "1 is neither prime nor composite.");
    }

    #[test]
    fn two_has_an_empty_scan_range() {
        assert_eq!(divisor_count(2), 0);
        assert_eq!(report(2), "2 is a prime number.");
    }

    #[test]
    fn small_primes_and_composites() {
        assert_eq!(report(7), "7 is a prime number.");
        assert_eq!(report(9), "9 is not a prime number.");
    }

    #[test]
    fn nonpositive_values_fall_through_the_empty_range() {
        // nothing special-cases these; the scan is empty and they read as prime
        assert_eq!(report(0), "0 is a prime number.");
        assert_eq!(report(-7), "-7 is a prime number.");
    }
}
