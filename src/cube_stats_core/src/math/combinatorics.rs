use thiserror::Error;

/// The largest `n` whose factorial fits in a `u64`.
pub const MAX_FACTORIAL_ARGUMENT: u64 = 20;

const FACT_UNTIL_20: [u64; 21] = {
    let mut arr = [0; 21];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u64;
        i += 1;
    }
    arr
};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatoricsError {
    #[error("Invalid combinatorial arguments n = {n}, r = {r}")]
    InvalidArgument { n: u64, r: u64 },
}

/// Calculate `n!` exactly.
///
/// # Errors
///
/// Returns `InvalidArgument` if `n!` does not fit in a `u64`.
pub fn factorial(n: u64) -> Result<u64, CombinatoricsError> {
    usize::try_from(n)
        .ok()
        .and_then(|i| FACT_UNTIL_20.get(i))
        .copied()
        .ok_or(CombinatoricsError::InvalidArgument { n, r: 0 })
}

/// Calculate the number of ways to choose `r` out of `n` elements.
///
/// # Errors
///
/// Returns `InvalidArgument` if `r > n` or if `n` is out of the supported
/// range.
pub fn choose(n: u64, r: u64) -> Result<u64, CombinatoricsError> {
    if r > n || n > MAX_FACTORIAL_ARGUMENT {
        return Err(CombinatoricsError::InvalidArgument { n, r });
    }
    let r = r.min(n - r);
    // Multiplying before dividing keeps every intermediate value integral
    let mut result = 1;
    for i in 0..r {
        result = result * (n - i) / (i + 1);
    }
    Ok(result)
}

/// Calculate `n * (n - 1) * ... * (n - r + 1)`, the number of ordered
/// selections of `r` out of `n` elements.
///
/// # Errors
///
/// Returns `InvalidArgument` if `r > n` or if `n` is out of the supported
/// range.
pub fn falling_factorial(n: u64, r: u64) -> Result<u64, CombinatoricsError> {
    Ok(choose(n, r)? * factorial(r)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn factorials() {
        assert_eq!(factorial(0), Ok(1));
        assert_eq!(factorial(1), Ok(1));
        assert_eq!(factorial(8), Ok(40_320));
        assert_eq!(factorial(12), Ok(479_001_600));
        assert_eq!(factorial(20), Ok(2_432_902_008_176_640_000));
        assert_eq!(
            factorial(21),
            Err(CombinatoricsError::InvalidArgument { n: 21, r: 0 })
        );
    }

    #[test_log::test]
    fn binomials() {
        assert_eq!(choose(0, 0), Ok(1));
        assert_eq!(choose(8, 0), Ok(1));
        assert_eq!(choose(8, 8), Ok(1));
        assert_eq!(choose(8, 3), Ok(56));
        assert_eq!(choose(12, 6), Ok(924));
        assert_eq!(choose(20, 10), Ok(184_756));
        for n in 0..=12 {
            let row_sum: u64 = (0..=n).map(|r| choose(n, r).unwrap()).sum();
            assert_eq!(row_sum, 1 << n);
        }
    }

    #[test_log::test]
    fn invalid_binomials() {
        assert_eq!(
            choose(3, 4),
            Err(CombinatoricsError::InvalidArgument { n: 3, r: 4 })
        );
        assert!(choose(21, 2).is_err());
    }

    #[test_log::test]
    fn falling_factorials() {
        assert_eq!(falling_factorial(8, 3), Ok(336));
        assert_eq!(falling_factorial(5, 0), Ok(1));
        assert_eq!(falling_factorial(5, 5), Ok(120));
    }
}
