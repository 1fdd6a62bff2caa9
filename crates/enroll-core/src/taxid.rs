//! Tax Id Validation
//!
//! Checksum validation for Brazilian tax identifiers: CPF (11 digits,
//! individuals) and CNPJ (14 digits, entities). Both use a two-pass weighted
//! modulo-11 digit check over the base digits.

/// Strip punctuation and validate a CPF or CNPJ by length.
///
/// Returns the normalized digit string on success.
pub fn normalize_and_validate(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let valid = match digits.len() {
        11 => is_valid_cpf(&digits),
        14 => is_valid_cnpj(&digits),
        _ => false,
    };
    valid.then_some(digits)
}

fn digit_values(digits: &str) -> Vec<u32> {
    digits.chars().filter_map(|c| c.to_digit(10)).collect()
}

fn all_same(values: &[u32]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Weighted mod-11 check digit: 0 when the remainder is below 2
fn check_digit(values: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    let remainder = sum % 11;
    if remainder < 2 { 0 } else { 11 - remainder }
}

fn is_valid_cpf(digits: &str) -> bool {
    let values = digit_values(digits);
    if values.len() != 11 || all_same(&values) {
        return false;
    }

    let first = check_digit(&values[..9], &[10, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&values[..10], &[11, 10, 9, 8, 7, 6, 5, 4, 3, 2]);

    values[9] == first && values[10] == second
}

fn is_valid_cnpj(digits: &str) -> bool {
    let values = digit_values(digits);
    if values.len() != 14 || all_same(&values) {
        return false;
    }

    let first = check_digit(&values[..12], &[5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);
    let second = check_digit(&values[..13], &[6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2]);

    values[12] == first && values[13] == second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_cpf() {
        assert_eq!(
            normalize_and_validate("529.982.247-25"),
            Some("52998224725".into())
        );
        assert_eq!(
            normalize_and_validate("52998224725"),
            Some("52998224725".into())
        );
    }

    #[test]
    fn rejects_bad_cpf_check_digit() {
        assert!(normalize_and_validate("52998224724").is_none());
    }

    #[test]
    fn rejects_repeated_digit_cpf() {
        assert!(normalize_and_validate("111.111.111-11").is_none());
    }

    #[test]
    fn accepts_valid_cnpj() {
        assert_eq!(
            normalize_and_validate("11.222.333/0001-81"),
            Some("11222333000181".into())
        );
    }

    #[test]
    fn rejects_bad_cnpj_check_digit() {
        assert!(normalize_and_validate("11.222.333/0001-80").is_none());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(normalize_and_validate("1234567").is_none());
        assert!(normalize_and_validate("").is_none());
    }
}
