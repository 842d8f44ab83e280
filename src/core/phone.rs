use regex::Regex;
use std::sync::LazyLock;

/// Mobile operator codes accepted after the `+380` country prefix.
pub const OPERATOR_CODES: [&str; 15] = [
    "39", "50", "63", "66", "67", "68", "73", "91", "92", "93", "95", "96", "97", "98", "99",
];

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^\+380(?:{})(\d{{7}})$", OPERATOR_CODES.join("|"));
    Regex::new(&pattern).expect("phone pattern is a valid regex")
});

/// 驗證烏克蘭手機號碼：+380 + 電信代碼 + 7 位數字，且後 7 碼不可為同一數字重複。
pub fn is_valid_phone(phone: &str) -> bool {
    let Some(caps) = PHONE_PATTERN.captures(phone) else {
        return false;
    };
    let subscriber = caps[1].as_bytes();
    !subscriber.iter().all(|digit| *digit == subscriber[0])
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneValidator;

impl PhoneValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn is_valid(&self, phone: &str) -> bool {
        is_valid_phone(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert!(is_valid_phone("+380501234567"));
        assert!(is_valid_phone("+380391000000"));
        for code in OPERATOR_CODES {
            assert!(is_valid_phone(&format!("+380{}7654321", code)), "code {}", code);
        }
    }

    #[test]
    fn test_repeated_suffix_is_invalid() {
        assert!(!is_valid_phone("+380501111111"));
        for d in 0..=9 {
            let suffix = d.to_string().repeat(7);
            assert!(!is_valid_phone(&format!("+38067{}", suffix)));
        }
    }

    #[test]
    fn test_pattern_mismatches() {
        assert!(!is_valid_phone("+380001234567"));
        assert!(!is_valid_phone("380501234567"));
        assert!(!is_valid_phone("+38050123456"));
        assert!(!is_valid_phone("+3805012345678"));
        assert!(!is_valid_phone(" +380501234567"));
        assert!(!is_valid_phone("+380 50 123 45 67"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_validator_struct_delegates() {
        let validator = PhoneValidator::new();
        assert!(validator.is_valid("+380931234567"));
        assert!(!validator.is_valid("+380940000001"));
    }
}
