use crate::models::user::User;
use rand::Rng;
use rand::seq::SliceRandom;

/// Minimum password length.
pub const MIN_LENGTH: usize = 8;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = br##"!@#$%^&*()_+-=[]{};':"\|,.<>/?"##;

/// Check a candidate password against every complexity rule and collect the
/// violations. Rules are evaluated independently, never short-circuited, so
/// the caller can report the full list. A missing candidate fails the length
/// rule and every character-class rule.
pub fn validate_complexity(candidate: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();

    if candidate.map_or(true, |p| p.chars().count() < MIN_LENGTH) {
        errors.push(format!("Password must be at least {} characters long", MIN_LENGTH));
    }

    if !candidate.is_some_and(|p| p.chars().any(|c| c.is_ascii_uppercase())) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }

    if !candidate.is_some_and(|p| p.chars().any(|c| c.is_ascii_lowercase())) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }

    if !candidate.is_some_and(|p| p.chars().any(|c| c.is_ascii_digit())) {
        errors.push("Password must contain at least one digit".to_string());
    }

    if !candidate.is_some_and(|p| p.chars().any(|c| c.is_ascii() && SPECIAL.contains(&(c as u8)))) {
        errors.push("Password must contain at least one special character".to_string());
    }

    errors
}

/// True when the (already hashed) candidate matches an entry in the user's
/// credential history. Exact match on the stored hash strings; the plaintext
/// is never consulted here.
pub fn is_in_history(user: &User, hashed_candidate: &str) -> bool {
    user.password_history.iter().any(|previous| previous == hashed_candidate)
}

/// Produce a random password that always satisfies [`validate_complexity`]:
/// one character from each class, padded to the minimum length from the
/// union of all classes, then shuffled.
pub fn generate_random_password() -> String {
    let mut rng = rand::thread_rng();

    let mut all = Vec::with_capacity(UPPERCASE.len() + LOWERCASE.len() + DIGITS.len() + SPECIAL.len());
    all.extend_from_slice(UPPERCASE);
    all.extend_from_slice(LOWERCASE);
    all.extend_from_slice(DIGITS);
    all.extend_from_slice(SPECIAL);

    let mut password: Vec<u8> = Vec::with_capacity(MIN_LENGTH);
    for class in [UPPERCASE, LOWERCASE, DIGITS, SPECIAL] {
        password.push(class[rng.gen_range(0..class.len())]);
    }
    while password.len() < MIN_LENGTH {
        password.push(all[rng.gen_range(0..all.len())]);
    }

    password.shuffle(&mut rng);
    password.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_user;
    use proptest::prelude::*;

    #[test]
    fn strong_password_passes_every_rule() {
        assert!(validate_complexity(Some("Str0ng!Pwd")).is_empty());
    }

    #[test]
    fn weak_password_reports_all_failed_rules() {
        // "Weak1" is short and has no special character; the other classes
        // are present, so exactly those two rules must fire.
        let errors = validate_complexity(Some("Weak1"));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("at least 8 characters")));
        assert!(errors.iter().any(|e| e.contains("special character")));
    }

    #[test]
    fn rules_are_checked_independently() {
        let errors = validate_complexity(Some("alllowercase"));
        assert!(errors.iter().any(|e| e.contains("uppercase")));
        assert!(errors.iter().any(|e| e.contains("digit")));
        assert!(errors.iter().any(|e| e.contains("special character")));
        assert!(!errors.iter().any(|e| e.contains("lowercase")));
        assert!(!errors.iter().any(|e| e.contains("characters long")));
    }

    #[test]
    fn missing_candidate_fails_length_and_every_class() {
        let errors = validate_complexity(None);
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn generated_password_always_passes() {
        for _ in 0..256 {
            let password = generate_random_password();
            let errors = validate_complexity(Some(&password));
            assert!(errors.is_empty(), "generated password {:?} failed: {:?}", password, errors);
            assert_eq!(password.chars().count(), MIN_LENGTH);
        }
    }

    #[test]
    fn generation_is_not_deterministic() {
        let a = generate_random_password();
        let b = generate_random_password();
        // 62^8 possibilities; a collision here means the RNG is broken.
        assert_ne!(a, b);
    }

    #[test]
    fn history_match_is_exact_on_hashes() {
        let mut user = test_user("alice");
        user.password_history = vec!["$argon2id$old-1".to_string(), "$argon2id$old-2".to_string()];

        assert!(is_in_history(&user, "$argon2id$old-2"));
        assert!(!is_in_history(&user, "$argon2id$old-3"));
        assert!(!is_in_history(&user, "old-2"));
    }

    #[test]
    fn empty_history_never_matches() {
        let user = test_user("alice");
        assert!(!is_in_history(&user, "$argon2id$anything"));
    }

    #[test]
    fn only_the_retained_history_is_rejected() {
        // Six sequential changes: the first hash is evicted, the remaining
        // five stay rejectable.
        let mut user = test_user("alice");
        for i in 1..=6 {
            user.push_history(format!("$argon2id$hash-{}", i));
        }
        assert!(!is_in_history(&user, "$argon2id$hash-1"));
        for i in 2..=6 {
            assert!(is_in_history(&user, &format!("$argon2id$hash-{}", i)));
        }
    }

    proptest! {
        /// The empty-violation outcome coincides exactly with the conjunction
        /// of the five rules, for arbitrary candidate strings.
        #[test]
        fn violations_empty_iff_all_rules_hold(candidate in ".{0,24}") {
            let errors = validate_complexity(Some(&candidate));
            let ok = candidate.chars().count() >= MIN_LENGTH
                && candidate.chars().any(|c| c.is_ascii_uppercase())
                && candidate.chars().any(|c| c.is_ascii_lowercase())
                && candidate.chars().any(|c| c.is_ascii_digit())
                && candidate.chars().any(|c| c.is_ascii() && SPECIAL.contains(&(c as u8)));
            prop_assert_eq!(errors.is_empty(), ok);
        }
    }
}
