use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Referral IDs look like `LK-<base36 millis>-<random>`, uppercased.
pub fn generate_referral_id() -> String {
    let timestamp = to_base36(Utc::now().timestamp_millis() as u64);
    let random: String = Uuid::new_v4().simple().to_string().chars().take(5).collect();
    format!("LK-{}-{}", timestamp, random).to_uppercase()
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Trim whitespace and strip angle brackets from user-supplied text.
pub fn sanitize_string(input: &str) -> String {
    input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plausible_emails() {
        assert!(is_valid_email("sarah@example.com"));
        assert!(is_valid_email("miguel.rodriguez@mail.co.uk"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn referral_ids_have_the_expected_shape() {
        let id = generate_referral_id();
        assert!(id.starts_with("LK-"));
        assert_eq!(id, id.to_uppercase());
        assert_eq!(id.matches('-').count(), 2);
    }

    #[test]
    fn referral_ids_are_unique_enough() {
        let a = generate_referral_id();
        let b = generate_referral_id();
        assert_ne!(a, b);
    }

    #[test]
    fn base36_round_numbers() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn sanitize_strips_brackets_and_trims() {
        assert_eq!(sanitize_string("  hola <script> "), "hola script");
    }
}
