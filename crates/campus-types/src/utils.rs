//! Utility functions

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;

/// Random url-safe token (32 bytes of entropy), used for email verification
pub fn random_url_token() -> String {
	let mut bytes = [0u8; 32];
	rand::rng().fill_bytes(&mut bytes);
	URL_SAFE_NO_PAD.encode(bytes)
}

/// Room join code: 4 random bytes as upper-case hex
pub fn random_join_code() -> String {
	let mut bytes = [0u8; 4];
	rand::rng().fill_bytes(&mut bytes);
	bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Integer percentage, ties rounded to even, 0 when `total` is 0
pub fn percentage(part: u32, total: u32) -> u32 {
	if total == 0 {
		return 0;
	}
	(f64::from(part) / f64::from(total) * 100.0).round_ties_even() as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_join_code_format() {
		let code = random_join_code();
		assert_eq!(code.len(), 8);
		assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
	}

	#[test]
	fn test_url_token_is_url_safe() {
		let token = random_url_token();
		assert_eq!(token.len(), 43);
		assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
		assert_ne!(token, random_url_token());
	}

	#[test]
	fn test_percentage() {
		assert_eq!(percentage(0, 0), 0);
		assert_eq!(percentage(1, 3), 33);
		assert_eq!(percentage(2, 3), 67);
		assert_eq!(percentage(5, 5), 100);
		// ties go to the even neighbour
		assert_eq!(percentage(1, 8), 12);
		assert_eq!(percentage(5, 8), 62);
		assert_eq!(percentage(7, 8), 88);
	}
}

// vim: ts=4
