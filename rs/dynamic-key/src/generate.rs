use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{AppCertificate, Error, Fields, Signature, Uid, VERSION, assemble, mask_u32};

/// The `expires_at` value meaning the token never expires.
pub const NEVER_EXPIRES: u32 = 0xFFFF_FFFF;

/// Everything that goes into a token.
///
/// The certificate is borrowed for the duration of [TokenRequest::generate] and never stored.
#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
	pub app_id: &'a str,
	pub app_certificate: &'a AppCertificate,
	pub channel: &'a str,
	pub issued_at: u32,
	pub salt: u32,
	pub uid: u32,
	pub expires_at: u32,
}

impl TokenRequest<'_> {
	pub fn fields(&self) -> Fields {
		Fields {
			issued_at: self.issued_at,
			salt: self.salt,
			uid: self.uid,
			expires_at: self.expires_at,
		}
	}

	pub fn generate(&self) -> Result<String, Error> {
		let fields = self.fields().encode()?;
		let signature = Signature::compute(self.app_id, self.app_certificate, self.channel, &fields);

		tracing::debug!(
			channel = self.channel,
			uid = self.uid,
			expires_at = self.expires_at,
			"generated dynamic key"
		);

		Ok(assemble(
			VERSION,
			&signature.to_string(),
			self.app_id,
			&fields.issued_at,
			&fields.salt,
			&fields.uid,
			&fields.expires_at,
		))
	}
}

/// Generate a token from explicit timestamps.
///
/// `uid` may be any integer type; only the low 32 bits are used.
pub fn generate(
	app_id: &str,
	app_certificate: &AppCertificate,
	channel: &str,
	issued_at: u32,
	salt: u32,
	uid: impl Uid,
	expires_at: u32,
) -> Result<String, Error> {
	TokenRequest {
		app_id,
		app_certificate,
		channel,
		issued_at,
		salt,
		uid: mask_u32(uid),
		expires_at,
	}
	.generate()
}

/// Generate a token issued now and valid for `valid_for`.
///
/// The expiry saturates at [NEVER_EXPIRES].
pub fn generate_for(
	app_id: &str,
	app_certificate: &AppCertificate,
	channel: &str,
	salt: u32,
	uid: impl Uid,
	valid_for: Duration,
) -> Result<String, Error> {
	let issued_at = now()?;
	let expires_at = expires_after(issued_at, valid_for);
	generate(app_id, app_certificate, channel, issued_at, salt, uid, expires_at)
}

/// The current unix time in seconds, truncated to 32 bits.
pub fn now() -> Result<u32, Error> {
	let secs = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|_| Error::Clock)?
		.as_secs();
	Ok(mask_u32(secs))
}

/// `issued_at + valid_for`, saturating at [NEVER_EXPIRES].
pub fn expires_after(issued_at: u32, valid_for: Duration) -> u32 {
	let secs = u32::try_from(valid_for.as_secs()).unwrap_or(u32::MAX);
	issued_at.saturating_add(secs)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Token;

	const ISSUED_AT: u32 = 1_000_000_000;
	const EXPIRES_AT: u32 = 1_000_003_600;

	fn token(uid: impl Uid) -> String {
		generate("A", &"secret".into(), "c", ISSUED_AT, 0, uid, EXPIRES_AT).unwrap()
	}

	#[test]
	fn test_known_answer() {
		assert_eq!(
			token(0),
			"003c08b1597307b2804d76bdcc28211c814d9ac9423e2578b709551abf2f22ac497A10000000000000000000000000001000003600"
		);
		assert_eq!(
			token(42),
			"003aea5b9bfe48d33ffd4df4e93cd31cf0e3f4896ba373078d0178c530eec024d9fA10000000000000000000000000421000003600"
		);
	}

	#[test]
	fn test_known_answer_long_app_id() {
		let token = generate(
			"970ca35de60c44645bbae8a215061b33",
			&"5cfd2fd1755d40ecb72977518be15d3b".into(),
			"7d72365eb983485397e3e3f9d460bdda",
			1_446_455_472,
			58_964_981,
			2_882_341_273u64,
			1_446_455_471,
		)
		.unwrap();

		assert_eq!(
			token,
			"0039f992dfff0c6f22121c1f79b28b5e8ed40da706667d7d8666306d365363fb162970ca35de60c44645bbae8a215061b3314464554720383bbf528823412731446455471"
		);
	}

	#[test]
	fn test_deterministic() {
		assert_eq!(token(0), token(0));
		assert_eq!(token(0).len(), 3 + 64 + 1 + 10 + 8 + 10 + 10);
	}

	#[test]
	fn test_uid_masked() {
		assert_eq!(token(42u64), token(42u64 + (1 << 32)));
		assert_eq!(token(-1i64), token(u32::MAX));
		assert_eq!(token(42usize), token(42u32));
		assert_eq!(token(-1isize), token(u32::MAX));
		assert_eq!(token(42u128 + (1 << 32)), token(42u8));
	}

	#[test]
	fn test_sensitivity() {
		let cert = AppCertificate::from("secret");
		let base = TokenRequest {
			app_id: "A",
			app_certificate: &cert,
			channel: "c",
			issued_at: ISSUED_AT,
			salt: 0,
			uid: 0,
			expires_at: EXPIRES_AT,
		};
		let other_cert = AppCertificate::from("secret2");

		let signature = |req: TokenRequest| req.generate().unwrap()[3..67].to_string();
		let original = signature(base);

		let variants = [
			TokenRequest { channel: "d", ..base },
			TokenRequest { issued_at: ISSUED_AT + 1, ..base },
			TokenRequest { salt: 1, ..base },
			TokenRequest { uid: 1, ..base },
			TokenRequest { expires_at: EXPIRES_AT + 1, ..base },
			TokenRequest {
				app_certificate: &other_cert,
				..base
			},
		];

		for variant in variants {
			assert_ne!(signature(variant), original, "{variant:?}");
		}
	}

	#[test]
	fn test_concurrent() {
		let expected = token(42);
		std::thread::scope(|s| {
			let handles: Vec<_> = (0..8).map(|_| s.spawn(|| token(42))).collect();
			for handle in handles {
				assert_eq!(handle.join().unwrap(), expected);
			}
		});
	}

	#[test]
	fn test_format() {
		let token = generate("my-app", &"".into(), "room", 0, u32::MAX, 0, NEVER_EXPIRES).unwrap();
		assert_eq!(token.len(), 3 + 64 + "my-app".len() + 38);
		assert!(token.starts_with(VERSION));
		assert!(token.ends_with("0000000000ffffffff00000000004294967295"));

		let decoded: Token = token.parse().unwrap();
		assert_eq!(decoded.app_id, "my-app");
		assert!(decoded.never_expires());
		decoded.verify(&"".into(), "room", u64::MAX).unwrap();
	}

	#[test]
	fn test_generate_for() {
		let cert = AppCertificate::from("secret");
		let before = now().unwrap();
		let token: Token = generate_for("A", &cert, "c", 7, 9, Duration::from_secs(3600))
			.unwrap()
			.parse()
			.unwrap();

		assert!(token.fields.issued_at >= before);
		assert_eq!(token.fields.expires_at, token.fields.issued_at + 3600);
		assert_eq!(token.fields.salt, 7);
		assert_eq!(token.fields.uid, 9);
		token.verify(&cert, "c", token.fields.issued_at.into()).unwrap();
	}

	#[test]
	fn test_expires_after_saturates() {
		assert_eq!(expires_after(10, Duration::from_secs(5)), 15);
		assert_eq!(expires_after(u32::MAX - 1, Duration::from_secs(5)), NEVER_EXPIRES);
		assert_eq!(expires_after(10, Duration::MAX), NEVER_EXPIRES);
	}
}
