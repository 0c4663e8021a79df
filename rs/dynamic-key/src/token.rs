use std::{fmt, str::FromStr};

use crate::{
	AppCertificate, DecodeError, EncodedField, Error, FIELDS_WIDTH, Fields, NEVER_EXPIRES, SALT_WIDTH,
	SIGNATURE_HEX_LEN, Signature, TIMESTAMP_WIDTH, UID_WIDTH,
};

/// The protocol version prefix.
pub const VERSION: &str = "003";

/// Concatenate the already encoded parts in wire order.
pub fn assemble(
	version: &str,
	signature: &str,
	app_id: &str,
	issued_at: &EncodedField,
	salt: &EncodedField,
	uid: &EncodedField,
	expires_at: &EncodedField,
) -> String {
	let mut token = String::with_capacity(version.len() + signature.len() + app_id.len() + FIELDS_WIDTH);
	for part in [
		version,
		signature,
		app_id,
		issued_at.as_str(),
		salt.as_str(),
		uid.as_str(),
		expires_at.as_str(),
	] {
		token.push_str(part);
	}
	token
}

/// A decoded dynamic key.
///
/// The channel name is not part of the token; the verifier has to supply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub signature: Signature,
	pub app_id: String,
	pub fields: Fields,
}

impl Token {
	/// Check the signature, then the expiry against `now` (unix seconds).
	pub fn verify(&self, cert: &AppCertificate, channel: &str, now: u64) -> Result<(), Error> {
		let encoded = self.fields.encode()?;
		self.signature.verify(&self.app_id, cert, channel, &encoded)?;

		let expires_at = self.fields.expires_at;
		if expires_at != NEVER_EXPIRES && now > u64::from(expires_at) {
			return Err(Error::Expired(expires_at));
		}

		Ok(())
	}

	pub fn never_expires(&self) -> bool {
		self.fields.expires_at == NEVER_EXPIRES
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Fields {
			issued_at,
			salt,
			uid,
			expires_at,
		} = self.fields;

		write!(
			f,
			"{VERSION}{}{}{issued_at:0ts$}{salt:0sw$x}{uid:0uw$}{expires_at:0ts$}",
			self.signature,
			self.app_id,
			ts = TIMESTAMP_WIDTH,
			sw = SALT_WIDTH,
			uw = UID_WIDTH,
		)
	}
}

impl FromStr for Token {
	type Err = DecodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let version = s.get(..VERSION.len()).unwrap_or(s);
		if version != VERSION {
			return Err(DecodeError::Version(version.to_string()));
		}

		let min = VERSION.len() + SIGNATURE_HEX_LEN + FIELDS_WIDTH;
		if s.len() < min {
			return Err(DecodeError::Short(s.len()));
		}

		let body = &s[VERSION.len()..];
		let signature = body.get(..SIGNATURE_HEX_LEN).ok_or(DecodeError::SignatureHex)?;
		let signature = signature.parse()?;

		let split = s.len() - FIELDS_WIDTH;
		let (app_id, fields) = match (s.get(VERSION.len() + SIGNATURE_HEX_LEN..split), s.get(split..)) {
			(Some(app_id), Some(fields)) => (app_id, fields),
			_ => {
				return Err(DecodeError::Field {
					field: "app_id",
					value: s.to_string(),
				});
			}
		};

		Ok(Self {
			signature,
			app_id: app_id.to_string(),
			fields: Fields::parse(fields)?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOKEN: &str =
		"003c08b1597307b2804d76bdcc28211c814d9ac9423e2578b709551abf2f22ac497A10000000000000000000000000001000003600";

	#[test]
	fn test_assemble() {
		let fields = Fields {
			issued_at: 1_000_000_000,
			salt: 0,
			uid: 0,
			expires_at: 1_000_003_600,
		}
		.encode()
		.unwrap();

		let token = assemble(
			VERSION,
			"c08b1597307b2804d76bdcc28211c814d9ac9423e2578b709551abf2f22ac497",
			"A",
			&fields.issued_at,
			&fields.salt,
			&fields.uid,
			&fields.expires_at,
		);
		assert_eq!(token, TOKEN);
	}

	#[test]
	fn test_decode() {
		let token: Token = TOKEN.parse().unwrap();
		assert_eq!(token.app_id, "A");
		assert_eq!(token.fields.issued_at, 1_000_000_000);
		assert_eq!(token.fields.salt, 0);
		assert_eq!(token.fields.uid, 0);
		assert_eq!(token.fields.expires_at, 1_000_003_600);
		assert_eq!(token.to_string(), TOKEN);
		assert!(!token.never_expires());
	}

	#[test]
	fn test_decode_empty_app_id() {
		let text = TOKEN.replacen('A', "", 1);
		let token: Token = text.parse().unwrap();
		assert_eq!(token.app_id, "");
	}

	#[test]
	fn test_decode_errors() {
		assert_eq!("004".parse::<Token>(), Err(DecodeError::Version("004".to_string())));
		assert_eq!("00".parse::<Token>(), Err(DecodeError::Version("00".to_string())));
		assert_eq!("003abc".parse::<Token>(), Err(DecodeError::Short(6)));

		let bad_hex = TOKEN.replacen("c08b", "zzzz", 1);
		assert_eq!(bad_hex.parse::<Token>(), Err(DecodeError::SignatureHex));

		let bad_field = format!("{}x", &TOKEN[..TOKEN.len() - 1]);
		assert!(matches!(bad_field.parse::<Token>(), Err(DecodeError::Field { .. })));
	}

	#[test]
	fn test_display_extremes() {
		let mut token: Token = TOKEN.parse().unwrap();
		token.fields = Fields {
			issued_at: 0,
			salt: u32::MAX,
			uid: u32::MAX,
			expires_at: NEVER_EXPIRES,
		};

		let text = token.to_string();
		assert_eq!(text.len(), TOKEN.len());
		assert!(text.ends_with("0000000000ffffffff42949672954294967295"));

		let encoded = token.fields.encode().unwrap();
		let assembled = assemble(
			VERSION,
			&token.signature.to_string(),
			&token.app_id,
			&encoded.issued_at,
			&encoded.salt,
			&encoded.uid,
			&encoded.expires_at,
		);
		assert_eq!(text, assembled);
		assert_eq!(text.parse::<Token>().unwrap(), token);
	}

	#[test]
	fn test_verify() {
		let token: Token = TOKEN.parse().unwrap();
		let cert = AppCertificate::from("secret");

		token.verify(&cert, "c", 1_000_000_000).unwrap();
		token.verify(&cert, "c", 1_000_003_600).unwrap();
		assert_eq!(token.verify(&cert, "c", 1_000_003_601), Err(Error::Expired(1_000_003_600)));
		assert_eq!(token.verify(&cert, "other", 1_000_000_000), Err(Error::InvalidSignature));
	}

	#[test]
	fn test_verify_tampered() {
		let mut token: Token = TOKEN.parse().unwrap();
		token.fields.uid = 1;
		assert_eq!(
			token.verify(&"secret".into(), "c", 1_000_000_000),
			Err(Error::InvalidSignature)
		);
	}
}
