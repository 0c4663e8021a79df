use std::{fmt, str::FromStr};

use aws_lc_rs::hmac;

use crate::{AppCertificate, DecodeError, EncodedFields, Error};

/// Length of the HMAC-SHA256 digest in bytes.
pub const SIGNATURE_LEN: usize = 32;

/// Length of the hex encoded digest.
pub const SIGNATURE_HEX_LEN: usize = SIGNATURE_LEN * 2;

/// HMAC-SHA256 over the app id, channel, and encoded fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
	/// Sign the fields with the app certificate as the key.
	pub fn compute(app_id: &str, cert: &AppCertificate, channel: &str, fields: &EncodedFields) -> Self {
		let key = hmac::Key::new(hmac::HMAC_SHA256, cert.expose());
		let tag = hmac::sign(&key, &message(app_id, channel, fields));

		let mut digest = [0u8; SIGNATURE_LEN];
		digest.copy_from_slice(tag.as_ref());
		Self(digest)
	}

	/// Recompute the signature and compare in constant time.
	pub fn verify(
		&self,
		app_id: &str,
		cert: &AppCertificate,
		channel: &str,
		fields: &EncodedFields,
	) -> Result<(), Error> {
		let key = hmac::Key::new(hmac::HMAC_SHA256, cert.expose());
		hmac::verify(&key, &message(app_id, channel, fields), &self.0).map_err(|_| Error::InvalidSignature)
	}
}

// The field order here is part of the protocol.
fn message(app_id: &str, channel: &str, fields: &EncodedFields) -> Vec<u8> {
	let parts = [
		app_id.as_bytes(),
		fields.issued_at.as_bytes(),
		fields.salt.as_bytes(),
		channel.as_bytes(),
		fields.uid.as_bytes(),
		fields.expires_at.as_bytes(),
	];

	let mut buf = Vec::with_capacity(parts.iter().map(|p| p.len()).sum());
	for part in parts {
		buf.extend_from_slice(part);
	}
	buf
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&hex::encode(self.0))
	}
}

impl fmt::Debug for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Signature({self})")
	}
}

impl FromStr for Signature {
	type Err = DecodeError;

	/// Only the canonical lowercase form is accepted.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.len() != SIGNATURE_HEX_LEN || s.bytes().any(|b| b.is_ascii_uppercase()) {
			return Err(DecodeError::SignatureHex);
		}

		let mut digest = [0u8; SIGNATURE_LEN];
		hex::decode_to_slice(s, &mut digest).map_err(|_| DecodeError::SignatureHex)?;
		Ok(Self(digest))
	}
}
