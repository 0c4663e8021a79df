use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The app certificate used as the HMAC key.
///
/// The bytes are wiped on drop and never printed; [fmt::Debug] shows a placeholder.
/// It has no `Display` or `Serialize` implementation.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AppCertificate(Vec<u8>);

impl AppCertificate {
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(bytes.into())
	}

	pub fn expose(&self) -> &[u8] {
		&self.0
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<&str> for AppCertificate {
	fn from(value: &str) -> Self {
		Self::new(value.as_bytes())
	}
}

impl From<String> for AppCertificate {
	fn from(value: String) -> Self {
		Self::new(value.into_bytes())
	}
}

impl fmt::Debug for AppCertificate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("AppCertificate(<redacted>)")
	}
}

impl<'de> Deserialize<'de> for AppCertificate {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self::from)
	}
}
