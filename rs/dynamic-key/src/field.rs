use std::fmt;

use crate::{DecodeError, EncodeError};

/// Width of the decimal timestamp fields.
pub const TIMESTAMP_WIDTH: usize = 10;

/// Width of the hex salt field.
pub const SALT_WIDTH: usize = 8;

/// Width of the decimal user id field.
pub const UID_WIDTH: usize = 10;

/// Combined width of every encoded field in a token.
pub const FIELDS_WIDTH: usize = TIMESTAMP_WIDTH + SALT_WIDTH + UID_WIDTH + TIMESTAMP_WIDTH;

/// The base a field is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
	Decimal,
	/// Lowercase hexadecimal.
	Hex,
}

impl Radix {
	fn format(self, value: u64, width: usize) -> String {
		match self {
			Self::Decimal => format!("{value:0width$}"),
			Self::Hex => format!("{value:0width$x}"),
		}
	}

	fn parse(self, text: &str) -> Option<u64> {
		let valid = match self {
			Self::Decimal => text.bytes().all(|b| b.is_ascii_digit()),
			Self::Hex => text.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')),
		};

		if !valid || text.is_empty() {
			return None;
		}

		let radix = match self {
			Self::Decimal => 10,
			Self::Hex => 16,
		};

		u64::from_str_radix(text, radix).ok()
	}
}

/// A number rendered at a fixed width, left-padded with `0`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedField(String);

impl EncodedField {
	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn as_bytes(&self) -> &[u8] {
		self.0.as_bytes()
	}
}

impl fmt::Display for EncodedField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for EncodedField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Render `value` in `radix` as exactly `width` characters.
///
/// Returns [EncodeError::Overflow] instead of truncating when the value has more digits than `width`.
pub fn encode(value: u64, radix: Radix, width: usize) -> Result<EncodedField, EncodeError> {
	let text = radix.format(value, width);
	if text.len() != width {
		return Err(EncodeError::Overflow { value, width });
	}

	Ok(EncodedField(text))
}

/// Any primitive integer accepted as a user id.
///
/// Only the low 32 bits are kept, using two's complement for negative values.
pub trait Uid: sealed::Sealed {
	fn low_u32(self) -> u32;
}

mod sealed {
	pub trait Sealed {}
}

macro_rules! impl_uid {
	($($ty:ty),*) => {
		$(
			impl sealed::Sealed for $ty {}

			impl Uid for $ty {
				fn low_u32(self) -> u32 {
					self as u32
				}
			}
		)*
	};
}

impl_uid!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Keep the low 32 bits of any integer.
pub fn mask_u32(value: impl Uid) -> u32 {
	value.low_u32()
}

/// The four numeric fields of a token, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fields {
	pub issued_at: u32,
	pub salt: u32,
	pub uid: u32,
	pub expires_at: u32,
}

/// [Fields] rendered at their canonical widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFields {
	pub issued_at: EncodedField,
	pub salt: EncodedField,
	pub uid: EncodedField,
	pub expires_at: EncodedField,
}

impl Fields {
	pub fn encode(&self) -> Result<EncodedFields, EncodeError> {
		Ok(EncodedFields {
			issued_at: encode(self.issued_at.into(), Radix::Decimal, TIMESTAMP_WIDTH)?,
			salt: encode(self.salt.into(), Radix::Hex, SALT_WIDTH)?,
			uid: encode(self.uid.into(), Radix::Decimal, UID_WIDTH)?,
			expires_at: encode(self.expires_at.into(), Radix::Decimal, TIMESTAMP_WIDTH)?,
		})
	}

	/// Parse the trailing [FIELDS_WIDTH] characters of a token.
	pub fn parse(text: &str) -> Result<Self, DecodeError> {
		if text.len() != FIELDS_WIDTH || !text.is_ascii() {
			return Err(DecodeError::Field {
				field: "fields",
				value: text.to_string(),
			});
		}

		let (issued_at, rest) = text.split_at(TIMESTAMP_WIDTH);
		let (salt, rest) = rest.split_at(SALT_WIDTH);
		let (uid, expires_at) = rest.split_at(UID_WIDTH);

		Ok(Self {
			issued_at: parse_u32("issued_at", issued_at, Radix::Decimal)?,
			salt: parse_u32("salt", salt, Radix::Hex)?,
			uid: parse_u32("uid", uid, Radix::Decimal)?,
			expires_at: parse_u32("expires_at", expires_at, Radix::Decimal)?,
		})
	}
}

fn parse_u32(field: &'static str, text: &str, radix: Radix) -> Result<u32, DecodeError> {
	radix
		.parse(text)
		.and_then(|value| u32::try_from(value).ok())
		.ok_or_else(|| DecodeError::Field {
			field,
			value: text.to_string(),
		})
}
