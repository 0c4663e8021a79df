/// A field could not be rendered at its fixed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
	#[error("value {value} needs more than {width} digits")]
	Overflow { value: u64, width: usize },
}

/// A token string could not be split back into its fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
	#[error("unsupported version: {0:?}")]
	Version(String),

	#[error("token too short: {0} bytes")]
	Short(usize),

	#[error("invalid signature hex")]
	SignatureHex,

	#[error("invalid {field}: {value:?}")]
	Field { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("encode error: {0}")]
	Encode(#[from] EncodeError),

	#[error("decode error: {0}")]
	Decode(#[from] DecodeError),

	#[error("invalid signature")]
	InvalidSignature,

	#[error("token expired at {0}")]
	Expired(u32),

	#[error("system clock is before the unix epoch")]
	Clock,
}
