//! Single-line text form of a saved world, suitable for clipboard transfer.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use robot_arena_world::{persistence, query, PersistenceError, World};

const TRANSFER_DOMAIN: &str = "arena";
const TRANSFER_VERSION: &str = "v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("transfer string was empty")]
    EmptyPayload,
    /// A segment was missing from the transfer string.
    #[error("transfer string is missing the {0}")]
    MissingField(&'static str),
    /// The transfer string used an unexpected prefix segment.
    #[error("transfer prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The transfer string used an unsupported version identifier.
    #[error("transfer version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The dimensions segment could not be parsed.
    #[error("could not parse arena dimensions '{0}'")]
    InvalidDimensions(String),
    /// The dimensions segment disagrees with the embedded world.
    #[error("dimensions {declared} do not match the embedded {actual} arena")]
    DimensionMismatch {
        /// Dimensions written in the header.
        declared: String,
        /// Dimensions stored in the payload.
        actual: String,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode transfer payload")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload did not hold a valid world.
    #[error("could not load transferred world")]
    InvalidWorld(#[source] PersistenceError),
}

/// Encodes the world as `arena:v1:<width>x<height>:<base64>`.
pub(crate) fn encode(world: &World) -> Result<String, PersistenceError> {
    let bytes = persistence::encode(world)?;
    let config = query::config(world);
    Ok(format!(
        "{TRANSFER_DOMAIN}:{TRANSFER_VERSION}:{}:{}",
        dimensions(config.width(), config.height()),
        STANDARD_NO_PAD.encode(bytes)
    ))
}

/// Decodes a world from its transfer string.
pub(crate) fn decode(value: &str) -> Result<World, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingField("prefix"))?;
    let version = parts.next().ok_or(TransferError::MissingField("version"))?;
    let declared = parts
        .next()
        .ok_or(TransferError::MissingField("dimensions"))?;
    let payload = parts.next().ok_or(TransferError::MissingField("payload"))?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }
    let (width, height) = parse_dimensions(declared)?;

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    let world = persistence::decode(&bytes).map_err(TransferError::InvalidWorld)?;

    let config = query::config(&world);
    if config.width() != width || config.height() != height {
        return Err(TransferError::DimensionMismatch {
            declared: declared.to_owned(),
            actual: dimensions(config.width(), config.height()),
        });
    }
    Ok(world)
}

fn dimensions(width: f64, height: f64) -> String {
    format!("{width}x{height}")
}

fn parse_dimensions(value: &str) -> Result<(f64, f64), TransferError> {
    let invalid = || TransferError::InvalidDimensions(value.to_owned());
    let (width, height) = value.split_once(['x', 'X']).ok_or_else(invalid)?;
    let width = width.trim().parse::<f64>().map_err(|_| invalid())?;
    let height = height.trim().parse::<f64>().map_err(|_| invalid())?;
    if !(width > 0.0 && height > 0.0) {
        return Err(invalid());
    }
    Ok((width, height))
}
