// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use relay_core::BuildCommand;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single framed message.
pub const MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum WireError {
    /// The payload does not describe a command tree. Fatal: no part of the
    /// job may run.
    #[error("malformed command tree: {0}")]
    MalformedTree(#[source] serde_json::Error),

    #[error("failed to encode command tree: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("message of {0} bytes exceeds limit of {MAX_MESSAGE_LEN}")]
    MessageTooLarge(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn encode(command: &BuildCommand) -> Result<String, WireError> {
    serde_json::to_string(command).map_err(WireError::Encode)
}

pub fn decode(text: &str) -> Result<BuildCommand, WireError> {
    serde_json::from_str(text).map_err(WireError::MalformedTree)
}

pub fn encode_bytes(command: &BuildCommand) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(command).map_err(WireError::Encode)
}

pub fn decode_bytes(bytes: &[u8]) -> Result<BuildCommand, WireError> {
    serde_json::from_slice(bytes).map_err(WireError::MalformedTree)
}

/// Write one length-prefixed frame.
pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_MESSAGE_LEN {
        return Err(WireError::MessageTooLarge(payload.len()));
    }
    let len = u32::try_from(payload.len()).map_err(|_| WireError::MessageTooLarge(payload.len()))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one length-prefixed frame.
pub async fn read_message<R>(reader: &mut R) -> Result<Vec<u8>, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await?;
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_MESSAGE_LEN {
        return Err(WireError::MessageTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

pub async fn write_command<W>(writer: &mut W, command: &BuildCommand) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    let payload = encode_bytes(command)?;
    write_message(writer, &payload).await
}

pub async fn read_command<R>(reader: &mut R) -> Result<BuildCommand, WireError>
where
    R: AsyncRead + Unpin,
{
    let payload = read_message(reader).await?;
    decode_bytes(&payload)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
