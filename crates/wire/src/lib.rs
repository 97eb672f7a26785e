// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport encoding for build command trees.
//!
//! Payload: self-describing JSON. Stream framing: 4-byte length prefix
//! (big-endian) + payload.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod wire;

pub use wire::{
    decode, decode_bytes, encode, encode_bytes, read_command, read_message, write_command,
    write_message, WireError, MAX_MESSAGE_LEN,
};
