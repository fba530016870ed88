// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ (Variable-Length Quantity) codec for source map mappings.
//!
//! Every value is stored as sign-magnitude: the lowest bit of the first digit
//! is the sign, and each Base64 digit carries 5 payload bits plus a
//! continuation bit.

use crate::error::{Result, SourceMapError};

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u64 = 0b011111;
const VLQ_CONTINUATION_BIT: u64 = 0b100000;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Result<u64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as u64)
		.ok_or(SourceMapError::InvalidVlqChar(ch as char))
}

/// Encode a 6-bit value as its Base64 character.
fn encode_char(digit: u64) -> Result<char> {
	usize::try_from(digit)
		.ok()
		.and_then(|idx| BASE64_CHARS.get(idx))
		.map(|&c| c as char)
		.ok_or(SourceMapError::VlqDigitOutOfRange(digit))
}

/// Decode a VLQ-encoded segment into a vector of signed integers.
///
/// Each segment represents one or more values:
/// - Minimum 1 value: generated column offset
/// - Optional 4 more values: source index, original line, original column, name index
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i32>> {
	let mut values = Vec::new();
	let mut bytes = segment.bytes().peekable();

	while bytes.peek().is_some() {
		values.push(decode_value(&mut bytes, segment)?);
	}

	Ok(values)
}

fn decode_value(bytes: &mut impl Iterator<Item = u8>, segment: &str) -> Result<i32> {
	let mut value = 0u64;
	let mut shift = 0u32;

	loop {
		let ch = bytes
			.next()
			.ok_or_else(|| SourceMapError::TruncatedVlq(segment.to_string()))?;
		let digit = decode_char(ch)?;

		value |= (digit & VLQ_BASE_MASK) << shift;
		shift += VLQ_BASE_SHIFT;

		if digit & VLQ_CONTINUATION_BIT == 0 {
			break;
		}
		if shift >= 32 {
			return Err(SourceMapError::VlqOverflow(segment.to_string()));
		}
	}

	// The lowest bit indicates the sign: 1 = negative, 0 = positive
	let magnitude = (value >> 1) as i64;
	let signed = if value & 1 != 0 { -magnitude } else { magnitude };

	i32::try_from(signed).map_err(|_| SourceMapError::VlqOverflow(segment.to_string()))
}

/// Append the VLQ encoding of `value` to `out`.
pub fn encode_vlq(value: i32, out: &mut String) -> Result<()> {
	let widened = i64::from(value);
	let mut vlq = if widened < 0 {
		((-widened) << 1) as u64 | 1
	} else {
		(widened << 1) as u64
	};

	loop {
		let mut digit = vlq & VLQ_BASE_MASK;
		vlq >>= VLQ_BASE_SHIFT;
		if vlq > 0 {
			digit |= VLQ_CONTINUATION_BIT;
		}
		out.push(encode_char(digit)?);

		if vlq == 0 {
			return Ok(());
		}
	}
}

/// Encode a sequence of values as a single VLQ segment.
pub fn encode_vlq_segment(values: &[i32]) -> Result<String> {
	let mut out = String::new();
	for &value in values {
		encode_vlq(value, &mut out)?;
	}
	Ok(out)
}
