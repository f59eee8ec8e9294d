/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

// src/payload.rs
use crate::errors::PayloadError;

// decode_payload turns a raw broker payload into JSON: it must be
// non-empty, valid UTF-8 and parse as JSON.
pub fn decode_payload(bytes: &[u8]) -> Result<serde_json::Value, PayloadError> {
    if bytes.is_empty() {
        return Err(PayloadError::Empty);
    }
    let text = std::str::from_utf8(bytes)?;
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        let err = decode_payload(b"").unwrap_err();
        assert!(matches!(err, PayloadError::Empty));
        assert_eq!(err.to_string(), "Empty payload received from MQTT");
    }

    #[test]
    fn test_unparsable_payload() {
        let err = decode_payload(b"{not json").unwrap_err();
        assert!(matches!(err, PayloadError::Parse(_)));
        assert!(err.to_string().starts_with("Error parsing JSON payload: "));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = decode_payload(&[0x7b, 0xff, 0x7d]).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidUtf8(_)));
    }

    #[test]
    fn test_valid_payload() {
        assert_eq!(
            decode_payload(br#"{"a":1}"#).unwrap(),
            serde_json::json!({"a": 1})
        );
    }
}
