// tests/encoding_tests.rs

use qrelay::DecodeError;
use qrelay::encoding::{bits_to_text, text_to_bits};

#[test]
fn test_known_vector_hi() {
    assert_eq!(text_to_bits("hi"), "0110100001101001");
    assert_eq!(bits_to_text("0110100001101001").unwrap(), "hi");
}

#[test]
fn test_empty_string_round_trip() {
    assert_eq!(text_to_bits(""), "");
    assert_eq!(bits_to_text("").unwrap(), "");
}

#[test]
fn test_single_byte_is_msb_first() {
    // 'A' = 0x41 = 0b01000001
    assert_eq!(text_to_bits("A"), "01000001");
    // '!' = 0x21 = 0b00100001, leading zeros preserved
    assert_eq!(text_to_bits("!"), "00100001");
}

#[test]
fn test_multibyte_utf8_round_trip() {
    for s in ["héllo", "✓ done", "日本語", "a\u{0301}"] {
        let bits = text_to_bits(s);
        assert_eq!(bits.len() % 8, 0, "whole bytes for {:?}", s);
        assert_eq!(bits_to_text(&bits).unwrap(), s);
    }
}

#[test]
fn test_ragged_length_is_rejected() {
    match bits_to_text("0110100") {
        Err(DecodeError::RaggedLength { length }) => assert_eq!(length, 7),
        other => panic!("expected RaggedLength, got {:?}", other),
    }
    // A full byte followed by a dangling bit fails too.
    assert!(matches!(
        bits_to_text("011010000"),
        Err(DecodeError::RaggedLength { length: 9 })
    ));
}

#[test]
fn test_foreign_symbol_is_rejected_with_position() {
    match bits_to_text("0110x001") {
        Err(DecodeError::InvalidSymbol { position, symbol }) => {
            assert_eq!(position, 4);
            assert_eq!(symbol, 'x');
        }
        other => panic!("expected InvalidSymbol, got {:?}", other),
    }
}

#[test]
fn test_invalid_utf8_is_rejected() {
    // 0xFF is never valid UTF-8.
    assert!(matches!(
        bits_to_text("11111111"),
        Err(DecodeError::InvalidUtf8 { .. })
    ));
}

#[test]
fn test_symbol_check_precedes_length_check() {
    // The foreign symbol is reported as soon as it is reached, before the
    // ragged length could be.
    assert!(matches!(
        bits_to_text("2"),
        Err(DecodeError::InvalidSymbol { position: 0, symbol: '2' })
    ));
}
