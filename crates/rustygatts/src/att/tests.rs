//! Unit tests for the attribute store and prepared-write buffer

use super::*;
use crate::gatt::Uuid;

#[test]
fn test_error_code_conversion() {
    assert_eq!(AttErrorCode::from(0x00), AttErrorCode::NoError);
    assert_eq!(AttErrorCode::from(0x07), AttErrorCode::InvalidOffset);
    assert_eq!(AttErrorCode::from(0x0D), AttErrorCode::InvalidAttributeValueLength);
    assert_eq!(AttErrorCode::from(0x85), AttErrorCode::ApplicationError(0x85));
    assert_eq!(AttErrorCode::from(0xFD), AttErrorCode::CommonProfileError(0xFD));
    assert_eq!(AttErrorCode::from(0x30), AttErrorCode::Unknown(0x30));

    let raw: u8 = AttErrorCode::Unlikely.into();
    assert_eq!(raw, ATT_ERROR_UNLIKELY);
    assert!(AttErrorCode::NoError.is_success());
    assert!(!AttErrorCode::Unlikely.is_success());
}

#[test]
fn test_store_insert_read_write() {
    let mut store = AttributeStore::new();
    store
        .insert(42, Uuid::from_u16(0xFF01), vec![0x11, 0x22, 0x33], 8)
        .unwrap();

    assert_eq!(store.value(42).unwrap(), &[0x11, 0x22, 0x33]);
    assert_eq!(store.read(42, 1).unwrap(), vec![0x22, 0x33]);
    assert_eq!(store.read(42, 3).unwrap(), Vec::<u8>::new());
    assert_eq!(
        store.read(42, 4),
        Err(AttError::InvalidOffset {
            handle: 42,
            offset: 4
        })
    );

    store.write(42, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(store.value(42).unwrap().len(), 8);

    // Too long: the committed value stays as it was
    let err = store.write(42, &[0; 9]).unwrap_err();
    assert_eq!(err.to_error_code(), AttErrorCode::InvalidAttributeValueLength);
    assert_eq!(store.value(42).unwrap(), &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn test_store_fixed_length_attribute() {
    let mut store = AttributeStore::new();
    store.insert_fixed(43, Uuid::from_u16(CLIENT_CHAR_CONFIG_UUID), vec![0, 0]).unwrap();

    store.write(43, &[0x01, 0x00]).unwrap();
    assert_eq!(
        store.write(43, &[0x02]),
        Err(AttError::InvalidAttributeValueLength { len: 1, max: 2 })
    );
    assert!(store.write(43, &[0x02, 0x00, 0x00]).is_err());
    assert_eq!(store.value(43).unwrap(), &[0x01, 0x00]);
}

#[test]
fn test_store_rejects_uncreated_and_duplicate_handles() {
    let mut store = AttributeStore::new();
    assert_eq!(store.value(7), Err(AttError::UncreatedHandle(7)));
    assert_eq!(store.write(7, &[1]), Err(AttError::UncreatedHandle(7)));
    assert_eq!(
        AttError::UncreatedHandle(7).to_error_code(),
        AttErrorCode::Unlikely
    );

    store.insert(7, Uuid::from_u16(0x2902), vec![0, 0], 2).unwrap();
    assert_eq!(
        store.insert(7, Uuid::from_u16(0xFF01), vec![], 8),
        Err(AttError::AttributeExists {
            handle: 7,
            existing: Uuid::from_u16(0x2902)
        })
    );
    assert_eq!(store.value(7).unwrap(), &[0, 0]);
    assert_eq!(store.len(), 1);

    store.clear();
    assert!(store.is_empty());
}

#[test]
fn test_prepared_fragments_concatenate_in_arrival_order() {
    let mut state = PrepareState::default();
    assert!(state.is_idle());

    state.prepare(42, 0, b"hello ", 16).unwrap();
    state.prepare(42, 6, b"long ", 16).unwrap();
    state.prepare(42, 11, b"write", 16).unwrap();
    assert_eq!(state.buffered_len(), 16);

    let (handle, value) = state.execute(true).unwrap();
    assert_eq!(handle, 42);
    assert_eq!(value, b"hello long write".to_vec());
    assert!(state.is_idle());
}

#[test]
fn test_prepared_cancel_discards() {
    let mut state = PrepareState::default();
    state.prepare(42, 0, &[1, 2, 3], 16).unwrap();

    assert_eq!(state.execute(false), None);
    assert!(state.is_idle());

    // A new run starts from an empty buffer
    state.prepare(42, 0, &[9], 16).unwrap();
    assert_eq!(state.execute(true), Some((42, vec![9])));
}

#[test]
fn test_prepared_overflow_poisons_run() {
    let mut state = PrepareState::default();
    state.prepare(42, 0, &[0xAA; 6], 8).unwrap();

    let err = state.prepare(42, 6, &[0xBB; 3], 8).unwrap_err();
    assert_eq!(err.to_error_code(), AttErrorCode::InvalidAttributeValueLength);
    assert_eq!(state.buffered_len(), 0);

    // A later fragment that would fit is still refused
    let err = state.prepare(42, 0, &[0xCC], 8).unwrap_err();
    assert_eq!(err.to_error_code(), AttErrorCode::InvalidAttributeValueLength);

    // Commit applies nothing and resets the state
    assert_eq!(state.execute(true), None);
    assert!(state.is_idle());
}

#[test]
fn test_prepared_offset_beyond_capacity() {
    let mut state = PrepareState::default();
    let err = state.prepare(42, 9, &[1], 8).unwrap_err();
    assert_eq!(err.to_error_code(), AttErrorCode::InvalidOffset);
    assert_eq!(state, PrepareState::Rejected(AttErrorCode::InvalidOffset));
}

#[test]
fn test_prepared_release() {
    let mut state = PrepareState::default();
    state.prepare(42, 0, &[1, 2, 3, 4], 16).unwrap();
    assert_eq!(state.release(), 4);
    assert!(state.is_idle());
    assert_eq!(state.release(), 0);
}

#[test]
fn test_buffer_append_bounds() {
    let mut buffer = PreparedWriteBuffer::new(3, 4);
    buffer.append(&[1, 2]).unwrap();
    buffer.append(&[3, 4]).unwrap();
    assert!(buffer.append(&[5]).is_err());
    assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
    assert_eq!(buffer.capacity(), 4);
}
