use std::fs;

use libsql_tenancy::StorageError;
use libsql_tenancy::key_store::{self, TenantKeyRecord};

#[test]
fn test02_round_trip_sizes() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let large: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8).collect();

    for payload in [Vec::new(), vec![0x7f], large] {
        let path = dir.path().join(format!("len-{}.bin", payload.len()));
        key_store::write(&path, &payload)?;
        assert_eq!(key_store::read(&path)?, payload);
        assert_eq!(fs::metadata(&path)?.len(), payload.len() as u64 + 4);
    }
    Ok(())
}

#[test]
fn test02_truncated_payload_is_corrupt() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tenant.bin");
    key_store::write(&path, b"{\"token\":\"t\",\"url\":\"libsql://x\"}")?;

    let raw = fs::read(&path)?;
    fs::write(&path, &raw[..10])?;

    match key_store::read(&path) {
        Err(StorageError::Corrupt {
            declared,
            available,
            ..
        }) => {
            assert_eq!(declared, raw.len() as u64 - 4);
            assert_eq!(available, 6);
        }
        other => panic!("expected corrupt, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test02_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nobody.bin");
    assert!(matches!(
        key_store::read(&path),
        Err(StorageError::NotFound { .. })
    ));
    assert!(matches!(
        key_store::read_record(&path),
        Err(StorageError::NotFound { .. })
    ));
    assert!(!key_store::exists(&path));
}

#[test]
fn test02_rewrite_replaces_previous_record() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tenant.bin");

    key_store::write(&path, &[b'x'; 512])?;
    let record = TenantKeyRecord::new("jwt", "libsql://tenant-acme.turso.io");
    key_store::write_record(&path, &record)?;

    assert_eq!(key_store::read_record(&path)?, record);
    let expected_len = serde_json::to_vec(&record)?.len() as u64 + 4;
    assert_eq!(fs::metadata(&path)?.len(), expected_len);
    Ok(())
}

#[test]
fn test02_reads_files_written_without_this_crate() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("legacy.bin");
    let json = br#"{"token":"legacy-jwt","url":"libsql://legacy-acme.turso.io"}"#;
    let mut raw = (json.len() as u32).to_le_bytes().to_vec();
    raw.extend_from_slice(json);
    fs::write(&path, raw)?;

    let record = key_store::read_record(&path)?;
    assert_eq!(record.token, "legacy-jwt");
    assert_eq!(record.url, "libsql://legacy-acme.turso.io");
    Ok(())
}

#[test]
fn test02_non_record_payload_fails_to_decode() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("garbage.bin");
    key_store::write(&path, b"not json")?;
    assert!(matches!(
        key_store::read_record(&path),
        Err(StorageError::Decode { .. })
    ));

    key_store::remove(&path)?;
    assert!(matches!(
        key_store::remove(&path),
        Err(StorageError::NotFound { .. })
    ));
    Ok(())
}
