//! Key rotation through `Encryption` and `EncryptionManager`.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use encryption::prelude::*;
use encryption::{DriverEntry, EncryptionConfig};
use serde_json::json;

const K1: &str = "first-rotation-secret-value";
const K2: &str = "second-rotation-secret-value";
const K3: &str = "third-rotation-secret-value!";

#[test]
fn rotating_keys_keeps_old_tokens_readable() {
    for kind in [
        DriverKind::Legacy,
        DriverKind::Aes256Cbc,
        DriverKind::Aes256Gcm,
        DriverKind::ChaCha20Poly1305,
    ] {
        let before = Encryption::with_driver(kind, Some("app"), &[K1]).unwrap();
        let after = Encryption::with_driver(kind, Some("app"), &[K2, K1]).unwrap();
        let retired = Encryption::with_driver(kind, Some("app"), &[K2]).unwrap();

        let old = before.encrypt(&"session", &EncryptOptions::new()).unwrap();
        let new = after.encrypt(&"session", &EncryptOptions::new()).unwrap();

        assert!(after.decrypt_value(&old, None).is_some(), "{kind}");
        assert!(after.decrypt_value(&new, None).is_some(), "{kind}");
        assert!(before.decrypt_value(&new, None).is_none(), "{kind}");
        assert!(retired.decrypt_value(&old, None).is_none(), "{kind}");
        assert!(retired.decrypt_value(&new, None).is_some(), "{kind}");
    }
}

#[test]
fn signatures_rotate_with_the_ring() {
    let before = Encryption::with_driver(DriverKind::Aes256Gcm, Some("app"), &[K1]).unwrap();
    let after = Encryption::with_driver(DriverKind::Aes256Gcm, Some("app"), &[K2, K1]).unwrap();

    let old = before
        .message_verifier()
        .sign(&json!({"user": 1}), &EncryptOptions::new().purpose("email"))
        .unwrap();
    assert_eq!(
        after.message_verifier().unsign_value(&old, Some("email")),
        Some(json!({"user": 1}))
    );

    let new = after.message_verifier().sign(&"x", &EncryptOptions::new()).unwrap();
    assert!(before.message_verifier().unsign_value(&new, None).is_none());
}

#[test]
fn ids_isolate_applications_sharing_a_secret() {
    let nova = Encryption::with_driver(DriverKind::ChaCha20Poly1305, Some("nova"), &[K1]).unwrap();
    let lanz = Encryption::with_driver(DriverKind::ChaCha20Poly1305, Some("lanz"), &[K1]).unwrap();

    let token = nova.encrypt(&"secret", &EncryptOptions::new()).unwrap();
    assert!(token.starts_with("nova."));
    assert_eq!(nova.decrypt::<String>(&token, None).as_deref(), Some("secret"));
    assert!(lanz.decrypt_value(&token, None).is_none());
}

#[test]
fn composed_rings_decrypt_across_drivers() {
    // A ring of rings: new tokens from GCM, old CBC tokens still readable.
    let gcm = Encryption::with_driver(DriverKind::Aes256Gcm, Some("app"), &[K2]).unwrap();
    let cbc = Encryption::with_driver(DriverKind::Aes256Cbc, Some("app"), &[K1]).unwrap();
    let old = cbc.encrypt(&"migrating", &EncryptOptions::new()).unwrap();

    let migrating = Encryption::new(
        |key| {
            let kind = if key == K2 {
                DriverKind::Aes256Gcm
            } else {
                DriverKind::Aes256Cbc
            };
            Encryption::with_driver(kind, Some("app"), &[key])
        },
        &[K2, K1],
    )
    .unwrap();

    assert_eq!(
        migrating.decrypt::<String>(&old, None).as_deref(),
        Some("migrating")
    );
    let fresh = migrating.encrypt(&"new", &EncryptOptions::new()).unwrap();
    assert!(gcm.decrypt_value(&fresh, None).is_some());
    assert!(cbc.decrypt_value(&fresh, None).is_none());
}

fn config(keys: &[&str]) -> EncryptionConfig {
    let mut drivers = HashMap::new();
    drivers.insert(
        "app".to_owned(),
        DriverEntry::new(DriverKind::Aes256Cbc, keys.iter().copied()).with_id("app"),
    );
    drivers.insert(
        "legacy".to_owned(),
        DriverEntry::new(DriverKind::Legacy, keys.iter().copied()),
    );
    EncryptionConfig {
        default: Some("app".into()),
        log_level: "info".into(),
        drivers,
    }
}

#[test]
fn manager_picks_up_rotated_config() {
    let before = EncryptionManager::from_config(&config(&[K1])).unwrap();
    let after = EncryptionManager::from_config(&config(&[K3, K1])).unwrap();

    let token = before.encrypt(&json!([1, 2, 3]), &EncryptOptions::new()).unwrap();
    assert_eq!(
        after.decrypt::<Vec<u32>>(&token, None).unwrap(),
        Some(vec![1, 2, 3])
    );

    let legacy = before.use_driver(Some("legacy")).unwrap();
    let legacy_token = legacy.encrypt(&"legacy", &EncryptOptions::new()).unwrap();
    assert!(after
        .use_driver(Some("legacy"))
        .unwrap()
        .decrypt_value(&legacy_token, None)
        .is_some());
    // Default is the CBC driver, which rejects id-less tokens.
    assert_eq!(after.decrypt::<String>(&legacy_token, None).unwrap(), None);
}

#[test]
fn manager_is_shared_across_threads() {
    let manager = Arc::new(EncryptionManager::from_config(&config(&[K1])).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let token = manager.encrypt(&i, &EncryptOptions::new()).unwrap();
                let ring = manager.use_driver(None).unwrap();
                (token, ring)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let first = &results[0].1;
    for (i, (token, ring)) in results.iter().enumerate() {
        assert!(Arc::ptr_eq(first, ring));
        assert_eq!(manager.decrypt::<usize>(token, None).unwrap(), Some(i));
    }
    assert_eq!(manager.cached(), 1);
}
