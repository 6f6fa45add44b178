//! Behaviour every driver shares, run against each construction.

use encryption::drivers::{Aes256Cbc, Aes256Gcm, ChaCha20Poly1305, Legacy};
use encryption::prelude::*;
use encryption::{Driver, DriverConfig, EncryptionError};
use serde_json::{json, Value};

const SECRET: &str = "averylongradom32charactersstring";

const ALL: [DriverKind; 4] = [
    DriverKind::Legacy,
    DriverKind::Aes256Cbc,
    DriverKind::Aes256Gcm,
    DriverKind::ChaCha20Poly1305,
];

fn driver(kind: DriverKind) -> Driver {
    Driver::new(kind, &DriverConfig::new([SECRET]).with_id("lanz")).unwrap()
}

fn field_count(kind: DriverKind) -> usize {
    if kind.requires_id() {
        4
    } else {
        3
    }
}

#[test]
fn rejects_short_and_missing_keys() {
    for kind in ALL {
        assert!(
            matches!(
                Driver::new(kind, &DriverConfig::new(["hello-world"]).with_id("lanz")),
                Err(EncryptionError::InsecureKey)
            ),
            "{kind}"
        );
        assert!(
            matches!(
                Driver::new(kind, &DriverConfig::default().with_id("lanz")),
                Err(EncryptionError::MissingKey)
            ),
            "{kind}"
        );
    }
}

#[test]
fn round_trips_every_json_shape() {
    let payloads = [
        json!("hello-world"),
        json!({"username": "lanz", "roles": ["admin"], "age": 22}),
        json!([1, "two", {"three": 3}]),
        json!(42),
        json!(1.5),
        json!(true),
        json!(false),
        json!(0),
        json!(""),
        json!("2024-01-01T00:00:00.000Z"),
    ];
    for kind in ALL {
        let d = driver(kind);
        for payload in &payloads {
            let token = d.encrypt(payload, &EncryptOptions::new()).unwrap();
            assert_eq!(token.split('.').count(), field_count(kind), "{kind}");
            assert_eq!(d.decrypt::<Value>(&token, None).as_ref(), Some(payload), "{kind}");
        }
    }
}

#[test]
fn null_payload_is_rejected() {
    for kind in ALL {
        assert!(
            matches!(
                driver(kind).encrypt(&Value::Null, &EncryptOptions::new()),
                Err(EncryptionError::InvalidPayload(_))
            ),
            "{kind}"
        );
    }
}

#[test]
fn tokens_are_url_safe_and_randomized() {
    for kind in ALL {
        let d = driver(kind);
        let a = d.encrypt(&"same", &EncryptOptions::new()).unwrap();
        let b = d.encrypt(&"same", &EncryptOptions::new()).unwrap();
        assert_ne!(a, b, "{kind}");
        assert!(
            a.bytes()
                .all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b'.'),
            "{kind}: {a}"
        );
    }
}

#[test]
fn purpose_must_match_exactly() {
    for kind in ALL {
        let d = driver(kind);
        let login = d
            .encrypt(&"v", &EncryptOptions::new().purpose("login"))
            .unwrap();
        let plain = d.encrypt(&"v", &EncryptOptions::new()).unwrap();

        assert_eq!(d.decrypt::<String>(&login, Some("login")).as_deref(), Some("v"));
        assert!(d.decrypt_value(&login, None).is_none(), "{kind}");
        assert!(d.decrypt_value(&login, Some("register")).is_none(), "{kind}");
        assert!(d.decrypt_value(&plain, Some("login")).is_none(), "{kind}");
        assert!(d.decrypt_value(&plain, None).is_some(), "{kind}");
        // An empty purpose means no purpose.
        assert!(d.decrypt_value(&plain, Some("")).is_some(), "{kind}");
    }
}

#[test]
fn expired_tokens_are_rejected() {
    for kind in ALL {
        let d = driver(kind);
        let expired = d
            .encrypt(&"v", &EncryptOptions::new().expires_in(-1_000_i64))
            .unwrap();
        assert!(d.decrypt_value(&expired, None).is_none(), "{kind}");

        let live = d
            .encrypt(&"v", &EncryptOptions::new().try_expires_in("2 hours").unwrap())
            .unwrap();
        assert!(d.decrypt_value(&live, None).is_some(), "{kind}");
    }
}

#[test]
fn malformed_tokens_are_rejected() {
    for kind in ALL {
        let d = driver(kind);
        for token in [
            "",
            ".",
            "foo",
            "foo.bar",
            "foo.bar.baz",
            "lanz.foo.bar.baz",
            "lanz.foo.bar.baz.qux",
            "lanz..bar.baz",
            "lanz.!!.@@.##",
        ] {
            assert!(d.decrypt_value(token, None).is_none(), "{kind}: {token:?}");
        }
    }
}

#[test]
fn every_field_is_tamper_evident() {
    for kind in ALL {
        let d = driver(kind);
        let token = d
            .encrypt(&json!({"username": "lanz"}), &EncryptOptions::new())
            .unwrap();
        let fields: Vec<&str> = token.split('.').collect();
        let first_binary = usize::from(kind.requires_id());
        for i in first_binary..fields.len() {
            let mut altered = fields.clone();
            let flipped = flip_first_char(fields[i]);
            altered[i] = &flipped;
            assert!(
                d.decrypt_value(&altered.join("."), None).is_none(),
                "{kind}: field {i}"
            );
        }
    }
}

fn flip_first_char(field: &str) -> String {
    let mut chars: Vec<char> = field.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    chars.into_iter().collect()
}

#[test]
fn drivers_do_not_accept_each_others_tokens() {
    for producer in ALL {
        let token = driver(producer)
            .encrypt(&"v", &EncryptOptions::new())
            .unwrap();
        for consumer in ALL.into_iter().filter(|k| *k != producer) {
            assert!(
                driver(consumer).decrypt_value(&token, None).is_none(),
                "{producer} -> {consumer}"
            );
        }
    }
}

#[test]
fn aes_256_gcm_known_token() {
    let d = Aes256Gcm::new(&DriverConfig::new([SECRET]).with_id("lanz")).unwrap();
    assert_eq!(
        d.decrypt_value(
            "lanz.JFPf0dF5fxMF_l8XzGkxKyXuiwwfGbW8HQhmZ0TEMA.bHgH2t61PsbFIdq4.GtWD6AzejaHpFLBk05PReA",
            None
        ),
        Some(json!({"username": "lanz"}))
    );
    assert!(d
        .decrypt_value("lanz.xx.bHgH2t61PsbFIdq4.GtWD6AzejaHpFLBk05PReA", None)
        .is_none());
    assert!(d
        .decrypt_value(
            "lanz.JFPf0dF5fxMF_l8XzGkxKyXuiwwfGbW8HQhmZ0TEMA.xx.GtWD6AzejaHpFLBk05PReA",
            None
        )
        .is_none());
}

#[test]
fn chacha20_poly1305_known_token() {
    let d = ChaCha20Poly1305::new(&DriverConfig::new([SECRET]).with_id("lanz")).unwrap();
    assert_eq!(
        d.decrypt_value(
            "lanz.1G6VgYEU4_nsPAGDfsKpCrLQGJMBpw6pExDPf26ukQ.vxSTiMmKaT3LEu38.H25SdXXfMyKk5E-UTKPQDA",
            None
        ),
        Some(json!({"username": "lanz"}))
    );
    assert!(d
        .decrypt_value(
            "nova.1G6VgYEU4_nsPAGDfsKpCrLQGJMBpw6pExDPf26ukQ.vxSTiMmKaT3LEu38.H25SdXXfMyKk5E-UTKPQDA",
            None
        )
        .is_none());
}

#[test]
fn legacy_known_tokens() {
    let d = Legacy::new(&DriverConfig::new([SECRET])).unwrap();
    let plain = "ZVasDmm5-fSJc4AM_Sfa_PXyyeCW1CIkqA4qZN--EwU.bjF0Um9YazlRYTJaYjdMdw.y-SGMGpZ86Ealg2QfADjS9XF2AiraywIFikxBToBbXU";
    let login = "ZVasDmm5-fSJc4AM_Sfa_Lsjy7sxAUbGOorf4GlKo0oU6QvG3iME7mQZzf82sf4G8zTD9oYq_dV00ih9kLwFmA.bjF0Um9YazlRYTJaYjdMdw.A9Cqzq-KzLglEvvet_hIxHk-ldFncq-vvODy9Nw2viE";

    assert_eq!(d.decrypt_value(plain, None), Some(json!({"username": "virk"})));
    assert_eq!(
        d.decrypt_value(login, Some("login")),
        Some(json!({"username": "virk"}))
    );
    assert!(d.decrypt_value(login, None).is_none());
    assert!(d.decrypt_value(login, Some("reset")).is_none());
}

#[test]
fn aes_256_cbc_known_tokens() {
    let d = Aes256Cbc::new(&DriverConfig::new([SECRET]).with_id("lanz")).unwrap();
    let plain = "lanz.d4Dzpa3-krR0ZCpPO9kpVsCQnOErje_S8MaLOuYkoCs.INCCe7M-nv20rkszU6f8jw.nEs69g9xDsivFDKZLpaCPZLc35UsteBPSX1VdFYFEK8";
    let reset = "lanz.7ZEblhbNA-N8-C1VmwPTEHKGn-6Vp-rh2FINzveT1_MqVzi24126LURjXBjHcpRSm7oSkIkqMAoyy-F6XY-pfQ.mbO51KGjtnmAZ2gZQ6O8KA.zJkDdT52BIIQCTgtXw5Zh2cCFKaxVGXEzApXDI_Mgqg";

    assert_eq!(d.decrypt_value(plain, None), Some(json!({"username": "lanz"})));
    assert_eq!(
        d.decrypt_value(reset, Some("reset")),
        Some(json!({"username": "lanz"}))
    );
    assert!(d.decrypt_value(reset, None).is_none());

    let other = Aes256Cbc::new(&DriverConfig::new([SECRET]).with_id("nova")).unwrap();
    assert!(other
        .decrypt_value(&plain.replacen("lanz", "nova", 1), None)
        .is_none());
}
