mod common;

use common::{first_key, keyring_json, single_key, EC_P256_JWK, EC_P256_PUB_JWK, RSA_JWK};
use jwtkit::{JwkSet, KeyOps, KeyType, KeyUse};

#[test]
fn bad_entry_keeps_its_slot_and_its_neighbours_usable() {
    let jwks = format!(
        r#"{{"keys":[{EC_P256_JWK},{{"kty":"oct","k":""}},{RSA_JWK}]}}"#
    );
    let set = JwkSet::parse(Some(&jwks));

    assert_eq!(set.len(), 3);
    assert!(!set.error());

    assert!(!set.get(0).expect("ec").error());
    assert!(!set.get(2).expect("rsa").error());

    let bad = set.get(1).expect("oct");
    assert!(bad.error());
    assert_eq!(bad.error_msg(), Some("Invalid JWK: invalid `k`"));
    assert!(bad.material().is_none());
}

#[test]
fn invalid_key_op_entries_are_flagged_but_partial() {
    let jwks = r#"{"kty":"oct","k":"aGVsbG8",
        "key_ops":["sign",7,"verify"],
        "use":"enc",
        "kid":"264265c2-4ef0-4751-adbd-9739550afe5b"}"#;
    let set = JwkSet::parse(Some(jwks));
    let item = first_key(&set);

    assert!(item.error());
    assert_eq!(item.error_msg(), Some("JWK has an invalid value in key_op"));
    assert_eq!(item.key_ops(), KeyOps::SIGN | KeyOps::VERIFY);
    assert_eq!(item.key_use(), Some(KeyUse::Encryption));
    assert_eq!(item.kid(), Some("264265c2-4ef0-4751-adbd-9739550afe5b"));
}

#[test]
fn every_recognized_key_op_is_collected() {
    let jwks = r#"{"kty":"oct","k":"aGVsbG8",
        "key_ops":["sign","verify","encrypt","decrypt",
                   "wrapKey","unwrapKey","deriveKey","deriveBits"]}"#;
    let set = JwkSet::parse(Some(jwks));
    let item = first_key(&set);
    assert!(!item.error());
    assert_eq!(item.key_ops(), KeyOps::all());
}

#[test]
fn keyring_loads_every_fixture() {
    let json = keyring_json();
    let mut set = JwkSet::parse(Some(&json));

    assert!(!set.error());
    assert_eq!(set.len(), 7);
    for (index, item) in set.iter().enumerate() {
        assert!(!item.error(), "entry {index}: {:?}", item.error_msg());
        assert!(item.kid().is_some());
    }

    assert!(set.remove(3));
    assert_eq!(set.len(), 6);
}

#[test]
fn keyring_loads_from_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keyring.json");
    std::fs::write(&path, keyring_json()).expect("write keyring");

    let data = std::fs::read_to_string(&path).expect("read keyring");
    let set = JwkSet::parse(Some(&data));
    assert!(!set.error());
    assert_eq!(set.len(), 7);
}

#[test]
fn top_level_garbage_marks_the_set() {
    let set = JwkSet::parse(Some("{\"keys\": [}"));
    assert!(set.error());
    assert_eq!(set.len(), 0);
    let msg = set.error_msg().expect("message");
    assert!(msg.contains("column"), "position missing from: {msg}");
}

#[test]
fn a_bare_jwk_object_is_a_set_of_one() {
    let set = single_key(EC_P256_PUB_JWK);
    let item = first_key(&set);
    assert_eq!(item.kty(), Some(KeyType::Ec));
    assert!(!item.is_private());
    assert_eq!(item.bits(), 256);
}

#[test]
fn a_keys_member_that_is_not_an_array_yields_nothing() {
    let set = JwkSet::parse(Some(r#"{"keys": 5}"#));
    assert!(!set.error());
    assert_eq!(set.len(), 0);
}

#[test]
fn importers_report_key_shape() {
    let set = single_key(RSA_JWK);
    let rsa = first_key(&set);
    assert_eq!(rsa.kty(), Some(KeyType::Rsa));
    assert!(rsa.is_private());
    assert_eq!(rsa.bits(), 2048);

    let set = single_key(EC_P256_JWK);
    let ec = first_key(&set);
    assert!(ec.is_private());
    assert_eq!(ec.bits(), 256);

    let set = single_key(common::ED25519_JWK);
    let ed = first_key(&set);
    assert_eq!(ed.kty(), Some(KeyType::Okp));
    assert!(ed.is_private());
    assert_eq!(ed.bits(), 256);

    let set = single_key(common::OCT_256_JWK);
    let oct = first_key(&set);
    assert_eq!(oct.kty(), Some(KeyType::Oct));
    assert!(oct.is_private());
    assert_eq!(oct.bits(), 512);
}

#[test]
fn importers_rebuild_public_pems() {
    for jwk in [EC_P256_JWK, EC_P256_PUB_JWK, RSA_JWK, common::ED25519_JWK] {
        let set = single_key(jwk);
        let pem = first_key(&set).pem().expect("pem");
        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"), "{pem}");
    }
}

#[test]
fn ed448_is_recorded_as_unsupported() {
    let jwks = r#"{"kty":"OKP","crv":"Ed448",
        "x":"X9tFev7QuzMalgANZbMkOukUm6Iwzt8dCJZZKKw0GWpfMfLiAzIqrqsmrzKt4h14"}"#;
    let set = JwkSet::parse(Some(jwks));
    let item = first_key_even_if_broken(&set);
    assert!(item.error());
    assert!(item.error_msg().expect("msg").contains("Ed448"));
}

#[test]
fn ec_point_off_curve_is_rejected() {
    let jwks = r#"{"kty":"EC","crv":"P-256",
        "x":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "y":"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"}"#;
    let set = JwkSet::parse(Some(jwks));
    let item = first_key_even_if_broken(&set);
    assert!(item.error());
    assert!(item.material().is_none());
}

fn first_key_even_if_broken(set: &JwkSet) -> &jwtkit::JwkItem {
    set.get(0).expect("set is not empty")
}
