//! End-to-end flows with the reference suite

use tss2p_core::{
    keys, refresh_shares, run_keygen, sign_with_shares, DriverConfig, Error, KeysharePair, Role,
    Secp256k1Suite, Share, Signature, SIGNATURE_LEN,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn keygen() -> KeysharePair {
    init_tracing();
    run_keygen(&Secp256k1Suite, &DriverConfig::default()).unwrap()
}

fn sign(pair: &KeysharePair, message: &[u8]) -> Signature {
    sign_with_shares(
        &Secp256k1Suite,
        &pair.validator,
        &pair.user,
        message,
        &DriverConfig::default(),
    )
    .unwrap()
}

#[test]
fn test_keygen_sign_verify_through_text() {
    let pair = keygen();

    // Persist and reload both shares as text
    let validator: Share = pair.validator.to_string().parse().unwrap();
    let user: Share = pair.user.to_string().parse().unwrap();
    assert_eq!(validator.role(), Role::Validator);
    assert_eq!(user.role(), Role::User);

    let message = b"approve withdrawal #42";
    let signature = sign_with_shares(
        &Secp256k1Suite,
        &validator,
        &user,
        message,
        &DriverConfig::default(),
    )
    .unwrap();

    let bytes = signature.serialize();
    assert_eq!(Signature::deserialize(&bytes).unwrap(), signature);
    for share in [&validator, &user] {
        assert!(keys::verify(&Secp256k1Suite, share, message, &bytes).unwrap());
    }
}

#[test]
fn test_public_key_matches_both_shares() {
    let pair = keygen();
    let from_validator = keys::public_key_from_share(&Secp256k1Suite, &pair.validator).unwrap();
    let from_user = keys::public_key_from_share(&Secp256k1Suite, &pair.user).unwrap();
    assert_eq!(from_validator, from_user);

    let bytes = from_user.to_uncompressed();
    assert_eq!(bytes[0], 0x04);
    assert_eq!(keys::ec_point_from_uncompressed(&bytes).unwrap(), from_user);
}

#[test]
fn test_any_signature_bit_flip_fails() {
    let pair = keygen();
    let message = b"bit flips";
    let bytes = sign(&pair, message).serialize();

    for index in 0..SIGNATURE_LEN {
        for bit in 0..8 {
            let mut tampered = bytes;
            tampered[index] ^= 1 << bit;
            assert!(
                !keys::verify(&Secp256k1Suite, &pair.user, message, &tampered).unwrap(),
                "flip of byte {index} bit {bit} still verified"
            );
        }
    }
}

#[test]
fn test_any_message_bit_flip_fails() {
    let pair = keygen();
    let message = b"bit flips in the message".to_vec();
    let bytes = sign(&pair, &message).serialize();

    for index in 0..message.len() {
        for bit in 0..8 {
            let mut tampered = message.clone();
            tampered[index] ^= 1 << bit;
            assert!(!keys::verify(&Secp256k1Suite, &pair.user, &tampered, &bytes).unwrap());
        }
    }
}

#[test]
fn test_verify_rejects_bad_signature_length() {
    let pair = keygen();
    let bytes = sign(&pair, b"m").serialize();
    for len in [65, 67] {
        let mut buffer = bytes.to_vec();
        buffer.resize(len, 0);
        assert!(matches!(
            keys::verify(&Secp256k1Suite, &pair.user, b"m", &buffer),
            Err(Error::MalformedSignature { .. })
        ));
    }
}

#[test]
fn test_verify_rejects_malformed_share() {
    let pair = keygen();
    let bytes = sign(&pair, b"m").serialize();
    assert!("garbage".parse::<Share>().is_err());
    assert!(matches!(
        Share::decode("validator:not-base64!!"),
        Err(Error::MalformedMessage(_))
    ));
    assert!(keys::verify(&Secp256k1Suite, &pair.user, b"m", &bytes).unwrap());
}

#[test]
fn test_refresh_preserves_key_and_signs() {
    let pair = keygen();
    let config = DriverConfig::default();
    let refreshed = refresh_shares(&Secp256k1Suite, &pair.validator, &pair.user, &config).unwrap();

    assert_ne!(refreshed.validator, pair.validator);
    assert_ne!(refreshed.user, pair.user);
    assert_eq!(
        keys::public_key_from_share(&Secp256k1Suite, &refreshed.validator).unwrap(),
        keys::public_key_from_share(&Secp256k1Suite, &pair.validator).unwrap()
    );

    let message = b"after refresh";
    let bytes = sign(&refreshed, message).serialize();
    // Verifies under the original shares' public key
    assert!(keys::verify(&Secp256k1Suite, &pair.user, message, &bytes).unwrap());
}

#[test]
fn test_mixed_generations_fail_to_sign() {
    let pair = keygen();
    let config = DriverConfig::default();
    let refreshed = refresh_shares(&Secp256k1Suite, &pair.validator, &pair.user, &config).unwrap();

    let err = sign_with_shares(
        &Secp256k1Suite,
        &pair.validator,
        &refreshed.user,
        b"mixed",
        &config,
    )
    .unwrap_err();
    assert!(matches!(err, Error::Protocol { role: Role::User, .. }));
}

#[test]
fn test_swapped_shares_rejected() {
    let pair = keygen();
    let config = DriverConfig::default();

    assert!(matches!(
        sign_with_shares(&Secp256k1Suite, &pair.user, &pair.validator, b"m", &config),
        Err(Error::RoleMismatch { .. })
    ));
    assert!(matches!(
        refresh_shares(&Secp256k1Suite, &pair.user, &pair.validator, &config),
        Err(Error::RoleMismatch { .. })
    ));
}

#[test]
fn test_share_pair_serde() {
    let pair = keygen();
    let json = serde_json::to_string(&pair).unwrap();
    let restored: KeysharePair = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, pair);

    let (validator, user): (Share, Share) = restored.into();
    assert_eq!(validator.role(), Role::Validator);
    assert_eq!(user.role(), Role::User);
}
