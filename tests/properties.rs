use proptest::prelude::*;
use vaultseal::crypto::{HEADER_LEN, MIN_ENVELOPE_LEN, NONCE_LEN, SALT_LEN};
use vaultseal::{
    crypto, secret_bytes, Argon2Params, Argon2Variant, CipherAlgorithm, CryptoConfig,
    HmacAlgorithm, KdfAlgorithm, Pbkdf2Params, ScryptParams, VaultSealError,
};

const PLAINTEXT: &[u8] = b"This is a test message for encryption/decryption";

/// Every cipher/KDF pair at the lowest accepted cost.
fn floor_configs() -> Vec<CryptoConfig> {
    let mut configs = Vec::new();
    for cipher in CipherAlgorithm::ALL {
        let base = CryptoConfig::new(cipher, KdfAlgorithm::Argon2);
        configs.push(base.with_argon2(Argon2Params {
            variant: Argon2Variant::Id,
            memory: 19,
            iterations: 2,
            parallelism: 1,
        }));
        configs.push(base.with_pbkdf2(Pbkdf2Params {
            hmac: HmacAlgorithm::Sha256,
            iterations: 600_000,
        }));
        configs.push(base.with_scrypt(ScryptParams {
            cost: 8,
            r: 8,
            p: 1,
        }));
    }
    configs
}

fn fast_config() -> CryptoConfig {
    fast_config_for(CipherAlgorithm::ChaCha20Poly1305)
}

fn fast_config_for(cipher: CipherAlgorithm) -> CryptoConfig {
    CryptoConfig::new(cipher, KdfAlgorithm::Scrypt).with_scrypt(ScryptParams {
        cost: 8,
        r: 8,
        p: 1,
    })
}

#[test]
fn round_trip_every_cipher_and_kdf() {
    for config in floor_configs() {
        let ctx = crypto(&config).unwrap();
        let envelope = ctx.encrypt(PLAINTEXT, secret_bytes("TestPassword123!")).unwrap();
        assert_eq!(envelope.len(), PLAINTEXT.len() + MIN_ENVELOPE_LEN);

        let plaintext = ctx.decrypt(&envelope, secret_bytes("TestPassword123!")).unwrap();
        assert_eq!(plaintext.as_slice(), PLAINTEXT, "{config:?}");

        assert!(
            matches!(
                ctx.decrypt(&envelope, secret_bytes("wrong")),
                Err(VaultSealError::AuthenticationFailed)
            ),
            "{config:?}"
        );
    }
}

#[test]
fn empty_and_large_payloads_every_cipher_and_kdf() {
    let large: Vec<u8> = (0..(2 * 1024 * 1024 + 17)).map(|i| (i % 251) as u8).collect();

    for config in floor_configs() {
        let ctx = crypto(&config).unwrap();
        for payload in [&b""[..], large.as_slice()] {
            let envelope = ctx.encrypt(payload, secret_bytes("pw")).unwrap();
            assert_eq!(envelope.len(), payload.len() + MIN_ENVELOPE_LEN, "{config:?}");

            let decrypted = ctx.decrypt(&envelope, secret_bytes("pw")).unwrap();
            assert_eq!(decrypted.as_slice(), payload, "{config:?}");
        }
    }
}

#[test]
fn sha512_pbkdf2_round_trip() {
    let config = CryptoConfig::new(CipherAlgorithm::Aes256Gcm, KdfAlgorithm::Pbkdf2).with_pbkdf2(
        Pbkdf2Params {
            hmac: HmacAlgorithm::Sha512,
            iterations: 1_000_000,
        },
    );
    let ctx = crypto(&config).unwrap();
    let envelope = ctx.encrypt(PLAINTEXT, secret_bytes("pw")).unwrap();
    assert_eq!(ctx.decrypt(&envelope, secret_bytes("pw")).unwrap().as_slice(), PLAINTEXT);
}

#[test]
fn envelope_from_other_cipher_is_rejected() {
    let aes = crypto(&CryptoConfig {
        cipher: CipherAlgorithm::Aes256Gcm,
        ..fast_config()
    })
    .unwrap();
    let chacha = crypto(&fast_config()).unwrap();

    let envelope = aes.encrypt(PLAINTEXT, secret_bytes("pw")).unwrap();
    assert!(matches!(
        chacha.decrypt(&envelope, secret_bytes("pw")),
        Err(VaultSealError::AuthenticationFailed)
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn any_plaintext_round_trips(plaintext in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let ctx = crypto(&fast_config()).unwrap();
        let envelope = ctx.encrypt(&plaintext, secret_bytes("pw")).unwrap();
        let decrypted = ctx.decrypt(&envelope, secret_bytes("pw")).unwrap();
        prop_assert_eq!(decrypted.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn flipping_any_bit_fails_authentication(
        cipher in prop::sample::select(CipherAlgorithm::ALL.to_vec()),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let ctx = crypto(&fast_config_for(cipher)).unwrap();
        let mut envelope = ctx.encrypt(PLAINTEXT, secret_bytes("pw")).unwrap();
        let position = index.index(envelope.len());
        envelope[position] ^= 1 << bit;

        let result = ctx.decrypt(&envelope, secret_bytes("pw"));
        prop_assert!(matches!(result, Err(VaultSealError::AuthenticationFailed)));
    }

    #[test]
    fn truncated_envelopes_fail_authentication(
        cipher in prop::sample::select(CipherAlgorithm::ALL.to_vec()),
        len in 0usize..MIN_ENVELOPE_LEN + 8,
    ) {
        let ctx = crypto(&fast_config_for(cipher)).unwrap();
        let envelope = ctx.encrypt(b"secret", secret_bytes("pw")).unwrap();
        prop_assume!(len < envelope.len());

        let result = ctx.decrypt(&envelope[..len], secret_bytes("pw"));
        prop_assert!(matches!(result, Err(VaultSealError::AuthenticationFailed)));
    }

    #[test]
    fn encryption_is_not_deterministic(plaintext in proptest::collection::vec(any::<u8>(), 0..64)) {
        let ctx = crypto(&fast_config()).unwrap();
        let first = ctx.encrypt(&plaintext, secret_bytes("pw")).unwrap();
        let second = ctx.encrypt(&plaintext, secret_bytes("pw")).unwrap();

        prop_assert_ne!(&first[..NONCE_LEN], &second[..NONCE_LEN]);
        prop_assert_ne!(&first[NONCE_LEN..HEADER_LEN], &second[NONCE_LEN..HEADER_LEN]);
        prop_assert_ne!(&first[HEADER_LEN..], &second[HEADER_LEN..]);
        prop_assert_eq!(HEADER_LEN, NONCE_LEN + SALT_LEN);
    }
}
