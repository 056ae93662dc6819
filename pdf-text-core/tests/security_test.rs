use pdf_text_core::security::{ksa, Encrypter, Rc4};

// --- KSA ---

#[test]
fn ksa_yields_a_permutation() {
    let s = ksa(b"Key");
    let mut seen = [false; 256];
    for byte in s {
        seen[usize::from(byte)] = true;
    }
    assert!(seen.iter().all(|b| *b));
}

#[test]
fn ksa_is_deterministic() {
    assert_eq!(ksa(b"Secret"), ksa(b"Secret"));
    assert_ne!(ksa(b"Secret"), ksa(b"secret"));
}

// --- PRGA ---

#[test]
fn prga_keystream_for_key() {
    // Canonical RC4 test vector.
    let mut rc4 = Rc4::new(b"Key");
    let keystream: Vec<u8> = (0..10).map(|_| rc4.keystream_byte()).collect();
    assert_eq!(
        keystream,
        vec![0xeb, 0x9f, 0x77, 0x81, 0xb7, 0x34, 0xca, 0x72, 0xa7, 0x19]
    );
}

#[test]
fn rc4_key_plaintext_vector() {
    let mut rc4 = Rc4::new(b"Key");
    let ciphertext = rc4.apply(b"Plaintext");
    assert_eq!(
        ciphertext,
        vec![0xbb, 0xf3, 0x16, 0xe8, 0xd9, 0x40, 0xaf, 0x0a, 0xd3]
    );
}

#[test]
fn rc4_wiki_vector() {
    let mut rc4 = Rc4::new(b"Wiki");
    assert_eq!(
        rc4.apply(b"pedia"),
        vec![0x10, 0x21, 0xbf, 0x04, 0x20]
    );
}

#[test]
fn encrypt_then_decrypt_round_trips() {
    let data = b"some bytes that want privacy";
    let ciphertext = Rc4::new(b"object key").apply(data);
    let plaintext = Rc4::new(b"object key").apply(&ciphertext);
    assert_eq!(plaintext, data);
}

#[test]
fn keystream_persists_across_chunks() {
    let data = b"split across two chunk boundaries";
    let whole = Rc4::new(b"k").apply(data);

    let mut chunked = Rc4::new(b"k");
    let mut out = chunked.apply(&data[..7]);
    out.extend(chunked.apply(&data[7..20]));
    out.extend(chunked.apply(&data[20..]));
    assert_eq!(out, whole);
}

// --- key derivation ---

#[test]
fn revision_two_key_is_five_bytes() {
    let enc = Encrypter::new(2, 40, -44, &[0u8; 32], b"docid", true);
    assert_eq!(enc.key().len(), 5);
}

#[test]
fn revision_three_key_length_follows_length_entry() {
    let enc = Encrypter::new(3, 128, -44, &[0u8; 32], b"docid", true);
    assert_eq!(enc.key().len(), 16);
    let enc = Encrypter::new(3, 40, -44, &[0u8; 32], b"docid", true);
    assert_eq!(enc.key().len(), 5);
}

#[test]
fn key_derivation_is_deterministic_and_input_sensitive() {
    let a = Encrypter::new(2, 40, -44, &[1u8; 32], b"docid", true);
    let b = Encrypter::new(2, 40, -44, &[1u8; 32], b"docid", true);
    let c = Encrypter::new(2, 40, -44, &[1u8; 32], b"other", true);
    assert_eq!(a.key(), b.key());
    assert_ne!(a.key(), c.key());
}

#[test]
fn object_key_is_truncated_to_sixteen_bytes() {
    let enc = Encrypter::new(3, 128, 0, &[0u8; 32], b"docid", true);
    // n = 16, so n + 5 caps at 16.
    assert_eq!(enc.object_key(1, 0).len(), 16);

    let enc = Encrypter::new(2, 40, 0, &[0u8; 32], b"docid", true);
    // n = 5, so the object key is n + 5 = 10 bytes.
    assert_eq!(enc.object_key(1, 0).len(), 10);
}

#[test]
fn object_keys_differ_per_object() {
    let enc = Encrypter::new(2, 40, 0, &[0u8; 32], b"docid", true);
    assert_ne!(enc.object_key(1, 0), enc.object_key(2, 0));
    assert_ne!(enc.object_key(1, 0), enc.object_key(1, 1));
}

#[test]
fn cipher_uses_the_object_key() {
    let enc = Encrypter::new(2, 40, 0, &[0u8; 32], b"docid", true);
    let from_cipher = enc.cipher(4, 0).apply(b"payload");
    let direct = Rc4::new(&enc.object_key(4, 0)).apply(b"payload");
    assert_eq!(from_cipher, direct);
}
