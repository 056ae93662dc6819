use md5::{Digest, Md5};

/// PDF's fixed 32-byte password padding string (Algorithm 2, step a).
const PASSWORD_PADDING: [u8; 32] = [
    0x28, 0xbf, 0x4e, 0x5e, 0x4e, 0x75, 0x8a, 0x41, 0x64, 0x00, 0x4e, 0x56,
    0xff, 0xfa, 0x01, 0x08, 0x2e, 0x2e, 0x00, 0xb6, 0xd0, 0x68, 0x3e, 0x80,
    0x2f, 0x0c, 0xa9, 0xfe, 0x64, 0x53, 0x69, 0x7a,
];

/// RC4 key-scheduling algorithm: the initial 256-byte permutation.
pub fn ksa(key: &[u8]) -> [u8; 256] {
    let mut s = [0u8; 256];
    for (i, slot) in s.iter_mut().enumerate() {
        *slot = i as u8;
    }
    let mut j = 0u8;
    for i in 0..256 {
        j = j
            .wrapping_add(s[i])
            .wrapping_add(key[i % key.len()]);
        s.swap(i, usize::from(j));
    }
    s
}

/// RC4 stream cipher. The keystream position persists across calls, so a
/// stream can be decrypted chunk by chunk with one cipher instance.
pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    pub fn new(key: &[u8]) -> Self {
        Rc4 {
            s: ksa(key),
            i: 0,
            j: 0,
        }
    }

    /// One PRGA step.
    pub fn keystream_byte(&mut self) -> u8 {
        self.i = self.i.wrapping_add(1);
        self.j = self.j.wrapping_add(self.s[usize::from(self.i)]);
        self.s.swap(usize::from(self.i), usize::from(self.j));
        let index = self.s[usize::from(self.i)].wrapping_add(self.s[usize::from(self.j)]);
        self.s[usize::from(index)]
    }

    pub fn apply_in_place(&mut self, data: &mut [u8]) {
        for byte in data {
            *byte ^= self.keystream_byte();
        }
    }

    pub fn apply(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_in_place(&mut out);
        out
    }
}

/// Per-document decryption state for the standard security handler,
/// revisions 2–3, with an empty owner password.
#[derive(Debug, Clone, PartialEq)]
pub struct Encrypter {
    key: Vec<u8>,
}

impl Encrypter {
    /// Algorithm 2: compute the file encryption key.
    ///
    /// `owner_hash` is the trailer's `/O` entry, `permissions` its `/P`,
    /// `id0` the first element of `/ID`, `length_bits` the `/Length` entry.
    pub fn new(
        revision: i64,
        length_bits: i64,
        permissions: i64,
        owner_hash: &[u8],
        id0: &[u8],
        encrypt_metadata: bool,
    ) -> Self {
        let mut hasher = Md5::new();
        hasher.update(PASSWORD_PADDING);
        hasher.update(owner_hash);
        hasher.update((permissions as i32).to_le_bytes());
        hasher.update(id0);
        if revision >= 4 && !encrypt_metadata {
            hasher.update([0xff, 0xff, 0xff, 0xff]);
        }
        let mut digest = hasher.finalize().to_vec();

        let n = if revision == 2 {
            5
        } else {
            (length_bits / 8).clamp(5, 16) as usize
        };
        if revision >= 3 {
            for _ in 0..50 {
                digest = Md5::digest(&digest[..n]).to_vec();
            }
        }
        Encrypter {
            key: digest[..n].to_vec(),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Per-object key: MD5 of the file key, the low three bytes of the
    /// object number, and the low two bytes of the generation number
    /// (little-endian), truncated to min(n + 5, 16) bytes.
    pub fn object_key(&self, num: u32, gen: u16) -> Vec<u8> {
        let mut hasher = Md5::new();
        hasher.update(&self.key);
        hasher.update(&num.to_le_bytes()[..3]);
        hasher.update(gen.to_le_bytes());
        let digest = hasher.finalize();
        let k = (self.key.len() + 5).min(16);
        digest[..k].to_vec()
    }

    /// A fresh cipher keyed for one object's strings or streams.
    pub fn cipher(&self, num: u32, gen: u16) -> Rc4 {
        Rc4::new(&self.object_key(num, gen))
    }
}
