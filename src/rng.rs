use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic game PRNG.
///
/// Seeded instances hash the seed string with FNV-1a and feed the result to
/// a ChaCha8 stream, so the same seed string always reproduces the same
/// draw/shuffle/generation sequence regardless of platform.
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    pub fn new(seed: Option<&str>) -> Self {
        match seed {
            Some(seed) => Self::from_seed_str(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn from_seed_str(seed: &str) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(fnv1a64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            inner: ChaCha8Rng::from_entropy(),
        }
    }
}

impl RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

fn fnv1a64(text: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    text.bytes().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}
