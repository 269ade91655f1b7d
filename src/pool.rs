use rand::Rng;

use crate::conf::PoolMode;

/// Random values are drawn from `[0, 256^15)`.
const VALUE_BITS: u32 = 120;

#[derive(Debug, Clone)]
pub struct StringPool {
    entries: Vec<String>,
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R) -> String {
    let value: u128 = rng.gen_range(0..1u128 << VALUE_BITS);
    format!("{:032x}", value)
}

impl StringPool {
    pub fn new<R: Rng + ?Sized>(size: usize, mode: PoolMode, rng: &mut R) -> Self {
        let entries = match mode {
            PoolMode::Replicated => vec![random_hex(rng); size.max(1)],
            PoolMode::Distinct => (0..size.max(1)).map(|_| random_hex(rng)).collect(),
        };
        Self { entries }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }

    #[cfg(test)]
    pub fn contains(&self, value: &str) -> bool {
        self.entries.iter().any(|entry| entry == value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
