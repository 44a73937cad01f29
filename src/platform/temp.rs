//! Temp name suffixes.
//! Mixes pid, wall clock and a process-wide counter so that concurrent
//! threads and processes rarely collide; collisions that do happen are
//! handled by exclusive create + retry in the temp file factory.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next decimal temp-name suffix.
pub(crate) fn next_suffix() -> u64 {
    let pid = u64::from(std::process::id());
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    splitmix64(nanos ^ pid.rotate_left(32) ^ seq.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    (z ^ (z >> 31)) >> 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn uniqueness_concurrent() {
        let mut handles = Vec::new();
        for _ in 0..32 {
            handles.push(thread::spawn(|| (0..64).map(|_| next_suffix()).collect::<Vec<_>>()));
        }
        let mut set = HashSet::new();
        for h in handles {
            for s in h.join().unwrap() {
                assert!(set.insert(s), "duplicate suffix {s}");
            }
        }
        assert_eq!(set.len(), 32 * 64);
    }
}
