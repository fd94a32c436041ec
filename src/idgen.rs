/// Monotonic id source for clips, notes and locally created tracks.
///
/// Never yields 0, which the engine uses as "no id".
#[derive(Debug, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1).max(1);
        id
    }

    /// Make sure future ids stay above an id handed out elsewhere (engine loads,
    /// refreshed tracks).
    #[inline]
    pub fn seed_from_max(&mut self, max_seen: u64) {
        let next = max_seen.saturating_add(1).max(1);
        if next > self.next {
            self.next = next;
        }
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_nonzero() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next(), 1);
        assert_eq!(ids.next(), 2);
    }

    #[test]
    fn seeding_never_moves_backwards() {
        let mut ids = IdGenerator::new();
        ids.seed_from_max(41);
        assert_eq!(ids.next(), 42);
        ids.seed_from_max(3);
        assert_eq!(ids.next(), 43);
    }
}
