use arena_core::Position;
use rand::rngs::StdRng;
use rand::Rng;

/// Pool of candidate spawn coordinates for one team or mode. Points are
/// drawn at random without immediate repetition; the available list refills
/// from the default list when exhausted.
#[derive(Clone, Debug)]
pub struct SpawnSelector {
    default_spawns: Vec<Position>,
    available: Vec<Position>,
}

impl SpawnSelector {
    pub fn new(points: Vec<Position>) -> Self {
        Self {
            available: points.clone(),
            default_spawns: points,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Size of the default pool.
    pub fn count(&self) -> usize {
        self.default_spawns.len()
    }

    /// Draw a random point, removing it from the available pool so it
    /// cannot be handed out again before the pool cycles.
    pub fn get_spawn_point(&mut self, rng: &mut StdRng) -> Option<Position> {
        if self.available.is_empty() {
            if self.default_spawns.is_empty() {
                return None;
            }
            self.available.extend(self.default_spawns.iter().copied());
        }

        let index = rng.gen_range(0..self.available.len());
        let point = self.available.swap_remove(index);

        if self.available.is_empty() {
            self.available.extend(self.default_spawns.iter().copied());
        }

        Some(point)
    }

    /// Permanently remove a point from the default pool, for fixed anchor
    /// spawns. The available pool is rebuilt without it.
    pub fn reserve_spawn_point(&mut self, index: usize) -> Option<Position> {
        if index >= self.default_spawns.len() {
            return None;
        }

        let reserved = self.default_spawns.remove(index);
        self.available.clear();
        self.available.extend(self.default_spawns.iter().copied());

        Some(reserved)
    }
}
