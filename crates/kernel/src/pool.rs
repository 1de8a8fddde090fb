use vortex_common::SlotId;

use crate::Particle;

/// Largest capacity a pool accepts; slot ids are `u32`.
pub const MAX_CAPACITY: usize = u32::MAX as usize;

/// Slots reserved up front; larger pools grow on demand.
const INITIAL_RESERVE: usize = 4096;

/// Fixed-capacity particle arena.
///
/// Slots are allocated lazily up to `capacity` and never freed. Each
/// allocated slot sits in exactly one of two lists: `active` (live, drawn,
/// updated every tick) or `retired` (expired, waiting to be reused by the
/// emitter). Retirement swap-removes from `active`, so active order is not
/// spawn order.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    active: Vec<SlotId>,
    retired: Vec<SlotId>,
    capacity: usize,
}

impl ParticlePool {
    /// Capacities above [`MAX_CAPACITY`] are clamped to it.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);
        let reserve = capacity.min(INITIAL_RESERVE);
        Self {
            slots: Vec::with_capacity(reserve),
            active: Vec::with_capacity(reserve),
            retired: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots handed out so far (active + retired).
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// No retired slot to reuse and no room to allocate a new one.
    pub fn is_full(&self) -> bool {
        self.retired.is_empty() && self.slots.len() >= self.capacity
    }

    /// Active slots in update order.
    pub fn active(&self) -> &[SlotId] {
        &self.active
    }

    /// Retired slots in retirement order.
    pub fn retired(&self) -> &[SlotId] {
        &self.retired
    }

    /// Place a particle into the pool, reusing the most recently retired slot
    /// first. Returns `None` when the pool is full.
    pub fn spawn(&mut self, particle: Particle) -> Option<SlotId> {
        let slot = if let Some(slot) = self.retired.pop() {
            self.slots[slot.index()] = particle;
            slot
        } else if self.slots.len() < self.capacity {
            let slot = SlotId(self.slots.len() as u32);
            self.slots.push(particle);
            slot
        } else {
            return None;
        };
        self.active.push(slot);
        Some(slot)
    }

    /// Particle stored in `slot`, active or retired.
    pub fn get(&self, slot: SlotId) -> Option<&Particle> {
        self.slots.get(slot.index())
    }

    pub fn is_active(&self, slot: SlotId) -> bool {
        self.active.contains(&slot)
    }

    /// Iterate active particles in update order.
    pub fn iter_active(&self) -> impl Iterator<Item = (SlotId, &Particle)> + '_ {
        self.active
            .iter()
            .map(move |&slot| (slot, &self.slots[slot.index()]))
    }

    /// Retire every active particle.
    pub fn clear(&mut self) {
        self.retired.append(&mut self.active);
    }

    pub(crate) fn active_slot(&self, index: usize) -> SlotId {
        self.active[index]
    }

    pub(crate) fn particle_mut(&mut self, slot: SlotId) -> &mut Particle {
        &mut self.slots[slot.index()]
    }

    /// Move the active entry at `index` to the retired list. The last active
    /// entry takes its place.
    pub(crate) fn retire_at(&mut self, index: usize) -> SlotId {
        let slot = self.active.swap_remove(index);
        self.retired.push(slot);
        slot
    }
}
