use arena_core::Broadcast;

/// A broadcast as posted to the outbound stream, tagged with the event that
/// emitted it and a monotonically increasing sequence number.
#[derive(Clone, Debug)]
pub struct PostedBroadcast {
    pub sequence: u64,
    pub event: String,
    pub broadcast: Broadcast,
}

/// Tracks a consumer's position in the outbound broadcast stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoticeCursor(pub u64);

/// Fixed-capacity ring of outbound broadcasts with cursor-based retrieval.
/// Slow consumers lose the oldest entries rather than stalling the engine.
pub struct NoticeBuffer {
    ring: Vec<Option<PostedBroadcast>>,
    capacity: usize,
    next_sequence: u64,
}

impl NoticeBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: (0..capacity).map(|_| None).collect(),
            capacity,
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, event: &str, broadcast: Broadcast) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let slot = (sequence as usize) % self.capacity;
        self.ring[slot] = Some(PostedBroadcast {
            sequence,
            event: event.to_string(),
            broadcast,
        });
    }

    /// Everything posted at or after the cursor that is still buffered,
    /// plus the cursor to pass next time.
    pub fn since(&self, cursor: NoticeCursor) -> (Vec<PostedBroadcast>, NoticeCursor) {
        let mut posted = Vec::new();

        if self.next_sequence == 0 {
            return (posted, NoticeCursor(0));
        }

        let oldest = self
            .next_sequence
            .saturating_sub(self.capacity as u64);
        let start = cursor.0.max(oldest);

        for sequence in start..self.next_sequence {
            let slot = (sequence as usize) % self.capacity;
            if let Some(entry) = &self.ring[slot] {
                if entry.sequence == sequence {
                    posted.push(entry.clone());
                }
            }
        }

        (posted, NoticeCursor(self.next_sequence))
    }

    pub fn sequence(&self) -> u64 {
        self.next_sequence
    }
}
