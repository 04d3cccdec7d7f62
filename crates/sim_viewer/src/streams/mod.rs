//! Producer-to-consumer message queues
//!
//! One independently locked queue per stream. The producer pushes; the
//! consumer takes the whole queue in one short critical section and works
//! on the batch after the lock is released.

use parking_lot::Mutex;

use crate::protocol::{ContactVisual, Frame, Shapes, SimInfo, UtmTerrain};

/// A mutex-guarded FIFO of messages
#[derive(Debug)]
pub struct Stream<T> {
    queue: Mutex<Vec<T>>,
}

impl<T> Default for Stream<T> {
    fn default() -> Self {
        Self { queue: Mutex::new(Vec::new()) }
    }
}

impl<T> Stream<T> {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message
    pub fn push(&self, message: T) {
        self.queue.lock().push(message);
    }

    /// Take every buffered message in arrival order, leaving the queue empty
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.queue.lock())
    }

    /// Number of buffered messages
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

/// All incoming streams, shared between producer and consumer through `Arc`
#[derive(Debug, Default)]
pub struct IncomingStreams {
    /// Terrain and background settings
    pub terrain: Stream<UtmTerrain>,
    /// Per-entity visual styles
    pub visuals: Stream<ContactVisual>,
    /// Entity snapshots
    pub frames: Stream<Frame>,
    /// Simulation status
    pub sim_info: Stream<SimInfo>,
    /// Ephemeral shape batches
    pub shapes: Stream<Shapes>,
}

impl IncomingStreams {
    /// Create empty streams
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a terrain message
    pub fn push_terrain(&self, terrain: UtmTerrain) {
        self.terrain.push(terrain);
    }

    /// Queue a visual style
    pub fn push_visual(&self, visual: ContactVisual) {
        self.visuals.push(visual);
    }

    /// Queue a frame
    pub fn push_frame(&self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Queue a simulation status update
    pub fn push_sim_info(&self, info: SimInfo) {
        self.sim_info.push(info);
    }

    /// Queue a shape batch
    pub fn push_shapes(&self, shapes: Shapes) {
        self.shapes.push(shapes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let stream = Stream::new();
        stream.push(1);
        stream.push(2);
        stream.push(3);

        assert_eq!(stream.drain(), vec![1, 2, 3]);
        assert_eq!(stream.pending(), 0);
        assert!(stream.drain().is_empty());
    }

    #[test]
    fn test_concurrent_producer_loses_nothing() {
        let streams = Arc::new(IncomingStreams::new());
        let producer = {
            let streams = Arc::clone(&streams);
            thread::spawn(move || {
                for i in 0..500 {
                    streams.push_frame(Frame::new(i as f64, Vec::new()));
                }
            })
        };

        let mut received = Vec::new();
        while received.len() < 500 {
            received.extend(streams.frames.drain());
            thread::yield_now();
        }
        producer.join().unwrap();

        assert_eq!(received.len(), 500);
        assert!(received.windows(2).all(|w| w[0].time < w[1].time));
    }
}
