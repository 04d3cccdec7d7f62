//! Outgoing pulse commands
//!
//! Every trigger sets exactly one field of a reused [`GuiCommand`] buffer,
//! sends it, and clears the field again before returning.

use crossbeam_channel::Sender;

use crate::protocol::GuiCommand;

/// Destination for outgoing commands
pub trait CommandSink {
    /// Deliver one command record
    fn send(&mut self, command: &GuiCommand);
}

impl CommandSink for Sender<GuiCommand> {
    fn send(&mut self, command: &GuiCommand) {
        if Sender::send(self, *command).is_err() {
            log::warn!("Command receiver disconnected; dropping {:?}", command);
        }
    }
}

/// Pulse-style command emitter
pub struct CommandChannel {
    sink: Box<dyn CommandSink>,
    buffer: GuiCommand,
    shutdown_sent: bool,
    torn_down: bool,
}

impl std::fmt::Debug for CommandChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandChannel")
            .field("buffer", &self.buffer)
            .field("shutdown_sent", &self.shutdown_sent)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl CommandChannel {
    /// Wrap a sink
    pub fn new(sink: impl CommandSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            buffer: GuiCommand::default(),
            shutdown_sent: false,
            torn_down: false,
        }
    }

    /// Current buffer contents; all fields are false between triggers
    pub fn buffer(&self) -> &GuiCommand {
        &self.buffer
    }

    /// Whether the simulation has announced its shutdown
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Stop emitting; every later trigger is a no-op
    pub fn mark_torn_down(&mut self) {
        if !self.torn_down {
            log::info!("Simulation shutting down; outgoing commands disabled");
        }
        self.torn_down = true;
    }

    fn pulse(&mut self, field: fn(&mut GuiCommand) -> &mut bool) {
        if self.torn_down {
            return;
        }
        *field(&mut self.buffer) = true;
        self.sink.send(&self.buffer);
        *field(&mut self.buffer) = false;
    }

    /// Ask for a faster time warp
    pub fn increment_warp(&mut self) {
        self.pulse(|c| &mut c.inc_warp);
    }

    /// Ask for a slower time warp
    pub fn decrement_warp(&mut self) {
        self.pulse(|c| &mut c.dec_warp);
    }

    /// Pause or resume the simulation
    pub fn toggle_pause(&mut self) {
        self.pulse(|c| &mut c.toggle_pause);
    }

    /// Advance one step while paused
    pub fn single_step(&mut self) {
        self.pulse(|c| &mut c.single_step);
    }

    /// Ask for cached state to be resent
    pub fn request_cached(&mut self) {
        self.pulse(|c| &mut c.request_cached);
    }

    /// Tell the simulation the viewer is closing
    ///
    /// Sent at most once, and never after the simulation announced its own
    /// shutdown.
    pub fn notify_shutting_down(&mut self) {
        if self.shutdown_sent || self.torn_down {
            return;
        }
        self.shutdown_sent = true;
        self.pulse(|c| &mut c.shutting_down);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    fn channel() -> (CommandChannel, crossbeam_channel::Receiver<GuiCommand>) {
        let (tx, rx) = unbounded();
        (CommandChannel::new(tx), rx)
    }

    #[test]
    fn test_increment_warp_is_single_pulse() {
        let (mut commands, rx) = channel();
        commands.increment_warp();

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].inc_warp);
        assert_eq!(sent[0].active_count(), 1);
        assert_eq!(*commands.buffer(), GuiCommand::default());
    }

    #[test]
    fn test_triggers_do_not_accumulate() {
        let (mut commands, rx) = channel();
        commands.toggle_pause();
        commands.single_step();
        commands.request_cached();
        commands.decrement_warp();

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|c| c.active_count() == 1));
        assert!(sent[0].toggle_pause);
        assert!(sent[1].single_step);
        assert!(sent[2].request_cached);
        assert!(sent[3].dec_warp);
    }

    #[test]
    fn test_shutdown_notice_sent_once() {
        let (mut commands, rx) = channel();
        commands.notify_shutting_down();
        commands.notify_shutting_down();

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].shutting_down);
    }

    #[test]
    fn test_torn_down_channel_is_silent() {
        let (mut commands, rx) = channel();
        commands.mark_torn_down();
        commands.increment_warp();
        commands.notify_shutting_down();

        assert!(rx.try_iter().next().is_none());
        assert!(commands.is_torn_down());
    }

    #[test]
    fn test_disconnected_receiver_is_tolerated() {
        let (mut commands, rx) = channel();
        drop(rx);
        commands.single_step();
        assert_eq!(*commands.buffer(), GuiCommand::default());
    }
}
