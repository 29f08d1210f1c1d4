// FrameEventLoop - one frame's single-threaded event loop
//
// Multiplexes the three things that can wake a frame: a keydown, a relay
// message, and the poll timer. Each wake runs to completion before the next
// one is looked at, so the agent needs no locking of its own.
//
// The loop lives as long as the keydown channel: closing it is how the host
// unloads the frame. Messages still queued at that point are dropped.

use crate::dom::DomSurface;
use crate::frame::{FrameAgent, MessagePort};
use crate::protocol::KeyEvent;
use crate::runtime::port::Inbox;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Sender used by the host to deliver keydowns to a running loop
pub type KeySender = mpsc::UnboundedSender<KeyEvent>;

pub struct FrameEventLoop<D, P> {
    agent: FrameAgent<D, P>,
    keys: mpsc::UnboundedReceiver<KeyEvent>,
    inbox: Inbox,
    poll_interval: Duration,
}

impl<D, P> FrameEventLoop<D, P>
where
    D: DomSurface,
    P: MessagePort,
{
    /// Wraps `agent`; returns the loop and the sender for its keydowns.
    ///
    /// The poll interval comes from the agent's options.
    pub fn new(agent: FrameAgent<D, P>, inbox: Inbox) -> (Self, KeySender) {
        let (key_tx, key_rx) = mpsc::unbounded_channel();
        let poll_interval = agent.dispatcher().options().poll_interval_duration();
        let event_loop = Self {
            agent,
            keys: key_rx,
            inbox,
            poll_interval,
        };
        (event_loop, key_tx)
    }

    /// Runs until the keydown channel closes, then hands the agent back.
    pub async fn run(mut self) -> FrameAgent<D, P> {
        self.agent.on_load();

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; on_load already polled
        ticker.tick().await;

        let mut inbox_open = true;
        loop {
            tokio::select! {
                biased;

                key = self.keys.recv() => match key {
                    Some(mut event) => {
                        let outcome = self.agent.on_keydown(&mut event);
                        tracing::trace!(frame = %self.agent.frame_id(), ?outcome, "keydown");
                    }
                    None => break,
                },
                message = self.inbox.recv(), if inbox_open => match message {
                    Some(data) => {
                        let outcome = self.agent.on_message(&data);
                        tracing::trace!(frame = %self.agent.frame_id(), ?outcome, "message");
                    }
                    None => inbox_open = false,
                },
                _ = ticker.tick() => {
                    self.agent.poll();
                }
            }
        }

        tracing::debug!(frame = %self.agent.frame_id(), "event loop ended (frame unloaded)");
        self.agent
    }
}
