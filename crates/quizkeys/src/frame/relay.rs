// Cross-Frame Relay
//
// A frame that cannot use a keystroke passes it on: the top frame broadcasts
// to its children, a nested frame sends it straight up to the top. Receivers
// validate the envelope and drop anything they sent themselves.
//
// Delivery is best effort. A child that refuses the post (torn down,
// cross-origin restrictions) is logged and skipped so its siblings still get
// the key.

use crate::error::Result;
use crate::protocol::{FrameId, KeyInput, RelayMessage};
use serde_json::Value;

/// Outbound half of the frame message channel
pub trait MessagePort {
    /// Whether this frame is the top of its frame tree
    fn is_top(&self) -> bool;

    /// Number of immediate child frames right now
    fn child_count(&self) -> usize;

    fn post_to_child(&self, index: usize, message: &Value) -> Result<()>;

    fn post_to_top(&self, message: &Value) -> Result<()>;
}

/// Where an unhandled key went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRoute {
    /// Broadcast downward; number of children that accepted the post
    Children(usize),
    /// Sent up to the top frame; whether the post was accepted
    Top(bool),
}

/// Result of screening an inbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Accepted(RelayMessage),
    /// Not one of our envelopes
    Foreign,
    /// Our own broadcast coming back
    SelfOrigin,
}

/// Relay endpoint for one frame
#[derive(Debug, Clone)]
pub struct Relay {
    frame_id: FrameId,
    diagnostics: bool,
}

impl Relay {
    pub fn new(frame_id: FrameId, diagnostics: bool) -> Self {
        Self {
            frame_id,
            diagnostics,
        }
    }

    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    /// Passes a locally unhandled key on: down if we are top, up otherwise.
    pub fn hand_off<P: MessagePort + ?Sized>(&self, port: &P, input: &KeyInput) -> RelayRoute {
        if port.is_top() {
            RelayRoute::Children(self.broadcast(port, input))
        } else {
            RelayRoute::Top(self.forward_to_top(port, input))
        }
    }

    /// Posts `input` to every immediate child; returns how many accepted.
    pub fn broadcast<P: MessagePort + ?Sized>(&self, port: &P, input: &KeyInput) -> usize {
        let message = RelayMessage::broadcast(input.clone(), self.frame_id.clone());
        let value = match message.to_value() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to encode relay message: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for index in 0..port.child_count() {
            match port.post_to_child(index, &value) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    if self.diagnostics {
                        tracing::debug!(
                            frame = %self.frame_id,
                            "postMessage to child {} failed: {}",
                            index,
                            e
                        );
                    }
                }
            }
        }
        delivered
    }

    /// Posts `input` to the top frame, flagged as relayed.
    pub fn forward_to_top<P: MessagePort + ?Sized>(&self, port: &P, input: &KeyInput) -> bool {
        let message = RelayMessage::to_top(input.clone(), self.frame_id.clone());
        let result = message.to_value().and_then(|value| port.post_to_top(&value));
        match result {
            Ok(()) => true,
            Err(e) => {
                if self.diagnostics {
                    tracing::debug!(frame = %self.frame_id, "postMessage to top failed: {}", e);
                }
                false
            }
        }
    }

    /// Validates an inbound payload and filters out our own messages.
    pub fn screen(&self, data: &Value) -> Inbound {
        match RelayMessage::from_value(data) {
            Ok(message) if message.origin_frame_id == self.frame_id => Inbound::SelfOrigin,
            Ok(message) => Inbound::Accepted(message),
            Err(e) => {
                tracing::trace!(frame = %self.frame_id, "Ignoring message: {}", e);
                Inbound::Foreign
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Records posts; children listed in `refusing` reject them.
    struct RecordingPort {
        top: bool,
        children: usize,
        refusing: Vec<usize>,
        to_children: Mutex<Vec<(usize, Value)>>,
        to_top: Mutex<Vec<Value>>,
    }

    impl RecordingPort {
        fn new(top: bool, children: usize) -> Self {
            Self {
                top,
                children,
                refusing: Vec::new(),
                to_children: Mutex::new(Vec::new()),
                to_top: Mutex::new(Vec::new()),
            }
        }
    }

    impl MessagePort for RecordingPort {
        fn is_top(&self) -> bool {
            self.top
        }

        fn child_count(&self) -> usize {
            self.children
        }

        fn post_to_child(&self, index: usize, message: &Value) -> Result<()> {
            if self.refusing.contains(&index) {
                return Err(Error::ChannelClosed(format!("child {}", index)));
            }
            self.to_children.lock().push((index, message.clone()));
            Ok(())
        }

        fn post_to_top(&self, message: &Value) -> Result<()> {
            self.to_top.lock().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn test_top_frame_broadcasts_to_children() {
        let relay = Relay::new(FrameId::new("top"), true);
        let port = RecordingPort::new(true, 3);

        let route = relay.hand_off(&port, &KeyInput::digit(2));

        assert_eq!(route, RelayRoute::Children(3));
        let sent = port.to_children.lock();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(_, v)| v["originFrameId"] == "top"));
        assert!(sent.iter().all(|(_, v)| v.get("relayed").is_none()));
        assert!(port.to_top.lock().is_empty());
    }

    #[test]
    fn test_nested_frame_sends_to_top_only() {
        let relay = Relay::new(FrameId::new("inner"), true);
        let port = RecordingPort::new(false, 2);

        let route = relay.hand_off(&port, &KeyInput::digit(1));

        assert_eq!(route, RelayRoute::Top(true));
        let sent = port.to_top.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["relayed"], true);
        assert_eq!(sent[0]["originFrameId"], "inner");
        assert!(port.to_children.lock().is_empty());
    }

    #[test]
    fn test_refused_child_does_not_stop_siblings() {
        let relay = Relay::new(FrameId::new("top"), true);
        let mut port = RecordingPort::new(true, 3);
        port.refusing = vec![1];

        assert_eq!(relay.broadcast(&port, &KeyInput::space()), 2);
        let indices: Vec<usize> = port.to_children.lock().iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_screen_drops_self_and_foreign_messages() {
        let relay = Relay::new(FrameId::new("me"), true);
        let own = RelayMessage::broadcast(KeyInput::digit(1), FrameId::new("me"))
            .to_value()
            .unwrap();
        let other = RelayMessage::broadcast(KeyInput::digit(1), FrameId::new("parent"))
            .to_value()
            .unwrap();

        assert_eq!(relay.screen(&own), Inbound::SelfOrigin);
        assert_eq!(relay.screen(&json!({ "hello": "page" })), Inbound::Foreign);
        assert!(matches!(relay.screen(&other), Inbound::Accepted(_)));
    }
}
