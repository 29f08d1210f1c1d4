// FrameAgent - the per-frame content script
//
// Owns everything scoped to one frame's lifetime: its document, its message
// port and its dispatcher (which in turn owns the detection memo). The
// environment calls the four entry points below; nothing else is exposed.
//
// Reloading a frame means building a new agent, which resets the memo.

use crate::api::AgentOptions;
use crate::dom::DomSurface;
use crate::frame::dispatcher::{KeyOutcome, KeyboardDispatcher, MessageOutcome};
use crate::frame::relay::MessagePort;
use crate::protocol::{FrameId, KeyEvent};
use serde_json::Value;

pub struct FrameAgent<D, P> {
    dom: D,
    port: P,
    dispatcher: KeyboardDispatcher,
}

impl<D, P> FrameAgent<D, P>
where
    D: DomSurface,
    P: MessagePort,
{
    /// Creates an agent with a freshly generated frame id
    pub fn new(dom: D, port: P, options: AgentOptions) -> Self {
        Self::with_id(FrameId::generate(), dom, port, options)
    }

    pub fn with_id(frame_id: FrameId, dom: D, port: P, options: AgentOptions) -> Self {
        Self {
            dom,
            port,
            dispatcher: KeyboardDispatcher::new(frame_id, options),
        }
    }

    /// Script start: announce and run one detection pass.
    pub fn on_load(&mut self) -> bool {
        if self.dispatcher.options().debug_enabled() {
            tracing::info!(
                frame = %self.frame_id(),
                href = %self.dom.url(),
                is_top = self.port.is_top(),
                "content script loaded"
            );
        }
        self.poll()
    }

    /// Capturing keydown listener
    pub fn on_keydown(&mut self, event: &mut KeyEvent) -> KeyOutcome {
        self.dispatcher
            .note_keydown(&self.dom, &self.port, &event.input);
        self.dispatcher
            .on_keydown(&mut self.dom, &self.port, event)
    }

    /// Capturing message listener
    pub fn on_message(&mut self, data: &Value) -> MessageOutcome {
        self.dispatcher.on_message(&mut self.dom, &self.port, data)
    }

    /// Poll trigger tick; returns whether the frame is quiz context
    pub fn poll(&mut self) -> bool {
        self.dispatcher.poll(&mut self.dom, &self.port)
    }

    pub fn frame_id(&self) -> &FrameId {
        self.dispatcher.frame_id()
    }

    pub fn dispatcher(&self) -> &KeyboardDispatcher {
        &self.dispatcher
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_parts(self) -> (D, P) {
        (self.dom, self.port)
    }
}
