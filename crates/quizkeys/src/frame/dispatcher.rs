// Keyboard Dispatcher
//
// One instance per frame. Turns a keydown (or a relayed key) into either a
// click on the best matching quiz control, or a hand-off to the relay.
//
// Per keydown:
// 1. Text-entry targets are ignored outright
// 2. Scan + classify; not quiz context means relay and stop
// 3. Quiz context: note entry, prepare and maintain focus, map key to intent,
//    select, click
//
// The periodic poll runs the same focus maintenance without a key.

use crate::api::AgentOptions;
use crate::dom::{DomSurface, FocusOptions, NodeId};
use crate::frame::memo::{DetectionMemo, fingerprint};
use crate::frame::relay::{Inbound, MessagePort, Relay, RelayRoute};
use crate::protocol::{FrameId, Intent, KeyEvent, KeyInput};
use crate::quiz::classifier::{
    is_explain_label, is_hint_label, is_next_label, is_previous_label, label_starts_with_answer,
};
use crate::quiz::{Candidate, is_quiz_context, scan, select};
use serde_json::Value;

/// What a keydown led to in this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Target accepts text input; the event was left alone
    IgnoredTyping,
    /// Not quiz context here; the key was passed on
    Relayed(RelayRoute),
    /// The element was clicked and the default action suppressed
    Handled(NodeId),
    /// Quiz context, but no mapping or no matching control
    Unhandled,
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }
}

/// What an inbound relay message led to in this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Not a relay envelope
    Rejected,
    /// Sent by this very frame
    SelfOrigin,
    /// Not quiz context here; passed to this frame's children
    Rebroadcast(usize),
    Handled(NodeId),
    Unhandled,
}

/// Per-frame keyboard dispatcher
#[derive(Debug, Clone)]
pub struct KeyboardDispatcher {
    options: AgentOptions,
    memo: DetectionMemo,
    relay: Relay,
}

impl KeyboardDispatcher {
    pub fn new(frame_id: FrameId, options: AgentOptions) -> Self {
        let relay = Relay::new(frame_id, options.debug_enabled());
        Self {
            options,
            memo: DetectionMemo::new(),
            relay,
        }
    }

    pub fn frame_id(&self) -> &FrameId {
        self.relay.frame_id()
    }

    pub fn memo(&self) -> &DetectionMemo {
        &self.memo
    }

    pub fn options(&self) -> &AgentOptions {
        &self.options
    }

    /// Emits the one-time "keydown captured" diagnostic
    pub fn note_keydown<D, P>(&mut self, dom: &D, port: &P, input: &KeyInput)
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        if !self.options.debug_enabled() || !self.memo.mark_keydown_logged() {
            return;
        }
        tracing::info!(
            frame = %self.frame_id(),
            href = %dom.url(),
            is_top = port.is_top(),
            key = %input.key,
            code = %input.code,
            "keydown captured"
        );
    }

    /// Handles a physical keydown delivered to this frame.
    pub fn on_keydown<D, P>(&mut self, dom: &mut D, port: &P, event: &mut KeyEvent) -> KeyOutcome
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        if let Some(target) = event.target
            && is_text_entry(dom, target)
        {
            return KeyOutcome::IgnoredTyping;
        }

        let candidates = scan(dom);
        if !is_quiz_context(&candidates) {
            let route = self.relay.hand_off(port, &event.input);
            tracing::debug!(frame = %self.frame_id(), ?route, "not quiz context, relayed");
            return KeyOutcome::Relayed(route);
        }

        self.enter_quiz_context(dom, port, &candidates);
        let input = event.input.clone();
        match self.perform(dom, &input, &candidates, Some(event)) {
            Some(node) => KeyOutcome::Handled(node),
            None => KeyOutcome::Unhandled,
        }
    }

    /// Handles a payload arriving on the frame message channel.
    pub fn on_message<D, P>(&mut self, dom: &mut D, port: &P, data: &Value) -> MessageOutcome
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        let message = match self.relay.screen(data) {
            Inbound::Accepted(message) => message,
            Inbound::Foreign => return MessageOutcome::Rejected,
            Inbound::SelfOrigin => return MessageOutcome::SelfOrigin,
        };

        let candidates = scan(dom);
        if !is_quiz_context(&candidates) {
            // Keep searching downward
            let delivered = self.relay.broadcast(port, &message.input);
            return MessageOutcome::Rebroadcast(delivered);
        }

        self.enter_quiz_context(dom, port, &candidates);
        match self.perform(dom, &message.input, &candidates, None) {
            Some(node) => MessageOutcome::Handled(node),
            None => MessageOutcome::Unhandled,
        }
    }

    /// Periodic re-detection; keeps focus in a quiz frame without a key.
    pub fn poll<D, P>(&mut self, dom: &mut D, port: &P) -> bool
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        let candidates = scan(dom);
        if !is_quiz_context(&candidates) {
            return false;
        }
        self.enter_quiz_context(dom, port, &candidates);
        true
    }

    fn enter_quiz_context<D, P>(&mut self, dom: &mut D, port: &P, candidates: &[Candidate])
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        if self.memo.mark_detected() && self.options.debug_enabled() {
            tracing::info!(frame = %self.frame_id(), "quiz context detected");
        }
        self.log_detection(dom, port, candidates);
        self.ensure_focus(dom, candidates);
    }

    fn log_detection<D, P>(&mut self, dom: &D, port: &P, candidates: &[Candidate])
    where
        D: DomSurface + ?Sized,
        P: MessagePort + ?Sized,
    {
        let hash = fingerprint(candidates, self.options.fingerprint_len());
        if !self.memo.note_fingerprint(hash) || !self.options.debug_enabled() {
            return;
        }
        let labels: Vec<&str> = candidates
            .iter()
            .take(self.options.fingerprint_len())
            .map(|c| c.label.as_str())
            .collect();
        tracing::info!(
            frame = %self.frame_id(),
            href = %dom.url(),
            is_top = port.is_top(),
            candidate_count = candidates.len(),
            ?labels,
            "frame detected"
        );
    }

    /// Makes the document able to take programmatic focus; runs once.
    fn prepare_focus_root<D: DomSurface + ?Sized>(&mut self, dom: &mut D) {
        if !self.memo.mark_focus_prepared() {
            return;
        }
        if let Some(index) = dom.body_tab_index()
            && index < 0
            && let Err(e) = dom.set_body_tab_index(-1)
            && self.options.debug_enabled()
        {
            tracing::debug!(frame = %self.frame_id(), "prepare focus failed: {}", e);
        }
    }

    /// Moves focus into this frame unless it already has it.
    fn ensure_focus<D: DomSurface + ?Sized>(&mut self, dom: &mut D, candidates: &[Candidate]) {
        self.prepare_focus_root(dom);
        if dom.has_focus() {
            return;
        }

        let mut focused = false;
        if let Some(target) = candidates.iter().find(|c| dom.is_focusable(c.node)) {
            let options = FocusOptions {
                prevent_scroll: true,
            };
            focused = match dom.focus(target.node, Some(options)) {
                Ok(()) => true,
                Err(_) => match dom.focus(target.node, None) {
                    Ok(()) => true,
                    Err(e) => {
                        if self.options.debug_enabled() {
                            tracing::debug!(frame = %self.frame_id(), "element focus failed: {}", e);
                        }
                        false
                    }
                },
            };
        }

        if !focused
            && let Err(e) = dom.focus_frame()
            && self.options.debug_enabled()
        {
            tracing::debug!(frame = %self.frame_id(), "window focus failed: {}", e);
        }
    }

    /// Runs the action for `input`; returns the clicked element.
    ///
    /// The event, when present, is suppressed only after a successful click
    /// so a failed activation leaves the native behaviour intact.
    fn perform<D: DomSurface + ?Sized>(
        &self,
        dom: &mut D,
        input: &KeyInput,
        candidates: &[Candidate],
        event: Option<&mut KeyEvent>,
    ) -> Option<NodeId> {
        let intent = Intent::from_key(input)?;
        let chosen = resolve(intent, candidates)?;

        if let Err(e) = dom.click(chosen.node) {
            tracing::warn!(frame = %self.frame_id(), "click on '{}' failed: {}", chosen.label, e);
            return None;
        }
        if let Some(event) = event {
            event.prevent_default();
            event.stop_propagation();
        }
        tracing::debug!(frame = %self.frame_id(), ?intent, label = %chosen.label, "activated");
        Some(chosen.node)
    }
}

/// Picks the control for `intent` among `candidates`
pub fn resolve(intent: Intent, candidates: &[Candidate]) -> Option<&Candidate> {
    match intent {
        Intent::Next => select(candidates, is_next_label),
        Intent::Previous => select(candidates, is_previous_label),
        Intent::Answer(letter) => {
            select(candidates, |label| label_starts_with_answer(label, letter))
        }
        Intent::HintOrExplain => {
            select(candidates, is_hint_label).or_else(|| select(candidates, is_explain_label))
        }
    }
}

/// Inputs, text areas, selects and anything content-editable
pub fn is_text_entry<D: DomSurface + ?Sized>(dom: &D, node: NodeId) -> bool {
    if dom.is_content_editable(node) {
        return true;
    }
    matches!(
        dom.tag_name(node).as_deref(),
        Some("input" | "textarea" | "select")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::quiz::AnswerLetter;
    use url::Url;

    fn button(node: usize, label: &str) -> Candidate {
        Candidate {
            node: NodeId(node),
            label: label.to_string(),
            role: String::new(),
            tag: "button".to_string(),
            aria_label: String::new(),
            has_click_handler: false,
            source_url: Url::parse("https://quiz.example/").unwrap(),
        }
    }

    #[test]
    fn test_resolve_each_intent() {
        let candidates = vec![
            button(0, "A. Paris"),
            button(1, "B. Lyon"),
            button(2, "Previous"),
            button(3, "Next"),
            button(4, "Explain"),
        ];
        let node = |intent| resolve(intent, &candidates).map(|c| c.node);

        assert_eq!(node(Intent::Answer(AnswerLetter::A)), Some(NodeId(0)));
        assert_eq!(node(Intent::Answer(AnswerLetter::B)), Some(NodeId(1)));
        assert_eq!(node(Intent::Answer(AnswerLetter::C)), None);
        assert_eq!(node(Intent::Previous), Some(NodeId(2)));
        assert_eq!(node(Intent::Next), Some(NodeId(3)));
        // No "Hint" control, so "Explain" is used
        assert_eq!(node(Intent::HintOrExplain), Some(NodeId(4)));
    }

    #[test]
    fn test_hint_is_preferred_over_explain() {
        let candidates = vec![button(0, "Explain"), button(1, "Hint")];
        assert_eq!(
            resolve(Intent::HintOrExplain, &candidates).map(|c| c.node),
            Some(NodeId(1))
        );
    }
}
