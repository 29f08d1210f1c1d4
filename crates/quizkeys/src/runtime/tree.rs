// FrameTree - an in-process tree of frames with mailboxes
//
// Each frame gets its own `MemoryDocument`, `MailboxPort` and agent. Keys are
// pressed on one frame; any relay traffic they cause sits in the mailboxes
// until `settle` delivers it. Delivery order across frames is round-robin,
// which is one of the orders the real message channel allows.

use crate::api::AgentOptions;
use crate::dom::MemoryDocument;
use crate::error::{Error, Result};
use crate::frame::{FrameAgent, KeyOutcome, MessageOutcome};
use crate::protocol::{FrameId, KeyEvent, KeyInput};
use crate::runtime::port::{Inbox, Mailbox, MailboxPort, mailbox};
use std::fmt;

/// Upper bound on delivery rounds in one `settle` call.
///
/// Relay traffic only flows downward after the first hop, so a finite tree
/// settles in depth + 2 rounds; the bound guards against misbehaving pages.
pub const MAX_SETTLE_ROUNDS: usize = 64;

/// Position of a frame within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameIndex(usize);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame[{}]", self.0)
    }
}

/// One message delivered by [`FrameTree::settle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub frame: FrameIndex,
    pub outcome: MessageOutcome,
}

type Agent = FrameAgent<MemoryDocument, MailboxPort>;

struct FrameSlot {
    agent: Agent,
    mailbox: Mailbox,
    inbox: Option<Inbox>,
    parent: Option<FrameIndex>,
}

/// A frame tree built from in-memory documents.
///
/// # Example
///
/// ```ignore
/// use quizkeys::runtime::FrameTree;
/// use quizkeys::protocol::KeyInput;
///
/// let mut tree = FrameTree::new(AgentOptions::default());
/// let top = tree.add_top(top_doc)?;
/// let quiz = tree.add_child(top, quiz_doc)?;
/// tree.press(top, KeyInput::digit(1))?;
/// tree.settle();
/// assert_eq!(tree.document(quiz)?.clicks().len(), 1);
/// ```
pub struct FrameTree {
    options: AgentOptions,
    slots: Vec<Option<FrameSlot>>,
    top: Option<FrameIndex>,
}

impl FrameTree {
    pub fn new(options: AgentOptions) -> Self {
        Self {
            options,
            slots: Vec::new(),
            top: None,
        }
    }

    /// Adds the top frame; a tree has exactly one.
    pub fn add_top(&mut self, document: MemoryDocument) -> Result<FrameIndex> {
        if self.top.is_some() {
            return Err(Error::InvalidArgument("tree already has a top frame".to_string()));
        }
        let index = self.insert(document, MailboxPort::for_top(), None);
        self.top = Some(index);
        Ok(index)
    }

    /// Adds a frame nested under `parent`
    pub fn add_child(&mut self, parent: FrameIndex, document: MemoryDocument) -> Result<FrameIndex> {
        let top = self
            .top
            .ok_or_else(|| Error::InvalidArgument("add the top frame first".to_string()))?;
        self.slot(parent)?;
        let top_slot = self.slot(top)?;
        let port = MailboxPort::for_nested(top_slot.agent.frame_id().clone(), top_slot.mailbox.clone());

        let index = self.insert(document, port, Some(parent));
        let child = self.slot(index)?;
        let (child_id, child_mailbox) = (child.agent.frame_id().clone(), child.mailbox.clone());
        self.slot(parent)?
            .agent
            .port()
            .attach_child(child_id, child_mailbox);
        Ok(index)
    }

    /// Tears a frame and its descendants down; queued messages for them are dropped.
    pub fn remove(&mut self, frame: FrameIndex) -> Result<()> {
        let slot = self.slot(frame)?;
        let (frame_id, parent) = (slot.agent.frame_id().clone(), slot.parent);
        if let Some(parent) = parent {
            self.slot(parent)?.agent.port().detach_child(&frame_id);
        }
        let children: Vec<FrameIndex> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match slot {
                Some(slot) if slot.parent == Some(frame) => Some(FrameIndex(i)),
                _ => None,
            })
            .collect();
        for child in children {
            self.remove(child)?;
        }
        self.slots[frame.0] = None;
        if self.top == Some(frame) {
            self.top = None;
        }
        tracing::debug!("{} ({}) removed", frame, frame_id);
        Ok(())
    }

    /// Closes a frame's mailbox while leaving it linked, so posts to it
    /// fail the way posts into an unreachable frame do.
    pub fn close_mailbox(&mut self, frame: FrameIndex) -> Result<()> {
        self.slot_mut(frame)?.inbox = None;
        Ok(())
    }

    /// Runs every frame's load hook, top first
    pub fn load_all(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.agent.on_load();
        }
    }

    /// One poll tick in every frame; returns the frames that are quiz context
    pub fn poll_all(&mut self) -> Vec<FrameIndex> {
        let mut quiz_frames = Vec::new();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if let Some(slot) = slot
                && slot.agent.poll()
            {
                quiz_frames.push(FrameIndex(i));
            }
        }
        quiz_frames
    }

    /// Delivers a keydown to `frame` with no particular target element
    pub fn press(&mut self, frame: FrameIndex, input: KeyInput) -> Result<KeyOutcome> {
        let mut event = KeyEvent::new(input, None);
        self.dispatch_key(frame, &mut event)
    }

    /// Delivers a prepared keydown to `frame`
    pub fn dispatch_key(&mut self, frame: FrameIndex, event: &mut KeyEvent) -> Result<KeyOutcome> {
        Ok(self.slot_mut(frame)?.agent.on_keydown(event))
    }

    /// Delivers queued relay messages until every mailbox is empty.
    pub fn settle(&mut self) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        for _ in 0..MAX_SETTLE_ROUNDS {
            let mut delivered_this_round = false;
            for (i, slot) in self.slots.iter_mut().enumerate() {
                let Some(slot) = slot else { continue };
                let Some(inbox) = slot.inbox.as_mut() else {
                    continue;
                };
                let mut pending = Vec::new();
                while let Ok(message) = inbox.try_recv() {
                    pending.push(message);
                }
                for message in pending {
                    delivered_this_round = true;
                    let outcome = slot.agent.on_message(&message);
                    deliveries.push(Delivery {
                        frame: FrameIndex(i),
                        outcome,
                    });
                }
            }
            if !delivered_this_round {
                return deliveries;
            }
        }
        tracing::warn!(
            "relay traffic still pending after {} rounds; leaving it queued",
            MAX_SETTLE_ROUNDS
        );
        deliveries
    }

    pub fn top(&self) -> Option<FrameIndex> {
        self.top
    }

    pub fn agent(&self, frame: FrameIndex) -> Result<&Agent> {
        Ok(&self.slot(frame)?.agent)
    }

    pub fn frame_id(&self, frame: FrameIndex) -> Result<&FrameId> {
        Ok(self.slot(frame)?.agent.frame_id())
    }

    pub fn document(&self, frame: FrameIndex) -> Result<&MemoryDocument> {
        Ok(self.slot(frame)?.agent.dom())
    }

    pub fn document_mut(&mut self, frame: FrameIndex) -> Result<&mut MemoryDocument> {
        Ok(self.slot_mut(frame)?.agent.dom_mut())
    }

    /// Raw mailbox of `frame`, for injecting page traffic
    pub fn mailbox(&self, frame: FrameIndex) -> Result<Mailbox> {
        Ok(self.slot(frame)?.mailbox.clone())
    }

    fn insert(
        &mut self,
        document: MemoryDocument,
        port: MailboxPort,
        parent: Option<FrameIndex>,
    ) -> FrameIndex {
        let (tx, rx) = mailbox();
        let agent = FrameAgent::new(document, port, self.options.clone());
        let index = FrameIndex(self.slots.len());
        self.slots.push(Some(FrameSlot {
            agent,
            mailbox: tx,
            inbox: Some(rx),
            parent,
        }));
        index
    }

    fn slot(&self, frame: FrameIndex) -> Result<&FrameSlot> {
        self.slots
            .get(frame.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown {}", frame)))
    }

    fn slot_mut(&mut self, frame: FrameIndex) -> Result<&mut FrameSlot> {
        self.slots
            .get_mut(frame.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown {}", frame)))
    }
}
