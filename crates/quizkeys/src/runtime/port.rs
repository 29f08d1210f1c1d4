// MailboxPort - MessagePort over tokio unbounded channels
//
// Every frame owns one mailbox (the receiving half). A port holds sending
// halves to the top frame's mailbox and to each immediate child's mailbox.
// Sends never block; a send to a mailbox whose frame is gone fails and the
// relay skips that frame.

use crate::error::{Error, Result};
use crate::frame::MessagePort;
use crate::protocol::FrameId;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Sending half of a frame's mailbox
pub type Mailbox = mpsc::UnboundedSender<Value>;

/// Receiving half of a frame's mailbox
pub type Inbox = mpsc::UnboundedReceiver<Value>;

/// Creates a mailbox pair for one frame
pub fn mailbox() -> (Mailbox, Inbox) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Clone)]
struct Link {
    frame_id: FrameId,
    mailbox: Mailbox,
}

/// Message port of one frame.
///
/// The child list is shared so the tree builder can attach frames created
/// after the port was handed to the agent.
#[derive(Debug, Clone)]
pub struct MailboxPort {
    top: Option<Link>,
    children: Arc<Mutex<Vec<Link>>>,
}

impl MailboxPort {
    /// Port of the top frame
    pub fn for_top() -> Self {
        Self {
            top: None,
            children: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Port of a nested frame that reports to `top`
    pub fn for_nested(top_id: FrameId, top: Mailbox) -> Self {
        Self {
            top: Some(Link {
                frame_id: top_id,
                mailbox: top,
            }),
            children: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn attach_child(&self, frame_id: FrameId, mailbox: Mailbox) {
        self.children.lock().push(Link { frame_id, mailbox });
    }

    /// Unlinks a child; returns whether it was attached
    pub fn detach_child(&self, frame_id: &FrameId) -> bool {
        let mut children = self.children.lock();
        let before = children.len();
        children.retain(|link| &link.frame_id != frame_id);
        children.len() != before
    }

    pub fn child_ids(&self) -> Vec<FrameId> {
        self.children
            .lock()
            .iter()
            .map(|link| link.frame_id.clone())
            .collect()
    }
}

impl MessagePort for MailboxPort {
    fn is_top(&self) -> bool {
        self.top.is_none()
    }

    fn child_count(&self) -> usize {
        self.children.lock().len()
    }

    fn post_to_child(&self, index: usize, message: &Value) -> Result<()> {
        let children = self.children.lock();
        let link = children
            .get(index)
            .ok_or_else(|| Error::InvalidArgument(format!("no child frame at index {}", index)))?;
        link.mailbox
            .send(message.clone())
            .map_err(|_| Error::ChannelClosed(link.frame_id.to_string()))
    }

    fn post_to_top(&self, message: &Value) -> Result<()> {
        let link = self
            .top
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("top frame has no parent to post to".to_string()))?;
        link.mailbox
            .send(message.clone())
            .map_err(|_| Error::ChannelClosed(link.frame_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_to_child_and_top() {
        let (top_tx, mut top_rx) = mailbox();
        let (child_tx, mut child_rx) = mailbox();

        let nested = MailboxPort::for_nested(FrameId::new("top"), top_tx);
        nested.attach_child(FrameId::new("grandchild"), child_tx);

        nested.post_to_top(&json!({ "n": 1 })).unwrap();
        nested.post_to_child(0, &json!({ "n": 2 })).unwrap();

        assert_eq!(top_rx.try_recv().unwrap(), json!({ "n": 1 }));
        assert_eq!(child_rx.try_recv().unwrap(), json!({ "n": 2 }));
        assert!(!nested.is_top());
    }

    #[test]
    fn test_closed_mailbox_reports_channel_closed() {
        let port = MailboxPort::for_top();
        let (tx, rx) = mailbox();
        port.attach_child(FrameId::new("gone"), tx);
        drop(rx);

        assert!(matches!(
            port.post_to_child(0, &json!({})),
            Err(Error::ChannelClosed(id)) if id == "gone"
        ));
        assert!(port.post_to_top(&json!({})).is_err());
    }

    #[test]
    fn test_detach_child() {
        let port = MailboxPort::for_top();
        let (tx, _rx) = mailbox();
        port.attach_child(FrameId::new("a"), tx);

        assert!(port.detach_child(&FrameId::new("a")));
        assert!(!port.detach_child(&FrameId::new("a")));
        assert_eq!(port.child_count(), 0);
    }
}
