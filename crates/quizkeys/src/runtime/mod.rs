// Frame runtime - hosting agents without a browser
//
// Architecture:
// - `MailboxPort`: MessagePort over tokio unbounded channels
// - `FrameTree`: builds a frame tree and pumps relay traffic deterministically
// - `FrameEventLoop`: async per-frame loop (keydowns, messages, poll timer)
// - `SharedDocument`: a document the host can mutate while a loop runs

pub mod event_loop;
pub mod port;
pub mod shared;
pub mod tree;

pub use event_loop::{FrameEventLoop, KeySender};
pub use port::{Inbox, Mailbox, MailboxPort, mailbox};
pub use shared::SharedDocument;
pub use tree::{Delivery, FrameIndex, FrameTree, MAX_SETTLE_ROUNDS};
