// Frame layer - per-frame state, key dispatch and cross-frame relay
//
// Architecture:
// - `FrameAgent` is the entry point the environment drives
// - `KeyboardDispatcher` holds the frame's `DetectionMemo` and `Relay`
// - `MessagePort` is the outbound channel seam, implemented by the runtime

pub mod agent;
pub mod dispatcher;
pub mod memo;
pub mod relay;

pub use agent::FrameAgent;
pub use dispatcher::{KeyOutcome, KeyboardDispatcher, MessageOutcome, is_text_entry, resolve};
pub use memo::DetectionMemo;
pub use relay::{Inbound, MessagePort, Relay, RelayRoute};
