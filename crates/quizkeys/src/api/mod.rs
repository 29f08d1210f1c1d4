// Public API types module
//
// Configuration shared by every frame agent.

pub mod agent_options;

pub use agent_options::AgentOptions;
