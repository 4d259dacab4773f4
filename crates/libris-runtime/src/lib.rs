//! The Libris reasoning runtime
//!
//! The ReAct-style loop that alternates model calls with tool dispatch,
//! the isolated output parser, the objective planner, and the `Assistant`
//! facade that composes gate, memory, registry, and collector into one
//! context object.

pub mod assistant;
pub mod loop_runner;
pub mod parser;
pub mod planner;

pub use assistant::{Assistant, AssistantConfig, MemoryOverview};
pub use loop_runner::{LoopConfig, ReasoningLoop};
pub use parser::{OutputParser, ParsedModelOutput};
pub use planner::Planner;
