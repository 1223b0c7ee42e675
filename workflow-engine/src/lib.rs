pub mod action;
pub mod actor;
pub mod arguments;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod overlay;
pub mod parser;
pub mod pattern;
pub mod scheduler;
pub mod workflow;

pub use action::{ActionDispatch, ActionResult, Execution};
pub use actor::{ActorNode, ActorPayload, ActorSystem, ActorSystemBuilder};
pub use arguments::Arguments;
pub use config::EngineConfig;
pub use error::{WorkflowError, WorkflowResult};
pub use interpreter::{Interpreter, InterpreterActor};
pub use pattern::{matches_pattern, matches_pattern_default, BuiltinEvaluator, ExpressionEvaluator};
pub use scheduler::Scheduler;
pub use workflow::{Action, Transition, WorkflowModel};
