//! Tool adapters
//!
//! - [`FunctionToolInvoker`]: in-process tools backed by async closures
//! - [`demo_tools`]: the tool set the CLI runs conversations against

pub mod demo;
mod function_invoker;

pub use demo::demo_tools;
pub use function_invoker::FunctionToolInvoker;
