//! The presence-transition engine.
//!
//! [`evaluator::TransitionEvaluator`] is the pure decision core: given a
//! watch, an observed status and the current time it produces the alert
//! actions and the updated record. [`sweeper::Sweeper`] drives it on a
//! fixed interval across all registered watches and applies the results
//! through the repository and the notification sink.

pub mod evaluator;
pub mod sweeper;

pub use evaluator::{AlertAction, Evaluation, TransitionEvaluator};
pub use sweeper::Sweeper;
