//! Bike Service Assistant
//!
//! The diagnosis and estimate engine behind the repair shop website:
//! - Answers conversational chat (greetings, pricing, booking) with canned replies
//! - Classifies problem descriptions against a static knowledge base
//! - Refines tips by brand, weather and severity
//! - Looks up service cost ranges by bike type and service type
//! - Logs every interaction without letting log failures reach the customer
//!
//! PIPELINE:
//! TEXT → ROUTE → CLASSIFY → REFINE → REPLY

pub mod api;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod conversational;
pub mod device;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod knowledge;
pub mod models;
pub mod refiner;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{classify, DiagnosticClassifier};
pub use conversational::{route_conversation, ConversationRouter, RouterConfig};
pub use engine::{AssistantEngine, AssistantService};
pub use estimator::estimate_cost;
pub use refiner::refine;
