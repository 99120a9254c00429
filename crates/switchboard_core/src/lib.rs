//! # switchboard_core
//!
//! Routes chat prompts to specialist agents.
//!
//! A [`Router`] owns an agent [`Catalog`] and a [`SessionCache`], and turns
//! each [`UserMessage`] into an ordered list of [`AgentMessage`]s:
//!
//! - **Heuristic mode** matches keyword rules and asks every matching agent
//!   concurrently, or every agent when nothing matches.
//! - **Delegate mode** asks the orchestrator to pick one expert, asks that
//!   expert, then asks the orchestrator to synthesize the final answer.
//!
//! ```text
//! UserMessage ──▶ Router ──┬─▶ KeywordRules ──▶ join_all(agents) ──▶ [replies]
//!                          │
//!                          └─▶ orchestrator ──▶ expert ──▶ orchestrator
//!                                (routing)                  (synthesis)
//! ```
//!
//! Remote failures never escape [`Router::route_prompt`]; they come back as
//! error messages attributed to the agent that failed.

pub mod catalog;
pub mod error;
pub mod keywords;
pub mod registry;
pub mod router;
pub mod routing;
pub mod session;
pub mod types;

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult};
pub use keywords::{KeywordRule, KeywordRules};
pub use registry::{builtin_orchestrator, AgentDescriptor, AgentRegistry};
pub use router::{Router, RoutingMode};
pub use routing::{extract_json_object, parse_routing_reply, RoutingDecision};
pub use session::SessionCache;
pub use types::{AgentMessage, MessageKind, UserMessage};
