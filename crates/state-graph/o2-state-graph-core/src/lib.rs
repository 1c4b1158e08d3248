//! Animation state graph for o2 actors.
//!
//! A `StateGraph` asset names states (bundles of clips) and timed transitions
//! between them. `AnimationStateGraphComponent` plans a route to a requested
//! state and cross-fades along it, one transition at a time.

pub mod animator;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod graph;
pub mod state;
pub mod state_player;
pub mod stored_graph;

pub use animator::Animator;
pub use component::AnimationStateGraphComponent;
pub use config::StateGraphConfig;
pub use error::{GraphError, Result};
pub use events::{EventHub, StateGraphEvent, SubscriptionId};
pub use graph::StateGraph;
pub use state::{GraphState, SubAnimation, Transition, TransitionDef, TransitionId};
pub use state_player::{ClipHost, StatePlayer};
pub use stored_graph::StoredGraph;
