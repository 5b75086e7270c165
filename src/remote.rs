//! Remote backend gateway: the only module that talks HTTP.
//!
//! Every network interaction goes through the [`AudioApi`] trait so the
//! store and the synthesis coordinator can be exercised against in-memory
//! fakes; [`RemoteGateway`] is the reqwest implementation.

mod gateway;
mod wire;

pub use gateway::*;
pub use wire::*;
