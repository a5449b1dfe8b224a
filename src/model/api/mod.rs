mod auth;
mod candidate;
mod coalition;
mod election;
mod results;
mod vote;

pub use auth::{
    AuthenticatedResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UserDescription,
    UserResponse,
};
pub use candidate::{
    CandidateDescription, CandidateDetailResponse, CandidateResponse, CandidateSpec,
    CoalitionSlate,
};
pub use coalition::{CoalitionDescription, CoalitionResponse, CoalitionSpec, CoalitionsResponse};
pub use election::{
    ElectionDescription, ElectionResponse, ElectionSpec, ElectionSummary, ElectionsResponse,
    StatusOverride,
};
pub use results::{tally_coalitions, CoalitionTally, ElectionResults, Stats, StatsResponse};
pub use vote::{Ack, VoteSpec, VoteStatus};
