mod election;

pub use election::ElectionStatus;
