pub mod controller;
pub mod proposal;
pub mod recommend;

pub use controller::{Phase, PhaseController, TransitionBlocked};
pub use proposal::{
    assemble_proposal, InsuranceOffer, MortgageOffer, ProposalDocument, SavingsPlanItem,
    SavingsPlanKind, SignatureBlock,
};
pub use recommend::{
    build_recommendations, CapitalRecommendation, CoverageKind, InsuranceRecommendation,
    RecommendationSet,
};
