//! Tempo filter construction

pub mod chain;

pub use chain::{
    build_chain, build_chain_with_cap, FilterChain, FilterStage, DEFAULT_MAX_SLOWDOWN_STAGES,
};
