//! Keyword-driven dialogue simulation: lexical classification, templated
//! reply selection and the artificial thinking delay.

pub mod analyzer;
pub mod delay;
pub mod language;
pub mod memory;
pub mod presentation;
pub mod selector;

pub use analyzer::classify;
pub use delay::{ respond, thinking_delay };
pub use selector::{ compose, ComposeOptions, Personality };
