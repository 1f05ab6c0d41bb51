pub mod answer;
pub mod config;
pub mod corpus;
pub mod error;
pub mod image;
pub mod model;
pub mod rank;
pub mod server;
pub mod synth;
pub mod tokenize;
