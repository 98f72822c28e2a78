mod common;
mod engine;
mod risk;
