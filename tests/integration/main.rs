//! Integration tests

mod actions;
mod api_tests;
mod screens;
mod session_flow;
