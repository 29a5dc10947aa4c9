pub mod agent;
pub mod api;
pub mod component;
pub mod tool;


#[cfg(test)]
#[path = "agent_test.rs"]
mod agent_test;
