pub mod config;
pub mod serve;
pub mod sign;

/// `DEBUG=true` in the environment turns on debug mode.
pub fn debug_from_env() -> bool {
    std::env::var("DEBUG").is_ok_and(|v| v == "true")
}
