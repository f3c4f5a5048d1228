pub mod config;
pub mod handler;
pub mod reporter;
pub mod rng;
pub mod round;
pub mod rtp;
pub mod server;
pub mod types;

/// Request path of the game endpoint.
pub const GAME_PATH: &str = "/game";

/// Game endpoint of a server running with the default config.
pub const DEFAULT_GAME_URL: &str = "ws://127.0.0.1:8080/game";
