// commands/mod.rs - Command Module Registry
// Declares the chat command modules registered by main.rs

pub mod playlist;       // Playlist duration lookup (command + plain message handling)
pub mod start;          // Greeting and help text
