// settings-sync-host library
// Serves settings pages, their JSON document and live updates

// Configuration
pub mod config;

// HTTP endpoints and server-sent events
pub mod api;

// Event fan-out
pub mod hub;

// Settings persistence
pub mod settings;

// Embedded page assets (single-binary distribution)
pub mod embedded;
