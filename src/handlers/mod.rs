// handlers/mod.rs - two security tiers
//
// public:    no authentication (/, /health, /auth/*)
// protected: bearer token + existing user (/users/*, /bookmarks/*)
//
// Handlers pass the caller id explicitly into every service call.
pub mod dto;
pub mod protected;
pub mod public;
