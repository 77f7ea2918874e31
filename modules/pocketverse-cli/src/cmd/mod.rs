pub mod chat;
pub mod show;
pub mod social;
pub mod world;
