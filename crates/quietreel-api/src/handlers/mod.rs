pub mod health;
pub mod remove_audio;
pub mod system;
