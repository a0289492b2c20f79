pub mod conversation;
pub mod intent;
pub mod slot;
