mod checkpoint;
mod user;

pub use checkpoint::CheckpointRepository;
pub use user::UserRepository;
