mod user;

pub use user::DbUser;
