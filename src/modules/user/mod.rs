//! Registration, login and avatars.

mod controller;
mod dto;
mod entity;
mod service;

pub use controller::controller;
pub use dto::{CreateUserDto, LoggedUserRdo, LoginUserDto, UploadAvatarRdo, UserRdo, create_user_shape, login_user_shape};
pub use entity::{User, UserType, hash_password};
pub use service::{MemoryUserService, UserService};
