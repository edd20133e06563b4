//! Domain models shared across crates.

pub mod reservation;
pub mod thumbnail;
pub mod upload;
pub mod user;

pub use reservation::{Reservation, ReservationFilter};
pub use thumbnail::{ThumbnailVariants, ThumbnailVariantsError};
pub use upload::{UploadResult, UploadSource, UploadStatus, UploadTask};
pub use user::{CreateUserRequest, PatchUserRequest, UpdateUserRequest};
