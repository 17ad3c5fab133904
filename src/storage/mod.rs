pub mod cloudinary;
pub mod traits;

pub use cloudinary::CloudinaryStore;
pub use traits::MediaStore;
