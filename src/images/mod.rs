//! Image discovery.
//!
//! Images are the files directly inside the configured directory whose
//! extension is in the configured list. The file name is the image id.

mod scan;
mod source;

pub use scan::{has_image_extension, scan_images, ImageFile};
pub use source::{DirectoryImageSource, ImageStatus, Overview};
