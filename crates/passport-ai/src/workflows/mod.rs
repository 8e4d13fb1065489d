pub mod credentialing;
pub mod radiology;
