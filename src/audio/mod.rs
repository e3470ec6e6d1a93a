pub mod analysis;
pub mod error;
pub mod features;
pub mod mfcc;
pub mod onset;
pub mod pitch;
pub mod sample;
pub mod session;
pub mod signal;
pub mod spectral;
pub mod time_domain;
pub mod transform;
pub mod window;
