//! Native module build pipeline.
//!
//! SDK discovery, CMake argument assembly and the interrogate binding
//! generator. Process execution itself lives in [`crate::util::process`].

pub mod cmake;
pub mod context;
pub mod interrogate;
pub mod sdk;
pub mod toolchain;

pub use cmake::CMake;
pub use context::BuildContext;
pub use sdk::SdkLayout;
pub use toolchain::{HostOs, OptionalLib, SdkInfo};
