//! sdvgen-codegen - Source generation from resolved interface models
//!
//! This crate renders an [`sdvgen_core::Interface`] into:
//! - Franca IDL and SOME/IP deployment files ([`franca`])
//! - a JNI C++ bridge over the CommonAPI proxy ([`fragments`], [`marshal`])
//! - the Java native declarations, Android service stub, and Parcelable
//!   data classes ([`java`])
//! - AIDL interfaces and parcelable declarations ([`aidl`])
//!
//! [`bridge_artifacts`] and [`idl_artifacts`] assemble everything for one
//! interface; members that cannot be generated are reported without
//! affecting the others.
//!
//! ```
//! use sdvgen_codegen::naming::{capitalize, jni_symbol};
//!
//! assert_eq!(capitalize("speed"), "Speed");
//! assert_eq!(
//!     jni_symbol("com.example", "NavNative", "get_speed"),
//!     "Java_com_example_NavNative_get_1speed"
//! );
//! ```

pub mod aidl;
mod assembler;
pub mod emit;
mod error;
pub mod fragments;
pub mod franca;
pub mod java;
pub mod jvm_types;
pub mod marshal;
pub mod naming;
pub mod native_types;
mod options;

pub use assembler::{
    GeneratedFile, InterfaceArtifacts, bridge_artifacts, data_classes, idl_artifacts, member_fragments,
    render_bridge_cpp,
};
pub use error::{CodegenError, CodegenResult};
pub use fragments::{BridgeContext, Callback, DataClass, Entry, MemberFragments, Param};
pub use jvm_types::{JvmKind, JvmType};
pub use options::{BridgeOptions, DEFAULT_JNI_VERSION, JNI_VERSIONS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BridgeOptions, CodegenError, CodegenResult, GeneratedFile, InterfaceArtifacts, bridge_artifacts,
        idl_artifacts,
    };
}
