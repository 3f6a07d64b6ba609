//! Flutter/Xcode IPA build and publish pipeline for TalkOne
//!
//! This crate provides the iOS-specific pieces:
//! - Flutter stage builders (clean, pub get, release build)
//! - Xcode stage builders (archive, export) and toolchain checks
//! - Artifact publishing (metadata-preserving copy)
//! - The full build runner and the standalone publisher

pub mod flutter;
pub mod ipa;
pub mod publish;
pub mod xcode;
