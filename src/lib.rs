//! Ditherkit - palette quantization and dithering for PNG images
//!
//! Application layer around the `palette-dither` engine: YAML
//! configuration, the named algorithm catalog, PNG input and indexed-PNG
//! output, and whole-image rendering with optional slicing.
//! This library exposes modules for the CLI and integration testing.

pub mod catalog;
pub mod config;
pub mod error;
pub mod image_io;
pub mod render;
