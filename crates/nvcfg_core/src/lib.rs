//! Typed binary codec for nonvolatile configuration records.
//!
//! Records are decoded into a [`nv::Tree`] through a magic-keyed [`nv::GroupRegistry`], edited by dotted path, rendered
//! to text, and written back byte for byte.

/// Value model, codecs, record layouts, and registry.
pub mod nv;
