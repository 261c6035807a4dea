/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! HTTP-binding protocol code generator.
//!
//! Consumes a shape model (a graph of structures, unions, lists, maps, and
//! simple shapes annotated with HTTP traits) and emits, for every operation,
//! the Rust marshalling code that serializes a request onto the wire and
//! deserializes a response or error back into typed data. Emitted code is
//! written against the capabilities in the `smithy-httpbind` runtime crate
//! and never against a concrete wire format.
//!
//! The pipeline is:
//!
//! 1. [`walk::ReachabilityWalker`] discovers which shapes need generated
//!    code, exactly once each, cycles and shared references included.
//! 2. [`binding::HttpBindingIndex`] classifies every member of a bound
//!    structure into its wire location.
//! 3. [`descriptor`] turns document-bound member sets into the ordered
//!    field descriptors shared by each serializer/deserializer pair.
//! 4. The emitters in [`gen`] render one source unit per (de)serializer.
//!
//! Generation is a pure function of the model: shapes are visited in
//! lexicographic identity order and the output is byte-stable across runs.

pub mod binding;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod gen;
pub mod model;
pub mod timestamp;
pub mod uri;
pub mod walk;

pub use context::{CodegenSettings, GenerationContext, GenerationReport, SourceUnit};
pub use error::Error;
pub use gen::generate;
