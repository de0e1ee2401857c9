//! Source language front ends. Each lowers its concrete syntax tree into the
//! shared [`crate::uast`] model.

pub mod csharp;
