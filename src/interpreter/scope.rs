/// The `Scope` type: layered variables, functions and rulesets.
///
/// Lookups walk from a child frame to the root and stop at the first frame
/// where the name is bound or deleted.
pub mod core;

/// Function descriptors: signatures, bodies and builder methods.
pub mod descriptor;

/// Inference of whether a function or tree can produce random results.
pub mod randomness;
