//! Cross-crate scenario tests (spec §8): each file here drives
//! `marrow-program`, `marrow-solve`, and `marrow-ir` together the way a real
//! front end would, rather than exercising one crate's internals in
//! isolation the way each crate's own `#[cfg(test)]` modules already do.

#![cfg(test)]

mod support;

mod scenarios {
    mod exclusivity_end_to_end;
    mod label_mismatch;
    mod lambda_return_inference;
    mod member_overload;
    mod structural_conformance;
}
