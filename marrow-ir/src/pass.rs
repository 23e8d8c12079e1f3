//! The mandatory-pass pipeline (spec §4.5): a small `TransformPass`-style
//! trait run function-at-a-time, modeled on the wider pack's MIR pass
//! convention (a `Changed` flag plus a shared diagnostics sink) rather than
//! anything from the constraint-solving teacher, since chalk has no IR
//! layer to imitate here.

use marrow_program::Site;

use crate::function::Function;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Changed {
    Yes,
    No,
}

impl Changed {
    pub fn or(self, other: Changed) -> Changed {
        if self == Changed::Yes || other == Changed::Yes {
            Changed::Yes
        } else {
            Changed::No
        }
    }
}

/// Object-safe diagnostic sink IR passes report through, so a pass does not
/// need to know the caller's diagnostic renderer (spec's SPEC_FULL §10.3,
/// mirroring the teacher's `RustIrDatabase` trait-object collaborator
/// pattern).
pub trait Diagnostics {
    fn report(&mut self, site: Site, message: String);
}

impl Diagnostics for marrow_program::DiagnosticSink {
    fn report(&mut self, site: Site, message: String) {
        marrow_program::DiagnosticSink::report(self, marrow_program::Diagnostic::error(site, message));
    }
}

pub trait MandatoryPass {
    fn name(&self) -> &'static str;

    fn run(&self, function: &mut Function, diagnostics: &mut dyn Diagnostics) -> Changed;
}

/// Runs every mandatory pass over every function in order (spec §4.5
/// "Applied in order; each reports diagnostics through a shared sink").
pub fn run_mandatory_passes(
    module: &mut crate::module::Module,
    diagnostics: &mut dyn Diagnostics,
) {
    let passes: Vec<Box<dyn MandatoryPass>> = vec![
        Box::new(crate::passes::dce::DeadCodeRemoval),
        Box::new(crate::passes::access::AccessReification),
        Box::new(crate::passes::borrow::BorrowClosing),
        Box::new(crate::passes::object_state::ObjectStateNormalization),
        Box::new(crate::passes::exclusivity::ExclusivityEnforcement),
    ];
    for (id, function) in module.functions_mut() {
        for pass in &passes {
            let changed = pass.run(function, diagnostics);
            tracing::debug!(function = ?id, pass = pass.name(), changed = ?changed, "ran mandatory pass");
        }
    }
}
