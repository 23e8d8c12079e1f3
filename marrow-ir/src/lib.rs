//! The typed IR (spec §3-§4.5): functions built from blocks of arena-identified
//! instructions with maintained def-use chains, the five mandatory passes
//! that legalize a function before it can be emitted, and synthesis of the
//! deinitializers and move operators a `movable` conformance needs but a
//! program did not write by hand.
//!
//! Grounded on the teacher's `chalk-ir` for the identity/arena shape (stable
//! ids separated from mutable storage) and on the wider pack's MIR-pass
//! convention for `pass`/`passes` (chalk itself has no IR layer to imitate
//! there).

pub mod function;
pub mod ids;
pub mod instruction;
pub mod module;
pub mod operand;
pub mod pass;
pub mod passes;
pub mod provenance;
pub mod synthetic;

pub use function::{Block, Function, Linkage};
pub use ids::{BlockId, InstId};
pub use instruction::{Instruction, InstructionKind};
pub use module::Module;
pub use operand::{Constant, Operand, Use};
pub use pass::{run_mandatory_passes, Changed, Diagnostics, MandatoryPass};
pub use provenance::provenance;
pub use synthetic::SyntheticCache;

#[cfg(test)]
mod tests {
    use marrow_program::{DeclKind, Scope, Site, TypedProgram};
    use marrow_ty::{AccessEffect, BuiltinType, CallableParameter, ParameterType, Type};

    use super::*;

    fn word_param() -> CallableParameter {
        CallableParameter {
            label: None,
            ty: Type::Parameter(ParameterType { effect: AccessEffect::Sink, bare: Box::new(Type::Builtin(BuiltinType::Word)) }),
            has_default: false,
        }
    }

    #[test]
    fn use_chain_stays_consistent_after_insert_and_remove() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("f", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
        let access = function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Let), address: Operand::Parameter(entry, 0) }, result_type: Some(Type::Builtin(BuiltinType::Word)), site },
        );
        let end = function.append_instruction(entry, Instruction { kind: InstructionKind::EndAccess { access: Operand::Register(access) }, result_type: None, site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        assert_eq!(function.uses_of(Operand::Register(access)).len(), 1);
        function.remove_instruction(entry, end);
        assert!(function.uses_of(Operand::Register(access)).is_empty());
        function.remove_instruction(entry, access);
        assert_eq!(function.block(entry).instructions().len(), 1);
    }

    #[test]
    fn provenance_recurses_through_chained_projections() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("g", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Tuple(marrow_ty::TupleType { elements: vec![] })]);
        let base = Operand::Parameter(entry, 0);
        let field = function.append_instruction(entry, Instruction { kind: InstructionKind::Project { base, field: 0 }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        let advanced = function.append_instruction(entry, Instruction { kind: InstructionKind::AdvanceByBytes { base: Operand::Register(field), bytes: 8 }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        let roots = provenance(function, Operand::Register(advanced));
        assert_eq!(roots, vec![base]);
    }

    #[test]
    fn dead_code_removal_deletes_unused_pure_instructions_and_unreachable_blocks() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("h", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Tuple(marrow_ty::TupleType { elements: vec![] })]);
        let dead = function.append_block(Scope(0), vec![]);
        function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Project { base: Operand::Parameter(entry, 0), field: 0 }, result_type: Some(Type::Builtin(BuiltinType::Word)), site },
        );
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });
        function.append_instruction(dead, Instruction { kind: InstructionKind::Unreachable, result_type: None, site });

        struct Sink;
        impl Diagnostics for Sink {
            fn report(&mut self, _site: Site, _message: String) {}
        }
        use crate::passes::dce::DeadCodeRemoval;
        let changed = MandatoryPass::run(&DeadCodeRemoval, function, &mut Sink);
        assert_eq!(changed, Changed::Yes);
        assert_eq!(function.block(entry).instructions().len(), 1);
        assert!(function.block(dead).is_removed());
    }

    #[test]
    fn access_reification_infers_sink_for_moved_from_and_set_for_write_target() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("k", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param(), word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word), Type::Builtin(BuiltinType::Word)]);
        let moved_access = function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Access { effect: None, address: Operand::Parameter(entry, 0) }, result_type: Some(Type::Builtin(BuiltinType::Word)), site },
        );
        function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Move { target: Operand::Parameter(entry, 1), value: Operand::Register(moved_access) }, result_type: None, site },
        );
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        use crate::passes::access::AccessReification;
        struct Sink;
        impl Diagnostics for Sink {
            fn report(&mut self, _site: Site, _message: String) {}
        }
        MandatoryPass::run(&AccessReification, function, &mut Sink);
        match &function.inst(moved_access).kind {
            InstructionKind::Access { effect, .. } => assert_eq!(*effect, Some(AccessEffect::Sink)),
            _ => panic!("expected an access instruction"),
        }
    }

    #[test]
    fn borrow_closing_inserts_exactly_one_end_access_per_access() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("m", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
        let access = function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Let), address: Operand::Parameter(entry, 0) }, result_type: Some(Type::Builtin(BuiltinType::Word)), site },
        );
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        use crate::passes::borrow::BorrowClosing;
        struct Sink;
        impl Diagnostics for Sink {
            fn report(&mut self, _site: Site, _message: String) {}
        }
        MandatoryPass::run(&BorrowClosing, function, &mut Sink);
        let end_accesses = function
            .block(entry)
            .instructions()
            .iter()
            .filter(|id| matches!(function.inst(**id).kind, InstructionKind::EndAccess { access: a } if a == Operand::Register(access)))
            .count();
        assert_eq!(end_accesses, 1);
    }

    #[test]
    fn object_state_normalization_legalizes_first_write_as_initialize_and_second_as_assign() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let decl = program.declare("n", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param(), word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word), Type::Builtin(BuiltinType::Word)]);
        let target = Operand::Parameter(entry, 0);
        let first = function.append_instruction(entry, Instruction { kind: InstructionKind::Move { target, value: Operand::Parameter(entry, 1) }, result_type: None, site });
        let second = function.append_instruction(entry, Instruction { kind: InstructionKind::Move { target, value: Operand::Parameter(entry, 1) }, result_type: None, site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        use crate::passes::object_state::ObjectStateNormalization;
        struct Sink;
        impl Diagnostics for Sink {
            fn report(&mut self, _site: Site, _message: String) {}
        }
        MandatoryPass::run(&ObjectStateNormalization, function, &mut Sink);
        assert!(matches!(function.inst(first).kind, InstructionKind::Initialize { .. }));
        assert!(matches!(function.inst(second).kind, InstructionKind::Assign { .. }));
    }

    #[test]
    fn exclusivity_rejects_overlapping_inout_in_one_block_but_accepts_split_across_blocks() {
        let mut program = TypedProgram::new();
        let site = Site(0);

        // Overlapping within a single block: rejected.
        let mut module = Module::new();
        let decl = program.declare("overlap", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
        let addr = Operand::Parameter(entry, 0);
        let a = function.append_instruction(entry, Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Inout), address: addr }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        let b = function.append_instruction(entry, Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Inout), address: addr }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::EndAccess { access: Operand::Register(b) }, result_type: None, site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::EndAccess { access: Operand::Register(a) }, result_type: None, site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        use crate::passes::exclusivity::ExclusivityEnforcement;
        struct Counting(u32);
        impl Diagnostics for Counting {
            fn report(&mut self, _site: Site, _message: String) {
                self.0 += 1;
            }
        }
        let mut sink = Counting(0);
        MandatoryPass::run(&ExclusivityEnforcement, function, &mut sink);
        assert!(sink.0 >= 1);

        // The same two accesses, but closed before the second one opens (as
        // borrow closing would do across a block boundary): accepted.
        let mut module = Module::new();
        let decl = program.declare("split", DeclKind::Function, Vec::new(), Type::Builtin(BuiltinType::Void), site);
        let function = module.get_or_create_function(decl, site, Linkage::Internal, Vec::new(), vec![word_param()], Type::Builtin(BuiltinType::Void), false);
        let entry = function.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
        let addr = Operand::Parameter(entry, 0);
        let a = function.append_instruction(entry, Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Inout), address: addr }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::EndAccess { access: Operand::Register(a) }, result_type: None, site });
        let b = function.append_instruction(entry, Instruction { kind: InstructionKind::Access { effect: Some(AccessEffect::Inout), address: addr }, result_type: Some(Type::Builtin(BuiltinType::Word)), site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::EndAccess { access: Operand::Register(b) }, result_type: None, site });
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });

        let mut sink = Counting(0);
        MandatoryPass::run(&ExclusivityEnforcement, function, &mut sink);
        assert_eq!(sink.0, 0);
    }

    #[test]
    fn synthesized_deinitializer_recurses_through_tuple_elements() {
        let mut module = Module::new();
        let mut program = TypedProgram::new();
        let site = Site(0);
        let subject = Type::Tuple(marrow_ty::TupleType {
            elements: vec![
                marrow_ty::TupleElement { label: None, ty: Type::Builtin(BuiltinType::Word) },
                marrow_ty::TupleElement { label: None, ty: Type::Builtin(BuiltinType::Bool) },
            ],
        });
        let mut cache = SyntheticCache::new();
        let decl = cache.deinitializer_for(&mut program, &mut module, &subject, site);
        let function = module.function(decl).unwrap();
        let entry = function.entry().unwrap();
        let calls = function
            .block(entry)
            .instructions()
            .iter()
            .filter(|id| matches!(function.inst(**id).kind, InstructionKind::Call { .. }))
            .count();
        assert_eq!(calls, 2);
        assert_eq!(cache.deinitializer_for(&mut program, &mut module, &subject, site), decl);
    }
}
