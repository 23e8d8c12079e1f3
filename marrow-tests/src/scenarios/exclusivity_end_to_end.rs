//! The full mandatory-pass pipeline wired to a real
//! `marrow_program::DiagnosticSink` rather than a crate-local test stub
//! (spec §4.5 "each reports diagnostics through a shared sink"): two
//! overlapping `inout` accesses to the same parameter in one block must be
//! rejected, while the same two accesses split across blocks — each closed
//! before the next opens — must not be.

use marrow_program::{DiagnosticSink, Scope, Site};
use marrow_ir::{run_mandatory_passes, Instruction, InstructionKind, Linkage, Module, Operand};
use marrow_ty::{AccessEffect, BuiltinType, DeclId, Type};

fn access(address: Operand, effect: AccessEffect) -> Instruction {
    Instruction {
        kind: InstructionKind::Access { effect: Some(effect), address },
        result_type: None,
        site: Site(0),
    }
}

fn end_access(access: Operand) -> Instruction {
    Instruction { kind: InstructionKind::EndAccess { access }, result_type: None, site: Site(0) }
}

#[test]
fn overlapping_inout_accesses_in_one_block_are_rejected() {
    let mut module = Module::new();
    let f = module.get_or_create_function(
        DeclId(0),
        Site(0),
        Linkage::Internal,
        Vec::new(),
        Vec::new(),
        Type::Builtin(BuiltinType::Void),
        false,
    );
    let entry = f.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
    let subject = Operand::Parameter(entry, 0);
    f.append_instruction(entry, access(subject, AccessEffect::Inout));
    f.append_instruction(entry, access(subject, AccessEffect::Inout));
    f.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site: Site(0) });

    let mut sink = DiagnosticSink::new();
    run_mandatory_passes(&mut module, &mut sink);
    assert!(sink.has_errors());
}

#[test]
fn the_same_two_accesses_split_across_blocks_are_accepted() {
    let mut module = Module::new();
    let f = module.get_or_create_function(
        DeclId(0),
        Site(0),
        Linkage::Internal,
        Vec::new(),
        Vec::new(),
        Type::Builtin(BuiltinType::Void),
        false,
    );
    let entry = f.append_block(Scope(0), vec![Type::Builtin(BuiltinType::Word)]);
    let subject = Operand::Parameter(entry, 0);
    let first = f.append_instruction(entry, access(subject, AccessEffect::Inout));
    f.append_instruction(entry, end_access(Operand::Register(first)));
    let second_block = f.append_block(Scope(0), Vec::new());
    f.append_instruction(
        entry,
        Instruction { kind: InstructionKind::Branch { target: second_block, arguments: Vec::new() }, result_type: None, site: Site(0) },
    );
    let second = f.append_instruction(second_block, access(subject, AccessEffect::Inout));
    f.append_instruction(second_block, end_access(Operand::Register(second)));
    f.append_instruction(
        second_block,
        Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site: Site(0) },
    );

    let mut sink = DiagnosticSink::new();
    run_mandatory_passes(&mut module, &mut sink);
    assert!(!sink.has_errors());
}
