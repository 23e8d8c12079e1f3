//! Textual IR emission (spec §6 "IR textual form"): "modules serialize as a
//! function list; each function shows signature, block labels, and
//! instructions with operand references." Round-tripping back into
//! `marrow_ir::Module` is explicitly not required; only deterministic
//! textual equality across runs is, which a plain `Display`-style walk over
//! the module's own maps (iterated in a stable, sorted order) gives for
//! free.

use std::fmt::Write as _;

use marrow_ir::{Function, Instruction, InstructionKind, Module, Operand};

pub fn render_module(module: &Module) -> String {
    let mut ids: Vec<_> = module.functions().map(|(id, _)| *id).collect();
    ids.sort_by_key(|id| id.0);
    let mut out = String::new();
    for id in ids {
        let function = module.function(id).unwrap();
        render_function(&mut out, id.0, function);
        out.push('\n');
    }
    out
}

fn render_function(out: &mut String, id: u32, function: &Function) {
    let _ = write!(out, "fn decl#{id}(");
    for (i, param) in function.inputs.iter().enumerate() {
        if i > 0 {
            let _ = write!(out, ", ");
        }
        match &param.label {
            Some(label) => {
                let _ = write!(out, "{label}: {:?}", param.ty);
            }
            None => {
                let _ = write!(out, "_: {:?}", param.ty);
            }
        }
    }
    let _ = writeln!(out, ") -> {:?} {{", function.output);
    for (block_id, block) in function.blocks() {
        let _ = write!(out, "  {block_id:?}(");
        for (i, ty) in block.parameters.iter().enumerate() {
            if i > 0 {
                let _ = write!(out, ", ");
            }
            let _ = write!(out, "{ty:?}");
        }
        let _ = writeln!(out, "):");
        for inst_id in block.instructions() {
            let inst = function.inst(*inst_id);
            let _ = write!(out, "    {inst_id:?} = ");
            render_instruction(out, inst);
            let _ = writeln!(out);
        }
    }
    let _ = writeln!(out, "}}");
}

fn render_instruction(out: &mut String, inst: &Instruction) {
    match &inst.kind {
        InstructionKind::Access { effect, address } => {
            let _ = write!(out, "access[{effect:?}] {}", render_operand(address));
        }
        InstructionKind::EndAccess { access } => {
            let _ = write!(out, "end_access {}", render_operand(access));
        }
        InstructionKind::Move { target, value } => {
            let _ = write!(out, "move {} <- {}", render_operand(target), render_operand(value));
        }
        InstructionKind::Initialize { address, value } => {
            let _ = write!(out, "init {} <- {}", render_operand(address), render_operand(value));
        }
        InstructionKind::Assign { address, value } => {
            let _ = write!(out, "assign {} <- {}", render_operand(address), render_operand(value));
        }
        InstructionKind::Project { base, field } => {
            let _ = write!(out, "project {}.{field}", render_operand(base));
        }
        InstructionKind::ProjectBundle { base, field } => {
            let _ = write!(out, "project_bundle {}.{field}", render_operand(base));
        }
        InstructionKind::SubfieldView { base, field } => {
            let _ = write!(out, "subfield_view {}.{field}", render_operand(base));
        }
        InstructionKind::AdvanceByBytes { base, bytes } => {
            let _ = write!(out, "advance {} by {bytes}", render_operand(base));
        }
        InstructionKind::WrapExistentialAddr { base } => {
            let _ = write!(out, "wrap_existential {}", render_operand(base));
        }
        InstructionKind::Call { callee, arguments } => {
            let args: Vec<String> = arguments.iter().map(render_operand).collect();
            let _ = write!(out, "call {}({})", render_operand(callee), args.join(", "));
        }
        InstructionKind::Branch { target, arguments } => {
            let args: Vec<String> = arguments.iter().map(render_operand).collect();
            let _ = write!(out, "branch {target:?}({})", args.join(", "));
        }
        InstructionKind::CondBranch { condition, then_block, then_arguments, else_block, else_arguments } => {
            let then_args: Vec<String> = then_arguments.iter().map(render_operand).collect();
            let else_args: Vec<String> = else_arguments.iter().map(render_operand).collect();
            let _ = write!(
                out,
                "cond_branch {}, {then_block:?}({}), {else_block:?}({})",
                render_operand(condition),
                then_args.join(", "),
                else_args.join(", ")
            );
        }
        InstructionKind::Return { value } => match value {
            Some(v) => {
                let _ = write!(out, "return {}", render_operand(v));
            }
            None => {
                let _ = write!(out, "return");
            }
        },
        InstructionKind::Unreachable => {
            let _ = write!(out, "unreachable");
        }
    }
}

fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Register(id) => format!("{id:?}"),
        Operand::Parameter(block, index) => format!("{block:?}.p{index}"),
        Operand::Constant(c) => format!("{c:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marrow_ir::{Constant, Function, Linkage};
    use marrow_program::{Scope, Site};
    use marrow_ty::{BuiltinType, Type};

    #[test]
    fn render_module_is_deterministic_and_lists_instructions_in_order() {
        let mut module = Module::new();
        let function = module.get_or_create_function(
            marrow_ty::DeclId(0),
            Site(0),
            Linkage::Internal,
            Vec::new(),
            Vec::new(),
            Type::Builtin(BuiltinType::Word),
            false,
        );
        let entry = function.append_block(Scope(0), Vec::new());
        function.append_instruction(
            entry,
            Instruction {
                kind: InstructionKind::Return { value: Some(Operand::Constant(Constant::Int(1))) },
                result_type: None,
                site: Site(0),
            },
        );

        let first = render_module(&module);
        let second = render_module(&module);
        assert_eq!(first, second);
        assert!(first.contains("fn decl#0"));
        assert!(first.contains("return Int(1)"));
    }
}
