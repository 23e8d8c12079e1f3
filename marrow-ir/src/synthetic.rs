//! Synthetic declarations (spec §4.5 "Synthetic declarations are generated
//! on first demand for a conformance and lowered into IR through the same
//! builder the normal emitter uses"): default deinitializers and move
//! operators for types that conform to `movable` without an explicit
//! user-written one.
//!
//! A deinitializer for a tuple recursively deinitializes each element (the
//! same "every element is built-in / conforms" structure `conform::decompose`
//! uses for the `movable` concept, spec §4.2 "Conformance"); a deinitializer
//! for a built-in is a no-op. A move operator deinitializes the target's
//! prior value (if any) and then blits the source into it — that blit is
//! the one place the raw `Assign` instruction appears rather than another
//! synthesized call, so synthesis always terminates.

use rustc_hash::FxHashMap;

use marrow_program::{DeclKind, Scope, Site, TypedProgram};
use marrow_ty::{AccessEffect, BuiltinType, CallableParameter, DeclId, LambdaType, ParameterType, Type};

use crate::function::Linkage;
use crate::instruction::{Instruction, InstructionKind};
use crate::module::Module;
use crate::operand::Operand;

/// Caches synthesized declarations per subject type so repeated demand for
/// the same type's deinitializer/move operator reuses one declaration
/// rather than re-synthesizing (and re-lowering) it.
#[derive(Default)]
pub struct SyntheticCache {
    deinitializers: FxHashMap<Type, DeclId>,
    move_operators: FxHashMap<Type, DeclId>,
}

impl SyntheticCache {
    pub fn new() -> Self {
        SyntheticCache::default()
    }

    pub fn deinitializer_for(
        &mut self,
        program: &mut TypedProgram,
        module: &mut Module,
        subject: &Type,
        site: Site,
    ) -> DeclId {
        if let Some(decl) = self.deinitializers.get(subject) {
            return *decl;
        }
        let sink_param = CallableParameter {
            label: None,
            ty: Type::Parameter(ParameterType { effect: AccessEffect::Sink, bare: Box::new(subject.clone()) }),
            has_default: false,
        };
        let fn_ty = Type::Lambda(LambdaType {
            inputs: vec![sink_param.clone()],
            environment: Box::new(Type::never()),
            output: Box::new(Type::Builtin(BuiltinType::Void)),
            is_subscript: false,
        });
        let decl = program.declare("deinit", DeclKind::Deinitializer, Vec::new(), fn_ty, site);
        // Reserve the cache slot before recursing into element types, so a
        // cyclic product (broken earlier at canonicalization, spec §9) can't
        // recurse through this path either.
        self.deinitializers.insert(subject.clone(), decl);

        let function = module.get_or_create_function(
            decl,
            site,
            Linkage::Internal,
            Vec::new(),
            vec![sink_param],
            Type::Builtin(BuiltinType::Void),
            false,
        );
        let entry = function.append_block(Scope(0), vec![subject.clone()]);
        let self_param = Operand::Parameter(entry, 0);
        if let Type::Tuple(tuple) = subject {
            for (index, element) in tuple.elements.iter().enumerate() {
                let field = function.append_instruction(
                    entry,
                    Instruction {
                        kind: InstructionKind::Project { base: self_param, field: index },
                        result_type: Some(element.ty.clone()),
                        site,
                    },
                );
                let element_deinit = self.deinitializer_for(program, module, &element.ty, site);
                let function = module.function_mut(decl).unwrap();
                function.append_instruction(
                    entry,
                    Instruction {
                        kind: InstructionKind::Call {
                            callee: Operand::Constant(crate::operand::Constant::Function(element_deinit)),
                            arguments: vec![Operand::Register(field)],
                        },
                        result_type: None,
                        site,
                    },
                );
            }
        }
        let function = module.function_mut(decl).unwrap();
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });
        decl
    }

    pub fn move_operator_for(
        &mut self,
        program: &mut TypedProgram,
        module: &mut Module,
        subject: &Type,
        site: Site,
    ) -> DeclId {
        if let Some(decl) = self.move_operators.get(subject) {
            return *decl;
        }
        let target_param = CallableParameter {
            label: Some("into".to_string()),
            ty: Type::Parameter(ParameterType { effect: AccessEffect::Set, bare: Box::new(subject.clone()) }),
            has_default: false,
        };
        let source_param = CallableParameter {
            label: None,
            ty: Type::Parameter(ParameterType { effect: AccessEffect::Sink, bare: Box::new(subject.clone()) }),
            has_default: false,
        };
        let fn_ty = Type::Lambda(LambdaType {
            inputs: vec![target_param.clone(), source_param.clone()],
            environment: Box::new(Type::never()),
            output: Box::new(Type::Builtin(BuiltinType::Void)),
            is_subscript: false,
        });
        let decl = program.declare("moveInit", DeclKind::MoveOperator, Vec::new(), fn_ty, site);
        self.move_operators.insert(subject.clone(), decl);

        let function = module.get_or_create_function(
            decl,
            site,
            Linkage::Internal,
            Vec::new(),
            vec![target_param, source_param],
            Type::Builtin(BuiltinType::Void),
            false,
        );
        let entry = function.append_block(Scope(0), vec![subject.clone(), subject.clone()]);
        let target = Operand::Parameter(entry, 0);
        let source = Operand::Parameter(entry, 1);
        function.append_instruction(
            entry,
            Instruction { kind: InstructionKind::Assign { address: target, value: source }, result_type: None, site },
        );
        function.append_instruction(entry, Instruction { kind: InstructionKind::Return { value: None }, result_type: None, site });
        decl
    }
}
