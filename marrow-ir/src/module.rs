//! The IR module (spec §3 "IR Module entities", §4.4 "Public operations"):
//! a collection of functions, created on first use and mutated only through
//! insertion/removal helpers that keep use-chains consistent.

use rustc_hash::FxHashMap;

use marrow_program::{Scope, Site};
use marrow_ty::{CallableParameter, DeclId, Type};

use crate::function::{Function, Linkage};
use crate::ids::{BlockId, InstId};
use crate::instruction::Instruction;
use crate::operand::{Operand, Use};
use crate::provenance::provenance;

#[derive(Default)]
pub struct Module {
    functions: FxHashMap<DeclId, Function>,
}

impl Module {
    pub fn new() -> Self {
        Module::default()
    }

    /// Returns the function for `id`, creating it (empty, no blocks yet) on
    /// first use (spec §4.4 "create function (demand-on-first-use)").
    #[allow(clippy::too_many_arguments)]
    pub fn get_or_create_function(
        &mut self,
        id: DeclId,
        site: Site,
        linkage: Linkage,
        generic_parameters: Vec<String>,
        inputs: Vec<CallableParameter>,
        output: Type,
        is_subscript: bool,
    ) -> &mut Function {
        self.functions.entry(id).or_insert_with(|| {
            Function::new(id, site, linkage, generic_parameters, inputs, output, is_subscript)
        })
    }

    pub fn function(&self, id: DeclId) -> Option<&Function> {
        self.functions.get(&id)
    }

    pub fn function_mut(&mut self, id: DeclId) -> Option<&mut Function> {
        self.functions.get_mut(&id)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&DeclId, &Function)> {
        self.functions.iter()
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = (&DeclId, &mut Function)> {
        self.functions.iter_mut()
    }

    pub fn append_block(&mut self, function: DeclId, scope: Scope, parameters: Vec<Type>) -> BlockId {
        self.functions
            .get_mut(&function)
            .unwrap_or_else(|| panic!("no such function: {:?}", function))
            .append_block(scope, parameters)
    }

    pub fn append_instruction(&mut self, function: DeclId, block: BlockId, instruction: Instruction) -> InstId {
        self.functions.get_mut(&function).unwrap().append_instruction(block, instruction)
    }

    pub fn prepend_instruction(&mut self, function: DeclId, block: BlockId, instruction: Instruction) -> InstId {
        self.functions.get_mut(&function).unwrap().prepend_instruction(block, instruction)
    }

    pub fn insert_before(
        &mut self,
        function: DeclId,
        block: BlockId,
        anchor: InstId,
        instruction: Instruction,
    ) -> InstId {
        self.functions.get_mut(&function).unwrap().insert_before(block, anchor, instruction)
    }

    pub fn insert_after(
        &mut self,
        function: DeclId,
        block: BlockId,
        anchor: InstId,
        instruction: Instruction,
    ) -> InstId {
        self.functions.get_mut(&function).unwrap().insert_after(block, anchor, instruction)
    }

    pub fn replace_instruction(&mut self, function: DeclId, old: InstId, instruction: Instruction) {
        self.functions.get_mut(&function).unwrap().replace_instruction(old, instruction);
    }

    /// Replaces every use of `old` by `new` — but only among uses belonging
    /// to `function` (spec §4.4: "migrates only uses in the
    /// caller-specified function").
    pub fn replace_all_uses(&mut self, function: DeclId, old: Operand, new: Operand) {
        self.functions.get_mut(&function).unwrap().replace_all_uses(old, new);
    }

    pub fn remove_instruction(&mut self, function: DeclId, block: BlockId, id: InstId) {
        self.functions.get_mut(&function).unwrap().remove_instruction(block, id);
    }

    pub fn remove_block(&mut self, function: DeclId, id: BlockId) {
        self.functions.get_mut(&function).unwrap().remove_block(id);
    }

    pub fn uses_of(&self, function: DeclId, operand: Operand) -> &[Use] {
        self.functions.get(&function).map_or(&[], |f| f.uses_of(operand))
    }

    /// The set of original operands `operand` (an address) ultimately
    /// derives from (spec §4.4 "Provenance").
    pub fn provenances_of(&self, function: DeclId, operand: Operand) -> Vec<Operand> {
        let f = self.functions.get(&function).unwrap_or_else(|| panic!("no such function: {:?}", function));
        provenance(f, operand)
    }
}
