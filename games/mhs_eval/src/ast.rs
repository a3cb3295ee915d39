//! Rule expression trees.
//!
//! An [`EvalPrototype`] is one node of an authored rule. Trees are loaded by
//! the data layer and only ever read by the interpreter. Child expressions
//! are optional because data may leave a field empty; handlers reject a
//! missing required child with a `MissingField` error.

use std::fmt;

use mhs_gamedata::{AssetId, CurveId, InventoryConvenienceLabel, PrototypeId};
use mhs_properties::PropertyId;

use crate::EvalContext;

pub mod build;

/// Optional child expression.
pub type EvalNode = Option<Box<EvalPrototype>>;

/// Up to four param expressions, in param order.
pub type EvalParams = [EvalNode; 4];

/// Two operands of a binary operator.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BinaryArgs {
    pub arg1: EvalNode,
    pub arg2: EvalNode,
}

/// Counted loop sharing one local stack frame across iterations.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForLoop {
    pub pre_loop: EvalNode,
    pub loop_var_init: EvalNode,
    pub loop_condition: EvalNode,
    pub loop_advance: EvalNode,
    pub scope_loop_body: Vec<EvalPrototype>,
    pub post_loop: EvalNode,
}

/// Loop over the conditions of a condition collection.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForEachConditionLoop {
    pub condition_collection_context: EvalContext,
    pub pre_loop: EvalNode,
    pub loop_condition_pre_scope: EvalNode,
    pub scope_loop_body: Vec<EvalPrototype>,
    pub loop_condition_post_scope: EvalNode,
    pub post_loop: EvalNode,
}

/// Loop over a prototype reference list or vector.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForEachProtoRefLoop {
    pub proto_ref_list_context: EvalContext,
    pub pre_loop: EvalNode,
    pub loop_condition: EvalNode,
    pub scope_loop_body: Vec<EvalPrototype>,
    pub post_loop: EvalNode,
}

/// One rule expression node.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalPrototype {
    // Literals and context loads
    LoadInt(i64),
    LoadFloat(f32),
    LoadBool(bool),
    LoadAssetRef(AssetId),
    LoadProtoRef(PrototypeId),
    LoadContextInt {
        context: EvalContext,
    },
    LoadContextProtoRef {
        context: EvalContext,
    },
    LoadCurve {
        curve: CurveId,
        index: EvalNode,
    },
    IsContextDataNull {
        context: EvalContext,
    },

    // Arithmetic
    Add(BinaryArgs),
    Sub(BinaryArgs),
    Mult(BinaryArgs),
    Div(BinaryArgs),
    Modulus(BinaryArgs),
    Max(BinaryArgs),
    Min(BinaryArgs),
    Exponent {
        base: EvalNode,
        exponent: EvalNode,
    },

    // Comparison and logic
    Equals {
        args: BinaryArgs,
        epsilon: f32,
    },
    GreaterThan(BinaryArgs),
    LessThan(BinaryArgs),
    And(BinaryArgs),
    Or(BinaryArgs),
    Not(EvalNode),

    // Control flow
    IfElse {
        conditional: EvalNode,
        eval_if: EvalNode,
        eval_else: EvalNode,
    },
    Scope(Vec<EvalPrototype>),
    For(Box<ForLoop>),
    ForEachConditionInContext(Box<ForEachConditionLoop>),
    ForEachProtoRefInContextRefList(Box<ForEachProtoRefLoop>),

    // Properties
    AssignProp {
        context: EvalContext,
        prop: PropertyId,
        eval: EvalNode,
    },
    AssignPropEvalParams {
        context: EvalContext,
        /// Property prototype naming the property enum.
        prop: PrototypeId,
        params: EvalParams,
        eval: EvalNode,
    },
    HasProp {
        context: EvalContext,
        prop: PropertyId,
    },
    LoadProp {
        context: EvalContext,
        prop: PropertyId,
    },
    LoadPropContextParams {
        context: EvalContext,
        prop: PrototypeId,
        /// Slot holding the value of param 0.
        prop_context_params: EvalContext,
    },
    LoadPropEvalParams {
        context: EvalContext,
        prop: PrototypeId,
        params: EvalParams,
    },
    SwapProp {
        context: EvalContext,
        prop: PropertyId,
        other_context: EvalContext,
    },

    // Game predicates
    DifficultyTierRange {
        context: EvalContext,
        min: PrototypeId,
        max: PrototypeId,
    },
    MissionIsActive {
        context: EvalContext,
        mission: PrototypeId,
    },
    MissionIsComplete {
        context: EvalContext,
        mission: PrototypeId,
    },
    HasEntityInInventory {
        context: EvalContext,
        entity: PrototypeId,
        inventory: InventoryConvenienceLabel,
    },
    IsDynamicCombatLevelEnabled,
    ExportError,

    // Reserved, not yet supported
    RandomFloat {
        min: EvalNode,
        max: EvalNode,
    },
    RandomInt {
        min: EvalNode,
        max: EvalNode,
    },
    LoadEntityToContextVar {
        context: EvalContext,
        entity_id: EvalNode,
    },
    LoadConditionCollectionToContext {
        context: EvalContext,
        entity_id: EvalNode,
    },
    EntityHasKeyword {
        context: EvalContext,
        keyword: PrototypeId,
    },
    EntityHasTalent {
        context: EvalContext,
        talent: PrototypeId,
    },
    GetCombatLevel {
        entity: EvalNode,
    },
    GetPowerRank {
        context: EvalContext,
        power: PrototypeId,
    },
    CalcPowerRank {
        context: EvalContext,
        power: PrototypeId,
    },
    IsInParty {
        context: EvalContext,
    },
    GetDamageReductionPct {
        defense: EvalNode,
        level: EvalNode,
        damage_type: AssetId,
    },
    GetDistanceToEntity {
        source: EvalNode,
        target: EvalNode,
        edge_to_edge: bool,
    },
}

/// Operator tag of an [`EvalPrototype`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EvalOp {
    LoadInt,
    LoadFloat,
    LoadBool,
    LoadAssetRef,
    LoadProtoRef,
    LoadContextInt,
    LoadContextProtoRef,
    LoadCurve,
    IsContextDataNull,
    Add,
    Sub,
    Mult,
    Div,
    Modulus,
    Max,
    Min,
    Exponent,
    Equals,
    GreaterThan,
    LessThan,
    And,
    Or,
    Not,
    IfElse,
    Scope,
    For,
    ForEachConditionInContext,
    ForEachProtoRefInContextRefList,
    AssignProp,
    AssignPropEvalParams,
    HasProp,
    LoadProp,
    LoadPropContextParams,
    LoadPropEvalParams,
    SwapProp,
    DifficultyTierRange,
    MissionIsActive,
    MissionIsComplete,
    HasEntityInInventory,
    IsDynamicCombatLevelEnabled,
    ExportError,
    RandomFloat,
    RandomInt,
    LoadEntityToContextVar,
    LoadConditionCollectionToContext,
    EntityHasKeyword,
    EntityHasTalent,
    GetCombatLevel,
    GetPowerRank,
    CalcPowerRank,
    IsInParty,
    GetDamageReductionPct,
    GetDistanceToEntity,
}

impl EvalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            EvalOp::LoadInt => "LoadInt",
            EvalOp::LoadFloat => "LoadFloat",
            EvalOp::LoadBool => "LoadBool",
            EvalOp::LoadAssetRef => "LoadAssetRef",
            EvalOp::LoadProtoRef => "LoadProtoRef",
            EvalOp::LoadContextInt => "LoadContextInt",
            EvalOp::LoadContextProtoRef => "LoadContextProtoRef",
            EvalOp::LoadCurve => "LoadCurve",
            EvalOp::IsContextDataNull => "IsContextDataNull",
            EvalOp::Add => "Add",
            EvalOp::Sub => "Sub",
            EvalOp::Mult => "Mult",
            EvalOp::Div => "Div",
            EvalOp::Modulus => "Modulus",
            EvalOp::Max => "Max",
            EvalOp::Min => "Min",
            EvalOp::Exponent => "Exponent",
            EvalOp::Equals => "Equals",
            EvalOp::GreaterThan => "GreaterThan",
            EvalOp::LessThan => "LessThan",
            EvalOp::And => "And",
            EvalOp::Or => "Or",
            EvalOp::Not => "Not",
            EvalOp::IfElse => "IfElse",
            EvalOp::Scope => "Scope",
            EvalOp::For => "For",
            EvalOp::ForEachConditionInContext => "ForEachConditionInContext",
            EvalOp::ForEachProtoRefInContextRefList => "ForEachProtoRefInContextRefList",
            EvalOp::AssignProp => "AssignProp",
            EvalOp::AssignPropEvalParams => "AssignPropEvalParams",
            EvalOp::HasProp => "HasProp",
            EvalOp::LoadProp => "LoadProp",
            EvalOp::LoadPropContextParams => "LoadPropContextParams",
            EvalOp::LoadPropEvalParams => "LoadPropEvalParams",
            EvalOp::SwapProp => "SwapProp",
            EvalOp::DifficultyTierRange => "DifficultyTierRange",
            EvalOp::MissionIsActive => "MissionIsActive",
            EvalOp::MissionIsComplete => "MissionIsComplete",
            EvalOp::HasEntityInInventory => "HasEntityInInventory",
            EvalOp::IsDynamicCombatLevelEnabled => "IsDynamicCombatLevelEnabled",
            EvalOp::ExportError => "ExportError",
            EvalOp::RandomFloat => "RandomFloat",
            EvalOp::RandomInt => "RandomInt",
            EvalOp::LoadEntityToContextVar => "LoadEntityToContextVar",
            EvalOp::LoadConditionCollectionToContext => "LoadConditionCollectionToContext",
            EvalOp::EntityHasKeyword => "EntityHasKeyword",
            EvalOp::EntityHasTalent => "EntityHasTalent",
            EvalOp::GetCombatLevel => "GetCombatLevel",
            EvalOp::GetPowerRank => "GetPowerRank",
            EvalOp::CalcPowerRank => "CalcPowerRank",
            EvalOp::IsInParty => "IsInParty",
            EvalOp::GetDamageReductionPct => "GetDamageReductionPct",
            EvalOp::GetDistanceToEntity => "GetDistanceToEntity",
        }
    }
}

impl fmt::Display for EvalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EvalPrototype {
    /// Operator tag of this node.
    pub fn op(&self) -> EvalOp {
        match self {
            EvalPrototype::LoadInt(_) => EvalOp::LoadInt,
            EvalPrototype::LoadFloat(_) => EvalOp::LoadFloat,
            EvalPrototype::LoadBool(_) => EvalOp::LoadBool,
            EvalPrototype::LoadAssetRef(_) => EvalOp::LoadAssetRef,
            EvalPrototype::LoadProtoRef(_) => EvalOp::LoadProtoRef,
            EvalPrototype::LoadContextInt { .. } => EvalOp::LoadContextInt,
            EvalPrototype::LoadContextProtoRef { .. } => EvalOp::LoadContextProtoRef,
            EvalPrototype::LoadCurve { .. } => EvalOp::LoadCurve,
            EvalPrototype::IsContextDataNull { .. } => EvalOp::IsContextDataNull,
            EvalPrototype::Add(_) => EvalOp::Add,
            EvalPrototype::Sub(_) => EvalOp::Sub,
            EvalPrototype::Mult(_) => EvalOp::Mult,
            EvalPrototype::Div(_) => EvalOp::Div,
            EvalPrototype::Modulus(_) => EvalOp::Modulus,
            EvalPrototype::Max(_) => EvalOp::Max,
            EvalPrototype::Min(_) => EvalOp::Min,
            EvalPrototype::Exponent { .. } => EvalOp::Exponent,
            EvalPrototype::Equals { .. } => EvalOp::Equals,
            EvalPrototype::GreaterThan(_) => EvalOp::GreaterThan,
            EvalPrototype::LessThan(_) => EvalOp::LessThan,
            EvalPrototype::And(_) => EvalOp::And,
            EvalPrototype::Or(_) => EvalOp::Or,
            EvalPrototype::Not(_) => EvalOp::Not,
            EvalPrototype::IfElse { .. } => EvalOp::IfElse,
            EvalPrototype::Scope(_) => EvalOp::Scope,
            EvalPrototype::For(_) => EvalOp::For,
            EvalPrototype::ForEachConditionInContext(_) => EvalOp::ForEachConditionInContext,
            EvalPrototype::ForEachProtoRefInContextRefList(_) => {
                EvalOp::ForEachProtoRefInContextRefList
            }
            EvalPrototype::AssignProp { .. } => EvalOp::AssignProp,
            EvalPrototype::AssignPropEvalParams { .. } => EvalOp::AssignPropEvalParams,
            EvalPrototype::HasProp { .. } => EvalOp::HasProp,
            EvalPrototype::LoadProp { .. } => EvalOp::LoadProp,
            EvalPrototype::LoadPropContextParams { .. } => EvalOp::LoadPropContextParams,
            EvalPrototype::LoadPropEvalParams { .. } => EvalOp::LoadPropEvalParams,
            EvalPrototype::SwapProp { .. } => EvalOp::SwapProp,
            EvalPrototype::DifficultyTierRange { .. } => EvalOp::DifficultyTierRange,
            EvalPrototype::MissionIsActive { .. } => EvalOp::MissionIsActive,
            EvalPrototype::MissionIsComplete { .. } => EvalOp::MissionIsComplete,
            EvalPrototype::HasEntityInInventory { .. } => EvalOp::HasEntityInInventory,
            EvalPrototype::IsDynamicCombatLevelEnabled => EvalOp::IsDynamicCombatLevelEnabled,
            EvalPrototype::ExportError => EvalOp::ExportError,
            EvalPrototype::RandomFloat { .. } => EvalOp::RandomFloat,
            EvalPrototype::RandomInt { .. } => EvalOp::RandomInt,
            EvalPrototype::LoadEntityToContextVar { .. } => EvalOp::LoadEntityToContextVar,
            EvalPrototype::LoadConditionCollectionToContext { .. } => {
                EvalOp::LoadConditionCollectionToContext
            }
            EvalPrototype::EntityHasKeyword { .. } => EvalOp::EntityHasKeyword,
            EvalPrototype::EntityHasTalent { .. } => EvalOp::EntityHasTalent,
            EvalPrototype::GetCombatLevel { .. } => EvalOp::GetCombatLevel,
            EvalPrototype::GetPowerRank { .. } => EvalOp::GetPowerRank,
            EvalPrototype::CalcPowerRank { .. } => EvalOp::CalcPowerRank,
            EvalPrototype::IsInParty { .. } => EvalOp::IsInParty,
            EvalPrototype::GetDamageReductionPct { .. } => EvalOp::GetDamageReductionPct,
            EvalPrototype::GetDistanceToEntity { .. } => EvalOp::GetDistanceToEntity,
        }
    }
}

/// Displays an optional child, `null` when absent.
struct Child<'a>(&'a EvalNode);

impl fmt::Display for Child<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(node) => fmt::Display::fmt(node, f),
            None => f.write_str("null"),
        }
    }
}

/// Displays a statement list as `{a; b; c}`.
struct Block<'a>(&'a [EvalPrototype]);

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{node}")?;
        }
        f.write_str("}")
    }
}

/// Expression string of the tree rooted at this node, used in diagnostics.
impl fmt::Display for EvalPrototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.op();
        match self {
            EvalPrototype::LoadInt(v) => write!(f, "{v}"),
            EvalPrototype::LoadFloat(v) => write!(f, "{v:?}f"),
            EvalPrototype::LoadBool(v) => write!(f, "{v}"),
            EvalPrototype::LoadAssetRef(v) => write!(f, "{v:?}"),
            EvalPrototype::LoadProtoRef(v) => write!(f, "{v:?}"),
            EvalPrototype::LoadContextInt { context }
            | EvalPrototype::LoadContextProtoRef { context }
            | EvalPrototype::IsContextDataNull { context }
            | EvalPrototype::IsInParty { context } => write!(f, "{op}({context})"),
            EvalPrototype::LoadCurve { curve, index } => {
                write!(f, "{op}({curve:?}, {})", Child(index))
            }
            EvalPrototype::Add(a)
            | EvalPrototype::Sub(a)
            | EvalPrototype::Mult(a)
            | EvalPrototype::Div(a)
            | EvalPrototype::Modulus(a)
            | EvalPrototype::Max(a)
            | EvalPrototype::Min(a)
            | EvalPrototype::GreaterThan(a)
            | EvalPrototype::LessThan(a)
            | EvalPrototype::And(a)
            | EvalPrototype::Or(a) => write!(f, "{op}({}, {})", Child(&a.arg1), Child(&a.arg2)),
            EvalPrototype::Exponent { base, exponent } => {
                write!(f, "{op}({}, {})", Child(base), Child(exponent))
            }
            EvalPrototype::Equals { args, epsilon } => write!(
                f,
                "{op}({}, {}, epsilon={epsilon})",
                Child(&args.arg1),
                Child(&args.arg2)
            ),
            EvalPrototype::Not(arg) => write!(f, "{op}({})", Child(arg)),
            EvalPrototype::IfElse {
                conditional,
                eval_if,
                eval_else,
            } => write!(
                f,
                "{op}({}, {}, {})",
                Child(conditional),
                Child(eval_if),
                Child(eval_else)
            ),
            EvalPrototype::Scope(body) => write!(f, "{op}{}", Block(body)),
            EvalPrototype::For(l) => write!(
                f,
                "{op}({}; {}; {}; {}) {} then {}",
                Child(&l.pre_loop),
                Child(&l.loop_var_init),
                Child(&l.loop_condition),
                Child(&l.loop_advance),
                Block(&l.scope_loop_body),
                Child(&l.post_loop)
            ),
            EvalPrototype::ForEachConditionInContext(l) => write!(
                f,
                "{op}({}, pre={}, post={}) {}",
                l.condition_collection_context,
                Child(&l.loop_condition_pre_scope),
                Child(&l.loop_condition_post_scope),
                Block(&l.scope_loop_body)
            ),
            EvalPrototype::ForEachProtoRefInContextRefList(l) => write!(
                f,
                "{op}({}, while={}) {}",
                l.proto_ref_list_context,
                Child(&l.loop_condition),
                Block(&l.scope_loop_body)
            ),
            EvalPrototype::AssignProp {
                context,
                prop,
                eval,
            } => write!(f, "{op}({context}, {prop:?}, {})", Child(eval)),
            EvalPrototype::AssignPropEvalParams {
                context,
                prop,
                params,
                eval,
            } => write!(
                f,
                "{op}({context}, {prop:?}[{}, {}, {}, {}], {})",
                Child(&params[0]),
                Child(&params[1]),
                Child(&params[2]),
                Child(&params[3]),
                Child(eval)
            ),
            EvalPrototype::HasProp { context, prop } | EvalPrototype::LoadProp { context, prop } => {
                write!(f, "{op}({context}, {prop:?})")
            }
            EvalPrototype::LoadPropContextParams {
                context,
                prop,
                prop_context_params,
            } => write!(f, "{op}({context}, {prop:?}[{prop_context_params}])"),
            EvalPrototype::LoadPropEvalParams {
                context,
                prop,
                params,
            } => write!(
                f,
                "{op}({context}, {prop:?}[{}, {}, {}, {}])",
                Child(&params[0]),
                Child(&params[1]),
                Child(&params[2]),
                Child(&params[3])
            ),
            EvalPrototype::SwapProp {
                context,
                prop,
                other_context,
            } => write!(f, "{op}({context}, {prop:?}, {other_context})"),
            EvalPrototype::DifficultyTierRange { context, min, max } => {
                write!(f, "{op}({context}, {min:?}..={max:?})")
            }
            EvalPrototype::MissionIsActive { context, mission }
            | EvalPrototype::MissionIsComplete { context, mission } => {
                write!(f, "{op}({context}, {mission:?})")
            }
            EvalPrototype::HasEntityInInventory {
                context,
                entity,
                inventory,
            } => write!(f, "{op}({context}, {entity:?}, {inventory})"),
            EvalPrototype::IsDynamicCombatLevelEnabled | EvalPrototype::ExportError => {
                write!(f, "{op}()")
            }
            EvalPrototype::RandomFloat { min, max } | EvalPrototype::RandomInt { min, max } => {
                write!(f, "{op}({}, {})", Child(min), Child(max))
            }
            EvalPrototype::LoadEntityToContextVar { context, entity_id }
            | EvalPrototype::LoadConditionCollectionToContext { context, entity_id } => {
                write!(f, "{op}({context}, {})", Child(entity_id))
            }
            EvalPrototype::EntityHasKeyword {
                context,
                keyword: id,
            }
            | EvalPrototype::EntityHasTalent {
                context,
                talent: id,
            }
            | EvalPrototype::GetPowerRank { context, power: id }
            | EvalPrototype::CalcPowerRank { context, power: id } => {
                write!(f, "{op}({context}, {id:?})")
            }
            EvalPrototype::GetCombatLevel { entity } => write!(f, "{op}({})", Child(entity)),
            EvalPrototype::GetDamageReductionPct {
                defense,
                level,
                damage_type,
            } => write!(
                f,
                "{op}({}, {}, {damage_type:?})",
                Child(defense),
                Child(level)
            ),
            EvalPrototype::GetDistanceToEntity {
                source,
                target,
                edge_to_edge,
            } => write!(
                f,
                "{op}({}, {}, edge_to_edge={edge_to_edge})",
                Child(source),
                Child(target)
            ),
        }
    }
}
