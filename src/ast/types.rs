use std::fmt::Display;

/// Value type of an expression or variable, as inferred by the tagging pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VarType {
    /// Not inferred yet
    #[default]
    Undetermined,
    /// Numeric literal not yet narrowed
    Number,
    Int,
    String,
    Boolean,
    Void,
}

impl VarType {
    pub fn is_defined(&self) -> bool {
        *self != VarType::Undetermined
    }
}

impl Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarType::Undetermined => write!(f, "undetermined"),
            VarType::Number => write!(f, "number"),
            VarType::Int => write!(f, "int"),
            VarType::String => write!(f, "string"),
            VarType::Boolean => write!(f, "boolean"),
            VarType::Void => write!(f, "void"),
        }
    }
}

/// Where a variable lives, fixed by its sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// `$name`, a stack slot of the current function
    Local,
    /// bare `name`, a module level slot
    Global,
    /// `<>name`, a module level slot that is never re-initialised
    Persistent,
}

impl StorageClass {
    pub fn sigil(&self) -> &'static str {
        match self {
            StorageClass::Local => "$",
            StorageClass::Global => "",
            StorageClass::Persistent => "<>",
        }
    }
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageClass::Local => write!(f, "local"),
            StorageClass::Global => write!(f, "global"),
            StorageClass::Persistent => write!(f, "persistent"),
        }
    }
}

/// Callable signature, used for builtins and rendered like `int name(int, int)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub return_type: VarType,
    pub args_type: Vec<VarType>,
    pub variadic_args_type: Option<VarType>,
}

impl FunctionSignature {
    pub fn new(name: &str, return_type: VarType, args_type: Vec<VarType>) -> Self {
        FunctionSignature {
            name: String::from(name),
            return_type,
            args_type,
            variadic_args_type: None,
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic_args_type.is_some()
    }

    /// Whether a call with `count` arguments fits this signature.
    pub fn accepts(&self, count: usize) -> bool {
        if self.is_variadic() {
            count >= self.args_type.len()
        } else {
            count == self.args_type.len()
        }
    }
}

impl Display for FunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut args = self
            .args_type
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<String>>();

        if let Some(variadic) = self.variadic_args_type {
            args.push(format!("{}...", variadic));
        }

        write!(f, "{} {}({})", self.return_type, self.name, args.join(", "))
    }
}
