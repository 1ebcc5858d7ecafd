//! Intermediate representation of emitted code.
//!
//! Synthesizers build [`Unit`]s out of items, statements and expressions;
//! a [`Backend`](crate::backend::Backend) renders them to text. Names in the
//! tree are logical (as declared): the backend applies identifier casing and
//! keyword escaping. Types and [`Expr::Raw`] fragments are emitted verbatim.

/// One output unit (one generated file).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Unit {
    /// Unit name, e.g. `UserApi` or `IUserApi.Wrap`
    pub name: String,
    /// Declaration the unit was generated from
    pub source: String,
    pub items: Vec<Item>,
}

impl Unit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Trait(TraitDecl),
    Struct(StructDecl),
    Impl(ImplBlock),
    Function(FnDecl),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub supertraits: Vec<String>,
    /// Rendered with `#[async_trait]`
    pub is_async: bool,
    pub methods: Vec<FnDecl>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub derives: Vec<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// `impl Target` or `impl Trait for Target`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImplBlock {
    pub trait_name: Option<String>,
    pub target: String,
    pub is_async: bool,
    pub consts: Vec<ConstDecl>,
    pub methods: Vec<FnDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub ty: String,
    /// Value expression, verbatim
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub doc: Vec<String>,
    pub public: bool,
    pub is_async: bool,
    /// `&self`, `self` or none
    pub receiver: Option<&'static str>,
    pub params: Vec<Param>,
    /// Return type; `None` for unit
    pub ret: Option<String>,
    /// Body; `None` declares a required trait method
    pub body: Option<Block>,
}

impl FnDecl {
    /// A `&self` method
    pub fn method(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: Some("&self"),
            ..Default::default()
        }
    }

    /// A free or associated function without receiver
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A method consuming `self`
    pub fn consuming(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            receiver: Some("self"),
            ..Default::default()
        }
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.ret = Some(ty.into());
        self
    }

    pub fn body(mut self, body: Block) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        mutable: bool,
        ty: Option<String>,
        value: Expr,
    },
    Assign {
        target: String,
        value: Expr,
    },
    /// Expression statement, terminated by `;`
    Expr(Expr),
    If {
        cond: Expr,
        then: Block,
        otherwise: Option<Block>,
    },
    /// `if let Variant(binding) = value { .. }`
    IfLet {
        variant: String,
        binding: String,
        value: Expr,
        then: Block,
    },
    ForEach {
        binding: String,
        iter: Expr,
        body: Block,
    },
    /// `self.hooks.<hook>(args);`
    HookCall {
        hook: String,
        args: Vec<Expr>,
    },
    Log {
        level: LogLevel,
        message: String,
        args: Vec<Expr>,
    },
    Return(Expr),
    /// Trailing expression without `;`
    Tail(Expr),
    Comment(String),
}

impl Stmt {
    pub fn let_(name: impl Into<String>, value: Expr) -> Self {
        Self::Let {
            name: name.into(),
            mutable: false,
            ty: None,
            value,
        }
    }

    pub fn let_typed(name: impl Into<String>, ty: impl Into<String>, value: Expr) -> Self {
        Self::Let {
            name: name.into(),
            mutable: false,
            ty: Some(ty.into()),
            value,
        }
    }

    pub fn let_mut(name: impl Into<String>, value: Expr) -> Self {
        Self::Let {
            name: name.into(),
            mutable: true,
            ty: None,
            value,
        }
    }

    pub fn if_(cond: Expr, then: Block) -> Self {
        Self::If {
            cond,
            then,
            otherwise: None,
        }
    }

    pub fn if_let(
        variant: impl Into<String>,
        binding: impl Into<String>,
        value: Expr,
        then: Block,
    ) -> Self {
        Self::IfLet {
            variant: variant.into(),
            binding: binding.into(),
            value,
            then,
        }
    }

    pub fn hook(hook: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::HookCall {
            hook: hook.into(),
            args,
        }
    }

    pub fn log(level: LogLevel, message: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Log {
            level,
            message: message.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Verbatim code fragment
    Raw(String),
    /// Variable, escaped by the backend
    Ident(String),
    /// String literal
    Str(String),
    Call {
        func: String,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    /// `format!(template, args)`
    Format {
        template: String,
        args: Vec<Expr>,
    },
    Await(Box<Expr>),
    Try(Box<Expr>),
    Negate(Box<Expr>),
    Ref(Box<Expr>),
    /// `{ .. }` or `async { .. }`
    Block {
        is_async: bool,
        body: Block,
    },
    Tuple(Vec<Expr>),
    Closure {
        params: Vec<String>,
        /// Return type; forces a block body
        ret: Option<String>,
        body: Box<Expr>,
    },
    /// `(callee)()`
    Invoke(Box<Expr>),
    StructLit {
        name: String,
        fields: Vec<(String, Expr)>,
    },
}

impl Expr {
    pub fn raw(code: impl Into<String>) -> Self {
        Self::Raw(code.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn call(func: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Call {
            func: func.into(),
            args,
        }
    }

    pub fn method(self, method: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::MethodCall {
            receiver: Box::new(self),
            method: method.into(),
            args,
        }
    }

    pub fn await_(self) -> Self {
        Self::Await(Box::new(self))
    }

    pub fn try_(self) -> Self {
        Self::Try(Box::new(self))
    }

    pub fn negate(self) -> Self {
        Self::Negate(Box::new(self))
    }

    pub fn by_ref(self) -> Self {
        Self::Ref(Box::new(self))
    }

    pub fn format(template: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::Format {
            template: template.into(),
            args,
        }
    }

    pub fn block(is_async: bool, body: Block) -> Self {
        Self::Block { is_async, body }
    }

    pub fn closure(params: &[&str], body: Expr) -> Self {
        Self::Closure {
            params: params.iter().map(|p| p.to_string()).collect(),
            ret: None,
            body: Box::new(body),
        }
    }
}
