//! Rust source backend.

use super::Backend;
use crate::ir::{Block, ConstDecl, Expr, Field, FnDecl, ImplBlock, Item, Stmt, StructDecl, TraitDecl};
use crate::utils::{to_snake_case, to_snake_ident};

const INDENT: &str = "    ";

/// Words that need the raw-identifier form when used as names
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// Words that cannot be raw identifiers
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

/// Line-oriented writer with indentation.
#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    level: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.level {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

/// Renders IR as Rust source.
#[derive(Debug, Clone, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }

    fn escape(&self, ident: String) -> String {
        if ident.is_empty() {
            return "_".to_string();
        }
        if RESERVED.contains(&ident.as_str()) {
            return format!("{ident}_");
        }
        if KEYWORDS.contains(&ident.as_str()) {
            return format!("r#{ident}");
        }
        if ident.starts_with(|c: char| c.is_ascii_digit()) {
            return format!("_{ident}");
        }
        ident
    }

    fn docs(&self, w: &mut CodeWriter, doc: &[String]) {
        for line in doc {
            if line.is_empty() {
                w.line("///");
            } else {
                w.line(&format!("/// {line}"));
            }
        }
    }

    fn render_item(&self, w: &mut CodeWriter, item: &Item) {
        match item {
            Item::Trait(decl) => self.render_trait(w, decl),
            Item::Struct(decl) => self.render_struct(w, decl),
            Item::Impl(block) => self.render_impl(w, block),
            Item::Function(decl) => self.render_fn(w, decl, true),
        }
    }

    fn render_trait(&self, w: &mut CodeWriter, decl: &TraitDecl) {
        self.docs(w, &decl.doc);
        if decl.is_async {
            w.line("#[async_trait]");
        }
        let bounds = if decl.supertraits.is_empty() {
            String::new()
        } else {
            format!(": {}", decl.supertraits.join(" + "))
        };
        w.line(&format!("pub trait {}{} {{", self.type_ident(&decl.name), bounds));
        w.indent();
        for (i, method) in decl.methods.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            self.render_fn(w, method, false);
        }
        w.dedent();
        w.line("}");
    }

    fn render_struct(&self, w: &mut CodeWriter, decl: &StructDecl) {
        self.docs(w, &decl.doc);
        if !decl.derives.is_empty() {
            w.line(&format!("#[derive({})]", decl.derives.join(", ")));
        }
        let name = self.type_ident(&decl.name);
        if decl.fields.is_empty() {
            w.line(&format!("pub struct {name};"));
            return;
        }
        w.line(&format!("pub struct {name} {{"));
        w.indent();
        for Field { name, ty } in &decl.fields {
            w.line(&format!("{}: {},", self.var_ident(name), ty));
        }
        w.dedent();
        w.line("}");
    }

    fn render_impl(&self, w: &mut CodeWriter, block: &ImplBlock) {
        if block.is_async {
            w.line("#[async_trait]");
        }
        let target = self.type_ident(&block.target);
        if block.consts.is_empty() && block.methods.is_empty() {
            match &block.trait_name {
                Some(trait_name) => w.line(&format!("impl {} for {} {{}}", trait_name, target)),
                None => w.line(&format!("impl {} {{}}", target)),
            }
            return;
        }
        match &block.trait_name {
            Some(trait_name) => w.line(&format!("impl {} for {} {{", trait_name, target)),
            None => w.line(&format!("impl {} {{", target)),
        }
        w.indent();
        let inherent = block.trait_name.is_none();
        for ConstDecl { name, ty, value } in &block.consts {
            let vis = if inherent { "pub " } else { "" };
            w.line(&format!("{vis}const {name}: {ty} = {value};"));
        }
        for (i, method) in block.methods.iter().enumerate() {
            if i > 0 || !block.consts.is_empty() {
                w.blank();
            }
            self.render_fn(w, method, inherent);
        }
        w.dedent();
        w.line("}");
    }

    fn render_fn(&self, w: &mut CodeWriter, decl: &FnDecl, allow_pub: bool) {
        self.docs(w, &decl.doc);

        let mut params = Vec::new();
        if let Some(receiver) = decl.receiver {
            params.push(receiver.to_string());
        }
        for param in &decl.params {
            params.push(format!("{}: {}", self.var_ident(&param.name), param.ty));
        }

        let signature = format!(
            "{}{}fn {}({}){}",
            if decl.public && allow_pub { "pub " } else { "" },
            if decl.is_async { "async " } else { "" },
            self.fn_ident(&decl.name),
            params.join(", "),
            decl.ret
                .as_deref()
                .map(|ret| format!(" -> {ret}"))
                .unwrap_or_default()
        );

        match &decl.body {
            None => w.line(&format!("{signature};")),
            Some(body) if body.is_empty() => w.line(&format!("{signature} {{}}")),
            Some(body) => {
                w.line(&format!("{signature} {{"));
                w.indent();
                self.render_block(w, body);
                w.dedent();
                w.line("}");
            }
        }
    }

    fn render_block(&self, w: &mut CodeWriter, block: &Block) {
        for stmt in block {
            self.render_stmt(w, stmt);
        }
    }

    fn render_stmt(&self, w: &mut CodeWriter, stmt: &Stmt) {
        let level = w.level();
        match stmt {
            Stmt::Let {
                name,
                mutable,
                ty,
                value,
            } => {
                let ty = ty.as_deref().map(|t| format!(": {t}")).unwrap_or_default();
                w.line(&format!(
                    "let {}{}{} = {};",
                    if *mutable { "mut " } else { "" },
                    self.var_ident(name),
                    ty,
                    self.expr(value, level)
                ));
            }
            Stmt::Assign { target, value } => {
                w.line(&format!("{} = {};", self.var_ident(target), self.expr(value, level)));
            }
            Stmt::Expr(expr) => w.line(&format!("{};", self.expr(expr, level))),
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                w.line(&format!("if {} {{", self.expr(cond, level)));
                w.indent();
                self.render_block(w, then);
                w.dedent();
                match otherwise {
                    Some(otherwise) => {
                        w.line("} else {");
                        w.indent();
                        self.render_block(w, otherwise);
                        w.dedent();
                        w.line("}");
                    }
                    None => w.line("}"),
                }
            }
            Stmt::IfLet {
                variant,
                binding,
                value,
                then,
            } => {
                w.line(&format!(
                    "if let {}({}) = {} {{",
                    variant,
                    self.var_ident(binding),
                    self.expr(value, level)
                ));
                w.indent();
                self.render_block(w, then);
                w.dedent();
                w.line("}");
            }
            Stmt::ForEach {
                binding,
                iter,
                body,
            } => {
                w.line(&format!(
                    "for {} in {} {{",
                    self.var_ident(binding),
                    self.expr(iter, level)
                ));
                w.indent();
                self.render_block(w, body);
                w.dedent();
                w.line("}");
            }
            Stmt::HookCall { hook, args } => {
                w.line(&format!(
                    "self.hooks.{}({});",
                    self.fn_ident(hook),
                    self.args(args, level)
                ));
            }
            Stmt::Log {
                level: log_level,
                message,
                args,
            } => {
                let mut parts = vec![self.string_literal(message)];
                parts.extend(args.iter().map(|a| self.expr(a, level)));
                w.line(&format!("log::{}!({});", log_level.as_str(), parts.join(", ")));
            }
            Stmt::Return(expr) => w.line(&format!("return {};", self.expr(expr, level))),
            Stmt::Tail(expr) => w.line(&self.expr(expr, level)),
            Stmt::Comment(text) => w.line(&format!("// {text}")),
        }
    }

    fn args(&self, args: &[Expr], level: usize) -> String {
        args.iter()
            .map(|a| self.expr(a, level))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Render an expression whose first line starts at indentation `level`.
    fn expr(&self, expr: &Expr, level: usize) -> String {
        match expr {
            Expr::Raw(code) => code.clone(),
            Expr::Ident(name) => self.var_ident(name),
            Expr::Str(value) => self.string_literal(value),
            Expr::Call { func, args } => format!("{}({})", func, self.args(args, level)),
            Expr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let receiver = match receiver.as_ref() {
                    inner @ (Expr::Ref(_) | Expr::Negate(_) | Expr::Closure { .. }) => {
                        format!("({})", self.expr(inner, level))
                    }
                    inner => self.expr(inner, level),
                };
                format!("{}.{}({})", receiver, self.fn_ident(method), self.args(args, level))
            }
            Expr::Format { template, args } => {
                let mut parts = vec![self.string_literal(template)];
                parts.extend(args.iter().map(|a| self.expr(a, level)));
                format!("format!({})", parts.join(", "))
            }
            Expr::Await(inner) => format!("{}.await", self.expr(inner, level)),
            Expr::Try(inner) => format!("{}?", self.expr(inner, level)),
            Expr::Negate(inner) => format!("!{}", self.expr(inner, level)),
            Expr::Ref(inner) => format!("&{}", self.expr(inner, level)),
            Expr::Block { is_async, body } => {
                let mut w = CodeWriter {
                    buf: String::new(),
                    level: level + 1,
                };
                self.render_block(&mut w, body);
                let close = INDENT.repeat(level);
                format!(
                    "{}{{\n{}{}}}",
                    if *is_async { "async " } else { "" },
                    w.finish(),
                    close
                )
            }
            Expr::Tuple(items) => format!("({})", self.args(items, level)),
            Expr::Closure { params, ret, body } => {
                let params: Vec<String> = params.iter().map(|p| self.var_ident(p)).collect();
                match ret {
                    Some(ret) => format!(
                        "|{}| -> {} {}",
                        params.join(", "),
                        ret,
                        self.expr(body, level)
                    ),
                    None => format!("|{}| {}", params.join(", "), self.expr(body, level)),
                }
            }
            Expr::Invoke(callee) => format!("({})()", self.expr(callee, level)),
            Expr::StructLit { name, fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(field, value)| {
                        let field = self.var_ident(field);
                        let value = self.expr(value, level);
                        if field == value {
                            field
                        } else {
                            format!("{field}: {value}")
                        }
                    })
                    .collect();
                format!("{} {{ {} }}", name, fields.join(", "))
            }
        }
    }
}

impl Backend for RustBackend {
    fn name(&self) -> &'static str {
        "rust_reqwest"
    }

    fn module_name(&self, unit: &str) -> String {
        let name = to_snake_case(&unit.replace('.', "_"));
        if name == "mod" {
            name
        } else {
            self.escape(name)
        }
    }

    fn file_name(&self, unit: &str) -> String {
        format!("{}.rs", to_snake_case(&unit.replace('.', "_")))
    }

    fn fn_ident(&self, name: &str) -> String {
        self.escape(to_snake_case(name))
    }

    fn var_ident(&self, name: &str) -> String {
        if name.trim_matches('_').is_empty() {
            return "_".to_string();
        }
        let ident = to_snake_ident(name);
        if ident.starts_with('_') || ident.ends_with('_') {
            ident
        } else {
            self.escape(ident)
        }
    }

    fn type_ident(&self, name: &str) -> String {
        name.to_string()
    }

    fn string_literal(&self, value: &str) -> String {
        format!("\"{}\"", value.escape_default())
    }

    fn render_items(&self, items: &[Item]) -> String {
        let mut w = CodeWriter::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            self.render_item(&mut w, item);
        }
        w.finish()
    }
}
