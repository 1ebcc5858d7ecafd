//! Textual backends rendering the [`ir`](crate::ir) tree.
pub mod rust;

pub use rust::RustBackend;

use crate::ir::Item;
use crate::templates::TemplateKind;

/// Renders IR items and owns the naming policy of the target dialect.
pub trait Backend: Send + Sync {
    /// Dialect name, e.g. `rust_reqwest`
    fn name(&self) -> &'static str;

    /// Module name of a unit, e.g. `i_user_api_wrap` for `IUserApi.Wrap`
    fn module_name(&self, unit: &str) -> String;

    /// File name of a unit
    fn file_name(&self, unit: &str) -> String;

    fn fn_ident(&self, name: &str) -> String;

    fn var_ident(&self, name: &str) -> String;

    fn type_ident(&self, name: &str) -> String;

    fn string_literal(&self, value: &str) -> String;

    /// Render items separated by blank lines
    fn render_items(&self, items: &[Item]) -> String;
}

/// Backend rendering a template kind.
pub fn backend_for(kind: TemplateKind) -> Box<dyn Backend> {
    match kind {
        TemplateKind::RustReqwest | TemplateKind::Custom => Box::new(RustBackend::new()),
    }
}
