use crate::macros::{Macro, MacroError, MacroRequest};
use crate::sink::{Sink, SinkExt, Tag};

/// Prints its parameters as a verbatim block. Handy when debugging macro syntax.
pub struct EchoMacro;

impl Macro for EchoMacro {
    fn execute(&self, request: &MacroRequest<'_>, sink: &mut dyn Sink) -> Result<(), MacroError> {
        let mut text = String::from("echo");
        for (key, value) in &request.parameters {
            text.push('\n');
            text.push_str(key);
            text.push_str(" ---> ");
            text.push_str(value);
        }
        sink.wrap_text(Tag::Verbatim, &text)?;
        Ok(())
    }
}
