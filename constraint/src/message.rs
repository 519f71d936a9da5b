//! Message template rendering.

/// Values available to a message template.
#[derive(Debug, Clone, Default)]
pub struct MessageContext<'a> {
    pub constraint: &'a str,
    pub entity: &'a str,
    pub property: &'a str,
    pub actual: String,
    pub required: String,
    pub operator: &'a str,
    pub clause: &'a str,
    pub status: &'a str,
}

impl MessageContext<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        Some(match name {
            "constraint" => self.constraint,
            "entity" => self.entity,
            "property" => self.property,
            "actual" => self.actual.as_str(),
            "required" => self.required.as_str(),
            "operator" => self.operator,
            "clause" => self.clause,
            "status" => self.status,
            _ => return None,
        })
    }
}

/// Substitute `{name}` placeholders. Unknown placeholders and unmatched
/// braces are copied verbatim.
pub fn render_message(template: &str, ctx: &MessageContext<'_>) -> String {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match ctx.lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
