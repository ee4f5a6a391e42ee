//! Parameter schema and argument parsing.
//!
//! Objects are created from a free-form argument string such as `"foo bar"`
//! or `"250"`. Each descriptor declares an ordered list of [`ParamSpec`]s;
//! tokens are consumed positionally and converted by kind. A [`ParamKind::List`]
//! parameter swallows every remaining token, so it can only come last.

use itertools::Itertools;

use crate::error::PatchError;

/// How a parameter's text is interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ParamKind {
    /// `1`, `true`, `on` or `0`, `false`, `off`
    Bool,
    /// Decimal `i32`
    Int,
    /// Decimal `f32`
    Float,
    /// All remaining tokens
    List,
}

/// Declaration of a single positional parameter.
#[derive(Clone, Copy, Debug)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Default text, parsed with the same rules as user input.
    /// `None` makes the parameter required.
    pub default: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self { name, kind, default: None }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, default: &'static str) -> Self {
        Self { name, kind, default: Some(default) }
    }
}

/// A parsed parameter value.
#[derive(Clone, PartialEq, Debug)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    List(Vec<String>),
}

impl ParamValue {
    /// Text that parses back to this exact value.
    fn render(&self) -> String {
        match self {
            ParamValue::Bool(true) => "1".to_string(),
            ParamValue::Bool(false) => "0".to_string(),
            ParamValue::Int(v) => v.to_string(),
            // Display prints the shortest text that reads back to the same f32
            ParamValue::Float(v) => v.to_string(),
            ParamValue::List(tokens) => tokens.iter().join(" "),
        }
    }
}

/// Parsed parameters of one node, in schema order.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Params {
    values: Vec<(&'static str, ParamValue)>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ParamValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Tokens of a list parameter; empty when absent.
    pub fn list(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(ParamValue::List(tokens)) => tokens,
            _ => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// Canonical argument string; `parse(schema, &p.to_args()) == p`.
    pub fn to_args(&self) -> String {
        self.values
            .iter()
            .map(|(_, v)| v.render())
            .filter(|text| !text.is_empty())
            .join(" ")
    }
}

fn parse_value(kind: ParamKind, token: &str) -> Option<ParamValue> {
    match kind {
        ParamKind::Bool => match token {
            "1" | "true" | "on" => Some(ParamValue::Bool(true)),
            "0" | "false" | "off" => Some(ParamValue::Bool(false)),
            _ => None,
        },
        ParamKind::Int => token.parse().ok().map(ParamValue::Int),
        ParamKind::Float => token.parse().ok().map(ParamValue::Float),
        ParamKind::List => Some(ParamValue::List(
            token.split_whitespace().map(str::to_string).collect(),
        )),
    }
}

fn parse_default(type_name: &str, spec: &ParamSpec, text: &str) -> Result<ParamValue, PatchError> {
    parse_value(spec.kind, text).ok_or_else(|| PatchError::InvalidDescriptor {
        kind: type_name.to_string(),
        reason: format!("default `{}` for `{}` does not parse", text, spec.name),
    })
}

/// Checks a schema before registration: defaults must parse and a list
/// parameter may only appear last.
pub(crate) fn validate_schema(type_name: &str, schema: &[ParamSpec]) -> Result<(), PatchError> {
    for (i, spec) in schema.iter().enumerate() {
        if spec.kind == ParamKind::List && i + 1 != schema.len() {
            return Err(PatchError::InvalidDescriptor {
                kind: type_name.to_string(),
                reason: format!("list parameter `{}` must be last", spec.name),
            });
        }
        if let Some(text) = spec.default {
            parse_default(type_name, spec, text)?;
        }
    }
    Ok(())
}

/// Parses `args` against `schema` for the object type `type_name`.
pub fn parse_args(type_name: &str, schema: &[ParamSpec], args: &str) -> Result<Params, PatchError> {
    let mut tokens = args.split_whitespace();
    let mut values = Vec::with_capacity(schema.len());

    for spec in schema {
        let parsed = if spec.kind == ParamKind::List {
            let rest: Vec<String> = tokens.by_ref().map(str::to_string).collect();
            if rest.is_empty() {
                None
            } else {
                Some(ParamValue::List(rest))
            }
        } else {
            tokens.next().and_then(|token| parse_value(spec.kind, token))
        };

        let value = match (parsed, spec.default) {
            (Some(value), _) => value,
            (None, Some(default)) => parse_default(type_name, spec, default)?,
            (None, None) => {
                return Err(PatchError::ArgumentParse {
                    kind: type_name.to_string(),
                    reason: format!("missing or invalid `{}`", spec.name),
                })
            }
        };
        values.push((spec.name, value));
    }

    let extra = tokens.count();
    if extra > 0 {
        tracing::trace!("{}: ignoring {} extra argument(s)", type_name, extra);
    }

    Ok(Params { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &[ParamSpec] = &[
        ParamSpec::required("count", ParamKind::Int),
        ParamSpec::optional("rate", ParamKind::Float, "0.5"),
        ParamSpec::optional("loop", ParamKind::Bool, "off"),
        ParamSpec::optional("tags", ParamKind::List, ""),
    ];

    #[test]
    fn parses_positionally() {
        let p = parse_args("x", SCHEMA, "3 1.25 on a b c").unwrap();
        assert_eq!(p.int("count"), Some(3));
        assert_eq!(p.float("rate"), Some(1.25));
        assert_eq!(p.bool("loop"), Some(true));
        assert_eq!(p.list("tags"), ["a", "b", "c"]);
    }

    #[test]
    fn optional_falls_back_to_default() {
        let p = parse_args("x", SCHEMA, "3 fast").unwrap();
        assert_eq!(p.float("rate"), Some(0.5));
        assert_eq!(p.bool("loop"), Some(false));
        assert!(p.list("tags").is_empty());
    }

    #[test]
    fn required_must_parse() {
        let err = parse_args("x", SCHEMA, "three").unwrap_err();
        assert!(matches!(err, PatchError::ArgumentParse { .. }));
        assert!(parse_args("x", SCHEMA, "").is_err());
    }

    #[test]
    fn canonical_args_reparse_identically() {
        let p = parse_args("x", SCHEMA, "  7   0.1 true   foo  bar ").unwrap();
        assert_eq!(p.to_args(), "7 0.1 1 foo bar");
        assert_eq!(parse_args("x", SCHEMA, &p.to_args()).unwrap(), p);
    }

    #[test]
    fn list_must_be_last() {
        let bad = [
            ParamSpec::optional("tags", ParamKind::List, ""),
            ParamSpec::optional("n", ParamKind::Int, "0"),
        ];
        assert!(validate_schema("x", &bad).is_err());
        assert!(validate_schema("x", SCHEMA).is_ok());
    }

    #[test]
    fn bad_default_is_rejected() {
        let bad = [ParamSpec::optional("n", ParamKind::Int, "lots")];
        assert!(matches!(
            validate_schema("x", &bad),
            Err(PatchError::InvalidDescriptor { .. })
        ));
    }
}
