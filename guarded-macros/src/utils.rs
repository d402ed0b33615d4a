use proc_macro::{Delimiter, TokenStream, TokenTree};

/// Returns `true` if the tokens at position `i` form a `->` arrow.
fn is_return_arrow(tokens: &[TokenTree], i: usize) -> bool {
    if i + 1 >= tokens.len() {
        return false;
    }

    matches!(
        (&tokens[i], &tokens[i + 1]),
        (TokenTree::Punct(p1), TokenTree::Punct(p2))
            if p1.as_char() == '-' && p2.as_char() == '>'
    )
}

/// Position of the function body, the last brace-delimited group.
pub(crate) fn body_position(tokens: &[TokenTree]) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
}

/// Returns the name following the `fn` keyword.
pub(crate) fn fn_name(tokens: &[TokenTree]) -> Option<String> {
    let pos = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "fn"))?;

    match tokens.get(pos + 1) {
        Some(TokenTree::Ident(id)) => Some(id.to_string()),
        _ => None,
    }
}

/// Returns the declared return type of a function, as source text.
///
/// `body` is the position of the function body; the return type is
/// everything between the `->` arrow and the body. Returns `None` for
/// functions without an explicit return type.
pub(crate) fn return_type(tokens: &[TokenTree], body: usize) -> Option<String> {
    let arrow = (0..body).find(|&i| is_return_arrow(tokens, i))?;
    let ty = tokens[arrow + 2..body]
        .iter()
        .cloned()
        .collect::<TokenStream>()
        .to_string();

    if ty.trim().is_empty() { None } else { Some(ty) }
}

/// Parses the argument list of `#[guarded::test]`.
///
/// Accepts nothing at all, or exactly `timeout_ms = <u64>` (digit
/// separators allowed). Anything else is an error message meant for
/// `compile_error!`.
pub(crate) fn timeout_option(attr: &str) -> Result<Option<u64>, String> {
    let attr = attr.trim();
    let attr = attr.strip_suffix(',').unwrap_or(attr).trim();

    if attr.is_empty() {
        return Ok(None);
    }

    let Some((key, value)) = attr.split_once('=') else {
        return Err(format!(
            "#[guarded::test] expected `timeout_ms = <milliseconds>`, found `{attr}`"
        ));
    };

    let key = key.trim();
    if key != "timeout_ms" {
        return Err(format!(
            "#[guarded::test] unknown option `{key}` (expected `timeout_ms`)"
        ));
    }

    let value = value.trim();
    let digits = value.strip_suffix("u64").unwrap_or(value).replace('_', "");

    match digits.parse::<u64>() {
        Ok(ms) => Ok(Some(ms)),
        Err(_) => Err(format!(
            "#[guarded::test] `timeout_ms` must be a whole number of milliseconds, found `{value}`"
        )),
    }
}
