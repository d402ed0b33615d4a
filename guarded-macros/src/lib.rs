//! Procedural macros for the Guarded crate.
//!
//! These are re-exported from `guarded`; depend on that crate instead of
//! this one.

mod utils;

use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Timeout applied by `#[guarded::test]` when none is given.
const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Builds a `ThreadSafeVec` from a list of elements.
///
/// ```rust,ignore
/// let v = guarded::sequence![1, 2, 3];
/// assert_eq!(v.size()?, 3);
/// ```
#[proc_macro]
pub fn sequence(input: TokenStream) -> TokenStream {
    let mut vec_call: TokenStream = "::std::vec!".parse().expect("`vec!` path parses");
    vec_call.extend([TokenTree::Group(Group::new(Delimiter::Bracket, input))]);

    let mut output: TokenStream = "::guarded::ThreadSafeVec::from"
        .parse()
        .expect("constructor path parses");
    output.extend([TokenTree::Group(Group::new(Delimiter::Parenthesis, vec_call))]);

    output
}

/// Runs a test body on its own thread and fails the test if the body does
/// not finish within a deadline.
///
/// The deadline defaults to 5000 ms and can be set with
/// `#[guarded::test(timeout_ms = N)]`. A test that is expected to deadlock
/// can be written with `#[should_panic(expected = "exceeded timeout")]`
/// placed after this attribute; the stuck thread is left behind and reaped
/// when the test process exits.
///
/// Any other attribute argument is rejected at compile time.
///
/// The body may return a value (for instance a `Result`), which must be
/// `Send` since it crosses back from the test thread.
///
/// ```rust,ignore
/// #[guarded::test(timeout_ms = 200)]
/// #[should_panic(expected = "exceeded timeout")]
/// fn relocking_a_normal_lock_deadlocks() {
///     let lock = Lock::default();
///     let _a = ScopedGuard::new(&lock).unwrap();
///     let _b = ScopedGuard::new(&lock).unwrap();
/// }
/// ```
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    let timeout_ms = match utils::timeout_option(&attr.to_string()) {
        Ok(ms) => ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        Err(msg) => return compile_error(&msg),
    };

    let Some(pos) = utils::body_position(&tokens) else {
        return compile_error("#[guarded::test] expects a function");
    };

    let block = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => unreachable!(),
    };

    let name = utils::fn_name(&tokens).unwrap_or_else(|| "guarded-test".to_owned());

    let closure = match utils::return_type(&tokens, pos) {
        Some(ty) => format!("move || -> {ty} {{ {block} }}"),
        None => format!("move || {{ {block} }}"),
    };

    let new_block = format!(
        "{{
        let (__guarded_tx, __guarded_rx) = ::std::sync::mpsc::channel::<()>();
        let __guarded_worker = ::std::thread::Builder::new()
            .name(::std::string::String::from({name:?}))
            .spawn(move || {{
                let __guarded_out = ({closure})();
                let _ = __guarded_tx.send(());
                __guarded_out
            }})
            .expect(\"failed to spawn test thread\");

        if let ::std::result::Result::Err(::std::sync::mpsc::RecvTimeoutError::Timeout) =
            __guarded_rx.recv_timeout(::std::time::Duration::from_millis({timeout_ms}))
        {{
            panic!(\"test exceeded timeout of {timeout_ms} ms\");
        }}

        match __guarded_worker.join() {{
            ::std::result::Result::Ok(out) => out,
            ::std::result::Result::Err(payload) => ::std::panic::resume_unwind(payload),
        }}
    }}"
    );

    let Ok(stream) = new_block.parse::<TokenStream>() else {
        return compile_error("#[guarded::test] could not rewrite the test body");
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));

    let test_attr: TokenStream = "#[test]".parse().expect("`#[test]` parses");
    let mut result: Vec<TokenTree> = test_attr.into_iter().collect();
    result.extend(tokens);

    result.into_iter().collect()
}

/// Expands to a `compile_error!` carrying `msg`.
fn compile_error(msg: &str) -> TokenStream {
    format!("compile_error!({msg:?});")
        .parse()
        .expect("a string literal always parses")
}
