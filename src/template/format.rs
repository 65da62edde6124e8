//! Positional placeholder formatting
//!
//! Parsed templates carry a format string where every variable became the
//! placeholder marker `%s` and every literal `%` was doubled to `%%`.
//! [`apply`] is the single place that undoes both.

/// Marker written into a format string for each variable reference
pub const PLACEHOLDER: &str = "%s";

/// Escaped form of a literal `%`
pub const ESCAPED_PERCENT: &str = "%%";

/// Count the placeholders in a format string
pub fn count_placeholders(format: &str) -> usize {
    let mut count = 0;
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch == '%' {
            match chars.next() {
                Some('s') => count += 1,
                Some(_) | None => {}
            }
        }
    }
    count
}

/// Substitute `args` positionally into `format`
///
/// `%s` takes the next argument, `%%` becomes `%`. A `%s` with no argument
/// left is kept verbatim; any other `%x` pair is copied unchanged.
pub fn apply<S: AsRef<str>>(format: &str, args: &[S]) -> String {
    let extra: usize = args.iter().map(|a| a.as_ref().len()).sum();
    let mut result = String::with_capacity(format.len() + extra);
    let mut args = args.iter();
    let mut chars = format.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('s') => match args.next() {
                Some(arg) => result.push_str(arg.as_ref()),
                None => result.push_str(PLACEHOLDER),
            },
            Some('%') => result.push('%'),
            Some(other) => {
                result.push('%');
                result.push(other);
            }
            None => result.push('%'),
        }
    }

    result
}
