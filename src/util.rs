use ascii::AsciiString;

pub fn join_asciis(asciis: &[AsciiString]) -> String {
    let v: Vec<_> = asciis.iter().map(|a| a.to_string()).collect();
    v.join(".")
}

/// Joins wire labels (ending in the empty root label) into the dotless form
/// resolvers hand back, e.g. `foo.example.com`.
pub fn presentation_name(labels: &[AsciiString]) -> String {
    let mut name = join_asciis(labels);
    if name.ends_with('.') {
        name.pop();
    }
    name
}

/// Turns a bare label into a resolvable name by appending the default domain.
/// Anything containing a dot is assumed to be qualified already.
///
/// The domain is appended verbatim, so it normally carries its own leading
/// dot (`.example.com`).
pub fn normalize(name: &str, default_domain: &str) -> String {
    if name.contains('.') {
        name.to_owned()
    } else {
        format!("{name}{default_domain}")
    }
}
