/// Compile a regex literal once per call site.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a `HashSet<String>` from string literals.
#[macro_export]
macro_rules! word_set {
    ($($word:expr),* $(,)?) => {{
        let mut set = std::collections::HashSet::<String>::new();
        $( set.insert(String::from($word)); )*
        set
    }};
}
