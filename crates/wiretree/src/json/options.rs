/// Nesting limit applied by [`JsonOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Configuration for the JSON parser.
///
/// # Examples
///
/// ```rust
/// use wiretree::{JsonOptions, Tree};
///
/// let options = JsonOptions {
///     unquoted_literals: true,
///     ..Default::default()
/// };
/// let mut tree = Tree::new();
/// tree.from_json_with(r#"{"n": 12}"#, options).unwrap();
/// assert_eq!(tree.type_at("/n").unwrap(), wiretree::DataType::Unquoted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Whether to keep every non-string scalar token verbatim as an
    /// `unquoted` node instead of classifying it as integer, double, boolean
    /// or null while parsing.
    ///
    /// The literals can be classified later with
    /// [`Tree::resolve_all_unquoted`](crate::Tree::resolve_all_unquoted), or
    /// are classified on the fly by typed reads.
    ///
    /// # Default
    ///
    /// `false`
    pub unquoted_literals: bool,

    /// Deepest container nesting accepted. The outermost container is depth
    /// 0; a container nested deeper fails with "Nesting Too Deep".
    ///
    /// # Default
    ///
    /// [`DEFAULT_MAX_DEPTH`]
    pub max_depth: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            unquoted_literals: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
